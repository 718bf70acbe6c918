//! Bindings for the remote event gateway.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use shared::{
    domain::EventRecord,
    error::GatewayErrorBody,
    protocol::{LatestEventResponse, RegisterInitRequest, VerifyOtpRequest},
};
use tracing::debug;

use crate::error::GatewayError;

const LATEST_EVENT_PATH: &str = "latest";
const REGISTER_INIT_PATH: &str = "register-init";
const VERIFY_OTP_PATH: &str = "verify-otp";

#[async_trait]
pub trait EventGateway: Send + Sync {
    async fn latest_event(&self) -> Result<EventRecord, GatewayError>;
    async fn register_init(&self, request: &RegisterInitRequest) -> Result<(), GatewayError>;
    async fn verify_otp(&self, request: &VerifyOtpRequest) -> Result<(), GatewayError>;
}

pub struct HttpEventGateway {
    http: Client,
    base_url: String,
}

impl HttpEventGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Uses a preconfigured client, e.g. one carrying a request timeout.
    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}/", self.base_url)
    }

    async fn post_json<T>(&self, path: &str, body: &T) -> Result<(), GatewayError>
    where
        T: Serialize + Sync,
    {
        let url = self.endpoint(path);
        debug!(%url, "gateway: POST");
        let res = self.http.post(&url).json(body).send().await?;
        ensure_success(res).await.map(|_| ())
    }
}

/// Turns a non-success response into [`GatewayError::Rejected`], keeping
/// whatever failure body the gateway sent.
async fn ensure_success(res: Response) -> Result<Response, GatewayError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let body = match res.bytes().await {
        Ok(bytes) => GatewayErrorBody::from_slice(&bytes),
        Err(_) => GatewayErrorBody::default(),
    };
    Err(GatewayError::rejected(status.as_u16(), body))
}

#[async_trait]
impl EventGateway for HttpEventGateway {
    async fn latest_event(&self) -> Result<EventRecord, GatewayError> {
        let url = self.endpoint(LATEST_EVENT_PATH);
        debug!(%url, "gateway: GET");
        let res = ensure_success(self.http.get(&url).send().await?).await?;
        let bytes = res.bytes().await?;
        let envelope: LatestEventResponse =
            serde_json::from_slice(&bytes).map_err(|err| GatewayError::Decode(err.to_string()))?;
        Ok(envelope.into_record())
    }

    async fn register_init(&self, request: &RegisterInitRequest) -> Result<(), GatewayError> {
        self.post_json(REGISTER_INIT_PATH, request).await
    }

    async fn verify_otp(&self, request: &VerifyOtpRequest) -> Result<(), GatewayError> {
        self.post_json(VERIFY_OTP_PATH, request).await
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
