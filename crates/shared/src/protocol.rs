use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::{EventId, EventRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterInitRequest {
    pub username: String,
    pub email: String,
    pub event_id: EventId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp_code: String,
    pub event_id: EventId,
}

/// Body of `GET /latest/`. Some deployments wrap the record in `data`, others
/// return it bare.
#[derive(Debug, Clone)]
pub enum LatestEventResponse {
    Wrapped { data: EventRecord },
    Bare(EventRecord),
}

impl LatestEventResponse {
    /// Picks the envelope shape first so a decode failure names the record
    /// field that broke.
    pub fn from_value(mut value: Value) -> Result<Self, serde_json::Error> {
        if value.get("data").is_some_and(Value::is_object) {
            let data = value["data"].take();
            return Ok(Self::Wrapped {
                data: serde_json::from_value(data)?,
            });
        }
        Ok(Self::Bare(serde_json::from_value(value)?))
    }

    pub fn into_record(self) -> EventRecord {
        match self {
            Self::Wrapped { data } => data,
            Self::Bare(record) => record,
        }
    }
}

impl<'de> Deserialize<'de> for LatestEventResponse {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(de::Error::custom)
    }
}
