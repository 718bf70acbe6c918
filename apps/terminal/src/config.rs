use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::{bail, Context};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_CONFIG_PATH: &str = "client.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub gateway_base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gateway_base_url: None,
            request_timeout_secs: None,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    /// The gateway base URL, validated. There is deliberately no fallback host.
    pub fn gateway_base_url(&self) -> anyhow::Result<String> {
        let Some(raw) = self.gateway_base_url.as_deref().map(str::trim) else {
            bail!("no gateway base url configured; set EVENT_GATEWAY_URL or pass --gateway-url");
        };
        if raw.is_empty() {
            bail!("gateway base url is empty");
        }

        let parsed = Url::parse(raw).with_context(|| format!("invalid gateway base url '{raw}'"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("gateway base url '{raw}' must use http or https");
        }
        Ok(raw.trim_end_matches('/').to_string())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

pub fn load_settings(config_path: &Path) -> Settings {
    load_settings_from(config_path, |key| std::env::var(key).ok())
}

fn load_settings_from(config_path: &Path, lookup: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(config_path) {
        apply_file_config(&mut settings, &raw);
    }
    apply_env_overrides(&mut settings, lookup);

    settings
}

fn apply_file_config(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, toml::Value>>(raw) else {
        tracing::warn!("config: ignoring unparseable config file");
        return;
    };

    if let Some(v) = file_cfg.get("gateway_base_url").and_then(toml::Value::as_str) {
        settings.gateway_base_url = Some(v.to_string());
    }
    if let Some(v) = file_cfg
        .get("request_timeout_secs")
        .and_then(toml::Value::as_integer)
    {
        settings.request_timeout_secs = u64::try_from(v).ok();
    }
    if let Some(v) = file_cfg.get("log_filter").and_then(toml::Value::as_str) {
        settings.log_filter = v.to_string();
    }
}

fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("EVENT_GATEWAY_URL") {
        settings.gateway_base_url = Some(v);
    }
    if let Some(v) = lookup("APP__GATEWAY_BASE_URL") {
        settings.gateway_base_url = Some(v);
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = Some(parsed);
        }
    }

    if let Some(v) = lookup("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
