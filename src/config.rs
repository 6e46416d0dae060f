//! read client configuration from a file, the environment, or AWS Secrets Manager

use std::path::Path;
use std::time::Duration;

use aws_config::BehaviorVersion;
use serde::Deserialize;

use crate::errors::Error;

pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";
pub const DEFAULT_EXPIRY_MARKER: &str = "expired";
pub const DEFAULT_REFRESH_TIMEOUT_SECS: u64 = 30;

pub enum ConfigLocation {
    File(String),
    Env,
    Secret,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub base_url: String,
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    /// Boolean field in a 401 body that marks the session as expired but refreshable.
    #[serde(default = "default_expiry_marker")]
    pub expiry_marker: String,
    /// Upper bound on a single refresh call. `0` disables the bound.
    #[serde(default = "default_refresh_timeout_secs")]
    pub refresh_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub bearer_token: Option<String>,
}

fn default_refresh_path() -> String {
    DEFAULT_REFRESH_PATH.to_string()
}

fn default_expiry_marker() -> String {
    DEFAULT_EXPIRY_MARKER.to_string()
}

fn default_refresh_timeout_secs() -> u64 {
    DEFAULT_REFRESH_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    format!("storefront-client/{}", env!("CARGO_PKG_VERSION"))
}

impl Config {
    pub fn from_values(
        base_url: impl Into<String>,
        refresh_path: Option<String>,
        expiry_marker: Option<String>,
        refresh_timeout_secs: Option<u64>,
        bearer_token: Option<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            refresh_path: refresh_path.unwrap_or_else(default_refresh_path),
            expiry_marker: expiry_marker.unwrap_or_else(default_expiry_marker),
            refresh_timeout_secs: refresh_timeout_secs.unwrap_or(DEFAULT_REFRESH_TIMEOUT_SECS),
            user_agent: default_user_agent(),
            bearer_token,
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// # ENV Vars
    /// * `STOREFRONT_API_URL` - Base URL of the storefront REST API (required)
    /// * `STOREFRONT_REFRESH_PATH` - Session refresh route, defaults to `/auth/refresh`
    /// * `STOREFRONT_EXPIRY_MARKER` - JSON field flagging a refreshable 401, defaults to `expired`
    /// * `STOREFRONT_REFRESH_TIMEOUT_SECS` - Refresh call timeout, defaults to 30
    /// * `STOREFRONT_BEARER_TOKEN` - Optional static bearer credential
    pub fn from_env() -> Result<Self, Error> {
        let base_url = std::env::var("STOREFRONT_API_URL")
            .map_err(|_| Error::Config("Missing STOREFRONT_API_URL env var".to_string()))?;
        let refresh_timeout_secs = match std::env::var("STOREFRONT_REFRESH_TIMEOUT_SECS") {
            Ok(raw) => Some(raw.parse::<u64>().map_err(|e| {
                Error::Config(format!(
                    "Invalid STOREFRONT_REFRESH_TIMEOUT_SECS '{}': {}",
                    raw, e
                ))
            })?),
            Err(_) => None,
        };
        Ok(Self::from_values(
            base_url,
            std::env::var("STOREFRONT_REFRESH_PATH").ok(),
            std::env::var("STOREFRONT_EXPIRY_MARKER").ok(),
            refresh_timeout_secs,
            std::env::var("STOREFRONT_BEARER_TOKEN").ok(),
        ))
    }

    pub fn refresh_timeout(&self) -> Option<Duration> {
        if self.refresh_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.refresh_timeout_secs))
        }
    }

    /// Base URL without a trailing slash, with `https://` assumed when no scheme is given.
    pub fn normalized_base_url(&self) -> String {
        let trimmed = self.base_url.trim_end_matches('/');
        if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("https://{}", trimmed)
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        let base = self.normalized_base_url();
        reqwest::Url::parse(&base)
            .map_err(|e| Error::Config(format!("Invalid base URL '{}': {}", base, e)))?;
        if !self.refresh_path.starts_with('/') {
            return Err(Error::Config(format!(
                "Refresh path '{}' must start with '/'",
                self.refresh_path
            )));
        }
        if self.expiry_marker.trim().is_empty() {
            return Err(Error::Config("Expiry marker field must not be empty".into()));
        }
        Ok(())
    }
}

pub async fn read_config(loc: ConfigLocation) -> Result<Config, Error> {
    let config = match loc {
        ConfigLocation::File(path) => Config::from_file(path)?,
        ConfigLocation::Env => Config::from_env()?,
        ConfigLocation::Secret => read_config_from_secret().await?,
    };
    config.validate()?;
    Ok(config)
}

async fn read_config_from_secret() -> Result<Config, Error> {
    let secret_arn = std::env::var("STOREFRONT_CONFIG_SECRET_ARN")
        .map_err(|_| Error::Config("Missing STOREFRONT_CONFIG_SECRET_ARN env var".to_string()))?;
    let client = aws_sdk_secretsmanager::Client::new(
        &aws_config::load_defaults(BehaviorVersion::latest()).await,
    );
    let resp = client
        .get_secret_value()
        .secret_id(secret_arn)
        .send()
        .await
        .map_err(|e| Error::Config(format!("Failed to get secret: {}", e)))?;
    let secret = resp
        .secret_string()
        .ok_or_else(|| Error::Config("Failed to get secret string, returned None".to_string()))?;
    let config: Config = serde_json::from_str(secret)?;
    Ok(config)
}
