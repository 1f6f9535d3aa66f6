//! Configuration module
//!
//! The client configuration is read once from a JSON file, optionally
//! overridden from the environment, validated, and then handed by value to
//! the API client. Nothing here is global.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

/// Default location of the config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

const ENV_API_HOST: &str = "TXPROC_API_HOST";
const ENV_API_PORT: &str = "TXPROC_API_PORT";
const ENV_API_PROTO: &str = "TXPROC_API_PROTO";
const ENV_API_KEY: &str = "TXPROC_API_KEY";

/// Backend connection settings: `{api_host, api_port, api_proto, api_key}`.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_host: String,
    #[serde(deserialize_with = "deserialize_port")]
    pub api_port: String,
    pub api_proto: String,
    pub api_key: String,
}

impl Debug for ClientConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ClientConfig")
            .field("api_host", &self.api_host)
            .field("api_port", &self.api_port)
            .field("api_proto", &self.api_proto)
            .field("api_key", &mask_secret(&self.api_key))
            .finish()
    }
}

impl ClientConfig {
    /// Read, override from `TXPROC_*` environment variables, and validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse the JSON config file without applying overrides or validation.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Replace fields for which `lookup` yields a non-empty value.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let fields = [
            (ENV_API_HOST, &mut self.api_host),
            (ENV_API_PORT, &mut self.api_port),
            (ENV_API_PROTO, &mut self.api_proto),
            (ENV_API_KEY, &mut self.api_key),
        ];
        for (key, field) in fields {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                tracing::debug!(key, "Config field overridden from environment");
                *field = value;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_host.trim().is_empty() {
            return Err(ConfigError::Invalid("api_host must not be empty".to_string()));
        }
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Invalid("api_key must not be empty".to_string()));
        }
        match self.api_port.parse::<u16>() {
            Ok(port) if port > 0 => {}
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "api_port must be a port number, got '{}'",
                    self.api_port
                )))
            }
        }
        match self.api_proto.as_str() {
            "http" | "https" => Ok(()),
            other => Err(ConfigError::Invalid(format!(
                "api_proto must be http or https, got '{}'",
                other
            ))),
        }
    }

    /// `{proto}://{host}:{port}`
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.api_proto, self.api_host, self.api_port)
    }

    pub fn masked_key(&self) -> String {
        mask_secret(&self.api_key)
    }
}

/// Keep the first four characters of a secret and hide the rest.
pub fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if visible.chars().count() == secret.chars().count() {
        "***".to_string()
    } else {
        format!("{}***", visible)
    }
}

fn deserialize_port<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Text(String),
        Number(u64),
    }

    Ok(match Port::deserialize(deserializer)? {
        Port::Text(s) => s,
        Port::Number(n) => n.to_string(),
    })
}
