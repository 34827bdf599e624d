//! Bridge server connection settings.
//!
//! Resolved from `BRIDGE_SERVER_URL` and `DEPLOYMENT_ID`, optionally overridden
//! by CLI flags. Empty values count as unset.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

pub const BRIDGE_URL_ENV: &str = "BRIDGE_SERVER_URL";
pub const DEPLOYMENT_ID_ENV: &str = "DEPLOYMENT_ID";
pub const DEFAULT_BRIDGE_URL: &str = "http://localhost:8080";
pub const CALLBACK_PATH: &str = "/api/v1/infra/callback";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default = "default_bridge_url")]
    pub bridge_url: String,

    /// Raw identifier as handed to the run. Parsed lazily so that a bad value
    /// only disables callbacks instead of aborting the observed workflow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_id: Option<String>,
}

fn default_bridge_url() -> String {
    DEFAULT_BRIDGE_URL.to_string()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            bridge_url: default_bridge_url(),
            deployment_id: None,
        }
    }
}

impl BridgeConfig {
    pub fn new(bridge_url: Option<String>, deployment_id: Option<String>) -> Self {
        Self {
            bridge_url: non_empty(bridge_url).unwrap_or_else(default_bridge_url),
            deployment_id: non_empty(deployment_id),
        }
    }

    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup (environment, test map, ...).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::new(lookup(BRIDGE_URL_ENV), lookup(DEPLOYMENT_ID_ENV))
    }

    /// Apply explicit overrides on top of the resolved values.
    pub fn with_overrides(
        mut self,
        bridge_url: Option<String>,
        deployment_id: Option<String>,
    ) -> Self {
        if let Some(url) = non_empty(bridge_url) {
            self.bridge_url = url;
        }
        if let Some(id) = non_empty(deployment_id) {
            self.deployment_id = Some(id);
        }
        self
    }

    pub fn callback_url(&self) -> String {
        format!("{}{}", self.bridge_url.trim_end_matches('/'), CALLBACK_PATH)
    }

    /// Parsed deployment id. `Ok(None)` when unset.
    pub fn deployment_id(&self) -> Result<Option<i64>> {
        self.deployment_id
            .as_deref()
            .map(parse_deployment_id)
            .transpose()
    }

    /// Fail fast when a bridge URL is obviously unusable.
    pub fn validate(&self) -> Result<()> {
        if !(self.bridge_url.starts_with("http://") || self.bridge_url.starts_with("https://")) {
            return Err(Error::config_invalid_value(
                BRIDGE_URL_ENV,
                Some(self.bridge_url.clone()),
                "Bridge URL must start with http:// or https://",
            ));
        }
        self.deployment_id()?;
        Ok(())
    }
}

pub fn parse_deployment_id(raw: &str) -> Result<i64> {
    raw.trim().parse::<i64>().map_err(|e| {
        Error::config_invalid_value(
            DEPLOYMENT_ID_ENV,
            Some(raw.to_string()),
            format!("Deployment id must be an integer: {}", e),
        )
    })
}
