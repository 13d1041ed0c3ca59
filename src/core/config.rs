use crate::errors::{GridError, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use super::Capabilities;

/// The fixed remote hub a run provisions its browser from.
///
/// Credentials are embedded in the session-creation URL; nothing here is
/// re-derived at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    /// Hub host, optionally with a port (`hub.example.com:80`).
    pub host: String,
    /// Path of the WebDriver entry point on the hub.
    pub path: String,
    pub username: String,
    pub access_key: String,
}

impl Endpoint {
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        access_key: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            path: "/wd/hub".to_string(),
            username: username.into(),
            access_key: access_key.into(),
        }
    }

    /// Full session-creation URL with the credentials embedded.
    pub fn url(&self) -> Result<Url> {
        let mut url = Url::parse(&format!("http://{}", self.host))
            .map_err(|e| GridError::Configuration(format!("invalid hub host: {e}")))?;
        url.set_username(&self.username)
            .map_err(|_| GridError::Configuration("hub host cannot carry credentials".into()))?;
        url.set_password(Some(&self.access_key))
            .map_err(|_| GridError::Configuration("hub host cannot carry credentials".into()))?;
        url.set_path(&self.path);
        Ok(url)
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new("hub.crossbrowsertesting.com:80", "you@yourdomain.com", "12345")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub endpoint: Endpoint,
    pub capabilities: Capabilities,
}

impl Config {
    pub fn new(endpoint: Endpoint, capabilities: Capabilities) -> Self {
        Self {
            endpoint,
            capabilities,
        }
    }
}
