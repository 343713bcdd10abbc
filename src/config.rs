//! Client Configuration
//!
//! Connection settings for a BSB-LAN device, loadable from code,
//! environment variables or a JSON/YAML file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;

use crate::error::{BsbLanError, BsbLanResult};

pub const ENV_HOST: &str = "BSBLAN_HOST";
pub const ENV_PORT: &str = "BSBLAN_PORT";
pub const ENV_USER: &str = "BSBLAN_USER";
pub const ENV_PASS: &str = "BSBLAN_PASS";
pub const ENV_PASSKEY: &str = "BSBLAN_PASSKEY";
pub const ENV_TIMEOUT: &str = "BSBLAN_TIMEOUT";

fn default_port() -> u16 {
    80
}

fn default_timeout() -> u64 {
    10
}

/// Configuration for connecting to a BSB-LAN device
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BsbLanConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Optional URL passkey, inserted as the first path segment
    #[serde(default)]
    pub passkey: Option<String>,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl BsbLanConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            username: None,
            password: None,
            passkey: None,
            request_timeout_secs: default_timeout(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_passkey(mut self, passkey: impl Into<String>) -> Self {
        self.passkey = Some(passkey.into());
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Build a configuration from `BSBLAN_*` environment variables.
    /// Callers wanting `.env` support should run `dotenv::dotenv()` first.
    pub fn from_env() -> BsbLanResult<Self> {
        let host = std::env::var(ENV_HOST)
            .map_err(|_| BsbLanError::Config(format!("{} is not set", ENV_HOST)))?;

        let mut config = Self::new(host);

        if let Ok(port) = std::env::var(ENV_PORT) {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| BsbLanError::Config(format!("invalid {}: {}", ENV_PORT, port)))?;
        }
        if let Ok(timeout) = std::env::var(ENV_TIMEOUT) {
            config.request_timeout_secs = timeout
                .trim()
                .parse()
                .map_err(|_| BsbLanError::Config(format!("invalid {}: {}", ENV_TIMEOUT, timeout)))?;
        }

        config.username = std::env::var(ENV_USER).ok().filter(|s| !s.is_empty());
        config.password = std::env::var(ENV_PASS).ok().filter(|s| !s.is_empty());
        config.passkey = std::env::var(ENV_PASSKEY).ok().filter(|s| !s.is_empty());

        Ok(config)
    }

    /// Load a configuration file. The format is picked from the extension.
    pub async fn load(path: impl AsRef<Path>) -> BsbLanResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&content)?),
            _ => Err(BsbLanError::Config(format!(
                "unsupported config format: {}",
                path.display()
            ))),
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Full URL for an API path such as `/JQ`, honouring the passkey.
    pub fn endpoint(&self, path: &str) -> String {
        match self.passkey.as_deref() {
            Some(key) if !key.is_empty() => format!("{}/{}{}", self.base_url(), key, path),
            _ => format!("{}{}", self.base_url(), path),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn basic_auth(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) => Some((user, pass)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_endpoint_with_passkey() {
        let config = BsbLanConfig::new("10.0.0.5").with_passkey("1234");
        assert_eq!(config.endpoint("/JQ"), "http://10.0.0.5:80/1234/JQ");

        let config = BsbLanConfig::new("10.0.0.5").with_port(8080);
        assert_eq!(config.endpoint("/JI"), "http://10.0.0.5:8080/JI");
    }

    #[test]
    fn test_basic_auth_requires_both() {
        let mut config = BsbLanConfig::new("host");
        config.username = Some("admin".into());
        assert!(config.basic_auth().is_none());

        let config = config.with_credentials("admin", "secret");
        assert_eq!(config.basic_auth(), Some(("admin", "secret")));
    }

    #[tokio::test]
    async fn test_load_json_and_yaml() {
        let dir = tempdir().unwrap();

        let json_path = dir.path().join("bsblan.json");
        tokio::fs::write(&json_path, r#"{"host": "192.168.1.20", "passkey": "abc"}"#)
            .await
            .unwrap();
        let config = BsbLanConfig::load(&json_path).await.unwrap();
        assert_eq!(config.host, "192.168.1.20");
        assert_eq!(config.port, 80);
        assert_eq!(config.passkey.as_deref(), Some("abc"));
        assert_eq!(config.request_timeout_secs, 10);

        let yaml_path = dir.path().join("bsblan.yaml");
        tokio::fs::write(&yaml_path, "host: heater.local\nport: 8080\nrequest_timeout_secs: 3\n")
            .await
            .unwrap();
        let config = BsbLanConfig::load(&yaml_path).await.unwrap();
        assert_eq!(config.host, "heater.local");
        assert_eq!(config.port, 8080);
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_load_unknown_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bsblan.ini");
        tokio::fs::write(&path, "host=x").await.unwrap();

        let err = BsbLanConfig::load(&path).await.unwrap_err();
        assert!(matches!(err, BsbLanError::Config(_)));
    }
}
