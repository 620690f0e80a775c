//! Service address book loaded from the shared JSON config file.
//!
//! ```json
//! {
//!   "UserService": {"ip": "127.0.0.1", "port": 14001},
//!   "ProductService": {"ip": "127.0.0.1", "port": 15000},
//!   "OrderService": {"ip": "127.0.0.1", "port": 14000, "commit": "reserve"},
//!   "InterServiceCommunication": {"ip": "127.0.0.1", "port": 14002, "timeout_secs": 10}
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::domain::CommitStrategy;

pub const USER_SERVICE: &str = "UserService";
pub const PRODUCT_SERVICE: &str = "ProductService";
pub const ORDER_SERVICE: &str = "OrderService";
pub const GATEWAY_SERVICE: &str = "InterServiceCommunication";

pub const DEFAULT_DOWNSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config has no entry for {0}")]
    MissingService(String),
}

/// Network address of one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub ip: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(ip: impl Into<String>, port: u16) -> Self {
        Self { ip: ip.into(), port }
    }
}

impl From<SocketAddr> for Endpoint {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip().to_string(), addr.port())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceEntry {
    pub ip: String,
    #[serde(deserialize_with = "port_number_or_string")]
    pub port: u16,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub commit: Option<CommitStrategy>,
}

impl ServiceEntry {
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.ip.clone(), self.port)
    }
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    services: HashMap<String, ServiceEntry>,
}

impl ServiceConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let services: HashMap<String, ServiceEntry> = serde_json::from_str(raw)?;
        Ok(Self { services })
    }

    pub fn entry(&self, service: &str) -> Result<&ServiceEntry, ConfigError> {
        self.services
            .get(service)
            .ok_or_else(|| ConfigError::MissingService(service.to_string()))
    }

    pub fn endpoint(&self, service: &str) -> Result<Endpoint, ConfigError> {
        self.entry(service).map(ServiceEntry::endpoint)
    }

    /// Timeout for calls leaving `service`, falling back to ten seconds.
    pub fn downstream_timeout(&self, service: &str) -> Duration {
        self.services
            .get(service)
            .and_then(|entry| entry.timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_DOWNSTREAM_TIMEOUT)
    }

    pub fn commit_strategy(&self) -> CommitStrategy {
        self.services
            .get(ORDER_SERVICE)
            .and_then(|entry| entry.commit)
            .unwrap_or_default()
    }
}

fn port_number_or_string<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Number(port) => Ok(port),
        Port::Text(raw) => raw.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "UserService": {"ip": "127.0.0.1", "port": 14001},
        "ProductService": {"ip": "127.0.0.1", "port": "15000"},
        "OrderService": {"ip": "0.0.0.0", "port": 14000, "commit": "update"},
        "InterServiceCommunication": {"ip": "127.0.0.1", "port": 14002, "timeout_secs": 3}
    }"#;

    #[test]
    fn parses_numeric_and_string_ports() {
        let config = ServiceConfig::from_json(SAMPLE).unwrap();
        assert_eq!(config.endpoint(USER_SERVICE).unwrap(), Endpoint::new("127.0.0.1", 14001));
        assert_eq!(config.endpoint(PRODUCT_SERVICE).unwrap().port, 15000);
        assert_eq!(config.endpoint(ORDER_SERVICE).unwrap().to_string(), "0.0.0.0:14000");
    }

    #[test]
    fn optional_settings_fall_back_to_defaults() {
        let config = ServiceConfig::from_json(SAMPLE).unwrap();
        assert_eq!(config.commit_strategy(), CommitStrategy::Update);
        assert_eq!(config.downstream_timeout(GATEWAY_SERVICE), Duration::from_secs(3));
        assert_eq!(config.downstream_timeout(ORDER_SERVICE), DEFAULT_DOWNSTREAM_TIMEOUT);

        let minimal =
            ServiceConfig::from_json(r#"{"OrderService": {"ip": "127.0.0.1", "port": 1}}"#)
                .unwrap();
        assert_eq!(minimal.commit_strategy(), CommitStrategy::Reserve);
    }

    #[test]
    fn missing_service_is_reported_by_name() {
        let config = ServiceConfig::from_json(r#"{}"#).unwrap();
        let err = config.endpoint(GATEWAY_SERVICE).unwrap_err();
        assert!(matches!(err, ConfigError::MissingService(ref name) if name == GATEWAY_SERVICE));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = ServiceConfig::load(file.path()).unwrap();
        assert_eq!(config.endpoint(GATEWAY_SERVICE).unwrap().port, 14002);

        let missing = ServiceConfig::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(missing, ConfigError::Read { .. }));
    }
}
