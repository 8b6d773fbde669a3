//! # Client Configuration
//!
//! Settings fixed when a [`crate::UsersApi`] is built. The struct is
//! (de)serializable so applications can embed it in their own config files;
//! durations are written as whole milliseconds.
use crate::client::ConnectError;
use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};
use std::time::Duration;
use tonic::transport::Endpoint;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(10);
const DEFAULT_KEEPALIVE_TIMEOUT: Duration = Duration::from_secs(1);
const DEFAULT_HEALTH_SERVICE: &str = "userapi";

#[serde_as]
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ClientConfig {
    /// `host:port`, or a full URI such as `http://host:port`.
    pub address: String,
    /// Upper bound for every remote call.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "timeout_ms", default = "default_timeout")]
    pub timeout: Duration,
    /// Upper bound for establishing the TCP connection. Unbounded when unset.
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    #[serde(rename = "connect_timeout_ms", default)]
    pub connect_timeout: Option<Duration>,
    #[serde(default)]
    pub keepalive: KeepaliveConfig,
    /// Service name sent in `grpc.health.v1.Health/Check` requests.
    #[serde(default = "default_health_service")]
    pub health_service: String,
    /// Domain name verified against the server certificate. Enables TLS when set.
    #[cfg(feature = "tls")]
    #[serde(default)]
    pub tls_domain: Option<String>,
}

/// HTTP/2 keepalive pings sent on the connection.
#[serde_as]
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct KeepaliveConfig {
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "interval_ms")]
    pub interval: Duration,
    /// How long to wait for a ping ack before the connection is considered dead.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "timeout_ms")]
    pub timeout: Duration,
    /// Keep pinging when there are no active streams.
    pub while_idle: bool,
}

impl Default for KeepaliveConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_KEEPALIVE_INTERVAL,
            timeout: DEFAULT_KEEPALIVE_TIMEOUT,
            while_idle: true,
        }
    }
}

impl ClientConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: None,
            keepalive: KeepaliveConfig::default(),
            health_service: DEFAULT_HEALTH_SERVICE.to_string(),
            #[cfg(feature = "tls")]
            tls_domain: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = Some(connect_timeout);
        self
    }

    pub fn with_keepalive(mut self, keepalive: KeepaliveConfig) -> Self {
        self.keepalive = keepalive;
        self
    }

    pub fn with_health_service(mut self, service: impl Into<String>) -> Self {
        self.health_service = service.into();
        self
    }

    #[cfg(feature = "tls")]
    pub fn with_tls(mut self, domain: impl Into<String>) -> Self {
        self.tls_domain = Some(domain.into());
        self
    }

    /// The address as a URI. A bare `host:port` gets the scheme prepended.
    pub fn uri(&self) -> String {
        if self.address.contains("://") {
            return self.address.clone();
        }
        format!("{}://{}", self.scheme(), self.address)
    }

    #[cfg(feature = "tls")]
    fn scheme(&self) -> &'static str {
        if self.tls_domain.is_some() {
            "https"
        } else {
            "http"
        }
    }

    #[cfg(not(feature = "tls"))]
    fn scheme(&self) -> &'static str {
        "http"
    }

    /// Builds the transport endpoint, keepalive included. Does not dial.
    pub(crate) fn endpoint(&self) -> Result<Endpoint, ConnectError> {
        if self.address.trim().is_empty() {
            return Err(ConnectError::EmptyAddress);
        }

        let endpoint = Endpoint::new(self.uri())
            .map_err(|e| ConnectError::InvalidAddress(self.address.clone(), e))?
            .http2_keep_alive_interval(self.keepalive.interval)
            .keep_alive_timeout(self.keepalive.timeout)
            .keep_alive_while_idle(self.keepalive.while_idle);

        let endpoint = match self.connect_timeout {
            Some(connect_timeout) => endpoint.connect_timeout(connect_timeout),
            None => endpoint,
        };

        #[cfg(feature = "tls")]
        let endpoint = match &self.tls_domain {
            Some(domain) => endpoint
                .tls_config(
                    tonic::transport::ClientTlsConfig::new()
                        .domain_name(domain.clone())
                        .with_native_roots(),
                )
                .map_err(|e| ConnectError::InvalidAddress(self.address.clone(), e))?,
            None => endpoint,
        };

        Ok(endpoint)
    }
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_health_service() -> String {
    DEFAULT_HEALTH_SERVICE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::new("localhost:50051");

        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.keepalive.interval, Duration::from_secs(10));
        assert_eq!(config.keepalive.timeout, Duration::from_secs(1));
        assert!(config.keepalive.while_idle);
        assert_eq!(config.health_service, "userapi");
    }

    #[test]
    fn bare_address_gets_a_scheme() {
        assert_eq!(
            ClientConfig::new("localhost:50051").uri(),
            "http://localhost:50051"
        );
        assert_eq!(
            ClientConfig::new("http://10.0.0.1:9000").uri(),
            "http://10.0.0.1:9000"
        );
    }

    #[test]
    fn empty_address_is_rejected() {
        let result = ClientConfig::new("  ").endpoint();
        assert!(matches!(result, Err(ConnectError::EmptyAddress)));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{ "address": "users:50051", "timeout_ms": 1500 }"#).unwrap();

        assert_eq!(config.address, "users:50051");
        assert_eq!(config.timeout, Duration::from_millis(1500));
        assert_eq!(config.keepalive, KeepaliveConfig::default());
        assert_eq!(config.health_service, "userapi");
        assert_eq!(config.connect_timeout, None);
    }

    #[test]
    fn deserializes_connect_timeout() {
        let config: ClientConfig = serde_json::from_str(
            r#"{ "address": "users:50051", "connect_timeout_ms": 250 }"#,
        )
        .unwrap();

        assert_eq!(config.connect_timeout, Some(Duration::from_millis(250)));
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn serializes_durations_as_millis() {
        let config = ClientConfig::new("users:50051")
            .with_timeout(Duration::from_millis(1500))
            .with_connect_timeout(Duration::from_secs(2));

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["timeout_ms"], 1500);
        assert_eq!(json["connect_timeout_ms"], 2000);
        assert_eq!(json["keepalive"]["interval_ms"], 10_000);
        assert_eq!(json["keepalive"]["timeout_ms"], 1000);

        let back: ClientConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn oversized_timeout_is_not_truncated() {
        let config = ClientConfig::new("users:50051").with_timeout(Duration::MAX);

        // Either rejected outright or written without wrapping.
        if let Ok(json) = serde_json::to_string(&config) {
            let back: ClientConfig = serde_json::from_str(&json).unwrap();
            assert!(back.timeout >= Duration::from_millis(u64::MAX));
        }
    }
}
