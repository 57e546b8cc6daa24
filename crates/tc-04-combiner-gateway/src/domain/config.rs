//! Combiner configuration with validation.
//!
//! Loaded once at startup and shared read-only behind an `Arc`.

use serde::{Deserialize, Serialize};
use shared_crypto::points::decode_g2;
use shared_crypto::PublicPolynomial;
use shared_types::{KeyVersionInfo, SignerReplica};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use tc_02_state_reconciler::ReconcilerConfig;

/// Main combiner configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CombinerConfig {
    /// HTTP listener
    pub server: ServerConfig,
    /// Phone-number-privacy endpoints (BLS)
    pub phone_number_privacy: ServiceConfig,
    /// Domain endpoints (POPRF)
    pub domains: ServiceConfig,
    /// Signer disagreement tolerances
    pub discrepancy: ReconcilerConfig,
}

impl CombinerConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::InvalidLimit("max_body_bytes cannot be 0".into()));
        }
        self.phone_number_privacy
            .validate("phone_number_privacy", KeyScheme::ThresholdBls)?;
        self.domains.validate("domains", KeyScheme::Poprf)?;
        self.discrepancy.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }

    /// Listener address
    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.host, self.server.port)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 8081)
    pub port: u16,
    /// Largest accepted request body
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8081,
            max_body_bytes: 16 * 1024,
        }
    }
}

/// One family of endpoints and the replicas behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Disabled services answer 501 without contacting signers
    pub enabled: bool,
    pub signers: Vec<SignerReplica>,
    /// Deadline for one round of signer calls
    #[serde(with = "duration_str")]
    pub timeout: Duration,
    /// Reject signer responses whose key-version header differs
    pub should_check_key_version: bool,
    pub keys: KeysConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            signers: Vec::new(),
            timeout: Duration::from_secs(5),
            should_check_key_version: false,
            keys: KeysConfig::default(),
        }
    }
}

/// Key versions known to the combiner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeysConfig {
    /// Used when the client names no version
    pub current_version: u32,
    pub versions: Vec<KeyVersionInfo>,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            current_version: 1,
            versions: Vec::new(),
        }
    }
}

/// What the key material of a service is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyScheme {
    /// Needs the public polynomial to verify individual shares
    ThresholdBls,
    /// Only the group public key is meaningful
    Poprf,
}

impl ServiceConfig {
    fn validate(&self, service: &'static str, scheme: KeyScheme) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }
        if self.signers.is_empty() {
            return Err(ConfigError::NoSigners { service });
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(format!("{service} timeout cannot be 0")));
        }
        if !self
            .keys
            .versions
            .iter()
            .any(|k| k.key_version == self.keys.current_version)
        {
            return Err(ConfigError::MissingCurrentKeyVersion {
                service,
                version: self.keys.current_version,
            });
        }
        for (i, key) in self.keys.versions.iter().enumerate() {
            if self.keys.versions[..i]
                .iter()
                .any(|k| k.key_version == key.key_version)
            {
                return Err(ConfigError::DuplicateKeyVersion {
                    service,
                    version: key.key_version,
                });
            }
            if key.threshold == 0 || key.threshold > self.signers.len() {
                return Err(ConfigError::InvalidThreshold {
                    service,
                    version: key.key_version,
                    threshold: key.threshold,
                    signers: self.signers.len(),
                });
            }
            validate_key_material(key, scheme).map_err(|reason| ConfigError::InvalidKey {
                service,
                version: key.key_version,
                reason,
            })?;
        }
        Ok(())
    }
}

fn validate_key_material(key: &KeyVersionInfo, scheme: KeyScheme) -> Result<(), String> {
    let public_key = decode_g2(&key.public_key).map_err(|e| format!("public key: {e}"))?;
    if scheme == KeyScheme::Poprf && key.polynomial.is_empty() {
        return Ok(());
    }
    let polynomial =
        PublicPolynomial::from_bytes(&key.polynomial).map_err(|e| format!("polynomial: {e}"))?;
    if polynomial.threshold() != key.threshold {
        return Err(format!(
            "polynomial has {} coefficients but threshold is {}",
            polynomial.threshold(),
            key.threshold
        ));
    }
    if polynomial.public_key() != public_key {
        return Err("polynomial constant term does not match public key".into());
    }
    Ok(())
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("{service}: enabled service has no signers")]
    NoSigners { service: &'static str },
    #[error("{service}: current key version {version} is not configured")]
    MissingCurrentKeyVersion { service: &'static str, version: u32 },
    #[error("{service}: key version {version} configured twice")]
    DuplicateKeyVersion { service: &'static str, version: u32 },
    #[error("{service}: key version {version} threshold {threshold} not in 1..={signers}")]
    InvalidThreshold {
        service: &'static str,
        version: u32,
        threshold: usize,
        signers: usize,
    },
    #[error("{service}: key version {version}: {reason}")]
    InvalidKey {
        service: &'static str,
        version: u32,
        reason: String,
    },
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Durations written as `500ms`, `5s`, `1m` or plain seconds.
pub mod duration_str {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = duration.as_millis();
        if millis % 1000 == 0 {
            serializer.serialize_str(&format!("{}s", millis / 1000))
        } else {
            serializer.serialize_str(&format!("{millis}ms"))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub fn parse_duration(s: &str) -> Result<Duration, &'static str> {
        let s = s.trim();
        // "ms" must be tried before "s" and "m".
        if let Some(ms) = s.strip_suffix("ms") {
            ms.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| "invalid milliseconds")
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid seconds")
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.trim()
                .parse::<u64>()
                .ok()
                .and_then(|m| m.checked_mul(60))
                .map(Duration::from_secs)
                .ok_or("invalid minutes")
        } else {
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid duration format")
        }
    }
}
