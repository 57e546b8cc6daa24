//! # Core Domain Entities
//!
//! Replica identities, key-version metadata and rate-limit domain state.

use serde::{Deserialize, Serialize};

/// One signer replica. Loaded once from configuration and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignerReplica {
    /// Primary base URL, e.g. `https://signer-1.example`.
    pub url: String,
    /// Secondary base URL tried once after a transport failure on `url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_url: Option<String>,
}

impl SignerReplica {
    /// Replica without a fallback address.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            fallback_url: None,
        }
    }

    /// Attach a fallback address.
    pub fn with_fallback(mut self, fallback_url: impl Into<String>) -> Self {
        self.fallback_url = Some(fallback_url.into());
        self
    }
}

/// Threshold key material for one key version.
///
/// The private key is distributed across the replicas; the combiner only
/// ever holds the public side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyVersionInfo {
    /// Version number sent in the key-version header.
    pub key_version: u32,
    /// Shares required to reconstruct a signature.
    pub threshold: usize,
    /// Compressed group public key.
    #[serde(with = "base64_bytes")]
    pub public_key: Vec<u8>,
    /// Concatenated compressed coefficients of the public polynomial.
    #[serde(with = "base64_bytes")]
    pub polynomial: Vec<u8>,
}

/// Rate-limit state of a sequential-delay domain as reported by one signer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DomainState {
    /// Accepted queries so far.
    pub counter: u64,
    /// Unix seconds after which the next query is accepted.
    pub timer: u64,
    /// Whether the domain has been disabled permanently.
    pub disabled: bool,
    /// Signer's clock when the state was read.
    pub now: u64,
}

impl DomainState {
    /// Returned when too few replicas report the domain as enabled.
    pub const DISABLED: DomainState = DomainState {
        counter: 0,
        timer: 0,
        disabled: true,
        now: 0,
    };
}

/// Identifier of the only domain type the combiner accepts.
pub const SEQUENTIAL_DELAY_DOMAIN_NAME: &str = "ODIS Sequential Delay Domain";

/// Version string of [`SEQUENTIAL_DELAY_DOMAIN_NAME`].
pub const SEQUENTIAL_DELAY_DOMAIN_VERSION: &str = "1";

/// Optional value in the EIP-712 encoding used by domain requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eip712Optional<T> {
    /// Whether `value` carries meaning.
    pub defined: bool,
    /// Payload, `null` when undefined.
    #[serde(default)]
    pub value: Option<T>,
}

impl<T> Eip712Optional<T> {
    /// An undefined value.
    pub fn undefined() -> Self {
        Self {
            defined: false,
            value: None,
        }
    }

    /// A defined value.
    pub fn defined(value: T) -> Self {
        Self {
            defined: true,
            value: Some(value),
        }
    }

    /// The value, only if it is both defined and present.
    pub fn get(&self) -> Option<&T> {
        if self.defined {
            self.value.as_ref()
        } else {
            None
        }
    }
}

impl<T> Default for Eip712Optional<T> {
    fn default() -> Self {
        Self::undefined()
    }
}

/// One stage of a sequential-delay rate limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequentialDelayStage {
    /// Seconds each batch is delayed relative to the timer.
    pub delay: u64,
    #[serde(default)]
    pub reset_timer: Eip712Optional<bool>,
    #[serde(default)]
    pub batch_size: Eip712Optional<u64>,
    #[serde(default)]
    pub repetitions: Eip712Optional<u64>,
}

/// A rate-limited domain chosen by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequentialDelayDomain {
    pub name: String,
    pub version: String,
    pub stages: Vec<SequentialDelayStage>,
    /// Address whose signature authenticates requests.
    #[serde(default)]
    pub address: Eip712Optional<String>,
    #[serde(default)]
    pub salt: Eip712Optional<String>,
}

/// Per-request options for a domain request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SequentialDelayDomainOptions {
    /// EIP-712 signature by the domain address.
    #[serde(default)]
    pub signature: Eip712Optional<String>,
    /// Replay-protection counter. Required whenever a signature is present.
    #[serde(default)]
    pub nonce: Eip712Optional<u64>,
}

/// Serde adapter for byte fields carried as standard base64 strings.
pub mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
