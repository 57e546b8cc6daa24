//! # Key Version Resolution
//!
//! Maps the client's key-version header to configured key material.
//! A missing or malformed header falls back to the current version; a
//! well-formed version that is not configured is rejected.

use shared_types::{KeyVersionInfo, WarningMessage};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

use super::config::KeysConfig;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyVersionError {
    #[error("key version {0} is not supported")]
    Unsupported(u32),
    #[error("current key version {0} is not configured")]
    MissingCurrent(u32),
}

/// Key versions of one service.
#[derive(Debug, Clone)]
pub struct KeyVersionRegistry {
    current: u32,
    versions: BTreeMap<u32, KeyVersionInfo>,
}

impl KeyVersionRegistry {
    pub fn new(keys: &KeysConfig) -> Result<Self, KeyVersionError> {
        let versions: BTreeMap<u32, KeyVersionInfo> = keys
            .versions
            .iter()
            .map(|k| (k.key_version, k.clone()))
            .collect();
        if !versions.contains_key(&keys.current_version) {
            return Err(KeyVersionError::MissingCurrent(keys.current_version));
        }
        Ok(Self {
            current: keys.current_version,
            versions,
        })
    }

    pub fn current(&self) -> Option<&KeyVersionInfo> {
        self.versions.get(&self.current)
    }

    pub fn get(&self, version: u32) -> Option<&KeyVersionInfo> {
        self.versions.get(&version)
    }

    /// Key material for a request carrying `header` as its key version.
    pub fn resolve(&self, header: Option<&str>) -> Result<&KeyVersionInfo, KeyVersionError> {
        let requested = match header.map(str::trim) {
            None | Some("") => self.current,
            Some(raw) => match raw.parse::<u32>() {
                Ok(version) => version,
                Err(_) => {
                    warn!(
                        header = raw,
                        default = self.current,
                        "{}, using default key version",
                        WarningMessage::InvalidKeyVersionRequest
                    );
                    self.current
                }
            },
        };
        self.versions
            .get(&requested)
            .ok_or(KeyVersionError::Unsupported(requested))
    }
}
