//! In-memory signer replicas for router tests.
//!
//! Each replica answers with real partial signatures minted from a
//! [`ThresholdKeySet`], or misbehaves as scripted.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{json, Value};
use shared_crypto::testing::ThresholdKeySet;
use shared_types::{
    DisableDomainResponse, DomainQuotaStatusResponse, DomainRestrictedSignatureRequest,
    DomainRestrictedSignatureResponse, DomainState, ErrorMessage, KeyVersionInfo, PnpQuotaResponse,
    SignMessageRequest, SignMessageResponse, SignerEndpoint, SignerReplica,
    SEQUENTIAL_DELAY_DOMAIN_NAME, SEQUENTIAL_DELAY_DOMAIN_VERSION,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tc_03_signer_dispatch::{SignerHttpResponse, SignerRequest, SignerTransport, TransportError};

use crate::domain::config::{CombinerConfig, KeysConfig, ServiceConfig};
use crate::VERSION;

pub const ACCOUNT: &str = "0x1be31a94361a391bbafb2a4ccd704f57dc04d4bb";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignerBehavior {
    Honest,
    /// Signs a different message
    BadShare,
    /// Fails with this HTTP status
    Status(u16),
}

struct MockState {
    keys: ThresholdKeySet,
    behaviors: Mutex<Vec<SignerBehavior>>,
    calls: AtomicUsize,
}

#[derive(Clone)]
pub struct MockSigners {
    state: Arc<MockState>,
}

impl MockSigners {
    pub fn new(keys: ThresholdKeySet) -> Self {
        let behaviors = vec![SignerBehavior::Honest; keys.replicas()];
        Self {
            state: Arc::new(MockState {
                keys,
                behaviors: Mutex::new(behaviors),
                calls: AtomicUsize::new(0),
            }),
        }
    }

    pub fn set(&self, replica: usize, behavior: SignerBehavior) {
        self.state.behaviors.lock()[replica] = behavior;
    }

    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    pub fn keys(&self) -> &ThresholdKeySet {
        &self.state.keys
    }

    pub fn replicas(&self) -> Vec<SignerReplica> {
        (0..self.state.keys.replicas())
            .map(|i| SignerReplica::new(format!("http://signer{i}")))
            .collect()
    }

    pub fn transport(&self) -> Arc<dyn SignerTransport> {
        Arc::new(self.clone())
    }

    fn answer(&self, index: u32, request: &SignerRequest) -> Result<Value, TransportError> {
        let keys = &self.state.keys;
        let bad = self.state.behaviors.lock()[index as usize] == SignerBehavior::BadShare;
        let invalid = |e: String| TransportError::InvalidRequest(e);

        let value = match request.endpoint {
            SignerEndpoint::PnpSign => {
                let req: SignMessageRequest =
                    serde_json::from_slice(&request.body).map_err(|e| invalid(e.to_string()))?;
                let mut blinded = BASE64
                    .decode(&req.blinded_query_phone_number)
                    .map_err(|e| invalid(e.to_string()))?;
                if bad {
                    blinded = ThresholdKeySet::blind_message(b"some other message");
                }
                let share = keys
                    .sign_partial(index, &blinded)
                    .map_err(|e| invalid(e.to_string()))?;
                to_value(SignMessageResponse::ok(VERSION, BASE64.encode(share), 1, 10, Some(100), vec![]))
            }
            SignerEndpoint::PnpQuota => to_value(PnpQuotaResponse::ok(VERSION, 1, 10, Some(100), vec![])),
            SignerEndpoint::DomainSign => {
                let req: DomainRestrictedSignatureRequest =
                    serde_json::from_slice(&request.body).map_err(|e| invalid(e.to_string()))?;
                let input = BASE64
                    .decode(&req.blinded_message)
                    .map_err(|e| invalid(e.to_string()))?;
                let share = keys
                    .evaluate_poprf_partial(index, &input)
                    .map_err(|e| invalid(e.to_string()))?;
                to_value(DomainRestrictedSignatureResponse::ok(
                    VERSION,
                    BASE64.encode(share),
                    domain_state(false),
                    vec![],
                ))
            }
            SignerEndpoint::DomainQuotaStatus => {
                to_value(DomainQuotaStatusResponse::ok(VERSION, domain_state(false), vec![]))
            }
            SignerEndpoint::DisableDomain => {
                to_value(DisableDomainResponse::ok(VERSION, domain_state(true), vec![]))
            }
        };
        Ok(value)
    }
}

#[async_trait]
impl SignerTransport for MockSigners {
    async fn send(&self, base_url: &str, request: &SignerRequest) -> Result<SignerHttpResponse, TransportError> {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        let index: u32 = base_url
            .strip_prefix("http://signer")
            .and_then(|i| i.parse().ok())
            .ok_or_else(|| TransportError::Request(format!("unknown signer {base_url}")))?;

        let behavior = self.state.behaviors.lock()[index as usize];
        let (status, body) = match behavior {
            SignerBehavior::Status(status) => (
                status,
                json!({
                    "success": false,
                    "version": VERSION,
                    "error": ErrorMessage::UnknownError.as_str(),
                }),
            ),
            _ => (200, self.answer(index, request)?),
        };
        Ok(SignerHttpResponse {
            status,
            key_version: Some(request.key_version.to_string()),
            body: Bytes::from(body.to_string()),
        })
    }
}

fn to_value<T: Serialize>(response: T) -> Value {
    serde_json::to_value(response).unwrap_or(Value::Null)
}

fn domain_state(disabled: bool) -> DomainState {
    DomainState {
        counter: 1,
        timer: 0,
        disabled,
        now: 100,
    }
}

/// Both services enabled against `signers`, sharing one key set.
pub fn enabled_config(signers: &MockSigners) -> CombinerConfig {
    let keys = signers.keys();
    let service = ServiceConfig {
        enabled: true,
        signers: signers.replicas(),
        timeout: Duration::from_secs(5),
        should_check_key_version: true,
        keys: KeysConfig {
            current_version: 1,
            versions: vec![KeyVersionInfo {
                key_version: 1,
                threshold: keys.threshold(),
                public_key: keys.public_key_bytes(),
                polynomial: keys.polynomial_bytes(),
            }],
        },
    };
    CombinerConfig {
        phone_number_privacy: service.clone(),
        domains: service,
        ..Default::default()
    }
}

pub fn pnp_sign_body(blinded: &[u8]) -> Value {
    json!({
        "account": ACCOUNT,
        "blindedQueryPhoneNumber": BASE64.encode(blinded),
    })
}

pub fn pnp_quota_body() -> Value {
    json!({ "account": ACCOUNT })
}

pub fn domain_request_body(kind: &str, blinded_message: Option<&[u8]>) -> Value {
    let undefined = json!({ "defined": false, "value": null });
    let mut body = json!({
        "type": kind,
        "domain": {
            "name": SEQUENTIAL_DELAY_DOMAIN_NAME,
            "version": SEQUENTIAL_DELAY_DOMAIN_VERSION,
            "stages": [{
                "delay": 0,
                "resetTimer": { "defined": true, "value": true },
                "batchSize": { "defined": true, "value": 1 },
                "repetitions": { "defined": true, "value": 10 },
            }],
            "address": undefined.clone(),
            "salt": undefined.clone(),
        },
        "options": { "signature": undefined.clone(), "nonce": undefined },
    });
    if let Some(blinded) = blinded_message {
        body["blindedMessage"] = Value::String(BASE64.encode(blinded));
    }
    body
}
