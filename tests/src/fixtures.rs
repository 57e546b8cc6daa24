//! # Loopback Fixtures
//!
//! A cluster of mock signer replicas, each an axum server on `127.0.0.1`,
//! and a harness that serves the real combiner against them.
//!
//! Replicas mint genuine partial signatures from a shared
//! [`ThresholdKeySet`], so the combined result can be checked against the
//! key set's own signature.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use parking_lot::Mutex;
use serde_json::{json, Value};
use shared_crypto::testing::ThresholdKeySet;
use shared_types::{
    DisableDomainResponse, DomainQuotaStatusResponse, DomainRestrictedSignatureRequest,
    DomainRestrictedSignatureResponse, DomainState, ErrorMessage, KeyVersionInfo, PnpQuotaResponse,
    SignMessageRequest, SignMessageResponse, SignerEndpoint, SignerReplica, KEY_VERSION_HEADER,
    SEQUENTIAL_DELAY_DOMAIN_NAME, SEQUENTIAL_DELAY_DOMAIN_VERSION, VERSION,
};
use tc_03_signer_dispatch::HttpSignerTransport;
use tc_04_combiner_gateway::{
    CombinerConfig, CombinerService, GatewayError, HeaderAuthenticator, KeysConfig, ServiceConfig,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub const ACCOUNT: &str = "0x1be31a94361a391bbafb2a4ccd704f57dc04d4bb";
pub const PHONE: &[u8] = b"+14155550123";

/// How one replica answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Honest,
    /// Signs a different message
    BadShare,
    /// Fails with this HTTP status
    Status(u16),
    /// Answers honestly after sleeping
    Delay(Duration),
    /// Answers honestly under a key version nobody asked for
    WrongKeyVersion,
}

/// Quota every honest replica reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    pub performed: u64,
    pub total: u64,
    pub block: u64,
}

impl Default for Quota {
    fn default() -> Self {
        Self {
            performed: 1,
            total: 10,
            block: 100,
        }
    }
}

// =============================================================================
// SIGNER REPLICAS
// =============================================================================

struct SignerNode {
    index: u32,
    keys: ThresholdKeySet,
    behavior: Mutex<Behavior>,
    quota: Mutex<Quota>,
    domain: Mutex<DomainState>,
    calls: AtomicUsize,
}

impl SignerNode {
    async fn answer(&self, endpoint: SignerEndpoint, headers: &HeaderMap, body: &[u8]) -> Response {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let behavior = *self.behavior.lock();
        if let Behavior::Delay(delay) = behavior {
            tokio::time::sleep(delay).await;
        }

        let key_version = match behavior {
            Behavior::WrongKeyVersion => "999".to_string(),
            _ => headers
                .get(KEY_VERSION_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("1")
                .to_string(),
        };
        let (status, body) = match behavior {
            Behavior::Status(code) => (
                StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                json!({
                    "success": false,
                    "version": VERSION,
                    "error": ErrorMessage::UnknownError.as_str(),
                }),
            ),
            _ => (
                StatusCode::OK,
                self.success_body(endpoint, body, behavior == Behavior::BadShare),
            ),
        };
        (status, [(KEY_VERSION_HEADER, key_version)], Json(body)).into_response()
    }

    fn success_body(&self, endpoint: SignerEndpoint, body: &[u8], bad: bool) -> Value {
        let quota = *self.quota.lock();
        let domain = *self.domain.lock();
        let value = match endpoint {
            SignerEndpoint::PnpSign => {
                let request: SignMessageRequest = serde_json::from_slice(body).expect("sign request");
                let mut blinded = BASE64
                    .decode(&request.blinded_query_phone_number)
                    .expect("base64 blinded message");
                if bad {
                    blinded = ThresholdKeySet::blind_message(b"some other message");
                }
                let share = self.keys.sign_partial(self.index, &blinded).expect("partial signature");
                serde_json::to_value(SignMessageResponse::ok(
                    VERSION,
                    BASE64.encode(share),
                    quota.performed,
                    quota.total,
                    Some(quota.block),
                    vec![],
                ))
            }
            SignerEndpoint::PnpQuota => serde_json::to_value(PnpQuotaResponse::ok(
                VERSION,
                quota.performed,
                quota.total,
                Some(quota.block),
                vec![],
            )),
            SignerEndpoint::DomainSign => {
                let request: DomainRestrictedSignatureRequest =
                    serde_json::from_slice(body).expect("domain sign request");
                let input = BASE64.decode(&request.blinded_message).expect("base64 input");
                let share = self
                    .keys
                    .evaluate_poprf_partial(self.index, &input)
                    .expect("partial evaluation");
                serde_json::to_value(DomainRestrictedSignatureResponse::ok(
                    VERSION,
                    BASE64.encode(share),
                    domain,
                    vec![],
                ))
            }
            SignerEndpoint::DomainQuotaStatus => {
                serde_json::to_value(DomainQuotaStatusResponse::ok(VERSION, domain, vec![]))
            }
            SignerEndpoint::DisableDomain => {
                let disabled = DomainState {
                    disabled: true,
                    ..domain
                };
                *self.domain.lock() = disabled;
                serde_json::to_value(DisableDomainResponse::ok(VERSION, disabled, vec![]))
            }
        };
        value.expect("serializable response")
    }
}

fn signer_router(node: Arc<SignerNode>) -> Router {
    let endpoints = [
        SignerEndpoint::PnpSign,
        SignerEndpoint::PnpQuota,
        SignerEndpoint::DomainSign,
        SignerEndpoint::DomainQuotaStatus,
        SignerEndpoint::DisableDomain,
    ];
    endpoints.into_iter().fold(Router::new(), |router, endpoint| {
        let node = Arc::clone(&node);
        router.route(
            endpoint.path(),
            post(move |headers: HeaderMap, body: Bytes| {
                let node = Arc::clone(&node);
                async move { node.answer(endpoint, &headers, &body).await }
            }),
        )
    })
}

/// Signer replicas listening on loopback.
pub struct SignerCluster {
    keys: ThresholdKeySet,
    nodes: Vec<Arc<SignerNode>>,
    urls: Vec<String>,
    servers: Vec<JoinHandle<()>>,
}

impl SignerCluster {
    pub async fn start(threshold: usize, replicas: usize, seed: u64) -> Self {
        let keys = ThresholdKeySet::from_seed(threshold, replicas, seed);
        let mut nodes = Vec::with_capacity(replicas);
        let mut urls = Vec::with_capacity(replicas);
        let mut servers = Vec::with_capacity(replicas);

        for index in 0..replicas {
            let node = Arc::new(SignerNode {
                index: index as u32,
                keys: keys.clone(),
                behavior: Mutex::new(Behavior::Honest),
                quota: Mutex::new(Quota::default()),
                domain: Mutex::new(DomainState {
                    counter: 1,
                    timer: 0,
                    disabled: false,
                    now: 100,
                }),
                calls: AtomicUsize::new(0),
            });
            let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind signer");
            let addr = listener.local_addr().expect("signer address");
            let router = signer_router(Arc::clone(&node));
            servers.push(tokio::spawn(async move {
                let _ = axum::serve(listener, router).await;
            }));
            urls.push(format!("http://{addr}"));
            nodes.push(node);
        }

        Self {
            keys,
            nodes,
            urls,
            servers,
        }
    }

    pub fn keys(&self) -> &ThresholdKeySet {
        &self.keys
    }

    pub fn url(&self, replica: usize) -> &str {
        &self.urls[replica]
    }

    pub fn set(&self, replica: usize, behavior: Behavior) {
        *self.nodes[replica].behavior.lock() = behavior;
    }

    pub fn set_quota(&self, replica: usize, quota: Quota) {
        *self.nodes[replica].quota.lock() = quota;
    }

    pub fn set_domain_state(&self, replica: usize, state: DomainState) {
        *self.nodes[replica].domain.lock() = state;
    }

    pub fn calls(&self, replica: usize) -> usize {
        self.nodes[replica].calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        (0..self.nodes.len()).map(|i| self.calls(i)).sum()
    }

    pub fn replicas(&self) -> Vec<SignerReplica> {
        self.urls.iter().map(SignerReplica::new).collect()
    }

    /// Key material matching what the replicas sign with, as key version 1.
    pub fn key_version(&self) -> KeyVersionInfo {
        KeyVersionInfo {
            key_version: 1,
            threshold: self.keys.threshold(),
            public_key: self.keys.public_key_bytes(),
            polynomial: self.keys.polynomial_bytes(),
        }
    }

    /// An enabled service backed by these replicas.
    pub fn service_config(&self, timeout: Duration) -> ServiceConfig {
        service_config(self.replicas(), self.key_version(), timeout)
    }
}

impl Drop for SignerCluster {
    fn drop(&mut self) {
        for server in &self.servers {
            server.abort();
        }
    }
}

pub fn service_config(signers: Vec<SignerReplica>, key: KeyVersionInfo, timeout: Duration) -> ServiceConfig {
    ServiceConfig {
        enabled: true,
        signers,
        timeout,
        should_check_key_version: true,
        keys: KeysConfig {
            current_version: key.key_version,
            versions: vec![key],
        },
    }
}

/// A loopback URL nothing listens on.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind probe");
    let addr: SocketAddr = listener.local_addr().expect("probe address");
    drop(listener);
    format!("http://{addr}")
}

// =============================================================================
// COMBINER HARNESS
// =============================================================================

/// Status, key-version header and JSON body of one combiner answer.
#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub key_version: Option<String>,
    pub body: Value,
}

/// The real combiner served on loopback.
pub struct RunningCombiner {
    base_url: String,
    client: reqwest::Client,
    shutdown: Option<oneshot::Sender<()>>,
    server: JoinHandle<Result<(), GatewayError>>,
}

impl RunningCombiner {
    pub async fn start(config: CombinerConfig) -> Self {
        let transport = HttpSignerTransport::new().expect("signer transport");
        let service = CombinerService::new(
            config,
            Arc::new(transport),
            Arc::new(HeaderAuthenticator::new()),
        )
        .expect("valid combiner config");

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind combiner");
        let addr = listener.local_addr().expect("combiner address");
        let (tx, rx) = oneshot::channel::<()>();
        let server = tokio::spawn(service.serve(listener, async move {
            let _ = rx.await;
        }));

        Self {
            base_url: format!("http://{addr}"),
            client: reqwest::Client::new(),
            shutdown: Some(tx),
            server,
        }
    }

    /// Both services served by `cluster`.
    pub async fn for_cluster(cluster: &SignerCluster, timeout: Duration) -> Self {
        let service = cluster.service_config(timeout);
        Self::start(CombinerConfig {
            phone_number_privacy: service.clone(),
            domains: service,
            ..Default::default()
        })
        .await
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn post(&self, path: &str, body: &Value, authorization: Option<&str>) -> Reply {
        let mut request = self.client.post(format!("{}{path}", self.base_url)).json(body);
        if let Some(authorization) = authorization {
            request = request.header(reqwest::header::AUTHORIZATION, authorization);
        }
        into_reply(request.send().await.expect("combiner reachable")).await
    }

    pub async fn get(&self, path: &str) -> Reply {
        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .expect("combiner reachable");
        into_reply(response).await
    }

    /// Trigger graceful shutdown and wait for the server to return.
    pub async fn stop(mut self) -> Result<(), GatewayError> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        (&mut self.server).await.expect("combiner task")
    }
}

impl Drop for RunningCombiner {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn into_reply(response: reqwest::Response) -> Reply {
    let status = response.status().as_u16();
    let key_version = response
        .headers()
        .get(KEY_VERSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let bytes = response.bytes().await.expect("response body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    Reply {
        status,
        key_version,
        body,
    }
}

// =============================================================================
// REQUEST BODIES
// =============================================================================

pub fn pnp_sign_body(blinded: &[u8]) -> Value {
    json!({
        "account": ACCOUNT,
        "blindedQueryPhoneNumber": BASE64.encode(blinded),
        "sessionID": "integration-session",
    })
}

pub fn pnp_quota_body() -> Value {
    json!({ "account": ACCOUNT })
}

pub fn domain_body(kind: &str, blinded_message: Option<&[u8]>) -> Value {
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
