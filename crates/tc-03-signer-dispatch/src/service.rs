//! # Signer Dispatcher
//!
//! Fan-out/fan-in over the configured replicas.
//!
//! ## Flow
//!
//! ```text
//! dispatch()
//!   ├── spawn one call task per replica ──► primary URL, fallback on transport error
//!   │        (each races the shared CancellationSignal)
//!   └── coordinator loop
//!          ├── outcome from a task ──► classify, record in Session,
//!          │                            quorum check / success callback
//!          └── deadline ──► cancel(Deadline)
//! ```
//!
//! The loop ends once every task has reported, which happens promptly after
//! any cancellation because in-flight calls are dropped.

use shared_types::{ErrorMessage, OdisResponse, SignerReplica, WarningMessage};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::domain::cancellation::CancelReason;
use crate::domain::codec::parse_signer_response;
use crate::domain::errors::TransportError;
use crate::domain::session::{Session, SYNTHETIC_FAILURE_STATUS, TIMEOUT_STATUS};
use crate::ports::outbound::{SignerHttpResponse, SignerRequest, SignerTransport};

/// Per-service dispatch settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Overall deadline for all replica calls, fallback retries included.
    pub timeout: Duration,
    /// Count a response as failed unless its key-version header matches.
    pub should_check_key_version: bool,
}

/// What a dispatch ended with. Responses stay in the [`Session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSummary {
    pub majority_error_code: Option<u16>,
    pub cancel_reason: Option<CancelReason>,
    pub successes: usize,
    pub failures: usize,
    pub elapsed: Duration,
}

enum CallResult {
    Response(SignerHttpResponse),
    Transport(TransportError),
    Cancelled,
}

struct ReplicaOutcome {
    url: String,
    elapsed: Duration,
    result: CallResult,
}

/// Dispatches requests through a shared transport.
pub struct SignerDispatcher<T: ?Sized = dyn SignerTransport> {
    transport: Arc<T>,
}

impl<T: ?Sized> Clone for SignerDispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: SignerTransport + ?Sized> SignerDispatcher<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// Send `request` to every replica and record the outcomes in `session`.
    ///
    /// `on_success` sees each schema-valid successful response as it arrives,
    /// with the replica's primary URL. Returning `true` means the caller has
    /// enough and outstanding calls are cancelled.
    ///
    /// Never fails: replica failures become counted error codes.
    pub async fn dispatch<R, F>(
        &self,
        session: &mut Session<R>,
        replicas: &[SignerReplica],
        request: SignerRequest,
        options: DispatchOptions,
        mut on_success: F,
    ) -> DispatchSummary
    where
        R: OdisResponse,
        F: FnMut(&str, &R) -> bool,
    {
        let started = Instant::now();
        let session_id = session.id();
        let expected_key_version = options
            .should_check_key_version
            .then_some(request.key_version);

        if session.quorum_unreachable() && session.cancel(CancelReason::QuorumUnreachable) {
            warn!(
                %session_id,
                replicas = replicas.len(),
                threshold = session.threshold(),
                "Fewer replicas than threshold, not waiting for signers"
            );
        }

        debug!(
            %session_id,
            endpoint = %request.endpoint,
            replicas = replicas.len(),
            timeout_ms = options.timeout.as_millis() as u64,
            "Dispatching to signers"
        );

        let request = Arc::new(request);
        let (tx, mut rx) = mpsc::channel(replicas.len().max(1));
        let mut calls = JoinSet::new();
        for replica in replicas {
            let transport = Arc::clone(&self.transport);
            let request = Arc::clone(&request);
            let cancellation = session.cancellation().clone();
            let replica = replica.clone();
            let tx = tx.clone();
            calls.spawn(async move {
                let call_started = Instant::now();
                let result = tokio::select! {
                    _ = cancellation.cancelled() => CallResult::Cancelled,
                    result = call_replica(transport.as_ref(), &replica, &request) => match result {
                        Ok(response) => CallResult::Response(response),
                        Err(e) => CallResult::Transport(e),
                    },
                };
                let _ = tx
                    .send(ReplicaOutcome {
                        url: replica.url,
                        elapsed: call_started.elapsed(),
                        result,
                    })
                    .await;
            });
        }
        drop(tx);

        let deadline = tokio::time::sleep(options.timeout);
        tokio::pin!(deadline);
        loop {
            tokio::select! {
                outcome = rx.recv() => match outcome {
                    Some(outcome) => {
                        record_outcome(session, outcome, expected_key_version, &mut on_success);
                    }
                    None => break,
                },
                () = &mut deadline, if !session.is_cancelled() => {
                    if session.cancel(CancelReason::Deadline) {
                        warn!(
                            %session_id,
                            timeout_ms = options.timeout.as_millis() as u64,
                            "Signer deadline reached, cancelling outstanding requests"
                        );
                    }
                }
            }
        }

        // Every sender is gone, so every call task has returned.
        while let Some(joined) = calls.join_next().await {
            if let Err(e) = joined {
                error!(%session_id, error = %e, "Signer call task failed");
            }
        }

        session.log_error_code_inconsistency();
        let summary = DispatchSummary {
            majority_error_code: session.majority_error_code(),
            cancel_reason: session.cancel_reason(),
            successes: session.responses().len(),
            failures: session.failed_replicas().len(),
            elapsed: started.elapsed(),
        };
        info!(
            %session_id,
            successes = summary.successes,
            failures = summary.failures,
            majority_error_code = ?summary.majority_error_code,
            cancel_reason = ?summary.cancel_reason,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Signer dispatch complete"
        );
        summary
    }
}

/// Call the primary URL, then the fallback once if the primary could not be
/// reached. HTTP error statuses are answers and are never retried.
async fn call_replica<T: SignerTransport + ?Sized>(
    transport: &T,
    replica: &SignerReplica,
    request: &SignerRequest,
) -> Result<SignerHttpResponse, TransportError> {
    match transport.send(&replica.url, request).await {
        Ok(response) => Ok(response),
        Err(e) => match &replica.fallback_url {
            Some(fallback) => {
                error!(signer = %replica.url, error = %e, "Signer failed with primary url");
                warn!(signer = %replica.url, fallback = %fallback, "Using fallback url to call signer");
                transport.send(fallback, request).await
            }
            None => Err(e),
        },
    }
}

fn record_outcome<R, F>(
    session: &mut Session<R>,
    outcome: ReplicaOutcome,
    expected_key_version: Option<u32>,
    on_success: &mut F,
) where
    R: OdisResponse,
    F: FnMut(&str, &R) -> bool,
{
    let ReplicaOutcome { url, elapsed, result } = outcome;
    let elapsed_ms = elapsed.as_millis() as u64;
    let session_id = session.id();

    let failure_status = match result {
        CallResult::Cancelled if session.timed_out() => {
            error!(%session_id, signer = %url, elapsed_ms, "{}", ErrorMessage::TimeoutFromSigner);
            TIMEOUT_STATUS
        }
        CallResult::Cancelled => {
            info!(
                %session_id,
                signer = %url,
                elapsed_ms,
                reason = ?session.cancel_reason(),
                "{}",
                WarningMessage::CancelledRequestToSigner
            );
            // Already decided; a straggler is not a failure.
            return;
        }
        CallResult::Transport(e) => {
            error!(%session_id, signer = %url, elapsed_ms, error = %e, "{}", ErrorMessage::SignerRequestError);
            SYNTHETIC_FAILURE_STATUS
        }
        CallResult::Response(response) => {
            info!(%session_id, signer = %url, status = response.status, elapsed_ms, "Received signer response");
            match classify::<R>(&url, &response, expected_key_version) {
                Ok(parsed) => {
                    let done = on_success(&url, &parsed);
                    session.record_response(url, parsed, response.status);
                    if done && session.cancel(CancelReason::ThresholdReached) {
                        info!(%session_id, "Threshold reached, cancelling outstanding signer requests");
                    }
                    return;
                }
                Err(status) => status,
            }
        }
    };

    session.record_failure(&url, Some(failure_status));
    if session.quorum_unreachable() && session.cancel(CancelReason::QuorumUnreachable) {
        warn!(
            %session_id,
            failed = session.failed_replicas().len(),
            total = session.total_replicas(),
            threshold = session.threshold(),
            "Threshold unreachable, cancelling outstanding signer requests"
        );
    }
}

/// Turn a received HTTP answer into a usable response or the status to count.
fn classify<R: OdisResponse>(
    url: &str,
    response: &SignerHttpResponse,
    expected_key_version: Option<u32>,
) -> Result<R, u16> {
    if !response.is_success() {
        warn!(
            signer = %url,
            status = response.status,
            body = %String::from_utf8_lossy(&response.body),
            "Signer responded with error status"
        );
        return Err(response.status);
    }

    if let Some(expected) = expected_key_version {
        let reported = response
            .key_version
            .as_deref()
            .and_then(|v| v.trim().parse::<u32>().ok());
        if reported != Some(expected) {
            error!(
                signer = %url,
                expected,
                reported = ?response.key_version,
                "{}",
                ErrorMessage::InvalidKeyVersionResponse
            );
            return Err(SYNTHETIC_FAILURE_STATUS);
        }
    }

    let parsed: R = parse_signer_response(&response.body).map_err(|e| {
        error!(signer = %url, error = %e, "{}", ErrorMessage::InvalidSignerResponse);
        SYNTHETIC_FAILURE_STATUS
    })?;

    if !parsed.success() {
        error!(
            signer = %url,
            error = ?parsed.error(),
            "{}",
            ErrorMessage::SignerResponseFailedWithOkStatus
        );
        return Err(SYNTHETIC_FAILURE_STATUS);
    }

    Ok(parsed)
}
