//! # Dispatch Behaviour Over Real Sockets
//!
//! Deadlines, fallback URLs, early return once the threshold is met, and
//! early abort once it no longer can be.

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use shared_crypto::testing::ThresholdKeySet;
    use shared_types::{ErrorMessage, SignerReplica};
    use tc_04_combiner_gateway::CombinerConfig;

    use crate::fixtures::{
        pnp_sign_body, service_config, unreachable_url, Behavior, RunningCombiner, SignerCluster,
        PHONE,
    };

    const SLOW: Duration = Duration::from_secs(10);

    async fn combiner_for(cluster: &SignerCluster, replicas: Vec<SignerReplica>, timeout: Duration) -> RunningCombiner {
        RunningCombiner::start(CombinerConfig {
            phone_number_privacy: service_config(replicas, cluster.key_version(), timeout),
            ..Default::default()
        })
        .await
    }

    #[tokio::test]
    async fn test_returns_once_threshold_reached() {
        let cluster = SignerCluster::start(2, 3, 300).await;
        cluster.set(2, Behavior::Delay(SLOW));
        let combiner = RunningCombiner::for_cluster(&cluster, Duration::from_secs(30)).await;
        let blinded = ThresholdKeySet::blind_message(PHONE);

        let started = Instant::now();
        let reply = combiner
            .post("/getBlindedMessageSignature", &pnp_sign_body(&blinded), Some("Bearer sig"))
            .await;

        assert_eq!(reply.status, 200);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(
            reply.body["signature"],
            BASE64.encode(cluster.keys().sign(&blinded).unwrap())
        );
    }

    #[tokio::test]
    async fn test_aborts_once_threshold_unreachable() {
        let cluster = SignerCluster::start(2, 3, 301).await;
        cluster.set(0, Behavior::Status(500));
        cluster.set(1, Behavior::Status(500));
        cluster.set(2, Behavior::Delay(SLOW));
        let combiner = RunningCombiner::for_cluster(&cluster, Duration::from_secs(30)).await;
        let blinded = ThresholdKeySet::blind_message(PHONE);

        let started = Instant::now();
        let reply = combiner
            .post("/getBlindedMessageSignature", &pnp_sign_body(&blinded), Some("Bearer sig"))
            .await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(reply.status, 500);
        assert_eq!(reply.body["error"], ErrorMessage::NotEnoughPartialSignatures.as_str());
    }

    #[tokio::test]
    async fn test_deadline_cancels_slow_signers() {
        let cluster = SignerCluster::start(2, 3, 302).await;
        for i in 0..3 {
            cluster.set(i, Behavior::Delay(SLOW));
        }
        let combiner = RunningCombiner::for_cluster(&cluster, Duration::from_millis(300)).await;
        let blinded = ThresholdKeySet::blind_message(PHONE);

        let started = Instant::now();
        let reply = combiner
            .post("/getBlindedMessageSignature", &pnp_sign_body(&blinded), Some("Bearer sig"))
            .await;

        assert!(started.elapsed() < Duration::from_secs(5));
        // Timeouts are not counted toward the majority code.
        assert_eq!(reply.status, 500);
        assert_eq!(reply.body["error"], ErrorMessage::NotEnoughPartialSignatures.as_str());
    }

    #[tokio::test]
    async fn test_fallback_url_used_when_primary_unreachable() {
        let cluster = SignerCluster::start(2, 3, 303).await;
        cluster.set(1, Behavior::Status(500));
        let replicas = vec![
            SignerReplica::new(unreachable_url().await).with_fallback(cluster.url(0)),
            SignerReplica::new(cluster.url(1)),
            SignerReplica::new(cluster.url(2)),
        ];
        let combiner = combiner_for(&cluster, replicas, Duration::from_secs(5)).await;
        let blinded = ThresholdKeySet::blind_message(PHONE);

        let reply = combiner
            .post("/getBlindedMessageSignature", &pnp_sign_body(&blinded), Some("Bearer sig"))
            .await;

        assert_eq!(reply.status, 200);
        assert_eq!(cluster.calls(0), 1);
        assert_eq!(
            reply.body["signature"],
            BASE64.encode(cluster.keys().sign(&blinded).unwrap())
        );
    }

    #[tokio::test]
    async fn test_error_status_is_not_retried_on_fallback() {
        let cluster = SignerCluster::start(2, 3, 304).await;
        cluster.set(0, Behavior::Status(503));
        let replicas = vec![
            SignerReplica::new(cluster.url(0)).with_fallback(cluster.url(1)),
            SignerReplica::new(cluster.url(1)),
            SignerReplica::new(cluster.url(2)),
        ];
        let combiner = combiner_for(&cluster, replicas, Duration::from_secs(5)).await;
        let blinded = ThresholdKeySet::blind_message(PHONE);

        let reply = combiner
            .post("/getBlindedMessageSignature", &pnp_sign_body(&blinded), Some("Bearer sig"))
            .await;

        assert_eq!(reply.status, 200);
        assert_eq!(cluster.calls(0), 1);
        assert_eq!(cluster.calls(1), 1);
    }

    #[tokio::test]
    async fn test_unreachable_signers_report_bad_gateway() {
        let cluster = SignerCluster::start(2, 3, 305).await;
        let replicas = vec![
            SignerReplica::new(unreachable_url().await),
            SignerReplica::new(unreachable_url().await),
            SignerReplica::new(cluster.url(2)),
        ];
        let combiner = combiner_for(&cluster, replicas, Duration::from_secs(5)).await;
        let blinded = ThresholdKeySet::blind_message(PHONE);

        let reply = combiner
            .post("/getBlindedMessageSignature", &pnp_sign_body(&blinded), Some("Bearer sig"))
            .await;

        assert_eq!(reply.status, 502);
        assert_eq!(reply.body["error"], ErrorMessage::NotEnoughPartialSignatures.as_str());
    }

    #[tokio::test]
    async fn test_mismatched_key_version_counts_as_failure() {
        let cluster = SignerCluster::start(2, 3, 306).await;
        cluster.set(0, Behavior::WrongKeyVersion);
        let combiner = RunningCombiner::for_cluster(&cluster, Duration::from_secs(5)).await;
        let blinded = ThresholdKeySet::blind_message(PHONE);

        let reply = combiner
            .post("/getBlindedMessageSignature", &pnp_sign_body(&blinded), Some("Bearer sig"))
            .await;
        assert_eq!(reply.status, 200);

        cluster.set(1, Behavior::WrongKeyVersion);
        let reply = combiner
            .post("/getBlindedMessageSignature", &pnp_sign_body(&blinded), Some("Bearer sig"))
            .await;
        assert_eq!(reply.status, 502);
    }
}
