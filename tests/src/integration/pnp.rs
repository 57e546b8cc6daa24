//! # Phone Number Privacy Flows
//!
//! Blind signing and quota lookups against three loopback replicas with a
//! threshold of two.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use serde_json::Value;
    use shared_crypto::testing::ThresholdKeySet;
    use shared_types::{ErrorMessage, WarningMessage, VERSION};

    use crate::fixtures::{
        pnp_quota_body, pnp_sign_body, Behavior, Quota, RunningCombiner, SignerCluster, PHONE,
    };

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn warnings(body: &Value) -> Vec<String> {
        body["warnings"]
            .as_array()
            .map(|w| w.iter().filter_map(|v| v.as_str().map(str::to_owned)).collect())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_status_reports_version() {
        let cluster = SignerCluster::start(2, 3, 100).await;
        let combiner = RunningCombiner::for_cluster(&cluster, TIMEOUT).await;

        let reply = combiner.get("/status").await;
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body["version"], VERSION);
        assert_eq!(cluster.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_sign_matches_group_signature() {
        let cluster = SignerCluster::start(2, 3, 101).await;
        let combiner = RunningCombiner::for_cluster(&cluster, TIMEOUT).await;
        let blinded = ThresholdKeySet::blind_message(PHONE);

        let reply = combiner
            .post("/getBlindedMessageSignature", &pnp_sign_body(&blinded), Some("Bearer sig"))
            .await;

        assert_eq!(reply.status, 200);
        assert_eq!(reply.body["success"], true);
        assert_eq!(
            reply.body["signature"],
            BASE64.encode(cluster.keys().sign(&blinded).unwrap())
        );
        assert_eq!(reply.body["performedQueryCount"], 1);
        assert_eq!(reply.body["totalQuota"], 10);
        assert_eq!(reply.body["blockNumber"], 100);
        assert_eq!(reply.key_version.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_sign_prunes_bad_share() {
        let cluster = SignerCluster::start(2, 3, 102).await;
        cluster.set(1, Behavior::BadShare);
        let combiner = RunningCombiner::for_cluster(&cluster, TIMEOUT).await;
        let blinded = ThresholdKeySet::blind_message(PHONE);

        let reply = combiner
            .post("/getBlindedMessageSignature", &pnp_sign_body(&blinded), Some("Bearer sig"))
            .await;

        assert_eq!(reply.status, 200);
        assert_eq!(
            reply.body["signature"],
            BASE64.encode(cluster.keys().sign(&blinded).unwrap())
        );
    }

    #[tokio::test]
    async fn test_sign_with_two_bad_shares_fails() {
        let cluster = SignerCluster::start(2, 3, 103).await;
        cluster.set(0, Behavior::BadShare);
        cluster.set(2, Behavior::BadShare);
        let combiner = RunningCombiner::for_cluster(&cluster, TIMEOUT).await;
        let blinded = ThresholdKeySet::blind_message(PHONE);

        let reply = combiner
            .post("/getBlindedMessageSignature", &pnp_sign_body(&blinded), Some("Bearer sig"))
            .await;

        assert_eq!(reply.status, 500);
        assert_eq!(reply.body["success"], false);
        assert_eq!(reply.body["error"], ErrorMessage::NotEnoughPartialSignatures.as_str());
    }

    #[tokio::test]
    async fn test_sign_exceeded_quota_is_forwarded() {
        let cluster = SignerCluster::start(2, 3, 104).await;
        for i in 0..3 {
            cluster.set(i, Behavior::Status(403));
        }
        let combiner = RunningCombiner::for_cluster(&cluster, TIMEOUT).await;
        let blinded = ThresholdKeySet::blind_message(PHONE);

        let reply = combiner
            .post("/getBlindedMessageSignature", &pnp_sign_body(&blinded), Some("Bearer sig"))
            .await;

        assert_eq!(reply.status, 403);
        assert_eq!(reply.body["error"], WarningMessage::ExceededQuota.as_str());
    }

    #[tokio::test]
    async fn test_sign_requires_authorization() {
        let cluster = SignerCluster::start(2, 3, 105).await;
        let combiner = RunningCombiner::for_cluster(&cluster, TIMEOUT).await;
        let blinded = ThresholdKeySet::blind_message(PHONE);

        let reply = combiner
            .post("/getBlindedMessageSignature", &pnp_sign_body(&blinded), None)
            .await;

        assert_eq!(reply.status, 401);
        assert_eq!(reply.body["error"], WarningMessage::UnauthenticatedUser.as_str());
        assert_eq!(cluster.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_sign_rejects_malformed_point() {
        let cluster = SignerCluster::start(2, 3, 106).await;
        let combiner = RunningCombiner::for_cluster(&cluster, TIMEOUT).await;

        let reply = combiner
            .post("/getBlindedMessageSignature", &pnp_sign_body(&[7u8; 48]), Some("Bearer sig"))
            .await;

        assert_eq!(reply.status, 400);
        assert_eq!(reply.body["error"], WarningMessage::InvalidInput.as_str());
        assert_eq!(cluster.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_quota_uses_threshold_rank() {
        let cluster = SignerCluster::start(2, 3, 107).await;
        cluster.set_quota(0, Quota { performed: 1, total: 10, block: 100 });
        cluster.set_quota(1, Quota { performed: 2, total: 10, block: 101 });
        cluster.set_quota(2, Quota { performed: 3, total: 11, block: 102 });
        let combiner = RunningCombiner::for_cluster(&cluster, TIMEOUT).await;

        let reply = combiner.post("/getQuotaStatus", &pnp_quota_body(), Some("Bearer sig")).await;

        assert_eq!(reply.status, 200);
        assert_eq!(reply.body["performedQueryCount"], 2);
        assert_eq!(reply.body["totalQuota"], 10);
        assert!(warnings(&reply.body)
            .iter()
            .any(|w| w.starts_with(WarningMessage::InconsistentSignerQuotaMeasurements.as_str())));
        assert_eq!(cluster.total_calls(), 3);
    }

    #[tokio::test]
    async fn test_quota_spread_too_wide() {
        let cluster = SignerCluster::start(2, 3, 108).await;
        cluster.set_quota(2, Quota { performed: 1, total: 1000, block: 100 });
        let combiner = RunningCombiner::for_cluster(&cluster, TIMEOUT).await;

        let reply = combiner.post("/getQuotaStatus", &pnp_quota_body(), Some("Bearer sig")).await;

        assert_eq!(reply.status, 500);
        assert_eq!(
            reply.body["error"],
            WarningMessage::InconsistentSignerQuotaMeasurements.as_str()
        );
    }

    #[tokio::test]
    async fn test_unknown_key_version_rejected() {
        let cluster = SignerCluster::start(2, 3, 109).await;
        let combiner = RunningCombiner::for_cluster(&cluster, TIMEOUT).await;
        let blinded = ThresholdKeySet::blind_message(PHONE);

        let client = reqwest::Client::new();
        let response = client
            .post(format!("{}/getBlindedMessageSignature", combiner.base_url()))
            .header("authorization", "Bearer sig")
            .header(shared_types::KEY_VERSION_HEADER, "7")
            .json(&pnp_sign_body(&blinded))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], WarningMessage::InvalidKeyVersionRequest.as_str());
    }

    #[tokio::test]
    async fn test_graceful_shutdown() {
        let cluster = SignerCluster::start(2, 3, 110).await;
        let combiner = RunningCombiner::for_cluster(&cluster, TIMEOUT).await;
        assert_eq!(combiner.get("/status").await.status, 200);
        combiner.stop().await.unwrap();
    }
}
