//! reqwest-backed [`SignerTransport`].
//!
//! A single client is shared by all dispatches so connections to each
//! replica are pooled.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use shared_types::KEY_VERSION_HEADER;
use std::time::Duration;

use crate::domain::errors::TransportError;
use crate::ports::outbound::{SignerHttpResponse, SignerRequest, SignerTransport};

const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Clone)]
pub struct HttpSignerTransport {
    client: reqwest::Client,
}

impl HttpSignerTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

/// Join a replica base URL and an endpoint path without doubling slashes.
pub(crate) fn signer_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

#[async_trait]
impl SignerTransport for HttpSignerTransport {
    async fn send(
        &self,
        base_url: &str,
        request: &SignerRequest,
    ) -> Result<SignerHttpResponse, TransportError> {
        let url = signer_url(base_url, request.endpoint.path());
        let mut builder = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .header(KEY_VERSION_HEADER, request.key_version.to_string())
            .body(request.body.clone());
        if let Some(authorization) = &request.authorization {
            builder = builder.header(AUTHORIZATION, authorization);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let key_version = response
            .headers()
            .get(KEY_VERSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(SignerHttpResponse {
            status,
            key_version,
            body,
        })
    }
}
