//! Write-once response slot.
//!
//! A request produces exactly one response. Later sends are dropped with an
//! error log, and a responder finished without any send yields 500
//! `UNKNOWN_ERROR`.

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use shared_types::KEY_VERSION_HEADER;
use std::marker::PhantomData;
use tracing::error;

use super::error::{ApiError, ClientResponse};
use crate::VERSION;

pub struct Responder<R> {
    sent: Option<Response>,
    key_version: Option<u32>,
    _response: PhantomData<fn() -> R>,
}

impl<R: ClientResponse> Responder<R> {
    pub fn new() -> Self {
        Self {
            sent: None,
            key_version: None,
            _response: PhantomData,
        }
    }

    /// Echo `version` in the key-version header of whatever is sent.
    pub fn set_key_version(&mut self, version: u32) {
        self.key_version = Some(version);
    }

    pub fn is_sent(&self) -> bool {
        self.sent.is_some()
    }

    /// Returns `false` when a response was already sent.
    pub fn send(&mut self, status: StatusCode, body: &R) -> bool {
        if self.sent.is_some() {
            error!(status = status.as_u16(), "Response already sent, dropping second response");
            return false;
        }
        let mut response = (status, Json(body)).into_response();
        if let Some(version) = self.key_version {
            response
                .headers_mut()
                .insert(KEY_VERSION_HEADER, HeaderValue::from(version));
        }
        self.sent = Some(response);
        true
    }

    pub fn send_error(&mut self, err: &ApiError) -> bool {
        let body = R::from_api_error(VERSION, err);
        self.send(err.status, &body)
    }

    /// The response to write to the client.
    pub fn finish(mut self) -> Response {
        if self.sent.is_none() {
            error!("Request finished without a response");
            self.send_error(&ApiError::unknown());
        }
        self.sent
            .unwrap_or_else(|| StatusCode::INTERNAL_SERVER_ERROR.into_response())
    }
}

impl<R: ClientResponse> Default for Responder<R> {
    fn default() -> Self {
        Self::new()
    }
}
