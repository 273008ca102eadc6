//! HTTP transport seam.
//!
//! # Responsibilities
//! - Send one POST and report the response status or a transport failure
//! - Keep request building separate from retry logic
//!
//! The response body is never read.

use std::error::Error as StdError;
use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::HeaderValue;
use reqwest::StatusCode;
use url::Url;

use crate::delivery::outcome::AttemptError;
use crate::payload::HeaderSet;

/// One outgoing request for a single attempt.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub url: Url,
    pub headers: Arc<HeaderSet>,
    pub body: Bytes,
    pub attempt: u32,
}

/// Sends delivery requests.
///
/// Implementations return `AttemptError::Construction` only for defects in
/// the request itself; every other error is treated as transient.
pub trait Transport: Send + Sync + 'static {
    fn send(
        &self,
        request: OutboundRequest,
    ) -> impl Future<Output = Result<StatusCode, AttemptError>> + Send;
}

/// Transport backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(user_agent: Option<HeaderValue>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(user_agent) = user_agent {
            builder = builder.user_agent(user_agent);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl Transport for ReqwestTransport {
    fn send(
        &self,
        request: OutboundRequest,
    ) -> impl Future<Output = Result<StatusCode, AttemptError>> + Send {
        let client = self.client.clone();
        async move {
            let built = client
                .post(request.url)
                .headers((*request.headers).clone())
                .body(request.body)
                .build()
                .map_err(|e| AttemptError::Construction(error_chain(&e)))?;

            let response = client
                .execute(built)
                .await
                .map_err(|e| AttemptError::Transport(error_chain(&e)))?;

            Ok::<_, AttemptError>(response.status())
        }
    }
}

/// Flatten an error and its sources into one line.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
