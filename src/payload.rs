//! Payload acquisition and form encoding.
//!
//! Produces the immutable body and header set shared by every worker.

use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use tokio::io::AsyncReadExt;

use crate::error::{MultipostError, Result};

/// Source name meaning standard input.
pub const STDIN_SOURCE: &str = "-";

/// Content type set when the payload is wrapped as a form parameter.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Ordered header name to value(s) mapping attached to every request.
pub type HeaderSet = HeaderMap;

/// Read the raw payload bytes from a file path, or stdin for `-`.
pub async fn read_source(source: &str) -> Result<Bytes> {
    let read = if source == STDIN_SOURCE {
        let mut buf = Vec::new();
        tokio::io::stdin().read_to_end(&mut buf).await.map(|_| buf)
    } else {
        tokio::fs::read(source).await
    };

    read.map(Bytes::from).map_err(|source_err| MultipostError::Input {
        path: if source == STDIN_SOURCE {
            "stdin".to_string()
        } else {
            source.to_string()
        },
        source: source_err,
    })
}

/// Wrap raw bytes as `<param>=<form-escaped bytes>`.
pub fn form_encode(param: &str, raw: &[u8]) -> Bytes {
    let mut body = String::with_capacity(param.len() + 1 + raw.len());
    body.push_str(param);
    body.push('=');
    body.extend(url::form_urlencoded::byte_serialize(raw));
    Bytes::from(body)
}

/// The body and headers every worker sends. Read-only once built.
#[derive(Debug, Clone)]
pub struct Payload {
    body: Bytes,
    headers: Arc<HeaderSet>,
}

impl Payload {
    pub fn new(body: impl Into<Bytes>, headers: HeaderSet) -> Self {
        Self {
            body: body.into(),
            headers: Arc::new(headers),
        }
    }

    /// Finalize the payload. A non-empty `param` wraps the bytes as a form
    /// field and sets the form content type; an empty one sends them as-is.
    pub fn prepare(raw: Bytes, param: &str, mut headers: HeaderSet) -> Self {
        if param.is_empty() {
            return Self::new(raw, headers);
        }

        headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        Self::new(form_encode(param, &raw), headers)
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn headers(&self) -> &Arc<HeaderSet> {
        &self.headers
    }
}
