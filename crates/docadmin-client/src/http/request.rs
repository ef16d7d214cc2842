//! Outbound request description.

use std::time::Duration;

use bytes::Bytes;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use docadmin_core::error::AppError;
use docadmin_core::result::AppResult;

/// Request body variants.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// JSON body.
    Json(Value),
    /// `multipart/form-data` body.
    Multipart(Vec<FormPart>),
}

/// One field of a multipart form.
#[derive(Debug, Clone)]
pub enum FormPart {
    /// Plain text field.
    Text {
        /// Field name.
        name: String,
        /// Field value.
        value: String,
    },
    /// File field.
    File {
        /// Field name.
        name: String,
        /// File name reported to the server.
        filename: String,
        /// MIME type.
        content_type: Option<String>,
        /// File contents.
        data: Bytes,
    },
}

impl FormPart {
    /// Text field.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Text {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A request to the remote API, relative to the configured base URL.
///
/// Everything the adapter decides on its own (credential, timeout) can be
/// overridden per request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path below the base URL, starting with `/`.
    pub path: String,
    /// Query parameters.
    pub query: Vec<(String, String)>,
    /// Body.
    pub body: RequestBody,
    /// Explicit `Authorization` header value; suppresses the default credential.
    pub authorization: Option<String>,
    /// Explicit timeout; overrides the path-based choice.
    pub timeout: Option<Duration>,
}

impl ApiRequest {
    /// Create a request.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            authorization: None,
            timeout: None,
        }
    }

    /// `GET` request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// `POST` request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// `PUT` request.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// `DELETE` request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append every field of a flat serializable struct as query parameters.
    /// `null` fields are skipped.
    pub fn query_params<T: Serialize>(mut self, params: &T) -> AppResult<Self> {
        let value = serde_json::to_value(params)?;
        let Value::Object(fields) = value else {
            return Err(AppError::internal("Query parameters must serialize to an object"));
        };
        for (key, value) in fields {
            match value {
                Value::Null => {}
                Value::String(s) => self.query.push((key, s)),
                other => self.query.push((key, other.to_string())),
            }
        }
        Ok(self)
    }

    /// Set a JSON body.
    pub fn json<T: Serialize>(mut self, body: &T) -> AppResult<Self> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Set a multipart body.
    pub fn multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }

    /// Send an explicit `Authorization` header.
    pub fn authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }

    /// Override the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Whether the path targets an upload endpoint.
    pub fn is_upload(&self) -> bool {
        self.path.contains("/upload")
    }
}

/// Characters escaped in a path segment: everything but RFC 3986 unreserved.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode a single path segment.
pub fn encode_segment(raw: &str) -> String {
    utf8_percent_encode(raw, SEGMENT).to_string()
}
