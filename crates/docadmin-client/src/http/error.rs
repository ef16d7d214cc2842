//! Mapping of transport and HTTP failures into [`AppError`].

use reqwest::{Response, StatusCode};
use serde_json::Value;

use docadmin_core::error::{AppError, ErrorKind};

/// Convert a non-success, non-401 response into a typed error carrying the
/// server's `detail` message when it sent one.
pub(crate) async fn error_from_response(path: &str, response: Response) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = extract_detail(&body)
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));

    tracing::warn!(path, status = status.as_u16(), %message, "API request failed");
    AppError::new(kind_for_status(status), message)
}

/// Convert a transport-level failure (no HTTP response) into an error.
pub(crate) fn map_transport_error(path: &str, err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::with_source(ErrorKind::Timeout, format!("Request to {path} timed out"), err)
    } else if err.is_connect() {
        AppError::with_source(ErrorKind::Network, "Could not reach the API", err)
    } else if err.is_decode() {
        AppError::with_source(
            ErrorKind::Serialization,
            format!("Unexpected response body from {path}"),
            err,
        )
    } else {
        AppError::with_source(ErrorKind::Network, format!("Request to {path} failed"), err)
    }
}

fn kind_for_status(status: StatusCode) -> ErrorKind {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ErrorKind::Validation,
        StatusCode::UNAUTHORIZED => ErrorKind::Authorization,
        StatusCode::FORBIDDEN => ErrorKind::Forbidden,
        StatusCode::NOT_FOUND => ErrorKind::NotFound,
        StatusCode::CONFLICT => ErrorKind::Conflict,
        StatusCode::TOO_MANY_REQUESTS => ErrorKind::RateLimit,
        StatusCode::SERVICE_UNAVAILABLE => ErrorKind::ServiceUnavailable,
        StatusCode::GATEWAY_TIMEOUT | StatusCode::REQUEST_TIMEOUT => ErrorKind::Timeout,
        _ => ErrorKind::ExternalService,
    }
}

fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let detail = value.get("detail").or_else(|| value.get("message"))?;
    match detail {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        // FastAPI validation errors come back as a list of objects.
        Value::Array(items) => items
            .iter()
            .find_map(|item| item.get("msg").and_then(Value::as_str))
            .map(str::to_string)
            .or_else(|| Some(detail.to_string())),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_detail_variants() {
        assert_eq!(
            extract_detail(r#"{"detail":"Usuario no encontrado"}"#).as_deref(),
            Some("Usuario no encontrado")
        );
        assert_eq!(
            extract_detail(r#"{"message":"bad"}"#).as_deref(),
            Some("bad")
        );
        assert_eq!(
            extract_detail(r#"{"detail":[{"loc":["query"],"msg":"field required"}]}"#).as_deref(),
            Some("field required")
        );
        assert_eq!(extract_detail("<html>502</html>"), None);
        assert_eq!(extract_detail(r#"{"detail":null}"#), None);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(kind_for_status(StatusCode::NOT_FOUND), ErrorKind::NotFound);
        assert_eq!(kind_for_status(StatusCode::UNPROCESSABLE_ENTITY), ErrorKind::Validation);
        assert_eq!(kind_for_status(StatusCode::INTERNAL_SERVER_ERROR), ErrorKind::ExternalService);
    }
}
