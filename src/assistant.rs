//! Wire contract for the website-builder flow.
//!
//! The flow itself (prompting, model calls, HTTP transport) lives outside
//! this crate; only the request/response shapes and the error surface are
//! consumed here. A response entry whose content is the literal `DELETE`
//! sentinel removes the named file; any other entry is an upsert.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Content value that marks a response entry as a deletion instruction.
pub const DELETE_SENTINEL: &str = "DELETE";

/// A file name/content pair exchanged with the builder flow — the current
/// snapshot on the way out, an upsert-or-delete instruction on the way back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePayload {
    pub name: String,
    pub content: String,
}

impl FilePayload {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn is_delete(&self) -> bool {
        self.content == DELETE_SENTINEL
    }
}

/// Request body sent to the builder flow. Folder entries are excluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRequest {
    pub prompt: String,
    pub files: Vec<FilePayload>,
}

/// Response body: changed files only, plus a human-readable summary that is
/// appended to the conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildResponse {
    pub files: Vec<FilePayload>,
    pub message: String,
}

/// Failures surfaced from a builder-flow round trip, each carrying the
/// user-facing message shown in the conversation UI.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("The AI is taking too long to respond. This can happen with very complex requests. Please try breaking your request into smaller steps.")]
    GatewayTimeout,

    #[error("Server error: {status}. The server returned an unexpected response.")]
    UnexpectedResponse { status: u16 },

    #[error("The AI server returned an unexpected response. Please try again.")]
    MalformedBody,

    #[error("{0}")]
    Server(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Classifies a raw HTTP exchange into a parsed [`BuildResponse`] or a
/// user-facing [`ApiError`].
///
/// Non-2xx JSON bodies surface their `error` field; non-JSON failures map a
/// 504 gateway timeout to its distinct friendlier message and anything else
/// to a generic server error. A 2xx body must be JSON, and a JSON body that
/// itself carries an `error` field is treated as a failure.
pub fn parse_build_response(
    status: u16,
    content_type: Option<&str>,
    body: &str,
) -> Result<BuildResponse, ApiError> {
    let is_json = content_type
        .map(|c| c.contains("application/json"))
        .unwrap_or(false);

    if !(200..300).contains(&status) {
        if is_json {
            return Err(match serde_json::from_str::<ErrorBody>(body) {
                Ok(parsed) => ApiError::Server(parsed.error),
                Err(_) => ApiError::Server(format!("Server error: {status}")),
            });
        }
        // A non-JSON error body is usually the host's HTML error page.
        if status == 504 {
            return Err(ApiError::GatewayTimeout);
        }
        return Err(ApiError::UnexpectedResponse { status });
    }

    if !is_json {
        return Err(ApiError::MalformedBody);
    }

    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|_| ApiError::MalformedBody)?;
    if let Some(message) = value.get("error").and_then(|v| v.as_str()) {
        return Err(ApiError::Server(message.to_string()));
    }
    serde_json::from_value(value).map_err(|_| ApiError::MalformedBody)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const JSON: Option<&str> = Some("application/json; charset=utf-8");

    #[test]
    fn parses_a_successful_response() {
        let body = r#"{"files":[{"name":"index.html","content":"<h1>hi</h1>"}],"message":"Done!"}"#;
        let response = parse_build_response(200, JSON, body).unwrap();
        assert_eq!(response.message, "Done!");
        assert_eq!(response.files.len(), 1);
        assert!(!response.files[0].is_delete());
    }

    #[test]
    fn delete_sentinel_is_exact() {
        assert!(FilePayload::new("a.css", "DELETE").is_delete());
        assert!(!FilePayload::new("a.css", "delete").is_delete());
        assert!(!FilePayload::new("a.css", "DELETED").is_delete());
    }

    #[test]
    fn error_field_in_a_200_body_is_a_failure() {
        let result = parse_build_response(200, JSON, r#"{"error":"model overloaded"}"#);
        assert_eq!(result, Err(ApiError::Server("model overloaded".into())));
    }

    #[test]
    fn non_json_error_maps_gateway_timeout_specially() {
        let html = "<html>504 Gateway Time-out</html>";
        assert_eq!(
            parse_build_response(504, Some("text/html"), html),
            Err(ApiError::GatewayTimeout)
        );
        assert_eq!(
            parse_build_response(502, Some("text/html"), html),
            Err(ApiError::UnexpectedResponse { status: 502 })
        );
    }

    #[test]
    fn json_error_body_surfaces_its_message() {
        assert_eq!(
            parse_build_response(500, JSON, r#"{"error":"quota exhausted"}"#),
            Err(ApiError::Server("quota exhausted".into()))
        );
        assert_eq!(
            parse_build_response(500, JSON, "not json at all"),
            Err(ApiError::Server("Server error: 500".into()))
        );
    }

    #[test]
    fn successful_status_with_non_json_body_is_malformed() {
        assert_eq!(
            parse_build_response(200, Some("text/html"), "<html></html>"),
            Err(ApiError::MalformedBody)
        );
        assert_eq!(
            parse_build_response(200, JSON, "{broken"),
            Err(ApiError::MalformedBody)
        );
    }
}
