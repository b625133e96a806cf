//! `X-API-Key` credentials for the prover's HTTP edges.
//!
//! The same header authenticates the prover's outbound calls to the chain
//! and storage gateways and, inbound, registrations on the registry API.
//! Keys come from configuration only; there is no built-in fallback.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use std::fmt;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::warn;

/// Header name for API key authentication.
pub const API_KEY_HEADER: &str = "X-API-Key";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidApiKey {
    #[error("API key is empty")]
    Empty,
    #[error("API key must be printable ASCII without spaces")]
    Malformed,
}

/// A validated API key.
///
/// Stored as a sensitive header value so it is never printed by `Debug`
/// output of requests or of this type.
#[derive(Clone)]
pub struct ApiKey {
    value: HeaderValue,
}

impl ApiKey {
    pub fn new(key: &str) -> Result<Self, InvalidApiKey> {
        if key.is_empty() {
            return Err(InvalidApiKey::Empty);
        }
        if !key.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(InvalidApiKey::Malformed);
        }
        let mut value = HeaderValue::from_str(key).map_err(|_| InvalidApiKey::Malformed)?;
        value.set_sensitive(true);
        Ok(Self { value })
    }

    /// Parse an optional configured key.
    pub fn from_config(key: Option<&str>) -> Result<Option<Self>, InvalidApiKey> {
        key.map(Self::new).transpose()
    }

    /// Header value to attach to outbound requests.
    pub fn header_value(&self) -> HeaderValue {
        self.value.clone()
    }

    /// Constant-time comparison with a presented key.
    ///
    /// Length may leak; content comparison does not.
    pub fn matches(&self, presented: &[u8]) -> bool {
        let expected = self.value.as_bytes();
        expected.len() == presented.len() && bool::from(expected.ct_eq(presented))
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Reject requests whose `X-API-Key` header does not match the key in state.
///
/// ```ignore
/// let protected = Router::new()
///     .route("/files", post(register_file))
///     .layer(middleware::from_fn_with_state(key, require_api_key));
/// ```
pub async fn require_api_key(
    State(expected): State<ApiKey>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    match headers.get(API_KEY_HEADER) {
        Some(key) if expected.matches(key.as_bytes()) => Ok(next.run(request).await),
        Some(_) => {
            warn!(path = %request.uri().path(), "Invalid API key provided");
            Err(StatusCode::UNAUTHORIZED)
        }
        None => {
            warn!(path = %request.uri().path(), "No API key provided in {} header", API_KEY_HEADER);
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;
    use axum::{Router, body::Body, middleware, routing::post};
    use tower::ServiceExt;

    fn protected_app(key: &str) -> Router {
        Router::new()
            .route("/files", post(|| async { "registered" }))
            .layer(middleware::from_fn_with_state(
                ApiKey::new(key).unwrap(),
                require_api_key,
            ))
    }

    fn post_files(key: Option<&str>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().method("POST").uri("/files");
        if let Some(key) = key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_key_validation() {
        assert!(ApiKey::new("registry-secret").is_ok());
        assert_eq!(ApiKey::new("").unwrap_err(), InvalidApiKey::Empty);
        assert_eq!(ApiKey::new("two words").unwrap_err(), InvalidApiKey::Malformed);
        assert_eq!(ApiKey::new("line\nbreak").unwrap_err(), InvalidApiKey::Malformed);
        assert_eq!(ApiKey::new("clé").unwrap_err(), InvalidApiKey::Malformed);
    }

    #[test]
    fn test_from_config() {
        assert!(ApiKey::from_config(None).unwrap().is_none());
        assert!(ApiKey::from_config(Some("k")).unwrap().is_some());
        assert!(ApiKey::from_config(Some("")).is_err());
    }

    #[test]
    fn test_key_is_never_printed() {
        let key = ApiKey::new("registry-secret").unwrap();
        assert!(!format!("{:?}", key).contains("registry-secret"));
        assert!(key.header_value().is_sensitive());
        assert_eq!(key.header_value().as_bytes(), b"registry-secret");
    }

    #[test]
    fn test_matches() {
        let key = ApiKey::new("secret_key_123").unwrap();
        assert!(key.matches(b"secret_key_123"));
        assert!(!key.matches(b"secret_key_124"));
        assert!(!key.matches(b"secret"));
        assert!(!key.matches(b""));
    }

    #[tokio::test]
    async fn test_missing_key_rejected() {
        let response = protected_app("registry-secret")
            .oneshot(post_files(None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_key_rejected() {
        let response = protected_app("registry-secret")
            .oneshot(post_files(Some("registry-secreT")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_configured_key_accepted() {
        let response = protected_app("registry-secret")
            .oneshot(post_files(Some("registry-secret")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
