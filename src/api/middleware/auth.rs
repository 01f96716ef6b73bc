use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::api::error::ApiError;

/// Extract and validate Bearer token from Authorization header
pub fn validate_auth(headers: &HeaderMap, secret_key: &str) -> Result<(), ApiError> {
    let auth_header = headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Missing authorization header"))?;

    // Expected format: "Bearer <token>"
    let parts: Vec<&str> = auth_header.split_whitespace().collect();
    if parts.len() != 2 || parts[0] != "Bearer" {
        return Err(ApiError::unauthorized(
            "Invalid authorization header format. Expected: Bearer <token>",
        ));
    }

    let token = parts[1];
    if token != secret_key {
        return Err(ApiError::unauthorized("Invalid authentication token"));
    }

    Ok(())
}

/// Middleware guarding every route except /health
pub async fn require_bearer(
    State(secret_key): State<String>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if req.uri().path() != "/health" {
        validate_auth(req.headers(), &secret_key)?;
    }
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_valid_token() {
        assert!(validate_auth(&headers("Bearer s3cret"), "s3cret").is_ok());
    }

    #[test]
    fn test_rejections() {
        assert!(validate_auth(&HeaderMap::new(), "s3cret").is_err());
        assert!(validate_auth(&headers("Basic s3cret"), "s3cret").is_err());
        assert!(validate_auth(&headers("Bearer wrong"), "s3cret").is_err());
        assert!(validate_auth(&headers("Bearer"), "s3cret").is_err());
    }
}
