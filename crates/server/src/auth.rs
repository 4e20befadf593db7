use axum::http::{header::AUTHORIZATION, HeaderMap};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing bearer credentials")]
    MissingCredentials,
    #[error("admin access is disabled")]
    AdminDisabled,
    #[error("bearer token rejected")]
    InvalidToken,
}

/// Checks the `Authorization: Bearer` header against the configured admin token.
pub fn require_admin(headers: &HeaderMap, admin_token: Option<&SecretString>) -> Result<(), AuthError> {
    let presented = bearer_token(headers).ok_or(AuthError::MissingCredentials)?;
    let expected = admin_token.ok_or(AuthError::AdminDisabled)?;

    if constant_time_eq(presented.as_bytes(), expected.expose_secret().as_bytes()) {
        Ok(())
    } else {
        Err(AuthError::InvalidToken)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter().zip(right).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}

#[cfg(test)]
mod tests {
    use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderValue};
    use secrecy::SecretString;

    use super::{require_admin, AuthError};

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).expect("header value"));
        headers
    }

    fn token() -> SecretString {
        SecretString::from("admin-token-0123456789".to_string())
    }

    #[test]
    fn accepts_matching_bearer_token() {
        let result = require_admin(&headers("Bearer admin-token-0123456789"), Some(&token()));

        assert_eq!(result, Ok(()));
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let result = require_admin(&headers("bearer admin-token-0123456789"), Some(&token()));

        assert_eq!(result, Ok(()));
    }

    #[test]
    fn missing_or_malformed_header_is_missing_credentials() {
        assert_eq!(
            require_admin(&HeaderMap::new(), Some(&token())),
            Err(AuthError::MissingCredentials)
        );
        assert_eq!(
            require_admin(&headers("Basic dXNlcjpwYXNz"), Some(&token())),
            Err(AuthError::MissingCredentials)
        );
    }

    #[test]
    fn wrong_token_is_rejected() {
        let result = require_admin(&headers("Bearer admin-token-0123456780"), Some(&token()));

        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[test]
    fn unconfigured_token_disables_admin_routes() {
        let result = require_admin(&headers("Bearer anything-at-all-here"), None);

        assert_eq!(result, Err(AuthError::AdminDisabled));
    }
}
