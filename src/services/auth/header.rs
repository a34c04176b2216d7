//! Token extractor: pull the bearer token out of the raw `Authorization`
//! header value. No side effects; the token is returned as-is.

use crate::services::auth::AuthError;

/// Split `Bearer <token>` out of an `Authorization` value.
///
/// Rules, checked in order:
/// - absent or blank value       → `MissingHeader`
/// - first word is not `Bearer`  → `MalformedScheme` (case sensitive)
/// - scheme without a token      → `MissingToken`
/// - more than two words         → `MalformedHeader`
pub fn extract_bearer_token(value: Option<&str>) -> Result<&str, AuthError> {
    let value = value.ok_or(AuthError::MissingHeader)?;
    let parts: Vec<&str> = value.split_whitespace().collect();

    match parts.as_slice() {
        [] => Err(AuthError::MissingHeader),
        [scheme, ..] if *scheme != "Bearer" => Err(AuthError::MalformedScheme),
        [_] => Err(AuthError::MissingToken),
        [_, token] => Ok(token),
        _ => Err(AuthError::MalformedHeader),
    }
}
