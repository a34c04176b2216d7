//! Permission enforcer: membership check of the operation's required
//! permission in the verified claims. Pure predicate, no side effects.

use crate::services::auth::AuthError;
use crate::services::auth::verifier::Claims;

/// Permission strings used by the drinks API, one per protected operation.
pub mod permission {
    pub const GET_DRINKS_DETAIL: &str = "get:drinks-detail";
    pub const POST_DRINKS: &str = "post:drinks";
    pub const PATCH_DRINKS: &str = "patch:drinks";
    pub const DELETE_DRINKS: &str = "delete:drinks";
}

/// The claims must carry `required` in their permission set.
///
/// An absent `permissions` claim deserializes to an empty set; both are the
/// same failure (403). A populated set without `required` is denial (401).
pub fn check_permission(required: &str, claims: &Claims) -> Result<(), AuthError> {
    if claims.permissions.is_empty() {
        return Err(AuthError::PermissionsClaimMissing);
    }
    if !claims.permissions.iter().any(|p| p == required) {
        return Err(AuthError::PermissionDenied);
    }
    Ok(())
}
