//! Token verifier: RS256 signature plus issuer/audience/expiry validation
//! against the cached key set.

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::services::auth::AuthError;
use crate::services::auth::jwks::{Jwk, KeySetCache};

/// Decoded claims of a verified token.
///
/// NOTE:
/// - `aud` in a JWT can be either string or array; jsonwebtoken validates it
///   via `Validation::set_audience`, so we keep it as a `Value`.
/// - provider-added claims land in `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    #[serde(default)]
    pub aud: Value,
    pub exp: u64,

    /// Custom claim: permission strings granted to the caller.
    #[serde(default)]
    pub permissions: Vec<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug)]
pub struct TokenVerifier {
    issuer: String,
    audience: String,
    leeway_seconds: u64,
    keys: KeySetCache,
}

impl TokenVerifier {
    pub fn new(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        leeway_seconds: u64,
        keys: KeySetCache,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            leeway_seconds,
            keys,
        }
    }

    /// Verify a compact token and decode its claims.
    ///
    /// The algorithm is pinned to RS256 here; whatever the token's own header
    /// asks for is ignored. Flow: read the unverified header for the `kid`,
    /// resolve the signing key, then let jsonwebtoken check signature, `exp`,
    /// `iss` and `aud` in one pass.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header =
            jsonwebtoken::decode_header(token).map_err(|_| AuthError::SignatureInvalid)?;
        let kid = header.kid.ok_or(AuthError::MalformedHeader)?;

        let jwk = self
            .keys
            .resolve(&kid)
            .await?
            .ok_or(AuthError::UnknownSigningKey)?;
        let decoding_key = decoding_key_for(&jwk)?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.leeway = self.leeway_seconds;

        let data = jsonwebtoken::decode::<Claims>(token, &decoding_key, &validation)
            .map_err(map_jwt_error)?;
        Ok(data.claims)
    }
}

fn decoding_key_for(jwk: &Jwk) -> Result<DecodingKey, AuthError> {
    if jwk.kty != "RSA" {
        return Err(AuthError::UnknownSigningKey);
    }
    let (Some(n), Some(e)) = (&jwk.n, &jwk.e) else {
        return Err(AuthError::UnknownSigningKey);
    };
    DecodingKey::from_rsa_components(n, e).map_err(|_| AuthError::SignatureInvalid)
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;

    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::MissingRequiredClaim(_) => AuthError::ClaimsMismatch,
        _ => AuthError::SignatureInvalid,
    }
}
