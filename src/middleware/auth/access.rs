//! Authorization gate as axum middleware.
//!
//! Bearer token の抽出 → 検証 → permission check を handler の前で行い、
//! 通った claims を request extensions に入れて handler へ渡す。
//! どこかで失敗したら handler は呼ばれず AuthError がそのまま boundary へ。

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::AuthError;
use crate::state::AppState;

/// State handed to the gate middleware: the shared app state plus the single
/// permission the wrapped operation requires.
#[derive(Clone)]
struct GateState {
    state: AppState,
    required: &'static str,
}

/// Wrap every route currently in `router` with the authorization gate.
///
/// 例：
/// ```ignore
/// let protected = access::require(
///     Router::new().route("/drinks", post(create_drink)),
///     state,
///     permission::POST_DRINKS,
/// );
/// ```
pub fn require(
    router: Router<AppState>,
    state: AppState,
    required: &'static str,
) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(
        GateState { state, required },
        gate_middleware,
    ))
}

async fn gate_middleware(
    State(gate): State<GateState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let authorization = match req.headers().get(header::AUTHORIZATION) {
        None => None,
        Some(value) => Some(value.to_str().map_err(|_| AuthError::MalformedHeader)?),
    };

    let claims = match gate.state.auth.authorize(authorization, gate.required).await {
        Ok(claims) => claims,
        Err(err) => {
            tracing::warn!(
                required = gate.required,
                error = %err,
                "authorization rejected"
            );
            return Err(err.into());
        }
    };

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(AuthCtx::new(Arc::new(claims)));

    Ok(next.run(req).await)
}
