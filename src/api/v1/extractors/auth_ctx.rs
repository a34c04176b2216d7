/*
 * Responsibility
 * - Handler から見える「認可済みコンテキスト」の型 + extractor
 * - gate middleware が検証して request extensions に格納し、
 *   handler はこの型だけを受け取る
 */
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::{StatusCode, request::Parts};

use crate::services::auth::verifier::Claims;
use crate::state::AppState;

/// 検証済み claims。request の残り期間は参照共有・不変。
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub claims: Arc<Claims>,
}

impl AuthCtx {
    pub fn new(claims: Arc<Claims>) -> Self {
        Self { claims }
    }
}

/// gate middleware が AuthCtx を insert 済みである前提。
/// 見つからない場合は 401（gate の掛け忘れ）。
impl FromRequestParts<AppState> for AuthCtx {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthCtx>()
            .cloned()
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}
