/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - 認可が必要な範囲は access::require() で gate を掛ける
 *   (operation ごとに required permission をひとつ宣言する)
 */
use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::api::v1::handlers::{
    drinks::{create_drink, delete_drink, get_drinks_detail, list_drinks, update_drink},
    health::health,
};
use crate::middleware::auth::access;
use crate::services::auth::permissions::permission;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/drinks", get(list_drinks))
        .merge(access::require(
            Router::new().route("/drinks-detail", get(get_drinks_detail)),
            state.clone(),
            permission::GET_DRINKS_DETAIL,
        ))
        .merge(access::require(
            Router::new().route("/drinks", post(create_drink)),
            state.clone(),
            permission::POST_DRINKS,
        ))
        .merge(access::require(
            Router::new().route("/drinks/{drink_id}", patch(update_drink)),
            state.clone(),
            permission::PATCH_DRINKS,
        ))
        .merge(access::require(
            Router::new().route("/drinks/{drink_id}", delete(delete_drink)),
            state,
            permission::DELETE_DRINKS,
        ))
}
