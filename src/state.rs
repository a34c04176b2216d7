/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::repos::drink_repo::DrinkStore;
use crate::services::auth::AuthService;

#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub drinks: DrinkStore,
}

impl AppState {
    pub fn new(auth: AuthService, drinks: DrinkStore) -> Self {
        Self {
            auth: Arc::new(auth),
            drinks,
        }
    }
}
