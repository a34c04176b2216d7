/*
 * Responsibility
 * - drinks の in-memory repository (CRUD)
 * - handler からは DrinkStore ハンドル + 自由関数で触る
 */
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repos::error::RepoError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub color: String,
    pub parts: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrinkRow {
    pub drink_id: i64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
    pub created_at: DateTime<Utc>,
}

/// Cheap-to-clone handle; all clones see the same rows.
#[derive(Debug, Clone, Default)]
pub struct DrinkStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    rows: BTreeMap<i64, DrinkRow>,
}

impl DrinkStore {
    // Writers never panic while holding the lock, but recover anyway.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|poison| poison.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|poison| poison.into_inner())
    }
}

pub fn list(store: &DrinkStore) -> Vec<DrinkRow> {
    store.read().rows.values().cloned().collect()
}

pub fn create(
    store: &DrinkStore,
    title: &str,
    recipe: Vec<Ingredient>,
) -> Result<DrinkRow, RepoError> {
    let mut inner = store.write();

    if inner.rows.values().any(|row| row.title == title) {
        return Err(RepoError::DuplicateTitle);
    }

    inner.next_id += 1;
    let row = DrinkRow {
        drink_id: inner.next_id,
        title: title.to_string(),
        recipe,
        created_at: Utc::now(),
    };
    inner.rows.insert(row.drink_id, row.clone());
    Ok(row)
}

/// Partial update. `None` fields are left untouched.
/// Returns `Ok(None)` when the id is unknown.
pub fn update(
    store: &DrinkStore,
    drink_id: i64,
    title: Option<&str>,
    recipe: Option<Vec<Ingredient>>,
) -> Result<Option<DrinkRow>, RepoError> {
    let mut inner = store.write();

    if let Some(title) = title
        && inner
            .rows
            .values()
            .any(|row| row.drink_id != drink_id && row.title == title)
    {
        return Err(RepoError::DuplicateTitle);
    }

    let Some(row) = inner.rows.get_mut(&drink_id) else {
        return Ok(None);
    };

    if let Some(title) = title {
        row.title = title.to_string();
    }
    if let Some(recipe) = recipe {
        row.recipe = recipe;
    }
    Ok(Some(row.clone()))
}

pub fn delete(store: &DrinkStore, drink_id: i64) -> bool {
    store.write().rows.remove(&drink_id).is_some()
}
