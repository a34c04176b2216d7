/*
 * Responsibility
 * - Drinks の request/response DTO
 * - validation (形式チェック) 用の validate() を持たせる
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repos::drink_repo::{DrinkRow, Ingredient};

#[derive(Debug, Deserialize)]
pub struct CreateDrinkRequest {
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

impl CreateDrinkRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.title.trim().is_empty() {
            return Err("title is required");
        }
        validate_recipe(&self.recipe)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateDrinkRequest {
    pub title: Option<String>,
    pub recipe: Option<Vec<Ingredient>>,
}

impl UpdateDrinkRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(title) = &self.title
            && title.trim().is_empty()
        {
            return Err("title cannot be empty");
        }
        if let Some(recipe) = &self.recipe {
            validate_recipe(recipe)?;
        }
        Ok(())
    }
}

fn validate_recipe(recipe: &[Ingredient]) -> Result<(), &'static str> {
    if recipe.is_empty() {
        return Err("recipe must have at least one ingredient");
    }
    if recipe.iter().any(|i| i.parts == 0) {
        return Err("ingredient parts must be >= 1");
    }
    Ok(())
}

/// Public projection: ingredient without its name.
#[derive(Debug, Serialize)]
pub struct ShortIngredient {
    pub color: String,
    pub parts: u32,
}

/// Listing shape for the unauthenticated endpoint.
#[derive(Debug, Serialize)]
pub struct DrinkSummaryResponse {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<ShortIngredient>,
}

impl DrinkSummaryResponse {
    pub fn from_row(row: DrinkRow) -> Self {
        Self {
            id: row.drink_id,
            title: row.title,
            recipe: row
                .recipe
                .into_iter()
                .map(|i| ShortIngredient {
                    color: i.color,
                    parts: i.parts,
                })
                .collect(),
        }
    }
}

/// Full shape, only served behind `get:drinks-detail` (and to writers).
#[derive(Debug, Serialize)]
pub struct DrinkDetailResponse {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
    pub created_at: DateTime<Utc>,
}

impl DrinkDetailResponse {
    pub fn from_row(row: DrinkRow) -> Self {
        Self {
            id: row.drink_id,
            title: row.title,
            recipe: row.recipe,
            created_at: row.created_at,
        }
    }
}
