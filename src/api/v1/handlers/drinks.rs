/*
 * Responsibility
 * - /drinks 系 CRUD handler
 * - 認可は gate middleware 済み。handler は AuthCtx を受け取るだけで、
 *   permission の再チェックはしない
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    api::v1::{
        dto::drinks::{
            CreateDrinkRequest, DrinkDetailResponse, DrinkSummaryResponse, UpdateDrinkRequest,
        },
        extractors::AuthCtx,
    },
    error::AppError,
    repos::drink_repo,
    state::AppState,
};

/// Public listing, short recipe shape.
pub async fn list_drinks(State(state): State<AppState>) -> Json<Vec<DrinkSummaryResponse>> {
    let rows = drink_repo::list(&state.drinks);
    Json(rows.into_iter().map(DrinkSummaryResponse::from_row).collect())
}

pub async fn get_drinks_detail(
    State(state): State<AppState>,
    ctx: AuthCtx,
) -> Json<Vec<DrinkDetailResponse>> {
    tracing::debug!(permissions = ?ctx.claims.permissions, "drinks detail requested");

    let rows = drink_repo::list(&state.drinks);
    Json(rows.into_iter().map(DrinkDetailResponse::from_row).collect())
}

pub async fn create_drink(
    State(state): State<AppState>,
    _ctx: AuthCtx,
    Json(req): Json<CreateDrinkRequest>,
) -> Result<(StatusCode, Json<DrinkDetailResponse>), AppError> {
    req.validate().map_err(AppError::unprocessable)?;

    let row = drink_repo::create(&state.drinks, &req.title, req.recipe)?;
    Ok((StatusCode::CREATED, Json(DrinkDetailResponse::from_row(row))))
}

pub async fn update_drink(
    State(state): State<AppState>,
    _ctx: AuthCtx,
    Path(drink_id): Path<i64>,
    Json(req): Json<UpdateDrinkRequest>,
) -> Result<Json<DrinkDetailResponse>, AppError> {
    req.validate().map_err(AppError::unprocessable)?;

    let row = drink_repo::update(&state.drinks, drink_id, req.title.as_deref(), req.recipe)?
        .ok_or(AppError::not_found("drink"))?;

    Ok(Json(DrinkDetailResponse::from_row(row)))
}

pub async fn delete_drink(
    State(state): State<AppState>,
    _ctx: AuthCtx,
    Path(drink_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if drink_repo::delete(&state.drinks, drink_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("drink"))
    }
}
