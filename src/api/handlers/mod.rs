use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::db::Database;
use crate::error::Error;
use crate::models::*;

type ApiResult<T> = Result<T, Error>;

// ============================================================
// Error Handling
// ============================================================

/// Validation and lookup failures are shown to the client as-is. Constraint
/// and store failures are logged in full and answered with a fixed message
/// so SQLite details do not leak.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Error::Validation(msg) => {
                tracing::warn!("Validation error: {}", msg);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    json!({ "errors": [msg] }),
                )
            }
            Error::NotFound { .. } => (StatusCode::NOT_FOUND, json!({ "error": self.to_string() })),
            Error::Constraint(msg) => {
                tracing::warn!("Constraint violation: {}", msg);
                (
                    StatusCode::CONFLICT,
                    json!({ "errors": ["Request conflicts with stored data"] }),
                )
            }
            Error::Database(_) => {
                tracing::error!("Internal error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

// ============================================================
// Heroes
// ============================================================

pub async fn list_heroes(State(db): State<Database>) -> ApiResult<Json<Vec<Hero>>> {
    db.get_all_heroes().map(Json)
}

pub async fn get_hero(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> ApiResult<Json<HeroDetail>> {
    db.get_hero_detail(id)?
        .map(Json)
        .ok_or(Error::not_found("Hero", id))
}

pub async fn create_hero(
    State(db): State<Database>,
    Json(input): Json<CreateHeroInput>,
) -> ApiResult<(StatusCode, Json<Hero>)> {
    db.create_hero(input).map(|h| (StatusCode::CREATED, Json(h)))
}

pub async fn update_hero(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateHeroInput>,
) -> ApiResult<Json<Hero>> {
    db.update_hero(id, input)?
        .map(Json)
        .ok_or(Error::not_found("Hero", id))
}

pub async fn delete_hero(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    if db.delete_hero(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::not_found("Hero", id))
    }
}

pub async fn list_powers_of_hero(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<Power>>> {
    db.get_powers_for_hero(id)?
        .map(Json)
        .ok_or(Error::not_found("Hero", id))
}

pub async fn add_power_to_hero(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Json(input): Json<AddPowerInput>,
) -> ApiResult<(StatusCode, Json<HeroPowerDetail>)> {
    db.add_power_to_hero(id, input)
        .map(|hp| (StatusCode::CREATED, Json(hp)))
}

// ============================================================
// Powers
// ============================================================

pub async fn list_powers(State(db): State<Database>) -> ApiResult<Json<Vec<Power>>> {
    db.get_all_powers().map(Json)
}

pub async fn get_power(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> ApiResult<Json<PowerDetail>> {
    db.get_power_detail(id)?
        .map(Json)
        .ok_or(Error::not_found("Power", id))
}

pub async fn create_power(
    State(db): State<Database>,
    Json(input): Json<CreatePowerInput>,
) -> ApiResult<(StatusCode, Json<Power>)> {
    db.create_power(input).map(|p| (StatusCode::CREATED, Json(p)))
}

pub async fn update_power(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Json(input): Json<UpdatePowerInput>,
) -> ApiResult<Json<Power>> {
    db.update_power(id, input)?
        .map(Json)
        .ok_or(Error::not_found("Power", id))
}

pub async fn delete_power(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    if db.delete_power(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::not_found("Power", id))
    }
}

pub async fn list_heroes_of_power(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<Hero>>> {
    db.get_heroes_for_power(id)?
        .map(Json)
        .ok_or(Error::not_found("Power", id))
}

pub async fn add_hero_to_power(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Json(input): Json<AddHeroInput>,
) -> ApiResult<(StatusCode, Json<HeroPowerDetail>)> {
    db.add_hero_to_power(id, input)
        .map(|hp| (StatusCode::CREATED, Json(hp)))
}

// ============================================================
// Hero Powers
// ============================================================

pub async fn list_hero_powers(State(db): State<Database>) -> ApiResult<Json<Vec<HeroPower>>> {
    db.get_all_hero_powers().map(Json)
}

pub async fn get_hero_power(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> ApiResult<Json<HeroPowerDetail>> {
    db.get_hero_power_detail(id)?
        .map(Json)
        .ok_or(Error::not_found("HeroPower", id))
}

pub async fn create_hero_power(
    State(db): State<Database>,
    Json(input): Json<CreateHeroPowerInput>,
) -> ApiResult<(StatusCode, Json<HeroPowerDetail>)> {
    db.create_hero_power(input)
        .map(|hp| (StatusCode::CREATED, Json(hp)))
}

pub async fn update_hero_power(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateHeroPowerInput>,
) -> ApiResult<Json<HeroPower>> {
    db.update_hero_power(id, input)?
        .map(Json)
        .ok_or(Error::not_found("HeroPower", id))
}

pub async fn delete_hero_power(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    if db.delete_hero_power(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::not_found("HeroPower", id))
    }
}
