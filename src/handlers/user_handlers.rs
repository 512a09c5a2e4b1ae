//! HTTP handlers for the read-only `/user` resource.

use crate::{errors::AppError, models::user::User, state::AppState};
use axum::{
    Json,
    extract::{Path, State},
};

/// `GET /user/list`
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    let users = state
        .users
        .find_all()
        .await
        .map_err(|err| AppError::from(err).during("listing users failed"))?;
    Ok(Json(users))
}

/// `GET /user/byId/{id}`: a miss renders as `null`, not 404.
pub async fn user_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Option<User>>, AppError> {
    let user = state
        .users
        .find_by_id(id)
        .await
        .map_err(|err| AppError::from(err).during("user lookup failed"))?;
    Ok(Json(user))
}
