//! Charity project route handlers

use crate::dao::{CharityProject, ProjectId};
use crate::error::{not_found_error, validation_error, ApiResult};
use crate::identity::Caller;
use crate::models::{tagged, RegisterCharityArgs, TaggedResult};
use crate::state::SharedState;
use super::extract::{ApiJson, ApiPath};
use axum::{
    extract::{Extension, State},
    Json,
};
use validator::Validate;

/// POST /api/charities
pub async fn register_charity(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
    ApiJson(args): ApiJson<RegisterCharityArgs>,
) -> ApiResult<Json<TaggedResult<ProjectId>>> {
    let owner = caller.require_authenticated()?;
    args.validate().map_err(|e| validation_error(e.to_string()))?;

    Ok(Json(tagged(
        state.dao.register_charity(owner, args.name, args.description).await,
    )))
}

/// GET /api/charities
pub async fn list_charity_projects(State(state): State<SharedState>) -> Json<Vec<CharityProject>> {
    Json(state.dao.list_charity_projects().await)
}

/// GET /api/charities/{id}
pub async fn get_charity_project(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<ProjectId>,
) -> ApiResult<Json<CharityProject>> {
    state
        .dao
        .get_charity_project(id)
        .await
        .map(Json)
        .ok_or_else(|| not_found_error(format!("Charity project {} not found", id)))
}
