//! Governance settings route handlers

use crate::dao::{GovernanceSettings, GovernanceUpdate};
use crate::error::ApiResult;
use crate::identity::Caller;
use crate::models::{tagged, TaggedResult};
use crate::state::SharedState;
use super::extract::ApiJson;
use axum::{
    extract::{Extension, State},
    Json,
};

/// GET /api/governance
pub async fn get_governance_settings(State(state): State<SharedState>) -> Json<GovernanceSettings> {
    Json(state.dao.get_governance_settings().await)
}

/// PUT /api/governance
pub async fn update_governance_settings(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
    ApiJson(update): ApiJson<GovernanceUpdate>,
) -> ApiResult<Json<TaggedResult<String>>> {
    let caller = caller.require_authenticated()?;
    Ok(Json(tagged(state.dao.update_governance_settings(caller, update).await)))
}
