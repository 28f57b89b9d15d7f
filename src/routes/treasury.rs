//! Treasury and donation route handlers

use crate::dao::audit::{AuditEntry, DEFAULT_AUDIT_LIMIT};
use crate::dao::Donor;
use crate::error::{not_found_error, ApiResult, AppError};
use crate::identity::{Caller, Principal};
use crate::models::{tagged, AuditQuery, BalanceResponse, DonateArgs, TaggedResult};
use crate::state::SharedState;
use super::extract::{ApiJson, ApiPath, ApiQuery};
use axum::{
    extract::{Extension, State},
    Json,
};
use tracing::debug;

/// GET /api/treasury/balance
pub async fn get_treasury_balance(State(state): State<SharedState>) -> Json<BalanceResponse> {
    let balance = state.dao.get_treasury_balance().await;
    Json(BalanceResponse { balance })
}

/// POST /api/donations
pub async fn donate(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
    ApiJson(args): ApiJson<DonateArgs>,
) -> ApiResult<Json<TaggedResult<String>>> {
    let donor = caller.require_authenticated()?;
    Ok(Json(tagged(state.dao.donate(donor, args.amount).await)))
}

/// GET /api/donors/{principal}
pub async fn get_donor(
    State(state): State<SharedState>,
    ApiPath(principal): ApiPath<String>,
) -> ApiResult<Json<Donor>> {
    let id = Principal::parse(&principal)
        .map_err(|e| AppError::BadRequest(format!("Invalid principal: {}", e)))?;
    debug!("Looking up donor {}", id);

    state
        .dao
        .get_donor(&id)
        .await
        .map(Json)
        .ok_or_else(|| not_found_error(format!("Donor {} not found", id)))
}

/// GET /api/audit?limit=n
pub async fn get_audit_log(
    State(state): State<SharedState>,
    ApiQuery(query): ApiQuery<AuditQuery>,
) -> Json<Vec<AuditEntry>> {
    let limit = query.limit.unwrap_or(DEFAULT_AUDIT_LIMIT);
    Json(state.dao.audit_log(limit).await)
}
