//! Proposal and voting route handlers

use crate::dao::{FundingProposal, NewProposal, ProposalId};
use crate::error::{not_found_error, validation_error, ApiResult};
use crate::identity::Caller;
use crate::models::{tagged, CreateProposalArgs, TaggedResult, VoteArgs};
use crate::state::SharedState;
use super::extract::{ApiJson, ApiPath};
use axum::{
    extract::{Extension, State},
    Json,
};
use tracing::debug;
use validator::Validate;

/// GET /api/proposals/active
pub async fn list_active_proposals(State(state): State<SharedState>) -> Json<Vec<FundingProposal>> {
    Json(state.dao.list_active_proposals().await)
}

/// GET /api/proposals
pub async fn list_all_proposals(State(state): State<SharedState>) -> Json<Vec<FundingProposal>> {
    Json(state.dao.list_all_proposals().await)
}

/// GET /api/proposals/{id}
pub async fn get_proposal(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<ProposalId>,
) -> ApiResult<Json<FundingProposal>> {
    state
        .dao
        .get_proposal(id)
        .await
        .map(Json)
        .ok_or_else(|| not_found_error(format!("Proposal {} not found", id)))
}

/// POST /api/proposals
pub async fn create_proposal(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
    ApiJson(args): ApiJson<CreateProposalArgs>,
) -> ApiResult<Json<TaggedResult<ProposalId>>> {
    let creator = caller.require_authenticated()?;
    args.validate().map_err(|e| validation_error(e.to_string()))?;

    debug!("Creating proposal '{}' for {} e8s", args.title, args.amount);
    let outcome = state
        .dao
        .create_proposal(
            creator,
            NewProposal {
                title: args.title,
                description: args.description,
                recipient: args.recipient,
                amount: args.amount,
                duration_seconds: args.duration_seconds,
            },
        )
        .await;

    Ok(Json(tagged(outcome)))
}

/// POST /api/proposals/{id}/vote
pub async fn vote_on_proposal(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<ProposalId>,
    ApiJson(args): ApiJson<VoteArgs>,
) -> ApiResult<Json<TaggedResult<String>>> {
    let donor = caller.require_authenticated()?;
    Ok(Json(tagged(state.dao.vote_on_proposal(donor, id, args.approve).await)))
}

/// POST /api/proposals/{id}/execute
pub async fn execute_proposal(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<ProposalId>,
) -> ApiResult<Json<TaggedResult<String>>> {
    let caller = caller.require_authenticated()?;
    Ok(Json(tagged(state.dao.execute_proposal(caller, id).await)))
}

/// POST /api/proposals/{id}/cancel
pub async fn cancel_proposal(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<ProposalId>,
) -> ApiResult<Json<TaggedResult<String>>> {
    let caller = caller.require_authenticated()?;
    Ok(Json(tagged(state.dao.cancel_proposal(caller, id).await)))
}
