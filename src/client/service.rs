//! The client's view of the DAO service
//!
//! [`DaoService`] is the seam between the console model and the transport.
//! [`RouterService`] speaks real HTTP/JSON to an in-process axum router.

use crate::dao::{E8s, FundingProposal, ProposalId};
use crate::error::ErrorResponse;
use crate::identity::{Principal, PRINCIPAL_HEADER};
use crate::models::{BalanceResponse, CreateProposalArgs, DonateArgs, TaggedResult, VoteArgs};
use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::Router;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use thiserror::Error;
use tower::ServiceExt;
use tracing::debug;

/// Failure to obtain an answer at all, as opposed to an in-band `Err`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Service answered {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Decode(String),
}

/// The operations the console calls
pub trait DaoService: Send + Sync {
    fn get_treasury_balance(&self) -> impl Future<Output = Result<E8s, ClientError>> + Send;

    fn list_active_proposals(
        &self,
    ) -> impl Future<Output = Result<Vec<FundingProposal>, ClientError>> + Send;

    fn donate(
        &self,
        args: DonateArgs,
    ) -> impl Future<Output = Result<TaggedResult<String>, ClientError>> + Send;

    fn create_proposal(
        &self,
        args: CreateProposalArgs,
    ) -> impl Future<Output = Result<TaggedResult<ProposalId>, ClientError>> + Send;

    fn vote_on_proposal(
        &self,
        id: ProposalId,
        approve: bool,
    ) -> impl Future<Output = Result<TaggedResult<String>, ClientError>> + Send;
}

/// Calls the service through its router, acting as `caller`
#[derive(Clone)]
pub struct RouterService {
    router: Router,
    caller: Option<Principal>,
}

impl RouterService {
    pub fn new(router: Router) -> Self {
        Self { router, caller: None }
    }

    pub fn with_caller(router: Router, caller: Principal) -> Self {
        Self { router, caller: Some(caller) }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        uri: String,
        body: Option<&impl Serialize>,
    ) -> Result<T, ClientError> {
        let mut builder = Request::builder().method(method.clone()).uri(&uri);
        if let Some(caller) = &self.caller {
            builder = builder.header(PRINCIPAL_HEADER, caller.as_str());
        }

        let body = match body {
            Some(payload) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                let bytes = serde_json::to_vec(payload)
                    .map_err(|e| ClientError::Transport(e.to_string()))?;
                Body::from(bytes)
            }
            None => Body::empty(),
        };
        let request = builder
            .body(body)
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        debug!("📤 {} {}", method, uri);
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .unwrap_or_else(|never| match never {});

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorResponse>(&bytes)
                .map(|e| e.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
            return Err(ClientError::Status { status: status.as_u16(), message });
        }

        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

const NO_BODY: Option<&()> = None;

impl DaoService for RouterService {
    async fn get_treasury_balance(&self) -> Result<E8s, ClientError> {
        let response: BalanceResponse = self
            .call(Method::GET, "/api/treasury/balance".to_string(), NO_BODY)
            .await?;
        Ok(response.balance)
    }

    async fn list_active_proposals(&self) -> Result<Vec<FundingProposal>, ClientError> {
        self.call(Method::GET, "/api/proposals/active".to_string(), NO_BODY).await
    }

    async fn donate(&self, args: DonateArgs) -> Result<TaggedResult<String>, ClientError> {
        self.call(Method::POST, "/api/donations".to_string(), Some(&args)).await
    }

    async fn create_proposal(
        &self,
        args: CreateProposalArgs,
    ) -> Result<TaggedResult<ProposalId>, ClientError> {
        self.call(Method::POST, "/api/proposals".to_string(), Some(&args)).await
    }

    async fn vote_on_proposal(
        &self,
        id: ProposalId,
        approve: bool,
    ) -> Result<TaggedResult<String>, ClientError> {
        let args = VoteArgs { approve };
        self.call(Method::POST, format!("/api/proposals/{}/vote", id), Some(&args)).await
    }
}
