//! Console session state
//!
//! [`AppState`] only changes through [`apply`], which folds the outcome of
//! one request into the state and returns the follow-up [`Effect`]s.
//! [`Session`] issues the requests against a [`DaoService`] and runs the
//! effects.
//!
//! Every request carries a [`RequestToken`]. Only one request per
//! [`ActionKind`] is in flight at a time; an outcome whose token is no
//! longer current is discarded.

use super::display::DashboardView;
use super::form::{DonationForm, ProposalForm};
use super::service::{ClientError, DaoService};
use crate::dao::{E8s, FundingProposal, ProposalId};
use crate::models::TaggedResult;
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    LoadDashboard,
    Donate,
    CreateProposal,
    Vote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    kind: ActionKind,
    seq: u64,
}

impl RequestToken {
    pub fn kind(&self) -> ActionKind {
        self.kind
    }
}

/// Tracks the current request of each kind
#[derive(Debug, Default)]
pub struct RequestTracker {
    next_seq: u64,
    in_flight: HashMap<ActionKind, u64>,
}

impl RequestTracker {
    /// Start a request.
    ///
    /// Dashboard loads always start and supersede an older load.
    /// Other kinds are refused with `None` while one is in flight.
    pub fn begin(&mut self, kind: ActionKind) -> Option<RequestToken> {
        if kind != ActionKind::LoadDashboard && self.in_flight.contains_key(&kind) {
            return None;
        }
        self.next_seq += 1;
        self.in_flight.insert(kind, self.next_seq);
        Some(RequestToken { kind, seq: self.next_seq })
    }

    /// Finish a request; false when the token was superseded or already finished
    pub fn finish(&mut self, token: RequestToken) -> bool {
        if self.in_flight.get(&token.kind) == Some(&token.seq) {
            self.in_flight.remove(&token.kind);
            true
        } else {
            false
        }
    }

    pub fn is_busy(&self, kind: ActionKind) -> bool {
        self.in_flight.contains_key(&kind)
    }

    pub fn is_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A message shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

#[derive(Debug, Default)]
pub struct AppState {
    pub balance: E8s,
    pub proposals: Vec<FundingProposal>,
    pub proposal_form: ProposalForm,
    pub donation_form: DonationForm,
    pub notices: Vec<Notice>,
    pub requests: RequestTracker,
}

impl AppState {
    pub fn dashboard(&self) -> DashboardView {
        DashboardView::new(self.balance, &self.proposals)
    }

    pub fn last_notice(&self) -> Option<&Notice> {
        self.notices.last()
    }
}

/// Outcome of a request, tagged with the token it was issued under
#[derive(Debug)]
pub enum Event {
    DashboardLoaded {
        token: RequestToken,
        result: Result<(E8s, Vec<FundingProposal>), ClientError>,
    },
    DonationFinished {
        token: RequestToken,
        result: Result<TaggedResult<String>, ClientError>,
    },
    ProposalCreated {
        token: RequestToken,
        result: Result<TaggedResult<ProposalId>, ClientError>,
    },
    VoteFinished {
        token: RequestToken,
        approve: bool,
        result: Result<TaggedResult<String>, ClientError>,
    },
}

impl Event {
    fn token(&self) -> RequestToken {
        match self {
            Event::DashboardLoaded { token, .. }
            | Event::DonationFinished { token, .. }
            | Event::ProposalCreated { token, .. }
            | Event::VoteFinished { token, .. } => *token,
        }
    }
}

/// Follow-up work requested by [`apply`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    LoadDashboard,
}

/// Fold one request outcome into the state
pub fn apply(state: &mut AppState, event: Event) -> Vec<Effect> {
    if !state.requests.finish(event.token()) {
        debug!("Discarding stale {:?} outcome", event.token().kind());
        return Vec::new();
    }

    match event {
        Event::DashboardLoaded { result, .. } => {
            match result {
                Ok((balance, proposals)) => {
                    state.balance = balance;
                    state.proposals = proposals;
                }
                Err(e) => error!("Error loading data: {}", e),
            }
            Vec::new()
        }
        Event::DonationFinished { result, .. } => match result {
            Ok(Ok(_)) => {
                state.notices.push(Notice::success("Donation successful!"));
                state.donation_form.reset();
                vec![Effect::LoadDashboard]
            }
            Ok(Err(reason)) => {
                state.notices.push(Notice::error(format!("Donation failed: {}", reason)));
                Vec::new()
            }
            Err(e) => {
                error!("Error donating: {}", e);
                state.notices.push(Notice::error("Error processing donation"));
                Vec::new()
            }
        },
        Event::ProposalCreated { result, .. } => match result {
            Ok(Ok(id)) => {
                info!("Proposal {} created", id);
                state.notices.push(Notice::success("Proposal created successfully!"));
                state.proposal_form.reset();
                vec![Effect::LoadDashboard]
            }
            Ok(Err(reason)) => {
                state
                    .notices
                    .push(Notice::error(format!("Failed to create proposal: {}", reason)));
                Vec::new()
            }
            Err(e) => {
                error!("Error creating proposal: {}", e);
                state.notices.push(Notice::error("Error creating proposal"));
                Vec::new()
            }
        },
        Event::VoteFinished { approve, result, .. } => match result {
            Ok(Ok(_)) => {
                let verdict = if approve { "approved" } else { "rejected" };
                state
                    .notices
                    .push(Notice::success(format!("Vote {} successfully!", verdict)));
                vec![Effect::LoadDashboard]
            }
            Ok(Err(reason)) => {
                state.notices.push(Notice::error(format!("Vote failed: {}", reason)));
                Vec::new()
            }
            Err(e) => {
                error!("Error voting: {}", e);
                state.notices.push(Notice::error("Error processing vote"));
                Vec::new()
            }
        },
    }
}

/// Drives the console against a service
pub struct Session<S> {
    service: S,
    state: AppState,
}

impl<S: DaoService> Session<S> {
    pub fn new(service: S) -> Self {
        Self { service, state: AppState::default() }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn proposal_form_mut(&mut self) -> &mut ProposalForm {
        &mut self.state.proposal_form
    }

    pub fn donation_form_mut(&mut self) -> &mut DonationForm {
        &mut self.state.donation_form
    }

    /// Fetch the treasury balance and the active proposals
    pub async fn load_dashboard(&mut self) {
        let Some(token) = self.state.requests.begin(ActionKind::LoadDashboard) else {
            return;
        };
        let result = match self.service.get_treasury_balance().await {
            Ok(balance) => self
                .service
                .list_active_proposals()
                .await
                .map(|proposals| (balance, proposals)),
            Err(e) => Err(e),
        };
        apply(&mut self.state, Event::DashboardLoaded { token, result });
    }

    pub async fn donate(&mut self) {
        let args = match self.state.donation_form.to_args() {
            Ok(args) => args,
            Err(e) => {
                self.state.notices.push(Notice::error(e.to_string()));
                return;
            }
        };
        let Some(token) = self.begin(ActionKind::Donate) else {
            return;
        };
        let result = self.service.donate(args).await;
        let effects = apply(&mut self.state, Event::DonationFinished { token, result });
        self.run(effects).await;
    }

    pub async fn create_proposal(&mut self) {
        let args = match self.state.proposal_form.to_args() {
            Ok(args) => args,
            Err(e) => {
                self.state.notices.push(Notice::error(e.to_string()));
                return;
            }
        };
        let Some(token) = self.begin(ActionKind::CreateProposal) else {
            return;
        };
        let result = self.service.create_proposal(args).await;
        let effects = apply(&mut self.state, Event::ProposalCreated { token, result });
        self.run(effects).await;
    }

    pub async fn vote(&mut self, id: ProposalId, approve: bool) {
        let Some(token) = self.begin(ActionKind::Vote) else {
            return;
        };
        let result = self.service.vote_on_proposal(id, approve).await;
        let effects = apply(&mut self.state, Event::VoteFinished { token, approve, result });
        self.run(effects).await;
    }

    fn begin(&mut self, kind: ActionKind) -> Option<RequestToken> {
        let token = self.state.requests.begin(kind);
        if token.is_none() {
            warn!("⚠️ {:?} already in progress, ignoring", kind);
        }
        token
    }

    async fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::LoadDashboard => self.load_dashboard().await,
            }
        }
    }
}
