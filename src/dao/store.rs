//! DAO state store
//!
//! Holds the treasury, donors, proposals and charity projects behind a
//! single lock. Every operation takes the lock once, so concurrent
//! donations, votes and executions are applied one at a time.

use crate::dao::audit::{AuditAction, AuditEntry, AuditLog};
use crate::dao::clock::Clock;
use crate::dao::models::*;
use crate::dao::tally::{self, Decision};
use crate::dao::{CallResult, DaoError};
use crate::identity::{require_admin, Principal};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Everything the service knows; saved and restored as one unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DaoState {
    pub donors: BTreeMap<Principal, Donor>,
    pub proposals: BTreeMap<ProposalId, FundingProposal>,
    pub charity_projects: BTreeMap<ProjectId, CharityProject>,
    /// Funds currently held
    pub treasury_balance: E8s,
    /// Lifetime donations, never decreases
    pub total_donated: E8s,
    pub next_proposal_id: ProposalId,
    pub next_project_id: ProjectId,
    pub governance: GovernanceSettings,
    pub audit: AuditLog,
}

impl DaoState {
    pub fn with_settings(governance: GovernanceSettings) -> Self {
        Self {
            governance,
            ..Self::default()
        }
    }

    fn total_voting_power(&self) -> u128 {
        self.donors.values().map(|d| d.voting_power as u128).sum()
    }

    /// Move every active proposal whose deadline has passed to `Expired`
    fn expire_overdue(&mut self, now: TimestampNs) -> Vec<ProposalId> {
        let mut expired = Vec::new();
        for proposal in self.proposals.values_mut() {
            if proposal.is_active() && proposal.is_past_deadline(now) {
                proposal.status = ProposalStatus::Expired;
                expired.push(proposal.id);
            }
        }
        // no caller caused these; the deadline did
        let system = Principal::anonymous();
        for id in &expired {
            self.audit.record(
                now,
                &system,
                AuditAction::ProposalExpired,
                Some(*id),
                Some(serde_json::json!({ "trigger": "sweep" })),
            );
        }
        expired
    }
}

/// Arguments of a new funding proposal, as received from the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProposal {
    pub title: String,
    pub description: String,
    pub recipient: String,
    pub amount: E8s,
    pub duration_seconds: u64,
}

/// Thread-safe DAO store
pub struct DaoStore {
    state: RwLock<DaoState>,
    admins: Vec<Principal>,
    clock: Arc<dyn Clock>,
}

impl DaoStore {
    pub fn new(settings: GovernanceSettings, admins: Vec<Principal>, clock: Arc<dyn Clock>) -> Self {
        Self::from_state(DaoState::with_settings(settings), admins, clock)
    }

    /// Resume from a previously saved state
    pub fn from_state(state: DaoState, admins: Vec<Principal>, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RwLock::new(state),
            admins,
            clock,
        }
    }

    /// Copy of the full state, for persistence
    pub async fn snapshot(&self) -> DaoState {
        self.state.read().await.clone()
    }

    // =========================================================================
    // DONATIONS
    // =========================================================================

    /// Credit a donation to the caller and the treasury
    pub async fn donate(&self, donor: &Principal, amount: E8s) -> CallResult<String> {
        if amount == 0 {
            return Err(DaoError::ZeroDonation);
        }

        let now = self.clock.now_ns();
        let mut state = self.state.write().await;

        let treasury = state.treasury_balance.checked_add(amount).ok_or(DaoError::Overflow)?;
        let total = state.total_donated.checked_add(amount).ok_or(DaoError::Overflow)?;

        state
            .donors
            .entry(donor.clone())
            .or_insert_with(|| Donor::new(donor.clone()))
            .record_donation(amount, now)?;
        state.treasury_balance = treasury;
        state.total_donated = total;

        state.audit.record(
            now,
            donor,
            AuditAction::DonationReceived,
            None,
            Some(serde_json::json!({ "amount": amount })),
        );

        info!("Donation of {} e8s from {}", amount, donor);
        Ok(format!("Successfully donated {} e8s", amount))
    }

    // =========================================================================
    // PROPOSALS
    // =========================================================================

    /// Open a funding proposal for voting
    pub async fn create_proposal(&self, creator: &Principal, args: NewProposal) -> CallResult<ProposalId> {
        if args.title.trim().is_empty() || args.description.trim().is_empty() {
            return Err(DaoError::EmptyProposalText);
        }
        if args.amount == 0 {
            return Err(DaoError::ZeroAmount);
        }
        let recipient = Principal::parse(&args.recipient).map_err(|_| DaoError::InvalidRecipient)?;

        let now = self.clock.now_ns();
        let mut state = self.state.write().await;

        if !state.donors.contains_key(creator) {
            warn!("Non-donor {} tried to create a proposal", creator);
            return Err(DaoError::NotDonorProposer);
        }

        let duration = args
            .duration_seconds
            .max(state.governance.min_proposal_duration)
            .max(1);

        if args.amount > state.treasury_balance {
            return Err(DaoError::ExceedsTreasury);
        }

        let expires_at = duration
            .checked_mul(NANOS_PER_SECOND)
            .and_then(|window| now.checked_add(window))
            .ok_or(DaoError::Overflow)?;

        let id = state.next_proposal_id;
        state.next_proposal_id += 1;

        let proposal = FundingProposal {
            id,
            creator: creator.clone(),
            title: args.title,
            description: args.description,
            recipient,
            amount: args.amount,
            status: ProposalStatus::Active,
            votes: Vec::new(),
            yes_votes: 0,
            no_votes: 0,
            created_at: now,
            expires_at,
            executed_at: None,
        };

        state.audit.record(
            now,
            creator,
            AuditAction::ProposalCreated,
            Some(id),
            Some(serde_json::json!({
                "title": proposal.title,
                "amount": proposal.amount,
                "recipient": proposal.recipient,
                "duration_seconds": duration
            })),
        );

        info!("Created proposal '{}' (id: {})", proposal.title, id);
        state.proposals.insert(id, proposal);
        Ok(id)
    }

    /// Cast the caller's weighted vote and decide the proposal once quorum is met
    pub async fn vote_on_proposal(&self, donor: &Principal, proposal_id: ProposalId, approve: bool) -> CallResult<String> {
        let now = self.clock.now_ns();
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let voting_power = state
            .donors
            .get(donor)
            .map(|d| d.voting_power)
            .ok_or(DaoError::NotDonorVoter)?;
        let settings = state.governance;
        let total_voting_power = state.total_voting_power();

        let proposal = state
            .proposals
            .get_mut(&proposal_id)
            .ok_or(DaoError::ProposalNotFound)?;

        if !proposal.is_active() {
            return Err(DaoError::ProposalNotActive);
        }

        if proposal.is_past_deadline(now) {
            proposal.status = ProposalStatus::Expired;
            state.audit.record(
                now,
                donor,
                AuditAction::ProposalExpired,
                Some(proposal_id),
                Some(serde_json::json!({ "trigger": "vote" })),
            );
            info!("Proposal {} expired", proposal_id);
            return Err(DaoError::ProposalExpired);
        }

        if proposal.has_voted(donor) {
            return Err(DaoError::AlreadyVoted);
        }

        proposal.record_vote(Vote {
            donor: donor.clone(),
            voting_power,
            approved: approve,
            timestamp: now,
        })?;

        let decision = tally::evaluate(proposal.yes_votes, proposal.no_votes, total_voting_power, &settings);
        match decision {
            Decision::Pending => {}
            Decision::Approved => proposal.status = ProposalStatus::Approved,
            Decision::Rejected => proposal.status = ProposalStatus::Rejected,
        }
        let (yes, no, cast) = (proposal.yes_votes, proposal.no_votes, proposal.total_votes());

        state.audit.record(
            now,
            donor,
            AuditAction::VoteCast,
            Some(proposal_id),
            Some(serde_json::json!({ "approve": approve, "voting_power": voting_power })),
        );
        match decision {
            Decision::Pending => {}
            Decision::Approved => {
                state.audit.record(now, donor, AuditAction::ProposalApproved, Some(proposal_id), None);
            }
            Decision::Rejected => {
                state.audit.record(now, donor, AuditAction::ProposalRejected, Some(proposal_id), None);
            }
        }

        info!(
            "Vote on proposal {} by {} (approve: {}, power: {}); tally {}/{} of {} cast -> {:?}",
            proposal_id, donor, approve, voting_power, yes, no, cast, decision
        );
        Ok("Vote recorded successfully".to_string())
    }

    /// Release the funds of an approved proposal
    pub async fn execute_proposal(&self, caller: &Principal, proposal_id: ProposalId) -> CallResult<String> {
        let now = self.clock.now_ns();
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        let treasury = state.treasury_balance;

        let proposal = state
            .proposals
            .get_mut(&proposal_id)
            .ok_or(DaoError::ProposalNotFound)?;

        if proposal.status != ProposalStatus::Approved {
            return Err(DaoError::NotApproved);
        }

        if proposal.amount > treasury {
            proposal.status = ProposalStatus::Rejected;
            state.audit.record(
                now,
                caller,
                AuditAction::ProposalRejected,
                Some(proposal_id),
                Some(serde_json::json!({ "reason": DaoError::InsufficientFunds.to_string() })),
            );
            warn!("Proposal {} rejected at execution: insufficient funds", proposal_id);
            return Err(DaoError::InsufficientFunds);
        }

        proposal.status = ProposalStatus::Executed;
        proposal.executed_at = Some(now);
        let amount = proposal.amount;
        let recipient = proposal.recipient.clone();

        state.treasury_balance = treasury - amount;

        // Credit the recipient's first registered project, if any
        if let Some(project) = state
            .charity_projects
            .values_mut()
            .find(|p| p.owner == recipient)
        {
            project.total_received = project.total_received.saturating_add(amount);
            project.proposals.push(proposal_id);
        }

        state.audit.record(
            now,
            caller,
            AuditAction::ProposalExecuted,
            Some(proposal_id),
            Some(serde_json::json!({ "amount": amount, "recipient": recipient })),
        );

        info!("Executed proposal {}: {} e8s to {}", proposal_id, amount, recipient);
        Ok("Proposal executed successfully".to_string())
    }

    /// Withdraw an active proposal; only its creator may do so
    pub async fn cancel_proposal(&self, caller: &Principal, proposal_id: ProposalId) -> CallResult<String> {
        let now = self.clock.now_ns();
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let proposal = state
            .proposals
            .get_mut(&proposal_id)
            .ok_or(DaoError::ProposalNotFound)?;

        if &proposal.creator != caller {
            return Err(DaoError::NotCreator);
        }
        if !proposal.is_active() {
            return Err(DaoError::ProposalNotActive);
        }

        proposal.status = ProposalStatus::Cancelled;
        state.audit.record(now, caller, AuditAction::ProposalCancelled, Some(proposal_id), None);

        info!("Proposal {} cancelled by {}", proposal_id, caller);
        Ok("Proposal cancelled".to_string())
    }

    /// Expire overdue proposals, returning the ids that changed
    pub async fn expire_overdue(&self) -> Vec<ProposalId> {
        let now = self.clock.now_ns();
        let expired = self.state.write().await.expire_overdue(now);
        if !expired.is_empty() {
            info!("Expired {} overdue proposal(s)", expired.len());
        }
        expired
    }

    pub async fn get_proposal(&self, id: ProposalId) -> Option<FundingProposal> {
        debug!("Looking up proposal {}", id);
        self.state.read().await.proposals.get(&id).cloned()
    }

    /// Proposals still open for voting, in id order
    pub async fn list_active_proposals(&self) -> Vec<FundingProposal> {
        self.expire_overdue().await;
        let state = self.state.read().await;
        state
            .proposals
            .values()
            .filter(|p| p.is_active())
            .cloned()
            .collect()
    }

    pub async fn list_all_proposals(&self) -> Vec<FundingProposal> {
        let state = self.state.read().await;
        state.proposals.values().cloned().collect()
    }

    // =========================================================================
    // DONORS & TREASURY
    // =========================================================================

    pub async fn get_donor(&self, id: &Principal) -> Option<Donor> {
        self.state.read().await.donors.get(id).cloned()
    }

    pub async fn get_treasury_balance(&self) -> E8s {
        self.state.read().await.treasury_balance
    }

    // =========================================================================
    // CHARITY PROJECTS
    // =========================================================================

    pub async fn register_charity(&self, owner: &Principal, name: String, description: String) -> CallResult<ProjectId> {
        if name.trim().is_empty() || description.trim().is_empty() {
            return Err(DaoError::EmptyCharityText);
        }

        let now = self.clock.now_ns();
        let mut state = self.state.write().await;

        let id = state.next_project_id;
        state.next_project_id += 1;

        state.audit.record(
            now,
            owner,
            AuditAction::CharityRegistered,
            Some(id),
            Some(serde_json::json!({ "name": name })),
        );

        info!("Registered charity '{}' (id: {}) for {}", name, id, owner);
        state.charity_projects.insert(
            id,
            CharityProject {
                id,
                owner: owner.clone(),
                name,
                description,
                total_received: 0,
                proposals: Vec::new(),
                created_at: now,
            },
        );
        Ok(id)
    }

    pub async fn get_charity_project(&self, id: ProjectId) -> Option<CharityProject> {
        self.state.read().await.charity_projects.get(&id).cloned()
    }

    pub async fn list_charity_projects(&self) -> Vec<CharityProject> {
        let state = self.state.read().await;
        state.charity_projects.values().cloned().collect()
    }

    // =========================================================================
    // GOVERNANCE
    // =========================================================================

    pub async fn get_governance_settings(&self) -> GovernanceSettings {
        self.state.read().await.governance
    }

    pub async fn update_governance_settings(&self, caller: &Principal, update: GovernanceUpdate) -> CallResult<String> {
        require_admin(caller, &self.admins)?;

        if update.quorum_percentage.is_some_and(|q| q > 100) {
            return Err(DaoError::QuorumOutOfRange);
        }
        if update.approval_threshold.is_some_and(|t| t > 100) {
            return Err(DaoError::ThresholdOutOfRange);
        }

        let now = self.clock.now_ns();
        let mut state = self.state.write().await;

        if let Some(duration) = update.min_proposal_duration {
            state.governance.min_proposal_duration = duration;
        }
        if let Some(quorum) = update.quorum_percentage {
            state.governance.quorum_percentage = quorum;
        }
        if let Some(threshold) = update.approval_threshold {
            state.governance.approval_threshold = threshold;
        }

        let settings = state.governance;
        state.audit.record(
            now,
            caller,
            AuditAction::GovernanceUpdated,
            None,
            serde_json::to_value(settings).ok(),
        );

        info!("Governance settings updated by {}: {:?}", caller, settings);
        Ok("Governance settings updated successfully".to_string())
    }

    pub async fn audit_log(&self, limit: usize) -> Vec<AuditEntry> {
        self.state.read().await.audit.recent(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::clock::ManualClock;
    use pretty_assertions::assert_eq;
    use tokio_test::{assert_err, assert_ok};

    const START: TimestampNs = 1_700_000_000_000_000_000;
    const ALICE: &str = "aaaaa-aa";
    const BOB: &str = "rrkah-fqaaa-aaaaa-aaaaq-cai";
    const CAROL: &str = "ryjl3-tyaaa-aaaaa-aaaba-cai";
    const CHARITY: &str = "qoctq-giaaa-aaaaa-aaaea-cai";

    fn p(text: &str) -> Principal {
        Principal::parse(text).unwrap()
    }

    fn store_with_clock() -> (DaoStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(START));
        let store = DaoStore::new(GovernanceSettings::default(), Vec::new(), clock.clone());
        (store, clock)
    }

    fn proposal_args(amount: E8s, days: u64) -> NewProposal {
        NewProposal {
            title: "School roof".to_string(),
            description: "Repair the roof of the village school".to_string(),
            recipient: CHARITY.to_string(),
            amount,
            duration_seconds: days * SECONDS_PER_DAY,
        }
    }

    #[tokio::test]
    async fn test_donation_grows_treasury_and_power() {
        let (store, _) = store_with_clock();

        let msg = assert_ok!(store.donate(&p(ALICE), 150_000_000).await);
        assert_eq!(msg, "Successfully donated 150000000 e8s");
        assert_ok!(store.donate(&p(ALICE), 50_000_000).await);

        assert_eq!(store.get_treasury_balance().await, 200_000_000);
        let donor = store.get_donor(&p(ALICE)).await.unwrap();
        assert_eq!(donor.voting_power, 200_000_000);
        assert_eq!(donor.donation_history.len(), 2);
    }

    #[tokio::test]
    async fn test_zero_donation_is_refused() {
        let (store, _) = store_with_clock();
        assert_eq!(store.donate(&p(ALICE), 0).await, Err(DaoError::ZeroDonation));
        assert!(store.get_donor(&p(ALICE)).await.is_none());
    }

    #[tokio::test]
    async fn test_create_proposal_validations() {
        let (store, _) = store_with_clock();

        let mut empty = proposal_args(1, 3);
        empty.title = "   ".to_string();
        assert_eq!(store.create_proposal(&p(ALICE), empty).await, Err(DaoError::EmptyProposalText));
        assert_eq!(store.create_proposal(&p(ALICE), proposal_args(0, 3)).await, Err(DaoError::ZeroAmount));

        let mut bad_recipient = proposal_args(1, 3);
        bad_recipient.recipient = "not a principal".to_string();
        assert_eq!(store.create_proposal(&p(ALICE), bad_recipient).await, Err(DaoError::InvalidRecipient));

        assert_eq!(
            store.create_proposal(&p(ALICE), proposal_args(1, 3)).await,
            Err(DaoError::NotDonorProposer)
        );

        store.donate(&p(ALICE), 100).await.unwrap();
        assert_eq!(
            store.create_proposal(&p(ALICE), proposal_args(101, 3)).await,
            Err(DaoError::ExceedsTreasury)
        );
        assert_eq!(store.create_proposal(&p(ALICE), proposal_args(100, 3)).await, Ok(0));
        assert_eq!(store.create_proposal(&p(ALICE), proposal_args(100, 3)).await, Ok(1));
    }

    #[tokio::test]
    async fn test_duration_is_clamped_to_minimum_in_nanoseconds() {
        let (store, _) = store_with_clock();
        store.donate(&p(ALICE), 1_000).await.unwrap();

        let short = store.create_proposal(&p(ALICE), proposal_args(10, 1)).await.unwrap();
        let long = store.create_proposal(&p(ALICE), proposal_args(10, 7)).await.unwrap();

        let short = store.get_proposal(short).await.unwrap();
        let long = store.get_proposal(long).await.unwrap();

        assert_eq!(short.created_at, START);
        assert_eq!(short.expires_at, START + 3 * SECONDS_PER_DAY * NANOS_PER_SECOND);
        assert_eq!(long.expires_at, START + 7 * SECONDS_PER_DAY * NANOS_PER_SECOND);
        assert!(short.expires_at > short.created_at);
        assert_eq!(short.status, ProposalStatus::Active);
    }

    #[tokio::test]
    async fn test_zero_duration_without_minimum_lasts_one_second() {
        let clock = Arc::new(ManualClock::new(START));
        let settings = GovernanceSettings { min_proposal_duration: 0, ..GovernanceSettings::default() };
        let store = DaoStore::new(settings, Vec::new(), clock);
        store.donate(&p(ALICE), 100).await.unwrap();

        let id = store.create_proposal(&p(ALICE), proposal_args(10, 0)).await.unwrap();
        let proposal = store.get_proposal(id).await.unwrap();
        assert_eq!(proposal.expires_at, proposal.created_at + NANOS_PER_SECOND);
        assert!(proposal.expires_at > proposal.created_at);
    }

    #[tokio::test]
    async fn test_vote_reaches_quorum_and_approves() {
        let (store, _) = store_with_clock();
        store.donate(&p(ALICE), 300).await.unwrap();
        store.donate(&p(BOB), 100).await.unwrap();
        store.donate(&p(CAROL), 600).await.unwrap();
        let id = store.create_proposal(&p(ALICE), proposal_args(500, 3)).await.unwrap();

        // 25% of 1000 = 250; alice alone reaches it
        assert_ok!(store.vote_on_proposal(&p(ALICE), id, true).await);

        let proposal = store.get_proposal(id).await.unwrap();
        assert_eq!(proposal.yes_votes, 300);
        assert_eq!(proposal.no_votes, 0);
        assert_eq!(proposal.status, ProposalStatus::Approved);
        assert!(store.list_active_proposals().await.is_empty());
    }

    #[tokio::test]
    async fn test_vote_below_quorum_stays_active_then_rejects() {
        let (store, _) = store_with_clock();
        store.donate(&p(ALICE), 100).await.unwrap();
        store.donate(&p(BOB), 200).await.unwrap();
        store.donate(&p(CAROL), 700).await.unwrap();
        let id = store.create_proposal(&p(ALICE), proposal_args(50, 3)).await.unwrap();

        store.vote_on_proposal(&p(ALICE), id, true).await.unwrap();
        assert_eq!(store.get_proposal(id).await.unwrap().status, ProposalStatus::Active);

        // 100 yes / 200 no = 33% < 51%
        store.vote_on_proposal(&p(BOB), id, false).await.unwrap();
        let proposal = store.get_proposal(id).await.unwrap();
        assert_eq!(proposal.status, ProposalStatus::Rejected);
        assert_eq!(proposal.votes.len(), 2);
    }

    #[tokio::test]
    async fn test_vote_refusals() {
        let (store, _) = store_with_clock();
        store.donate(&p(ALICE), 100).await.unwrap();
        store.donate(&p(BOB), 1_000).await.unwrap();
        let id = store.create_proposal(&p(ALICE), proposal_args(50, 3)).await.unwrap();

        assert_eq!(store.vote_on_proposal(&p(CAROL), id, true).await, Err(DaoError::NotDonorVoter));
        assert_eq!(store.vote_on_proposal(&p(ALICE), 99, true).await, Err(DaoError::ProposalNotFound));

        store.vote_on_proposal(&p(ALICE), id, true).await.unwrap();
        assert_eq!(store.vote_on_proposal(&p(ALICE), id, false).await, Err(DaoError::AlreadyVoted));
    }

    #[tokio::test]
    async fn test_vote_after_deadline_expires_proposal() {
        let (store, clock) = store_with_clock();
        store.donate(&p(ALICE), 100).await.unwrap();
        let id = store.create_proposal(&p(ALICE), proposal_args(50, 3)).await.unwrap();

        clock.advance(3 * SECONDS_PER_DAY * NANOS_PER_SECOND + 1);

        store.donate(&p(BOB), 10).await.unwrap();
        assert_eq!(store.vote_on_proposal(&p(BOB), id, true).await, Err(DaoError::ProposalExpired));
        assert_eq!(store.get_proposal(id).await.unwrap().status, ProposalStatus::Expired);

        let entry = store.audit_log(1).await.remove(0);
        assert_eq!(entry.action, AuditAction::ProposalExpired);
        assert_eq!(entry.actor, p(BOB));
        assert_eq!(entry.details, Some(serde_json::json!({ "trigger": "vote" })));

        assert_eq!(store.vote_on_proposal(&p(ALICE), id, true).await, Err(DaoError::ProposalNotActive));
    }

    #[tokio::test]
    async fn test_listing_sweeps_overdue_proposals() {
        let (store, clock) = store_with_clock();
        store.donate(&p(ALICE), 100).await.unwrap();
        let short = store.create_proposal(&p(ALICE), proposal_args(10, 3)).await.unwrap();
        let long = store.create_proposal(&p(ALICE), proposal_args(10, 10)).await.unwrap();

        clock.advance(5 * SECONDS_PER_DAY * NANOS_PER_SECOND);

        let active: Vec<_> = store.list_active_proposals().await.into_iter().map(|p| p.id).collect();
        assert_eq!(active, vec![long]);
        assert_eq!(store.get_proposal(short).await.unwrap().status, ProposalStatus::Expired);
        assert_eq!(store.list_all_proposals().await.len(), 2);

        let entry = store.audit_log(1).await.remove(0);
        assert_eq!(entry.action, AuditAction::ProposalExpired);
        assert_eq!(entry.resource_id, Some(short));
        assert!(entry.actor.is_anonymous());
        assert_eq!(entry.details, Some(serde_json::json!({ "trigger": "sweep" })));
    }

    #[tokio::test]
    async fn test_execute_debits_treasury_once_and_credits_project() {
        let (store, _) = store_with_clock();
        store.donate(&p(ALICE), 1_000).await.unwrap();
        let project = store
            .register_charity(&p(CHARITY), "Clean Water".to_string(), "Wells for villages".to_string())
            .await
            .unwrap();
        let id = store.create_proposal(&p(ALICE), proposal_args(400, 3)).await.unwrap();

        assert_eq!(store.execute_proposal(&p(BOB), id).await, Err(DaoError::NotApproved));

        store.vote_on_proposal(&p(ALICE), id, true).await.unwrap();
        let msg = assert_ok!(store.execute_proposal(&p(BOB), id).await);
        assert_eq!(msg, "Proposal executed successfully");
        assert_eq!(store.get_treasury_balance().await, 600);

        let proposal = store.get_proposal(id).await.unwrap();
        assert_eq!(proposal.status, ProposalStatus::Executed);
        assert_eq!(proposal.executed_at, Some(START));

        assert_err!(store.execute_proposal(&p(BOB), id).await);
        assert_eq!(store.get_treasury_balance().await, 600);

        let project = store.get_charity_project(project).await.unwrap();
        assert_eq!(project.total_received, 400);
        assert_eq!(project.proposals, vec![id]);
    }

    #[tokio::test]
    async fn test_execute_with_insufficient_funds_rejects() {
        let (store, _) = store_with_clock();
        store.donate(&p(ALICE), 1_000).await.unwrap();
        let first = store.create_proposal(&p(ALICE), proposal_args(800, 3)).await.unwrap();
        let second = store.create_proposal(&p(ALICE), proposal_args(800, 3)).await.unwrap();
        store.vote_on_proposal(&p(ALICE), first, true).await.unwrap();
        store.vote_on_proposal(&p(ALICE), second, true).await.unwrap();

        store.execute_proposal(&p(ALICE), first).await.unwrap();
        assert_eq!(store.execute_proposal(&p(ALICE), second).await, Err(DaoError::InsufficientFunds));
        assert_eq!(store.get_proposal(second).await.unwrap().status, ProposalStatus::Rejected);
        assert_eq!(store.get_treasury_balance().await, 200);
    }

    #[tokio::test]
    async fn test_cancel_only_by_creator_while_active() {
        let (store, _) = store_with_clock();
        store.donate(&p(ALICE), 100).await.unwrap();
        let id = store.create_proposal(&p(ALICE), proposal_args(10, 3)).await.unwrap();

        assert_eq!(store.cancel_proposal(&p(BOB), id).await, Err(DaoError::NotCreator));
        assert_ok!(store.cancel_proposal(&p(ALICE), id).await);
        assert_eq!(store.get_proposal(id).await.unwrap().status, ProposalStatus::Cancelled);
        assert_eq!(store.cancel_proposal(&p(ALICE), id).await, Err(DaoError::ProposalNotActive));
    }

    #[tokio::test]
    async fn test_register_charity_requires_text() {
        let (store, _) = store_with_clock();
        assert_eq!(
            store.register_charity(&p(ALICE), String::new(), "x".to_string()).await,
            Err(DaoError::EmptyCharityText)
        );
        assert_eq!(store.register_charity(&p(ALICE), "A".to_string(), "B".to_string()).await, Ok(0));
        assert_eq!(store.list_charity_projects().await.len(), 1);
    }

    #[tokio::test]
    async fn test_governance_update_bounds_and_admins() {
        let clock = Arc::new(ManualClock::new(START));
        let store = DaoStore::new(GovernanceSettings::default(), vec![p(ALICE)], clock);

        let update = GovernanceUpdate { quorum_percentage: Some(40), ..Default::default() };
        assert_eq!(
            store.update_governance_settings(&p(BOB), update).await,
            Err(DaoError::NotGovernanceAdmin)
        );

        let too_high = GovernanceUpdate { approval_threshold: Some(101), ..Default::default() };
        assert_eq!(
            store.update_governance_settings(&p(ALICE), too_high).await,
            Err(DaoError::ThresholdOutOfRange)
        );

        assert_ok!(store.update_governance_settings(&p(ALICE), update).await);
        let settings = store.get_governance_settings().await;
        assert_eq!(settings.quorum_percentage, 40);
        assert_eq!(settings.approval_threshold, 51);
    }

    #[tokio::test]
    async fn test_audit_trail_records_mutations() {
        let (store, _) = store_with_clock();
        store.donate(&p(ALICE), 100).await.unwrap();
        let id = store.create_proposal(&p(ALICE), proposal_args(10, 3)).await.unwrap();
        store.vote_on_proposal(&p(ALICE), id, true).await.unwrap();

        let actions: Vec<_> = store.audit_log(10).await.into_iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![
                AuditAction::ProposalApproved,
                AuditAction::VoteCast,
                AuditAction::ProposalCreated,
                AuditAction::DonationReceived,
            ]
        );
    }

    #[tokio::test]
    async fn test_concurrent_donations_are_all_applied() {
        let (store, _) = store_with_clock();
        let store = Arc::new(store);

        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.donate(&p(ALICE), 2).await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.get_treasury_balance().await, 100);
        assert_eq!(store.get_donor(&p(ALICE)).await.unwrap().donation_history.len(), 50);
    }
}
