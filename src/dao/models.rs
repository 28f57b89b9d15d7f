//! DAO data models
//!
//! Treasury, donor, proposal and charity records as stored and as sent
//! over the wire.

use crate::dao::DaoError;
use crate::identity::Principal;
use serde::de::{self, Deserializer, IgnoredAny};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type ProposalId = u64;
pub type ProjectId = u64;

/// Smallest-unit amount; one displayed unit is [`E8S_PER_UNIT`]
pub type E8s = u64;

/// Nanoseconds since the Unix epoch
pub type TimestampNs = u64;

pub const E8S_PER_UNIT: u64 = 100_000_000;
pub const NANOS_PER_SECOND: u64 = 1_000_000_000;
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Proposal status in the funding workflow.
///
/// On the wire this is a single-key object such as `{"Active": null}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProposalStatus {
    /// Open for votes
    Active,
    /// Reached quorum with enough yes votes, awaiting execution
    Approved,
    /// Reached quorum without enough yes votes, or failed execution
    Rejected,
    /// Deadline passed before a decision
    Expired,
    /// Funds released to the recipient
    Executed,
    /// Withdrawn by its creator
    Cancelled,
}

impl ProposalStatus {
    pub const ALL: [ProposalStatus; 6] = [
        ProposalStatus::Active,
        ProposalStatus::Approved,
        ProposalStatus::Rejected,
        ProposalStatus::Expired,
        ProposalStatus::Executed,
        ProposalStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Active => "Active",
            ProposalStatus::Approved => "Approved",
            ProposalStatus::Rejected => "Rejected",
            ProposalStatus::Expired => "Expired",
            ProposalStatus::Executed => "Executed",
            ProposalStatus::Cancelled => "Cancelled",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == tag)
    }
}

impl std::fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ProposalStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.as_str(), &())?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for ProposalStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Accept the tagged object and, leniently, a bare tag string
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Bare(String),
            Tagged(HashMap<String, IgnoredAny>),
        }

        let tag = match Repr::deserialize(deserializer)? {
            Repr::Bare(tag) => tag,
            Repr::Tagged(map) => {
                if map.len() != 1 {
                    return Err(de::Error::custom("status must carry exactly one tag"));
                }
                map.into_keys().next().unwrap_or_default()
            }
        };

        ProposalStatus::from_tag(&tag)
            .ok_or_else(|| de::Error::custom(format!("unknown proposal status '{}'", tag)))
    }
}

/// A single ballot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub donor: Principal,
    pub voting_power: E8s,
    pub approved: bool,
    pub timestamp: TimestampNs,
}

/// A request to release treasury funds to a recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingProposal {
    pub id: ProposalId,
    pub creator: Principal,
    pub title: String,
    pub description: String,
    pub recipient: Principal,
    pub amount: E8s,
    pub status: ProposalStatus,
    pub votes: Vec<Vote>,
    pub yes_votes: E8s,
    pub no_votes: E8s,
    pub created_at: TimestampNs,
    pub expires_at: TimestampNs,
    pub executed_at: Option<TimestampNs>,
}

impl FundingProposal {
    pub fn is_active(&self) -> bool {
        self.status == ProposalStatus::Active
    }

    pub fn has_voted(&self, donor: &Principal) -> bool {
        self.votes.iter().any(|v| &v.donor == donor)
    }

    pub fn total_votes(&self) -> u128 {
        self.yes_votes as u128 + self.no_votes as u128
    }

    pub fn is_past_deadline(&self, now: TimestampNs) -> bool {
        now > self.expires_at
    }

    /// Record a ballot and fold it into the running tallies
    pub fn record_vote(&mut self, vote: Vote) -> Result<(), DaoError> {
        let side = if vote.approved { &mut self.yes_votes } else { &mut self.no_votes };
        *side = side.checked_add(vote.voting_power).ok_or(DaoError::Overflow)?;
        self.votes.push(vote);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationRecord {
    pub timestamp: TimestampNs,
    pub amount: E8s,
}

/// A contributor to the treasury; voting power follows donations one-to-one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donor {
    pub id: Principal,
    pub total_donations: E8s,
    pub voting_power: E8s,
    pub donation_history: Vec<DonationRecord>,
}

impl Donor {
    pub fn new(id: Principal) -> Self {
        Self {
            id,
            total_donations: 0,
            voting_power: 0,
            donation_history: Vec::new(),
        }
    }

    pub fn record_donation(&mut self, amount: E8s, timestamp: TimestampNs) -> Result<(), DaoError> {
        let total = self.total_donations.checked_add(amount).ok_or(DaoError::Overflow)?;
        let power = self.voting_power.checked_add(amount).ok_or(DaoError::Overflow)?;
        self.total_donations = total;
        self.voting_power = power;
        self.donation_history.push(DonationRecord { timestamp, amount });
        Ok(())
    }
}

/// A registered beneficiary organisation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharityProject {
    pub id: ProjectId,
    pub owner: Principal,
    pub name: String,
    pub description: String,
    pub total_received: E8s,
    pub proposals: Vec<ProposalId>,
    pub created_at: TimestampNs,
}

/// Rules applied to every proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceSettings {
    /// Shortest voting window, in seconds
    pub min_proposal_duration: u64,
    /// Share of total voting power that must have voted, 0-100
    pub quorum_percentage: u8,
    /// Share of cast votes that must be yes, 0-100
    pub approval_threshold: u8,
}

impl Default for GovernanceSettings {
    fn default() -> Self {
        Self {
            min_proposal_duration: 3 * SECONDS_PER_DAY,
            quorum_percentage: 25,
            approval_threshold: 51,
        }
    }
}

/// Partial update of [`GovernanceSettings`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceUpdate {
    #[serde(default)]
    pub min_proposal_duration: Option<u64>,
    #[serde(default)]
    pub quorum_percentage: Option<u8>,
    #[serde(default)]
    pub approval_threshold: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn principal(text: &str) -> Principal {
        Principal::parse(text).unwrap()
    }

    #[test]
    fn test_status_wire_shape() {
        let json = serde_json::to_value(ProposalStatus::Active).unwrap();
        assert_eq!(json, serde_json::json!({ "Active": null }));

        let parsed: ProposalStatus = serde_json::from_str(r#"{"Expired":null}"#).unwrap();
        assert_eq!(parsed, ProposalStatus::Expired);

        let bare: ProposalStatus = serde_json::from_str(r#""Executed""#).unwrap();
        assert_eq!(bare, ProposalStatus::Executed);
    }

    #[test]
    fn test_status_rejects_unknown_or_multiple_tags() {
        assert!(serde_json::from_str::<ProposalStatus>(r#"{"Pending":null}"#).is_err());
        assert!(serde_json::from_str::<ProposalStatus>(r#"{"Active":null,"Approved":null}"#).is_err());
    }

    #[test]
    fn test_donor_accumulates_power() {
        let mut donor = Donor::new(principal("aaaaa-aa"));
        donor.record_donation(150_000_000, 10).unwrap();
        donor.record_donation(50_000_000, 20).unwrap();

        assert_eq!(donor.total_donations, 200_000_000);
        assert_eq!(donor.voting_power, 200_000_000);
        assert_eq!(donor.donation_history.len(), 2);
        assert_eq!(donor.record_donation(u64::MAX, 30), Err(DaoError::Overflow));
    }

    #[test]
    fn test_record_vote_updates_tallies() {
        let mut proposal = FundingProposal {
            id: 0,
            creator: principal("aaaaa-aa"),
            title: "Wells".to_string(),
            description: "Drill two wells".to_string(),
            recipient: principal("rrkah-fqaaa-aaaaa-aaaaq-cai"),
            amount: E8S_PER_UNIT,
            status: ProposalStatus::Active,
            votes: Vec::new(),
            yes_votes: 0,
            no_votes: 0,
            created_at: 0,
            expires_at: 10,
            executed_at: None,
        };

        proposal
            .record_vote(Vote { donor: principal("aaaaa-aa"), voting_power: 300, approved: true, timestamp: 1 })
            .unwrap();
        proposal
            .record_vote(Vote { donor: principal("2vxsx-fae"), voting_power: 100, approved: false, timestamp: 2 })
            .unwrap();

        assert_eq!(proposal.yes_votes, 300);
        assert_eq!(proposal.no_votes, 100);
        assert_eq!(proposal.total_votes(), 400);
        assert!(proposal.has_voted(&principal("aaaaa-aa")));
        assert!(!proposal.is_past_deadline(10));
        assert!(proposal.is_past_deadline(11));
    }
}
