//! Audit trail
//!
//! Every successful state change leaves an entry so the treasury's history
//! can be inspected after the fact.

use crate::dao::models::TimestampNs;
use crate::identity::Principal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_AUDIT_LIMIT: usize = 50;
pub const MAX_AUDIT_LIMIT: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub timestamp: TimestampNs,
    pub actor: Principal,
    pub action: AuditAction,
    pub resource_id: Option<u64>,
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    DonationReceived,

    ProposalCreated,
    VoteCast,
    ProposalApproved,
    ProposalRejected,
    ProposalExpired,
    ProposalExecuted,
    ProposalCancelled,

    CharityRegistered,
    GovernanceUpdated,
}

/// Append-only log, read newest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    pub fn record(
        &mut self,
        timestamp: TimestampNs,
        actor: &Principal,
        action: AuditAction,
        resource_id: Option<u64>,
        details: Option<serde_json::Value>,
    ) {
        self.entries.push(AuditEntry {
            id: Uuid::new_v4(),
            timestamp,
            actor: actor.clone(),
            action,
            resource_id,
            details,
        });
    }

    pub fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        self.entries
            .iter()
            .rev()
            .take(limit.min(MAX_AUDIT_LIMIT))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
