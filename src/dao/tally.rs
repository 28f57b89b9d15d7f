//! Vote tallying
//!
//! Decides a proposal once enough voting power has participated.

use crate::dao::models::GovernanceSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Quorum not reached yet
    Pending,
    Approved,
    Rejected,
}

/// Voting power that must be cast before a decision is taken
pub fn quorum_threshold(total_voting_power: u128, quorum_percentage: u8) -> u128 {
    total_voting_power * quorum_percentage as u128 / 100
}

/// Integer percentage of cast votes that were yes; `None` when nothing was cast
pub fn approval_percentage(yes_votes: u64, no_votes: u64) -> Option<u128> {
    let cast = yes_votes as u128 + no_votes as u128;
    if cast == 0 {
        return None;
    }
    Some(yes_votes as u128 * 100 / cast)
}

/// Evaluate the tallies of a proposal against the governance rules
pub fn evaluate(
    yes_votes: u64,
    no_votes: u64,
    total_voting_power: u128,
    settings: &GovernanceSettings,
) -> Decision {
    let cast = yes_votes as u128 + no_votes as u128;
    if cast < quorum_threshold(total_voting_power, settings.quorum_percentage) {
        return Decision::Pending;
    }

    match approval_percentage(yes_votes, no_votes) {
        None => Decision::Pending,
        Some(pct) if pct >= settings.approval_threshold as u128 => Decision::Approved,
        Some(_) => Decision::Rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(quorum: u8, threshold: u8) -> GovernanceSettings {
        GovernanceSettings {
            min_proposal_duration: 0,
            quorum_percentage: quorum,
            approval_threshold: threshold,
        }
    }

    #[test]
    fn test_pending_below_quorum() {
        // 25% of 1000 is 250; only 200 cast
        assert_eq!(evaluate(200, 0, 1000, &settings(25, 51)), Decision::Pending);
    }

    #[test]
    fn test_approved_at_threshold() {
        assert_eq!(evaluate(51, 49, 100, &settings(25, 51)), Decision::Approved);
    }

    #[test]
    fn test_rejected_below_threshold() {
        assert_eq!(evaluate(50, 50, 100, &settings(25, 51)), Decision::Rejected);
    }

    #[test]
    fn test_zero_votes_never_decides() {
        assert_eq!(evaluate(0, 0, 0, &settings(0, 0)), Decision::Pending);
        assert_eq!(approval_percentage(0, 0), None);
    }

    #[test]
    fn test_large_amounts_do_not_overflow() {
        assert_eq!(quorum_threshold(u64::MAX as u128 * 3, 100), u64::MAX as u128 * 3);
        assert_eq!(approval_percentage(u64::MAX, u64::MAX), Some(50));
    }
}
