//! Presentation helpers for amounts, dates, tallies and proposal cards

use crate::dao::{E8s, FundingProposal, ProposalId, ProposalStatus, TimestampNs, E8S_PER_UNIT};
use chrono::DateTime;
use serde::Serialize;

/// Characters of a description shown on a card
pub const EXCERPT_CHARS: usize = 100;

/// Active proposals shown in the dashboard's recent list
pub const RECENT_PROPOSALS: usize = 3;

/// Fractional digits shown for amounts
const AMOUNT_SCALE: u128 = 10_000;

/// Render a smallest-unit amount as whole units with four decimals.
///
/// `150000000` renders as `"1.5000"`. Rounds half up at the fifth decimal.
pub fn format_amount(amount: E8s) -> String {
    let per_tick = (E8S_PER_UNIT as u128) / AMOUNT_SCALE;
    let ticks = (amount as u128 + per_tick / 2) / per_tick;
    format!("{}.{:04}", ticks / AMOUNT_SCALE, ticks % AMOUNT_SCALE)
}

/// Render a nanosecond timestamp as a UTC calendar date (`YYYY-MM-DD`)
pub fn format_date(timestamp: TimestampNs) -> String {
    let millis = (timestamp / 1_000_000) as i64;
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "Invalid Date".to_string())
}

/// Width of the yes-bar as a CSS percentage, `"0%"` when nobody voted
pub fn vote_bar_width(yes: E8s, no: E8s) -> String {
    let total = yes as u128 + no as u128;
    if total == 0 {
        return "0%".to_string();
    }

    // hundredths of a percent, rounded half up
    let hundredths = (yes as u128 * 20_000 + total) / (total * 2);
    let whole = hundredths / 100;
    let frac = hundredths % 100;
    if frac == 0 {
        format!("{}%", whole)
    } else {
        let frac = format!("{:02}", frac);
        format!("{}.{}%", whole, frac.trim_end_matches('0'))
    }
}

pub fn status_label(status: ProposalStatus) -> &'static str {
    match status {
        ProposalStatus::Active => "Active",
        ProposalStatus::Approved => "Approved",
        ProposalStatus::Rejected => "Rejected",
        ProposalStatus::Expired => "Expired",
        ProposalStatus::Executed => "Executed",
        ProposalStatus::Cancelled => "Cancelled",
    }
}

/// First [`EXCERPT_CHARS`] characters followed by an ellipsis
pub fn excerpt(text: &str) -> String {
    let mut short: String = text.chars().take(EXCERPT_CHARS).collect();
    short.push_str("...");
    short
}

/// Everything a proposal card shows, already formatted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProposalCard {
    pub id: ProposalId,
    pub title: String,
    pub description: String,
    pub excerpt: String,
    pub amount: String,
    pub status: &'static str,
    pub created: String,
    pub expires: String,
    pub yes_votes: String,
    pub no_votes: String,
    pub yes_bar_width: String,
}

impl From<&FundingProposal> for ProposalCard {
    fn from(proposal: &FundingProposal) -> Self {
        Self {
            id: proposal.id,
            title: proposal.title.clone(),
            description: proposal.description.clone(),
            excerpt: excerpt(&proposal.description),
            amount: format_amount(proposal.amount),
            status: status_label(proposal.status),
            created: format_date(proposal.created_at),
            expires: format_date(proposal.expires_at),
            yes_votes: format_amount(proposal.yes_votes),
            no_votes: format_amount(proposal.no_votes),
            yes_bar_width: vote_bar_width(proposal.yes_votes, proposal.no_votes),
        }
    }
}

/// Dashboard summary: balance, proposal count and the most recent cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub treasury_balance: String,
    pub active_proposals: usize,
    pub recent: Vec<ProposalCard>,
}

impl DashboardView {
    pub fn new(balance: E8s, proposals: &[FundingProposal]) -> Self {
        Self {
            treasury_balance: format_amount(balance),
            active_proposals: proposals.len(),
            recent: proposals
                .iter()
                .take(RECENT_PROPOSALS)
                .map(ProposalCard::from)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Principal;
    use pretty_assertions::assert_eq;

    fn proposal(id: ProposalId, yes: E8s, no: E8s) -> FundingProposal {
        FundingProposal {
            id,
            creator: Principal::parse("aaaaa-aa").unwrap(),
            title: format!("Proposal {}", id),
            description: "d".repeat(150),
            recipient: Principal::parse("qoctq-giaaa-aaaaa-aaaea-cai").unwrap(),
            amount: 250_000_000,
            status: ProposalStatus::Active,
            votes: Vec::new(),
            yes_votes: yes,
            no_votes: no,
            created_at: 1_700_000_000_000_000_000,
            expires_at: 1_700_604_800_000_000_000,
            executed_at: None,
        }
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(150_000_000), "1.5000");
        assert_eq!(format_amount(0), "0.0000");
        assert_eq!(format_amount(1), "0.0000");
        assert_eq!(format_amount(5_000), "0.0001");
        assert_eq!(format_amount(123_456_789_000), "1234.5679");
        assert_eq!(format_amount(u64::MAX), "184467440737.0955");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(1_700_000_000_000_000_000), "2023-11-14");
        assert_eq!(format_date(0), "1970-01-01");
    }

    #[test]
    fn test_vote_bar_width() {
        assert_eq!(vote_bar_width(3, 1), "75%");
        assert_eq!(vote_bar_width(0, 0), "0%");
        assert_eq!(vote_bar_width(0, 5), "0%");
        assert_eq!(vote_bar_width(5, 0), "100%");
        assert_eq!(vote_bar_width(1, 2), "33.33%");
        assert_eq!(vote_bar_width(1, 7), "12.5%");
    }

    #[test]
    fn test_status_labels_cover_every_status() {
        for status in ProposalStatus::ALL {
            assert_eq!(status_label(status), status.as_str());
        }
    }

    #[test]
    fn test_excerpt() {
        assert_eq!(excerpt("short"), "short...");
        assert_eq!(excerpt(&"é".repeat(120)).chars().count(), 103);
    }

    #[test]
    fn test_proposal_card() {
        let card = ProposalCard::from(&proposal(4, 3, 1));
        assert_eq!(card.amount, "2.5000");
        assert_eq!(card.status, "Active");
        assert_eq!(card.created, "2023-11-14");
        assert_eq!(card.expires, "2023-11-21");
        assert_eq!(card.yes_bar_width, "75%");
        assert_eq!(card.excerpt.len(), 103);
    }

    #[test]
    fn test_dashboard_shows_three_recent() {
        let proposals: Vec<_> = (0..5).map(|id| proposal(id, 0, 0)).collect();
        let view = DashboardView::new(150_000_000, &proposals);
        assert_eq!(view.treasury_balance, "1.5000");
        assert_eq!(view.active_proposals, 5);
        assert_eq!(view.recent.iter().map(|c| c.id).collect::<Vec<_>>(), vec![0, 1, 2]);
    }
}
