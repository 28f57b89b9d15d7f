//! In-band business failures
//!
//! These travel back to the caller as `{"Err": reason}` rather than as
//! transport errors. The display strings are the reasons callers see.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DaoError {
    #[error("Donation amount must be greater than zero")]
    ZeroDonation,

    #[error("Title and description cannot be empty")]
    EmptyProposalText,

    #[error("Amount must be greater than zero")]
    ZeroAmount,

    #[error("Invalid recipient principal")]
    InvalidRecipient,

    #[error("Only donors can create proposals")]
    NotDonorProposer,

    #[error("Requested amount exceeds available funds")]
    ExceedsTreasury,

    #[error("Only donors can vote")]
    NotDonorVoter,

    #[error("Proposal not found")]
    ProposalNotFound,

    #[error("Proposal is not active")]
    ProposalNotActive,

    #[error("Proposal has expired")]
    ProposalExpired,

    #[error("Already voted on this proposal")]
    AlreadyVoted,

    #[error("Only approved proposals can be executed")]
    NotApproved,

    #[error("Insufficient funds in treasury")]
    InsufficientFunds,

    #[error("Only the proposal creator can cancel")]
    NotCreator,

    #[error("Name and description cannot be empty")]
    EmptyCharityText,

    #[error("Quorum percentage cannot exceed 100")]
    QuorumOutOfRange,

    #[error("Approval threshold cannot exceed 100")]
    ThresholdOutOfRange,

    #[error("Caller is not a governance admin")]
    NotGovernanceAdmin,

    #[error("Arithmetic overflow")]
    Overflow,
}

/// Tagged outcome returned by update operations
pub type CallResult<T> = Result<T, DaoError>;
