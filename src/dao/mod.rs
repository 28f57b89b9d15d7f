//! DAO module - treasury, proposals and voting
//!
//! Donors fund the treasury, propose grants, and vote with power equal to
//! what they have given. Proposals that reach quorum with enough yes votes
//! can be executed, which releases the funds.

pub mod audit;
pub mod clock;
mod error;
pub mod models;
mod store;
pub mod tally;

pub use error::{CallResult, DaoError};
pub use models::*;
pub use store::{DaoState, DaoStore, NewProposal};
