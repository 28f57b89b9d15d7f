//! Request and response payloads
//!
//! Shared by the HTTP routes and the client so both sides agree on the
//! wire format. Field names follow the service's operation arguments.

use crate::dao::{CallResult, E8s};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Arguments of `create_proposal`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CreateProposalArgs {
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: String,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: String,

    /// Textual principal; checked by the service, not the client
    #[validate(length(max = 63, message = "Recipient must be at most 63 characters"))]
    pub recipient: String,

    /// Smallest-unit amount
    pub amount: E8s,

    pub duration_seconds: u64,
}

/// Arguments of `donate`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonateArgs {
    pub amount: E8s,
}

/// Arguments of `vote_on_proposal`; the proposal id travels in the path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteArgs {
    pub approve: bool,
}

/// Arguments of `register_charity`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct RegisterCharityArgs {
    #[validate(length(max = 200, message = "Name must be at most 200 characters"))]
    pub name: String,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub balance: E8s,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<usize>,
}

/// Wire form of an update outcome: `{"Ok": value}` or `{"Err": reason}`
pub type TaggedResult<T> = Result<T, String>;

/// Flatten an in-band outcome into its wire form
pub fn tagged<T>(result: CallResult<T>) -> TaggedResult<T> {
    result.map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::DaoError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tagged_result_wire_shape() {
        let ok = serde_json::to_value(tagged(Ok::<u64, DaoError>(7))).unwrap();
        assert_eq!(ok, serde_json::json!({ "Ok": 7 }));

        let err = serde_json::to_value(tagged::<u64>(Err(DaoError::ExceedsTreasury))).unwrap();
        assert_eq!(err, serde_json::json!({ "Err": "Requested amount exceeds available funds" }));
    }

    #[test]
    fn test_create_proposal_args_limits() {
        let args = CreateProposalArgs {
            title: "t".repeat(201),
            description: "d".to_string(),
            recipient: "aaaaa-aa".to_string(),
            amount: 1,
            duration_seconds: 1,
        };
        assert!(args.validate().is_err());

        let args = CreateProposalArgs { title: "ok".to_string(), ..args };
        assert!(args.validate().is_ok());
    }
}
