//! Identity module
//!
//! Opaque principal identifiers and caller extraction.
//! Principal derivation happens outside this service; callers arrive
//! already identified through the `x-principal` header.

mod middleware;

pub use middleware::{caller_middleware, require_admin, PRINCIPAL_HEADER};

use crate::error::AppError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Textual form of the anonymous principal
pub const ANONYMOUS_PRINCIPAL: &str = "2vxsx-fae";

/// Longest textual principal accepted
const MAX_PRINCIPAL_LEN: usize = 63;

/// Groups of five lowercase base32 characters, the last group may be shorter
static PRINCIPAL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z2-7]{5}(-[a-z2-7]{5})*(-[a-z2-7]{1,5})?$").expect("principal pattern compiles")
});

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrincipalError {
    #[error("Principal cannot be empty")]
    Empty,

    #[error("Principal exceeds {MAX_PRINCIPAL_LEN} characters")]
    TooLong,

    #[error("Malformed principal: {0}")]
    Malformed(String),
}

/// An opaque identity used to address donors, creators and recipients
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal(String);

impl Principal {
    pub fn parse(text: &str) -> Result<Self, PrincipalError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PrincipalError::Empty);
        }
        if text.len() > MAX_PRINCIPAL_LEN {
            return Err(PrincipalError::TooLong);
        }
        if !PRINCIPAL_PATTERN.is_match(text) {
            return Err(PrincipalError::Malformed(text.to_string()));
        }
        Ok(Self(text.to_string()))
    }

    pub fn anonymous() -> Self {
        Self(ANONYMOUS_PRINCIPAL.to_string())
    }

    pub fn is_anonymous(&self) -> bool {
        self.0 == ANONYMOUS_PRINCIPAL
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Principal {
    type Error = PrincipalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Principal::parse(&value)
    }
}

impl From<Principal> for String {
    fn from(principal: Principal) -> Self {
        principal.0
    }
}

impl std::str::FromStr for Principal {
    type Err = PrincipalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Principal::parse(s)
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The identity attached to a request by [`caller_middleware`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub Principal);

impl Caller {
    pub fn anonymous() -> Self {
        Caller(Principal::anonymous())
    }

    pub fn principal(&self) -> &Principal {
        &self.0
    }

    /// Update calls are refused outright for the anonymous principal
    pub fn require_authenticated(&self) -> Result<&Principal, AppError> {
        if self.0.is_anonymous() {
            return Err(AppError::Unauthorized(
                "Anonymous callers are not allowed".to_string(),
            ));
        }
        Ok(&self.0)
    }
}
