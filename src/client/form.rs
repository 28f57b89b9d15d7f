//! Input forms and their conversion into service arguments
//!
//! Fields hold exactly what the user typed. Conversion parses the numbers
//! and scales them; anything unparsable is refused here, before a request
//! is made.

use crate::dao::{E8s, E8S_PER_UNIT, SECONDS_PER_DAY};
use crate::models::{CreateProposalArgs, DonateArgs};
use thiserror::Error;

/// Duration preselected on a fresh proposal form, in days
pub const DEFAULT_DURATION_DAYS: &str = "3";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),
}

/// Parse a non-negative decimal and scale it, rounding to the nearest integer
fn parse_scaled(text: &str, scale: u64) -> Option<u64> {
    let value: f64 = text.trim().parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    let scaled = (value * scale as f64).round();
    if scaled >= u64::MAX as f64 {
        return None;
    }
    Some(scaled as u64)
}

fn parse_amount(text: &str) -> Result<E8s, FormError> {
    if text.trim().is_empty() {
        return Err(FormError::Required("Amount"));
    }
    parse_scaled(text, E8S_PER_UNIT).ok_or_else(|| FormError::InvalidAmount(text.to_string()))
}

fn require(value: &str, field: &'static str) -> Result<String, FormError> {
    if value.trim().is_empty() {
        Err(FormError::Required(field))
    } else {
        Ok(value.to_string())
    }
}

/// The create-proposal form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalForm {
    pub title: String,
    pub description: String,
    pub recipient: String,
    /// Whole units, as typed
    pub amount: String,
    /// Days, as typed
    pub duration: String,
}

impl Default for ProposalForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            recipient: String::new(),
            amount: String::new(),
            duration: DEFAULT_DURATION_DAYS.to_string(),
        }
    }
}

impl ProposalForm {
    pub fn to_args(&self) -> Result<CreateProposalArgs, FormError> {
        let title = require(&self.title, "Title")?;
        let description = require(&self.description, "Description")?;
        let recipient = require(&self.recipient, "Recipient")?;
        let amount = parse_amount(&self.amount)?;
        let duration_seconds = parse_scaled(&self.duration, SECONDS_PER_DAY)
            .ok_or_else(|| FormError::InvalidDuration(self.duration.clone()))?;

        Ok(CreateProposalArgs {
            title,
            description,
            recipient: recipient.trim().to_string(),
            amount,
            duration_seconds,
        })
    }

    /// Back to the blank form
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// The donation form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DonationForm {
    /// Whole units, as typed
    pub amount: String,
}

impl DonationForm {
    pub fn to_args(&self) -> Result<DonateArgs, FormError> {
        parse_amount(&self.amount).map(|amount| DonateArgs { amount })
    }

    pub fn reset(&mut self) {
        self.amount.clear();
    }
}
