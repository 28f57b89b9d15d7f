//! Client console model
//!
//! Everything a dashboard front end needs short of drawing pixels:
//! formatting, form conversion, session state and the service seam.

pub mod display;
pub mod form;
pub mod service;
pub mod session;

pub use display::{format_amount, format_date, status_label, vote_bar_width, DashboardView, ProposalCard};
pub use form::{DonationForm, FormError, ProposalForm};
pub use service::{ClientError, DaoService, RouterService};
pub use session::{apply, ActionKind, AppState, Effect, Event, Notice, NoticeLevel, RequestTracker, Session};
