//! Application state management
//!
//! Contains shared state accessible across all handlers.

use crate::config::Settings;
use crate::dao::clock::{Clock, SystemClock};
use crate::dao::{DaoState, DaoStore};
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// Treasury, proposals and votes (has internal locking)
    pub dao: DaoStore,
}

impl AppState {
    /// Fresh state with the configured governance rules
    pub fn new(settings: &Settings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    pub fn with_clock(settings: &Settings, clock: Arc<dyn Clock>) -> Self {
        Self {
            dao: DaoStore::new(settings.governance, settings.admins.clone(), clock),
        }
    }

    /// Resume from a restored snapshot
    pub fn restored(settings: &Settings, state: DaoState) -> Self {
        Self {
            dao: DaoStore::from_state(state, settings.admins.clone(), Arc::new(SystemClock)),
        }
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::GovernanceSettings;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_restored_state_keeps_saved_governance() {
        let mut settings = Settings::default();
        settings.governance.quorum_percentage = 60;

        let saved = DaoState::with_settings(GovernanceSettings::default());
        let state = AppState::restored(&settings, saved);

        let effective = state.dao.get_governance_settings().await;
        assert_eq!(effective.quorum_percentage, 25);
        assert_ne!(effective, settings.governance);

        let fresh = AppState::new(&settings);
        assert_eq!(fresh.dao.get_governance_settings().await.quorum_percentage, 60);
    }
}
