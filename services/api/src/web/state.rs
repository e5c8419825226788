//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the per-request user identity.

use crate::config::Config;
use std::sync::Arc;
use study_core::ports::BlobStore;
use study_core::{ProgressCalculator, RewardCalculator, StudyTracker};

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub tracker: StudyTracker,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the tracker to `store` using the thresholds from `config`.
    pub fn new(store: Arc<dyn BlobStore>, config: Arc<Config>) -> Self {
        let tracker = StudyTracker::with_calculators(
            store,
            RewardCalculator::default(),
            ProgressCalculator::new(config.progress),
        );
        Self { tracker, config }
    }
}

//=========================================================================================
// Request Identity
//=========================================================================================

/// The user a request acts on, inserted into request extensions by `resolve_user`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(pub String);
