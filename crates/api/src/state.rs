use std::sync::Arc;

use appraise_core::lifecycle::LifecycleEngine;
use appraise_core::records::AppraisalRecords;
use appraise_core::store::AppraisalStore;
use appraise_core::transition::TransitionAuthorizer;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Persistence backend (PostgreSQL in production, in-memory in tests).
    pub store: Arc<dyn AppraisalStore>,
    /// The only writer of appraisal status and review content.
    pub engine: Arc<LifecycleEngine>,
    /// Appraisal CRUD and read paths.
    pub records: Arc<AppraisalRecords>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn AppraisalStore>, config: ServerConfig) -> Self {
        let authorizer = TransitionAuthorizer::new(config.admin_override_enabled);
        Self {
            engine: Arc::new(LifecycleEngine::new(Arc::clone(&store), authorizer)),
            records: Arc::new(AppraisalRecords::new(Arc::clone(&store))),
            store,
            config: Arc::new(config),
        }
    }
}
