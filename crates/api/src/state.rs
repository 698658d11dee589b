use std::sync::Arc;

use remat_core::classification::{ClassificationAdapter, Classifier};
use remat_core::deposit::DepositEngine;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or is a pool handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: remat_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Model server client, shared by the adapter and the health probe.
    pub classifier: Arc<dyn Classifier>,
    /// Image -> classification pipeline over `classifier`.
    pub adapter: ClassificationAdapter,
    /// Point policy and bin rules for deposits.
    pub engine: Arc<DepositEngine>,
}

impl AppState {
    pub fn new(
        pool: remat_db::DbPool,
        config: ServerConfig,
        classifier: Arc<dyn Classifier>,
        engine: DepositEngine,
    ) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            adapter: ClassificationAdapter::new(Arc::clone(&classifier)),
            classifier,
            engine: Arc::new(engine),
        }
    }
}
