use std::sync::Arc;

use muster_db::DbPool;

use crate::config::ServerConfig;

/// Handler state: the pool plus read-only configuration. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(pool: DbPool, config: ServerConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }
}
