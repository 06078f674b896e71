use crate::{config::Config, db::DbPool, storage::R2Client};

/// Application state shared across all handlers. Constructed once at process
/// start and passed down explicitly; there are no module-level singletons.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Config,
    pub storage: R2Client,
}

impl AppState {
    pub fn new(pool: DbPool, config: Config, storage: R2Client) -> Self {
        Self {
            pool,
            config,
            storage,
        }
    }
}
