use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use crate::services::provider::SotClientFactory;

/// Shared application state passed to route handlers and job tasks.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub clients: Arc<SotClientFactory>,
    pub poll_interval: Duration,
}

impl AppState {
    pub fn new(db: PgPool, clients: SotClientFactory, poll_interval: Duration) -> Self {
        Self {
            db,
            clients: Arc::new(clients),
            poll_interval,
        }
    }
}
