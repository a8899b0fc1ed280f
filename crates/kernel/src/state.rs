use std::sync::Arc;

use sqlx::SqlitePool;

use crate::settings::Settings;

/// State handed to every request handler.
///
/// Cloning is cheap: the pool is reference counted internally and the
/// settings sit behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(db: SqlitePool, settings: Settings) -> Self {
        Self {
            db,
            settings: Arc::new(settings),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
