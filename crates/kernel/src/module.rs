use async_trait::async_trait;
use axum::Router;
use sqlx::SqlitePool;

use crate::state::AppState;

/// What a module sees while it is brought up
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
    pub db: &'a SqlitePool,
}

/// One schema step. `up` is raw SQL and may hold several statements.
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// A feature slice of the app: schema, routes, docs and lifecycle hooks
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name; also the namespace of its migrations
    fn name(&self) -> &'static str;

    /// Runs once migrations are applied
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Return the Axum router for this module's routes, already bound to
    /// the shared state. Routes are merged at the site root, so each module
    /// owns the full paths it declares.
    fn routes(&self, _state: &AppState) -> Router {
        Router::new()
    }

    /// `paths` and `components.schemas` to merge into the served document
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// Applied in id order, each at most once
    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    /// Runs after every module is initialized
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs on shutdown, in reverse registration order
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
