//! Shelf application library
//!
//! Application modules (accounts, books, notes) plus the bootstrap that
//! wires them to the database and the HTTP server.

pub mod modules;
pub mod utils;

use anyhow::Context;
use sqlx::SqlitePool;

use shelf_kernel::{settings::Settings, AppState, InitCtx, ModuleRegistry};

/// A registry holding every application module.
pub fn registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry);
    registry
}

/// Apply pending migrations of every module. Returns how many ran.
pub async fn migrate(db: &SqlitePool, registry: &ModuleRegistry) -> anyhow::Result<usize> {
    let applied = shelf_db::migrate(db, &registry.collect_migrations())
        .await
        .context("failed to apply migrations")?;
    tracing::info!(applied, "migrations applied");
    Ok(applied)
}

/// Open the database, apply pending migrations, and initialize every module.
pub async fn bootstrap(settings: Settings) -> anyhow::Result<(ModuleRegistry, AppState)> {
    let registry = registry();
    let db = shelf_db::connect(&settings.database).await?;
    migrate(&db, &registry).await?;

    let ctx = InitCtx {
        settings: &settings,
        db: &db,
    };
    registry.init_all(&ctx).await?;

    Ok((registry, AppState::new(db, settings)))
}

/// Run the application until shutdown.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    shelf_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        "shelf bootstrap starting"
    );

    let (registry, state) = bootstrap(settings).await?;
    let ctx = InitCtx {
        settings: state.settings(),
        db: &state.db,
    };
    registry.start_all(&ctx).await?;

    let served = shelf_http::start_server(&registry, &state).await;

    registry.stop_all().await?;
    served
}

#[cfg(test)]
pub(crate) mod test_support {
    use sqlx::SqlitePool;

    use shelf_kernel::settings::DatabaseSettings;

    /// A fresh in-memory database with every module's schema applied.
    pub async fn memory_pool() -> SqlitePool {
        let settings = DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        };
        let pool = shelf_db::connect(&settings).await.unwrap();
        crate::migrate(&pool, &crate::registry()).await.unwrap();
        pool
    }
}
