//! Database layer
//!
//! SQLite is the default store (single binary, file or in-memory); MySQL is
//! supported for larger deployments. The driver is picked from configuration
//! and hidden behind the [`DatabasePool`] trait.
//!
//! # Usage
//!
//! ```ignore
//! use chigo::config::DatabaseConfig;
//! use chigo::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! pool.ping().await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, Backend, DatabasePool, DynDatabasePool, MysqlDatabase,
    SqliteDatabase,
};

/// Whether the error chain holds a UNIQUE constraint violation from the store
pub fn is_unique_violation(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<sqlx::Error>(),
            Some(sqlx::Error::Database(db)) if db.is_unique_violation()
        )
    })
}
