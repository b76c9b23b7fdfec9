// src/db/mod.rs
//
// Database module
//
// Provides:
// - Connection pooling
// - Schema migrations
// - Database utilities

pub mod connection;
pub mod migrations;

pub use connection::{
    create_connection_pool, create_test_connection, get_connection, ConnectionPool, PooledConn,
};

pub use migrations::{get_database_stats, initialize_database, DatabaseStats};

/// Pool over a fresh temp-file database with the schema applied.
///
/// File-backed rather than in-memory so every pooled connection sees the
/// same database. The TempDir must be kept alive by the caller.
#[cfg(test)]
pub(crate) fn create_test_pool() -> (tempfile::TempDir, std::sync::Arc<ConnectionPool>) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let pool =
        create_connection_pool(&dir.path().join("pokepipeline.db")).expect("create test pool");
    {
        let conn = get_connection(&pool).expect("get connection");
        initialize_database(&conn).expect("initialize schema");
    }
    (dir, std::sync::Arc::new(pool))
}
