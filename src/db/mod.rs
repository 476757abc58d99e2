//! Postgres pool for the `kv_store` backend.
//!
//! Only used when `STORE_BACKEND=postgres`. The schema is a single
//! key/JSONB table; migrations run before the server accepts requests.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Connect with at most `max_connections` and apply pending migrations.
///
/// # Errors
///
/// Returns an error if the connection or a migration fails.
pub async fn connect_and_migrate(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect(database_url)
        .await?;
    sqlx::migrate!("src/db/migrations").run(&pool).await?;
    Ok(pool)
}
