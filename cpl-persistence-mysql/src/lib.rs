use cpl_domain::ServiceError;
use sqlx::{MySql, Pool, mysql::MySqlPoolOptions};

pub mod countries;
pub mod matches;
pub mod players;
pub mod rosters;
pub mod seasons;
pub mod standings;
pub mod stats;
pub mod teams;

pub async fn create_db_pool() -> Pool<MySql> {
    let database_url =
        std::env::var("CPL_DATABASE_URL").expect("CPL_DATABASE_URL env var not set");
    let pool_size = std::env::var("CPL_DB_POOL_SIZE")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5);
    MySqlPoolOptions::new()
        .max_connections(pool_size)
        .connect(&database_url)
        .await
        .expect("Failed to create DB pool")
}

pub(crate) fn db_err(e: sqlx::Error) -> ServiceError {
    ServiceError::Internal(e.to_string())
}
