use std::time::Duration;

use anyhow::Context;
use sqlx::{
    any::{install_default_drivers, AnyPoolOptions},
    AnyPool,
};

mod comment_helpers;
mod post_helpers;

pub const MAX_CONNECTIONS: u32 = 25;
pub const CONNECTION_MAX_LIFETIME: Duration = Duration::from_secs(5 * 60);
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Read access to the `g5_write_*` tables. Owns the pool; handlers reach it
/// through the request context.
#[derive(Debug, Clone)]
pub struct BoardRepository {
    pool: AnyPool,
}

impl BoardRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        install_default_drivers();
        // No idle timeout: idle connections are kept up to the pool size.
        let pool = AnyPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .idle_timeout(None)
            .max_lifetime(CONNECTION_MAX_LIFETIME)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(database_url)
            .await
            .context("Failed to connect to the board database")?;
        Ok(Self::new(pool))
    }

    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
