//! PostgreSQL record stores.

mod collection;
mod movies;
mod sql;
mod users;

use std::{fmt, time::Duration};

use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::info;

pub use collection::PgCollection;
pub use users::PostgresUsersRepository;

use crate::{
    domain::movies::Movie,
    error::{Result, StoreError},
};

#[derive(Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
    max_connections: u32,
}

impl fmt::Debug for PostgresDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresDatabase")
            .field("pool_size", &self.pool.size())
            .field("idle_connections", &self.pool.num_idle())
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl PostgresDatabase {
    pub async fn connect(
        connection_string: &str,
        max_connections: u32,
    ) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            // Timestamps come back through `to_jsonb`, which renders them in
            // the session time zone.
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("SET TIME ZONE 'UTC'").execute(conn).await?;
                    Ok(())
                })
            })
            .connect(connection_string)
            .await
            .map_err(|e| {
                StoreError::Internal(format!("Database connection failed: {e}"))
            })?;

        info!(
            "Database pool initialized with max_connections={max_connections}"
        );
        Ok(Self {
            pool,
            max_connections,
        })
    }

    pub async fn migrate(&self) -> Result<()> {
        crate::MIGRATOR.run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn movies(&self) -> PgCollection<Movie> {
        PgCollection::new(self.pool.clone())
    }

    pub fn users(&self) -> PostgresUsersRepository {
        PostgresUsersRepository::new(self.pool.clone())
    }
}
