use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::collection::{PgCollection, insert_record};
use crate::{
    database::ports::{Collection, UsersRepository},
    document::Document,
    domain::users::{Role, User},
    error::{Result, StoreError},
    query::{Criteria, QueryPlan},
};

/// Serializes first-account bootstrap across concurrent registrations.
const REGISTRATION_LOCK_KEY: i64 = 0x6369_6e65_6465_7801;

/// PostgreSQL-backed implementation of the `UsersRepository` port.
#[derive(Clone, Debug)]
pub struct PostgresUsersRepository {
    users: PgCollection<User>,
}

impl PostgresUsersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: PgCollection::new(pool),
        }
    }

    fn pool(&self) -> &PgPool {
        self.users.pool()
    }
}

#[async_trait]
impl Collection<User> for PostgresUsersRepository {
    async fn find(&self, plan: &QueryPlan) -> Result<Vec<Document>> {
        self.users.find(plan).await
    }

    async fn count(&self, criteria: &Criteria) -> Result<u64> {
        self.users.count(criteria).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<User>> {
        self.users.get(id).await
    }

    async fn insert(&self, record: &User) -> Result<()> {
        self.users.insert(record).await
    }

    async fn replace(&self, record: &User) -> Result<()> {
        self.users.replace(record).await
    }

    // Credentials go with the user through ON DELETE CASCADE.
    async fn remove(&self, id: Uuid) -> Result<bool> {
        self.users.remove(id).await
    }
}

#[async_trait]
impl UsersRepository for PostgresUsersRepository {
    async fn register(&self, user: &User, password_hash: &str) -> Result<User> {
        let mut tx = self.pool().begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(REGISTRATION_LOCK_KEY)
            .execute(&mut *tx)
            .await?;
        let has_users: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users)")
                .fetch_one(&mut *tx)
                .await?;

        let mut stored = user.clone();
        if !has_users {
            stored.role = Role::Admin;
        }

        insert_record(&mut *tx, &stored).await?;
        sqlx::query(
            r#"
            INSERT INTO user_credentials (user_id, password_hash)
            VALUES ($1, $2)
            "#,
        )
        .bind(stored.id)
        .bind(password_hash)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!("Created user: {} ({})", stored.username, stored.id);
        Ok(stored)
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        self.users.find_by("username", username).await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        self.users.find_by("email", email).await
    }

    async fn password_hash(&self, user_id: Uuid) -> Result<Option<String>> {
        let hash = sqlx::query_scalar(
            "SELECT password_hash FROM user_credentials WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(hash)
    }

    async fn update_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE user_credentials
            SET password_hash = $2, updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "credentials for user {user_id}"
            )));
        }
        Ok(())
    }
}
