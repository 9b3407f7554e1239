use async_trait::async_trait;
use uuid::Uuid;

use super::collection::Collection;
use crate::{domain::users::User, error::Result};

// User records plus their credentials, which never leave the store as part
// of a `User`.
#[async_trait]
pub trait UsersRepository: Collection<User> {
    /// Store a new account and its password hash.
    ///
    /// The first account stored in an empty collection is promoted to admin;
    /// the stored user is returned.
    async fn register(&self, user: &User, password_hash: &str) -> Result<User>;

    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn password_hash(&self, user_id: Uuid) -> Result<Option<String>>;
    async fn update_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<()>;
}
