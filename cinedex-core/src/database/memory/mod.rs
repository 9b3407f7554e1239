//! In-memory record stores for development mode and tests.

mod collection;
mod matcher;

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

pub use collection::MemoryCollection;

use crate::{
    database::ports::{Collection, MoviesRepository, UsersRepository},
    document::Document,
    domain::{
        movies::{Movie, MovieStats, StatsQuery},
        users::{Role, User},
    },
    error::{Result, StoreError},
    query::{Criteria, QueryPlan},
};

#[async_trait]
impl MoviesRepository for MemoryCollection<Movie> {
    async fn stats(&self, query: &StatsQuery) -> Result<MovieStats> {
        let movies = self.all().await?;
        Ok(MovieStats::compute(*query, &movies))
    }
}

/// Users plus their password hashes.
#[derive(Debug, Default)]
pub struct MemoryUsers {
    users: MemoryCollection<User>,
    credentials: RwLock<HashMap<Uuid, String>>,
}

impl MemoryUsers {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Collection<User> for MemoryUsers {
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

    async fn remove(&self, id: Uuid) -> Result<bool> {
        let removed = self.users.remove(id).await?;
        self.credentials.write().await.remove(&id);
        Ok(removed)
    }
}

#[async_trait]
impl UsersRepository for MemoryUsers {
    async fn register(&self, user: &User, password_hash: &str) -> Result<User> {
        let stored = self
            .users
            .insert_with(|existing| {
                let mut user = user.clone();
                if existing == 0 {
                    user.role = Role::Admin;
                }
                user
            })
            .await?;

        self.credentials
            .write()
            .await
            .insert(stored.id, password_hash.to_string());

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
        Ok(self.credentials.read().await.get(&user_id).cloned())
    }

    async fn update_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<()> {
        let mut credentials = self.credentials.write().await;
        match credentials.get_mut(&user_id) {
            Some(hash) => {
                *hash = password_hash.to_string();
                Ok(())
            }
            None => Err(StoreError::NotFound(format!(
                "credentials for user {user_id}"
            ))),
        }
    }
}

/// Movie and user stores sharing nothing but their lifetime.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub movies: Arc<MemoryCollection<Movie>>,
    pub users: Arc<MemoryUsers>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{movies::CreateMovieRequest, users::RegisterRequest},
        query::{QueryParams, QueryTranslator},
    };

    fn movie(title: &str, genres: &[&str], rating: f64) -> Movie {
        Movie::create(
            CreateMovieRequest {
                title: title.into(),
                description: format!("About {title}"),
                director: "Someone".into(),
                genres: genres.iter().map(|g| g.to_string()).collect(),
                release_year: 2000,
                duration: 100,
                rating: Some(rating),
            },
            None,
        )
        .unwrap()
    }

    fn user(username: &str) -> User {
        User::register(
            &RegisterRequest {
                username: username.into(),
                email: format!("{username}@example.com"),
                password: "password1".into(),
                display_name: None,
            },
            Role::User,
        )
    }

    #[tokio::test]
    async fn list_fields_match_any_element() {
        let movies = MemoryCollection::<Movie>::new();
        movies.insert(&movie("Heat", &["Crime", "Drama"], 8.3)).await.unwrap();
        movies.insert(&movie("Up", &["Animation"], 8.2)).await.unwrap();

        let plan = QueryTranslator::default()
            .translate::<Movie>(&QueryParams::parse("genres=Drama"));
        let found = movies.find(&plan).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["title"], "Heat");
    }

    #[tokio::test]
    async fn uncoercible_value_fails_the_query() {
        let movies = MemoryCollection::<Movie>::new();
        movies.insert(&movie("Heat", &["Crime"], 8.3)).await.unwrap();

        let plan = QueryTranslator::default()
            .translate::<Movie>(&QueryParams::parse("rating[gte]=high"));
        assert!(matches!(
            movies.count(plan.criteria()).await,
            Err(StoreError::InvalidValue { .. })
        ));
    }

    #[tokio::test]
    async fn unknown_fields_never_match() {
        let movies = MemoryCollection::<Movie>::new();
        movies.insert(&movie("Heat", &["Crime"], 8.3)).await.unwrap();

        let plan = QueryTranslator::default()
            .translate::<Movie>(&QueryParams::parse("rating[between]=3"));
        assert_eq!(movies.count(plan.criteria()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn first_registered_user_becomes_admin() {
        let users = MemoryUsers::new();
        let first = users.register(&user("alice"), "hash-a").await.unwrap();
        let second = users.register(&user("bob"), "hash-b").await.unwrap();

        assert_eq!(first.role, Role::Admin);
        assert_eq!(second.role, Role::User);
        assert_eq!(
            users.password_hash(second.id).await.unwrap().as_deref(),
            Some("hash-b")
        );
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let users = MemoryUsers::new();
        users.register(&user("alice"), "hash").await.unwrap();

        let mut duplicate = user("alice");
        duplicate.email = "other@example.com".into();
        assert!(matches!(
            users.register(&duplicate, "hash").await,
            Err(StoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn removing_a_user_drops_credentials() {
        let users = MemoryUsers::new();
        let alice = users.register(&user("alice"), "hash").await.unwrap();

        assert!(users.remove(alice.id).await.unwrap());
        assert!(users.password_hash(alice.id).await.unwrap().is_none());
        assert!(!users.remove(alice.id).await.unwrap());
    }
}
