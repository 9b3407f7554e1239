use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    document::Document,
    error::Result,
    query::{Criteria, QueryPlan},
    schema::Resource,
};

/// Record store for one resource type.
///
/// Implementations decide whether a filtered field exists and how a raw
/// query value is coerced for it (see [`crate::schema::FieldKind`]). A value
/// that cannot be coerced fails the whole query with
/// [`StoreError::InvalidValue`](crate::StoreError::InvalidValue).
#[async_trait]
pub trait Collection<R: Resource>: Send + Sync {
    /// Apply criteria, sort, skip/limit and projection.
    async fn find(&self, plan: &QueryPlan) -> Result<Vec<Document>>;

    /// Count records matching `criteria`, ignoring pagination.
    async fn count(&self, criteria: &Criteria) -> Result<u64>;

    async fn get(&self, id: Uuid) -> Result<Option<R>>;

    /// Fails with `Conflict` when the id or a unique key is taken.
    async fn insert(&self, record: &R) -> Result<()>;

    /// Overwrite an existing record. Fails with `NotFound` when absent.
    async fn replace(&self, record: &R) -> Result<()>;

    /// Returns whether a record was removed.
    async fn remove(&self, id: Uuid) -> Result<bool>;
}
