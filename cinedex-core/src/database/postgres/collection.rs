use std::{fmt, marker::PhantomData};

use async_trait::async_trait;
use sqlx::{PgExecutor, PgPool, types::Json};
use tracing::{debug, error};
use uuid::Uuid;

use super::sql;
use crate::{
    database::ports::Collection,
    document::{Document, from_document, to_document},
    error::{Result, StoreError},
    query::{Criteria, QueryPlan},
    schema::Resource,
};

/// PostgreSQL table holding `R` records, one column per field.
pub struct PgCollection<R> {
    pool: PgPool,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for PgCollection<R> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R> fmt::Debug for PgCollection<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgCollection")
            .field("resource", &std::any::type_name::<R>())
            .field("pool_size", &self.pool.size())
            .finish()
    }
}

impl<R: Resource> PgCollection<R> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _resource: PhantomData,
        }
    }

    pub(super) fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// First record whose column `field` equals `value`.
    pub(super) async fn find_by(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Option<R>> {
        let Some(spec) = R::field(field) else {
            return Ok(None);
        };
        let statement = format!(
            "SELECT to_jsonb(t) FROM {} AS t WHERE t.\"{}\" = $1 LIMIT 1",
            R::COLLECTION,
            spec.name
        );
        let document = sqlx::query_scalar::<_, Json<Document>>(&statement)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        document.map(|Json(document)| from_document(document)).transpose()
    }
}

/// Insert `record` through any executor, so callers can run it inside a
/// transaction.
pub(super) async fn insert_record<'e, R, E>(
    executor: E,
    record: &R,
) -> Result<()>
where
    R: Resource,
    E: PgExecutor<'e>,
{
    let statement = format!(
        "INSERT INTO {table} \
         SELECT * FROM jsonb_populate_record(NULL::{table}, $1)",
        table = R::COLLECTION
    );
    sqlx::query(&statement)
        .bind(Json(to_document(record)?))
        .execute(executor)
        .await
        .map_err(|err| map_write_error(R::COLLECTION, err))?;
    Ok(())
}

/// Unique violations become conflicts; everything else is logged and passed
/// through as a database error.
pub(super) fn map_write_error(
    collection: &str,
    err: sqlx::Error,
) -> StoreError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            let what = match db_err.constraint() {
                Some(name) if name.ends_with("_username_key") => "username",
                Some(name) if name.ends_with("_email_key") => "email",
                _ => "record",
            };
            return StoreError::Conflict(format!("{what} already exists"));
        }
    }
    error!(collection, error = %err, "write failed");
    StoreError::Database(err)
}

#[async_trait]
impl<R: Resource> Collection<R> for PgCollection<R> {
    async fn find(&self, plan: &QueryPlan) -> Result<Vec<Document>> {
        let mut builder = sql::select_page::<R>(plan)?;
        debug!(collection = R::COLLECTION, sql = builder.sql(), "find");

        let rows = builder
            .build_query_scalar::<Json<Document>>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|Json(document)| match plan.projection() {
                Some(projection) => projection.apply(document),
                None => document,
            })
            .collect())
    }

    async fn count(&self, criteria: &Criteria) -> Result<u64> {
        let mut builder = sql::select_count::<R>(criteria)?;
        let total: i64 = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(total).unwrap_or_default())
    }

    async fn get(&self, id: Uuid) -> Result<Option<R>> {
        let statement = format!(
            "SELECT to_jsonb(t) FROM {} AS t WHERE t.\"id\" = $1",
            R::COLLECTION
        );
        let document = sqlx::query_scalar::<_, Json<Document>>(&statement)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        document.map(|Json(document)| from_document(document)).transpose()
    }

    async fn insert(&self, record: &R) -> Result<()> {
        insert_record(&self.pool, record).await
    }

    async fn replace(&self, record: &R) -> Result<()> {
        let columns = R::FIELDS
            .iter()
            .map(|spec| format!("\"{}\"", spec.name))
            .collect::<Vec<_>>()
            .join(", ");
        let statement = format!(
            "UPDATE {table} SET ({columns}) = \
             (SELECT {columns} FROM jsonb_populate_record(NULL::{table}, $1)) \
             WHERE \"id\" = $2",
            table = R::COLLECTION
        );

        let result = sqlx::query(&statement)
            .bind(Json(to_document(record)?))
            .bind(record.id())
            .execute(&self.pool)
            .await
            .map_err(|err| map_write_error(R::COLLECTION, err))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "{} record {}",
                R::COLLECTION,
                record.id()
            )));
        }
        Ok(())
    }

    async fn remove(&self, id: Uuid) -> Result<bool> {
        let statement =
            format!("DELETE FROM {} WHERE \"id\" = $1", R::COLLECTION);
        let result =
            sqlx::query(&statement).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
