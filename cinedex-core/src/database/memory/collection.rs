use std::{collections::BTreeMap, fmt, marker::PhantomData};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::matcher::{Matcher, sort_documents};
use crate::{
    database::ports::Collection,
    document::{Document, from_document, to_document},
    error::{Result, StoreError},
    query::{Criteria, QueryPlan},
    schema::Resource,
};

/// In-memory collection of `R` records kept as documents.
pub struct MemoryCollection<R> {
    records: RwLock<BTreeMap<Uuid, Document>>,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Default for MemoryCollection<R> {
    fn default() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            _resource: PhantomData,
        }
    }
}

impl<R> fmt::Debug for MemoryCollection<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCollection")
            .field("resource", &std::any::type_name::<R>())
            .finish_non_exhaustive()
    }
}

impl<R: Resource> MemoryCollection<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the record produced by `build`, which receives the number of
    /// records already stored. The check and the insert happen under one
    /// write lock.
    pub async fn insert_with<F>(&self, build: F) -> Result<R>
    where
        F: FnOnce(usize) -> R + Send,
    {
        let mut records = self.records.write().await;
        let record = build(records.len());
        let id = record.id();

        if records.contains_key(&id) {
            return Err(StoreError::Conflict(format!(
                "{} record {id} already exists",
                R::COLLECTION
            )));
        }
        ensure_unique(&records, &record)?;

        records.insert(id, to_document(&record)?);
        debug!(collection = R::COLLECTION, %id, "inserted record");
        Ok(record)
    }

    /// Every stored record, ordered by id.
    pub async fn all(&self) -> Result<Vec<R>> {
        let records = self.records.read().await;
        records
            .values()
            .cloned()
            .map(from_document)
            .collect()
    }

    /// First record whose text `field` equals `value`.
    pub async fn find_by(&self, field: &str, value: &str) -> Result<Option<R>> {
        let records = self.records.read().await;
        records
            .values()
            .find(|document| text_field(document, field) == Some(value))
            .cloned()
            .map(from_document)
            .transpose()
    }
}

fn text_field<'a>(document: &'a Document, field: &str) -> Option<&'a str> {
    document.get(field).and_then(Value::as_str)
}

fn ensure_unique<R: Resource>(
    records: &BTreeMap<Uuid, Document>,
    record: &R,
) -> Result<()> {
    let id = record.id();
    for (field, value) in record.unique_keys() {
        let taken = records.iter().any(|(other, document)| {
            *other != id && text_field(document, field) == Some(value.as_str())
        });
        if taken {
            return Err(StoreError::Conflict(format!("{field} already exists")));
        }
    }
    Ok(())
}

#[async_trait]
impl<R: Resource> Collection<R> for MemoryCollection<R> {
    async fn find(&self, plan: &QueryPlan) -> Result<Vec<Document>> {
        let matcher = Matcher::compile::<R>(plan.criteria())?;
        let records = self.records.read().await;
        let mut matching: Vec<Document> = records
            .values()
            .filter(|document| matcher.matches(document))
            .cloned()
            .collect();
        drop(records);

        sort_documents::<R>(&mut matching, plan.sort());

        let window = plan.pagination();
        let skip = usize::try_from(window.skip()).unwrap_or(usize::MAX);
        let page = matching
            .into_iter()
            .skip(skip)
            .take(window.limit() as usize);

        Ok(match plan.projection() {
            Some(projection) => {
                page.map(|document| projection.apply(document)).collect()
            }
            None => page.collect(),
        })
    }

    async fn count(&self, criteria: &Criteria) -> Result<u64> {
        let matcher = Matcher::compile::<R>(criteria)?;
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|document| matcher.matches(document))
            .count() as u64)
    }

    async fn get(&self, id: Uuid) -> Result<Option<R>> {
        let records = self.records.read().await;
        records.get(&id).cloned().map(from_document).transpose()
    }

    async fn insert(&self, record: &R) -> Result<()> {
        self.insert_with(|_| record.clone()).await.map(|_| ())
    }

    async fn replace(&self, record: &R) -> Result<()> {
        let mut records = self.records.write().await;
        let id = record.id();
        if !records.contains_key(&id) {
            return Err(StoreError::NotFound(format!(
                "{} record {id}",
                R::COLLECTION
            )));
        }
        ensure_unique(&records, record)?;
        records.insert(id, to_document(record)?);
        Ok(())
    }

    async fn remove(&self, id: Uuid) -> Result<bool> {
        Ok(self.records.write().await.remove(&id).is_some())
    }
}
