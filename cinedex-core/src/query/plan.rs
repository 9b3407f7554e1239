use serde::Serialize;
use tracing::debug;

use super::{
    filter::FilterParameter,
    pagination::{PaginationDescriptor, PaginationWindow},
    projection::Projection,
    sort::SortSpec,
};
use crate::{
    database::ports::Collection, document::Document, error::Result,
    schema::Resource,
};

/// Case-insensitive substring match over a fixed set of text fields, ORed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchPredicate {
    pub term: String,
    pub fields: &'static [&'static str],
}

/// The record-selecting part of a plan: ANDed filters plus optional search.
/// Counting uses only this.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Criteria {
    pub filters: Vec<FilterParameter>,
    pub search: Option<SearchPredicate>,
}

impl Criteria {
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.search.is_none()
    }
}

/// Immutable description of one listing query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryPlan {
    criteria: Criteria,
    projection: Option<Projection>,
    sort: SortSpec,
    pagination: PaginationWindow,
}

impl QueryPlan {
    pub fn new(
        criteria: Criteria,
        projection: Option<Projection>,
        sort: SortSpec,
        pagination: PaginationWindow,
    ) -> Self {
        Self {
            criteria,
            projection,
            sort,
            pagination,
        }
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    pub fn pagination(&self) -> PaginationWindow {
        self.pagination
    }

    /// Run the plan: count matching records, fetch the requested page, and
    /// derive the neighbouring page links from the count.
    pub async fn execute<R, C>(&self, store: &C) -> Result<QueryOutcome>
    where
        R: Resource,
        C: Collection<R> + ?Sized,
    {
        let total = store.count(&self.criteria).await?;
        let data = store.find(self).await?;
        debug!(
            collection = R::COLLECTION,
            total,
            returned = data.len(),
            page = self.pagination.page(),
            "query plan executed"
        );

        Ok(QueryOutcome {
            total,
            pagination: self.pagination.descriptor(total),
            data,
        })
    }
}

/// Result of executing a plan.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    /// Records matching the criteria, ignoring pagination.
    pub total: u64,
    pub pagination: PaginationDescriptor,
    pub data: Vec<Document>,
}
