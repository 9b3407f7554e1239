//! Listing queries: query-string parameters in, executable plans out.

pub mod config;
pub mod filter;
pub mod pagination;
pub mod params;
pub mod plan;
pub mod projection;
pub mod sort;
pub mod translator;

pub use config::QueryConfig;
pub use filter::{FilterOperator, FilterParameter, FilterValue};
pub use pagination::{PageToken, PaginationDescriptor, PaginationWindow};
pub use params::{ParamValue, QueryParams};
pub use plan::{Criteria, QueryOutcome, QueryPlan, SearchPredicate};
pub use projection::Projection;
pub use sort::{SortDirection, SortKey, SortSpec};
pub use translator::QueryTranslator;
