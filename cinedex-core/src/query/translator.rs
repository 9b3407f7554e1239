use tracing::debug;

use super::{
    config::QueryConfig,
    filter::{FilterParameter, split_field},
    pagination::PaginationWindow,
    params::{ParamValue, QueryParams},
    plan::{Criteria, QueryPlan, SearchPredicate},
    projection::Projection,
    sort::{SortDirection, SortKey, SortSpec},
};
use crate::schema::Resource;

pub const SELECT_PARAM: &str = "select";
pub const SORT_PARAM: &str = "sort";
pub const PAGE_PARAM: &str = "page";
pub const LIMIT_PARAM: &str = "limit";
pub const SEARCH_PARAM: &str = "search";

/// Keys that control the listing itself and never become filter predicates,
/// even when a record has a field of the same name or the key carries a
/// bracket suffix.
pub const RESERVED_PARAMS: [&str; 5] = [
    SELECT_PARAM,
    SORT_PARAM,
    PAGE_PARAM,
    LIMIT_PARAM,
    SEARCH_PARAM,
];

/// Turns listing query parameters into a [`QueryPlan`].
///
/// Translation never fails. Unusable `page`/`limit` values fall back to the
/// configured defaults, unknown bracket suffixes stay part of the field name,
/// and field existence is left to the store executing the plan.
#[derive(Debug, Clone)]
pub struct QueryTranslator {
    config: QueryConfig,
    default_sort: SortSpec,
}

impl Default for QueryTranslator {
    fn default() -> Self {
        Self::new(QueryConfig::default())
    }
}

impl QueryTranslator {
    pub fn new(config: QueryConfig) -> Self {
        let default_sort = SortSpec::parse(&config.default_sort)
            .unwrap_or_else(|| newest_first("created_at"));
        Self {
            config,
            default_sort,
        }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    pub fn translate<R: Resource>(&self, params: &QueryParams) -> QueryPlan {
        let filters: Vec<FilterParameter> = params
            .iter()
            .filter(|(key, _)| !is_reserved(split_field(key)))
            .map(|(key, value)| FilterParameter::from_param(key, value))
            .collect();

        let search = reserved_value(params, SEARCH_PARAM)
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(|term| SearchPredicate {
                term: term.to_string(),
                fields: R::SEARCH_FIELDS,
            });

        let projection =
            reserved_value(params, SELECT_PARAM).and_then(Projection::parse);

        let sort = reserved_value(params, SORT_PARAM)
            .and_then(SortSpec::parse)
            .unwrap_or_else(|| self.default_sort.clone());

        let pagination = PaginationWindow::from_raw(
            reserved_value(params, PAGE_PARAM),
            reserved_value(params, LIMIT_PARAM),
            self.config.default_page,
            self.config.default_limit,
        );

        debug!(
            collection = R::COLLECTION,
            filters = filters.len(),
            search = search.is_some(),
            page = pagination.page(),
            limit = pagination.limit(),
            "translated listing query"
        );

        QueryPlan::new(
            Criteria { filters, search },
            projection,
            sort,
            pagination,
        )
    }
}

pub fn is_reserved(key: &str) -> bool {
    RESERVED_PARAMS.contains(&key)
}

/// Repeated control keys use their last value.
fn reserved_value<'a>(params: &'a QueryParams, key: &str) -> Option<&'a str> {
    params.get(key).map(ParamValue::last)
}

fn newest_first(field: &str) -> SortSpec {
    SortSpec::from_keys(vec![SortKey {
        field: field.to_string(),
        direction: SortDirection::Descending,
    }])
}
