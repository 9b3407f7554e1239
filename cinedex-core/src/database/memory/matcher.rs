//! Plan evaluation over in-memory documents.

use std::cmp::Ordering;

use serde_json::Value;

use crate::{
    document::Document,
    error::Result,
    query::{Criteria, FilterOperator, FilterParameter, SortDirection, SortSpec},
    schema::{FieldKind, Resource, TypedValue},
};

/// Criteria with every value coerced to its field's type, ready to be run
/// against many documents.
#[derive(Debug)]
pub(crate) struct Matcher {
    filters: Vec<CompiledFilter>,
    search: Option<CompiledSearch>,
}

#[derive(Debug)]
enum CompiledFilter {
    /// Filter on a field the resource does not have.
    Never,
    Compare {
        field: &'static str,
        kind: FieldKind,
        operator: FilterOperator,
        values: Vec<TypedValue>,
    },
}

#[derive(Debug)]
struct CompiledSearch {
    needle: String,
    fields: &'static [&'static str],
}

impl Matcher {
    pub(crate) fn compile<R: Resource>(criteria: &Criteria) -> Result<Self> {
        let filters = criteria
            .filters
            .iter()
            .map(compile_filter::<R>)
            .collect::<Result<Vec<_>>>()?;

        let search = criteria.search.as_ref().map(|search| CompiledSearch {
            needle: search.term.to_lowercase(),
            fields: search.fields,
        });

        Ok(Self { filters, search })
    }

    pub(crate) fn matches(&self, document: &Document) -> bool {
        self.filters.iter().all(|filter| filter.matches(document))
            && self
                .search
                .as_ref()
                .is_none_or(|search| search.matches(document))
    }
}

fn compile_filter<R: Resource>(
    filter: &FilterParameter,
) -> Result<CompiledFilter> {
    let Some(spec) = R::field(&filter.field) else {
        return Ok(CompiledFilter::Never);
    };

    let values = filter
        .value
        .values()
        .iter()
        .map(|raw| spec.kind.coerce(spec.name, raw))
        .collect::<Result<Vec<_>>>()?;

    Ok(CompiledFilter::Compare {
        field: spec.name,
        kind: spec.kind,
        operator: filter.operator,
        values,
    })
}

impl CompiledFilter {
    fn matches(&self, document: &Document) -> bool {
        let CompiledFilter::Compare {
            field,
            kind,
            operator,
            values,
        } = self
        else {
            return false;
        };

        match document.get(*field) {
            None | Some(Value::Null) => false,
            Some(Value::Array(items)) if kind.is_list() => items
                .iter()
                .any(|item| compare(item, *operator, values)),
            Some(stored) => compare(stored, *operator, values),
        }
    }
}

fn compare(
    stored: &Value,
    operator: FilterOperator,
    values: &[TypedValue],
) -> bool {
    if operator == FilterOperator::In {
        return values.iter().any(|value| {
            value.stored_ordering(stored) == Some(Ordering::Equal)
        });
    }

    let Some(ordering) =
        values.first().and_then(|value| value.stored_ordering(stored))
    else {
        return false;
    };
    match operator {
        FilterOperator::Equals | FilterOperator::In => ordering.is_eq(),
        FilterOperator::GreaterThan => ordering.is_gt(),
        FilterOperator::GreaterThanOrEqual => ordering.is_ge(),
        FilterOperator::LessThan => ordering.is_lt(),
        FilterOperator::LessThanOrEqual => ordering.is_le(),
    }
}

impl CompiledSearch {
    fn matches(&self, document: &Document) -> bool {
        self.fields.iter().any(|field| {
            document
                .get(*field)
                .and_then(Value::as_str)
                .is_some_and(|text| text.to_lowercase().contains(&self.needle))
        })
    }
}

/// Order documents by the sort keys, then by id. Keys naming fields the
/// resource does not have are ignored.
pub(crate) fn sort_documents<R: Resource>(
    documents: &mut [Document],
    sort: &SortSpec,
) {
    let keys: Vec<_> = sort
        .keys()
        .iter()
        .filter_map(|key| {
            R::field(&key.field).map(|spec| (spec, key.direction))
        })
        .collect();

    documents.sort_by(|a, b| {
        keys.iter()
            .map(|(spec, direction)| {
                let ordering = spec
                    .kind
                    .compare_stored(a.get(spec.name), b.get(spec.name));
                match direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| {
                FieldKind::Uuid.compare_stored(a.get("id"), b.get("id"))
            })
    });
}
