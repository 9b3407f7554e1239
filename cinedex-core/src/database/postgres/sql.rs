//! SQL generation for query plans.
//!
//! Only column names taken from a resource's `FIELDS` are written into the
//! statement text; every caller-supplied value is bound.

use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::Result,
    query::{
        Criteria, FilterOperator, FilterParameter, QueryPlan, SearchPredicate,
        SortDirection,
    },
    schema::{FieldKind, Resource, TypedValue},
};

/// `SELECT to_jsonb(t) ...` for one page of `plan`.
pub(crate) fn select_page<R: Resource>(
    plan: &QueryPlan,
) -> Result<QueryBuilder<'static, Postgres>> {
    let mut builder = QueryBuilder::new("SELECT to_jsonb(t) AS doc FROM ");
    builder.push(R::COLLECTION).push(" AS t");
    push_criteria::<R>(&mut builder, plan.criteria())?;

    builder.push(" ORDER BY ");
    for key in plan.sort().keys() {
        let Some(spec) = R::field(&key.field) else {
            continue;
        };
        push_column(&mut builder, spec.name, spec.kind);
        builder.push(match key.direction {
            SortDirection::Ascending => " ASC NULLS FIRST, ",
            SortDirection::Descending => " DESC NULLS LAST, ",
        });
    }
    builder.push("t.\"id\" ASC");

    let window = plan.pagination();
    builder
        .push(" LIMIT ")
        .push_bind(i64::from(window.limit()))
        .push(" OFFSET ")
        .push_bind(i64::try_from(window.skip()).unwrap_or(i64::MAX));

    Ok(builder)
}

/// `SELECT COUNT(*) ...` over the criteria alone.
pub(crate) fn select_count<R: Resource>(
    criteria: &Criteria,
) -> Result<QueryBuilder<'static, Postgres>> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM ");
    builder.push(R::COLLECTION).push(" AS t");
    push_criteria::<R>(&mut builder, criteria)?;
    Ok(builder)
}

/// Append ` WHERE ...` for `criteria`. Values that cannot be coerced to
/// their field's type fail before any SQL runs.
pub(crate) fn push_criteria<R: Resource>(
    builder: &mut QueryBuilder<'static, Postgres>,
    criteria: &Criteria,
) -> Result<()> {
    builder.push(" WHERE TRUE");
    for filter in &criteria.filters {
        builder.push(" AND ");
        push_filter::<R>(builder, filter)?;
    }
    if let Some(search) = &criteria.search {
        builder.push(" AND ");
        push_search(builder, search);
    }
    Ok(())
}

fn push_filter<R: Resource>(
    builder: &mut QueryBuilder<'static, Postgres>,
    filter: &FilterParameter,
) -> Result<()> {
    let Some(spec) = R::field(&filter.field) else {
        builder.push("FALSE");
        return Ok(());
    };

    let values = filter
        .value
        .values()
        .iter()
        .map(|raw| spec.kind.coerce(spec.name, raw))
        .collect::<Result<Vec<_>>>()?;

    let column = format!("t.\"{}\"", spec.name);
    if filter.operator == FilterOperator::In {
        if spec.kind.is_list() {
            builder.push(format!("{column} && "));
            push_array(builder, spec.kind, values);
            builder.push("::text[]");
        } else {
            builder.push(format!("{column} = ANY("));
            push_array(builder, spec.kind, values);
            builder.push(")");
        }
        return Ok(());
    }

    let Some(value) = values.into_iter().next() else {
        builder.push("FALSE");
        return Ok(());
    };
    match (spec.kind.is_list(), filter.operator) {
        (true, FilterOperator::Equals) => {
            push_value(builder, value);
            builder.push(format!(" = ANY({column})"));
        }
        (true, operator) => {
            builder.push(format!(
                "EXISTS (SELECT 1 FROM unnest({column}) AS elem WHERE elem {} ",
                comparison(operator)
            ));
            push_value(builder, value);
            builder.push(")");
        }
        (false, operator) => {
            builder.push(format!("{column} {} ", comparison(operator)));
            push_value(builder, value);
        }
    }
    Ok(())
}

fn push_search(
    builder: &mut QueryBuilder<'static, Postgres>,
    search: &SearchPredicate,
) {
    if search.fields.is_empty() {
        builder.push("FALSE");
        return;
    }

    let pattern = format!("%{}%", escape_like(&search.term));
    builder.push("(");
    for (index, field) in search.fields.iter().enumerate() {
        if index > 0 {
            builder.push(" OR ");
        }
        builder
            .push(format!("t.\"{field}\" ILIKE "))
            .push_bind(pattern.clone());
    }
    builder.push(")");
}

fn push_column(
    builder: &mut QueryBuilder<'static, Postgres>,
    name: &str,
    kind: FieldKind,
) {
    if kind.is_list() {
        builder.push(format!("t.\"{name}\"[1]"));
    } else {
        builder.push(format!("t.\"{name}\""));
    }
}

fn comparison(operator: FilterOperator) -> &'static str {
    match operator {
        FilterOperator::Equals | FilterOperator::In => "=",
        FilterOperator::GreaterThan => ">",
        FilterOperator::GreaterThanOrEqual => ">=",
        FilterOperator::LessThan => "<",
        FilterOperator::LessThanOrEqual => "<=",
    }
}

fn push_value(
    builder: &mut QueryBuilder<'static, Postgres>,
    value: TypedValue,
) {
    match value {
        TypedValue::Text(value) => builder.push_bind(value),
        TypedValue::Number(value) => builder.push_bind(value),
        TypedValue::Boolean(value) => builder.push_bind(value),
        TypedValue::Uuid(value) => builder.push_bind(value),
        TypedValue::Timestamp(value) => builder.push_bind(value),
    };
}

/// Bind `values` as one array of the field's element type.
fn push_array(
    builder: &mut QueryBuilder<'static, Postgres>,
    kind: FieldKind,
    values: Vec<TypedValue>,
) {
    let values = values.into_iter();
    match kind {
        FieldKind::Text | FieldKind::TextList => builder.push_bind(
            values
                .filter_map(|value| match value {
                    TypedValue::Text(value) => Some(value),
                    _ => None,
                })
                .collect::<Vec<String>>(),
        ),
        FieldKind::Number => builder.push_bind(
            values
                .filter_map(|value| match value {
                    TypedValue::Number(value) => Some(value),
                    _ => None,
                })
                .collect::<Vec<f64>>(),
        ),
        FieldKind::Boolean => builder.push_bind(
            values
                .filter_map(|value| match value {
                    TypedValue::Boolean(value) => Some(value),
                    _ => None,
                })
                .collect::<Vec<bool>>(),
        ),
        FieldKind::Uuid => builder.push_bind(
            values
                .filter_map(|value| match value {
                    TypedValue::Uuid(value) => Some(value),
                    _ => None,
                })
                .collect::<Vec<Uuid>>(),
        ),
        FieldKind::Timestamp => builder.push_bind(
            values
                .filter_map(|value| match value {
                    TypedValue::Timestamp(value) => Some(value),
                    _ => None,
                })
                .collect::<Vec<DateTime<Utc>>>(),
        ),
    };
}

/// Escape `LIKE` wildcards so the term matches literally.
pub(crate) fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
