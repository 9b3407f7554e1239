use serde::Serialize;

use super::params::ParamValue;

/// Comparison operator of a filter predicate.
///
/// Only `gt`, `gte`, `lt`, `lte` and `in` are recognised in bracket notation;
/// a bare key is an implicit equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Equals,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    In,
}

impl FilterOperator {
    /// Match a bracket token. Case-sensitive: `GTE` is not an operator.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "gt" => Some(Self::GreaterThan),
            "gte" => Some(Self::GreaterThanOrEqual),
            "lt" => Some(Self::LessThan),
            "lte" => Some(Self::LessThanOrEqual),
            "in" => Some(Self::In),
            _ => None,
        }
    }

}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Scalar(String),
    List(Vec<String>),
}

impl FilterValue {
    pub fn values(&self) -> &[String] {
        match self {
            FilterValue::Scalar(value) => std::slice::from_ref(value),
            FilterValue::List(values) => values,
        }
    }
}

/// One `field operator value` predicate. Predicates in a plan are ANDed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterParameter {
    pub field: String,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

impl FilterParameter {
    /// Build a predicate from a raw query key and its value(s).
    ///
    /// `in` values are split on commas. A bare key given more than once
    /// becomes an `in` over every given value; an operator key given more than
    /// once keeps its last value.
    pub fn from_param(key: &str, value: &ParamValue) -> Self {
        let (field, operator) = split_operator(key);
        let (operator, value) = match (operator, value) {
            (Some(FilterOperator::In), value) => (
                FilterOperator::In,
                FilterValue::List(
                    value
                        .values()
                        .flat_map(|raw| raw.split(','))
                        .map(str::to_string)
                        .collect(),
                ),
            ),
            (Some(operator), value) => {
                (operator, FilterValue::Scalar(value.last().to_string()))
            }
            (None, ParamValue::Many(values)) if values.len() > 1 => {
                (FilterOperator::In, FilterValue::List(values.clone()))
            }
            (None, value) => (
                FilterOperator::Equals,
                FilterValue::Scalar(value.last().to_string()),
            ),
        };

        Self {
            field: field.to_string(),
            operator,
            value,
        }
    }
}

/// Split `field[op]` into its field and operator.
///
/// Keys without a trailing bracket group, or whose bracket content is not a
/// recognised operator, are returned whole as the field name.
pub fn split_operator(key: &str) -> (&str, Option<FilterOperator>) {
    let Some(inner) = key.strip_suffix(']') else {
        return (key, None);
    };
    let Some(open) = inner.rfind('[') else {
        return (key, None);
    };

    let field = &inner[..open];
    match FilterOperator::from_token(&inner[open + 1..]) {
        Some(operator) if !field.is_empty() => (field, Some(operator)),
        _ => (key, None),
    }
}

/// The key with any trailing bracket group removed, recognised or not.
///
/// `page[gt]` and `sort[x]` both name `page`/`sort`; a key that is only a
/// bracket group is returned whole.
pub fn split_field(key: &str) -> &str {
    key.strip_suffix(']')
        .and_then(|inner| inner.rfind('[').map(|open| &inner[..open]))
        .filter(|field| !field.is_empty())
        .unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one(value: &str) -> ParamValue {
        ParamValue::One(value.to_string())
    }

    #[test]
    fn bracket_operators_map_exactly() {
        let cases = [
            ("rating[gt]", FilterOperator::GreaterThan),
            ("rating[gte]", FilterOperator::GreaterThanOrEqual),
            ("rating[lt]", FilterOperator::LessThan),
            ("rating[lte]", FilterOperator::LessThanOrEqual),
        ];

        for (key, expected) in cases {
            let predicate = FilterParameter::from_param(key, &one("8"));
            assert_eq!(predicate.field, "rating");
            assert_eq!(predicate.operator, expected);
            assert_eq!(predicate.value, FilterValue::Scalar("8".into()));
        }
    }

    #[test]
    fn in_operator_splits_on_commas() {
        let predicate = FilterParameter::from_param("rating[in]", &one("1,2"));
        assert_eq!(predicate.field, "rating");
        assert_eq!(predicate.operator, FilterOperator::In);
        assert_eq!(
            predicate.value,
            FilterValue::List(vec!["1".into(), "2".into()])
        );
    }

    #[test]
    fn unknown_bracket_content_stays_in_field_name() {
        let predicate =
            FilterParameter::from_param("rating[between]", &one("3"));
        assert_eq!(predicate.field, "rating[between]");
        assert_eq!(predicate.operator, FilterOperator::Equals);

        let upper = FilterParameter::from_param("rating[GTE]", &one("3"));
        assert_eq!(upper.field, "rating[GTE]");
        assert_eq!(upper.operator, FilterOperator::Equals);
    }

    #[test]
    fn split_field_drops_any_bracket_suffix() {
        assert_eq!(split_field("sort[gte]"), "sort");
        assert_eq!(split_field("page[anything]"), "page");
        assert_eq!(split_field("limit"), "limit");
        assert_eq!(split_field("[gte]"), "[gte]");
    }

    #[test]
    fn bare_brackets_and_empty_fields_are_not_operators() {
        assert_eq!(split_operator("[gte]"), ("[gte]", None));
        assert_eq!(split_operator("rating"), ("rating", None));
        assert_eq!(split_operator("rating]"), ("rating]", None));
    }

    #[test]
    fn repeated_bare_key_becomes_membership() {
        let value = ParamValue::Many(vec!["Drama".into(), "Crime".into()]);
        let predicate = FilterParameter::from_param("genres", &value);
        assert_eq!(predicate.operator, FilterOperator::In);
        assert_eq!(
            predicate.value,
            FilterValue::List(vec!["Drama".into(), "Crime".into()])
        );
    }

    #[test]
    fn repeated_operator_key_keeps_last_value() {
        let value = ParamValue::Many(vec!["5".into(), "7".into()]);
        let predicate = FilterParameter::from_param("rating[gte]", &value);
        assert_eq!(predicate.value, FilterValue::Scalar("7".into()));
    }
}
