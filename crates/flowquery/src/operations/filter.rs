//! The `filter` operation and selector matching on generic objects

use fizzle::{AttributeFilter, Filter, FilterGroup, Operand, Operator, PrimaryFilter};
use serde_json::Value;
use std::cmp::Ordering;

use super::{selector_argument, BUILTIN_PRIORITY};
use crate::config::QueryConfig;
use crate::error::{QueryError, Result};
use crate::evaluation::Evaluation;
use crate::object::{QueryObject, Scalar};
use crate::operation::{Operation, Outcome};

/// Keep the objects matching a selector.
///
/// Comma-separated filters are ORed, the parts of one filter are ANDed. An
/// empty selector keeps everything.
pub struct FilterOperation;

impl<T: QueryObject> Operation<T> for FilterOperation {
    fn short_name(&self) -> &str {
        "filter"
    }

    fn priority(&self) -> i32 {
        BUILTIN_PRIORITY
    }

    fn evaluate(
        &self,
        evaluation: &mut Evaluation<'_, T>,
        arguments: &[Value],
    ) -> Result<Option<Outcome<T>>> {
        let Some(selector) = selector_argument("filter", arguments)? else {
            return Ok(None);
        };
        let group = fizzle::parse_filter_group(selector)?;
        let config = evaluation.config();

        let mut matched = Vec::new();
        for object in evaluation.take_context() {
            if matches_filter_group(&group, &object, config)? {
                matched.push(object);
            }
        }
        evaluation.set_context(matched);
        Ok(None)
    }
}

/// Whether `object` matches any filter of `group`
pub fn matches_filter_group<T: QueryObject>(
    group: &FilterGroup,
    object: &T,
    config: &QueryConfig,
) -> Result<bool> {
    for filter in &group.filters {
        if matches_filter(filter, object, config)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn matches_filter<T: QueryObject>(filter: &Filter, object: &T, config: &QueryConfig) -> Result<bool> {
    match &filter.primary {
        Some(PrimaryFilter::Identifier(id)) => {
            if object.identifier(config).as_deref() != Some(id.as_str()) {
                return Ok(false);
            }
        }
        Some(PrimaryFilter::PropertyName(_)) => {
            return Err(QueryError::fizzle(
                "Property Name filter not supported for generic objects.",
            ))
        }
        Some(PrimaryFilter::Path(_)) => {
            return Err(QueryError::fizzle(
                "Path filter not supported for generic objects.",
            ))
        }
        None => {}
    }

    Ok(filter
        .attribute_filters
        .iter()
        .all(|attribute| matches_attribute(attribute, object, config)))
}

fn matches_attribute<T: QueryObject>(
    attribute: &AttributeFilter,
    object: &T,
    config: &QueryConfig,
) -> bool {
    let value = match &attribute.property_path {
        Some(path) => object.property_path(path),
        None => Some(object.clone()),
    };

    let Some(test) = &attribute.test else {
        return value.is_some_and(|v| !v.is_null());
    };

    match test.operator {
        Operator::Instanceof => is_instance_of(value.as_ref(), &test.operand, config),
        Operator::NotInstanceof => !is_instance_of(value.as_ref(), &test.operand, config),
        operator => matches_operator(operator, value.as_ref(), &test.operand),
    }
}

fn is_instance_of<T: QueryObject>(value: Option<&T>, operand: &Operand, config: &QueryConfig) -> bool {
    match (value, operand.as_str()) {
        (Some(value), Some(type_name)) => value.is_instance_of(type_name, config),
        _ => false,
    }
}

/// Comparison operators. A missing value compares as null.
fn matches_operator<T: QueryObject>(operator: Operator, value: Option<&T>, operand: &Operand) -> bool {
    let expected = Scalar::from(operand);
    let insensitive = operator.is_case_insensitive();

    // list values: ^= and $= test the ends, *= tests membership
    if let Some(items) = value.and_then(QueryObject::items) {
        let item_equals = |item: &T| {
            item.scalar()
                .is_some_and(|s| scalar_equals(&s, &expected, insensitive))
        };
        match operator {
            Operator::Prefix | Operator::PrefixInsensitive => {
                return items.first().is_some_and(item_equals)
            }
            Operator::Suffix | Operator::SuffixInsensitive => {
                return items.last().is_some_and(item_equals)
            }
            Operator::Substring | Operator::SubstringInsensitive => {
                return items.iter().any(item_equals)
            }
            _ => {}
        }
    }

    // `None` here means a composite value, which equals nothing
    let actual = match value {
        None => Some(Scalar::Null),
        Some(value) => value.scalar(),
    };

    match operator {
        Operator::Equal | Operator::EqualInsensitive => actual
            .as_ref()
            .is_some_and(|a| scalar_equals(a, &expected, insensitive)),
        Operator::NotEqual | Operator::NotEqualInsensitive => !actual
            .as_ref()
            .is_some_and(|a| scalar_equals(a, &expected, insensitive)),
        Operator::LessThan => ordering(&actual, &expected).is_some_and(Ordering::is_lt),
        Operator::LessThanOrEqual => ordering(&actual, &expected).is_some_and(Ordering::is_le),
        Operator::GreaterThan => ordering(&actual, &expected).is_some_and(Ordering::is_gt),
        Operator::GreaterThanOrEqual => ordering(&actual, &expected).is_some_and(Ordering::is_ge),
        Operator::Prefix | Operator::PrefixInsensitive => {
            text_test(&actual, &expected, insensitive, |a, e| a.starts_with(e))
        }
        Operator::Suffix | Operator::SuffixInsensitive => {
            text_test(&actual, &expected, insensitive, |a, e| a.ends_with(e))
        }
        Operator::Substring | Operator::SubstringInsensitive => {
            text_test(&actual, &expected, insensitive, |a, e| a.contains(e))
        }
        Operator::Instanceof | Operator::NotInstanceof => false,
    }
}

/// Strict equality; case-insensitive operators compare the text forms
fn scalar_equals(actual: &Scalar, expected: &Scalar, insensitive: bool) -> bool {
    if !insensitive {
        return actual == expected;
    }
    match (actual.as_text(), expected.as_text()) {
        (Some(a), Some(e)) => a.to_lowercase() == e.to_lowercase(),
        (None, None) => true,
        _ => false,
    }
}

fn ordering(actual: &Option<Scalar>, expected: &Scalar) -> Option<Ordering> {
    actual.as_ref()?.compare(expected)
}

fn text_test(
    actual: &Option<Scalar>,
    expected: &Scalar,
    insensitive: bool,
    test: impl Fn(&str, &str) -> bool,
) -> bool {
    let (Some(actual), Some(expected)) = (
        actual.as_ref().and_then(Scalar::as_text),
        expected.as_text(),
    ) else {
        return false;
    };
    if insensitive {
        test(&actual.to_lowercase(), &expected.to_lowercase())
    } else {
        test(&actual, &expected)
    }
}
