//! The `children` operation

use serde_json::Value;

use super::collection::dedup_in_order;
use super::{selector_argument, BUILTIN_PRIORITY};
use crate::error::{QueryError, Result};
use crate::evaluation::Evaluation;
use crate::object::QueryObject;
use crate::operation::{Operation, Outcome};

/// Step into a property of every object.
///
/// `children("address[country=Germany]")` collects the `address` of each
/// object and then queues `filter("[country=Germany]")`. List-valued
/// properties are flattened. Nulls and scalar values are dropped, and so are
/// repeated objects (compared by value, not identity).
/// `children().filter("address")` is equivalent to `children("address")`.
pub struct ChildrenOperation;

impl<T: QueryObject> Operation<T> for ChildrenOperation {
    fn short_name(&self) -> &str {
        "children"
    }

    fn priority(&self) -> i32 {
        BUILTIN_PRIORITY
    }

    fn evaluate(
        &self,
        evaluation: &mut Evaluation<'_, T>,
        arguments: &[Value],
    ) -> Result<Option<Outcome<T>>> {
        if evaluation.context().is_empty() {
            return Ok(None);
        }

        let selector = match selector_argument("children", arguments)? {
            Some(selector) => selector.to_string(),
            None => take_following_filter(evaluation)?,
        };

        let group = fizzle::parse_filter_group(&selector)?;
        let filter = match group.filters.as_slice() {
            [filter] if !filter.is_empty() => filter,
            [] | [_] => {
                return Err(QueryError::fizzle(
                    "children() needs at least a Property Name filter specified.",
                ))
            }
            _ => {
                return Err(QueryError::fizzle(
                    "children() only supports a single filter group right now, i.e. nothing of the form \"filter1, filter2\".",
                ))
            }
        };

        let Some(property_name) = filter.property_name() else {
            return Err(QueryError::fizzle(format!(
                "children() needs a Property Name filter, got \"{selector}\"."
            )));
        };

        let mut children = Vec::new();
        for object in evaluation.context() {
            let Some(value) = object.property(property_name) else {
                continue;
            };
            match value.items() {
                Some(items) => children.extend(items.into_iter().filter(is_container)),
                None if is_container(&value) => children.push(value),
                None => {}
            }
        }
        evaluation.set_context(dedup_in_order(children));

        // pushed in reverse so they run in source order
        for attribute in filter.attribute_filters.iter().rev() {
            evaluation.push_front("filter", vec![Value::from(attribute.text.as_str())]);
        }
        Ok(None)
    }
}

/// Selector of an immediately following `filter(...)`, which is consumed
fn take_following_filter<T: QueryObject>(evaluation: &mut Evaluation<'_, T>) -> Result<String> {
    if evaluation.peek_next_name() != Some("filter") {
        return Err(QueryError::fizzle(
            "children() needs at least a Property Name filter specified, or must be followed by filter().",
        ));
    }

    let next = evaluation.pop_next();
    let arguments = next.map(|op| op.arguments).unwrap_or_default();
    match selector_argument("filter", &arguments)? {
        Some(selector) => Ok(selector.to_string()),
        None => Err(QueryError::fizzle(
            "filter() needs arguments if it follows an empty children(): children().filter().",
        )),
    }
}

/// Objects and lists, not scalars or null
fn is_container<T: QueryObject>(value: &T) -> bool {
    value.scalar().is_none()
}
