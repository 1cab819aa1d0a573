//! Final operations: `count`, `is`, `get` and `property`

use serde_json::Value;

use super::{index_argument, selector_argument, BUILTIN_PRIORITY};
use crate::error::{QueryError, Result};
use crate::evaluation::Evaluation;
use crate::object::QueryObject;
use crate::operation::{Operation, Outcome};

/// Number of objects; `count(selector)` counts the matching ones
pub struct CountOperation;

impl<T: QueryObject> Operation<T> for CountOperation {
    fn short_name(&self) -> &str {
        "count"
    }

    fn priority(&self) -> i32 {
        BUILTIN_PRIORITY
    }

    fn is_final(&self) -> bool {
        true
    }

    fn evaluate(
        &self,
        evaluation: &mut Evaluation<'_, T>,
        arguments: &[Value],
    ) -> Result<Option<Outcome<T>>> {
        match selector_argument("count", arguments)? {
            None => Ok(Some(Outcome::Count(evaluation.context().len()))),
            Some(selector) => {
                evaluation.push_front("count", Vec::new());
                evaluation.push_front("filter", vec![Value::from(selector)]);
                Ok(None)
            }
        }
    }
}

/// Whether the context is non-empty; `is(selector)` tests for a match
pub struct IsOperation;

impl<T: QueryObject> Operation<T> for IsOperation {
    fn short_name(&self) -> &str {
        "is"
    }

    fn priority(&self) -> i32 {
        BUILTIN_PRIORITY
    }

    fn is_final(&self) -> bool {
        true
    }

    fn evaluate(
        &self,
        evaluation: &mut Evaluation<'_, T>,
        arguments: &[Value],
    ) -> Result<Option<Outcome<T>>> {
        match selector_argument("is", arguments)? {
            None => Ok(Some(Outcome::Bool(!evaluation.context().is_empty()))),
            Some(selector) => {
                evaluation.push_front("is", Vec::new());
                evaluation.push_front("filter", vec![Value::from(selector)]);
                Ok(None)
            }
        }
    }
}

/// `get()` returns all objects, `get(index)` one of them
pub struct GetOperation;

impl<T: QueryObject> Operation<T> for GetOperation {
    fn short_name(&self) -> &str {
        "get"
    }

    fn priority(&self) -> i32 {
        BUILTIN_PRIORITY
    }

    fn is_final(&self) -> bool {
        true
    }

    fn evaluate(
        &self,
        evaluation: &mut Evaluation<'_, T>,
        arguments: &[Value],
    ) -> Result<Option<Outcome<T>>> {
        let Some(index) = index_argument("get", arguments, 0)? else {
            return Ok(Some(Outcome::Objects(evaluation.take_context())));
        };

        let context = evaluation.context();
        let position = if index < 0 {
            context.len().checked_sub(index.unsigned_abs() as usize)
        } else {
            Some(index as usize)
        };
        let object = position.and_then(|p| context.get(p)).cloned();
        Ok(Some(Outcome::Object(object)))
    }
}

/// `property(path)` reads a dotted property path of the first object
pub struct PropertyOperation;

impl<T: QueryObject> Operation<T> for PropertyOperation {
    fn short_name(&self) -> &str {
        "property"
    }

    fn priority(&self) -> i32 {
        BUILTIN_PRIORITY
    }

    fn is_final(&self) -> bool {
        true
    }

    fn evaluate(
        &self,
        evaluation: &mut Evaluation<'_, T>,
        arguments: &[Value],
    ) -> Result<Option<Outcome<T>>> {
        let path = match arguments.first() {
            Some(Value::String(path)) if !path.is_empty() => path,
            _ => {
                return Err(QueryError::invalid_argument(
                    "property",
                    "expects a non-empty property path",
                ))
            }
        };

        let value = evaluation
            .context()
            .first()
            .and_then(|object| object.property_path(path));
        Ok(Some(Outcome::Object(value)))
    }
}
