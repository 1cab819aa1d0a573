//! Context reshaping: `first`, `last`, `slice` and `unique`

use serde_json::Value;

use super::{index_argument, normalize_index, BUILTIN_PRIORITY};
use crate::error::Result;
use crate::evaluation::Evaluation;
use crate::object::QueryObject;
use crate::operation::{Operation, Outcome};

pub struct FirstOperation;

impl<T: QueryObject> Operation<T> for FirstOperation {
    fn short_name(&self) -> &str {
        "first"
    }

    fn priority(&self) -> i32 {
        BUILTIN_PRIORITY
    }

    fn evaluate(
        &self,
        evaluation: &mut Evaluation<'_, T>,
        _arguments: &[Value],
    ) -> Result<Option<Outcome<T>>> {
        let mut context = evaluation.take_context();
        context.truncate(1);
        evaluation.set_context(context);
        Ok(None)
    }
}

pub struct LastOperation;

impl<T: QueryObject> Operation<T> for LastOperation {
    fn short_name(&self) -> &str {
        "last"
    }

    fn priority(&self) -> i32 {
        BUILTIN_PRIORITY
    }

    fn evaluate(
        &self,
        evaluation: &mut Evaluation<'_, T>,
        _arguments: &[Value],
    ) -> Result<Option<Outcome<T>>> {
        let last = evaluation.take_context().pop();
        evaluation.set_context(last.into_iter().collect());
        Ok(None)
    }
}

/// `slice(start, end)`; negative indexes count from the end and both bounds
/// are clamped to the context
pub struct SliceOperation;

impl<T: QueryObject> Operation<T> for SliceOperation {
    fn short_name(&self) -> &str {
        "slice"
    }

    fn priority(&self) -> i32 {
        BUILTIN_PRIORITY
    }

    fn evaluate(
        &self,
        evaluation: &mut Evaluation<'_, T>,
        arguments: &[Value],
    ) -> Result<Option<Outcome<T>>> {
        let start = index_argument("slice", arguments, 0)?;
        let end = index_argument("slice", arguments, 1)?;

        let mut context = evaluation.take_context();
        let len = context.len();
        let start = start.map_or(0, |s| normalize_index(s, len));
        let end = end.map_or(len, |e| normalize_index(e, len));

        if start >= end {
            context.clear();
        } else {
            context.truncate(end);
            context.drain(..start);
        }
        evaluation.set_context(context);
        Ok(None)
    }
}

/// Drop repeated objects, keeping the first occurrence.
///
/// Objects are compared by value: two equal objects built separately count
/// as one.
pub struct UniqueOperation;

impl<T: QueryObject> Operation<T> for UniqueOperation {
    fn short_name(&self) -> &str {
        "unique"
    }

    fn priority(&self) -> i32 {
        BUILTIN_PRIORITY
    }

    fn evaluate(
        &self,
        evaluation: &mut Evaluation<'_, T>,
        _arguments: &[Value],
    ) -> Result<Option<Outcome<T>>> {
        let context = evaluation.take_context();
        evaluation.set_context(dedup_in_order(context));
        Ok(None)
    }
}

/// Remove later duplicates by value equality. Objects are only `PartialEq`, so this is quadratic.
pub(crate) fn dedup_in_order<T: PartialEq>(objects: Vec<T>) -> Vec<T> {
    let mut unique: Vec<T> = Vec::with_capacity(objects.len());
    for object in objects {
        if !unique.contains(&object) {
            unique.push(object);
        }
    }
    unique
}
