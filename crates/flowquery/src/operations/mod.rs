//! Built-in operations
//!
//! Every built-in is registered at [`BUILTIN_PRIORITY`]; applications can
//! override one by registering an implementation with a higher priority.

mod children;
mod collection;
mod filter;
mod terminal;

pub use children::ChildrenOperation;
pub use collection::{FirstOperation, LastOperation, SliceOperation, UniqueOperation};
pub use filter::{matches_filter_group, FilterOperation};
pub use terminal::{CountOperation, GetOperation, IsOperation, PropertyOperation};

use serde_json::Value;

use crate::error::{QueryError, Result};
use crate::object::QueryObject;
use crate::operation::Operation;

/// Priority of all built-in operations
pub const BUILTIN_PRIORITY: i32 = 1;

/// One instance of each built-in operation
pub fn builtins<T: QueryObject>() -> Vec<Box<dyn Operation<T>>> {
    vec![
        Box::new(CountOperation),
        Box::new(IsOperation),
        Box::new(GetOperation),
        Box::new(PropertyOperation),
        Box::new(FirstOperation),
        Box::new(LastOperation),
        Box::new(SliceOperation),
        Box::new(UniqueOperation),
        Box::new(FilterOperation),
        Box::new(ChildrenOperation),
    ]
}

/// Selector argument at position 0.
///
/// Missing, `null` and `""` all mean "no selector".
fn selector_argument<'a>(operation: &str, arguments: &'a [Value]) -> Result<Option<&'a str>> {
    match arguments.first() {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(selector)) if selector.is_empty() => Ok(None),
        Some(Value::String(selector)) => Ok(Some(selector)),
        Some(other) => Err(QueryError::invalid_argument(
            operation,
            format!("expected a selector string, got {other}"),
        )),
    }
}

/// Integer argument at `position`; missing and `null` give `None`
fn index_argument(operation: &str, arguments: &[Value], position: usize) -> Result<Option<i64>> {
    match arguments.get(position) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_i64().map(Some).ok_or_else(|| {
            QueryError::invalid_argument(operation, format!("expected an integer, got {value}"))
        }),
    }
}

/// Resolve a possibly negative index against `len`, clamped to `0..=len`
fn normalize_index(index: i64, len: usize) -> usize {
    if index < 0 {
        len.saturating_sub(index.unsigned_abs() as usize)
    } else {
        (index as usize).min(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_selector_argument() {
        assert_eq!(selector_argument("filter", &[]).unwrap(), None);
        assert_eq!(selector_argument("filter", &[json!("")]).unwrap(), None);
        assert_eq!(selector_argument("filter", &[Value::Null]).unwrap(), None);
        assert_eq!(selector_argument("filter", &[json!("[a]")]).unwrap(), Some("[a]"));
        assert!(matches!(
            selector_argument("filter", &[json!(3)]),
            Err(QueryError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_index_argument() {
        assert_eq!(index_argument("get", &[json!(-2)], 0).unwrap(), Some(-2));
        assert_eq!(index_argument("slice", &[json!(1)], 1).unwrap(), None);
        assert!(index_argument("get", &[json!("x")], 0).is_err());
        assert!(index_argument("get", &[json!(1.5)], 0).is_err());
    }

    #[test]
    fn test_normalize_index() {
        assert_eq!(normalize_index(1, 3), 1);
        assert_eq!(normalize_index(7, 3), 3);
        assert_eq!(normalize_index(-1, 3), 2);
        assert_eq!(normalize_index(-7, 3), 0);
    }
}
