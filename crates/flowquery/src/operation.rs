//! Operation trait and the values that flow through it
//!
//! An operation is a named, priority-ranked unit of behavior. While it runs it
//! sees an [`Evaluation`] and nothing else: it can read or replace the
//! context and inspect or extend the pending queue, but it cannot start a
//! second evaluation.
//!
//! Implementations must preserve equivalence: evaluating a queue in one go
//! must give the same result as evaluating any prefix first and the rest
//! afterwards. Work pushed onto the queue has to terminate.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::evaluation::Evaluation;
use crate::object::QueryObject;

/// A queued operation invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingOperation {
    pub name: String,
    pub arguments: Vec<Value>,
}

impl PendingOperation {
    pub fn new(name: impl Into<String>, arguments: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// Result of a final operation
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// A list of objects, e.g. `get()` or the context itself
    Objects(Vec<T>),
    /// A single object or nothing, e.g. `get(0)` or `property("title")`
    Object(Option<T>),
    Count(usize),
    Bool(bool),
}

impl<T> Outcome<T> {
    /// Short name of the variant, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Objects(_) => "objects",
            Outcome::Object(_) => "object",
            Outcome::Count(_) => "count",
            Outcome::Bool(_) => "bool",
        }
    }
}

/// A pluggable query operation.
///
/// `short_name` is the name it is invoked by; several implementations may
/// share a name as long as their priorities differ. The registry tries them
/// from the highest priority down and picks the first whose
/// [`can_evaluate`](Operation::can_evaluate) accepts the context.
pub trait Operation<T: QueryObject>: Send + Sync {
    fn short_name(&self) -> &str;

    fn priority(&self) -> i32 {
        1
    }

    /// Final operations force evaluation and return an [`Outcome`]
    fn is_final(&self) -> bool {
        false
    }

    /// Runtime guard on the shape of the context
    fn can_evaluate(&self, _context: &[T]) -> bool {
        true
    }

    fn evaluate(
        &self,
        evaluation: &mut Evaluation<'_, T>,
        arguments: &[Value],
    ) -> Result<Option<Outcome<T>>>;
}
