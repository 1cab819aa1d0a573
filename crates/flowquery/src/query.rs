//! The lazy query pipeline
//!
//! A [`Query`] is a context plus a queue of operations that have been invoked
//! but not yet run. Non-final invocations return a new query with a longer
//! queue and leave the receiver untouched. Final invocations evaluate a copy
//! of the queue right away and return an [`Outcome`].

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::error::{QueryError, Result};
use crate::evaluation::Evaluation;
use crate::object::QueryObject;
use crate::operation::{Outcome, PendingOperation};
use crate::registry::OperationRegistry;

/// Result of [`Query::invoke`]
#[derive(Debug)]
pub enum Invocation<T: QueryObject> {
    /// A non-final operation was queued
    Deferred(Query<T>),
    /// A final operation forced evaluation
    Completed(Outcome<T>),
}

impl<T: QueryObject> Invocation<T> {
    fn into_query(self, operation: &str) -> Result<Query<T>> {
        match self {
            Invocation::Deferred(query) => Ok(query),
            Invocation::Completed(outcome) => Err(QueryError::UnexpectedOutcome {
                operation: operation.to_string(),
                expected: "query",
                actual: outcome.kind(),
            }),
        }
    }

    fn into_outcome(self, operation: &str) -> Result<Outcome<T>> {
        match self {
            Invocation::Completed(outcome) => Ok(outcome),
            Invocation::Deferred(_) => Err(QueryError::UnexpectedOutcome {
                operation: operation.to_string(),
                expected: "outcome",
                actual: "query",
            }),
        }
    }
}

/// A deferred query over an ordered set of objects.
///
/// Cloning is cheap: the context is shared and only the queue is copied.
#[derive(Clone)]
pub struct Query<T: QueryObject> {
    context: Arc<Vec<T>>,
    pending: Vec<PendingOperation>,
    registry: Arc<OperationRegistry<T>>,
}

impl<T: QueryObject> Query<T> {
    pub(crate) fn new(registry: Arc<OperationRegistry<T>>, context: Vec<T>) -> Self {
        Self {
            context: Arc::new(context),
            pending: Vec::new(),
            registry,
        }
    }

    /// Invoke an operation by name.
    ///
    /// Final operations run the whole queue against a copy of the context and
    /// return the result. Anything else is appended to a copy of the queue.
    /// Unknown names surface when the queue is evaluated.
    pub fn invoke(&self, name: &str, arguments: Vec<Value>) -> Result<Invocation<T>> {
        let mut pending = self.pending.clone();
        pending.push(PendingOperation::new(name, arguments));

        if !self.registry.is_final(name) {
            return Ok(Invocation::Deferred(Self {
                context: Arc::clone(&self.context),
                pending,
                registry: Arc::clone(&self.registry),
            }));
        }

        let evaluation = Evaluation::new(self.context.to_vec(), pending, self.registry.config());
        let (context, outcome) = evaluation.run(&self.registry)?;
        Ok(Invocation::Completed(outcome.unwrap_or(Outcome::Objects(context))))
    }

    fn chain(&self, name: &str, arguments: Vec<Value>) -> Result<Query<T>> {
        self.invoke(name, arguments)?.into_query(name)
    }

    fn complete(&self, name: &str, arguments: Vec<Value>) -> Result<Outcome<T>> {
        self.invoke(name, arguments)?.into_outcome(name)
    }

    /// Keep objects matching `selector`
    pub fn filter(&self, selector: &str) -> Result<Query<T>> {
        self.chain("filter", vec![Value::from(selector)])
    }

    /// Step into a property of every object; an empty selector takes the
    /// selector of an immediately following [`filter`](Self::filter)
    pub fn children(&self, selector: &str) -> Result<Query<T>> {
        let arguments = if selector.is_empty() {
            Vec::new()
        } else {
            vec![Value::from(selector)]
        };
        self.chain("children", arguments)
    }

    pub fn first(&self) -> Result<Query<T>> {
        self.chain("first", Vec::new())
    }

    pub fn last(&self) -> Result<Query<T>> {
        self.chain("last", Vec::new())
    }

    /// Objects from `start` up to, not including, `end`
    pub fn slice(&self, start: Option<i64>, end: Option<i64>) -> Result<Query<T>> {
        let arguments = match (start, end) {
            (None, None) => Vec::new(),
            (start, None) => vec![Value::from(start)],
            (start, Some(end)) => vec![Value::from(start), Value::from(end)],
        };
        self.chain("slice", arguments)
    }

    pub fn unique(&self) -> Result<Query<T>> {
        self.chain("unique", Vec::new())
    }

    /// Number of objects after running the queue
    pub fn count(&self) -> Result<usize> {
        match self.complete("count", Vec::new())? {
            Outcome::Count(count) => Ok(count),
            other => Err(unexpected("count", "count", &other)),
        }
    }

    /// Whether any object matches `selector`; an empty selector tests the
    /// context for being non-empty
    pub fn is(&self, selector: &str) -> Result<bool> {
        let arguments = if selector.is_empty() {
            Vec::new()
        } else {
            vec![Value::from(selector)]
        };
        match self.complete("is", arguments)? {
            Outcome::Bool(matched) => Ok(matched),
            other => Err(unexpected("is", "bool", &other)),
        }
    }

    /// All objects after running the queue
    pub fn get_all(&self) -> Result<Vec<T>> {
        match self.complete("get", Vec::new())? {
            Outcome::Objects(objects) => Ok(objects),
            other => Err(unexpected("get", "objects", &other)),
        }
    }

    /// Object at `index`; negative indexes count from the end
    pub fn get(&self, index: i64) -> Result<Option<T>> {
        match self.complete("get", vec![Value::from(index)])? {
            Outcome::Object(object) => Ok(object),
            other => Err(unexpected("get", "object", &other)),
        }
    }

    /// Value at a dotted property path of the first object
    pub fn property(&self, path: &str) -> Result<Option<T>> {
        match self.complete("property", vec![Value::from(path)])? {
            Outcome::Object(object) => Ok(object),
            other => Err(unexpected("property", "object", &other)),
        }
    }

    /// Run the pending queue in place and return the resulting context.
    ///
    /// This is the only call that changes the receiver. On error the queue is
    /// left as it was.
    pub fn materialize(&mut self) -> Result<&[T]> {
        if !self.pending.is_empty() {
            let evaluation = Evaluation::new(
                self.context.to_vec(),
                self.pending.iter().cloned(),
                self.registry.config(),
            );
            let (context, _) = evaluation.run(&self.registry)?;
            self.context = Arc::new(context);
            self.pending.clear();
        }
        Ok(&self.context)
    }

    /// Materialize, then iterate the objects in order
    pub fn iter(&mut self) -> Result<std::slice::Iter<'_, T>> {
        Ok(self.materialize()?.iter())
    }

    /// Materialize and take the objects
    pub fn into_vec(mut self) -> Result<Vec<T>> {
        self.materialize()?;
        Ok(Arc::try_unwrap(self.context).unwrap_or_else(|shared| shared.to_vec()))
    }

    /// The context as of the last evaluation; stale while operations are pending
    pub fn context(&self) -> &[T] {
        &self.context
    }

    /// Names of the queued operations, in execution order
    pub fn pending_names(&self) -> Vec<&str> {
        self.pending.iter().map(|op| op.name.as_str()).collect()
    }

    pub fn pending(&self) -> &[PendingOperation] {
        &self.pending
    }

    pub fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn registry(&self) -> &Arc<OperationRegistry<T>> {
        &self.registry
    }
}

fn unexpected<T>(operation: &str, expected: &'static str, actual: &Outcome<T>) -> QueryError {
    QueryError::UnexpectedOutcome {
        operation: operation.to_string(),
        expected,
        actual: actual.kind(),
    }
}

impl<T: QueryObject> fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("context", &self.context)
            .field("pending", &self.pending)
            .field("operations", &self.registry.len())
            .finish()
    }
}

/// Anything a query can be started from
pub trait IntoContext<T: QueryObject> {
    fn into_context(self) -> Result<Vec<T>>;
}

impl<T: QueryObject> IntoContext<T> for Vec<T> {
    fn into_context(self) -> Result<Vec<T>> {
        Ok(self)
    }
}

impl<T: QueryObject> IntoContext<T> for &[T] {
    fn into_context(self) -> Result<Vec<T>> {
        Ok(self.to_vec())
    }
}

/// Wrapping a query materializes it and starts from its objects
impl<T: QueryObject> IntoContext<T> for Query<T> {
    fn into_context(self) -> Result<Vec<T>> {
        self.into_vec()
    }
}
