//! The evaluation frame operations run in
//!
//! [`Evaluation`] owns the working context and the pending queue while a
//! query is being forced. Operations get `&mut Evaluation` and may only use
//! the primitives below; the drain loop itself lives in [`Evaluation::run`].

use serde_json::Value;
use std::collections::VecDeque;
use tracing::{debug, trace};

use crate::config::QueryConfig;
use crate::error::{QueryError, Result};
use crate::object::QueryObject;
use crate::operation::{Outcome, PendingOperation};
use crate::registry::OperationRegistry;

/// Working state of one forced evaluation
pub struct Evaluation<'c, T> {
    context: Vec<T>,
    pending: VecDeque<PendingOperation>,
    config: &'c QueryConfig,
}

impl<'c, T: QueryObject> Evaluation<'c, T> {
    pub(crate) fn new(
        context: Vec<T>,
        pending: impl IntoIterator<Item = PendingOperation>,
        config: &'c QueryConfig,
    ) -> Self {
        Self {
            context,
            pending: pending.into_iter().collect(),
            config,
        }
    }

    /// Remove and return the next pending operation
    pub fn pop_next(&mut self) -> Option<PendingOperation> {
        self.pending.pop_front()
    }

    /// Queue an operation to run next, ahead of everything already pending
    pub fn push_front(&mut self, name: impl Into<String>, arguments: Vec<Value>) {
        self.pending.push_front(PendingOperation::new(name, arguments));
    }

    /// Name of the next pending operation, if any
    pub fn peek_next_name(&self) -> Option<&str> {
        self.pending.front().map(|op| op.name.as_str())
    }

    pub fn context(&self) -> &[T] {
        &self.context
    }

    /// Replace the working context
    pub fn set_context(&mut self, context: Vec<T>) {
        self.context = context;
    }

    /// Move the context out, leaving it empty until [`set_context`](Self::set_context)
    pub fn take_context(&mut self) -> Vec<T> {
        std::mem::take(&mut self.context)
    }

    pub fn config(&self) -> &'c QueryConfig {
        self.config
    }

    /// Drain the pending queue.
    ///
    /// Each popped operation is resolved against the context as it is at that
    /// moment. Returns the final context and the value returned by the last
    /// operation that ran.
    pub(crate) fn run(
        mut self,
        registry: &OperationRegistry<T>,
    ) -> Result<(Vec<T>, Option<Outcome<T>>)> {
        debug!(
            pending = self.pending.len(),
            context = self.context.len(),
            "forcing evaluation"
        );

        let mut executed: u64 = 0;
        let mut result = None;
        while let Some(next) = self.pending.pop_front() {
            if let Some(limit) = self.config.max_operations {
                if executed >= limit {
                    return Err(QueryError::OperationLimitExceeded { limit });
                }
            }
            executed += 1;

            trace!(
                operation = %next.name,
                arguments = next.arguments.len(),
                context = self.context.len(),
                "evaluating operation"
            );
            let operation = registry.resolve(&next.name, &self.context)?;
            result = operation.evaluate(&mut self, &next.arguments)?;
        }

        debug!(executed, context = self.context.len(), "evaluation finished");
        Ok((self.context, result))
    }
}
