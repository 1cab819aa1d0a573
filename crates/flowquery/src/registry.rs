//! Registry of query operations.
//!
//! The registry maps an operation's short name to its implementations,
//! ordered by descending priority, and records which names are final. It is
//! assembled once through [`OperationRegistryBuilder`] and is read-only
//! afterwards; queries share it behind an `Arc`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::QueryConfig;
use crate::error::{QueryError, Result};
use crate::object::QueryObject;
use crate::operation::Operation;
use crate::operations;
use crate::query::{IntoContext, Query};

/// Registry of all available operations.
pub struct OperationRegistry<T: QueryObject> {
    operations: HashMap<String, Vec<Box<dyn Operation<T>>>>,
    final_names: HashSet<String>,
    config: QueryConfig,
}

impl<T: QueryObject> OperationRegistry<T> {
    /// Start building a registry
    pub fn builder() -> OperationRegistryBuilder<T> {
        OperationRegistryBuilder::new()
    }

    /// Registry with all built-in operations and the default configuration
    pub fn with_builtins() -> Result<Self> {
        Self::builder().register_builtins()?.build()
    }

    /// Whether invoking `name` forces evaluation
    pub fn is_final(&self, name: &str) -> bool {
        self.final_names.contains(name)
    }

    pub fn has_operation(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    /// Pick the implementation of `name` for this context.
    ///
    /// Candidates are tried from the highest priority down; the first whose
    /// `can_evaluate` accepts the context wins.
    pub fn resolve(&self, name: &str, context: &[T]) -> Result<&dyn Operation<T>> {
        let candidates = self.operations.get(name).ok_or_else(|| {
            warn!(operation = name, "unknown operation");
            QueryError::UnknownOperation {
                name: name.to_string(),
            }
        })?;

        candidates
            .iter()
            .find(|candidate| candidate.can_evaluate(context))
            .map(|candidate| &**candidate)
            .ok_or_else(|| {
                warn!(
                    operation = name,
                    candidates = candidates.len(),
                    "no operation accepts the context"
                );
                QueryError::NoApplicableOperation {
                    name: name.to_string(),
                }
            })
    }

    /// Priorities registered for `name`, highest first
    pub fn priorities(&self, name: &str) -> Vec<i32> {
        self.operations
            .get(name)
            .map(|candidates| candidates.iter().map(|c| c.priority()).collect())
            .unwrap_or_default()
    }

    /// All registered operation names, sorted
    pub fn operation_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.operations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of distinct operation names
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Start a query over `context` using this registry.
    ///
    /// Passing an existing [`Query`] materializes it and reuses its objects.
    pub fn new_query<C: IntoContext<T>>(self: &Arc<Self>, context: C) -> Result<Query<T>> {
        Ok(Query::new(Arc::clone(self), context.into_context()?))
    }
}

/// Collects operations and validates them into an [`OperationRegistry`].
pub struct OperationRegistryBuilder<T: QueryObject> {
    operations: HashMap<String, Vec<Box<dyn Operation<T>>>>,
    final_names: HashSet<String>,
    config: QueryConfig,
}

impl<T: QueryObject> OperationRegistryBuilder<T> {
    pub fn new() -> Self {
        Self {
            operations: HashMap::new(),
            final_names: HashSet::new(),
            config: QueryConfig::default(),
        }
    }

    pub fn config(mut self, config: QueryConfig) -> Self {
        self.config = config;
        self
    }

    /// Register an operation.
    ///
    /// Fails with [`QueryError::DuplicatePriority`] if an operation with the
    /// same name and priority is already registered.
    pub fn register(mut self, operation: Box<dyn Operation<T>>) -> Result<Self> {
        let name = operation.short_name().to_string();
        let priority = operation.priority();

        let candidates = self.operations.entry(name.clone()).or_default();
        if candidates.iter().any(|c| c.priority() == priority) {
            return Err(QueryError::DuplicatePriority { name, priority });
        }

        debug!(
            operation = %name,
            priority,
            is_final = operation.is_final(),
            "registering operation"
        );
        if operation.is_final() {
            self.final_names.insert(name);
        }
        candidates.push(operation);
        Ok(self)
    }

    /// Register all built-in operations
    pub fn register_builtins(self) -> Result<Self> {
        operations::builtins::<T>()
            .into_iter()
            .try_fold(self, |builder, operation| builder.register(operation))
    }

    /// Validate the configuration and freeze the registry
    pub fn build(mut self) -> Result<OperationRegistry<T>> {
        self.config.validate()?;

        for candidates in self.operations.values_mut() {
            candidates.sort_by_key(|c| std::cmp::Reverse(c.priority()));
        }

        debug!(
            operations = self.operations.len(),
            final_operations = self.final_names.len(),
            "operation registry built"
        );
        Ok(OperationRegistry {
            operations: self.operations,
            final_names: self.final_names,
            config: self.config,
        })
    }
}

impl<T: QueryObject> Default for OperationRegistryBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
