//! flowquery - Lazy, pluggable queries over ordered object sets
//!
//! A query wraps a context (an ordered list of objects) and a queue of
//! operations. Operations are looked up by name in an [`OperationRegistry`];
//! non-final operations such as `filter` or `children` only extend the queue,
//! final ones such as `count` or `get` run it and return a value.
//!
//! # Key Components
//!
//! - **OperationRegistry**: name to implementations, ranked by priority
//! - **Query**: the immutable, lazily evaluated pipeline
//! - **Evaluation**: the frame operations run in while a query is forced
//! - **QueryObject**: the object model seam, implemented for `serde_json::Value`
//! - **Built-in operations**: `count`, `is`, `get`, `property`, `first`, `last`,
//!   `slice`, `unique`, `filter`, `children`
//!
//! # Example
//!
//! ```
//! use flowquery::OperationRegistry;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(OperationRegistry::with_builtins().unwrap());
//! let people = vec![
//!     json!({"name": "Kasper", "address": {"country": "Denmark"}}),
//!     json!({"name": "Robert", "address": {"country": "Germany"}}),
//! ];
//!
//! let query = registry.new_query(people).unwrap();
//! let german = query.children("address[country=Germany]").unwrap();
//! assert_eq!(german.count().unwrap(), 1);
//! assert_eq!(query.count().unwrap(), 2);
//! ```

pub mod config;
pub mod error;
pub mod evaluation;
pub mod object;
pub mod operation;
pub mod operations;
pub mod query;
pub mod registry;

pub use config::{QueryConfig, DEFAULT_MAX_OPERATIONS};
pub use error::{QueryError, Result};
pub use evaluation::Evaluation;
pub use object::{QueryObject, Scalar};
pub use operation::{Operation, Outcome, PendingOperation};
pub use query::{IntoContext, Invocation, Query};
pub use registry::{OperationRegistry, OperationRegistryBuilder};
