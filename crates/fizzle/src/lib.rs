//! fizzle - CSS-like selectors for object queries
//!
//! Fizzle is a small selector language for filtering sets of objects, in the
//! spirit of CSS selectors:
//!
//! # Selector Syntax
//!
//! - **Property names**: `address` selects the `address` property
//! - **Identifiers**: `#node-abc123` matches an object by identifier
//! - **Paths**: `/sites/main` (absolute) or `main/about` (relative)
//! - **Attribute filters**: `[country=Germany]`, `[price<=10.5]`, `[title^=~intro]`
//! - **Type tests**: `[instanceof string]`, `[!instanceof Acme\Thing]`
//! - **Unions**: `[name], [title]` matches either filter
//!
//! # Examples
//!
//! ```
//! use fizzle::{parse_filter_group, Operator};
//!
//! let group = parse_filter_group("address[country=Germany]").unwrap();
//! let filter = &group.filters[0];
//! assert_eq!(filter.property_name(), Some("address"));
//! assert_eq!(filter.attribute_filters[0].operator(), Some(Operator::Equal));
//! ```

pub mod ast;
pub mod parser;

pub use ast::*;
pub use parser::*;

// Setup UniFFI when the feature is enabled
#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();
