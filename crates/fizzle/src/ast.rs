//! Abstract Syntax Tree for Fizzle selectors
//!
//! A selector such as `address[country=Germany], #abc` parses into a
//! [`FilterGroup`] holding one [`Filter`] per comma-separated part. Nodes are
//! plain data: once produced they are never mutated, and parsing the same text
//! twice yields structurally equal trees.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A comma-separated list of filters. Matches are unioned in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FilterGroup {
    pub filters: Vec<Filter>,
}

impl FilterGroup {
    /// Number of comma-separated filters
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

/// One comma-separated unit: an optional primary filter plus attribute filters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct Filter {
    /// Path, identifier or property name filter
    pub primary: Option<PrimaryFilter>,
    /// Bracketed attribute filters, all of which must match
    pub attribute_filters: Vec<AttributeFilter>,
}

impl Filter {
    /// True if the filter neither names a primary nor carries attribute filters.
    ///
    /// The grammar lets a filter match the empty string, so `""` parses into a
    /// group with a single empty filter.
    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.attribute_filters.is_empty()
    }

    /// The property name, if the primary filter is a property name filter
    pub fn property_name(&self) -> Option<&str> {
        match &self.primary {
            Some(PrimaryFilter::PropertyName(name)) => Some(name),
            _ => None,
        }
    }

    /// The object identifier, if the primary filter is `#identifier`
    pub fn identifier(&self) -> Option<&str> {
        match &self.primary {
            Some(PrimaryFilter::Identifier(id)) => Some(id),
            _ => None,
        }
    }

    /// The path, if the primary filter is a path filter
    pub fn path(&self) -> Option<&PathFilter> {
        match &self.primary {
            Some(PrimaryFilter::Path(path)) => Some(path),
            _ => None,
        }
    }
}

/// The leading part of a filter, before any `[...]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
pub enum PrimaryFilter {
    /// `/a/b` or `a/b`
    Path(PathFilter),
    /// `#object-identifier`
    Identifier(String),
    /// A bare identifier such as `address`
    PropertyName(String),
}

/// A slash-separated path such as `/sites/main` or `main/about`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct PathFilter {
    pub segments: Vec<String>,
    /// Whether the path started with `/`
    pub absolute: bool,
}

impl fmt::Display for PathFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.absolute {
            write!(f, "/")?;
        }
        write!(f, "{}", self.segments.join("/"))
    }
}

/// A bracketed attribute filter, e.g. `[title="Hello"]` or `[instanceof string]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct AttributeFilter {
    /// Dotted property path; `None` tests the object itself
    pub property_path: Option<String>,
    /// Operator and operand; `None` is an existence test (`[title]`)
    pub test: Option<AttributeTest>,
    /// The source text of the filter including brackets
    pub text: String,
}

impl AttributeFilter {
    pub fn operator(&self) -> Option<Operator> {
        self.test.as_ref().map(|t| t.operator)
    }

    pub fn operand(&self) -> Option<&Operand> {
        self.test.as_ref().map(|t| &t.operand)
    }
}

/// Operator and operand of an attribute filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct AttributeTest {
    pub operator: Operator,
    pub operand: Operand,
}

/// Attribute filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
pub enum Operator {
    /// `instanceof`
    Instanceof,
    /// `!instanceof`
    NotInstanceof,
    /// `=`
    Equal,
    /// `=~`
    EqualInsensitive,
    /// `!=`
    NotEqual,
    /// `!=~`
    NotEqualInsensitive,
    /// `^=`
    Prefix,
    /// `^=~`
    PrefixInsensitive,
    /// `$=`
    Suffix,
    /// `$=~`
    SuffixInsensitive,
    /// `*=`
    Substring,
    /// `*=~`
    SubstringInsensitive,
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEqual,
}

impl Operator {
    /// The operator as written in a selector
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Instanceof => "instanceof",
            Operator::NotInstanceof => "!instanceof",
            Operator::Equal => "=",
            Operator::EqualInsensitive => "=~",
            Operator::NotEqual => "!=",
            Operator::NotEqualInsensitive => "!=~",
            Operator::Prefix => "^=",
            Operator::PrefixInsensitive => "^=~",
            Operator::Suffix => "$=",
            Operator::SuffixInsensitive => "$=~",
            Operator::Substring => "*=",
            Operator::SubstringInsensitive => "*=~",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
        }
    }

    /// Whether string comparison ignores case
    pub fn is_case_insensitive(&self) -> bool {
        matches!(
            self,
            Operator::EqualInsensitive
                | Operator::NotEqualInsensitive
                | Operator::PrefixInsensitive
                | Operator::SuffixInsensitive
                | Operator::SubstringInsensitive
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Right-hand side of an attribute filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
pub enum Operand {
    /// Single- or double-quoted string, quotes removed
    String(String),
    /// Number literal without a decimal point
    Integer(i64),
    /// Number literal with a decimal point
    Float(f64),
    /// `true` / `false`, any case
    Boolean(bool),
    /// Bare token such as `Germany` or `Acme\Thing`
    Unquoted(String),
}

impl Operand {
    /// The textual form used by string operators.
    pub fn as_text(&self) -> String {
        match self {
            Operand::String(s) | Operand::Unquoted(s) => s.clone(),
            Operand::Integer(i) => i.to_string(),
            Operand::Float(f) => f.to_string(),
            Operand::Boolean(b) => b.to_string(),
        }
    }

    /// The string payload of quoted and unquoted operands
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Operand::String(s) | Operand::Unquoted(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_round_trip_text() {
        assert_eq!(Operator::PrefixInsensitive.as_str(), "^=~");
        assert_eq!(Operator::NotInstanceof.to_string(), "!instanceof");
        assert!(Operator::SubstringInsensitive.is_case_insensitive());
        assert!(!Operator::Substring.is_case_insensitive());
    }

    #[test]
    fn test_operand_text() {
        assert_eq!(Operand::Integer(42).as_text(), "42");
        assert_eq!(Operand::Float(10.5).as_text(), "10.5");
        assert_eq!(Operand::Boolean(true).as_text(), "true");
        assert_eq!(Operand::Unquoted("Acme\\Thing".into()).as_str(), Some("Acme\\Thing"));
        assert_eq!(Operand::Integer(1).as_str(), None);
    }

    #[test]
    fn test_filter_accessors() {
        let filter = Filter {
            primary: Some(PrimaryFilter::PropertyName("address".into())),
            attribute_filters: vec![],
        };
        assert_eq!(filter.property_name(), Some("address"));
        assert_eq!(filter.identifier(), None);
        assert!(!filter.is_empty());
        assert!(Filter::default().is_empty());
    }

    #[test]
    fn test_path_display() {
        let path = PathFilter {
            segments: vec!["sites".into(), "main".into()],
            absolute: true,
        };
        assert_eq!(path.to_string(), "/sites/main");
    }
}
