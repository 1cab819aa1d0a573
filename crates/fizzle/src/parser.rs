//! Fizzle selector parser using nom
//!
//! Grammar (ordered choice, first match wins):
//! ```text
//! FilterGroup        := Filter (S ',' S Filter)*
//! Filter             := (PathFilter | IdentifierFilter | PropertyNameFilter)? AttributeFilter*
//! PathFilter         := '/' (Identifier ('/' Identifier)*)?
//!                     | Identifier '/' Identifier ('/' Identifier)*
//! IdentifierFilter   := '#' ObjectIdentifier
//! PropertyNameFilter := Identifier
//! AttributeFilter    := '[' S (InstanceofTest | PropertyComparison?) S ']'
//! InstanceofTest     := ('instanceof' | '!instanceof') S (StringLiteral | UnquotedOperand) S
//! PropertyComparison := PropertyPath S (Operator S Operand S)?
//! PropertyPath       := Identifier ('.' Identifier)*
//! Operand            := StringLiteral | NumberLiteral | BooleanLiteral | UnquotedOperand
//! Identifier         := [a-zA-Z_] [a-zA-Z0-9_-]*
//! ObjectIdentifier   := [0-9a-zA-Z_-]+
//! UnquotedOperand    := [^"'\[\]\s]+
//! ```
//!
//! Rules that are retried from the same offset by sibling alternatives are
//! memoized per parse call, keyed by `(rule, offset)`.

use crate::ast::*;
use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while, take_while1},
    character::complete::{char, digit1, satisfy},
    combinator::{consumed, map, map_res, opt, recognize, value},
    error::{Error as NomError, ErrorKind},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::num::ParseFloatError;
use std::rc::Rc;
use thiserror::Error;

/// Parse errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Error), uniffi(flat_error))]
pub enum ParseError {
    /// The selector was not consumed completely
    #[error("The selector \"{selector}\" could not be parsed. Error at character {position}.")]
    Syntax { selector: String, position: usize },
}

impl ParseError {
    fn at(selector: &str, rest: &str) -> Self {
        let consumed = &selector[..selector.len() - rest.len()];
        ParseError::Syntax {
            selector: selector.to_string(),
            position: consumed.chars().count() + 1,
        }
    }

    /// 1-based character offset where parsing stopped
    pub fn position(&self) -> usize {
        match self {
            ParseError::Syntax { position, .. } => *position,
        }
    }
}

/// Parse a selector into a [`FilterGroup`].
///
/// The whole input must be consumed; otherwise the error carries the
/// character position where parsing stopped.
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn parse_filter_group(input: &str) -> Result<FilterGroup, ParseError> {
    let parser = FizzleParser::new(input);
    match parser.filter_group(input) {
        Ok(("", group)) => Ok(group),
        Ok((rest, _)) => Err(ParseError::at(input, rest)),
        Err(_) => Err(ParseError::at(input, input)),
    }
}

/// Memoized rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Rule {
    Filter,
    PathFilter,
    IdentifierFilter,
    PropertyNameFilter,
    AttributeFilter,
    Identifier,
    PropertyPath,
    Operand,
}

/// Outcome of a rule at an offset: end offset and value, or `None` on failure
type MemoEntry = Option<(usize, Rc<dyn Any>)>;

/// Parser state for a single input. The cache never outlives one parse call.
struct FizzleParser<'a> {
    source: &'a str,
    memo: RefCell<HashMap<(Rule, usize), MemoEntry>>,
}

impl<'a> FizzleParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            memo: RefCell::new(HashMap::new()),
        }
    }

    fn offset(&self, input: &'a str) -> usize {
        self.source.len() - input.len()
    }

    /// Run `parse` unless `rule` was already tried at this offset.
    fn memoized<O, F>(&self, rule: Rule, input: &'a str, mut parse: F) -> IResult<&'a str, O>
    where
        O: Clone + 'static,
        F: FnMut(&'a str) -> IResult<&'a str, O>,
    {
        let key = (rule, self.offset(input));
        let cached = self.memo.borrow().get(&key).cloned();
        match cached {
            Some(Some((end, fragment))) => {
                if let Some(value) = fragment.downcast_ref::<O>() {
                    return Ok((&self.source[end..], value.clone()));
                }
            }
            Some(None) => return Err(nom::Err::Error(NomError::new(input, ErrorKind::Fail))),
            None => {}
        }

        let outcome = parse(input);
        let entry = match &outcome {
            Ok((rest, value)) => Some((self.offset(rest), Rc::new(value.clone()) as Rc<dyn Any>)),
            Err(nom::Err::Error(_)) => None,
            Err(_) => return outcome,
        };
        self.memo.borrow_mut().insert(key, entry);
        outcome
    }

    fn filter_group(&self, input: &'a str) -> IResult<&'a str, FilterGroup> {
        let (input, first) = self.filter(input)?;
        let (input, rest) = many0(preceded(tuple((s, char(','), s)), |i| self.filter(i)))(input)?;

        let mut filters = Vec::with_capacity(rest.len() + 1);
        filters.push(first);
        filters.extend(rest);
        Ok((input, FilterGroup { filters }))
    }

    fn filter(&self, input: &'a str) -> IResult<&'a str, Filter> {
        self.memoized(Rule::Filter, input, |input| {
            let (input, primary) = opt(|i| self.primary_filter(i))(input)?;
            let (input, attribute_filters) = many0(|i| self.attribute_filter(i))(input)?;
            Ok((
                input,
                Filter {
                    primary,
                    attribute_filters,
                },
            ))
        })
    }

    fn primary_filter(&self, input: &'a str) -> IResult<&'a str, PrimaryFilter> {
        alt((
            map(|i| self.path_filter(i), PrimaryFilter::Path),
            map(|i| self.identifier_filter(i), PrimaryFilter::Identifier),
            map(|i| self.property_name_filter(i), PrimaryFilter::PropertyName),
        ))(input)
    }

    fn path_filter(&self, input: &'a str) -> IResult<&'a str, PathFilter> {
        self.memoized(Rule::PathFilter, input, |input| {
            alt((
                map(
                    preceded(
                        char('/'),
                        opt(separated_list1(char('/'), |i| self.identifier(i))),
                    ),
                    |segments| PathFilter {
                        segments: segments.unwrap_or_default(),
                        absolute: true,
                    },
                ),
                map(
                    tuple((
                        |i| self.identifier(i),
                        char('/'),
                        |i| self.identifier(i),
                        many0(preceded(char('/'), |i| self.identifier(i))),
                    )),
                    |(first, _, second, rest)| {
                        let mut segments = vec![first, second];
                        segments.extend(rest);
                        PathFilter {
                            segments,
                            absolute: false,
                        }
                    },
                ),
            ))(input)
        })
    }

    fn identifier_filter(&self, input: &'a str) -> IResult<&'a str, String> {
        self.memoized(Rule::IdentifierFilter, input, |input| {
            map(
                preceded(char('#'), take_while1(is_name_char)),
                str::to_string,
            )(input)
        })
    }

    fn property_name_filter(&self, input: &'a str) -> IResult<&'a str, String> {
        self.memoized(Rule::PropertyNameFilter, input, |i| self.identifier(i))
    }

    fn identifier(&self, input: &'a str) -> IResult<&'a str, String> {
        self.memoized(Rule::Identifier, input, |input| {
            map(
                recognize(pair(satisfy(is_identifier_start), take_while(is_name_char))),
                str::to_string,
            )(input)
        })
    }

    fn property_path(&self, input: &'a str) -> IResult<&'a str, String> {
        self.memoized(Rule::PropertyPath, input, |input| {
            map(
                recognize(pair(
                    |i| self.identifier(i),
                    many0(pair(char('.'), |i| self.identifier(i))),
                )),
                str::to_string,
            )(input)
        })
    }

    fn attribute_filter(&self, input: &'a str) -> IResult<&'a str, AttributeFilter> {
        self.memoized(Rule::AttributeFilter, input, |input| {
            let (rest, (text, (property_path, test))) = consumed(delimited(
                pair(char('['), s),
                alt((
                    map(|i| self.instanceof_test(i), |test| (None, Some(test))),
                    map(opt(|i| self.property_comparison(i)), |comparison| {
                        match comparison {
                            Some((path, test)) => (Some(path), test),
                            None => (None, None),
                        }
                    }),
                )),
                pair(s, char(']')),
            ))(input)?;

            Ok((
                rest,
                AttributeFilter {
                    property_path,
                    test,
                    text: text.to_string(),
                },
            ))
        })
    }

    fn instanceof_test(&self, input: &'a str) -> IResult<&'a str, AttributeTest> {
        let (input, operator) = alt((
            value(Operator::Instanceof, tag("instanceof")),
            value(Operator::NotInstanceof, tag("!instanceof")),
        ))(input)?;
        let (input, operand) = delimited(s, alt((string_literal, unquoted_operand)), s)(input)?;
        Ok((input, AttributeTest { operator, operand }))
    }

    fn property_comparison(
        &self,
        input: &'a str,
    ) -> IResult<&'a str, (String, Option<AttributeTest>)> {
        let (input, path) = terminated(|i| self.property_path(i), s)(input)?;
        let (input, test) = opt(map(
            tuple((operator, s, |i| self.operand(i), s)),
            |(operator, _, operand, _)| AttributeTest { operator, operand },
        ))(input)?;
        Ok((input, (path, test)))
    }

    fn operand(&self, input: &'a str) -> IResult<&'a str, Operand> {
        self.memoized(Rule::Operand, input, |input| {
            alt((
                string_literal,
                number_literal,
                boolean_literal,
                unquoted_operand,
            ))(input)
        })
    }
}

/// Optional whitespace
fn s(input: &str) -> IResult<&str, &str> {
    take_while(is_selector_space)(input)
}

/// Whitespace for both `S` and the end of an unquoted operand
fn is_selector_space(c: char) -> bool {
    c.is_whitespace()
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Longer operators come first so `^=~` is never read as `^=` plus junk
fn operator(input: &str) -> IResult<&str, Operator> {
    alt((
        value(Operator::Instanceof, tag("instanceof")),
        value(Operator::NotInstanceof, tag("!instanceof")),
        value(Operator::PrefixInsensitive, tag("^=~")),
        value(Operator::Prefix, tag("^=")),
        value(Operator::SuffixInsensitive, tag("$=~")),
        value(Operator::Suffix, tag("$=")),
        value(Operator::SubstringInsensitive, tag("*=~")),
        value(Operator::Substring, tag("*=")),
        value(Operator::EqualInsensitive, tag("=~")),
        value(Operator::Equal, tag("=")),
        value(Operator::NotEqualInsensitive, tag("!=~")),
        value(Operator::NotEqual, tag("!=")),
        value(Operator::LessThanOrEqual, tag("<=")),
        value(Operator::LessThan, tag("<")),
        value(Operator::GreaterThanOrEqual, tag(">=")),
        value(Operator::GreaterThan, tag(">")),
    ))(input)
}

fn string_literal(input: &str) -> IResult<&str, Operand> {
    map(alt((quoted('"'), quoted('\''))), Operand::String)(input)
}

/// A string delimited by `quote`; a backslash escapes the quote character only.
fn quoted(quote: char) -> impl FnMut(&str) -> IResult<&str, String> {
    move |input: &str| {
        let (input, body) = delimited(
            char(quote),
            recognize(many0(alt((
                recognize(pair(char('\\'), char(quote))),
                recognize(satisfy(|c| c != quote)),
            )))),
            char(quote),
        )(input)?;
        let escaped = format!("\\{}", quote);
        Ok((input, body.replace(&escaped, &quote.to_string())))
    }
}

fn number_literal(input: &str) -> IResult<&str, Operand> {
    map_res(
        recognize(tuple((
            opt(char('-')),
            digit1,
            opt(pair(char('.'), digit1)),
        ))),
        finalise_number,
    )(input)
}

/// Decimal point means float; integers too large for i64 fall back to float.
fn finalise_number(text: &str) -> Result<Operand, ParseFloatError> {
    if !text.contains('.') {
        if let Ok(value) = text.parse::<i64>() {
            return Ok(Operand::Integer(value));
        }
    }
    text.parse::<f64>().map(Operand::Float)
}

fn boolean_literal(input: &str) -> IResult<&str, Operand> {
    map(
        alt((tag_no_case("true"), tag_no_case("false"))),
        |text: &str| Operand::Boolean(text.to_lowercase() == "true"),
    )(input)
}

fn unquoted_operand(input: &str) -> IResult<&str, Operand> {
    map(
        take_while1(|c: char| !matches!(c, '"' | '\'' | '[' | ']') && !is_selector_space(c)),
        |text: &str| Operand::Unquoted(text.to_string()),
    )(input)
}
