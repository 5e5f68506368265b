//! Path expressions resolved without building a tree.
//!
//! `menu.items[1].label` compiles to `Name("menu")`, `Name("items")`,
//! `Index(1)`, `Name("label")`. Each step restarts a [`StreamParser`] over
//! the span found by the previous step.

use std::fmt;
use std::str::FromStr;

use crate::error::{JsonError, Result};
use crate::span::Span;
use crate::stream::{StreamError, StreamParser, StructuralToken, ValueType};

/// Default number of entries fetched per lookup batch.
pub const DEFAULT_LOOKUP_BATCH: usize = 32;

/// One navigation instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStep {
    /// Member lookup by name.
    Name(String),
    /// Positional lookup among the entries of a map or array.
    Index(usize),
}

/// A compiled path expression. The empty query addresses the whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    steps: Vec<QueryStep>,
}

impl Query {
    /// Compile a dotted/bracketed path expression.
    pub fn parse(expr: &str) -> Result<Self> {
        let bytes = expr.as_bytes();
        let mut steps = Vec::new();
        let mut pos = 0;

        while pos < bytes.len() {
            match bytes[pos] {
                b'[' => {
                    let close = expr[pos + 1..]
                        .find(']')
                        .map(|i| pos + 1 + i)
                        .ok_or(JsonError::QuerySyntax {
                            position: pos,
                            reason: "unclosed '['",
                        })?;
                    let digits = &expr[pos + 1..close];
                    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                        return Err(JsonError::QuerySyntax {
                            position: pos + 1,
                            reason: "index must be decimal digits",
                        });
                    }
                    let index = digits.parse().map_err(|_| JsonError::QuerySyntax {
                        position: pos + 1,
                        reason: "index too large",
                    })?;
                    steps.push(QueryStep::Index(index));
                    pos = close + 1;
                }
                b'.' => pos += 1,
                _ => {
                    let end = expr[pos..]
                        .find(['.', '['])
                        .map_or(bytes.len(), |i| pos + i);
                    steps.push(QueryStep::Name(expr[pos..end].to_string()));
                    pos = end;
                }
            }
        }

        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[QueryStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl FromStr for Query {
    type Err = JsonError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            match step {
                QueryStep::Name(name) if i == 0 => write!(f, "{name}")?,
                QueryStep::Name(name) => write!(f, ".{name}")?,
                QueryStep::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Lookup tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Entries fetched per stream-parser call. Index steps can only reach
    /// entries inside the first batch; name steps scan every batch.
    pub lookup_batch: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            lookup_batch: DEFAULT_LOOKUP_BATCH,
        }
    }
}

/// Location and type of a resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub span: Span,
    pub value_type: ValueType,
}

impl Resolved {
    /// Raw value text (strings keep their quotes).
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        self.span.slice(source)
    }
}

/// Resolves queries against one source buffer.
#[derive(Debug, Clone)]
pub struct Resolver<'a> {
    source: &'a str,
    config: ResolverConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::with_config(source, ResolverConfig::default())
    }

    pub fn with_config(source: &'a str, config: ResolverConfig) -> Self {
        Self { source, config }
    }

    /// Compile and resolve an expression.
    pub fn resolve_str(&self, expr: &str) -> Result<Resolved> {
        self.resolve(&Query::parse(expr)?)
    }

    /// Walk the query steps and return the span of the addressed value.
    pub fn resolve(&self, query: &Query) -> Result<Resolved> {
        let mut parser = StreamParser::new(self.source);
        let (value_type, span) = parser.skip_value();
        if value_type == ValueType::Error {
            if self.source.trim().is_empty() {
                return Err(JsonError::Empty);
            }
            return Err(JsonError::Malformed(StreamError::InvalidValue {
                offset: span.offset,
            }));
        }

        let capacity = self.config.lookup_batch.max(1);
        let mut buffer = vec![StructuralToken::default(); capacity];
        let mut current = Resolved { span, value_type };

        for step in query.steps() {
            if !current.value_type.is_container() {
                return Err(JsonError::NotAContainer {
                    offset: current.span.offset,
                });
            }
            parser.restart_at(current.span);

            let found = match step {
                QueryStep::Index(index) => {
                    let count = parser.parse(&mut buffer);
                    if *index >= count {
                        if let Some(err) = parser.error() {
                            return Err(JsonError::Malformed(err));
                        }
                        return Err(JsonError::IndexOutOfRange {
                            index: *index,
                            available: count,
                        });
                    }
                    buffer[*index]
                }
                QueryStep::Name(name) => loop {
                    let count = parser.parse(&mut buffer);
                    if let Some(token) = buffer[..count]
                        .iter()
                        .find(|token| token.name_matches(self.source, name))
                    {
                        break *token;
                    }
                    if count < capacity {
                        if let Some(err) = parser.error() {
                            return Err(JsonError::Malformed(err));
                        }
                        return Err(JsonError::NameNotFound(name.clone()));
                    }
                },
            };

            current = Resolved {
                span: found.value,
                value_type: found.value_type,
            };
        }

        tracing::trace!(
            query = %query,
            offset = current.span.offset,
            len = current.span.len,
            "query resolved"
        );
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_names_indices_and_separators() {
        let query = Query::parse("menu.items[1].label").unwrap();
        assert_eq!(
            query.steps(),
            &[
                QueryStep::Name("menu".into()),
                QueryStep::Name("items".into()),
                QueryStep::Index(1),
                QueryStep::Name("label".into()),
            ]
        );
        assert_eq!(query.to_string(), "menu.items[1].label");
    }

    #[test]
    fn compiles_leading_bracket_and_dot() {
        let query: Query = "[2][0].x".parse().unwrap();
        assert_eq!(
            query.steps(),
            &[
                QueryStep::Index(2),
                QueryStep::Index(0),
                QueryStep::Name("x".into())
            ]
        );
        assert_eq!(
            Query::parse(".a").unwrap().steps(),
            &[QueryStep::Name("a".into())]
        );
        assert!(Query::parse("").unwrap().is_empty());
    }

    #[test]
    fn rejects_bad_brackets() {
        assert!(matches!(
            Query::parse("a[1"),
            Err(JsonError::QuerySyntax { position: 1, .. })
        ));
        assert!(matches!(
            Query::parse("a[x]"),
            Err(JsonError::QuerySyntax { .. })
        ));
        assert!(matches!(
            Query::parse("a[]"),
            Err(JsonError::QuerySyntax { .. })
        ));
    }

    #[test]
    fn resolves_nested_array_element() {
        let src = r#"{"a":{"b":[10,20,30]}}"#;
        let resolved = Resolver::new(src).resolve_str("a.b[1]").unwrap();
        assert_eq!(resolved.text(src), "20");
        assert_eq!(resolved.span, Span::new(14, 2));
        assert_eq!(resolved.value_type, ValueType::Number);
    }

    #[test]
    fn resolves_menu_label() {
        let src = r#"{"menu": {"id": "file", "items": [
            {"label": "Open"},
            {"label": "Close", "shortcut": "q"}
        ]}}"#;
        let resolver = Resolver::new(src);
        assert_eq!(
            resolver
                .resolve_str("menu.items[1].label")
                .unwrap()
                .text(src),
            "\"Close\""
        );
        let items = resolver.resolve_str("menu.items").unwrap();
        assert_eq!(items.value_type, ValueType::Array);
    }

    #[test]
    fn empty_query_is_whole_document() {
        let src = "  [1, 2]  ";
        let resolved = Resolver::new(src).resolve(&Query::default()).unwrap();
        assert_eq!(resolved.text(src), "[1, 2]");
    }

    #[test]
    fn missing_name_and_index_fail() {
        let src = r#"{"a": [1, 2]}"#;
        let resolver = Resolver::new(src);
        assert_eq!(
            resolver.resolve_str("b"),
            Err(JsonError::NameNotFound("b".into()))
        );
        assert_eq!(
            resolver.resolve_str("a[5]"),
            Err(JsonError::IndexOutOfRange {
                index: 5,
                available: 2
            })
        );
    }

    #[test]
    fn index_step_applies_to_map_entries() {
        let src = r#"{"x": 1, "y": 2}"#;
        let resolved = Resolver::new(src).resolve_str("[1]").unwrap();
        assert_eq!(resolved.text(src), "2");
    }

    #[test]
    fn stepping_into_scalar_fails() {
        let src = r#"{"a": 5}"#;
        assert!(matches!(
            Resolver::new(src).resolve_str("a.b"),
            Err(JsonError::NotAContainer { offset: 6 })
        ));
    }

    #[test]
    fn index_limited_to_first_batch_names_are_not() {
        let src = r#"{"k0":0,"k1":1,"k2":2,"k3":3}"#;
        let resolver = Resolver::with_config(src, ResolverConfig { lookup_batch: 2 });
        assert_eq!(
            resolver.resolve_str("[3]"),
            Err(JsonError::IndexOutOfRange {
                index: 3,
                available: 2
            })
        );
        assert_eq!(resolver.resolve_str("k3").unwrap().text(src), "3");
    }

    #[test]
    fn empty_and_malformed_sources() {
        assert_eq!(Resolver::new("  ").resolve_str("a"), Err(JsonError::Empty));
        assert!(matches!(
            Resolver::new("{\"a\": ").resolve_str("a"),
            Err(JsonError::Malformed(_))
        ));
        assert!(matches!(
            Resolver::new(r#"{"a" 1}"#).resolve_str("a"),
            Err(JsonError::Malformed(_))
        ));
    }
}
