//! Resumable one-level JSON parser.
//!
//! A [`StreamParser`] enumerates the immediate children of the value at the
//! start of its range: map entries for `{`, array elements for `[`, or the
//! value itself as a single bare token. Child containers are skipped by
//! bracket counting and reported as a span, so callers only pay for the
//! levels they descend into.
//!
//! ```
//! use jsonframe_json::{StreamParser, StructuralToken};
//!
//! let src = r#"{"a": 1, "b": [2, 3], "c": null}"#;
//! let mut parser = StreamParser::new(src);
//! let mut buf = [StructuralToken::default(); 2];
//! let mut names = Vec::new();
//! loop {
//!     let n = parser.parse(&mut buf);
//!     names.extend(buf[..n].iter().filter_map(|t| t.name_str(src)));
//!     if n < buf.len() {
//!         break;
//!     }
//! }
//! assert_eq!(names, ["a", "b", "c"]);
//! ```

use crate::span::Span;
use crate::tokenizer::{Keyword, Punct, Token, TokenKind, Tokenizer};

/// What a structural token stands for in its parent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntryKind {
    /// `"name": value` inside a map.
    MapEntry,
    /// A value inside an array.
    ArrayElement,
    /// The top-level value itself was a scalar.
    #[default]
    Bare,
}

/// Type of the value a structural token spans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValueType {
    Map,
    Array,
    String,
    Number,
    True,
    False,
    Null,
    #[default]
    Error,
}

impl ValueType {
    pub fn is_container(self) -> bool {
        matches!(self, Self::Map | Self::Array)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Map => "map",
            Self::Array => "array",
            Self::String => "string",
            Self::Number => "number",
            Self::True => "true",
            Self::False => "false",
            Self::Null => "null",
            Self::Error => "error",
        }
    }
}

impl From<Keyword> for ValueType {
    fn from(keyword: Keyword) -> Self {
        match keyword {
            Keyword::True => Self::True,
            Keyword::False => Self::False,
            Keyword::Null => Self::Null,
        }
    }
}

/// One flattened JSON entity.
///
/// `name` is `Some` exactly when `kind` is [`EntryKind::MapEntry`]; it spans
/// the quoted name including its quotes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StructuralToken {
    pub kind: EntryKind,
    pub name: Option<Span>,
    pub value: Span,
    pub value_type: ValueType,
}

impl StructuralToken {
    /// Member name without quotes.
    pub fn name_str<'s>(&self, source: &'s str) -> Option<&'s str> {
        self.name.map(|span| span.inner().slice(source))
    }

    /// Raw value text (strings keep their quotes).
    pub fn value_str<'s>(&self, source: &'s str) -> &'s str {
        self.value.slice(source)
    }

    pub fn name_matches(&self, source: &str, name: &str) -> bool {
        self.name_str(source) == Some(name)
    }

    /// String value without quotes; empty for any other type.
    pub fn as_str<'s>(&self, source: &'s str) -> &'s str {
        match self.value_type {
            ValueType::String => self.value.inner().slice(source),
            _ => "",
        }
    }

    /// Integer value of a number; fractions truncate, anything else is 0.
    pub fn as_i64(&self, source: &str) -> i64 {
        if self.value_type != ValueType::Number {
            return 0;
        }
        let text = self.value.slice(source);
        text.parse::<i64>().unwrap_or_else(|_| {
            text.parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map_or(0, |f| f as i64)
        })
    }

    pub fn as_f64(&self, source: &str) -> f64 {
        match self.value_type {
            ValueType::Number => self.value.slice(source).parse().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// True only for `true` values.
    pub fn as_bool(&self) -> bool {
        self.value_type == ValueType::True
    }
}

/// Why a stream parser stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    #[error("unexpected token at offset {offset}")]
    UnexpectedToken { offset: usize },
    #[error("expected quoted member name at offset {offset}")]
    ExpectedName { offset: usize },
    #[error("expected ':' at offset {offset}")]
    ExpectedColon { offset: usize },
    #[error("invalid value at offset {offset}")]
    InvalidValue { offset: usize },
    #[error("container not closed before offset {offset}")]
    Unterminated { offset: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Start,
    Map,
    Array,
    Done,
}

/// A saved parse position. Valid only with the source it was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamCursor {
    pos: usize,
    end: usize,
    mode: Mode,
}

impl StreamCursor {
    /// Absolute offset the next fetch starts from.
    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn is_finished(&self) -> bool {
        self.mode == Mode::Done
    }
}

/// Resumable one-level parser over a source range.
#[derive(Debug, Clone)]
pub struct StreamParser<'a> {
    source: &'a str,
    tokenizer: Tokenizer<'a>,
    mode: Mode,
    error: Option<StreamError>,
}

impl<'a> StreamParser<'a> {
    /// Parse the whole source.
    pub fn new(source: &'a str) -> Self {
        Self::with_range(source, 0, source.len())
    }

    /// Parse `len` bytes starting at `start`, typically a value span found earlier.
    pub fn with_range(source: &'a str, start: usize, len: usize) -> Self {
        Self {
            source,
            tokenizer: Tokenizer::with_range(source, start, len),
            mode: Mode::Start,
            error: None,
        }
    }

    /// Restart over a new range of the same source.
    pub fn restart(&mut self, start: usize, len: usize) {
        self.tokenizer.reset(start, len);
        self.mode = Mode::Start;
        self.error = None;
    }

    /// Restart over a span of the same source.
    pub fn restart_at(&mut self, span: Span) {
        self.restart(span.offset, span.len);
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// The structural problem that stopped parsing, if any.
    pub fn error(&self) -> Option<StreamError> {
        self.error
    }

    /// True once the enclosing container closed, the bare value was
    /// returned, the range ended, or an error stopped parsing.
    pub fn is_finished(&self) -> bool {
        self.mode == Mode::Done
    }

    /// Record the current position.
    pub fn checkpoint(&self) -> StreamCursor {
        StreamCursor {
            pos: self.tokenizer.position(),
            end: self.tokenizer.range_end(),
            mode: self.mode,
        }
    }

    /// Continue from a recorded position.
    pub fn resume(&mut self, cursor: StreamCursor) {
        self.tokenizer.reset(cursor.pos, cursor.end - cursor.pos);
        self.mode = cursor.mode;
        self.error = None;
    }

    /// Fill `buffer` with up to `buffer.len()` tokens and return how many were
    /// written. A return equal to the capacity means more may follow: call
    /// again to continue.
    pub fn parse(&mut self, buffer: &mut [StructuralToken]) -> usize {
        let mut count = 0;
        while count < buffer.len() {
            match self.next_entry() {
                Some(token) => {
                    buffer[count] = token;
                    count += 1;
                }
                None => break,
            }
        }
        count
    }

    /// Consume the next value without descending into it.
    ///
    /// Containers are scanned to their matching close bracket and reported
    /// with the full bracketed span; scalars are reported with their token
    /// span. Anything else, or a container cut off by the end of the range,
    /// yields [`ValueType::Error`].
    pub fn skip_value(&mut self) -> (ValueType, Span) {
        let token = self.tokenizer.next_significant();
        match token.kind {
            TokenKind::Punct(Punct::BraceOpen) => {
                self.skip_container(token, Punct::BraceOpen, Punct::BraceClose, ValueType::Map)
            }
            TokenKind::Punct(Punct::BracketOpen) => self.skip_container(
                token,
                Punct::BracketOpen,
                Punct::BracketClose,
                ValueType::Array,
            ),
            TokenKind::String => (ValueType::String, token.span),
            TokenKind::Number => (ValueType::Number, token.span),
            TokenKind::Keyword(keyword) => (keyword.into(), token.span),
            _ => (ValueType::Error, token.span),
        }
    }

    fn skip_container(
        &mut self,
        open: Token,
        opener: Punct,
        closer: Punct,
        value_type: ValueType,
    ) -> (ValueType, Span) {
        let start = open.span.offset;
        let mut depth = 1usize;
        loop {
            let token = self.tokenizer.next_token();
            match token.kind {
                TokenKind::Punct(p) if p == opener => depth += 1,
                TokenKind::Punct(p) if p == closer => {
                    depth -= 1;
                    if depth == 0 {
                        return (value_type, Span::new(start, token.span.end() - start));
                    }
                }
                TokenKind::Eos => {
                    return (ValueType::Error, Span::new(start, token.span.offset - start));
                }
                _ => {}
            }
        }
    }

    fn next_entry(&mut self) -> Option<StructuralToken> {
        match self.mode {
            Mode::Done => None,
            Mode::Map => self.next_map_entry(),
            Mode::Array => self.next_array_element(),
            Mode::Start => {
                let token = self.tokenizer.next_significant();
                let value_type = match token.kind {
                    TokenKind::Eos => {
                        self.mode = Mode::Done;
                        return None;
                    }
                    TokenKind::Punct(Punct::BraceOpen) => {
                        self.mode = Mode::Map;
                        return self.next_map_entry();
                    }
                    TokenKind::Punct(Punct::BracketOpen) => {
                        self.mode = Mode::Array;
                        return self.next_array_element();
                    }
                    TokenKind::String => ValueType::String,
                    TokenKind::Number => ValueType::Number,
                    TokenKind::Keyword(keyword) => keyword.into(),
                    TokenKind::Error => {
                        return self.fail(StreamError::InvalidValue {
                            offset: token.span.offset,
                        })
                    }
                    _ => {
                        return self.fail(StreamError::UnexpectedToken {
                            offset: token.span.offset,
                        })
                    }
                };
                self.mode = Mode::Done;
                Some(StructuralToken {
                    kind: EntryKind::Bare,
                    name: None,
                    value: token.span,
                    value_type,
                })
            }
        }
    }

    fn next_map_entry(&mut self) -> Option<StructuralToken> {
        let name = loop {
            let token = self.tokenizer.next_significant();
            match token.kind {
                TokenKind::Punct(Punct::BraceClose) => {
                    self.mode = Mode::Done;
                    return None;
                }
                TokenKind::Punct(Punct::Comma) => continue,
                TokenKind::String => break token.span,
                TokenKind::Eos => {
                    return self.fail(StreamError::Unterminated {
                        offset: token.span.offset,
                    })
                }
                _ => {
                    return self.fail(StreamError::ExpectedName {
                        offset: token.span.offset,
                    })
                }
            }
        };

        let colon = self.tokenizer.next_significant();
        if !colon.is_punct(Punct::Colon) {
            return self.fail(StreamError::ExpectedColon {
                offset: colon.span.offset,
            });
        }

        let (value_type, value) = self.skip_value();
        if value_type == ValueType::Error {
            return self.fail(StreamError::InvalidValue {
                offset: value.offset,
            });
        }

        Some(StructuralToken {
            kind: EntryKind::MapEntry,
            name: Some(name),
            value,
            value_type,
        })
    }

    fn next_array_element(&mut self) -> Option<StructuralToken> {
        loop {
            let token = self.tokenizer.next_significant();
            match token.kind {
                TokenKind::Punct(Punct::BracketClose) => {
                    self.mode = Mode::Done;
                    return None;
                }
                TokenKind::Punct(Punct::Comma) => continue,
                TokenKind::Eos => {
                    return self.fail(StreamError::Unterminated {
                        offset: token.span.offset,
                    })
                }
                _ => {
                    // slot is always free here: pushes are consumed by skip_value
                    let _ = self.tokenizer.push_token(token);
                    break;
                }
            }
        }

        let (value_type, value) = self.skip_value();
        if value_type == ValueType::Error {
            return self.fail(StreamError::InvalidValue {
                offset: value.offset,
            });
        }

        Some(StructuralToken {
            kind: EntryKind::ArrayElement,
            name: None,
            value,
            value_type,
        })
    }

    fn fail(&mut self, error: StreamError) -> Option<StructuralToken> {
        tracing::debug!(%error, "stream parse stopped");
        self.error = Some(error);
        self.mode = Mode::Done;
        None
    }
}

impl Iterator for StreamParser<'_> {
    type Item = StructuralToken;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry()
    }
}
