//! Span-based JSON engine.
//!
//! Nothing in this crate copies the source text. Every lexical and structural
//! result is an offset/length [`Span`] into the caller's buffer.
//!
//! - [`tokenizer`] — byte-level lexer with one token of lookahead
//! - [`stream`] — resumable parser that flattens one nesting level into
//!   [`StructuralToken`]s without descending into child containers
//! - [`query`] — dotted/bracketed path expressions resolved over the stream parser
//! - [`tree`] — recursive-descent document tree backed by an index arena
//! - [`builder`] — stack-checked JSON text emitter
//! - [`printer`] — compact and indented rendering of a document tree

pub mod builder;
pub mod error;
pub mod printer;
pub mod query;
pub mod span;
pub mod stream;
pub mod tokenizer;
pub mod tree;

pub use builder::{JsonBuilder, JsonScalar};
pub use error::{JsonError, Result};
pub use printer::{to_compact_string, to_pretty_string};
pub use query::{Query, QueryStep, Resolved, Resolver, ResolverConfig, DEFAULT_LOOKUP_BATCH};
pub use span::Span;
pub use stream::{
    EntryKind, StreamCursor, StreamError, StreamParser, StructuralToken, ValueType,
};
pub use tokenizer::{Keyword, Punct, Token, TokenKind, Tokenizer, JSON_KEYWORDS};
pub use tree::{
    Document, DocumentParser, NodeArena, NodeId, NodeKind, NodeRef, ParserConfig,
    DEFAULT_MAX_DEPTH,
};
