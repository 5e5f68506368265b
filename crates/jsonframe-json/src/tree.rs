//! Recursive-descent document tree.
//!
//! Nodes live in a [`NodeArena`] owned by the [`Document`] and refer to
//! their children by [`NodeId`]. Navigation goes through [`NodeRef`], a
//! handle that may be absent: every accessor on an absent handle returns
//! the zero value for its type instead of failing, so lookups can be
//! chained without checks.
//!
//! ```
//! use jsonframe_json::DocumentParser;
//!
//! let mut parser = DocumentParser::new();
//! let root = parser.parse(r#"{"pos": [1.5, 2], "name": "box"}"#).unwrap();
//! assert_eq!(root.get("pos").at(0).as_f64(), 1.5);
//! assert_eq!(root.get("name").as_str(), "box");
//! assert_eq!(root.get("missing").at(3).as_i64(), 0);
//! ```

use std::fmt;

use crate::error::{JsonError, Result};
use crate::query::{Query, QueryStep};
use crate::span::Span;
use crate::tokenizer::is_number_byte;

/// Default cap on container nesting.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Index of a node inside its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Tag of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Null,
    True,
    False,
    Number,
    String,
    Array,
    Map,
}

impl NodeKind {
    pub fn is_container(self) -> bool {
        matches!(self, Self::Array | Self::Map)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::True => "true",
            Self::False => "false",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Map => "map",
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    /// Full source text of the value.
    span: Span,
    /// Quote-stripped for strings, equal to `span` otherwise.
    text: Span,
    children: Vec<NodeId>,
    /// Member names (quotes stripped), parallel to `children`. Maps only.
    names: Vec<Span>,
}

impl Node {
    fn leaf(kind: NodeKind, span: Span) -> Self {
        let text = if kind == NodeKind::String {
            span.inner()
        } else {
            span
        };
        Self {
            kind,
            span,
            text,
            children: Vec::new(),
            names: Vec::new(),
        }
    }
}

/// Slab of tree nodes with a free list.
///
/// Slots released by pruning are reused by later allocations, so a parser
/// that is fed many documents settles at the size of the largest one.
#[derive(Debug, Default)]
pub struct NodeArena {
    slots: Vec<Option<Node>>,
    free: Vec<NodeId>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate room for `nodes` nodes.
    pub fn with_capacity(nodes: usize) -> Self {
        Self {
            slots: Vec::with_capacity(nodes),
            free: Vec::new(),
        }
    }

    /// Number of nodes currently allocated.
    pub fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Number of slots ever handed out (live plus free).
    pub fn slots(&self) -> usize {
        self.slots.len()
    }

    /// Drop every node at once, keeping the slot storage.
    pub fn reset(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.slots[id.index()] = Some(node);
            return id;
        }
        let id = NodeId(self.slots.len() as u32);
        self.slots.push(Some(node));
        id
    }

    fn release(&mut self, id: NodeId) -> Option<Node> {
        let node = self.slots.get_mut(id.index())?.take()?;
        self.free.push(id);
        Some(node)
    }

    fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.index())?.as_ref()
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.index())?.as_mut()
    }

    /// Release `root` and everything below it, depth first.
    fn prune(&mut self, root: NodeId) -> usize {
        let mut released = 0;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(mut node) = self.release(id) {
                stack.append(&mut node.children);
                node.names.clear();
                released += 1;
            }
        }
        released
    }
}

/// Parser limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum container nesting. Deeper input fails with `DepthExceeded`.
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// A parsed tree together with the text it spans.
#[derive(Debug, Default)]
pub struct Document {
    text: String,
    arena: NodeArena,
    root: Option<NodeId>,
}

impl Document {
    /// Source text the tree was parsed from.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Root handle; absent when nothing is parsed.
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            doc: self,
            id: self.root,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.arena.live()
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    /// Prune the whole tree back into the arena. Idempotent.
    pub fn clear(&mut self) {
        if let Some(root) = self.root.take() {
            let released = self.arena.prune(root);
            tracing::trace!(released, "document pruned");
        }
        self.text.clear();
    }

    /// Clear and hand back the arena for reuse.
    pub fn into_arena(mut self) -> NodeArena {
        self.clear();
        self.arena
    }
}

/// Builds [`Document`]s. Owns at most one tree at a time.
#[derive(Debug, Default)]
pub struct DocumentParser {
    doc: Document,
    config: ParserConfig,
}

impl DocumentParser {
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self::with_arena(NodeArena::new(), config)
    }

    /// Use a caller-supplied arena for node storage.
    pub fn with_arena(mut arena: NodeArena, config: ParserConfig) -> Self {
        arena.reset();
        Self {
            doc: Document {
                text: String::new(),
                arena,
                root: None,
            },
            config,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse `text`, discarding any previously held tree first.
    ///
    /// On failure the parser holds no tree.
    pub fn parse(&mut self, text: &str) -> Result<NodeRef<'_>> {
        self.doc.clear();
        self.doc.text.push_str(text);
        self.build()
    }

    /// Like [`parse`](Self::parse) but takes ownership of the text.
    pub fn parse_owned(&mut self, text: String) -> Result<NodeRef<'_>> {
        self.doc.clear();
        self.doc.text = text;
        self.build()
    }

    /// Prune the held tree. Safe to call with no tree.
    pub fn clear(&mut self) {
        self.doc.clear();
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn root(&self) -> NodeRef<'_> {
        self.doc.root()
    }

    /// Move the held tree out, leaving the parser empty.
    pub fn take_document(&mut self) -> Document {
        std::mem::take(&mut self.doc)
    }

    /// Give a document back so its storage can be reused by the next parse.
    pub fn recycle(&mut self, mut doc: Document) {
        doc.clear();
        if self.doc.is_empty() && doc.arena.slots.capacity() > self.doc.arena.slots.capacity() {
            self.doc = doc;
        }
    }

    fn build(&mut self) -> Result<NodeRef<'_>> {
        let Document { text, arena, root } = &mut self.doc;
        let result = TreeBuilder {
            text: text.as_str(),
            bytes: text.as_bytes(),
            arena: &mut *arena,
            max_depth: self.config.max_depth,
        }
        .parse_root();

        match result {
            Ok(id) => {
                *root = Some(id);
                Ok(self.doc.root())
            }
            Err(err) => {
                arena.reset();
                text.clear();
                tracing::debug!(error = %err, "document parse failed");
                Err(err)
            }
        }
    }
}

struct TreeBuilder<'t> {
    text: &'t str,
    bytes: &'t [u8],
    arena: &'t mut NodeArena,
    max_depth: usize,
}

impl TreeBuilder<'_> {
    fn parse_root(&mut self) -> Result<NodeId> {
        let start = self.skip_ws(0);
        if start >= self.bytes.len() {
            return Err(JsonError::Empty);
        }
        self.parse_value(start, 0)
    }

    fn parse_value(&mut self, pos: usize, depth: usize) -> Result<NodeId> {
        let pos = self.skip_ws(pos);
        let Some(&byte) = self.bytes.get(pos) else {
            return Err(JsonError::UnexpectedEnd { offset: pos });
        };

        match byte {
            b'{' => self.parse_container(pos, depth + 1, NodeKind::Map),
            b'[' => self.parse_container(pos, depth + 1, NodeKind::Array),
            b'"' => {
                let end = self.scan_string(pos)?;
                Ok(self.leaf(NodeKind::String, pos, end))
            }
            b't' => self.keyword(pos, "true", NodeKind::True),
            b'f' => self.keyword(pos, "false", NodeKind::False),
            b'n' => self.keyword(pos, "null", NodeKind::Null),
            b'-' | b'0'..=b'9' => {
                let mut end = pos + 1;
                while self.bytes.get(end).is_some_and(|b| is_number_byte(*b)) {
                    end += 1;
                }
                Ok(self.leaf(NodeKind::Number, pos, end))
            }
            _ => Err(self.unexpected(pos)),
        }
    }

    fn parse_container(&mut self, start: usize, depth: usize, kind: NodeKind) -> Result<NodeId> {
        if depth > self.max_depth {
            return Err(JsonError::DepthExceeded {
                max: self.max_depth,
            });
        }

        let close = if kind == NodeKind::Map { b'}' } else { b']' };
        let id = self.arena.alloc(Node::leaf(kind, Span::new(start, 1)));
        let mut pos = self.skip_separators(start + 1);

        loop {
            match self.bytes.get(pos) {
                None => return Err(JsonError::UnexpectedEnd { offset: pos }),
                Some(&b) if b == close => {
                    pos += 1;
                    break;
                }
                _ => {}
            }

            let child = if kind == NodeKind::Map {
                let name = self.parse_member_name(pos)?;
                let colon = self.skip_ws(name.end() + 1);
                if self.bytes.get(colon) != Some(&b':') {
                    return Err(JsonError::ExpectedColon { offset: colon });
                }
                let child = self.parse_value(colon + 1, depth)?;
                self.insert_member(id, name, child);
                child
            } else {
                let child = self.parse_value(pos, depth)?;
                if let Some(node) = self.arena.get_mut(id) {
                    node.children.push(child);
                }
                child
            };

            let child_end = self.arena.get(child).map_or(pos, |n| n.span.end());
            pos = self.skip_separators(child_end);
        }

        if let Some(node) = self.arena.get_mut(id) {
            node.span = Span::new(start, pos - start);
            node.text = node.span;
        }
        Ok(id)
    }

    /// Returns the quote-stripped name span.
    fn parse_member_name(&self, pos: usize) -> Result<Span> {
        if self.bytes.get(pos) != Some(&b'"') {
            return Err(JsonError::ExpectedName { offset: pos });
        }
        let end = self.scan_string(pos)?;
        Ok(Span::new(pos, end - pos).inner())
    }

    fn insert_member(&mut self, map: NodeId, name: Span, child: NodeId) {
        let key = name.slice(self.text);
        let text = self.text;
        let replaced = self.arena.get_mut(map).and_then(|node| {
            match node.names.iter().position(|n| n.slice(text) == key) {
                Some(index) => Some(std::mem::replace(&mut node.children[index], child)),
                None => {
                    node.names.push(name);
                    node.children.push(child);
                    None
                }
            }
        });
        if let Some(old) = replaced {
            tracing::debug!(key, "duplicate member replaced");
            self.arena.prune(old);
        }
    }

    /// Offset one past the closing quote.
    fn scan_string(&self, start: usize) -> Result<usize> {
        let mut pos = start + 1;
        while let Some(&byte) = self.bytes.get(pos) {
            pos += 1;
            match byte {
                b'"' => return Ok(pos),
                b'\\' => pos += 1,
                _ => {}
            }
        }
        Err(JsonError::UnterminatedString { offset: start })
    }

    fn keyword(&mut self, pos: usize, literal: &str, kind: NodeKind) -> Result<NodeId> {
        if !self.bytes[pos..].starts_with(literal.as_bytes()) {
            return Err(JsonError::InvalidKeyword { offset: pos });
        }
        Ok(self.leaf(kind, pos, pos + literal.len()))
    }

    fn leaf(&mut self, kind: NodeKind, start: usize, end: usize) -> NodeId {
        self.arena
            .alloc(Node::leaf(kind, Span::new(start, end - start)))
    }

    fn unexpected(&self, pos: usize) -> JsonError {
        let found = self
            .text
            .get(pos..)
            .and_then(|rest| rest.chars().next())
            .unwrap_or('\u{fffd}');
        JsonError::UnexpectedChar { offset: pos, found }
    }

    fn skip_ws(&self, mut pos: usize) -> usize {
        while self.bytes.get(pos).is_some_and(u8::is_ascii_whitespace) {
            pos += 1;
        }
        pos
    }

    fn skip_separators(&self, mut pos: usize) -> usize {
        while self
            .bytes
            .get(pos)
            .is_some_and(|b| b.is_ascii_whitespace() || *b == b',')
        {
            pos += 1;
        }
        pos
    }
}

/// A possibly-absent handle to a tree node.
#[derive(Clone, Copy)]
pub struct NodeRef<'d> {
    doc: &'d Document,
    id: Option<NodeId>,
}

impl<'d> NodeRef<'d> {
    /// An absent handle into `doc`.
    pub fn absent(doc: &'d Document) -> Self {
        Self { doc, id: None }
    }

    fn node(&self) -> Option<&'d Node> {
        self.doc.arena.get(self.id?)
    }

    fn with_id(&self, id: Option<NodeId>) -> Self {
        Self { doc: self.doc, id }
    }

    pub fn document(&self) -> &'d Document {
        self.doc
    }

    pub fn is_present(&self) -> bool {
        self.node().is_some()
    }

    pub fn id(&self) -> Option<NodeId> {
        self.node().and(self.id)
    }

    pub fn kind(&self) -> Option<NodeKind> {
        self.node().map(|n| n.kind)
    }

    pub fn is(&self, kind: NodeKind) -> bool {
        self.kind() == Some(kind)
    }

    /// Source span of the full value.
    pub fn span(&self) -> Option<Span> {
        self.node().map(|n| n.span)
    }

    /// Full source text of the value; strings keep their quotes.
    pub fn raw(&self) -> &'d str {
        self.node()
            .map_or("", |n| n.span.slice(&self.doc.text))
    }

    /// String contents without quotes. Escapes are not decoded.
    pub fn as_str(&self) -> &'d str {
        match self.node() {
            Some(n) if n.kind == NodeKind::String => n.text.slice(&self.doc.text),
            _ => "",
        }
    }

    /// Number as an integer, `None` unless the text is an integer literal.
    pub fn as_integer(&self) -> Option<i64> {
        self.number_text()?.parse().ok()
    }

    /// Number as a float, `None` if the text does not convert.
    pub fn as_float(&self) -> Option<f64> {
        self.number_text()?.parse().ok()
    }

    /// Integer value; fractional numbers truncate, anything else is 0.
    pub fn as_i64(&self) -> i64 {
        self.as_integer()
            .or_else(|| {
                self.as_float()
                    .filter(|f| f.is_finite())
                    .map(|f| f as i64)
            })
            .unwrap_or(0)
    }

    pub fn as_i32(&self) -> i32 {
        self.as_i64().clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }

    pub fn as_f64(&self) -> f64 {
        self.as_float().unwrap_or(0.0)
    }

    pub fn as_f32(&self) -> f32 {
        self.as_f64() as f32
    }

    /// True only for `true` nodes.
    pub fn as_bool(&self) -> bool {
        self.is(NodeKind::True)
    }

    /// Child count for containers, 0 otherwise.
    pub fn len(&self) -> usize {
        self.node().map_or(0, |n| n.children.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Child by position (array elements or map values in order).
    pub fn at(&self, index: usize) -> NodeRef<'d> {
        self.with_id(self.child_ids().get(index).copied())
    }

    /// Map member by name.
    pub fn get(&self, key: &str) -> NodeRef<'d> {
        let Some(node) = self.node().filter(|n| n.kind == NodeKind::Map) else {
            return self.with_id(None);
        };
        let text = &self.doc.text;
        let found = node
            .names
            .iter()
            .position(|name| name.slice(text) == key)
            .map(|index| node.children[index]);
        self.with_id(found)
    }

    /// Follow a compiled query through the tree.
    pub fn path(&self, query: &Query) -> NodeRef<'d> {
        query.steps().iter().fold(*self, |node, step| match step {
            QueryStep::Name(name) => node.get(name),
            QueryStep::Index(index) => node.at(*index),
        })
    }

    /// Child node ids in order; empty for scalars and absent nodes.
    pub fn child_ids(&self) -> &'d [NodeId] {
        self.node().map_or(&[], |n| n.children.as_slice())
    }

    /// Member name spans in order; empty unless this is a map.
    pub fn name_spans(&self) -> &'d [Span] {
        self.node().map_or(&[], |n| n.names.as_slice())
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'d>> + 'd {
        let this = *self;
        this.child_ids()
            .iter()
            .map(move |id| this.with_id(Some(*id)))
    }

    pub fn names(&self) -> impl Iterator<Item = &'d str> + 'd {
        let text = self.doc.text.as_str();
        self.name_spans().iter().map(move |span| span.slice(text))
    }

    /// `(name, value)` pairs of a map.
    pub fn entries(&self) -> impl Iterator<Item = (&'d str, NodeRef<'d>)> + 'd {
        self.names().zip(self.children())
    }

    fn number_text(&self) -> Option<&'d str> {
        let node = self.node().filter(|n| n.kind == NodeKind::Number)?;
        Some(node.span.slice(&self.doc.text))
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            Some(node) => f
                .debug_struct("NodeRef")
                .field("kind", &node.kind)
                .field("raw", &self.raw())
                .finish(),
            None => f.write_str("NodeRef(absent)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scalars() {
        let mut parser = DocumentParser::new();
        assert_eq!(parser.parse("null").unwrap().kind(), Some(NodeKind::Null));
        assert!(parser.parse(" true ").unwrap().as_bool());
        assert!(!parser.parse("false").unwrap().as_bool());
        assert_eq!(parser.parse("-12").unwrap().as_i64(), -12);
        assert_eq!(parser.parse("2.5e1").unwrap().as_f64(), 25.0);

        let root = parser.parse(r#""hello""#).unwrap();
        assert_eq!(root.as_str(), "hello");
        assert_eq!(root.raw(), "\"hello\"");
    }

    #[test]
    fn parses_nested_containers() {
        let mut parser = DocumentParser::new();
        let root = parser
            .parse(r#"{"a": [1, {"b": "c"}], "d": {}, "e": []}"#)
            .unwrap();
        assert_eq!(root.kind(), Some(NodeKind::Map));
        assert_eq!(root.len(), 3);
        assert_eq!(root.names().collect::<Vec<_>>(), ["a", "d", "e"]);
        assert_eq!(root.get("a").len(), 2);
        assert_eq!(root.get("a").at(1).get("b").as_str(), "c");
        assert_eq!(root.get("a").raw(), r#"[1, {"b": "c"}]"#);
        assert!(root.get("d").is(NodeKind::Map));
        assert!(root.get("d").is_empty());
        assert!(root.get("e").is(NodeKind::Array));
        assert_eq!(parser.document().node_count(), 7);
    }

    #[test]
    fn map_preserves_insertion_order() {
        let mut parser = DocumentParser::new();
        let root = parser.parse(r#"{"z":1,"a":2,"m":3}"#).unwrap();
        let pairs: Vec<_> = root.entries().map(|(k, v)| (k, v.as_i64())).collect();
        assert_eq!(pairs, [("z", 1), ("a", 2), ("m", 3)]);
        assert_eq!(root.at(1).as_i64(), 2);
    }

    #[test]
    fn duplicate_key_replaces_in_place() {
        let mut parser = DocumentParser::new();
        let root = parser.parse(r#"{"a":[1,2],"b":2,"a":3}"#).unwrap();
        assert_eq!(root.names().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(root.get("a").as_i64(), 3);
        // map + a + b; the replaced [1,2] subtree was released
        assert_eq!(parser.document().node_count(), 3);
    }

    #[test]
    fn malformed_number_parses_but_converts_to_zero() {
        let mut parser = DocumentParser::new();
        let root = parser.parse("[1-2-3, 7.9]").unwrap();
        assert_eq!(root.at(0).kind(), Some(NodeKind::Number));
        assert_eq!(root.at(0).raw(), "1-2-3");
        assert_eq!(root.at(0).as_i64(), 0);
        assert_eq!(root.at(0).as_f64(), 0.0);
        assert_eq!(root.at(1).as_i64(), 7);
        assert_eq!(root.at(1).as_integer(), None);
    }

    #[test]
    fn getters_require_matching_kind() {
        let mut parser = DocumentParser::new();
        let root = parser.parse(r#"{"s": "12", "t": true, "n": 5}"#).unwrap();
        assert_eq!(root.get("s").as_i64(), 0);
        assert_eq!(root.get("s").as_f32(), 0.0);
        assert!(!root.get("n").as_bool());
        assert_eq!(root.get("t").as_str(), "");
        assert_eq!(root.get("n").as_i32(), 5);
    }

    #[test]
    fn absent_node_is_null_safe() {
        let mut parser = DocumentParser::new();
        let root = parser.parse("[1]").unwrap();
        let absent = root.at(9);
        assert!(!absent.is_present());
        assert_eq!(absent.kind(), None);
        assert_eq!(absent.id(), None);
        assert_eq!(absent.span(), None);
        assert_eq!(absent.as_i64(), 0);
        assert_eq!(absent.as_i32(), 0);
        assert_eq!(absent.as_f64(), 0.0);
        assert_eq!(absent.as_f32(), 0.0);
        assert!(!absent.as_bool());
        assert_eq!(absent.as_str(), "");
        assert_eq!(absent.raw(), "");
        assert_eq!(absent.len(), 0);
        assert!(absent.child_ids().is_empty());
        assert!(absent.name_spans().is_empty());
        assert_eq!(absent.children().count(), 0);
        assert_eq!(absent.names().count(), 0);
        assert!(!absent.at(0).get("x").at(2).is_present());
        assert_eq!(format!("{absent:?}"), "NodeRef(absent)");
    }

    #[test]
    fn key_lookup_on_array_is_absent() {
        let mut parser = DocumentParser::new();
        let root = parser.parse("[1, 2]").unwrap();
        assert!(!root.get("0").is_present());
        assert!(!root.at(2).is_present());
    }

    #[test]
    fn path_follows_query_steps() {
        let mut parser = DocumentParser::new();
        let root = parser.parse(r#"{"a":{"b":[10,20,30]}}"#).unwrap();
        let query = Query::parse("a.b[1]").unwrap();
        assert_eq!(root.path(&query).as_i64(), 20);
        assert!(!root.path(&Query::parse("a.c[0]").unwrap()).is_present());
    }

    #[test]
    fn invalid_keyword_fails() {
        let mut parser = DocumentParser::new();
        assert_eq!(
            parser.parse("[tru]").unwrap_err(),
            JsonError::InvalidKeyword { offset: 1 }
        );
        assert!(parser.document().is_empty());
    }

    #[test]
    fn structural_errors() {
        let mut parser = DocumentParser::new();
        assert_eq!(parser.parse("   ").unwrap_err(), JsonError::Empty);
        assert_eq!(
            parser.parse("{\"a\" 1}").unwrap_err(),
            JsonError::ExpectedColon { offset: 5 }
        );
        assert_eq!(
            parser.parse("{1: 2}").unwrap_err(),
            JsonError::ExpectedName { offset: 1 }
        );
        assert_eq!(
            parser.parse("[1, 2").unwrap_err(),
            JsonError::UnexpectedEnd { offset: 5 }
        );
        assert_eq!(
            parser.parse("\"abc").unwrap_err(),
            JsonError::UnterminatedString { offset: 0 }
        );
        assert_eq!(
            parser.parse("[1, @]").unwrap_err(),
            JsonError::UnexpectedChar {
                offset: 4,
                found: '@'
            }
        );
    }

    #[test]
    fn failed_parse_leaves_parser_cleared() {
        let mut parser = DocumentParser::new();
        parser.parse(r#"{"keep": 1}"#).unwrap();
        assert!(parser.parse(r#"{"broken": [1, 2"#).is_err());
        assert!(parser.root().kind().is_none());
        assert_eq!(parser.document().node_count(), 0);
        assert_eq!(parser.document().text(), "");
    }

    #[test]
    fn depth_cap() {
        let mut parser = DocumentParser::with_config(ParserConfig { max_depth: 2 });
        assert!(parser.parse("[[1]]").is_ok());
        assert_eq!(
            parser.parse("[[[1]]]").unwrap_err(),
            JsonError::DepthExceeded { max: 2 }
        );

        let deep = "[".repeat(10_000);
        let mut parser = DocumentParser::new();
        assert_eq!(
            parser.parse(&deep).unwrap_err(),
            JsonError::DepthExceeded {
                max: DEFAULT_MAX_DEPTH
            }
        );
    }

    #[test]
    fn clear_is_idempotent_and_releases_nodes() {
        let mut parser = DocumentParser::new();
        parser.clear();
        parser.parse(r#"{"a":[1,2,{"b":null}]}"#).unwrap();
        assert_eq!(parser.document().node_count(), 6);
        parser.clear();
        assert_eq!(parser.document().node_count(), 0);
        assert!(parser.document().is_empty());
        parser.clear();
        assert!(!parser.root().is_present());
    }

    #[test]
    fn reparse_reuses_arena_slots() {
        let mut parser = DocumentParser::new();
        parser.parse("[1,2,3,4]").unwrap();
        let slots = parser.document().arena().slots();
        parser.parse("[5,6]").unwrap();
        assert_eq!(parser.document().arena().slots(), slots);
        assert_eq!(parser.document().node_count(), 3);
        assert_eq!(parser.root().at(1).as_i64(), 6);
    }

    #[test]
    fn injected_arena_and_document_handoff() {
        let arena = NodeArena::with_capacity(64);
        let mut parser = DocumentParser::with_arena(arena, ParserConfig::default());
        parser.parse(r#"{"cmd":"go"}"#).unwrap();

        let doc = parser.take_document();
        assert!(parser.document().is_empty());
        assert_eq!(doc.root().get("cmd").as_str(), "go");

        parser.recycle(doc);
        assert!(parser.document().is_empty());
        assert_eq!(parser.document().node_count(), 0);

        let arena = parser.take_document().into_arena();
        assert_eq!(arena.live(), 0);
    }

    #[test]
    fn trailing_text_is_ignored() {
        let mut parser = DocumentParser::new();
        let root = parser.parse("[1] garbage").unwrap();
        assert_eq!(root.raw(), "[1]");
    }

    #[test]
    fn escaped_quote_stays_inside_string() {
        let mut parser = DocumentParser::new();
        let root = parser.parse(r#"{"k": "a\"b"}"#).unwrap();
        assert_eq!(root.get("k").as_str(), r#"a\"b"#);
    }
}
