//! Render a parsed tree back to text.
//!
//! Scalars are copied from their source span, so strings keep their
//! original escapes and numbers their original spelling.

use crate::builder::JsonBuilder;
use crate::tree::{NodeKind, NodeRef};

/// Single-line rendering with no insignificant whitespace. Absent nodes
/// render as `""`.
pub fn to_compact_string(node: NodeRef<'_>) -> String {
    if !node.is_present() {
        return String::new();
    }
    let mut builder = JsonBuilder::new();
    write_compact(&mut builder, node);
    builder.finish().unwrap_or_default()
}

/// Multi-line rendering indented by `indent` spaces per level.
pub fn to_pretty_string(node: NodeRef<'_>, indent: usize) -> String {
    let mut out = String::new();
    if node.is_present() {
        write_pretty(&mut out, node, indent, 0);
    }
    out
}

fn write_compact(b: &mut JsonBuilder, node: NodeRef<'_>) {
    let last = node.len().saturating_sub(1);
    match node.kind() {
        Some(NodeKind::Map) => {
            b.push_object();
            for (i, (name, child)) in node.entries().enumerate() {
                b.key_raw(name);
                write_compact(b, child);
                if i < last {
                    b.comma();
                }
            }
            let _ = b.pop_object();
        }
        Some(NodeKind::Array) => {
            b.push_array();
            for (i, child) in node.children().enumerate() {
                write_compact(b, child);
                if i < last {
                    b.comma();
                }
            }
            let _ = b.pop_array();
        }
        Some(_) => {
            b.raw(node.raw());
        }
        None => {}
    }
}

fn write_pretty(out: &mut String, node: NodeRef<'_>, indent: usize, level: usize) {
    let (open, close) = match node.kind() {
        Some(NodeKind::Map) => ('{', '}'),
        Some(NodeKind::Array) => ('[', ']'),
        Some(_) => {
            out.push_str(node.raw());
            return;
        }
        None => return,
    };

    out.push(open);
    if node.is_empty() {
        out.push(close);
        return;
    }

    let is_map = open == '{';
    let mut names = node.names();
    for (i, child) in node.children().enumerate() {
        if i > 0 {
            out.push(',');
        }
        newline(out, indent * (level + 1));
        if is_map {
            if let Some(name) = names.next() {
                out.push('"');
                out.push_str(name);
                out.push_str("\": ");
            }
        }
        write_pretty(out, child, indent, level + 1);
    }
    newline(out, indent * level);
    out.push(close);
}

fn newline(out: &mut String, width: usize) {
    out.push('\n');
    out.extend(std::iter::repeat_n(' ', width));
}
