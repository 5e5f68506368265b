//! Append-only JSON writer.
//!
//! Separators are explicit: every `map`/`value` call takes a `comma` flag
//! and the caller decides where commas go. Open objects and arrays are
//! tracked innermost-first, so a document with a missing or crossed close is
//! never handed out.
//!
//! ```
//! use jsonframe_json::JsonBuilder;
//!
//! let mut b = JsonBuilder::new();
//! b.push_object();
//! b.map("cmd", "reply", true);
//! b.map("request", 7, true);
//! b.key("pos").push_array();
//! b.value(1.5, true).value(2, false);
//! b.pop_array().unwrap();
//! b.pop_object().unwrap();
//! assert_eq!(b.json(), Some(r#"{"cmd":"reply","request":7,"pos":[1.5,2]}"#));
//! ```

use std::fmt::{self, Write as _};

use crate::error::{JsonError, Result};

/// A value the builder can write as a JSON scalar.
pub trait JsonScalar {
    fn write_json(&self, out: &mut String);
}

macro_rules! int_scalar {
    ($($ty:ty),*) => {
        $(impl JsonScalar for $ty {
            fn write_json(&self, out: &mut String) {
                let _ = write!(out, "{}", self);
            }
        })*
    };
}

int_scalar!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl JsonScalar for f64 {
    fn write_json(&self, out: &mut String) {
        if self.is_finite() {
            let _ = write!(out, "{}", self);
        } else {
            out.push_str("null");
        }
    }
}

impl JsonScalar for f32 {
    fn write_json(&self, out: &mut String) {
        if self.is_finite() {
            let _ = write!(out, "{}", self);
        } else {
            out.push_str("null");
        }
    }
}

impl JsonScalar for bool {
    fn write_json(&self, out: &mut String) {
        out.push_str(if *self { "true" } else { "false" });
    }
}

impl JsonScalar for str {
    fn write_json(&self, out: &mut String) {
        write_quoted(out, self);
    }
}

impl JsonScalar for String {
    fn write_json(&self, out: &mut String) {
        write_quoted(out, self);
    }
}

impl<T: JsonScalar> JsonScalar for Option<T> {
    fn write_json(&self, out: &mut String) {
        match self {
            Some(value) => value.write_json(out),
            None => out.push_str("null"),
        }
    }
}

impl<T: JsonScalar + ?Sized> JsonScalar for &T {
    fn write_json(&self, out: &mut String) {
        (**self).write_json(out);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

impl Container {
    fn as_str(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
        }
    }
}

/// Incremental JSON text builder.
#[derive(Debug, Clone, Default)]
pub struct JsonBuilder {
    out: String,
    open: Vec<Container>,
}

impl JsonBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start writing into an existing buffer; its contents are discarded.
    pub fn with_buffer(mut buffer: String) -> Self {
        buffer.clear();
        Self {
            out: buffer,
            open: Vec::new(),
        }
    }

    /// Discard everything written so far.
    pub fn clear(&mut self) {
        self.out.clear();
        self.open.clear();
    }

    /// Objects plus arrays still open.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    pub fn is_balanced(&self) -> bool {
        self.depth() == 0
    }

    /// `{`
    pub fn push_object(&mut self) -> &mut Self {
        self.out.push('{');
        self.open.push(Container::Object);
        self
    }

    /// `}`. Fails unless the innermost open container is an object.
    pub fn pop_object(&mut self) -> Result<&mut Self> {
        self.close(Container::Object)?;
        self.out.push('}');
        Ok(self)
    }

    /// `[`
    pub fn push_array(&mut self) -> &mut Self {
        self.out.push('[');
        self.open.push(Container::Array);
        self
    }

    /// `]`. Fails unless the innermost open container is an array.
    pub fn pop_array(&mut self) -> Result<&mut Self> {
        self.close(Container::Array)?;
        self.out.push(']');
        Ok(self)
    }

    fn close(&mut self, kind: Container) -> Result<()> {
        match self.open.last() {
            Some(&innermost) if innermost == kind => {
                self.open.pop();
                Ok(())
            }
            innermost => {
                tracing::debug!(
                    closing = kind.as_str(),
                    innermost = innermost.map(|c| c.as_str()),
                    "mismatched builder pop"
                );
                Err(JsonError::Unbalanced(kind.as_str()))
            }
        }
    }

    /// `"name":`
    pub fn key(&mut self, name: &str) -> &mut Self {
        write_quoted(&mut self.out, name);
        self.out.push(':');
        self
    }

    /// `"name":` where `name` is already escaped JSON string content.
    pub fn key_raw(&mut self, name: &str) -> &mut Self {
        self.out.push('"');
        self.out.push_str(name);
        self.out.push_str("\":");
        self
    }

    /// `"name":value` with an optional trailing comma.
    pub fn map<V: JsonScalar>(&mut self, name: &str, value: V, comma: bool) -> &mut Self {
        self.key(name);
        self.value(value, comma)
    }

    /// `"name":"<formatted>"` with an optional trailing comma.
    pub fn map_fmt(&mut self, name: &str, args: fmt::Arguments<'_>, comma: bool) -> &mut Self {
        self.key(name);
        self.value_fmt(args, comma)
    }

    /// A scalar value with an optional trailing comma.
    pub fn value<V: JsonScalar>(&mut self, value: V, comma: bool) -> &mut Self {
        value.write_json(&mut self.out);
        self.comma_if(comma)
    }

    /// A formatted value written as a JSON string.
    pub fn value_fmt(&mut self, args: fmt::Arguments<'_>, comma: bool) -> &mut Self {
        match args.as_str() {
            Some(text) => write_quoted(&mut self.out, text),
            None => write_quoted(&mut self.out, &args.to_string()),
        }
        self.comma_if(comma)
    }

    /// `,`
    pub fn comma(&mut self) -> &mut Self {
        self.out.push(',');
        self
    }

    /// Append pre-encoded JSON text verbatim.
    pub fn raw(&mut self, text: &str) -> &mut Self {
        self.out.push_str(text);
        self
    }

    /// The text written so far, if every push has been popped.
    pub fn json(&self) -> Option<&str> {
        self.is_balanced().then_some(self.out.as_str())
    }

    /// Consume the builder, returning the text if balanced.
    pub fn finish(self) -> Option<String> {
        if !self.is_balanced() {
            tracing::debug!(
                open = self.open.len(),
                "builder finished unbalanced"
            );
            return None;
        }
        Some(self.out)
    }

    fn comma_if(&mut self, comma: bool) -> &mut Self {
        if comma {
            self.out.push(',');
        }
        self
    }
}

fn write_quoted(out: &mut String, text: &str) {
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
