//! Span-based JSON parsing and header-plus-frames message assembly.
//!
//! jsonframe reads JSON without copying it: tokens, structural entries and
//! tree nodes all point back into the source text. On top of that sits a
//! message layer that groups a JSON header event with the binary or text
//! frames it announces.
//!
//! # Crate Structure
//!
//! - [`json`] — Tokenizer, streaming parser, path resolver, document tree and builder
//! - [`message`] — Message assembler, outgoing messages and the event log codec
//!
//! ```
//! use jsonframe::json::DocumentParser;
//! use jsonframe::message::{Frame, MessageAssembler};
//!
//! let mut parser = DocumentParser::new();
//! let root = parser.parse(r#"{"menu":{"items":["open","close"]}}"#).unwrap();
//! assert_eq!(root.get("menu").get("items").at(1).as_str(), "close");
//!
//! let mut asm = MessageAssembler::new();
//! asm.collect(Frame::text(r#"{"cmd":"ping","request":1,"frames":0}"#)).unwrap();
//! assert_eq!(asm.grab_message().unwrap().cmd(), "ping");
//! ```

/// Re-export JSON engine types.
pub mod json {
    pub use jsonframe_json::*;
}

/// Re-export message types.
pub mod message {
    pub use jsonframe_message::*;
}
