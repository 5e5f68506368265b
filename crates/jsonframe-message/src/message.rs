use jsonframe_json::{Document, NodeRef};

use crate::error::HeaderError;
use crate::frame::Frame;
use crate::header::Header;

/// A fully assembled header plus its frames.
///
/// Owns its header document, so `args` stays readable for as long as the
/// message lives. Hand it back through
/// [`MessageAssembler::release`](crate::MessageAssembler::release) to let the
/// assembler reuse the header storage.
#[derive(Debug)]
pub struct Message {
    pub(crate) cmd: String,
    pub(crate) request: i64,
    pub(crate) declared_frames: usize,
    pub(crate) frames: Vec<Frame>,
    pub(crate) dropped_frames: usize,
    pub(crate) header: Document,
    pub(crate) header_error: Option<HeaderError>,
}

impl Message {
    pub(crate) fn accepted(header: Header, doc: Document, max_frames: usize) -> Self {
        Self {
            cmd: header.cmd,
            request: header.request,
            declared_frames: header.frames,
            frames: Vec::with_capacity(header.frames.min(max_frames)),
            dropped_frames: 0,
            header: doc,
            header_error: None,
        }
    }

    pub(crate) fn rejected(error: HeaderError, doc: Document) -> Self {
        Self {
            cmd: String::new(),
            request: 0,
            declared_frames: 0,
            frames: Vec::new(),
            dropped_frames: 0,
            header: doc,
            header_error: Some(error),
        }
    }

    /// Command name; empty when the header was rejected.
    pub fn cmd(&self) -> &str {
        &self.cmd
    }

    /// Request id; 0 when the header was rejected.
    pub fn request(&self) -> i64 {
        self.request
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Frame count the header asked for.
    pub fn declared_frames(&self) -> usize {
        self.declared_frames
    }

    /// Frames consumed past the configured maximum and discarded.
    pub fn dropped_frames(&self) -> usize {
        self.dropped_frames
    }

    /// Header root. Absent if the header text did not parse.
    pub fn header(&self) -> NodeRef<'_> {
        self.header.root()
    }

    /// The header's `args` member, absent if missing.
    pub fn args(&self) -> NodeRef<'_> {
        self.header().get("args")
    }

    pub fn header_text(&self) -> &str {
        self.header.text()
    }

    pub fn header_error(&self) -> Option<HeaderError> {
        self.header_error
    }

    pub fn is_valid(&self) -> bool {
        self.header_error.is_none()
    }

    /// Take the frames, dropping the header.
    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}
