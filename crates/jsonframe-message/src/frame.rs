use bytes::Bytes;

/// Whether a transport event carried text or opaque bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    Text,
    Binary,
}

impl FrameKind {
    /// Event-log wire code.
    pub fn code(self) -> u16 {
        match self {
            Self::Text => 1,
            Self::Binary => 2,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(Self::Text),
            2 => Some(Self::Binary),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Binary => "binary",
        }
    }
}

/// One transport event, and once collected, one message frame.
///
/// Cloning shares the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub kind: FrameKind,
    pub payload: Bytes,
}

impl Frame {
    pub fn new(kind: FrameKind, payload: impl Into<Bytes>) -> Self {
        Self {
            kind,
            payload: payload.into(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(FrameKind::Text, text.into())
    }

    pub fn binary(payload: impl Into<Bytes>) -> Self {
        Self::new(FrameKind::Binary, payload)
    }

    pub fn is_text(&self) -> bool {
        self.kind == FrameKind::Text
    }

    /// Payload as UTF-8, for text frames only.
    pub fn as_text(&self) -> Option<&str> {
        if !self.is_text() {
            return None;
        }
        std::str::from_utf8(&self.payload).ok()
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_and_binary() {
        let text = Frame::text("hi");
        assert!(text.is_text());
        assert_eq!(text.as_text(), Some("hi"));
        assert_eq!(text.len(), 2);

        let bin = Frame::binary(vec![1u8, 2]);
        assert!(!bin.is_text());
        assert_eq!(bin.as_text(), None);
        assert_eq!(bin.payload.as_ref(), &[1, 2]);
    }

    #[test]
    fn kind_codes() {
        assert_eq!(FrameKind::from_code(FrameKind::Text.code()), Some(FrameKind::Text));
        assert_eq!(FrameKind::from_code(FrameKind::Binary.code()), Some(FrameKind::Binary));
        assert_eq!(FrameKind::from_code(0), None);
        assert_eq!(FrameKind::from_code(3), None);
    }

    #[test]
    fn invalid_utf8_text_has_no_str() {
        let frame = Frame::new(FrameKind::Text, vec![0xff, 0xfe]);
        assert_eq!(frame.as_text(), None);
    }
}
