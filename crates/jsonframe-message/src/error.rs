use jsonframe_json::JsonError;

/// Why a header event was not accepted.
///
/// Each variant has a stable negative [`code`](HeaderError::code) suitable
/// for logs and wire replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HeaderError {
    #[error("header is empty")]
    Empty,

    /// Not parseable as JSON (or not UTF-8).
    #[error("header is not valid JSON")]
    Unparsable,

    #[error("header is not a map")]
    NotAMap,

    #[error("header has no cmd")]
    MissingCmd,

    #[error("header cmd is not a string")]
    CmdNotString,

    #[error("header has no request")]
    MissingRequest,

    #[error("header request is not a number")]
    RequestNotInteger,

    #[error("header has no frames")]
    MissingFrames,

    #[error("header frames is not a number")]
    FramesNotInteger,

    #[error("header frames is negative")]
    FramesNegative,

    #[error("header too long ({len} bytes, max {max})")]
    TooLong { len: usize, max: usize },
}

impl HeaderError {
    pub fn code(&self) -> i32 {
        match self {
            Self::Empty => -1,
            Self::Unparsable => -2,
            Self::NotAMap => -3,
            Self::MissingCmd => -4,
            Self::CmdNotString => -5,
            Self::MissingRequest => -6,
            Self::RequestNotInteger => -7,
            Self::MissingFrames => -8,
            Self::FramesNotInteger => -9,
            Self::FramesNegative => -10,
            Self::TooLong { .. } => -11,
        }
    }
}

/// Errors reported while assembling or building messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssemblerError {
    /// A frame arrived after the message already held the maximum number
    /// of frames. The frame was consumed and dropped. `completed` is set
    /// when it was the last declared frame and the message is now ready.
    #[error("frame overflow: request {request} already holds {max} frames")]
    FrameOverflow {
        request: i64,
        max: usize,
        completed: bool,
    },

    /// Writing outgoing `args` failed.
    #[error("args: {0}")]
    Args(#[from] JsonError),

    /// The `args` writer left objects or arrays open.
    #[error("args left unbalanced")]
    UnbalancedArgs,
}

pub type Result<T> = std::result::Result<T, AssemblerError>;

/// Errors that can occur while reading or writing an event log.
#[derive(Debug, thiserror::Error)]
pub enum EventLogError {
    /// The record header does not start with "JF".
    #[error("invalid event magic (expected 0x4a46 \"JF\")")]
    InvalidMagic,

    #[error("unknown event kind {0}")]
    UnknownKind(u16),

    #[error("event payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("event log I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended partway through a record.
    #[error("event log truncated (incomplete record)")]
    ConnectionClosed,
}

pub type EventLogResult<T> = std::result::Result<T, EventLogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_codes_are_distinct() {
        let all = [
            HeaderError::Empty,
            HeaderError::Unparsable,
            HeaderError::NotAMap,
            HeaderError::MissingCmd,
            HeaderError::CmdNotString,
            HeaderError::MissingRequest,
            HeaderError::RequestNotInteger,
            HeaderError::MissingFrames,
            HeaderError::FramesNotInteger,
            HeaderError::FramesNegative,
            HeaderError::TooLong { len: 2, max: 1 },
        ];
        let mut codes: Vec<i32> = all.iter().map(HeaderError::code).collect();
        assert!(codes.iter().all(|c| *c < 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn messages_render() {
        assert_eq!(
            HeaderError::TooLong { len: 9, max: 4 }.to_string(),
            "header too long (9 bytes, max 4)"
        );
        assert_eq!(
            AssemblerError::FrameOverflow {
                request: 3,
                max: 16,
                completed: false,
            }
            .to_string(),
            "frame overflow: request 3 already holds 16 frames"
        );
    }
}
