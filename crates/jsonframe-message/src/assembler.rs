//! Header-then-frames state machine.
//!
//! ```
//! use jsonframe_message::{CollectOutcome, Frame, MessageAssembler};
//!
//! let mut asm = MessageAssembler::new();
//! asm.collect(Frame::text(r#"{"cmd":"ping","request":7,"frames":1}"#)).unwrap();
//! assert!(!asm.is_message_ready());
//! let outcome = asm.collect(Frame::binary(vec![1u8, 2])).unwrap();
//! assert_eq!(outcome, CollectOutcome::MessageReady);
//!
//! let message = asm.grab_message().unwrap();
//! assert_eq!(message.cmd(), "ping");
//! assert_eq!(message.frames().len(), 1);
//! asm.release(message);
//! ```

use jsonframe_json::{DocumentParser, ParserConfig, DEFAULT_MAX_DEPTH};

use crate::error::{AssemblerError, HeaderError, Result};
use crate::frame::{Frame, FrameKind};
use crate::header::Header;
use crate::message::Message;

/// Default cap on frames stored per message.
pub const DEFAULT_MAX_FRAMES: usize = 16;

/// Default cap on header text length: 1 MiB.
pub const DEFAULT_MAX_HEADER_LEN: usize = 1024 * 1024;

/// Assembler limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblerConfig {
    /// Frames stored per message. Later frames are consumed and dropped.
    pub max_frames: usize,
    /// Nesting cap for header documents.
    pub max_depth: usize,
    /// Longest header text accepted, in bytes.
    pub max_header_len: usize,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            max_frames: DEFAULT_MAX_FRAMES,
            max_depth: DEFAULT_MAX_DEPTH,
            max_header_len: DEFAULT_MAX_HEADER_LEN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerState {
    AwaitingHeader,
    CollectingFrames { frames_left: usize },
}

/// What a single [`MessageAssembler::collect`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectOutcome {
    /// Empty header text, or a binary event while awaiting a header.
    Ignored,
    /// Header parsed; frames are expected next.
    HeaderAccepted,
    /// Header failed validation. The message completes immediately with zero
    /// frames and is ready to grab.
    HeaderRejected(HeaderError),
    FrameAppended { frames_left: usize },
    /// The message is complete and ready to grab.
    MessageReady,
}

/// Assembles one message at a time out of transport events.
#[derive(Debug)]
pub struct MessageAssembler {
    config: AssemblerConfig,
    state: AssemblerState,
    parser: DocumentParser,
    current: Option<Message>,
    ready: Option<Message>,
}

impl Default for MessageAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageAssembler {
    pub fn new() -> Self {
        Self::with_config(AssemblerConfig::default())
    }

    pub fn with_config(config: AssemblerConfig) -> Self {
        Self {
            config,
            state: AssemblerState::AwaitingHeader,
            parser: DocumentParser::with_config(ParserConfig {
                max_depth: config.max_depth,
            }),
            current: None,
            ready: None,
        }
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    pub fn state(&self) -> AssemblerState {
        self.state
    }

    /// Feed one transport event.
    ///
    /// Returns `Err(FrameOverflow)` for a frame beyond `max_frames`; the
    /// frame still counts toward the header's declared total, so the stream
    /// stays in step and the message still completes. When the dropped frame
    /// was the last one, the error has `completed: true` and the message is
    /// waiting in [`grab_message`](Self::grab_message).
    pub fn collect(&mut self, event: Frame) -> Result<CollectOutcome> {
        match self.state {
            AssemblerState::AwaitingHeader => match event.kind {
                FrameKind::Binary => {
                    tracing::debug!(len = event.len(), "binary event without header ignored");
                    Ok(CollectOutcome::Ignored)
                }
                FrameKind::Text if event.is_empty() => {
                    tracing::debug!("empty header ignored");
                    Ok(CollectOutcome::Ignored)
                }
                FrameKind::Text => Ok(self.begin(&event)),
            },
            AssemblerState::CollectingFrames { frames_left } => self.append(event, frames_left),
        }
    }

    pub fn is_message_ready(&self) -> bool {
        self.ready.is_some()
    }

    /// Take the ready message, if any.
    pub fn grab_message(&mut self) -> Option<Message> {
        self.ready.take()
    }

    /// Discard the ready message, if any. The in-flight message is kept.
    pub fn clear_message(&mut self) {
        if let Some(message) = self.ready.take() {
            self.release(message);
        }
    }

    /// Return a grabbed message so its header storage can be reused.
    pub fn release(&mut self, message: Message) {
        tracing::trace!(
            cmd = %message.cmd,
            request = message.request,
            frames = message.frames.len(),
            "message released"
        );
        self.parser.recycle(message.header);
    }

    /// Drop the in-flight and ready messages and wait for a new header.
    pub fn reset(&mut self) {
        if let Some(message) = self.current.take() {
            tracing::debug!(
                cmd = %message.cmd,
                request = message.request,
                "in-flight message abandoned"
            );
            self.release(message);
        }
        self.clear_message();
        self.state = AssemblerState::AwaitingHeader;
    }

    fn begin(&mut self, event: &Frame) -> CollectOutcome {
        if let Some(stale) = self.ready.take() {
            tracing::warn!(
                cmd = %stale.cmd,
                request = stale.request,
                "ready message was never grabbed; replacing it"
            );
            self.release(stale);
        }

        let message = match self.parse_header(event) {
            Ok(header) => {
                tracing::debug!(
                    cmd = %header.cmd,
                    request = header.request,
                    frames = header.frames,
                    "header accepted"
                );
                Message::accepted(header, self.parser.take_document(), self.config.max_frames)
            }
            Err(error) => {
                tracing::warn!(code = error.code(), %error, "header rejected");
                Message::rejected(error, self.parser.take_document())
            }
        };

        let frames = message.declared_frames;
        let rejected = message.header_error;
        self.current = Some(message);

        if frames == 0 {
            self.complete();
            return match rejected {
                Some(error) => CollectOutcome::HeaderRejected(error),
                None => CollectOutcome::MessageReady,
            };
        }
        self.state = AssemblerState::CollectingFrames {
            frames_left: frames,
        };
        CollectOutcome::HeaderAccepted
    }

    fn parse_header(&mut self, event: &Frame) -> std::result::Result<Header, HeaderError> {
        let len = event.len();
        if len > self.config.max_header_len {
            self.parser.clear();
            return Err(HeaderError::TooLong {
                len,
                max: self.config.max_header_len,
            });
        }
        let Some(text) = event.as_text() else {
            self.parser.clear();
            return Err(HeaderError::Unparsable);
        };
        if text.trim().is_empty() {
            self.parser.clear();
            return Err(HeaderError::Empty);
        }

        let root = self
            .parser
            .parse(text)
            .map_err(|_| HeaderError::Unparsable)?;
        Header::from_root(root)
    }

    fn append(&mut self, event: Frame, frames_left: usize) -> Result<CollectOutcome> {
        let Some(message) = self.current.as_mut() else {
            self.state = AssemblerState::AwaitingHeader;
            return Ok(CollectOutcome::Ignored);
        };

        let frames_left = frames_left.saturating_sub(1);
        let overflow = message.frames.len() >= self.config.max_frames;
        let request = message.request;
        if overflow {
            message.dropped_frames += 1;
        } else {
            message.frames.push(event);
        }

        if frames_left == 0 {
            self.complete();
        } else {
            self.state = AssemblerState::CollectingFrames { frames_left };
        }

        if overflow {
            tracing::warn!(request, max = self.config.max_frames, "frame dropped");
            return Err(AssemblerError::FrameOverflow {
                request,
                max: self.config.max_frames,
                completed: frames_left == 0,
            });
        }

        Ok(if frames_left == 0 {
            CollectOutcome::MessageReady
        } else {
            CollectOutcome::FrameAppended { frames_left }
        })
    }

    fn complete(&mut self) {
        self.state = AssemblerState::AwaitingHeader;
        if let Some(message) = self.current.take() {
            tracing::debug!(
                cmd = %message.cmd,
                request = message.request,
                frames = message.frames.len(),
                "message ready"
            );
            self.ready = Some(message);
        }
    }
}
