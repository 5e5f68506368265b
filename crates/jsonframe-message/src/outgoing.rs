use jsonframe_json::JsonBuilder;

use crate::error::{AssemblerError, Result};
use crate::frame::Frame;

/// A message being prepared for sending: a header plus payload frames.
///
/// ```
/// use jsonframe_message::{Frame, OutgoingMessage};
///
/// let events = OutgoingMessage::new("floatsum", 3)
///     .args(|b| {
///         b.push_object().map("scale", 2, false);
///         b.pop_object()?;
///         Ok(())
///     })
///     .unwrap()
///     .frame(Frame::binary(vec![0u8; 8]))
///     .into_frames();
///
/// assert_eq!(
///     events[0].as_text(),
///     Some(r#"{"cmd":"floatsum","request":3,"frames":1,"args":{"scale":2}}"#)
/// );
/// assert_eq!(events.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    cmd: String,
    request: i64,
    args: Option<String>,
    frames: Vec<Frame>,
}

impl OutgoingMessage {
    pub fn new(cmd: impl Into<String>, request: i64) -> Self {
        Self {
            cmd: cmd.into(),
            request,
            args: None,
            frames: Vec::new(),
        }
    }

    /// Write `args` with a builder. The writer must emit exactly one
    /// balanced value.
    pub fn args<F>(mut self, write: F) -> Result<Self>
    where
        F: FnOnce(&mut JsonBuilder) -> jsonframe_json::Result<()>,
    {
        let mut builder = JsonBuilder::new();
        write(&mut builder)?;
        let text = builder.finish().ok_or(AssemblerError::UnbalancedArgs)?;
        self.args = Some(text);
        Ok(self)
    }

    /// Use pre-encoded JSON as `args`.
    pub fn args_json(mut self, json: impl Into<String>) -> Self {
        self.args = Some(json.into());
        self
    }

    pub fn frame(mut self, frame: Frame) -> Self {
        self.frames.push(frame);
        self
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Header text, with `frames` set to the attached frame count.
    pub fn header_json(&self) -> String {
        let mut b = JsonBuilder::new();
        b.push_object();
        b.map("cmd", self.cmd.as_str(), true);
        b.map("request", self.request, true);
        b.map("frames", self.frames.len(), self.args.is_some());
        if let Some(args) = &self.args {
            b.key("args").raw(args);
        }
        let _ = b.pop_object();
        b.finish().unwrap_or_default()
    }

    /// Header event followed by the payload frames, in send order.
    pub fn into_frames(self) -> Vec<Frame> {
        let mut events = Vec::with_capacity(self.frames.len() + 1);
        events.push(Frame::text(self.header_json()));
        events.extend(self.frames);
        events
    }
}

/// Zero-frame reply header: `{"frames":0,"request":N,<extra>"cmd":"..."}`.
///
/// `extra` writes additional members, each followed by a comma.
///
/// ```
/// use jsonframe_message::reply_header;
///
/// let text = reply_header(7, "reply", |b| {
///     b.map("sum", 4.5, true);
/// });
/// assert_eq!(text, r#"{"frames":0,"request":7,"sum":4.5,"cmd":"reply"}"#);
/// ```
pub fn reply_header<F>(request: i64, cmd: &str, extra: F) -> String
where
    F: FnOnce(&mut JsonBuilder),
{
    let mut b = JsonBuilder::new();
    b.push_object();
    b.map("frames", 0, true);
    b.map("request", request, true);
    extra(&mut b);
    b.map("cmd", cmd, false);
    let _ = b.pop_object();
    b.finish().unwrap_or_default()
}
