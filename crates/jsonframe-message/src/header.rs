use jsonframe_json::{NodeKind, NodeRef};

use crate::error::HeaderError;

/// Required header fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub cmd: String,
    pub request: i64,
    pub frames: usize,
}

impl Header {
    /// Check `cmd`, `request` and `frames` on a parsed header root.
    ///
    /// Fields are checked in that order and the first problem is reported.
    /// `request` and `frames` must be number nodes; their values are read
    /// truncating, so `7.0` and `1e0` are accepted.
    pub fn from_root(root: NodeRef<'_>) -> Result<Self, HeaderError> {
        match root.kind() {
            None => return Err(HeaderError::Unparsable),
            Some(NodeKind::Map) => {}
            Some(_) => return Err(HeaderError::NotAMap),
        }

        let cmd = root.get("cmd");
        if !cmd.is_present() {
            return Err(HeaderError::MissingCmd);
        }
        if !cmd.is(NodeKind::String) {
            return Err(HeaderError::CmdNotString);
        }

        let request = root.get("request");
        if !request.is_present() {
            return Err(HeaderError::MissingRequest);
        }
        if !request.is(NodeKind::Number) {
            return Err(HeaderError::RequestNotInteger);
        }
        let request = request.as_i64();

        let frames = root.get("frames");
        if !frames.is_present() {
            return Err(HeaderError::MissingFrames);
        }
        if !frames.is(NodeKind::Number) {
            return Err(HeaderError::FramesNotInteger);
        }
        let frames = usize::try_from(frames.as_i64()).map_err(|_| HeaderError::FramesNegative)?;

        Ok(Self {
            cmd: cmd.as_str().to_string(),
            request,
            frames,
        })
    }
}
