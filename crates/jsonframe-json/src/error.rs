/// Errors reported by the document parser, query resolver and builder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JsonError {
    /// The input contained no value (empty or whitespace only).
    #[error("empty document")]
    Empty,

    /// A character that cannot start or continue the expected construct.
    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedChar { offset: usize, found: char },

    /// Input ended inside a string or container.
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEnd { offset: usize },

    /// A string without its closing quote.
    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString { offset: usize },

    /// `t`/`f`/`n` that did not spell out `true`/`false`/`null`.
    #[error("invalid keyword at offset {offset}")]
    InvalidKeyword { offset: usize },

    /// A map entry without a quoted name.
    #[error("expected quoted member name at offset {offset}")]
    ExpectedName { offset: usize },

    /// A map entry name not followed by `:`.
    #[error("expected ':' at offset {offset}")]
    ExpectedColon { offset: usize },

    /// Nesting exceeded the configured maximum depth.
    #[error("nesting depth exceeds maximum ({max})")]
    DepthExceeded { max: usize },

    /// A path expression could not be compiled.
    #[error("invalid path expression at byte {position}: {reason}")]
    QuerySyntax { position: usize, reason: &'static str },

    /// A name step found no matching member.
    #[error("no member named '{0}'")]
    NameNotFound(String),

    /// An index step was outside the entries available for lookup.
    #[error("index {index} out of range ({available} entries available)")]
    IndexOutOfRange { index: usize, available: usize },

    /// A step tried to descend into a scalar value.
    #[error("cannot step into a scalar value at offset {offset}")]
    NotAContainer { offset: usize },

    /// The stream parser stopped on malformed structure while resolving a path.
    #[error("malformed document while resolving path: {0}")]
    Malformed(crate::stream::StreamError),

    /// A pop without a matching push.
    #[error("unbalanced builder: no open {0} to close")]
    Unbalanced(&'static str),
}

pub type Result<T> = std::result::Result<T, JsonError>;
