use std::fmt;
use std::io;

use jsonframe_json::JsonError;
use jsonframe_message::{AssemblerError, EventLogError};

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => FAILURE,
        io::ErrorKind::InvalidData => DATA_INVALID,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn json_error(context: &str, err: JsonError) -> CliError {
    let code = match err {
        JsonError::QuerySyntax { .. } => USAGE,
        JsonError::NameNotFound(_)
        | JsonError::IndexOutOfRange { .. }
        | JsonError::NotAContainer { .. } => FAILURE,
        JsonError::Unbalanced(_) => INTERNAL,
        _ => DATA_INVALID,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn event_log_error(context: &str, err: EventLogError) -> CliError {
    match err {
        EventLogError::Io(source) => io_error(context, source),
        EventLogError::ConnectionClosed => {
            CliError::new(DATA_INVALID, format!("{context}: log ends inside a record"))
        }
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

pub fn assembler_error(context: &str, err: AssemblerError) -> CliError {
    match err {
        AssemblerError::Args(err) => json_error(context, err),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}
