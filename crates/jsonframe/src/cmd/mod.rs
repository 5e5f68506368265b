use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{ArgGroup, Args, Subcommand};
use jsonframe_json::{DEFAULT_LOOKUP_BATCH, DEFAULT_MAX_DEPTH};
use jsonframe_message::{DEFAULT_MAX_FRAMES, DEFAULT_MAX_HEADER_LEN, DEFAULT_MAX_PAYLOAD};

use crate::exit::{io_error, CliResult};
use crate::output::OutputFormat;

pub mod pack;
pub mod pretty;
pub mod query;
pub mod replay;
pub mod tokens;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the structural tokens of a JSON document.
    Tokens(TokensArgs),
    /// Resolve a path expression to a value span.
    Query(QueryArgs),
    /// Parse a document into a tree and print it.
    Pretty(PrettyArgs),
    /// Assemble messages from an event log.
    Replay(ReplayArgs),
    /// Write one message to an event log.
    Pack(PackArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Tokens(args) => tokens::run(args, format),
        Command::Query(args) => query::run(args, format),
        Command::Pretty(args) => pretty::run(args, format),
        Command::Replay(args) => replay::run(args, format),
        Command::Pack(args) => pack::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Read a JSON source file, or stdin for `-`.
pub fn read_source(path: &Path) -> CliResult<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|err| io_error("read stdin", err))?;
        return Ok(text);
    }
    std::fs::read_to_string(path).map_err(|err| io_error(&format!("read {}", path.display()), err))
}

#[derive(Args, Debug)]
pub struct TokensArgs {
    /// JSON file (`-` for stdin).
    pub file: PathBuf,
    /// Byte offset to start parsing at.
    #[arg(long, default_value_t = 0, conflicts_with = "path")]
    pub start: usize,
    /// Number of bytes to parse. Default: to end of input.
    #[arg(long, conflicts_with = "path")]
    pub length: Option<usize>,
    /// List the entries of the value at this path instead.
    #[arg(long, value_name = "EXPR")]
    pub path: Option<String>,
    /// Tokens fetched per parser call.
    #[arg(long, default_value_t = 32, value_parser = clap::value_parser!(u16).range(1..))]
    pub batch: u16,
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// JSON file (`-` for stdin).
    pub file: PathBuf,
    /// Path expression, e.g. `menu.items[1].label`.
    pub expr: String,
    /// Entries fetched per lookup step. Index steps only reach this far.
    #[arg(long, default_value_t = DEFAULT_LOOKUP_BATCH)]
    pub lookup_batch: usize,
}

#[derive(Args, Debug)]
pub struct PrettyArgs {
    /// JSON file (`-` for stdin).
    pub file: PathBuf,
    /// Print on one line.
    #[arg(long, conflicts_with = "indent")]
    pub compact: bool,
    /// Spaces per nesting level.
    #[arg(long)]
    pub indent: Option<usize>,
    /// Print only the value at this path.
    #[arg(long, value_name = "EXPR")]
    pub path: Option<String>,
    /// Maximum nesting depth.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Event log file.
    pub log: PathBuf,
    /// Frames stored per message; extra frames are dropped.
    #[arg(long, default_value_t = DEFAULT_MAX_FRAMES)]
    pub max_frames: usize,
    /// Longest header accepted, in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_HEADER_LEN)]
    pub max_header_len: usize,
    /// Largest event payload accepted, in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_PAYLOAD)]
    pub max_payload: usize,
    /// Fail on the first rejected header or dropped frame.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["header", "cmd"])))]
pub struct PackArgs {
    /// Event log file to write.
    pub out: PathBuf,
    /// Header JSON, written as-is.
    #[arg(long)]
    pub header: Option<String>,
    /// Command name; the header is generated.
    #[arg(long)]
    pub cmd: Option<String>,
    /// Request id for a generated header.
    #[arg(long, default_value_t = 0, requires = "cmd", allow_negative_numbers = true)]
    pub request: i64,
    /// `args` JSON for a generated header.
    #[arg(long = "args", value_name = "JSON", requires = "cmd")]
    pub args_json: Option<String>,
    /// Payload frame: `text:STRING`, `hex:BYTES` or `file:PATH`. Repeatable.
    #[arg(long = "frame", value_name = "SOURCE", value_parser = parse_frame_source)]
    pub frames: Vec<FrameSource>,
    /// Write the --header text even if it fails validation.
    #[arg(long, requires = "header")]
    pub no_validate: bool,
    /// Append to the log instead of truncating it.
    #[arg(long)]
    pub append: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Where a packed frame's payload comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameSource {
    Text(String),
    Hex(Vec<u8>),
    File(PathBuf),
}

pub fn parse_frame_source(arg: &str) -> Result<FrameSource, String> {
    let (kind, value) = arg
        .split_once(':')
        .ok_or_else(|| format!("expected text:, hex: or file: prefix, got '{arg}'"))?;
    match kind {
        "text" => Ok(FrameSource::Text(value.to_string())),
        "hex" => hex::decode(value)
            .map(FrameSource::Hex)
            .map_err(|err| format!("invalid hex payload: {err}")),
        "file" if value.is_empty() => Err("file: needs a path".to_string()),
        "file" => Ok(FrameSource::File(PathBuf::from(value))),
        other => Err(format!(
            "unknown frame source '{other}' (expected text, hex or file)"
        )),
    }
}
