use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use jsonframe_json::{to_compact_string, Resolved, StructuralToken};
use jsonframe_message::{Frame, Message};
use serde::Serialize;

const PREVIEW_LIMIT: usize = 64;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn to_json_line<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}

#[derive(Serialize)]
struct TokenOutput<'a> {
    index: usize,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    value_type: &'static str,
    offset: usize,
    len: usize,
    value: &'a str,
}

impl<'a> TokenOutput<'a> {
    fn new(index: usize, token: &StructuralToken, source: &'a str) -> Self {
        Self {
            index,
            kind: entry_kind_name(token),
            name: token.name_str(source),
            value_type: token.value_type.as_str(),
            offset: token.value.offset,
            len: token.value.len,
            value: token.value_str(source),
        }
    }
}

fn entry_kind_name(token: &StructuralToken) -> &'static str {
    match token.kind {
        jsonframe_json::EntryKind::MapEntry => "map_entry",
        jsonframe_json::EntryKind::ArrayElement => "array_element",
        jsonframe_json::EntryKind::Bare => "bare",
    }
}

/// One line per structural token.
pub fn print_tokens(tokens: &[StructuralToken], source: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for (index, token) in tokens.iter().enumerate() {
                println!("{}", to_json_line(&TokenOutput::new(index, token, source)));
            }
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["#", "KIND", "NAME", "TYPE", "OFFSET", "LEN", "VALUE"]);
            for (index, token) in tokens.iter().enumerate() {
                let out = TokenOutput::new(index, token, source);
                table.add_row(vec![
                    index.to_string(),
                    out.kind.to_string(),
                    out.name.unwrap_or("").to_string(),
                    out.value_type.to_string(),
                    out.offset.to_string(),
                    out.len.to_string(),
                    truncate(out.value),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for (index, token) in tokens.iter().enumerate() {
                let out = TokenOutput::new(index, token, source);
                match out.name {
                    Some(name) => println!(
                        "[{index}] {name} = {} ({} @{}+{})",
                        truncate(out.value),
                        out.value_type,
                        out.offset,
                        out.len
                    ),
                    None => println!(
                        "[{index}] {} ({} @{}+{})",
                        truncate(out.value),
                        out.value_type,
                        out.offset,
                        out.len
                    ),
                }
            }
        }
        OutputFormat::Raw => {
            for token in tokens {
                print_raw(token.value_str(source).as_bytes());
                print_raw(b"\n");
            }
        }
    }
}

#[derive(Serialize)]
struct QueryOutput<'a> {
    query: &'a str,
    value_type: &'static str,
    offset: usize,
    len: usize,
    value: &'a str,
}

pub fn print_resolved(expr: &str, resolved: &Resolved, source: &str, format: OutputFormat) {
    let out = QueryOutput {
        query: expr,
        value_type: resolved.value_type.as_str(),
        offset: resolved.span.offset,
        len: resolved.span.len,
        value: resolved.text(source),
    };
    match format {
        OutputFormat::Json => println!("{}", to_json_line(&out)),
        OutputFormat::Table => {
            let mut table = new_table(vec!["QUERY", "TYPE", "OFFSET", "LEN", "VALUE"]);
            table.add_row(vec![
                out.query.to_string(),
                out.value_type.to_string(),
                out.offset.to_string(),
                out.len.to_string(),
                truncate(out.value),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!(
            "{} = {} ({} @{}+{})",
            out.query, out.value, out.value_type, out.offset, out.len
        ),
        OutputFormat::Raw => print_raw(out.value.as_bytes()),
    }
}

#[derive(Serialize)]
struct FrameOutput {
    kind: &'static str,
    size: usize,
    payload: String,
}

#[derive(Serialize)]
struct MessageOutput<'a> {
    index: usize,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    header_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    header_code: Option<i32>,
    cmd: &'a str,
    request: i64,
    declared_frames: usize,
    dropped_frames: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    args: Option<String>,
    frames: Vec<FrameOutput>,
}

impl<'a> MessageOutput<'a> {
    fn new(index: usize, message: &'a Message) -> Self {
        let args = message.args();
        Self {
            index,
            valid: message.is_valid(),
            header_error: message.header_error().map(|err| err.to_string()),
            header_code: message.header_error().map(|err| err.code()),
            cmd: message.cmd(),
            request: message.request(),
            declared_frames: message.declared_frames(),
            dropped_frames: message.dropped_frames(),
            args: args.is_present().then(|| to_compact_string(args)),
            frames: message
                .frames()
                .iter()
                .map(|frame| FrameOutput {
                    kind: frame.kind.as_str(),
                    size: frame.len(),
                    payload: payload_preview(frame),
                })
                .collect(),
        }
    }
}

/// Print one assembled message. Table output is one table per message.
pub fn print_message(index: usize, message: &Message, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", to_json_line(&MessageOutput::new(index, message))),
        OutputFormat::Table => {
            let out = MessageOutput::new(index, message);
            let mut table = new_table(vec!["#", "CMD", "REQUEST", "FRAMES", "STATUS", "ARGS"]);
            table.add_row(vec![
                index.to_string(),
                out.cmd.to_string(),
                out.request.to_string(),
                format!("{}/{}", out.frames.len(), out.declared_frames),
                status_text(&out),
                out.args.as_deref().map(truncate).unwrap_or_default(),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let out = MessageOutput::new(index, message);
            println!(
                "message {} cmd={} request={} frames={}/{} status={}",
                index,
                out.cmd,
                out.request,
                out.frames.len(),
                out.declared_frames,
                status_text(&out)
            );
            for (i, frame) in out.frames.iter().enumerate() {
                println!(
                    "  frame {i} {} size={} payload={}",
                    frame.kind,
                    frame.size,
                    truncate(&frame.payload)
                );
            }
        }
        OutputFormat::Raw => {
            for frame in message.frames() {
                print_raw(frame.payload.as_ref());
            }
        }
    }
}

fn status_text(out: &MessageOutput<'_>) -> String {
    match (&out.header_error, out.header_code) {
        (Some(err), Some(code)) => format!("rejected ({code}: {err})"),
        _ if out.dropped_frames > 0 => format!("ok, {} dropped", out.dropped_frames),
        _ => "ok".to_string(),
    }
}

#[derive(Serialize)]
pub struct PackSummary<'a> {
    pub path: &'a str,
    pub cmd: &'a str,
    pub request: i64,
    pub events: usize,
    pub bytes: usize,
}

pub fn print_pack_summary(summary: &PackSummary<'_>, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", to_json_line(summary)),
        OutputFormat::Table => {
            let mut table = new_table(vec!["PATH", "CMD", "REQUEST", "EVENTS", "BYTES"]);
            table.add_row(vec![
                summary.path.to_string(),
                summary.cmd.to_string(),
                summary.request.to_string(),
                summary.events.to_string(),
                summary.bytes.to_string(),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!(
            "wrote {} events ({} bytes) to {}",
            summary.events, summary.bytes, summary.path
        ),
        OutputFormat::Raw => println!("{}", summary.path),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn payload_preview(frame: &Frame) -> String {
    match std::str::from_utf8(frame.payload.as_ref()) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", frame.len()),
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= PREVIEW_LIMIT {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(PREVIEW_LIMIT).collect();
    cut.push('…');
    cut
}
