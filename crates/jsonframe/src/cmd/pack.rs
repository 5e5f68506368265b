use std::fs::{File, OpenOptions};
use std::io::BufWriter;

use jsonframe_json::{to_compact_string, DocumentParser};
use jsonframe_message::{EventWriter, Frame, Header, OutgoingMessage, HEADER_SIZE};

use crate::cmd::{FrameSource, PackArgs};
use crate::exit::{
    event_log_error, io_error, json_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE,
};
use crate::output::{print_pack_summary, OutputFormat, PackSummary};

pub fn run(args: PackArgs, format: OutputFormat) -> CliResult<i32> {
    let frames = args
        .frames
        .iter()
        .map(load_frame)
        .collect::<CliResult<Vec<_>>>()?;

    let (events, cmd, request) = match (&args.header, &args.cmd) {
        (Some(header), _) => {
            let (cmd, request) = if args.no_validate {
                (String::new(), 0)
            } else {
                let checked = check_header(header)?;
                if checked.frames != frames.len() {
                    return Err(CliError::new(
                        USAGE,
                        format!(
                            "pack: header declares {} frames but {} given",
                            checked.frames,
                            frames.len()
                        ),
                    ));
                }
                (checked.cmd, checked.request)
            };
            let mut events = Vec::with_capacity(frames.len() + 1);
            events.push(Frame::text(header.clone()));
            events.extend(frames);
            (events, cmd, request)
        }
        (None, Some(cmd)) => {
            let mut message = OutgoingMessage::new(cmd.as_str(), args.request);
            if let Some(json) = &args.args_json {
                message = message.args_json(normalize_args(json)?);
            }
            for frame in frames {
                message = message.frame(frame);
            }
            (message.into_frames(), cmd.clone(), args.request)
        }
        (None, None) => {
            return Err(CliError::new(USAGE, "pack: either --header or --cmd is required"));
        }
    };

    let file = open_log(&args)?;
    let mut writer = EventWriter::new(BufWriter::new(file));
    writer
        .write_all(&events)
        .map_err(|err| event_log_error("pack", err))?;

    let bytes: usize = events.iter().map(|event| HEADER_SIZE + event.len()).sum();
    tracing::debug!(events = events.len(), bytes, "event log written");

    let path = args.out.display().to_string();
    print_pack_summary(
        &PackSummary {
            path: &path,
            cmd: &cmd,
            request,
            events: events.len(),
            bytes,
        },
        format,
    );
    Ok(SUCCESS)
}

fn open_log(args: &PackArgs) -> CliResult<File> {
    let context = format!("open {}", args.out.display());
    let result = if args.append {
        OpenOptions::new().create(true).append(true).open(&args.out)
    } else {
        File::create(&args.out)
    };
    result.map_err(|err| io_error(&context, err))
}

fn load_frame(source: &FrameSource) -> CliResult<Frame> {
    match source {
        FrameSource::Text(text) => Ok(Frame::text(text.as_str())),
        FrameSource::Hex(bytes) => Ok(Frame::binary(bytes.clone())),
        FrameSource::File(path) => std::fs::read(path)
            .map(Frame::binary)
            .map_err(|err| io_error(&format!("read {}", path.display()), err)),
    }
}

/// Run the same checks the assembler applies to an incoming header.
fn check_header(text: &str) -> CliResult<Header> {
    let mut parser = DocumentParser::new();
    let root = parser
        .parse(text)
        .map_err(|err| json_error("pack: header", err))?;
    Header::from_root(root).map_err(|err| {
        CliError::new(
            DATA_INVALID,
            format!("pack: header rejected: {err} (code {})", err.code()),
        )
    })
}

fn normalize_args(json: &str) -> CliResult<String> {
    let mut parser = DocumentParser::new();
    let root = parser
        .parse(json)
        .map_err(|err| json_error("pack: args", err))?;
    Ok(to_compact_string(root))
}
