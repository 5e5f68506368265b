use std::fs::File;
use std::io::BufReader;

use jsonframe_message::{
    AssemblerConfig, AssemblerState, CollectOutcome, EventLogConfig, EventReader,
    MessageAssembler,
};

use crate::cmd::ReplayArgs;
use crate::exit::{
    assembler_error, event_log_error, io_error, CliError, CliResult, DATA_INVALID, FAILURE,
    SUCCESS,
};
use crate::output::{print_message, OutputFormat};

pub fn run(args: ReplayArgs, format: OutputFormat) -> CliResult<i32> {
    let file = File::open(&args.log)
        .map_err(|err| io_error(&format!("open {}", args.log.display()), err))?;
    let reader = EventReader::with_config(
        BufReader::new(file),
        EventLogConfig {
            max_payload_size: args.max_payload,
        },
    );
    let mut assembler = MessageAssembler::with_config(AssemblerConfig {
        max_frames: args.max_frames,
        max_header_len: args.max_header_len,
        ..AssemblerConfig::default()
    });

    let mut events = 0usize;
    let mut messages = 0usize;
    for event in reader {
        let event = event.map_err(|err| event_log_error("replay", err))?;
        events += 1;

        match assembler.collect(event) {
            Ok(CollectOutcome::HeaderRejected(err)) if args.strict => {
                return Err(CliError::new(
                    DATA_INVALID,
                    format!("replay: event {events}: {err} (code {})", err.code()),
                ));
            }
            Ok(CollectOutcome::Ignored) => {
                tracing::debug!(event = events, "event outside any message skipped");
            }
            Ok(_) => {}
            Err(err) if args.strict => return Err(assembler_error("replay", err)),
            Err(err) => tracing::debug!(event = events, %err, "continuing after overflow"),
        }

        if let Some(message) = assembler.grab_message() {
            print_message(messages, &message, format);
            messages += 1;
            assembler.release(message);
        }
    }

    if let AssemblerState::CollectingFrames { frames_left } = assembler.state() {
        tracing::warn!(frames_left, "log ended before the last message completed");
        return Ok(FAILURE);
    }

    tracing::debug!(events, messages, "replay finished");
    Ok(SUCCESS)
}
