use jsonframe_json::{Resolver, StreamParser, StructuralToken};

use crate::cmd::{read_source, TokensArgs};
use crate::exit::{json_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_tokens, OutputFormat};

pub fn run(args: TokensArgs, format: OutputFormat) -> CliResult<i32> {
    let source = read_source(&args.file)?;

    let (start, len) = match &args.path {
        Some(expr) => {
            let resolved = Resolver::new(&source)
                .resolve_str(expr)
                .map_err(|err| json_error("tokens", err))?;
            (resolved.span.offset, resolved.span.len)
        }
        None => range_within(&source, args.start, args.length)?,
    };

    let mut parser = StreamParser::with_range(&source, start, len);
    let mut buffer = vec![StructuralToken::default(); usize::from(args.batch)];
    let mut tokens = Vec::new();
    let mut calls = 0usize;
    loop {
        let count = parser.parse(&mut buffer);
        calls += 1;
        tokens.extend_from_slice(&buffer[..count]);
        if count < buffer.len() {
            break;
        }
    }
    tracing::debug!(tokens = tokens.len(), calls, start, len, "stream parse finished");

    print_tokens(&tokens, &source, format);

    match parser.error() {
        Some(err) => Err(CliError::new(DATA_INVALID, format!("tokens: {err}"))),
        None => Ok(SUCCESS),
    }
}

fn range_within(source: &str, start: usize, length: Option<usize>) -> CliResult<(usize, usize)> {
    if start > source.len() {
        return Err(CliError::new(
            USAGE,
            format!("--start {start} is past end of input ({} bytes)", source.len()),
        ));
    }
    let len = length
        .unwrap_or(source.len() - start)
        .min(source.len() - start);
    if !source.is_char_boundary(start) || !source.is_char_boundary(start + len) {
        return Err(CliError::new(
            USAGE,
            "range does not fall on character boundaries",
        ));
    }
    Ok((start, len))
}
