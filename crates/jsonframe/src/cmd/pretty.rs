use jsonframe_json::{
    to_compact_string, to_pretty_string, DocumentParser, ParserConfig, Query,
};

use crate::cmd::{read_source, PrettyArgs};
use crate::exit::{json_error, CliError, CliResult, FAILURE, SUCCESS};
use crate::output::{print_raw, OutputFormat};

const DEFAULT_INDENT: usize = 2;

pub fn run(args: PrettyArgs, format: OutputFormat) -> CliResult<i32> {
    let source = read_source(&args.file)?;
    let query = args
        .path
        .as_deref()
        .map(Query::parse)
        .transpose()
        .map_err(|err| json_error("pretty", err))?;

    let mut parser = DocumentParser::with_config(ParserConfig {
        max_depth: args.max_depth,
    });
    let root = parser
        .parse_owned(source)
        .map_err(|err| json_error("pretty", err))?;
    tracing::debug!(nodes = root.document().node_count(), "document parsed");

    let node = match &query {
        Some(query) => root.path(query),
        None => root,
    };
    if !node.is_present() {
        return Err(CliError::new(
            FAILURE,
            format!("pretty: no value at '{}'", args.path.unwrap_or_default()),
        ));
    }

    let text = if args.compact {
        to_compact_string(node)
    } else {
        to_pretty_string(node, args.indent.unwrap_or(DEFAULT_INDENT))
    };

    match format {
        OutputFormat::Raw => print_raw(text.as_bytes()),
        _ => println!("{text}"),
    }
    Ok(SUCCESS)
}
