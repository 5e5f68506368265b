use jsonframe_json::{Resolver, ResolverConfig};

use crate::cmd::{read_source, QueryArgs};
use crate::exit::{json_error, CliResult, SUCCESS};
use crate::output::{print_resolved, OutputFormat};

pub fn run(args: QueryArgs, format: OutputFormat) -> CliResult<i32> {
    let source = read_source(&args.file)?;
    let resolver = Resolver::with_config(
        &source,
        ResolverConfig {
            lookup_batch: args.lookup_batch,
        },
    );

    let resolved = resolver
        .resolve_str(&args.expr)
        .map_err(|err| json_error("query", err))?;
    tracing::debug!(
        expr = %args.expr,
        offset = resolved.span.offset,
        len = resolved.span.len,
        "path resolved"
    );

    print_resolved(&args.expr, &resolved, &source, format);
    Ok(SUCCESS)
}
