use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("jsonframe {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: jsonframe");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "build_target: {}",
        option_env!("JSONFRAME_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "build_profile: {}",
        option_env!("JSONFRAME_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!(
        "rustc: {}",
        option_env!("RUSTC_VERSION").unwrap_or("unknown")
    );
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!(
        "defaults: max_depth={}, lookup_batch={}, max_frames={}, max_payload={}",
        jsonframe_json::DEFAULT_MAX_DEPTH,
        jsonframe_json::DEFAULT_LOOKUP_BATCH,
        jsonframe_message::DEFAULT_MAX_FRAMES,
        jsonframe_message::DEFAULT_MAX_PAYLOAD
    );

    Ok(SUCCESS)
}
