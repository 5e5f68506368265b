#![cfg(feature = "cli")]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "jsonframe-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn jsonframe(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_jsonframe"))
        .args(["--log-level", "error", "--format", "json"])
        .args(args)
        .output()
        .expect("jsonframe should run")
}

fn write_doc(dir: &Path, name: &str, text: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, text).expect("document should be writable");
    path.to_string_lossy().into_owned()
}

fn json_lines(output: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("stdout line should be JSON"))
        .collect()
}

#[test]
fn version_prints_name_and_version() {
    let output = jsonframe(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        format!("jsonframe {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn query_resolves_nested_path_to_span() {
    let dir = unique_temp_dir("query");
    let doc = write_doc(&dir, "doc.json", r#"{"a":{"b":[10,20,30]}}"#);

    let output = jsonframe(&["query", &doc, "a.b[1]"]);
    assert!(output.status.success());
    let lines = json_lines(&output);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["value"], "20");
    assert_eq!(lines[0]["value_type"], "number");
    assert_eq!(lines[0]["offset"], 14);
    assert_eq!(lines[0]["len"], 2);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn query_failures_map_to_exit_codes() {
    let dir = unique_temp_dir("query-fail");
    let doc = write_doc(&dir, "doc.json", r#"{"a":[1]}"#);

    let missing = jsonframe(&["query", &doc, "b"]);
    assert_eq!(missing.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&missing.stderr).contains("no member named 'b'"));

    let bad_expr = jsonframe(&["query", &doc, "a[x]"]);
    assert_eq!(bad_expr.status.code(), Some(64));

    let malformed = write_doc(&dir, "bad.json", "{\"a\":");
    let output = jsonframe(&["query", &malformed, "a"]);
    assert_eq!(output.status.code(), Some(60));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn tokens_lists_root_entries_across_batches() {
    let dir = unique_temp_dir("tokens");
    let doc = write_doc(&dir, "doc.json", r#"{"a":1,"b":"two","c":[3],"d":null}"#);

    let output = jsonframe(&["tokens", &doc, "--batch", "3"]);
    assert!(output.status.success());
    let lines = json_lines(&output);
    let names: Vec<&str> = lines
        .iter()
        .map(|line| line["name"].as_str().expect("map entries have names"))
        .collect();
    assert_eq!(names, ["a", "b", "c", "d"]);
    assert_eq!(lines[1]["value"], "\"two\"");
    assert_eq!(lines[2]["value_type"], "array");

    let nested = jsonframe(&["tokens", &doc, "--path", "c"]);
    assert!(nested.status.success());
    let lines = json_lines(&nested);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["kind"], "array_element");
    assert_eq!(lines[0]["value"], "3");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn tokens_reports_malformed_input_after_partial_output() {
    let dir = unique_temp_dir("tokens-bad");
    let doc = write_doc(&dir, "doc.json", r#"{"a":1,"b" 2}"#);

    let output = jsonframe(&["tokens", &doc]);
    assert_eq!(output.status.code(), Some(60));
    let lines = json_lines(&output);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["name"], "a");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn pretty_and_compact_output() {
    let dir = unique_temp_dir("pretty");
    let doc = write_doc(&dir, "doc.json", "{ \"a\" : [ 1 , true ] , \"b\" : { } }");

    let compact = jsonframe(&["pretty", &doc, "--compact"]);
    assert!(compact.status.success());
    assert_eq!(
        String::from_utf8_lossy(&compact.stdout).trim_end(),
        r#"{"a":[1,true],"b":{}}"#
    );

    let pretty = jsonframe(&["pretty", &doc, "--indent", "2"]);
    assert!(pretty.status.success());
    let text = String::from_utf8_lossy(&pretty.stdout);
    let reparsed: Value = serde_json::from_str(&text).expect("pretty output should be JSON");
    assert_eq!(reparsed, serde_json::json!({"a": [1, true], "b": {}}));
    assert!(text.contains("\n  \"a\": ["));

    let subtree = jsonframe(&["pretty", &doc, "--compact", "--path", "a[1]"]);
    assert_eq!(String::from_utf8_lossy(&subtree.stdout).trim_end(), "true");

    let absent = jsonframe(&["pretty", &doc, "--path", "a[5]"]);
    assert_eq!(absent.status.code(), Some(1));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn pack_then_replay_round_trips_a_message() {
    let dir = unique_temp_dir("pack");
    let log = dir.join("events.jf");
    let log = log.to_string_lossy();

    let packed = jsonframe(&[
        "pack",
        &log,
        "--cmd",
        "ping",
        "--request",
        "7",
        "--args",
        "{ \"n\": 1 }",
        "--frame",
        "text:x",
        "--frame",
        "hex:ff00",
    ]);
    assert!(packed.status.success(), "{}", String::from_utf8_lossy(&packed.stderr));
    let summary = json_lines(&packed);
    assert_eq!(summary[0]["events"], 3);

    let replay = jsonframe(&["replay", &log]);
    assert!(replay.status.success());
    let messages = json_lines(&replay);
    assert_eq!(messages.len(), 1);
    let message = &messages[0];
    assert_eq!(message["valid"], true);
    assert_eq!(message["cmd"], "ping");
    assert_eq!(message["request"], 7);
    assert_eq!(message["args"], r#"{"n":1}"#);
    assert_eq!(message["frames"][0]["kind"], "text");
    assert_eq!(message["frames"][0]["payload"], "x");
    assert_eq!(message["frames"][1]["kind"], "binary");
    assert_eq!(message["frames"][1]["payload"], "<binary 2 bytes>");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn replay_reports_rejected_header_with_code() {
    let dir = unique_temp_dir("rejected");
    let log = dir.join("events.jf");
    let log = log.to_string_lossy();

    let packed = jsonframe(&["pack", &log, "--header", r#"{"cmd":"a","request":1}"#, "--no-validate"]);
    assert!(packed.status.success());
    let packed = jsonframe(&[
        "pack",
        &log,
        "--append",
        "--header",
        r#"{"cmd":"b","request":2,"frames":0}"#,
    ]);
    assert!(packed.status.success());

    let replay = jsonframe(&["replay", &log]);
    assert!(replay.status.success());
    let messages = json_lines(&replay);
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["valid"], false);
    assert_eq!(messages[0]["header_code"], -8);
    assert_eq!(messages[1]["cmd"], "b");

    let strict = jsonframe(&["replay", &log, "--strict"]);
    assert_eq!(strict.status.code(), Some(60));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn replay_drops_frames_past_the_cap() {
    let dir = unique_temp_dir("overflow");
    let log = dir.join("events.jf");
    let log = log.to_string_lossy();

    let packed = jsonframe(&[
        "pack", &log, "--cmd", "up", "--frame", "text:1", "--frame", "text:2", "--frame",
        "text:3",
    ]);
    assert!(packed.status.success());

    let replay = jsonframe(&["replay", &log, "--max-frames", "2"]);
    assert!(replay.status.success());
    let messages = json_lines(&replay);
    assert_eq!(messages[0]["declared_frames"], 3);
    assert_eq!(messages[0]["dropped_frames"], 1);
    assert_eq!(messages[0]["frames"].as_array().map(Vec::len), Some(2));

    let strict = jsonframe(&["replay", &log, "--max-frames", "2", "--strict"]);
    assert_eq!(strict.status.code(), Some(60));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn pack_validates_header_frame_count() {
    let dir = unique_temp_dir("mismatch");
    let log = dir.join("events.jf");
    let log = log.to_string_lossy();

    let output = jsonframe(&[
        "pack",
        &log,
        "--header",
        r#"{"cmd":"a","request":1,"frames":2}"#,
        "--frame",
        "text:only-one",
    ]);
    assert_eq!(output.status.code(), Some(64));

    let output = jsonframe(&["pack", &log, "--header", r#"{"cmd":1,"request":1,"frames":0}"#]);
    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("code -5"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn replay_incomplete_or_truncated_logs() {
    let dir = unique_temp_dir("truncated");
    let log = dir.join("events.jf");
    let log_str = log.to_string_lossy();

    let packed = jsonframe(&[
        "pack",
        &log_str,
        "--no-validate",
        "--header",
        r#"{"cmd":"a","request":1,"frames":2}"#,
        "--frame",
        "text:x",
    ]);
    assert!(packed.status.success());
    let incomplete = jsonframe(&["replay", &log_str]);
    assert_eq!(incomplete.status.code(), Some(1));
    assert!(json_lines(&incomplete).is_empty());

    std::fs::write(&log, b"JF\x05\x00\x00\x00\x01\x00ab").expect("log should be writable");
    let truncated = jsonframe(&["replay", &log_str]);
    assert_eq!(truncated.status.code(), Some(60));

    std::fs::write(&log, b"XX\x00\x00\x00\x00\x01\x00").expect("log should be writable");
    let bad_magic = jsonframe(&["replay", &log_str]);
    assert_eq!(bad_magic.status.code(), Some(60));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_input_file_fails() {
    let output = jsonframe(&["pretty", "/nonexistent/jsonframe/doc.json"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("error: read "));
}

#[test]
fn extended_version_lists_build_details() {
    let output = jsonframe(&["version", "--extended"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("name: jsonframe"));
    assert!(stdout.contains("build_target: "));
    assert!(stdout.contains("defaults: max_depth=128"));
}
