//! End-to-end tests for the `vocab` binary.
//!
//! Each test gets its own store and config file in a temp directory, so the
//! user's real collection is never touched.

use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

struct CliContext {
    dir: TempDir,
}

impl CliContext {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn store_path(&self) -> PathBuf {
        self.dir.path().join("vocabulary.json")
    }

    fn run_allow_failure(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_vocab"))
            .args(args)
            .env("VOCAB_STORE", self.store_path())
            .env("VOCAB_CONFIG", self.dir.path().join("config.toml"))
            .env("NO_COLOR", "1")
            .env_remove("VOCAB_LOG")
            .output()
            .unwrap()
    }

    fn run(&self, args: &[&str]) -> Output {
        let output = self.run_allow_failure(args);
        assert!(
            output.status.success(),
            "vocab {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        output
    }

    fn run_json(&self, args: &[&str]) -> Value {
        let mut full = vec!["--json"];
        full.extend_from_slice(args);
        let output = self.run(&full);
        serde_json::from_slice(&output.stdout).unwrap()
    }
}

fn texts(json: &Value) -> Vec<String> {
    json["words"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["text"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_cli_insert_filter_review_session() {
    let ctx = CliContext::new();

    let inserted = ctx.run_json(&[
        "query",
        r#"insert "run(ning)" "to move" #verb; "dog" #noun; "eat" #verb"#,
    ]);
    assert_eq!(inserted["total"], 3);
    assert_eq!(inserted["words"][0]["content"], "run(ning)");

    let verbs = ctx.run_json(&["query", "#verb"]);
    assert_eq!(texts(&verbs), vec!["running", "eat"]);

    let key = verbs["words"][0]["key"].as_str().unwrap().to_string();
    let short = &key[key.len() - 8..];
    ctx.run(&["review", short]);

    let unreviewed = ctx.run_json(&["query", "#verb and not reviewed"]);
    assert_eq!(texts(&unreviewed), vec!["eat"]);

    let session = ctx.run_json(&["session"]);
    assert_eq!(session["status"], "session_started");
    assert_eq!(session["words"], 3);

    let all = ctx.run_json(&["list"]);
    assert!(all["words"].as_array().unwrap().iter().all(|w| w["reviewed"] == false));
    assert_eq!(all["words"][0]["review_count"], 1);
}

#[test]
fn test_cli_add_edit_delete() {
    let ctx = CliContext::new();

    let added = ctx.run_json(&["add", "cat(s)", "-d", "a pet", "-t", "noun"]);
    let key = added["words"][0]["key"].as_str().unwrap().to_string();

    ctx.run(&["edit", &key, "--add-tag", "animal"]);
    let edited = ctx.run_json(&["query", "#animal"]);
    assert_eq!(texts(&edited), vec!["cats"]);

    ctx.run(&["delete", &key, "--force"]);
    let remaining = ctx.run_json(&["list"]);
    assert_eq!(remaining["total"], 0);
}

#[test]
fn test_cli_parse_error_reports_position() {
    let ctx = CliContext::new();

    let output = ctx.run_allow_failure(&["query", "#verb and"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("  #verb and\n"), "stderr was: {stderr}");
    assert!(!ctx.store_path().exists());

    let output = ctx.run_allow_failure(&["--json", "query", "#verb and"]);
    let error: Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(error["error"]["code"], "QUERY_ERROR");
}

#[test]
fn test_cli_unknown_key_exit_code() {
    let ctx = CliContext::new();
    let output = ctx.run_allow_failure(&["review", "deadbeef"]);
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_cli_dump_matches_export() {
    let ctx = CliContext::new();
    ctx.run(&["add", "dog"]);

    let dump = ctx.run(&["query", "dump"]);
    let export = ctx.run(&["export", "-o", "-"]);
    assert_eq!(dump.stdout, export.stdout);

    let json: Value = serde_json::from_slice(&dump.stdout).unwrap();
    assert!(json.is_object() || json.is_array());
}
