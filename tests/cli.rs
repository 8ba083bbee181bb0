use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const TEXT: &str = "a a a b b c\n";

fn temp_workspace() -> TempDir {
    tempfile::tempdir().expect("create tempdir")
}

fn write_corpus(dir: &Path) -> String {
    let input_path = dir.join("text8");
    fs::write(&input_path, TEXT).expect("write input");
    input_path.file_name().unwrap().to_str().unwrap().to_string()
}

fn skipgram() -> Command {
    Command::cargo_bin("skipgram").expect("binary exists")
}

#[test]
fn vocab_json_reports_sentinel_counts() {
    let workspace = temp_workspace();
    let input = write_corpus(workspace.path());

    let output = skipgram()
        .current_dir(workspace.path())
        .args([
            "--quiet",
            "vocab",
            input.as_str(),
            "--vocab-size",
            "2",
            "--no-progress",
            "--json",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let summary: Value = serde_json::from_slice(&output).expect("summary is valid JSON");
    assert_eq!(summary["corpus_tokens"], 6);
    assert_eq!(summary["distinct_tokens"], 3);
    assert_eq!(summary["vocab_size"], 2);
    assert_eq!(summary["unk_count"], 3);
    assert_eq!(summary["most_common"][0]["token"], "UNK");
    assert_eq!(summary["most_common"][1]["token"], "a");
    let ids = summary["sample_ids"]
        .as_array()
        .expect("sample ids")
        .iter()
        .map(|v| v.as_u64().expect("u64 id"))
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![1, 1, 1, 0, 0, 0]);
}

#[test]
fn vocab_text_output_lists_most_common() {
    let workspace = temp_workspace();
    let input = write_corpus(workspace.path());

    let output = skipgram()
        .current_dir(workspace.path())
        .args(["--quiet", "vocab", input.as_str(), "--no-progress"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).expect("output is UTF-8");
    assert!(text.contains("Vocab size     : 4"));
    assert!(text.contains("Most common (+UNK)"));
}

#[test]
fn batches_are_contiguous_across_calls() {
    let workspace = temp_workspace();
    let input = write_corpus(workspace.path());

    let output = skipgram()
        .current_dir(workspace.path())
        .args([
            "--quiet",
            "batches",
            input.as_str(),
            "--vocab-size",
            "2",
            "--batch-size",
            "4",
            "--skip-window",
            "1",
            "--count",
            "2",
            "--no-progress",
            "--json",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let text = String::from_utf8(output).expect("output is UTF-8");
    let records = text
        .lines()
        .map(|line| serde_json::from_str::<Value>(line).expect("JSON line"))
        .collect::<Vec<_>>();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["cursor"], 0);
    assert_eq!(records[1]["cursor"], 2);
    // Encoded corpus is [1, 1, 1, 0, 0, 0].
    assert_eq!(records[0]["targets"], serde_json::json!([1, 1, 1, 1]));
    assert_eq!(records[0]["contexts"], serde_json::json!([1, 1, 1, 0]));
    assert_eq!(records[1]["targets"], serde_json::json!([0, 0, 0, 0]));
    assert_eq!(records[1]["contexts"], serde_json::json!([1, 0, 0, 0]));
}

#[test]
fn batches_reject_indivisible_batch_size() {
    let workspace = temp_workspace();
    let input = write_corpus(workspace.path());

    skipgram()
        .current_dir(workspace.path())
        .args([
            "--quiet",
            "batches",
            input.as_str(),
            "--batch-size",
            "3",
            "--skip-window",
            "1",
            "--no-progress",
        ])
        .assert()
        .failure();
}

fn pair_rows(text: &str) -> Vec<Vec<&str>> {
    text.lines()
        .filter(|line| line.contains("->"))
        .map(|line| line.split_whitespace().collect())
        .collect()
}

#[test]
fn batches_text_output_starts_at_requested_position() {
    let workspace = temp_workspace();
    let input = write_corpus(workspace.path());

    let output = skipgram()
        .current_dir(workspace.path())
        .args([
            "--quiet",
            "batches",
            input.as_str(),
            "--vocab-size",
            "2",
            "--batch-size",
            "2",
            "--skip-window",
            "1",
            "--count",
            "2",
            "--start",
            "3",
            "--threads",
            "1",
            "--no-progress",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let text = String::from_utf8(output).expect("output is UTF-8");
    assert!(text.contains("batch 0 (cursor 3):"));
    assert!(text.contains("batch 1 (cursor 4):"));
    // Encoded corpus is [1, 1, 1, 0, 0, 0]; the second window wraps to position 0.
    assert_eq!(
        pair_rows(&text),
        vec![
            vec!["0", "UNK", "->", "0", "UNK"],
            vec!["0", "UNK", "->", "0", "UNK"],
            vec!["0", "UNK", "->", "0", "UNK"],
            vec!["0", "UNK", "->", "1", "a"],
        ]
    );
}

#[test]
fn vocab_honours_max_tokens_and_thread_limit() {
    let workspace = temp_workspace();
    let input = write_corpus(workspace.path());

    let output = skipgram()
        .current_dir(workspace.path())
        .args([
            "--quiet",
            "vocab",
            input.as_str(),
            "--max-tokens",
            "4",
            "--threads",
            "2",
            "--no-progress",
            "--json",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let summary: Value = serde_json::from_slice(&output).expect("summary is valid JSON");
    // Only "a a a b" is read.
    assert_eq!(summary["corpus_tokens"], 4);
    assert_eq!(summary["distinct_tokens"], 2);
    assert_eq!(summary["vocab_size"], 3);
    assert_eq!(summary["unk_count"], 0);
    assert_eq!(summary["sample_tokens"], serde_json::json!(["a", "a", "a", "b"]));
}
