//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const BANK: &str = "../../banks/local-ai-architect.toml";

/// Answer key for the bundled bank, in question order.
const KEY: [char; 6] = ['b', 'c', 'd', 'a', 'b', 'c'];

fn knowcheck() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("knowcheck").unwrap();
    cmd.env_remove("KNOWCHECK_BANK")
        .env_remove("KNOWCHECK_OUTPUT_DIR");
    cmd
}

fn take(output: &TempDir) -> Command {
    let mut cmd = knowcheck();
    cmd.arg("take")
        .arg("--bank")
        .arg(BANK)
        .arg("--output")
        .arg(output.path())
        .arg("--typewriter-ms")
        .arg("0");
    cmd
}

/// Select, confirm, and advance for each choice.
fn script(choices: &[char]) -> String {
    choices.iter().map(|c| format!("{c}\n\n\n")).collect()
}

fn json_reports(dir: &TempDir) -> Vec<std::path::PathBuf> {
    std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|e| e == "json"))
        .collect()
}

#[test]
fn validate_bundled_bank() {
    knowcheck()
        .arg("validate")
        .arg("--bank")
        .arg(BANK)
        .assert()
        .success()
        .stdout(predicate::str::contains("6 questions"))
        .stdout(predicate::str::contains("All banks valid"));
}

#[test]
fn validate_directory() {
    knowcheck()
        .arg("validate")
        .arg("--bank")
        .arg("../../banks")
        .assert()
        .success()
        .stdout(predicate::str::contains("Local AI Architect"));
}

#[test]
fn validate_directory_fails_on_broken_bank() {
    let dir = TempDir::new().unwrap();
    std::fs::copy(BANK, dir.path().join("good.toml")).unwrap();
    std::fs::write(
        dir.path().join("bad.toml"),
        "[bank]\nid = \"bad\"\nname = \"Bad\"\n",
    )
    .unwrap();

    knowcheck()
        .arg("validate")
        .arg("--bank")
        .arg(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("6 questions"))
        .stdout(predicate::str::contains("bad.toml"))
        .stdout(predicate::str::contains("All banks valid").not())
        .stderr(predicate::str::contains("1 bank file(s) failed to load"));
}

#[test]
fn validate_nonexistent_file() {
    knowcheck()
        .arg("validate")
        .arg("--bank")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn validate_rejects_broken_answer_key() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(
        &path,
        r#"
[bank]
id = "broken"
name = "Broken"

[[questions]]
id = 1
category = "General"
prompt = "Pick"
module = { id = "m1" }

[[questions.options]]
id = "a"
text = "One"

[[questions.options]]
id = "b"
text = "Two"
"#,
    )
    .unwrap();

    knowcheck()
        .arg("validate")
        .arg("--bank")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("exactly one correct option"));
}

#[test]
fn take_perfect_run_writes_report() {
    let out = TempDir::new().unwrap();

    take(&out)
        .write_stdin(script(&KEY))
        .assert()
        .success()
        .stdout(predicate::str::contains("Question 1/6"))
        .stdout(predicate::str::contains("Correct!"))
        .stdout(predicate::str::contains("6/6 correct (100%)"))
        .stdout(predicate::str::contains("PASSED"))
        .stdout(predicate::str::contains("Report saved to"));

    let reports = json_reports(&out);
    assert_eq!(reports.len(), 1);
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&reports[0]).unwrap()).unwrap();
    assert_eq!(report["results"]["correct"], 6);
    assert_eq!(report["answers"].as_array().unwrap().len(), 6);
}

#[test]
fn take_mixed_run_scores_by_category() {
    let out = TempDir::new().unwrap();
    // Miss question 2 (Data Privacy) and question 3 (Prompt Design).
    let choices = ['b', 'a', 'a', 'a', 'b', 'c'];

    take(&out)
        .write_stdin(script(&choices))
        .assert()
        .success()
        .stdout(predicate::str::contains("Incorrect. You chose (a); the answer was (c)."))
        .stdout(predicate::str::contains("4/6 correct (67%)"))
        .stdout(predicate::str::contains("PASSED").not())
        .stdout(predicate::str::contains("NEEDS REVIEW"))
        .stdout(predicate::str::contains("Module 1: Sovereign AI in the Classroom"))
        .stdout(predicate::str::contains("Module 2: Prompting as an Experience Architect"));
}

#[test]
fn take_double_confirm_counts_once() {
    let out = TempDir::new().unwrap();
    // Extra "confirm" after the reveal is ignored; the empty line then advances.
    let mut input = String::from("b\nconfirm\nconfirm\n\n");
    input.push_str(&script(&KEY[1..]));

    take(&out).write_stdin(input).assert().success();

    let reports = json_reports(&out);
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&reports[0]).unwrap()).unwrap();
    assert_eq!(report["answers"].as_array().unwrap().len(), 6);
}

#[test]
fn take_eof_before_finish_writes_nothing() {
    let out = TempDir::new().unwrap();

    take(&out)
        .write_stdin("b\n\n\nnext\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("this attempt was not saved"));

    assert!(json_reports(&out).is_empty());
}

#[test]
fn take_eof_after_retake_keeps_first_report() {
    let out = TempDir::new().unwrap();
    let mut input = script(&KEY);
    input.push_str("retake
b

");

    take(&out)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("6/6 correct (100%)"))
        .stdout(predicate::str::contains("this attempt was not saved"))
        .stdout(predicate::str::contains("no report written").not());

    assert_eq!(json_reports(&out).len(), 1);
}

#[test]
fn take_quit_leaves_early() {
    let out = TempDir::new().unwrap();

    take(&out)
        .write_stdin("a\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Selected (a)"))
        .stdout(predicate::str::contains("Leaving the knowledge check"));
}

#[test]
fn take_retake_after_completion() {
    let out = TempDir::new().unwrap();
    let mut input = script(&['a'; 6]);
    input.push_str("retake\n");
    input.push_str(&script(&KEY));

    take(&out)
        .write_stdin(input)
        .assert()
        .success()
        .stderr(predicate::str::contains("starting over"))
        .stdout(predicate::str::contains("1/6 correct (17%)"))
        .stdout(predicate::str::contains("6/6 correct (100%)"));

    assert_eq!(json_reports(&out).len(), 2);
}

#[test]
fn take_without_bank_fails() {
    let dir = TempDir::new().unwrap();

    knowcheck()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .arg("take")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no question bank given"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    knowcheck()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created knowcheck.toml"))
        .stdout(predicate::str::contains("Created banks/example.toml"));

    assert!(dir.path().join("knowcheck.toml").exists());
    assert!(dir.path().join("banks/example.toml").exists());

    // The generated bank must itself be valid.
    knowcheck()
        .current_dir(dir.path())
        .arg("validate")
        .arg("--bank")
        .arg("banks/example.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 questions"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    knowcheck()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    knowcheck()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn init_then_take_uses_config_bank() {
    let dir = TempDir::new().unwrap();

    knowcheck()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    knowcheck()
        .current_dir(dir.path())
        .arg("take")
        .arg("--typewriter-ms")
        .arg("0")
        .write_stdin(script(&['b', 'c']))
        .assert()
        .success()
        .stdout(predicate::str::contains("Example Knowledge Check"))
        .stdout(predicate::str::contains("2/2 correct (100%)"));

    assert!(dir.path().join("knowcheck-results").is_dir());
}

#[test]
fn compare_reports() {
    let dir = TempDir::new().unwrap();

    let baseline_path = dir.path().join("baseline.json");
    let current_path = dir.path().join("current.json");

    std::fs::write(&baseline_path, make_test_report(2, 2)).unwrap();
    std::fs::write(&current_path, make_test_report(2, 0)).unwrap();

    knowcheck()
        .arg("compare")
        .arg("--baseline")
        .arg(&baseline_path)
        .arg("--current")
        .arg(&current_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 regressions"))
        .stdout(predicate::str::contains("Prompt Design"));

    knowcheck()
        .arg("compare")
        .arg("--baseline")
        .arg(&baseline_path)
        .arg("--current")
        .arg(&current_path)
        .arg("--fail-on-regression")
        .assert()
        .failure();
}

#[test]
fn compare_nonexistent_report() {
    knowcheck()
        .arg("compare")
        .arg("--baseline")
        .arg("no_such_file.json")
        .arg("--current")
        .arg("also_no_file.json")
        .assert()
        .failure();
}

#[test]
fn help_output() {
    knowcheck()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("knowledge checks"));
}

#[test]
fn version_output() {
    knowcheck()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("knowcheck"));
}

/// Create a minimal JSON report with two categories of two questions each.
fn make_test_report(privacy_correct: usize, prompt_correct: usize) -> String {
    let correct = privacy_correct + prompt_correct;
    let percentage = (correct as f64 * 100.0 / 4.0).round() as u32;
    format!(
        r#"{{
    "id": "00000000-0000-0000-0000-000000000000",
    "created_at": "2025-01-01T00:00:00Z",
    "bank": {{
        "id": "test",
        "name": "Test",
        "question_count": 4
    }},
    "answers": [],
    "results": {{
        "correct": {correct},
        "total": 4,
        "unanswered": 0,
        "percentage": {percentage},
        "categories": [
            {{ "category": "Data Privacy", "correct": {privacy_correct}, "total": 2 }},
            {{ "category": "Prompt Design", "correct": {prompt_correct}, "total": 2 }}
        ],
        "outcomes": [],
        "remediation": []
    }},
    "pass_threshold": 70,
    "passed": false
}}"#
    )
}
