//! The `knowcheck take` command.
//!
//! Reads one command per stdin line and feeds it to the quiz controller.
//! Rendering only ever reads the controller's snapshot.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use knowcheck_core::controller::{QuizController, SessionObserver, Snapshot};
use knowcheck_core::model::Question;
use knowcheck_core::parser;
use knowcheck_core::report::QuizReport;
use knowcheck_core::scoring::QuizResults;
use knowcheck_core::session::{AnswerRecord, Event, Phase};
use knowcheck_report::html::write_html_report;

use crate::config::load_config_from;

/// A parsed input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Event(Event),
    Quit,
}

/// Map one input line to a command for the current phase.
///
/// Any single character selects the option with that id, so banks keyed
/// on digits work the same as lettered ones. An empty line confirms while
/// answering and advances while feedback is showing.
pub fn parse_command(input: &str, phase: Phase) -> Option<Command> {
    let input = input.trim().to_ascii_lowercase();
    match input.as_str() {
        "quit" | "exit" => Some(Command::Quit),
        "retake" => Some(Command::Event(Event::Retake)),
        "confirm" | "ok" => Some(Command::Event(Event::Confirm)),
        "next" => Some(Command::Event(Event::Advance)),
        "" => match phase {
            Phase::Answering => Some(Command::Event(Event::Confirm)),
            Phase::Revealed => Some(Command::Event(Event::Advance)),
            Phase::Complete => None,
        },
        s => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(Command::Event(Event::Select(c))),
                _ => None,
            }
        }
    }
}

fn hint(phase: Phase) -> &'static str {
    match phase {
        Phase::Answering => "Type an option letter to choose, then press Enter to confirm.",
        Phase::Revealed => "Press Enter (or type `next`) to continue.",
        Phase::Complete => "Type `retake` to try again or `quit` to exit.",
    }
}

/// Progress notes on stderr.
struct ConsoleObserver {
    total: usize,
    answered: AtomicUsize,
}

impl SessionObserver for ConsoleObserver {
    fn on_selection(&self, _: u32, _: char) {}

    fn on_answer(&self, _: &Question, _: &AnswerRecord) {
        let answered = self.answered.fetch_add(1, Ordering::Relaxed) + 1;
        eprintln!("  [{answered}/{} answered]", self.total);
    }

    fn on_complete(&self, results: &QuizResults) {
        eprintln!("  [complete: {}/{}]", results.correct, results.total);
    }

    fn on_retake(&self) {
        self.answered.store(0, Ordering::Relaxed);
        eprintln!("  [starting over]");
    }
}

fn render_question(snap: &Snapshot<'_>) -> String {
    let Some(question) = snap.question else {
        return String::new();
    };

    let mut out = format!(
        "\nQuestion {}/{} [{}]\n\n",
        snap.position, snap.total, question.category
    );
    if !question.scenario.is_empty() {
        out.push_str(&format!("Scenario: {}\n\n", question.scenario));
    }
    out.push_str(&format!("{}\n", question.prompt));
    for option in &question.options {
        let marker = if snap.pending == Some(option.id) {
            '>'
        } else {
            ' '
        };
        out.push_str(&format!("{marker} ({}) {}\n", option.id, option.text));
    }
    out
}

fn render_verdict(snap: &Snapshot<'_>) -> Option<String> {
    let feedback = snap.feedback.as_ref()?;
    Some(if feedback.correct {
        "Correct!".to_string()
    } else {
        format!(
            "Incorrect. You chose ({}); the answer was ({}).",
            feedback.chosen, feedback.expected
        )
    })
}

fn render_dashboard(report: &QuizReport) -> String {
    use comfy_table::{Cell, Table};

    let results = &report.results;
    let verdict = if report.passed { "PASSED" } else { "NEEDS REVIEW" };

    let mut out = format!(
        "\nResults: {}/{} correct ({}%) - {verdict}\n",
        results.correct, results.total, results.percentage
    );

    let mut table = Table::new();
    table.set_header(vec!["Category", "Correct", "Total", "Score"]);
    for category in &results.categories {
        table.add_row(vec![
            Cell::new(&category.category),
            Cell::new(category.correct),
            Cell::new(category.total),
            Cell::new(format!("{:.0}%", category.ratio() * 100.0)),
        ]);
    }
    out.push_str(&format!("{table}\n"));

    if !results.remediation.is_empty() {
        out.push_str("\nReview:\n");
        for module in &results.remediation {
            match &module.path {
                Some(path) => out.push_str(&format!("  - {} ({path})\n", module.title)),
                None => out.push_str(&format!("  - {}\n", module.title)),
            }
        }
    }
    out
}

/// Print text one character at a time. A zero delay prints it at once.
async fn typewrite(text: &str, delay_ms: u64) -> Result<()> {
    let mut stdout = std::io::stdout();
    if delay_ms == 0 {
        writeln!(stdout, "{text}")?;
        return Ok(());
    }
    for ch in text.chars() {
        write!(stdout, "{ch}")?;
        stdout.flush()?;
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
    writeln!(stdout)?;
    Ok(())
}

fn save_reports(report: &QuizReport, output: &Path, formats: &[String]) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output)
        .with_context(|| format!("failed to create output directory: {}", output.display()))?;

    let stem = format!(
        "report-{}-{}",
        report.created_at.format("%Y-%m-%dT%H%M%S"),
        &report.id.simple().to_string()[..8]
    );

    let mut written = Vec::new();
    for fmt in formats {
        match fmt.as_str() {
            "json" => {
                let path = output.join(format!("{stem}.json"));
                report.save_json(&path)?;
                written.push(path);
            }
            "html" => {
                let path = output.join(format!("{stem}.html"));
                write_html_report(report, &path)?;
                written.push(path);
            }
            other => eprintln!("Unknown format: {other}"),
        }
    }
    Ok(written)
}

fn parse_formats(format: &str) -> Vec<String> {
    if format == "all" {
        vec!["json".into(), "html".into()]
    } else {
        format
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

pub async fn execute(
    bank_path: Option<PathBuf>,
    output: Option<PathBuf>,
    format: Option<String>,
    typewriter_ms: Option<u64>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let bank_path = bank_path.or(config.bank.clone()).ok_or_else(|| {
        anyhow::anyhow!("no question bank given; pass --bank or set `bank` in knowcheck.toml")
    })?;
    let output = output.unwrap_or(config.output_dir.clone());
    let formats = match &format {
        Some(f) => parse_formats(f),
        None => config.formats.clone(),
    };
    let delay_ms = typewriter_ms.unwrap_or(config.typewriter_ms);

    let bank = parser::parse_bank(&bank_path)?;
    for w in parser::validate_bank(&bank) {
        match w.question_id {
            Some(id) => tracing::warn!("question {id}: {}", w.message),
            None => tracing::warn!("{}", w.message),
        }
    }

    println!("{}", bank.name);
    if !bank.description.is_empty() {
        println!("{}", bank.description);
    }
    println!(
        "{} questions. Type an option letter to choose, Enter to confirm, `quit` to leave.",
        bank.len()
    );

    let observer = ConsoleObserver {
        total: bank.len(),
        answered: AtomicUsize::new(0),
    };
    let mut controller = QuizController::new(bank).with_observer(Box::new(observer));

    print!("{}", render_question(&controller.snapshot()));
    std::io::stdout().flush()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let phase = controller.session().phase();
        let command = match parse_command(&line, phase) {
            Some(Command::Quit) => {
                println!("Leaving the knowledge check.");
                return Ok(());
            }
            Some(Command::Event(event)) => event,
            None => {
                println!("{}", hint(phase));
                continue;
            }
        };

        if !controller.dispatch(command) {
            println!("{}", hint(phase));
            continue;
        }

        let snap = controller.snapshot();
        match (command, snap.phase) {
            (Event::Select(option_id), _) => {
                println!("Selected ({option_id}). Press Enter to confirm, or pick another.");
            }
            (Event::Confirm, Phase::Revealed) => {
                if let (Some(verdict), Some(feedback)) = (render_verdict(&snap), &snap.feedback) {
                    println!("\n{verdict}");
                    typewrite(feedback.text, delay_ms).await?;
                    if config.show_theory && !feedback.theory.is_empty() {
                        println!("Theory: {}", feedback.theory);
                    }
                }
                println!("{}", hint(Phase::Revealed));
            }
            (_, Phase::Complete) => {
                let report = QuizReport::from_session(
                    controller.bank(),
                    controller.session(),
                    config.pass_threshold,
                );
                print!("{}", render_dashboard(&report));
                for path in save_reports(&report, &output, &formats)? {
                    println!("Report saved to: {}", path.display());
                }
                println!("{}", hint(Phase::Complete));
            }
            _ => print!("{}", render_question(&snap)),
        }
        std::io::stdout().flush()?;
    }

    if !controller.session().is_complete() {
        println!("\nInput ended before the check was finished; this attempt was not saved.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use knowcheck_core::model::{AnswerOption, Category, ModuleRef, QuestionBank};

    fn bank() -> QuestionBank {
        QuestionBank::new(
            "t",
            "T",
            "",
            vec![],
            vec![Question {
                id: 1,
                category: Category::new("Data Privacy"),
                scenario: "A district pilot".into(),
                prompt: "Pick one".into(),
                options: vec![
                    AnswerOption {
                        id: 'a',
                        text: "Cloud".into(),
                        correct: false,
                    },
                    AnswerOption {
                        id: 'b',
                        text: "Local".into(),
                        correct: true,
                    },
                ],
                theory: "Local-First".into(),
                feedback_correct: "Yes".into(),
                feedback_incorrect: "No".into(),
                module: ModuleRef {
                    id: "m1".into(),
                    title: "Module 1".into(),
                    path: Some("/module-1".into()),
                },
            }],
        )
        .unwrap()
    }

    #[test]
    fn parse_letters_and_words() {
        assert_eq!(
            parse_command("B", Phase::Answering),
            Some(Command::Event(Event::Select('b')))
        );
        assert_eq!(
            parse_command("  confirm ", Phase::Answering),
            Some(Command::Event(Event::Confirm))
        );
        assert_eq!(
            parse_command("next", Phase::Revealed),
            Some(Command::Event(Event::Advance))
        );
        assert_eq!(
            parse_command("retake", Phase::Complete),
            Some(Command::Event(Event::Retake))
        );
        assert_eq!(parse_command("quit", Phase::Answering), Some(Command::Quit));
        assert_eq!(parse_command("abc", Phase::Answering), None);
    }

    #[test]
    fn digit_option_ids_are_selectable() {
        let bank = parser::parse_bank_str(
            r#"
[bank]
id = "numbered"
name = "Numbered"

[[questions]]
id = 1
category = "General"
prompt = "Pick one"
module = { id = "m1" }

[[questions.options]]
id = "1"
text = "First"

[[questions.options]]
id = "2"
text = "Second"
correct = true
"#,
            Path::new("numbered.toml"),
        )
        .unwrap();

        let Some(Command::Event(event)) = parse_command("2", Phase::Answering) else {
            panic!("digit did not parse as a selection");
        };
        let mut controller = QuizController::new(bank);
        assert!(controller.dispatch(event));
        assert!(controller.confirm_answer());
        assert!(controller.snapshot().feedback.unwrap().correct);
    }

    #[test]
    fn empty_line_depends_on_phase() {
        assert_eq!(
            parse_command("", Phase::Answering),
            Some(Command::Event(Event::Confirm))
        );
        assert_eq!(
            parse_command("", Phase::Revealed),
            Some(Command::Event(Event::Advance))
        );
        assert_eq!(parse_command("", Phase::Complete), None);
    }

    #[test]
    fn question_render_marks_pending_option() {
        let mut controller = QuizController::new(bank());
        controller.select_option('b');
        let text = render_question(&controller.snapshot());
        assert!(text.contains("Question 1/1 [Data Privacy]"));
        assert!(text.contains("Scenario: A district pilot"));
        assert!(text.contains("> (b) Local"));
        assert!(text.contains("  (a) Cloud"));
    }

    #[test]
    fn verdict_names_expected_option() {
        let mut controller = QuizController::new(bank());
        controller.select_option('a');
        controller.confirm_answer();
        let verdict = render_verdict(&controller.snapshot()).unwrap();
        assert!(verdict.contains("the answer was (b)"));
    }

    #[test]
    fn dashboard_lists_categories_and_remediation() {
        let mut controller = QuizController::new(bank());
        controller.select_option('a');
        controller.confirm_answer();
        controller.advance();
        let report = QuizReport::from_session(controller.bank(), controller.session(), 70);
        let text = render_dashboard(&report);
        assert!(text.contains("0/1 correct (0%)"));
        assert!(text.contains("NEEDS REVIEW"));
        assert!(text.contains("Data Privacy"));
        assert!(text.contains("Module 1 (/module-1)"));
    }

    #[test]
    fn formats_expand_all() {
        assert_eq!(parse_formats("all"), vec!["json", "html"]);
        assert_eq!(parse_formats("json, html"), vec!["json", "html"]);
    }

    #[test]
    fn save_reports_writes_requested_formats() {
        let mut controller = QuizController::new(bank());
        controller.select_option('b');
        controller.confirm_answer();
        controller.advance();
        let report = QuizReport::from_session(controller.bank(), controller.session(), 70);

        let dir = tempfile::tempdir().unwrap();
        let written = save_reports(&report, dir.path(), &parse_formats("all")).unwrap();
        assert_eq!(written.len(), 2);
        assert!(written.iter().all(|p| p.exists()));
    }

    #[tokio::test(start_paused = true)]
    async fn typewriter_finishes_under_paused_clock() {
        typewrite("ok", 50).await.unwrap();
        typewrite("instant", 0).await.unwrap();
    }
}
