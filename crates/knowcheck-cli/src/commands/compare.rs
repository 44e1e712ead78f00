//! The `knowcheck compare` command.

use std::path::PathBuf;

use anyhow::Result;

use knowcheck_core::report::QuizReport;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: f64,
    fail_on_regression: bool,
    format: String,
) -> Result<()> {
    anyhow::ensure!(
        (0.0..=1.0).contains(&threshold),
        "threshold must be between 0.0 and 1.0"
    );

    let baseline = QuizReport::load_json(&baseline_path)?;
    let current = QuizReport::load_json(&current_path)?;

    if baseline.bank.id != current.bank.id {
        eprintln!(
            "Warning: comparing attempts from different banks ({} vs {})",
            baseline.bank.id, current.bank.id
        );
    }

    let report = current.compare(&baseline, threshold);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            // text format
            println!(
                "Overall: {}% -> {}% ({:+} pts)",
                report.baseline_percentage,
                report.current_percentage,
                report.overall_delta()
            );
            println!(
                "Comparison: {} regressions, {} improvements, {} unchanged",
                report.regressions.len(),
                report.improvements.len(),
                report.unchanged
            );

            if !report.regressions.is_empty() {
                println!("\nRegressions:");
                for r in &report.regressions {
                    println!(
                        "  {} {:.1}% -> {:.1}% ({:+.1}%)",
                        r.category,
                        r.baseline_score * 100.0,
                        r.current_score * 100.0,
                        r.delta * 100.0
                    );
                }
            }

            if !report.improvements.is_empty() {
                println!("\nImprovements:");
                for i in &report.improvements {
                    println!(
                        "  {} {:.1}% -> {:.1}% ({:+.1}%)",
                        i.category,
                        i.baseline_score * 100.0,
                        i.current_score * 100.0,
                        i.delta * 100.0
                    );
                }
            }

            if report.new_categories > 0 {
                println!("\n{} new categor(ies)", report.new_categories);
            }
            if report.removed_categories > 0 {
                println!("{} removed categor(ies)", report.removed_categories);
            }
        }
    }

    if fail_on_regression && report.has_regressions() {
        std::process::exit(1);
    }

    Ok(())
}
