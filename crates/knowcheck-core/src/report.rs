//! Quiz report types with JSON persistence and attempt comparison.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::QuestionBank;
use crate::scoring::{score, QuizResults};
use crate::session::{AnswerRecord, Session};

/// A completed quiz attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the question bank.
    pub bank: BankSummary,
    /// Confirmed answers, in order.
    pub answers: Vec<AnswerRecord>,
    /// Scored results.
    pub results: QuizResults,
    /// Percentage needed to pass.
    pub pass_threshold: u32,
    /// Whether the attempt reached the threshold.
    pub passed: bool,
}

/// Summary of a question bank (without the questions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankSummary {
    pub id: String,
    pub name: String,
    pub question_count: usize,
}

impl QuizReport {
    /// Build a report from a session's log.
    pub fn from_session(bank: &QuestionBank, session: &Session, pass_threshold: u32) -> Self {
        let results = score(bank, session.log());
        let passed = results.passed(pass_threshold);
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            bank: BankSummary {
                id: bank.id.clone(),
                name: bank.name.clone(),
                question_count: bank.len(),
            },
            answers: session.log().to_vec(),
            results,
            pass_threshold,
            passed,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: QuizReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare this attempt against an earlier one, category by category.
    ///
    /// A category counts as changed when its ratio moves by more than
    /// `threshold` (0.0 to 1.0).
    pub fn compare(&self, baseline: &QuizReport, threshold: f64) -> ProgressReport {
        let ratios = |report: &QuizReport| -> HashMap<String, f64> {
            report
                .results
                .categories
                .iter()
                .map(|c| (c.category.to_string(), c.ratio()))
                .collect()
        };

        let baseline_ratios = ratios(baseline);

        let mut regressions = Vec::new();
        let mut improvements = Vec::new();
        let mut unchanged = 0usize;
        let mut new_categories = 0usize;

        // Walk the current categories in bank order so output is stable.
        for category in &self.results.categories {
            let label = category.category.to_string();
            let current = category.ratio();
            let Some(&before) = baseline_ratios.get(&label) else {
                new_categories += 1;
                continue;
            };
            let delta = current - before;
            let entry = CategoryDelta {
                category: label,
                baseline_score: before,
                current_score: current,
                delta,
            };
            if delta < -threshold {
                regressions.push(entry);
            } else if delta > threshold {
                improvements.push(entry);
            } else {
                unchanged += 1;
            }
        }

        let removed_categories = baseline
            .results
            .categories
            .iter()
            .filter(|b| {
                !self
                    .results
                    .categories
                    .iter()
                    .any(|c| c.category == b.category)
            })
            .count();

        ProgressReport {
            baseline_percentage: baseline.results.percentage,
            current_percentage: self.results.percentage,
            regressions,
            improvements,
            unchanged,
            new_categories,
            removed_categories,
        }
    }
}

/// Result of comparing two attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressReport {
    pub baseline_percentage: u32,
    pub current_percentage: u32,
    /// Categories where the score went down.
    pub regressions: Vec<CategoryDelta>,
    /// Categories where the score went up.
    pub improvements: Vec<CategoryDelta>,
    /// Categories with no significant change.
    pub unchanged: usize,
    /// Categories in current but not baseline.
    pub new_categories: usize,
    /// Categories in baseline but not current.
    pub removed_categories: usize,
}

/// Score change for one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDelta {
    pub category: String,
    pub baseline_score: f64,
    pub current_score: f64,
    pub delta: f64,
}

impl ProgressReport {
    /// Overall change in percentage points.
    pub fn overall_delta(&self) -> i64 {
        i64::from(self.current_percentage) - i64::from(self.baseline_percentage)
    }

    /// Format the progress report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Overall:** {}% -> {}% ({:+} pts)\n\n",
            self.baseline_percentage,
            self.current_percentage,
            self.overall_delta()
        ));
        md.push_str(&format!(
            "**Summary:** {} regressions, {} improvements, {} unchanged\n\n",
            self.regressions.len(),
            self.improvements.len(),
            self.unchanged
        ));

        for (title, rows) in [
            ("Regressions", &self.regressions),
            ("Improvements", &self.improvements),
        ] {
            if rows.is_empty() {
                continue;
            }
            md.push_str(&format!("### {title}\n\n"));
            md.push_str("| Category | Baseline | Current | Delta |\n");
            md.push_str("|----------|----------|---------|-------|\n");
            for d in rows {
                md.push_str(&format!(
                    "| {} | {:.1}% | {:.1}% | {:+.1}% |\n",
                    d.category,
                    d.baseline_score * 100.0,
                    d.current_score * 100.0,
                    d.delta * 100.0
                ));
            }
            md.push('\n');
        }

        md
    }

    /// Returns true if any category got worse.
    pub fn has_regressions(&self) -> bool {
        !self.regressions.is_empty()
    }
}
