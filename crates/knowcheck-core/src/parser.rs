//! TOML question bank parser.
//!
//! Loads question banks from TOML files and directories, and validates them.
//! Hard invariant violations (see [`BankError`](crate::error::BankError))
//! fail the load; softer issues are reported by [`validate_bank`] as
//! warnings.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{AnswerOption, Category, ModuleRef, Question, QuestionBank};

/// Intermediate TOML structure for parsing bank files.
#[derive(Debug, Deserialize)]
struct TomlBankFile {
    bank: TomlBankHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlBankHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: u32,
    category: String,
    #[serde(default)]
    scenario: String,
    prompt: String,
    #[serde(default)]
    theory: String,
    #[serde(default)]
    feedback_correct: String,
    #[serde(default)]
    feedback_incorrect: String,
    module: TomlModule,
    #[serde(default)]
    options: Vec<TomlOption>,
}

#[derive(Debug, Deserialize)]
struct TomlModule {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlOption {
    id: char,
    text: String,
    #[serde(default)]
    correct: bool,
}

/// Parse a single TOML file into a `QuestionBank`.
pub fn parse_bank(path: &Path) -> Result<QuestionBank> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question bank: {}", path.display()))?;

    parse_bank_str(&content, path)
}

/// Parse a TOML string into a `QuestionBank` (useful for testing).
pub fn parse_bank_str(content: &str, source_path: &Path) -> Result<QuestionBank> {
    let parsed: TomlBankFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| Question {
            id: q.id,
            category: Category::new(q.category),
            scenario: q.scenario,
            prompt: q.prompt,
            options: q
                .options
                .into_iter()
                .map(|o| AnswerOption {
                    id: o.id.to_ascii_lowercase(),
                    text: o.text,
                    correct: o.correct,
                })
                .collect(),
            theory: q.theory,
            feedback_correct: q.feedback_correct,
            feedback_incorrect: q.feedback_incorrect,
            module: ModuleRef {
                title: if q.module.title.is_empty() {
                    q.module.id.clone()
                } else {
                    q.module.title
                },
                id: q.module.id,
                path: q.module.path,
            },
        })
        .collect();

    let categories = parsed
        .bank
        .categories
        .into_iter()
        .map(Category::new)
        .collect();

    QuestionBank::new(
        parsed.bank.id,
        parsed.bank.name,
        parsed.bank.description,
        categories,
        questions,
    )
    .with_context(|| format!("invalid question bank: {}", source_path.display()))
}

/// A bank file that could not be loaded.
#[derive(Debug)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub error: anyhow::Error,
}

/// Banks loaded from a directory, together with the files that failed.
#[derive(Debug, Default)]
pub struct DirectoryLoad {
    pub banks: Vec<QuestionBank>,
    pub failures: Vec<LoadFailure>,
}

/// Recursively load all `.toml` bank files from a directory, keeping the
/// error for every file that fails to parse.
pub fn load_bank_directory_checked(dir: &Path) -> Result<DirectoryLoad> {
    let mut loaded = DirectoryLoad::default();
    collect_bank_directory(dir, &mut loaded)?;
    Ok(loaded)
}

fn collect_bank_directory(dir: &Path, loaded: &mut DirectoryLoad) -> Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            collect_bank_directory(&path, loaded)?;
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_bank(&path) {
                Ok(bank) => loaded.banks.push(bank),
                Err(error) => loaded.failures.push(LoadFailure { path, error }),
            }
        }
    }

    Ok(())
}

/// Recursively load all `.toml` bank files from a directory, skipping
/// files that fail to parse.
pub fn load_bank_directory(dir: &Path) -> Result<Vec<QuestionBank>> {
    let loaded = load_bank_directory_checked(dir)?;
    for failure in &loaded.failures {
        tracing::warn!("skipping {}: {:#}", failure.path.display(), failure.error);
    }
    Ok(loaded.banks)
}

/// Load a bank file, or every bank under a directory.
pub fn load_banks(path: &Path) -> Result<Vec<QuestionBank>> {
    if path.is_dir() {
        load_bank_directory(path)
    } else {
        Ok(vec![parse_bank(path)?])
    }
}

/// Like [`load_banks`], but directory failures are returned instead of skipped.
pub fn load_banks_checked(path: &Path) -> Result<DirectoryLoad> {
    if path.is_dir() {
        load_bank_directory_checked(path)
    } else {
        Ok(DirectoryLoad {
            banks: vec![parse_bank(path)?],
            failures: Vec::new(),
        })
    }
}

/// A warning from bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<u32>,
    /// Warning message.
    pub message: String,
}

/// Validate a bank for issues that do not break the quiz.
pub fn validate_bank(bank: &QuestionBank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for question in bank.questions() {
        let warn = |message: String| ValidationWarning {
            question_id: Some(question.id),
            message,
        };

        if question.options.len() != 4 {
            warnings.push(warn(format!("expected 4 options, found {}", question.options.len())));
        }

        if question.scenario.trim().is_empty() {
            warnings.push(warn("scenario is empty".into()));
        }
        if question.prompt.trim().is_empty() {
            warnings.push(warn("prompt is empty".into()));
        }
        if question.feedback_correct.trim().is_empty() {
            warnings.push(warn("feedback_correct is empty".into()));
        }
        if question.feedback_incorrect.trim().is_empty() {
            warnings.push(warn("feedback_incorrect is empty".into()));
        }

        let mut seen_text = HashSet::new();
        for option in &question.options {
            if !seen_text.insert(option.text.trim()) {
                warnings.push(warn(format!(
                    "option '{}' repeats the text of an earlier option",
                    option.id
                )));
            }
        }
    }

    // Declared categories nobody uses
    for category in bank.categories() {
        if !bank.questions().iter().any(|q| &q.category == category) {
            warnings.push(ValidationWarning {
                question_id: None,
                message: format!("category '{category}' has no questions"),
            });
        }
    }

    warnings
}
