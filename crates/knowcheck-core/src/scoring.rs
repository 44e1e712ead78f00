//! Results scoring and category breakdown.
//!
//! Scores are always recomputed from the answer log; nothing is tallied
//! incrementally. Questions with no record in the log (a sparse log) are
//! scored as incorrect and counted as unanswered.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{Category, ModuleRef, QuestionBank};
use crate::session::AnswerRecord;

/// Outcome of one bank question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub question_id: u32,
    pub category: Category,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub theory: String,
    /// The confirmed option, or `None` if the log has no record.
    pub chosen: Option<char>,
    /// The keyed option.
    pub expected: char,
    pub correct: bool,
}

/// Correct and total counts for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: Category,
    pub correct: usize,
    pub total: usize,
}

impl CategoryScore {
    /// Fraction correct, 0.0 to 1.0.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

/// Aggregate results for a quiz attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResults {
    pub correct: usize,
    pub total: usize,
    /// Questions with no answer record.
    pub unanswered: usize,
    /// `round(100 * correct / total)`.
    pub percentage: u32,
    /// One entry per category with questions, in the bank's category order.
    pub categories: Vec<CategoryScore>,
    /// One entry per bank question, in bank order.
    pub outcomes: Vec<QuestionOutcome>,
    /// Modules to revisit for missed questions, deduplicated, in bank order.
    pub remediation: Vec<ModuleRef>,
}

impl QuizResults {
    pub fn passed(&self, threshold: u32) -> bool {
        self.percentage >= threshold
    }

    /// Score for a single category.
    pub fn category(&self, label: &str) -> Option<&CategoryScore> {
        self.categories.iter().find(|c| c.category.as_str() == label)
    }
}

/// Round `100 * correct / total` to the nearest whole percent.
pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (100.0 * correct as f64 / total as f64).round() as u32
}

/// Score an answer log against a bank.
///
/// Records for questions not in the bank are ignored. If a question has more
/// than one record, the first one counts.
pub fn score(bank: &QuestionBank, log: &[AnswerRecord]) -> QuizResults {
    let mut by_question: HashMap<u32, &AnswerRecord> = HashMap::new();
    for record in log {
        by_question.entry(record.question_id).or_insert(record);
    }

    let mut outcomes = Vec::with_capacity(bank.len());
    let mut categories: Vec<CategoryScore> = bank
        .categories()
        .iter()
        .map(|category| CategoryScore {
            category: category.clone(),
            correct: 0,
            total: 0,
        })
        .collect();
    let mut remediation: Vec<ModuleRef> = Vec::new();

    for question in bank.questions() {
        let record = by_question.get(&question.id);
        let correct = record.is_some_and(|r| r.correct);
        let expected = question.correct_option().map(|o| o.id).unwrap_or('?');

        match categories
            .iter_mut()
            .find(|c| c.category == question.category)
        {
            Some(entry) => {
                entry.total += 1;
                entry.correct += usize::from(correct);
            }
            None => categories.push(CategoryScore {
                category: question.category.clone(),
                correct: usize::from(correct),
                total: 1,
            }),
        }

        if !correct && !remediation.contains(&question.module) {
            remediation.push(question.module.clone());
        }

        outcomes.push(QuestionOutcome {
            question_id: question.id,
            category: question.category.clone(),
            prompt: question.prompt.clone(),
            theory: question.theory.clone(),
            chosen: record.map(|r| r.option_id),
            expected,
            correct,
        });
    }

    // Declared categories with no questions have nothing to score.
    categories.retain(|c| c.total > 0);

    let total = bank.len();
    let correct = outcomes.iter().filter(|o| o.correct).count();
    let unanswered = outcomes.iter().filter(|o| o.chosen.is_none()).count();

    QuizResults {
        correct,
        total,
        unanswered,
        percentage: percentage(correct, total),
        categories,
        outcomes,
        remediation,
    }
}
