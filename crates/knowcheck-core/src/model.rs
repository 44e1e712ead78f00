//! Core data model types for knowcheck.
//!
//! A [`QuestionBank`] is the fixed, ordered set of scenario questions shown to
//! every learner in the same sequence. Banks are only built through
//! [`QuestionBank::new`], so every bank in memory satisfies the structural
//! invariants (one correct option per question, unique ids, declared
//! categories).

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::BankError;

/// Label of a question category, one of the bank's declared set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Course module a learner is pointed to after missing a question.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleRef {
    /// Module identifier (e.g. "module-1").
    pub id: String,
    /// Human-readable module title.
    pub title: String,
    /// Optional link to the module page.
    #[serde(default)]
    pub path: Option<String>,
}

/// One selectable answer of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    /// Option letter (e.g. 'a').
    pub id: char,
    /// Display text.
    pub text: String,
    /// Whether this is the keyed answer.
    #[serde(default)]
    pub correct: bool,
}

/// A scenario-based multiple-choice question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Unique ordinal id within the bank.
    pub id: u32,
    /// Category label used for the results breakdown.
    pub category: Category,
    /// Scenario the question is set in.
    pub scenario: String,
    /// The question itself.
    pub prompt: String,
    /// Ordered answer options.
    pub options: Vec<AnswerOption>,
    /// Theory the question exercises.
    #[serde(default)]
    pub theory: String,
    /// Feedback shown after a correct answer.
    pub feedback_correct: String,
    /// Feedback shown after an incorrect answer.
    pub feedback_incorrect: String,
    /// Module to revisit when the question is missed.
    pub module: ModuleRef,
}

impl Question {
    /// Look up an option by its letter.
    pub fn option(&self, id: char) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.id == id)
    }

    /// The keyed answer. Always present for questions inside a bank.
    pub fn correct_option(&self) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.correct)
    }

    /// Whether choosing `id` answers this question correctly.
    ///
    /// Returns `None` if the question has no such option.
    pub fn is_correct(&self, id: char) -> Option<bool> {
        self.option(id).map(|o| o.correct)
    }

    /// Feedback text for the given outcome.
    pub fn feedback(&self, correct: bool) -> &str {
        if correct {
            &self.feedback_correct
        } else {
            &self.feedback_incorrect
        }
    }

    fn check(&self, categories: &[Category]) -> Result<(), BankError> {
        if self.options.len() < 2 {
            return Err(BankError::TooFewOptions {
                question_id: self.id,
                found: self.options.len(),
            });
        }

        let mut seen = HashSet::new();
        for option in &self.options {
            if !seen.insert(option.id) {
                return Err(BankError::DuplicateOption {
                    question_id: self.id,
                    option_id: option.id,
                });
            }
        }

        let correct = self.options.iter().filter(|o| o.correct).count();
        if correct != 1 {
            return Err(BankError::CorrectOptionCount {
                question_id: self.id,
                found: correct,
            });
        }

        if !categories.contains(&self.category) {
            return Err(BankError::UnknownCategory {
                question_id: self.id,
                category: self.category.to_string(),
            });
        }

        Ok(())
    }
}

/// A validated, ordered collection of questions.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionBank {
    /// Unique identifier for this bank.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Description of this bank.
    pub description: String,
    categories: Vec<Category>,
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Build a bank, checking every structural invariant.
    ///
    /// If `categories` is empty, the closed set is taken from the questions
    /// themselves in order of first appearance.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        categories: Vec<Category>,
        questions: Vec<Question>,
    ) -> Result<Self, BankError> {
        let id = id.into();
        if questions.is_empty() {
            return Err(BankError::Empty(id));
        }

        let categories = if categories.is_empty() {
            let mut derived: Vec<Category> = Vec::new();
            for q in &questions {
                if !derived.contains(&q.category) {
                    derived.push(q.category.clone());
                }
            }
            derived
        } else {
            categories
        };

        let mut seen = HashSet::new();
        for question in &questions {
            if !seen.insert(question.id) {
                return Err(BankError::DuplicateQuestion(question.id));
            }
            question.check(&categories)?;
        }

        Ok(Self {
            id,
            name: name.into(),
            description: description.into(),
            categories,
            questions,
        })
    }

    /// The declared category set, in declaration order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// All questions, in presentation order.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// The question at a 0-based position.
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Look up a question by id.
    pub fn find(&self, id: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always `false` for a constructed bank; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
