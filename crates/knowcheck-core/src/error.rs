//! Question bank error types.
//!
//! These errors represent violations of the bank invariants that are checked
//! once, when a bank is constructed. The quiz session itself never errors.

use thiserror::Error;

/// Errors raised when a question bank violates a structural invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankError {
    /// The bank has no questions.
    #[error("question bank '{0}' has no questions")]
    Empty(String),

    /// Two questions share the same id.
    #[error("duplicate question id: {0}")]
    DuplicateQuestion(u32),

    /// Two options of the same question share the same id.
    #[error("question {question_id}: duplicate option id '{option_id}'")]
    DuplicateOption { question_id: u32, option_id: char },

    /// A question offers fewer than two options.
    #[error("question {question_id}: expected at least 2 options, found {found}")]
    TooFewOptions { question_id: u32, found: usize },

    /// A question does not have exactly one correct option.
    #[error("question {question_id}: expected exactly one correct option, found {found}")]
    CorrectOptionCount { question_id: u32, found: usize },

    /// A question uses a category the bank does not declare.
    #[error("question {question_id}: unknown category '{category}'")]
    UnknownCategory { question_id: u32, category: String },
}

impl BankError {
    /// The question the error refers to, if any.
    pub fn question_id(&self) -> Option<u32> {
        match self {
            BankError::Empty(_) => None,
            BankError::DuplicateQuestion(id) => Some(*id),
            BankError::DuplicateOption { question_id, .. }
            | BankError::TooFewOptions { question_id, .. }
            | BankError::CorrectOptionCount { question_id, .. }
            | BankError::UnknownCategory { question_id, .. } => Some(*question_id),
        }
    }
}
