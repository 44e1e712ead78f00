//! Pure quiz session state machine.
//!
//! A [`Session`] moves through `Answering(i) -> Revealed(i) -> Answering(i+1)
//! ... -> Complete`. [`Session::apply`] is a pure `(state, event) -> state`
//! function over a borrowed [`QuestionBank`]; it never fails. Events that do
//! not fit the current phase are ignored and the reason is reported back in
//! the [`Transition`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{Question, QuestionBank};

/// One confirmed response. Correctness is fixed when the record is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: u32,
    pub option_id: char,
    pub correct: bool,
}

/// Where the session is in the answer/reveal cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Answering,
    Revealed,
    Complete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Answering => write!(f, "answering"),
            Phase::Revealed => write!(f, "revealed"),
            Phase::Complete => write!(f, "complete"),
        }
    }
}

/// A user action dispatched to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Tentatively choose an option of the current question.
    Select(char),
    /// Commit the pending selection and reveal feedback.
    Confirm,
    /// Move past the revealed question.
    Advance,
    /// Discard everything and start over.
    Retake,
}

/// Why an event left the session untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Select or confirm outside `Answering`.
    NotAnswering(Phase),
    /// Advance outside `Revealed`.
    NotRevealed(Phase),
    /// Confirm without a pending selection.
    NoPendingSelection,
    /// Select with a letter the current question does not offer.
    UnknownOption(char),
    /// The session index points past the end of the bank.
    NoQuestion(usize),
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::NotAnswering(phase) => write!(f, "not answering (phase: {phase})"),
            IgnoreReason::NotRevealed(phase) => write!(f, "not revealed (phase: {phase})"),
            IgnoreReason::NoPendingSelection => write!(f, "no pending selection"),
            IgnoreReason::UnknownOption(id) => write!(f, "unknown option '{id}'"),
            IgnoreReason::NoQuestion(index) => write!(f, "no question at index {index}"),
        }
    }
}

/// Result of applying one event.
#[derive(Debug, Clone)]
pub struct Transition {
    /// The session after the event.
    pub session: Session,
    /// Set when the event was a no-op.
    pub ignored: Option<IgnoreReason>,
}

impl Transition {
    fn applied(session: Session) -> Self {
        Self {
            session,
            ignored: None,
        }
    }

    fn ignored(session: Session, reason: IgnoreReason) -> Self {
        Self {
            session,
            ignored: Some(reason),
        }
    }

    pub fn is_applied(&self) -> bool {
        self.ignored.is_none()
    }
}

/// Transient, process-local quiz state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    index: usize,
    pending: Option<char>,
    phase: Phase,
    log: Vec<AnswerRecord>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A fresh session in `Answering(0)`.
    pub fn new() -> Self {
        Self {
            index: 0,
            pending: None,
            phase: Phase::Answering,
            log: Vec::new(),
        }
    }

    /// Apply one event.
    pub fn apply(self, bank: &QuestionBank, event: Event) -> Transition {
        match event {
            Event::Select(option_id) => self.select(bank, option_id),
            Event::Confirm => self.confirm(bank),
            Event::Advance => self.advance(bank),
            Event::Retake => Transition::applied(Session::new()),
        }
    }

    fn select(mut self, bank: &QuestionBank, option_id: char) -> Transition {
        if self.phase != Phase::Answering {
            let phase = self.phase;
            return Transition::ignored(self, IgnoreReason::NotAnswering(phase));
        }
        let Some(question) = bank.get(self.index) else {
            let index = self.index;
            return Transition::ignored(self, IgnoreReason::NoQuestion(index));
        };
        if question.option(option_id).is_none() {
            return Transition::ignored(self, IgnoreReason::UnknownOption(option_id));
        }
        self.pending = Some(option_id);
        Transition::applied(self)
    }

    fn confirm(mut self, bank: &QuestionBank) -> Transition {
        if self.phase != Phase::Answering {
            let phase = self.phase;
            return Transition::ignored(self, IgnoreReason::NotAnswering(phase));
        }
        let Some(option_id) = self.pending else {
            return Transition::ignored(self, IgnoreReason::NoPendingSelection);
        };
        let Some(question) = bank.get(self.index) else {
            let index = self.index;
            return Transition::ignored(self, IgnoreReason::NoQuestion(index));
        };
        let Some(correct) = question.is_correct(option_id) else {
            return Transition::ignored(self, IgnoreReason::UnknownOption(option_id));
        };

        self.log.push(AnswerRecord {
            question_id: question.id,
            option_id,
            correct,
        });
        self.pending = None;
        self.phase = Phase::Revealed;
        Transition::applied(self)
    }

    fn advance(mut self, bank: &QuestionBank) -> Transition {
        if self.phase != Phase::Revealed {
            let phase = self.phase;
            return Transition::ignored(self, IgnoreReason::NotRevealed(phase));
        }
        if self.index + 1 >= bank.len() {
            self.phase = Phase::Complete;
        } else {
            self.index += 1;
            self.pending = None;
            self.phase = Phase::Answering;
        }
        Transition::applied(self)
    }

    /// 0-based index of the current (or last) question.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Option chosen but not yet confirmed.
    pub fn pending(&self) -> Option<char> {
        self.pending
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Confirmed answers, in order.
    pub fn log(&self) -> &[AnswerRecord] {
        &self.log
    }

    /// Whether feedback for the current question is showing.
    pub fn revealed(&self) -> bool {
        self.phase == Phase::Revealed
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    /// The question being answered or revealed; `None` once complete.
    pub fn current_question<'a>(&self, bank: &'a QuestionBank) -> Option<&'a Question> {
        if self.is_complete() {
            None
        } else {
            bank.get(self.index)
        }
    }

    /// The record for the current question, once revealed.
    pub fn current_record(&self) -> Option<&AnswerRecord> {
        if self.revealed() {
            self.log.last()
        } else {
            None
        }
    }
}
