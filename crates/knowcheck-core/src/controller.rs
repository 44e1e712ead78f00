//! Quiz controller.
//!
//! Owns a [`QuestionBank`] and the single [`Session`] over it, dispatches user
//! actions through the pure state machine, and notifies a
//! [`SessionObserver`]. Out-of-sequence actions are silent no-ops; they are
//! only traced at debug level.

use crate::model::{Question, QuestionBank};
use crate::scoring::{score, QuizResults};
use crate::session::{AnswerRecord, Event, Phase, Session};

/// Hooks fired after state-changing actions.
pub trait SessionObserver: Send + Sync {
    fn on_selection(&self, question_id: u32, option_id: char);
    fn on_answer(&self, question: &Question, record: &AnswerRecord);
    fn on_complete(&self, results: &QuizResults);
    fn on_retake(&self);
}

/// No-op observer.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_selection(&self, _: u32, _: char) {}
    fn on_answer(&self, _: &Question, _: &AnswerRecord) {}
    fn on_complete(&self, _: &QuizResults) {}
    fn on_retake(&self) {}
}

/// Feedback for the revealed question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback<'a> {
    pub correct: bool,
    pub chosen: char,
    pub expected: char,
    pub text: &'a str,
    pub theory: &'a str,
}

/// Read-only view of the controller for a presentation layer.
#[derive(Debug, Clone)]
pub struct Snapshot<'a> {
    pub phase: Phase,
    /// 1-based position of the current question.
    pub position: usize,
    pub total: usize,
    pub question: Option<&'a Question>,
    pub pending: Option<char>,
    pub feedback: Option<Feedback<'a>>,
    pub results: Option<QuizResults>,
}

/// Drives one learner through a bank.
pub struct QuizController {
    bank: QuestionBank,
    session: Session,
    observer: Box<dyn SessionObserver>,
}

impl QuizController {
    pub fn new(bank: QuestionBank) -> Self {
        Self {
            bank,
            session: Session::new(),
            observer: Box::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn select_option(&mut self, option_id: char) -> bool {
        self.dispatch(Event::Select(option_id))
    }

    pub fn confirm_answer(&mut self) -> bool {
        self.dispatch(Event::Confirm)
    }

    pub fn advance(&mut self) -> bool {
        self.dispatch(Event::Advance)
    }

    pub fn retake(&mut self) -> bool {
        self.dispatch(Event::Retake)
    }

    /// Apply an event. Returns `false` if it was ignored.
    pub fn dispatch(&mut self, event: Event) -> bool {
        let session = std::mem::take(&mut self.session);
        let transition = session.apply(&self.bank, event);
        self.session = transition.session;

        if let Some(reason) = transition.ignored {
            tracing::debug!(?event, %reason, "ignored quiz event");
            return false;
        }

        match event {
            Event::Select(option_id) => {
                if let Some(question) = self.session.current_question(&self.bank) {
                    self.observer.on_selection(question.id, option_id);
                }
            }
            Event::Confirm => {
                if let (Some(question), Some(record)) = (
                    self.session.current_question(&self.bank),
                    self.session.current_record(),
                ) {
                    tracing::debug!(
                        question = question.id,
                        option = %record.option_id,
                        correct = record.correct,
                        "answer confirmed"
                    );
                    self.observer.on_answer(question, record);
                }
            }
            Event::Advance => {
                if self.session.is_complete() {
                    let results = self.results();
                    tracing::info!(
                        bank = %self.bank.id,
                        correct = results.correct,
                        total = results.total,
                        "quiz complete"
                    );
                    self.observer.on_complete(&results);
                }
            }
            Event::Retake => self.observer.on_retake(),
        }

        true
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Results recomputed from the current log.
    pub fn results(&self) -> QuizResults {
        score(&self.bank, self.session.log())
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        let question = self.session.current_question(&self.bank);

        let feedback = match (question, self.session.current_record()) {
            (Some(q), Some(record)) => Some(Feedback {
                correct: record.correct,
                chosen: record.option_id,
                expected: q.correct_option().map(|o| o.id).unwrap_or('?'),
                text: q.feedback(record.correct),
                theory: &q.theory,
            }),
            _ => None,
        };

        let results = self.session.is_complete().then(|| self.results());

        Snapshot {
            phase: self.session.phase(),
            position: self.session.index() + 1,
            total: self.bank.len(),
            question,
            pending: self.session.pending(),
            feedback,
            results,
        }
    }
}
