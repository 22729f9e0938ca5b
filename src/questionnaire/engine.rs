use super::catalog::QUESTIONS;
use crate::error::{FormField, ValidationError};
use crate::session::{AnswerSet, SessionStore};
use serde::Serialize;
use std::time::Duration;

/// Pause between answering and moving to the next question
pub const ADVANCE_DELAY: Duration = Duration::from_millis(300);

/// Instruction to move past `from` once `delay` has elapsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Advance {
    pub from: usize,
    #[serde(with = "millis")]
    pub delay: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    pub index: usize,
    pub value: bool,
    /// `None` when the answered question is the last one
    pub advance: Option<Advance>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextOutcome {
    Moved { index: usize },
    /// Answers were written to the session; the flow continues at upload
    Completed(AnswerSet),
}

/// Walks the question catalog one entry at a time
#[derive(Debug, Clone)]
pub struct QuestionnaireEngine {
    catalog: &'static [&'static str],
    current: usize,
    answered: Vec<bool>,
    values: Vec<bool>,
    advance_delay: Duration,
}

impl Default for QuestionnaireEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionnaireEngine {
    pub fn new() -> Self {
        Self::with_catalog(&QUESTIONS)
    }

    /// Engine over a custom catalog; an empty catalog is a programming error
    pub fn with_catalog(catalog: &'static [&'static str]) -> Self {
        assert!(!catalog.is_empty(), "question catalog must not be empty");
        Self {
            catalog,
            current: 0,
            answered: vec![false; catalog.len()],
            values: vec![false; catalog.len()],
            advance_delay: ADVANCE_DELAY,
        }
    }

    /// Start from the session, picking up a previously finalized answer set
    pub fn resume(store: &SessionStore) -> Self {
        Self::resume_with_catalog(store, &QUESTIONS)
    }

    pub fn resume_with_catalog(store: &SessionStore, catalog: &'static [&'static str]) -> Self {
        let mut engine = Self::with_catalog(catalog);
        if let Some(previous) = store.answers() {
            if previous.len() == catalog.len() {
                engine.values = previous.values();
                engine.answered = vec![true; catalog.len()];
                tracing::debug!("[Questionnaire] Resumed {} saved answers", catalog.len());
            }
        }
        engine
    }

    pub fn with_advance_delay(mut self, delay: Duration) -> Self {
        self.advance_delay = delay;
        self
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn question(&self) -> &'static str {
        self.catalog[self.current]
    }

    pub fn is_last(&self) -> bool {
        self.current == self.last_index()
    }

    pub fn is_answered(&self, index: usize) -> bool {
        self.answered.get(index).copied().unwrap_or(false)
    }

    /// Recorded value, if the question has been answered
    pub fn answer_at(&self, index: usize) -> Option<bool> {
        if self.is_answered(index) {
            self.values.get(index).copied()
        } else {
            None
        }
    }

    pub fn answered_count(&self) -> usize {
        self.answered.iter().filter(|a| **a).count()
    }

    /// "Question k of N" as (k, N)
    pub fn position(&self) -> (usize, usize) {
        (self.current + 1, self.len())
    }

    pub fn progress_percent(&self) -> u8 {
        let (k, n) = self.position();
        ((k as f64 / n as f64) * 100.0).round() as u8
    }

    /// Record an answer for the current question
    pub fn answer(&mut self, value: bool) -> AnswerOutcome {
        let index = self.current;
        self.values[index] = value;
        self.answered[index] = true;

        let advance = (index < self.last_index()).then_some(Advance {
            from: index,
            delay: self.advance_delay,
        });

        AnswerOutcome {
            index,
            value,
            advance,
        }
    }

    /// Apply a pending auto-advance; returns the current index
    ///
    /// Only honored while the question it was issued for is still current
    /// and answered. A stale or forged instruction leaves the index alone.
    pub fn complete_advance(&mut self, advance: Advance) -> usize {
        if advance.from == self.current && self.is_answered(advance.from) {
            self.current = (advance.from + 1).min(self.last_index());
        } else {
            tracing::debug!(
                "[Questionnaire] Ignoring advance from {} at {}",
                advance.from,
                self.current
            );
        }
        self.current
    }

    pub fn go_back(&mut self) -> usize {
        if self.current > 0 {
            self.current -= 1;
        }
        self.current
    }

    /// Move forward, finalizing into the session on the last question
    pub fn go_next(&mut self, store: &mut SessionStore) -> Result<NextOutcome, ValidationError> {
        if !self.is_answered(self.current) {
            return Err(ValidationError::single(
                FormField::Question(self.current),
                "Please answer the current question before proceeding",
            ));
        }

        if !self.is_last() {
            self.current += 1;
            return Ok(NextOutcome::Moved {
                index: self.current,
            });
        }

        let answers = self.finalize()?;
        store.set_answers(Some(answers.clone()));
        tracing::info!(
            "[Questionnaire] Completed with {}/{} positive answers",
            answers.positive_count(),
            answers.len()
        );
        Ok(NextOutcome::Completed(answers))
    }

    /// Navigate directly to a question that already has an answer
    pub fn jump_to(&mut self, index: usize) -> bool {
        if self.is_answered(index) {
            self.current = index;
            true
        } else {
            false
        }
    }

    fn finalize(&self) -> Result<AnswerSet, ValidationError> {
        if let Some(missing) = self.answered.iter().position(|a| !*a) {
            return Err(ValidationError::single(
                FormField::Question(missing),
                format!("Question {} has not been answered", missing + 1),
            ));
        }
        Ok(AnswerSet::from_parts(self.catalog, &self.values))
    }

    fn last_index(&self) -> usize {
        self.catalog.len() - 1
    }
}

mod millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }
}
