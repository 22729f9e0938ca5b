//! Symptom questionnaire
//!
//! A fixed ordered catalog of yes/no questions walked one at a time. The
//! engine owns the working answers; the session only sees the finalized
//! [`AnswerSet`](crate::session::AnswerSet).

mod catalog;
mod engine;

pub use catalog::QUESTIONS;
pub use engine::{Advance, AnswerOutcome, NextOutcome, QuestionnaireEngine, ADVANCE_DELAY};
