//! Session state for one pass through the screening flow
//!
//! The store is a plain owned value. Each field has exactly one producer
//! (identity step, questionnaire, intake, analysis) which validates before
//! writing; the store itself does no validation. `reset` is the only
//! operation that touches all four fields.

mod flow;
mod identity;
mod types;

pub use flow::Step;
pub use identity::{PatientForm, MAX_AGE, MIN_AGE};
pub use types::{
    AnswerSet, Identity, ImageMime, QuestionnaireAnswer, RiskLevel, RiskModel, StagedImage,
};

use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default, Clone)]
pub struct SessionStore {
    identity: Option<Identity>,
    answers: Option<AnswerSet>,
    image: Option<StagedImage>,
    risk: Option<RiskModel>,
    /// Bumped by every reset; lets in-flight work detect a new session
    generation: u64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn answers(&self) -> Option<&AnswerSet> {
        self.answers.as_ref()
    }

    pub fn image(&self) -> Option<&StagedImage> {
        self.image.as_ref()
    }

    pub fn risk(&self) -> Option<&RiskModel> {
        self.risk.as_ref()
    }

    pub fn set_identity(&mut self, identity: Option<Identity>) {
        self.identity = identity;
    }

    pub fn set_answers(&mut self, answers: Option<AnswerSet>) {
        self.answers = answers;
    }

    pub fn set_image(&mut self, image: Option<StagedImage>) {
        self.image = image;
    }

    pub fn set_risk(&mut self, risk: Option<RiskModel>) {
        self.risk = risk;
    }

    /// Identifies the current session; changes on every reset
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Clear every field in one step
    pub fn reset(&mut self) {
        *self = Self {
            generation: self.generation.wrapping_add(1),
            ..Self::default()
        };
        tracing::info!("[Session] Reset");
    }

    /// Whether the shell may route into `step`
    pub fn can_enter(&self, step: Step) -> bool {
        match step {
            Step::Welcome | Step::PatientInfo => true,
            Step::Questionnaire => self.identity.is_some(),
            Step::Upload => self.answers.is_some(),
            Step::Results => self.risk.is_some(),
        }
    }

    /// Furthest step the session has unlocked
    pub fn furthest_step(&self) -> Step {
        Step::ALL
            .iter()
            .rev()
            .copied()
            .find(|step| self.can_enter(*step))
            .unwrap_or(Step::Welcome)
    }
}

/// Lock a shared store, recovering the data if a holder panicked
///
/// Every setter is a single assignment, so a poisoned store is still whole.
pub fn lock_store(store: &Mutex<SessionStore>) -> MutexGuard<'_, SessionStore> {
    store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
