//! Questionnaire step

use super::{lock, ScreeningState};
use crate::notify::Notice;
use crate::questionnaire::{Advance, AnswerOutcome, NextOutcome, QuestionnaireEngine};
use crate::session::Step;
use serde::Serialize;

/// Everything the shell needs to draw the current question
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizView {
    pub index: usize,
    pub total: usize,
    pub question: &'static str,
    pub answer: Option<bool>,
    pub answered: Vec<bool>,
    pub progress_percent: u8,
    pub is_last: bool,
}

impl QuizView {
    fn of(engine: &QuestionnaireEngine) -> Self {
        Self {
            index: engine.current(),
            total: engine.len(),
            question: engine.question(),
            answer: engine.answer_at(engine.current()),
            answered: (0..engine.len()).map(|i| engine.is_answered(i)).collect(),
            progress_percent: engine.progress_percent(),
            is_last: engine.is_last(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum QuizNext {
    Moved { view: QuizView },
    Completed { next: Step },
}

pub fn quiz_view(state: &ScreeningState) -> QuizView {
    QuizView::of(&lock(&state.quiz))
}

/// Enter the questionnaire, restoring saved answers if the step was finished
pub fn quiz_start(state: &ScreeningState) -> Result<QuizView, String> {
    state.require(Step::Questionnaire)?;

    let engine = QuestionnaireEngine::resume(&state.store());
    let view = QuizView::of(&engine);
    *lock(&state.quiz) = engine;
    Ok(view)
}

/// Answer the current question. The shell applies the returned advance
/// through [`quiz_advance`] once its delay has passed.
pub fn quiz_answer(value: bool, state: &ScreeningState) -> Result<AnswerOutcome, String> {
    state.require(Step::Questionnaire)?;
    Ok(lock(&state.quiz).answer(value))
}

pub fn quiz_advance(advance: Advance, state: &ScreeningState) -> Result<QuizView, String> {
    let mut engine = lock(&state.quiz);
    engine.complete_advance(advance);
    Ok(QuizView::of(&engine))
}

pub fn quiz_back(state: &ScreeningState) -> Result<QuizView, String> {
    let mut engine = lock(&state.quiz);
    engine.go_back();
    Ok(QuizView::of(&engine))
}

/// Jump to an answered question; unanswered targets leave the view as is
pub fn quiz_jump(index: usize, state: &ScreeningState) -> Result<QuizView, String> {
    let mut engine = lock(&state.quiz);
    engine.jump_to(index);
    Ok(QuizView::of(&engine))
}

pub fn quiz_next(state: &ScreeningState) -> Result<QuizNext, String> {
    state.require(Step::Questionnaire)?;

    let outcome = {
        let mut engine = lock(&state.quiz);
        let mut store = state.store();
        engine
            .go_next(&mut store)
            .map(|outcome| (outcome, QuizView::of(&engine)))
    };

    match outcome {
        Ok((NextOutcome::Moved { .. }, view)) => Ok(QuizNext::Moved { view }),
        Ok((NextOutcome::Completed(_), _)) => {
            state.notify(Notice::success("Questionnaire completed!"));
            Ok(QuizNext::Completed { next: Step::Upload })
        }
        Err(e) => {
            let message = e.to_string();
            state.notify(Notice::error(message.clone()));
            Err(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::ScreeningState;
    use super::*;
    use crate::analysis::{HealthStatus, InferenceTransport, PredictRequest, RawResponse};
    use crate::config::ScreeningConfig;
    use crate::session::PatientForm;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Offline;

    #[async_trait]
    impl InferenceTransport for Offline {
        async fn predict(&self, _request: &PredictRequest) -> Result<RawResponse, String> {
            Err("offline".to_string())
        }

        async fn health(&self) -> Result<RawResponse, String> {
            Err("offline".to_string())
        }
    }

    fn ready_state() -> ScreeningState {
        let state = ScreeningState::with_transport(
            ScreeningConfig::new("http://127.0.0.1:9"),
            Arc::new(Offline),
        );
        super::super::submit_patient_info(
            PatientForm::new("Jane Doe", "40", "jane@example.com"),
            &state,
        )
        .unwrap();
        state
    }

    #[test]
    fn test_back_and_jump() {
        let state = ready_state();
        quiz_start(&state).unwrap();

        let first = quiz_answer(true, &state).unwrap();
        let view = quiz_advance(first.advance.unwrap(), &state).unwrap();
        assert_eq!(view.index, 1);
        assert_eq!(view.progress_percent, 33);

        // Index 3 has no answer yet
        assert_eq!(quiz_jump(3, &state).unwrap().index, 1);
        assert_eq!(quiz_back(&state).unwrap().index, 0);
        assert_eq!(quiz_back(&state).unwrap().index, 0);

        let view = quiz_jump(0, &state).unwrap();
        assert_eq!(view.answer, Some(true));
    }

    #[test]
    fn test_late_advance_after_back_is_ignored() {
        let state = ready_state();
        quiz_start(&state).unwrap();

        let forged = Advance {
            from: 4,
            delay: std::time::Duration::ZERO,
        };
        assert_eq!(quiz_advance(forged, &state).unwrap().index, 0);

        let first = quiz_answer(true, &state).unwrap();
        quiz_advance(first.advance.unwrap(), &state).unwrap();
        let second = quiz_answer(false, &state).unwrap();
        assert_eq!(quiz_back(&state).unwrap().index, 0);

        let view = quiz_advance(second.advance.unwrap(), &state).unwrap();
        assert_eq!(view.index, 0);
        assert_eq!(view.answer, Some(true));
    }

    #[test]
    fn test_resume_restores_finished_answers() {
        let state = ready_state();
        quiz_start(&state).unwrap();
        for value in [true, false, true, false, true, false] {
            let outcome = quiz_answer(value, &state).unwrap();
            if let Some(advance) = outcome.advance {
                quiz_advance(advance, &state).unwrap();
            }
        }
        quiz_next(&state).unwrap();

        let view = quiz_start(&state).unwrap();
        assert!(view.answered.iter().all(|a| *a));
        assert_eq!(view.answer, Some(true));

        // Finalizing again without changes yields the same answers
        let before = state.store().answers().cloned();
        let next = quiz_jump(5, &state).and_then(|_| quiz_next(&state)).unwrap();
        assert_eq!(next, QuizNext::Completed { next: Step::Upload });
        assert_eq!(state.store().answers().cloned(), before);
    }
}
