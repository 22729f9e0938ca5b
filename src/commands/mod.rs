//! Shell-facing commands
//!
//! Each command borrows the managed [`ScreeningState`] and returns
//! `Result<T, String>` with a message the shell can show as-is. Notices are
//! queued on the state and drained by the shell after each call.

mod patient;
mod quiz;
mod results;
mod upload;

pub use patient::{patient_info, submit_patient_info, validate_patient_info};
pub use quiz::{quiz_advance, quiz_answer, quiz_back, quiz_jump, quiz_next, quiz_start, quiz_view, QuizNext, QuizView};
pub use results::{download_report, results, start_over, ReportReceipt};
pub use upload::{
    analyze_scan, check_health, upload_browse, upload_clear, upload_drop, upload_path,
    upload_preview, upload_select,
};

use crate::analysis::{AnalysisClient, InferenceTransport};
use crate::config::ScreeningConfig;
use crate::error::Result;
use crate::intake::ImageIntake;
use crate::notify::{Notice, NoticeQueue, NotificationSink};
use crate::questionnaire::QuestionnaireEngine;
use crate::session::{lock_store, SessionStore, Step};
use std::sync::{Arc, Mutex, MutexGuard};

/// State managed on behalf of the shell for one screening session
pub struct ScreeningState {
    session: Mutex<SessionStore>,
    quiz: Mutex<QuestionnaireEngine>,
    intake: Mutex<ImageIntake>,
    analysis: AnalysisClient,
    config: ScreeningConfig,
    notices: NoticeQueue,
    /// Optional second destination, e.g. a toast bridge
    sink: Option<Arc<dyn NotificationSink>>,
}

impl ScreeningState {
    pub fn new(config: ScreeningConfig) -> Result<Self> {
        let analysis = AnalysisClient::from_config(&config)?;
        Ok(Self::with_client(config, analysis))
    }

    /// State over a custom inference transport
    pub fn with_transport(config: ScreeningConfig, transport: Arc<dyn InferenceTransport>) -> Self {
        Self::with_client(config, AnalysisClient::new(transport))
    }

    fn with_client(config: ScreeningConfig, analysis: AnalysisClient) -> Self {
        Self {
            session: Mutex::new(SessionStore::new()),
            quiz: Mutex::new(QuestionnaireEngine::new()),
            intake: Mutex::new(ImageIntake::new()),
            analysis,
            config,
            notices: NoticeQueue::new(),
            sink: None,
        }
    }

    /// Load configuration from the environment and build the state
    pub fn from_env() -> std::result::Result<Self, String> {
        let config = ScreeningConfig::from_env().map_err(|e| e.to_string())?;
        tracing::info!("[Session] Using inference service at {}", config.api_base_url);
        Self::new(config).map_err(|e| e.to_string())
    }

    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn config(&self) -> &ScreeningConfig {
        &self.config
    }

    /// Lock the session store
    pub fn store(&self) -> MutexGuard<'_, SessionStore> {
        lock_store(&self.session)
    }

    pub fn is_analyzing(&self) -> bool {
        self.analysis.is_analyzing()
    }

    fn notify(&self, notice: Notice) {
        if let Some(sink) = &self.sink {
            sink.notify(notice.clone());
        }
        self.notices.notify(notice);
    }

    fn require(&self, step: Step) -> std::result::Result<(), String> {
        if self.store().can_enter(step) {
            Ok(())
        } else {
            tracing::debug!("[Session] Blocked entry to {:?}", step);
            Err(guard_message(step).to_string())
        }
    }
}

fn guard_message(step: Step) -> &'static str {
    match step {
        Step::Welcome | Step::PatientInfo => "",
        Step::Questionnaire => "Please complete your patient information first",
        Step::Upload => "Please complete the questionnaire first",
        Step::Results => "No analysis results yet. Please upload and analyze an image first",
    }
}

/// Lock a step-local mutex, recovering the data if a holder panicked
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Take every notice raised since the last drain
pub fn drain_notices(state: &ScreeningState) -> Vec<Notice> {
    state.notices.drain()
}

/// Whether the shell may route into `step`
pub fn can_enter_step(step: Step, state: &ScreeningState) -> bool {
    state.store().can_enter(step)
}

/// Furthest step the current session has unlocked
pub fn furthest_step(state: &ScreeningState) -> Step {
    state.store().furthest_step()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::CandidateFile;
    use crate::notify::NoticeLevel;
    use crate::questionnaire::QUESTIONS;
    use crate::report::{band_color, management_plan, DrawOp, ReportRenderer};
    use crate::session::{PatientForm, RiskLevel};
    use crate::test_support::StubServer;
    use tempfile::TempDir;

    fn state_for(base_url: &str, dir: &TempDir) -> ScreeningState {
        let config = ScreeningConfig::new(base_url).with_report_dir(dir.path());
        ScreeningState::new(config).unwrap()
    }

    fn jane() -> PatientForm {
        PatientForm::new("Jane Doe", "40", "jane@example.com")
    }

    fn png() -> CandidateFile {
        CandidateFile::new("retina.png", "image/png", vec![0x89, b'P', b'N', b'G', 1, 2, 3])
    }

    fn answer_all(state: &ScreeningState, value: bool) {
        quiz_start(state).unwrap();
        for _ in 0..QUESTIONS.len() {
            let outcome = quiz_answer(value, state).unwrap();
            if let Some(advance) = outcome.advance {
                quiz_advance(advance, state).unwrap();
            }
        }
        assert!(matches!(quiz_next(state).unwrap(), QuizNext::Completed { .. }));
    }

    #[tokio::test]
    async fn test_scenario_identity_validation() {
        let dir = TempDir::new().unwrap();
        let state = state_for("http://127.0.0.1:9", &dir);

        let bad_age = PatientForm::new("Jane Doe", "0", "jane@example.com");
        let err = submit_patient_info(bad_age.clone(), &state).unwrap_err();
        assert_eq!(err, "Please enter a valid age (1-120)");
        let fields = validate_patient_info(bad_age);
        assert_eq!(fields.len(), 1);

        let bad_email = PatientForm::new("Jane Doe", "40", "not-an-email");
        let err = submit_patient_info(bad_email, &state).unwrap_err();
        assert_eq!(err, "Please enter a valid email address");
        assert!(state.store().identity().is_none());

        assert_eq!(submit_patient_info(jane(), &state).unwrap(), Step::Questionnaire);
        assert_eq!(state.store().identity().unwrap().age, 40);
        assert_eq!(patient_info(&state), jane());

        let notices = drain_notices(&state);
        assert_eq!(notices, vec![Notice::success("Information saved successfully!")]);
    }

    #[tokio::test]
    async fn test_scenario_questionnaire_all_true() {
        let dir = TempDir::new().unwrap();
        let state = state_for("http://127.0.0.1:9", &dir);

        assert!(quiz_start(&state).is_err());
        submit_patient_info(jane(), &state).unwrap();
        answer_all(&state, true);

        let store = state.store();
        let answers = store.answers().unwrap();
        assert_eq!(answers.len(), 6);
        for (entry, question) in answers.entries().iter().zip(QUESTIONS.iter()) {
            assert_eq!(entry.question, *question);
            assert!(entry.answer);
        }
        drop(store);

        assert!(furthest_step(&state) == Step::Upload);
        assert!(drain_notices(&state).contains(&Notice::success("Questionnaire completed!")));
    }

    #[tokio::test]
    async fn test_quiz_next_requires_answer() {
        let dir = TempDir::new().unwrap();
        let state = state_for("http://127.0.0.1:9", &dir);
        submit_patient_info(jane(), &state).unwrap();
        quiz_start(&state).unwrap();
        drain_notices(&state);

        let err = quiz_next(&state).unwrap_err();
        assert_eq!(err, "Please answer the current question before proceeding");
        assert!(state.store().answers().is_none());
        assert_eq!(drain_notices(&state)[0].level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn test_scenario_high_risk_report() {
        let server = StubServer::start(
            200,
            r#"{"diagnosis":"Mild NPDR","confidence":87.3,"riskLevel":"High","recommendations":"See a retinal specialist."}"#,
        )
        .await;
        let dir = TempDir::new().unwrap();
        let state = state_for(&server.base_url(), &dir);

        submit_patient_info(jane(), &state).unwrap();
        answer_all(&state, false);
        upload_select(png(), &state).unwrap();
        assert!(results(&state).is_err());

        let model = analyze_scan(&state).await.unwrap().unwrap();
        assert_eq!(model.risk_level, RiskLevel::High);
        assert!(!state.is_analyzing());
        assert_eq!(results(&state).unwrap(), model);

        let receipt = download_report(&state).unwrap();
        assert!(receipt.path.starts_with(dir.path()));
        assert!(receipt.path.exists());
        assert!(receipt.file_name.starts_with("Retina_Analysis_Report_"));

        let rendered = ReportRenderer::render(&model, chrono::Local::now().naive_local()).unwrap();
        let red_band = rendered.layout.pages[0].ops.iter().any(|op| {
            matches!(op, DrawOp::Rect { color, .. } if *color == band_color(RiskLevel::High))
        });
        assert!(red_band);
        let texts = rendered.layout.texts().join("\n");
        for item in management_plan(RiskLevel::High) {
            assert!(texts.contains(item), "missing plan item: {}", item);
        }

        let messages: Vec<String> = drain_notices(&state).into_iter().map(|n| n.message).collect();
        assert!(messages.contains(&"Image uploaded successfully!".to_string()));
        assert!(messages.contains(&"Analysis complete!".to_string()));
    }

    #[tokio::test]
    async fn test_scenario_server_error() {
        let server = StubServer::start(500, r#"{"detail":"model unavailable"}"#).await;
        let dir = TempDir::new().unwrap();
        let state = state_for(&server.base_url(), &dir);

        submit_patient_info(jane(), &state).unwrap();
        answer_all(&state, true);
        upload_select(png(), &state).unwrap();
        drain_notices(&state);

        let err = analyze_scan(&state).await.unwrap_err();
        assert_eq!(err, "Analysis failed: model unavailable");
        assert!(state.store().risk().is_none());
        assert!(state.store().image().is_some());
        assert!(!state.is_analyzing());
        assert_eq!(
            drain_notices(&state),
            vec![Notice::error("Analysis failed. Please try again.")]
        );
        assert!(download_report(&state).is_err());
    }

    #[tokio::test]
    async fn test_report_save_failure_leaves_session_intact() {
        let server = StubServer::start(
            200,
            r#"{"diagnosis":"Mild NPDR","confidence":87.3,"riskLevel":"High","recommendations":"See a retinal specialist."}"#,
        )
        .await;
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();
        let config = ScreeningConfig::new(server.base_url()).with_report_dir(blocker.clone());
        let state = ScreeningState::new(config).unwrap();

        submit_patient_info(jane(), &state).unwrap();
        answer_all(&state, true);
        upload_select(png(), &state).unwrap();
        analyze_scan(&state).await.unwrap().unwrap();
        let before = state.store().clone();
        drain_notices(&state);

        assert!(download_report(&state).is_err());
        let notices = drain_notices(&state);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);

        let after = state.store().clone();
        assert_eq!(after.identity(), before.identity());
        assert_eq!(after.answers(), before.answers());
        assert_eq!(after.image(), before.image());
        assert_eq!(after.risk(), before.risk());
        assert!(results(&state).is_ok());
    }

    #[tokio::test]
    async fn test_upload_rejections_keep_previous_image() {
        let dir = TempDir::new().unwrap();
        let state = state_for("http://127.0.0.1:9", &dir);

        assert!(upload_select(png(), &state).is_err());

        submit_patient_info(jane(), &state).unwrap();
        answer_all(&state, true);
        upload_select(png(), &state).unwrap();

        let pdf = CandidateFile::new("scan.pdf", "application/pdf", vec![1]);
        assert_eq!(
            upload_select(pdf, &state).unwrap_err(),
            "Please upload a valid image file (PNG or JPEG)"
        );
        assert_eq!(state.store().image().unwrap().file_name, "retina.png");
        assert!(upload_preview(&state).is_some());

        upload_clear(&state).unwrap();
        assert!(state.store().image().is_none());
        assert!(upload_preview(&state).is_none());
        assert!(state.store().answers().is_some());
    }

    #[tokio::test]
    async fn test_start_over_resets_everything() {
        let dir = TempDir::new().unwrap();
        let state = state_for("http://127.0.0.1:9", &dir);

        submit_patient_info(jane(), &state).unwrap();
        answer_all(&state, true);
        upload_select(png(), &state).unwrap();
        drain_notices(&state);

        assert_eq!(start_over(&state), Step::Welcome);
        let store = state.store();
        assert!(store.identity().is_none());
        assert!(store.answers().is_none());
        assert!(store.image().is_none());
        assert!(store.risk().is_none());
        drop(store);

        assert_eq!(quiz_view(&state).answered, vec![false; QUESTIONS.len()]);
        assert!(upload_preview(&state).is_none());
        assert_eq!(drain_notices(&state), vec![Notice::info("Starting a new scan...")]);
    }
}
