//! Results step

use super::{lock, ScreeningState};
use crate::intake::ImageIntake;
use crate::notify::Notice;
use crate::questionnaire::QuestionnaireEngine;
use crate::report::ReportRenderer;
use crate::session::{RiskModel, Step};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportReceipt {
    pub path: PathBuf,
    pub file_name: String,
    pub page_count: usize,
}

pub fn results(state: &ScreeningState) -> Result<RiskModel, String> {
    state.require(Step::Results)?;
    state
        .store()
        .risk()
        .cloned()
        .ok_or_else(|| "No analysis results available".to_string())
}

/// Render the PDF report and save it to the configured directory
///
/// Rendering reads a snapshot of the result; the session is never written.
pub fn download_report(state: &ScreeningState) -> Result<ReportReceipt, String> {
    let model = results(state)?;
    let generated_at = chrono::Local::now().naive_local();

    let saved = ReportRenderer::render(&model, generated_at).and_then(|report| {
        ReportRenderer::save(&report, &state.config.report_dir).map(|path| (report, path))
    });

    match saved {
        Ok((report, path)) => {
            state.notify(Notice::success("PDF report saved!"));
            Ok(ReportReceipt {
                path,
                file_name: report.file_name,
                page_count: report.page_count,
            })
        }
        Err(e) => {
            tracing::error!("[Report] {}", e);
            state.notify(Notice::error(e.to_string()));
            Err(e.to_string())
        }
    }
}

/// Clear the whole session and return to the welcome screen
pub fn start_over(state: &ScreeningState) -> Step {
    *lock(&state.quiz) = QuestionnaireEngine::new();
    *lock(&state.intake) = ImageIntake::new();
    state.store().reset();

    state.notify(Notice::info("Starting a new scan..."));
    Step::Welcome
}
