//! Upload and analysis step

use super::{lock, ScreeningState};
use crate::analysis::{AnalysisOutcome, HealthStatus};
use crate::error::{self, ScreeningError};
use crate::intake::{CandidateFile, ImageIntake, PreviewHandle, Staged};
use crate::notify::Notice;
use crate::session::{RiskModel, SessionStore, Step};
use std::path::PathBuf;

fn stage(
    state: &ScreeningState,
    select: impl FnOnce(&mut ImageIntake, &mut SessionStore) -> error::Result<Option<Staged>>,
) -> Result<Option<PreviewHandle>, String> {
    state.require(Step::Upload)?;

    let result = {
        let mut intake = lock(&state.intake);
        let mut store = state.store();
        select(&mut intake, &mut store)
    };

    match result {
        Ok(Some(staged)) => {
            state.notify(staged.notice);
            Ok(Some(staged.preview))
        }
        Ok(None) => Ok(None),
        Err(e) => {
            let message = e.to_string();
            state.notify(Notice::error(message.clone()));
            Err(message)
        }
    }
}

/// Validate and stage a file handed over by the shell
pub fn upload_select(file: CandidateFile, state: &ScreeningState) -> Result<PreviewHandle, String> {
    stage(state, |intake, store| intake.select_file(store, file).map(Some))?
        .ok_or_else(|| "No file selected".to_string())
}

/// Drag-and-drop; only the first file counts. `None` when nothing was dropped.
pub fn upload_drop(
    files: Vec<CandidateFile>,
    state: &ScreeningState,
) -> Result<Option<PreviewHandle>, String> {
    stage(state, |intake, store| intake.drop_files(store, files))
}

pub fn upload_browse(file: CandidateFile, state: &ScreeningState) -> Result<PreviewHandle, String> {
    stage(state, |intake, store| intake.browse(store, file).map(Some))?
        .ok_or_else(|| "No file selected".to_string())
}

/// Read an image from disk and stage it
pub async fn upload_path(path: String, state: &ScreeningState) -> Result<PreviewHandle, String> {
    state.require(Step::Upload)?;

    let file = CandidateFile::from_path(&PathBuf::from(&path))
        .await
        .map_err(|e| {
            tracing::warn!("[Intake] Failed to read {}: {}", path, e);
            format!("Failed to read file: {}", e)
        })?;

    upload_select(file, state)
}

pub fn upload_clear(state: &ScreeningState) -> Result<(), String> {
    let mut intake = lock(&state.intake);
    intake.clear(&mut state.store());
    Ok(())
}

pub fn upload_preview(state: &ScreeningState) -> Option<PreviewHandle> {
    lock(&state.intake).preview().cloned()
}

/// Submit the staged image. `None` when no image was staged or the session
/// was reset before the answer arrived.
pub async fn analyze_scan(state: &ScreeningState) -> Result<Option<RiskModel>, String> {
    state.require(Step::Upload)?;

    match state.analysis.analyze(&state.session).await {
        Ok(AnalysisOutcome::Completed(model)) => {
            state.notify(Notice::success("Analysis complete!"));
            Ok(Some(model))
        }
        Ok(AnalysisOutcome::Skipped) | Ok(AnalysisOutcome::Discarded) => Ok(None),
        Err(ScreeningError::AnalysisInProgress) => {
            Err(ScreeningError::AnalysisInProgress.to_string())
        }
        Err(e) => {
            tracing::error!("[Analysis] {}", e);
            state.notify(Notice::error("Analysis failed. Please try again."));
            Err(e.to_string())
        }
    }
}

pub async fn check_health(state: &ScreeningState) -> Result<HealthStatus, String> {
    state.analysis.health().await.map_err(|e| e.to_string())
}
