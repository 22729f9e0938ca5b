//! Report rendering
//!
//! A RiskModel becomes a paginated layout, then PDF bytes, then a file in the
//! configured report directory. Rendering never touches the session store.

mod catalog;
mod layout;
mod metrics;
mod pdf;

pub use catalog::{band_color, management_plan, DISCLAIMER, FOOTER_TEXT, REPORT_TITLE};
pub use layout::{DrawOp, Font, Page, ReportLayout, Rgb, PAGE_HEIGHT, PAGE_WIDTH};

use crate::error::{Result, ScreeningError};
use crate::session::RiskModel;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

const FILE_PREFIX: &str = "Retina_Analysis_Report_";

#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub layout: ReportLayout,
}

/// Output file name for a report generated at `generated_at`
pub fn file_name(generated_at: NaiveDateTime) -> String {
    format!("{}{}.pdf", FILE_PREFIX, generated_at.format("%Y-%m-%d"))
}

pub struct ReportRenderer;

impl ReportRenderer {
    /// Lay out and encode a report. Output is fully determined by the inputs.
    pub fn render(model: &RiskModel, generated_at: NaiveDateTime) -> Result<RenderedReport> {
        let stamp = generated_at.format("%Y-%m-%d %H:%M").to_string();
        let layout = layout::layout(model, &stamp);
        let bytes = pdf::encode(&layout)?;

        tracing::info!(
            "[Report] Rendered {} report, {} page(s)",
            model.risk_level.as_str(),
            layout.pages.len()
        );

        Ok(RenderedReport {
            file_name: file_name(generated_at),
            page_count: layout.pages.len(),
            bytes,
            layout,
        })
    }

    /// Write a rendered report into `dir`, replacing any file of the same name
    pub fn save(report: &RenderedReport, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir).map_err(|e| {
            ScreeningError::ReportFailed(format!("cannot create {}: {}", dir.display(), e))
        })?;

        let path = dir.join(&report.file_name);
        std::fs::write(&path, &report.bytes).map_err(|e| {
            ScreeningError::ReportFailed(format!("cannot write {}: {}", path.display(), e))
        })?;

        tracing::info!("[Report] Saved {}", path.display());
        Ok(path)
    }
}
