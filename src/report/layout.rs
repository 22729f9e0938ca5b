//! Page layout for the analysis report
//!
//! Produces a backend-neutral list of draw operations per page. Coordinates
//! are in points measured from the top-left corner; text `y` is the baseline
//! and rectangle `y` is the top edge. The PDF writer flips them.
//!
//! Pagination is one rule applied to every block: if the block would cross
//! the bottom margin, start a new page with the cursor at the top margin.

use super::catalog::{
    band_color, management_plan, DISCLAIMER, DISCLAIMER_HEADING, FOOTER_TEXT, GUIDANCE_NOTE,
    PRIMARY, REPORT_SUBTITLE, REPORT_TITLE,
};
use super::metrics::wrap;
use crate::session::RiskModel;
use serde::Serialize;

/// A4 in points
pub const PAGE_WIDTH: f32 = 595.0;
pub const PAGE_HEIGHT: f32 = 842.0;

pub const MARGIN_X: f32 = 50.0;
pub const TOP_MARGIN: f32 = 60.0;
pub const BOTTOM_MARGIN: f32 = 60.0;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN_X;

/// Lowest point any body block may reach
pub const CONTENT_BOTTOM: f32 = PAGE_HEIGHT - BOTTOM_MARGIN;

const TITLE_BAND_HEIGHT: f32 = 80.0;
const RISK_BAND_HEIGHT: f32 = 36.0;
const LIST_INDENT: f32 = 20.0;
const BLOCK_GAP: f32 = 18.0;
const FOOTER_BASELINE: f32 = PAGE_HEIGHT - 30.0;

const BODY_SIZE: f32 = 11.0;
const BODY_LEADING: f32 = 15.0;
const HEADING_SIZE: f32 = 14.0;
const HEADING_LEADING: f32 = 22.0;
const SMALL_SIZE: f32 = 9.5;
const SMALL_LEADING: f32 = 13.0;
const DIAGNOSIS_SIZE: f32 = 13.0;
const DIAGNOSIS_LEADING: f32 = 18.0;

const TEXT: Rgb = Rgb(31, 41, 55);
const MUTED: Rgb = Rgb(107, 114, 128);
const WHITE: Rgb = Rgb(255, 255, 255);
const NOTICE_FILL: Rgb = Rgb(239, 246, 255);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Font {
    Regular,
    Bold,
    Oblique,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DrawOp {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
    Text {
        x: f32,
        y: f32,
        size: f32,
        font: Font,
        color: Rgb,
        text: String,
    },
}

impl DrawOp {
    /// Lowest y the operation touches
    pub fn bottom(&self) -> f32 {
        match self {
            DrawOp::Rect { y, height, .. } => y + height,
            DrawOp::Text { y, .. } => *y,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            DrawOp::Text { text, .. } => Some(text),
            DrawOp::Rect { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    pub ops: Vec<DrawOp>,
    /// Footer operations, drawn below the bottom margin
    pub footer: Vec<DrawOp>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportLayout {
    pub pages: Vec<Page>,
}

impl ReportLayout {
    /// Every text string in page order, footers last on each page
    pub fn texts(&self) -> Vec<&str> {
        self.pages
            .iter()
            .flat_map(|p| p.ops.iter().chain(p.footer.iter()))
            .filter_map(DrawOp::text)
            .collect()
    }
}

/// Lay out the full report
pub fn layout(model: &RiskModel, generated_at: &str) -> ReportLayout {
    let mut writer = PageWriter::new();

    writer.title_band();
    writer.timestamp(generated_at);
    writer.diagnosis(model);
    writer.risk_band(model);
    writer.recommendations(&model.recommendations);
    writer.management_plan(model);
    writer.disclaimer();

    writer.finish()
}

struct PageWriter {
    pages: Vec<Page>,
    y: f32,
}

impl PageWriter {
    fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            y: 0.0,
        }
    }

    fn ops(&mut self) -> &mut Vec<DrawOp> {
        // pages is never empty
        let last = self.pages.len() - 1;
        &mut self.pages[last].ops
    }

    /// Break to a new page unless `height` still fits above the bottom margin
    fn ensure(&mut self, height: f32) {
        if self.y + height > CONTENT_BOTTOM {
            self.pages.push(Page::default());
            self.y = TOP_MARGIN;
        }
    }

    fn rect(&mut self, x: f32, width: f32, height: f32, color: Rgb) {
        let y = self.y;
        self.ops().push(DrawOp::Rect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    /// Place one line with its top at the cursor, then advance by `leading`
    fn line(&mut self, x: f32, text: &str, size: f32, font: Font, color: Rgb, leading: f32) {
        let y = self.y + size;
        self.ops().push(DrawOp::Text {
            x,
            y,
            size,
            font,
            color,
            text: text.to_string(),
        });
        self.y += leading;
    }

    fn title_band(&mut self) {
        self.y = 0.0;
        self.rect(0.0, PAGE_WIDTH, TITLE_BAND_HEIGHT, PRIMARY);
        self.y = 22.0;
        self.line(MARGIN_X, REPORT_TITLE, 22.0, Font::Bold, WHITE, 30.0);
        self.line(MARGIN_X, REPORT_SUBTITLE, 11.0, Font::Regular, WHITE, 14.0);
        self.y = TITLE_BAND_HEIGHT + BLOCK_GAP;
    }

    fn timestamp(&mut self, generated_at: &str) {
        self.ensure(SMALL_LEADING);
        let text = format!("Generated: {}", generated_at);
        self.line(MARGIN_X, &text, 10.0, Font::Regular, MUTED, SMALL_LEADING);
        self.y += BLOCK_GAP;
    }

    fn diagnosis(&mut self, model: &RiskModel) {
        let lines = wrap(&model.diagnosis, Font::Bold, DIAGNOSIS_SIZE, CONTENT_WIDTH);

        let first = if lines.is_empty() { 0.0 } else { DIAGNOSIS_LEADING };
        self.ensure(HEADING_LEADING + first);
        self.line(MARGIN_X, "Diagnosis", HEADING_SIZE, Font::Bold, PRIMARY, HEADING_LEADING);

        for text in &lines {
            self.ensure(DIAGNOSIS_LEADING);
            self.line(MARGIN_X, text, DIAGNOSIS_SIZE, Font::Bold, TEXT, DIAGNOSIS_LEADING);
        }

        self.ensure(BODY_LEADING);
        let confidence = format!("AI Confidence: {}", model.confidence_display());
        self.line(MARGIN_X, &confidence, BODY_SIZE, Font::Regular, TEXT, BODY_LEADING);
        self.y += BLOCK_GAP;
    }

    fn risk_band(&mut self, model: &RiskModel) {
        self.ensure(RISK_BAND_HEIGHT);
        let top = self.y;
        self.rect(MARGIN_X, CONTENT_WIDTH, RISK_BAND_HEIGHT, band_color(model.risk_level));
        self.y = top + 11.0;
        let label = format!("Risk Level: {}", model.risk_level.label());
        self.line(MARGIN_X + 12.0, &label, HEADING_SIZE, Font::Bold, WHITE, 0.0);
        self.y = top + RISK_BAND_HEIGHT + BLOCK_GAP;
    }

    fn recommendations(&mut self, text: &str) {
        let lines = wrap(text, Font::Regular, BODY_SIZE, CONTENT_WIDTH);

        // Keep the heading with at least its first line
        let first = if lines.is_empty() { 0.0 } else { BODY_LEADING };
        self.ensure(HEADING_LEADING + first);
        self.line(MARGIN_X, "Recommendations", HEADING_SIZE, Font::Bold, PRIMARY, HEADING_LEADING);

        for text in &lines {
            self.ensure(BODY_LEADING);
            self.line(MARGIN_X, text, BODY_SIZE, Font::Regular, TEXT, BODY_LEADING);
        }
        self.y += BLOCK_GAP;
    }

    fn management_plan(&mut self, model: &RiskModel) {
        let subtitle = format!(
            "Tailored recommendations for {} diabetic retinopathy",
            model.risk_level.label().to_lowercase()
        );
        self.ensure(HEADING_LEADING + SMALL_LEADING + 6.0);
        self.line(
            MARGIN_X,
            "Recommended Management Plan",
            HEADING_SIZE,
            Font::Bold,
            PRIMARY,
            HEADING_LEADING,
        );
        self.line(MARGIN_X, &subtitle, SMALL_SIZE, Font::Oblique, MUTED, SMALL_LEADING + 6.0);

        for (index, item) in management_plan(model.risk_level).iter().enumerate() {
            let lines = wrap(item, Font::Regular, BODY_SIZE, CONTENT_WIDTH - LIST_INDENT);
            let height = lines.len() as f32 * BODY_LEADING + 6.0;
            self.ensure(height);

            let number = format!("{}.", index + 1);
            let top = self.y;
            self.line(MARGIN_X, &number, BODY_SIZE, Font::Bold, PRIMARY, 0.0);
            self.y = top;
            for text in &lines {
                self.line(MARGIN_X + LIST_INDENT, text, BODY_SIZE, Font::Regular, TEXT, BODY_LEADING);
            }
            self.y += 6.0;
        }
        self.y += BLOCK_GAP;
    }

    fn disclaimer(&mut self) {
        let inner = CONTENT_WIDTH - 24.0;
        let body = wrap(DISCLAIMER, Font::Regular, SMALL_SIZE, inner);
        let note = wrap(GUIDANCE_NOTE, Font::Oblique, SMALL_SIZE, inner);
        let height =
            12.0 + 20.0 + (body.len() + note.len()) as f32 * SMALL_LEADING + 6.0 + 12.0;
        self.ensure(height);

        let top = self.y;
        self.rect(MARGIN_X, CONTENT_WIDTH, height, NOTICE_FILL);
        self.y = top + 12.0;
        self.line(MARGIN_X + 12.0, DISCLAIMER_HEADING, 12.0, Font::Bold, PRIMARY, 20.0);
        for text in &body {
            self.line(MARGIN_X + 12.0, text, SMALL_SIZE, Font::Regular, TEXT, SMALL_LEADING);
        }
        self.y += 6.0;
        for text in &note {
            self.line(MARGIN_X + 12.0, text, SMALL_SIZE, Font::Oblique, MUTED, SMALL_LEADING);
        }
        self.y = top + height + BLOCK_GAP;
    }

    /// Stamp the footer on every page once the page count is known
    fn finish(mut self) -> ReportLayout {
        let total = self.pages.len();
        for (index, page) in self.pages.iter_mut().enumerate() {
            let number = format!("Page {} of {}", index + 1, total);
            page.footer.push(DrawOp::Rect {
                x: MARGIN_X,
                y: FOOTER_BASELINE - 14.0,
                width: CONTENT_WIDTH,
                height: 0.75,
                color: MUTED,
            });
            page.footer.push(DrawOp::Text {
                x: MARGIN_X,
                y: FOOTER_BASELINE,
                size: 8.5,
                font: Font::Regular,
                color: MUTED,
                text: FOOTER_TEXT.to_string(),
            });
            page.footer.push(DrawOp::Text {
                x: PAGE_WIDTH - MARGIN_X - 55.0,
                y: FOOTER_BASELINE,
                size: 8.5,
                font: Font::Regular,
                color: MUTED,
                text: number,
            });
        }

        ReportLayout { pages: self.pages }
    }
}
