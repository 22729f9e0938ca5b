//! Fixed report content keyed by risk level

use super::layout::Rgb;
use crate::session::RiskLevel;

pub const REPORT_TITLE: &str = "Retina Analysis Report";
pub const REPORT_SUBTITLE: &str = "AI-Assisted Diabetic Retinopathy Screening";

pub const DISCLAIMER_HEADING: &str = "Important Medical Notice";

pub const DISCLAIMER: &str = "This AI analysis is intended for screening purposes only and should not replace \
professional medical advice. Please consult with a qualified ophthalmologist or healthcare provider for a \
comprehensive diagnosis and treatment plan. Early detection and proper management are key to preserving your vision.";

pub const GUIDANCE_NOTE: &str = "Note: These recommendations are general guidelines. Always follow your \
healthcare provider's specific instructions and treatment plan.";

pub const FOOTER_TEXT: &str = "Generated by Retina Screen. For screening use only.";

/// Brand blue used for the title band and headings
pub const PRIMARY: Rgb = Rgb(37, 99, 235);

/// Fill color of the risk band
pub fn band_color(level: RiskLevel) -> Rgb {
    match level {
        RiskLevel::Low => Rgb(34, 197, 94),
        RiskLevel::Moderate => Rgb(245, 158, 11),
        RiskLevel::High => Rgb(220, 38, 38),
    }
}

/// Numbered management plan shown under the recommendations
pub fn management_plan(level: RiskLevel) -> &'static [&'static str] {
    match level {
        RiskLevel::Low => &[
            "Maintain blood sugar levels within target range (HbA1c < 7%)",
            "Schedule annual comprehensive eye examinations",
            "Follow a balanced diet rich in leafy greens and omega-3 fatty acids",
            "Exercise regularly (30 minutes daily, 5 days per week)",
            "Monitor blood pressure and keep it below 130/80 mmHg",
        ],
        RiskLevel::Moderate => &[
            "Intensify blood glucose monitoring - check levels 3-4 times daily",
            "Schedule eye exams every 6 months with retinal imaging",
            "Consider medication adjustment with your endocrinologist",
            "Implement strict dietary control with a certified diabetes educator",
            "Start anti-VEGF therapy if recommended by ophthalmologist",
        ],
        RiskLevel::High => &[
            "Immediate consultation with retinal specialist required",
            "Consider laser photocoagulation or intravitreal injections",
            "Aggressive blood sugar control with insulin therapy optimization",
            "Monthly eye examinations and OCT scans",
            "Coordinate care between endocrinologist, ophthalmologist, and primary care",
        ],
    }
}
