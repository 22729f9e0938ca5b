//! Screening steps and their indicator labels

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Welcome,
    PatientInfo,
    Questionnaire,
    Upload,
    Results,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::Welcome,
        Step::PatientInfo,
        Step::Questionnaire,
        Step::Upload,
        Step::Results,
    ];

    /// Steps counted by the progress indicator (the welcome page is not one)
    pub const TOTAL: usize = 4;

    /// 1-based position in the indicator, `None` for the welcome page
    pub fn number(&self) -> Option<usize> {
        match self {
            Self::Welcome => None,
            Self::PatientInfo => Some(1),
            Self::Questionnaire => Some(2),
            Self::Upload => Some(3),
            Self::Results => Some(4),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Welcome => "Welcome",
            Self::PatientInfo => "Patient Information",
            Self::Questionnaire => "Health Questionnaire",
            Self::Upload => "Upload Retina Scan",
            Self::Results => "Analysis Results",
        }
    }

    /// e.g. "Step 2 of 4"
    pub fn indicator(&self) -> Option<String> {
        self.number()
            .map(|n| format!("Step {} of {}", n, Self::TOTAL))
    }

    /// Share of the flow completed at this step, in percent
    pub fn progress_percent(&self) -> u8 {
        self.number()
            .map(|n| ((n * 100) / Self::TOTAL) as u8)
            .unwrap_or(0)
    }

    pub fn next(&self) -> Option<Step> {
        match self {
            Self::Welcome => Some(Self::PatientInfo),
            Self::PatientInfo => Some(Self::Questionnaire),
            Self::Questionnaire => Some(Self::Upload),
            Self::Upload => Some(Self::Results),
            Self::Results => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicator() {
        assert_eq!(Step::Welcome.indicator(), None);
        assert_eq!(Step::Questionnaire.indicator().as_deref(), Some("Step 2 of 4"));
        assert_eq!(Step::Results.progress_percent(), 100);
        assert_eq!(Step::PatientInfo.progress_percent(), 25);
    }

    #[test]
    fn test_next_walks_in_order() {
        let mut step = Step::Welcome;
        let mut seen = vec![step];
        while let Some(next) = step.next() {
            seen.push(next);
            step = next;
        }
        assert_eq!(seen, Step::ALL.to_vec());
    }
}
