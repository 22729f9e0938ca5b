//! Session data types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Validated patient identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub name: String,
    pub age: u8,
    pub email: String,
}

/// One questionnaire entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireAnswer {
    pub question: String,
    pub answer: bool,
}

/// Finalized questionnaire output, index-aligned with the question catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSet(Vec<QuestionnaireAnswer>);

impl AnswerSet {
    /// Zip the catalog with the recorded answers
    pub(crate) fn from_parts(catalog: &[&str], answers: &[bool]) -> Self {
        Self(
            catalog
                .iter()
                .zip(answers.iter())
                .map(|(question, answer)| QuestionnaireAnswer {
                    question: (*question).to_string(),
                    answer: *answer,
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn entries(&self) -> &[QuestionnaireAnswer] {
        &self.0
    }

    pub fn values(&self) -> Vec<bool> {
        self.0.iter().map(|a| a.answer).collect()
    }

    /// Number of "yes" answers
    pub fn positive_count(&self) -> usize {
        self.0.iter().filter(|a| a.answer).count()
    }
}

/// Image MIME types the inference service accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageMime {
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/jpeg")]
    Jpeg,
}

impl ImageMime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Parse a declared MIME type; `image/jpg` is treated as JPEG
    pub fn from_declared(declared: &str) -> Option<Self> {
        match declared.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }
}

impl fmt::Display for ImageMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image held for submission
#[derive(Clone, PartialEq, Eq)]
pub struct StagedImage {
    pub file_name: String,
    pub mime_type: ImageMime,
    pub bytes: Arc<[u8]>,
    /// SHA-256 of the bytes, hex encoded
    pub fingerprint: String,
}

impl StagedImage {
    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

// Bytes are omitted so staged images don't flood debug output
impl fmt::Debug for StagedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagedImage")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("size_bytes", &self.size_bytes())
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

/// Three-way severity shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low Risk",
            Self::Moderate => "Moderate Risk",
            Self::High => "High Risk",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Analysis result as the rest of the flow sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskModel {
    pub diagnosis: String,
    /// Percentage in [0, 100]
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub recommendations: String,
}

impl RiskModel {
    /// Confidence with one decimal and a percent sign, e.g. `87.3%`
    pub fn confidence_display(&self) -> String {
        format!("{:.1}%", self.confidence)
    }
}
