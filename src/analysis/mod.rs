//! Image analysis against the remote inference service
//!
//! ```text
//! staged image ──base64──▶ POST /api/v1/predict ──▶ riskLevel mapping ──▶ RiskModel
//! ```

mod client;
mod http_client;
mod risk;
mod transport;

pub use client::{AnalysisClient, AnalysisOutcome, PREPROCESSING_METHOD};
pub use risk::RemoteRiskLevel;
pub use transport::{
    HealthStatus, HttpTransport, InferenceTransport, PredictRequest, PredictResponse, RawResponse,
    HEALTH_PATH, PREDICT_PATH,
};
