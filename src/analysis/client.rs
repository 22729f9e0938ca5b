//! Analysis client
//!
//! Submits the staged image for inference and turns the response into a
//! [`RiskModel`]. One request per call, no retries; a failed attempt leaves
//! the session exactly as it was.

use super::risk::RemoteRiskLevel;
use super::transport::{
    HealthStatus, HttpTransport, InferenceTransport, PredictRequest, PredictResponse, RawResponse,
};
use crate::config::ScreeningConfig;
use crate::error::{Result, ScreeningError};
use crate::session::{lock_store, RiskModel, SessionStore};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Normalization recipe the service applies before inference
pub const PREPROCESSING_METHOD: &str = "rescale_1_255";

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Completed(RiskModel),
    /// Nothing was staged, so no request was made
    Skipped,
    /// The session was reset while the request was out; nothing was written
    Discarded,
}

pub struct AnalysisClient {
    transport: Arc<dyn InferenceTransport>,
    analyzing: AtomicBool,
}

/// Clears the analyzing flag on every exit path
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl AnalysisClient {
    pub fn new(transport: Arc<dyn InferenceTransport>) -> Self {
        Self {
            transport,
            analyzing: AtomicBool::new(false),
        }
    }

    pub fn from_config(config: &ScreeningConfig) -> Result<Self> {
        let transport = HttpTransport::new(config).map_err(ScreeningError::Config)?;
        Ok(Self::new(Arc::new(transport)))
    }

    /// True while a request is outstanding
    pub fn is_analyzing(&self) -> bool {
        self.analyzing.load(Ordering::SeqCst)
    }

    /// Analyze the staged image and store the result
    ///
    /// Rejected with [`ScreeningError::AnalysisInProgress`] while another
    /// call is outstanding. The session lock is only held to read the image
    /// and to write the result, never across the request. A result that
    /// arrives after the session was reset is dropped.
    pub async fn analyze(&self, session: &Mutex<SessionStore>) -> Result<AnalysisOutcome> {
        if self
            .analyzing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!("[Analysis] Ignoring request while another analysis is running");
            return Err(ScreeningError::AnalysisInProgress);
        }
        let _in_flight = InFlight(&self.analyzing);

        let (image, generation) = {
            let store = lock_store(session);
            (store.image().cloned(), store.generation())
        };
        let Some(image) = image else {
            tracing::debug!("[Analysis] No staged image, skipping");
            return Ok(AnalysisOutcome::Skipped);
        };

        let request = PredictRequest {
            image_base64: STANDARD.encode(&image.bytes),
            mime_type: image.mime_type.as_str().to_string(),
            preprocessing_method: PREPROCESSING_METHOD.to_string(),
        };

        tracing::info!(
            file = %image.file_name,
            size = image.size_bytes(),
            "[Analysis] Submitting image for inference"
        );
        let start = Instant::now();

        let raw = self.transport.predict(&request).await.map_err(|e| {
            tracing::error!("[Analysis] Transport failure: {}", e);
            ScreeningError::AnalysisFailed(e)
        })?;

        let model = interpret(&raw)?;

        tracing::info!(
            diagnosis = %model.diagnosis,
            confidence = model.confidence,
            risk = %model.risk_level,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "[Analysis] Prediction received"
        );

        let mut store = lock_store(session);
        if store.generation() != generation {
            tracing::info!("[Analysis] Session was reset during analysis, discarding result");
            return Ok(AnalysisOutcome::Discarded);
        }
        store.set_risk(Some(model.clone()));
        Ok(AnalysisOutcome::Completed(model))
    }

    /// Ask the service whether its model is loaded
    pub async fn health(&self) -> Result<HealthStatus> {
        let raw = self
            .transport
            .health()
            .await
            .map_err(ScreeningError::AnalysisFailed)?;
        if !raw.is_success() {
            return Err(ScreeningError::AnalysisFailed(error_detail(&raw)));
        }
        serde_json::from_str(&raw.body)
            .map_err(|e| ScreeningError::AnalysisFailed(format!("Invalid health response: {}", e)))
    }
}

/// Turn a raw response into a risk model or a failure with a detail message
pub(crate) fn interpret(raw: &RawResponse) -> Result<RiskModel> {
    if !raw.is_success() {
        let detail = error_detail(raw);
        tracing::error!(status = raw.status, "[Analysis] Prediction failed: {}", detail);
        return Err(ScreeningError::AnalysisFailed(detail));
    }

    let parsed: PredictResponse = serde_json::from_str(&raw.body).map_err(|e| {
        tracing::error!("[Analysis] Unparseable prediction body: {}", e);
        ScreeningError::AnalysisFailed(format!("Invalid prediction response: {}", e))
    })?;

    Ok(RiskModel {
        diagnosis: parsed.diagnosis,
        confidence: parsed.confidence.clamp(0.0, 100.0),
        risk_level: RemoteRiskLevel::from_value(&parsed.risk_level).to_risk_level(),
        recommendations: parsed.recommendations,
    })
}

/// `detail` from an error body, or a generic message naming the status
fn error_detail(raw: &RawResponse) -> String {
    let detail = serde_json::from_str::<Value>(&raw.body)
        .ok()
        .and_then(|body| match body.get("detail") {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(Value::String(_)) => None,
            Some(other) => Some(other.to_string()),
        });

    detail.unwrap_or_else(|| format!("Prediction failed with status {}", raw.status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{ImageMime, RiskLevel, StagedImage};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    /// Transport that answers with a fixed response, optionally waiting on a gate
    struct FakeTransport {
        response: std::result::Result<RawResponse, String>,
        gate: Option<Arc<Notify>>,
        calls: AtomicUsize,
        last: Mutex<Option<PredictRequest>>,
    }

    impl FakeTransport {
        fn answering(status: u16, body: &str) -> Self {
            Self {
                response: Ok(RawResponse {
                    status,
                    body: body.to_string(),
                }),
                gate: None,
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                response: Err(message.to_string()),
                ..Self::answering(0, "")
            }
        }

        fn gated(mut self, gate: Arc<Notify>) -> Self {
            self.gate = Some(gate);
            self
        }
    }

    #[async_trait]
    impl InferenceTransport for FakeTransport {
        async fn predict(&self, request: &PredictRequest) -> std::result::Result<RawResponse, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(request.clone());
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.response.clone()
        }

        async fn health(&self) -> std::result::Result<RawResponse, String> {
            self.response.clone()
        }
    }

    fn session_with_image(bytes: &[u8]) -> Mutex<SessionStore> {
        let mut store = SessionStore::new();
        store.set_image(Some(StagedImage {
            file_name: "eye.jpg".to_string(),
            mime_type: ImageMime::Jpeg,
            bytes: Arc::from(bytes.to_vec()),
            fingerprint: "00".repeat(32),
        }));
        Mutex::new(store)
    }

    const HIGH_BODY: &str =
        r#"{"diagnosis":"Mild NPDR","confidence":87.3,"riskLevel":"High","recommendations":"See a specialist."}"#;

    #[tokio::test]
    async fn test_success_writes_risk_model() {
        let transport = Arc::new(FakeTransport::answering(200, HIGH_BODY));
        let client = AnalysisClient::new(transport.clone());
        let session = session_with_image(b"hello");

        let outcome = client.analyze(&session).await.unwrap();
        let AnalysisOutcome::Completed(model) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(model.risk_level, RiskLevel::High);
        assert_eq!(model.diagnosis, "Mild NPDR");
        assert_eq!(model.confidence_display(), "87.3%");
        assert_eq!(session.lock().unwrap().risk(), Some(&model));
        assert!(!client.is_analyzing());

        let sent = transport.last.lock().unwrap().clone().unwrap();
        assert_eq!(sent.image_base64, "aGVsbG8=");
        assert_eq!(sent.mime_type, "image/jpeg");
        assert_eq!(sent.preprocessing_method, PREPROCESSING_METHOD);
    }

    #[tokio::test]
    async fn test_no_image_is_noop() {
        let transport = Arc::new(FakeTransport::answering(200, HIGH_BODY));
        let client = AnalysisClient::new(transport.clone());
        let session = Mutex::new(SessionStore::new());

        assert_eq!(client.analyze(&session).await.unwrap(), AnalysisOutcome::Skipped);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
        assert!(session.lock().unwrap().risk().is_none());
        assert!(!client.is_analyzing());
    }

    #[tokio::test]
    async fn test_error_detail_surfaces() {
        let client = AnalysisClient::new(Arc::new(FakeTransport::answering(
            500,
            r#"{"detail":"model unavailable"}"#,
        )));
        let session = session_with_image(b"x");

        let err = client.analyze(&session).await.unwrap_err();
        assert!(matches!(&err, ScreeningError::AnalysisFailed(d) if d == "model unavailable"));
        assert!(session.lock().unwrap().risk().is_none());
        assert!(!client.is_analyzing());
    }

    #[tokio::test]
    async fn test_unparseable_error_body_is_generic() {
        let client = AnalysisClient::new(Arc::new(FakeTransport::answering(502, "<html>bad gateway</html>")));
        let session = session_with_image(b"x");

        let err = client.analyze(&session).await.unwrap_err();
        assert!(
            matches!(&err, ScreeningError::AnalysisFailed(d) if d == "Prediction failed with status 502")
        );
    }

    #[tokio::test]
    async fn test_transport_failure_clears_flag() {
        let client = AnalysisClient::new(Arc::new(FakeTransport::failing("Request failed: refused")));
        let session = session_with_image(b"x");

        let err = client.analyze(&session).await.unwrap_err();
        assert!(matches!(err, ScreeningError::AnalysisFailed(_)));
        assert!(!client.is_analyzing());
        assert!(session.lock().unwrap().risk().is_none());
    }

    #[tokio::test]
    async fn test_malformed_success_body_fails() {
        let client = AnalysisClient::new(Arc::new(FakeTransport::answering(200, r#"{"diagnosis":"x"}"#)));
        let session = session_with_image(b"x");

        let err = client.analyze(&session).await.unwrap_err();
        assert!(matches!(err, ScreeningError::AnalysisFailed(_)));
        assert!(session.lock().unwrap().risk().is_none());
    }

    #[tokio::test]
    async fn test_single_flight() {
        let gate = Arc::new(Notify::new());
        let transport = Arc::new(FakeTransport::answering(200, HIGH_BODY).gated(gate.clone()));
        let client = Arc::new(AnalysisClient::new(transport.clone()));
        let session = Arc::new(session_with_image(b"x"));

        let first = {
            let client = Arc::clone(&client);
            let session = Arc::clone(&session);
            tokio::spawn(async move { client.analyze(&session).await })
        };

        // Wait until the first request is parked inside the transport
        while transport.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        assert!(client.is_analyzing());

        let second = client.analyze(&session).await;
        assert!(matches!(second, Err(ScreeningError::AnalysisInProgress)));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);

        gate.notify_one();
        let outcome = first.await.unwrap().unwrap();
        assert!(matches!(outcome, AnalysisOutcome::Completed(_)));
        assert!(!client.is_analyzing());
    }

    #[tokio::test]
    async fn test_reset_during_request_discards_result() {
        let gate = Arc::new(Notify::new());
        let transport = Arc::new(FakeTransport::answering(200, HIGH_BODY).gated(gate.clone()));
        let client = Arc::new(AnalysisClient::new(transport.clone()));
        let session = Arc::new(session_with_image(b"x"));

        let pending = {
            let client = Arc::clone(&client);
            let session = Arc::clone(&session);
            tokio::spawn(async move { client.analyze(&session).await })
        };
        while transport.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        session.lock().unwrap().reset();
        gate.notify_one();

        let outcome = pending.await.unwrap().unwrap();
        assert_eq!(outcome, AnalysisOutcome::Discarded);
        assert!(session.lock().unwrap().risk().is_none());
        assert!(!client.is_analyzing());
    }

    #[test]
    fn test_confidence_clamped() {
        let raw = RawResponse {
            status: 200,
            body: r#"{"diagnosis":"x","confidence":140,"riskLevel":"Low","recommendations":""}"#
                .to_string(),
        };
        assert_eq!(interpret(&raw).unwrap().confidence, 100.0);
    }

    #[test]
    fn test_non_string_detail_is_kept() {
        let raw = RawResponse {
            status: 422,
            body: r#"{"detail":[{"msg":"field required"}]}"#.to_string(),
        };
        let err = interpret(&raw).unwrap_err();
        assert!(err.to_string().contains("field required"));
    }

    #[tokio::test]
    async fn test_health() {
        let client = AnalysisClient::new(Arc::new(FakeTransport::answering(
            200,
            r#"{"status":"ok","model_loaded":false}"#,
        )));
        let health = client.health().await.unwrap();
        assert_eq!(health.status, "ok");
        assert!(!health.model_loaded);
    }
}
