pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis API
        .route("/api/v1/analysis/resume", post(handlers::handle_analyze_resume))
        .route("/api/v1/analysis/speech", post(handlers::handle_analyze_speech))
        .route("/api/v1/analysis/answer", post(handlers::handle_score_answer))
        // Paths the existing front-end still calls
        .route("/api/analyze", post(handlers::handle_analyze_resume))
        .route("/api/analyzeVoice", post(handlers::handle_analyze_speech))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::analysis::kinds::ModelRoster;
    use crate::analysis::orchestrator::Analyzer;
    use crate::config::Config;
    use crate::document::{DOCX_MEDIA_TYPE, PDF_MEDIA_TYPE};
    use crate::llm_client::{LlmError, ModelCall, ModelInvoker};

    const BOUNDARY: &str = "coach-test-boundary";

    /// Answers every call with the same reply.
    struct FixedReply {
        reply: Result<&'static str, u16>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ModelInvoker for FixedReply {
        async fn invoke(&self, _call: ModelCall<'_>) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Ok(text) => Ok(text.to_string()),
                Err(status) => Err(LlmError::Api {
                    status,
                    message: "quota exceeded".into(),
                }),
            }
        }
    }

    fn test_config() -> Config {
        Config {
            gemini_api_key: "test-key".into(),
            gemini_base_url: "http://localhost".into(),
            models: ModelRoster {
                resume_match: "fast".into(),
                speech_quality: "pro".into(),
                answer_score: "mid".into(),
            },
            model_timeout: Duration::from_secs(5),
            model_max_retries: 0,
            max_upload_bytes: 1024 * 1024,
            port: 0,
            rust_log: "info".into(),
        }
    }

    fn app(reply: Result<&'static str, u16>) -> (Router, Arc<FixedReply>) {
        let invoker = Arc::new(FixedReply {
            reply,
            calls: AtomicUsize::new(0),
        });
        let config = test_config();
        let analyzer = Analyzer::new(invoker.clone(), config.models.clone(), config.model_timeout);
        let state = AppState {
            analyzer: Arc::new(analyzer),
            config,
        };
        (build_router(state), invoker)
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_request(
        uri: &str,
        file_type: &str,
        file_bytes: &[u8],
        jd_text: &str,
    ) -> Request<Body> {
        let mut body = Vec::new();
        write!(
            body,
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"cv\"\r\nContent-Type: {file_type}\r\n\r\n"
        )
        .unwrap();
        body.extend_from_slice(file_bytes);
        write!(
            body,
            "\r\n--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"jdText\"\r\n\r\n{jd_text}\r\n--{BOUNDARY}--\r\n"
        )
        .unwrap();

        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap()
    }

    fn docx_bytes(text: &str) -> Vec<u8> {
        let xml = format!(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>{text}</w:t></w:r></w:p></w:body></w:document>"#
        );
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app(Ok("{}"));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_speech_analysis_returns_result_body() {
        let (app, invoker) = app(Ok(
            r#"```json
{"confidence_points": ["Clear opening"], "improvement_points": ["Fewer fillers"], "accuracy_level": 70}
```"#,
        ));
        let response = app
            .oneshot(json_request(
                "/api/v1/analysis/speech",
                json!({"speechText": "So, um, I led the migration."}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            read_json(response).await,
            json!({
                "confidence_points": ["Clear opening"],
                "improvement_points": ["Fewer fillers"],
                "accuracy_level": 70.0
            })
        );
        assert_eq!(invoker.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_legacy_voice_route_requires_speech_text() {
        let (app, invoker) = app(Ok("{}"));
        let response = app
            .oneshot(json_request("/api/analyzeVoice", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(invoker.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_garbage_reply_yields_generic_error_without_model_text() {
        let (app, _) = app(Ok("Sorry, as an AI I refuse. SECRET-DIAGNOSTIC"));
        let response = app
            .oneshot(json_request(
                "/api/v1/analysis/answer",
                json!({"question": "Q", "userAnswer": "A", "correctAnswer": "B"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = read_json(response).await;
        assert_eq!(body["error"]["message"], "Analysis failed");
        assert!(!body.to_string().contains("SECRET-DIAGNOSTIC"));
    }

    #[tokio::test]
    async fn test_model_outage_is_service_unavailable() {
        let (app, _) = app(Err(429));
        let response = app
            .oneshot(json_request(
                "/api/v1/analysis/answer",
                json!({"userAnswer": "A", "correctAnswer": "B"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = read_json(response).await;
        assert_eq!(body["error"]["code"], "MODEL_UNAVAILABLE");
        assert!(!body.to_string().contains("quota"));
    }

    #[tokio::test]
    async fn test_answer_score_clamps_rating() {
        let (app, _) = app(Ok(
            "Here you go:\n```json\n{\"rating\": 12, \"feedback\": \"good\"}\n```",
        ));
        let response = app
            .oneshot(json_request(
                "/api/v1/analysis/answer",
                json!({"userAnswer": "A", "correctAnswer": "B"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await, json!({"rating": 10, "feedback": "good"}));
    }

    #[tokio::test]
    async fn test_resume_upload_with_unsupported_type_is_rejected() {
        let (app, invoker) = app(Ok("{}"));
        let response = app
            .oneshot(multipart_request(
                "/api/analyze",
                "text/plain",
                b"Jane Doe, Rust engineer",
                "Rust developer",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("unsupported document type"));
        assert_eq!(invoker.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_resume_upload_docx_end_to_end() {
        let (app, invoker) = app(Ok(r#"Here is my analysis:
{"strengths": ["Rust depth"], "mistakes": [], "suggestions": ["Add links"], "ats_score": "81%"}"#));
        let response = app
            .oneshot(multipart_request(
                "/api/v1/analysis/resume",
                DOCX_MEDIA_TYPE,
                &docx_bytes("Jane Doe, Rust engineer"),
                "Senior Rust developer",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            read_json(response).await,
            json!({
                "ats_score": "81%",
                "strengths": ["Rust depth"],
                "mistakes": [],
                "suggestions": ["Add links"]
            })
        );
        assert_eq!(invoker.calls.load(Ordering::SeqCst), 1);
    }

    async fn assert_validation_error(response: axum::response::Response) {
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"].is_string());
    }

    #[tokio::test]
    async fn test_non_json_body_is_validation_error() {
        let (app, invoker) = app(Ok("{}"));
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/analysis/speech")
            .header("content-type", "application/json")
            .body(Body::from("not json"))
            .unwrap();
        assert_validation_error(app.oneshot(request).await.unwrap()).await;
        assert_eq!(invoker.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_wrongly_typed_field_is_validation_error() {
        let (app, invoker) = app(Ok("{}"));
        let response = app
            .oneshot(json_request("/api/v1/analysis/speech", json!({"speechText": 5})))
            .await
            .unwrap();
        assert_validation_error(response).await;
        assert_eq!(invoker.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_answer_without_json_content_type_is_validation_error() {
        let (app, _) = app(Ok("{}"));
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/analysis/answer")
            .body(Body::from(r#"{"userAnswer": "A", "correctAnswer": "B"}"#))
            .unwrap();
        assert_validation_error(app.oneshot(request).await.unwrap()).await;
    }

    #[tokio::test]
    async fn test_resume_route_without_multipart_body_is_validation_error() {
        let (app, invoker) = app(Ok("{}"));
        let response = app
            .oneshot(json_request("/api/analyze", json!({"jdText": "Rust developer"})))
            .await
            .unwrap();
        assert_validation_error(response).await;
        assert_eq!(invoker.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_corrupt_pdf_upload_is_validation_error() {
        let (app, invoker) = app(Ok("{}"));
        let response = app
            .oneshot(multipart_request(
                "/api/v1/analysis/resume",
                PDF_MEDIA_TYPE,
                b"%PDF-1.4\n%%EOF",
                "Rust developer",
            ))
            .await
            .unwrap();
        assert_validation_error(response).await;
        assert_eq!(invoker.calls.load(Ordering::SeqCst), 0);
    }
}
