//! Axum route handlers for the Analysis API.

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::JsonRejection,
        Multipart, State,
    },
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::analysis::errors::InputError;
use crate::analysis::models::AnalysisResult;
use crate::document;
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechAnalysisRequest {
    #[serde(default)]
    pub speech_text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerScoreRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub user_answer: Option<String>,
    #[serde(default)]
    pub correct_answer: Option<String>,
}

/// A resume file pulled out of a multipart body.
struct UploadedResume {
    file_name: Option<String>,
    media_type: String,
    bytes: bytes::Bytes,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analysis/resume (alias: POST /api/analyze)
///
/// Multipart form: `resume` file (PDF or DOCX) and `jdText` job description.
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResult>, AppError> {
    let mut multipart = multipart?;
    let mut resume: Option<UploadedResume> = None;
    let mut jd_text: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("resume") => {
                let file_name = field.file_name().map(String::from);
                let media_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read resume upload: {e}"))
                })?;
                resume = Some(UploadedResume {
                    file_name,
                    media_type,
                    bytes,
                });
            }
            Some("jdText") | Some("jd_text") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read jdText: {e}")))?;
                jd_text = Some(text);
            }
            _ => {}
        }
    }

    let resume = resume.ok_or(InputError::MissingField("resume file"))?;
    let jd_text = jd_text.ok_or(InputError::MissingField("job description"))?;

    info!(
        "Resume upload received: name={:?}, type={}, bytes={}",
        resume.file_name,
        resume.media_type,
        resume.bytes.len()
    );

    let media_type = resume.media_type.clone();
    let resume_text = tokio::task::spawn_blocking(move || {
        document::extract_text(&resume.bytes, &resume.media_type)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("document extraction task failed: {e}")))?
    .map_err(InputError::UnreadableDocument)?
    .ok_or(InputError::UnsupportedDocument(media_type))?;

    let result = state.analyzer.analyze_resume(&resume_text, &jd_text).await?;
    Ok(Json(result))
}

/// POST /api/v1/analysis/speech (alias: POST /api/analyzeVoice)
pub async fn handle_analyze_speech(
    State(state): State<AppState>,
    request: Result<Json<SpeechAnalysisRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, AppError> {
    let Json(request) = request?;
    let speech_text = request
        .speech_text
        .ok_or(InputError::MissingField("speech text"))?;
    let result = state.analyzer.analyze_speech(&speech_text).await?;
    Ok(Json(result))
}

/// POST /api/v1/analysis/answer
pub async fn handle_score_answer(
    State(state): State<AppState>,
    request: Result<Json<AnswerScoreRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, AppError> {
    let Json(request) = request?;
    let user_answer = request
        .user_answer
        .ok_or(InputError::MissingField("user answer"))?;
    let correct_answer = request
        .correct_answer
        .ok_or(InputError::MissingField("correct answer"))?;
    let question = request.question.filter(|q| !q.trim().is_empty());

    let result = state
        .analyzer
        .score_answer(question.as_deref(), &user_answer, &correct_answer)
        .await?;
    Ok(Json(result))
}
