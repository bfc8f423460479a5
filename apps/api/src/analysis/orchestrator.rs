//! Analysis Orchestrator — runs one request through the pipeline.
//!
//! Flow: check inputs → build prompt → invoke model (bounded by a deadline) →
//!       extract JSON → validate → typed result.
//!
//! Each call is independent: no caching, no shared mutable state. Dropping the
//! returned future (e.g. the HTTP client disconnected) drops the in-flight
//! model request with it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analysis::errors::{AnalysisError, InputError};
use crate::analysis::extractor::{extract, snippet};
use crate::analysis::kinds::{AnalysisKind, AnalysisRequest, ModelRoster};
use crate::analysis::models::AnalysisResult;
use crate::analysis::prompts;
use crate::analysis::validator::validate;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{LlmError, ModelCall, ModelInvoker};

/// Cap on the exponential backoff exponent (1s, 2s, 4s, … 32s).
const MAX_BACKOFF_SHIFT: u32 = 5;

pub struct Analyzer {
    invoker: Arc<dyn ModelInvoker>,
    models: ModelRoster,
    timeout: Duration,
    max_retries: u32,
}

impl Analyzer {
    pub fn new(invoker: Arc<dyn ModelInvoker>, models: ModelRoster, timeout: Duration) -> Self {
        Self {
            invoker,
            models,
            timeout,
            max_retries: 0,
        }
    }

    /// Allows up to `max_retries` extra attempts for transient model failures.
    /// The deadline still bounds the whole interaction, backoff included.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub async fn analyze_resume(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<AnalysisResult, AnalysisError> {
        self.analyze(&AnalysisRequest::resume_match(resume_text, job_description))
            .await
    }

    pub async fn analyze_speech(&self, transcript: &str) -> Result<AnalysisResult, AnalysisError> {
        self.analyze(&AnalysisRequest::speech_quality(transcript)).await
    }

    pub async fn score_answer(
        &self,
        question: Option<&str>,
        candidate_answer: &str,
        reference_answer: &str,
    ) -> Result<AnalysisResult, AnalysisError> {
        self.analyze(&AnalysisRequest::answer_score(
            question.map(String::from),
            candidate_answer,
            reference_answer,
        ))
        .await
    }

    /// Runs the full pipeline. Short-circuits on the first failing stage.
    pub async fn analyze(
        &self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult, AnalysisError> {
        let request_id = Uuid::new_v4();
        let started = Instant::now();
        info!(%request_id, kind = %request.kind, "Analysis started");

        let outcome = self.run(request_id, request).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &outcome {
            Ok(_) => info!(%request_id, kind = %request.kind, elapsed_ms, "Analysis succeeded"),
            Err(e) => warn!(
                %request_id,
                kind = %request.kind,
                stage = %e.stage(),
                error_kind = e.kind(),
                elapsed_ms,
                "Analysis failed: {e}"
            ),
        }
        outcome
    }

    async fn run(
        &self,
        request_id: Uuid,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult, AnalysisError> {
        check_inputs(request)?;

        let prompt = prompts::build(request);
        let model = self.models.model_for(request.kind);
        debug!(%request_id, model, prompt_chars = prompt.len(), "Invoking model");

        let call = ModelCall {
            model,
            system: JSON_ONLY_SYSTEM,
            prompt: &prompt,
        };
        let attempts = self.invoke_with_retries(request_id, call);
        let raw_reply = tokio::time::timeout(self.timeout, attempts)
            .await
            .map_err(|_| LlmError::TimedOut(self.timeout))??;
        debug!(%request_id, reply_chars = raw_reply.len(), "Model replied");

        let payload = extract(&raw_reply).map_err(|e| {
            debug!(%request_id, reply = %snippet(&raw_reply), "No JSON object in reply");
            e
        })?;
        let result = validate(request.kind, payload)?;
        Ok(result)
    }

    async fn invoke_with_retries(
        &self,
        request_id: Uuid,
        call: ModelCall<'_>,
    ) -> Result<String, LlmError> {
        let mut attempt = 0;
        loop {
            match self.invoker.invoke(call).await {
                Ok(reply) => return Ok(reply),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    // Exponential backoff: 1s, 2s, 4s
                    let delay = Duration::from_millis(1000 * (1 << attempt.min(MAX_BACKOFF_SHIFT)));
                    warn!(
                        %request_id,
                        "Model call attempt {} failed ({e}), retrying after {}ms...",
                        attempt + 1,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Rejects blank or missing required texts before any model call.
fn check_inputs(request: &AnalysisRequest) -> Result<(), InputError> {
    let (primary, secondary) = match request.kind {
        AnalysisKind::ResumeMatch => ("resume text", Some("job description")),
        AnalysisKind::SpeechQuality => ("speech text", None),
        AnalysisKind::AnswerScore => ("user answer", Some("correct answer")),
    };

    if request.primary_text.trim().is_empty() {
        return Err(InputError::EmptyText(primary));
    }
    if let Some(name) = secondary {
        match request.secondary_text.as_deref() {
            None => return Err(InputError::MissingField(name)),
            Some(text) if text.trim().is_empty() => return Err(InputError::EmptyText(name)),
            Some(_) => {}
        }
    }
    Ok(())
}
