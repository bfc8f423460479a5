use std::fmt;

use serde::{Deserialize, Serialize};

/// The three supported analysis flows. Selects prompt template, model and output schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnalysisKind {
    ResumeMatch,
    SpeechQuality,
    AnswerScore,
}

impl AnalysisKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisKind::ResumeMatch => "resume_match",
            AnalysisKind::SpeechQuality => "speech_quality",
            AnalysisKind::AnswerScore => "answer_score",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One user-initiated analysis. Created per request, consumed once.
///
/// `primary_text` is the resume text, speech transcript or candidate answer.
/// `secondary_text` is the job description or reference answer.
/// `question` is only used by `AnswerScore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub kind: AnalysisKind,
    pub primary_text: String,
    pub secondary_text: Option<String>,
    pub question: Option<String>,
}

impl AnalysisRequest {
    pub fn resume_match(
        resume_text: impl Into<String>,
        job_description: impl Into<String>,
    ) -> Self {
        Self {
            kind: AnalysisKind::ResumeMatch,
            primary_text: resume_text.into(),
            secondary_text: Some(job_description.into()),
            question: None,
        }
    }

    pub fn speech_quality(transcript: impl Into<String>) -> Self {
        Self {
            kind: AnalysisKind::SpeechQuality,
            primary_text: transcript.into(),
            secondary_text: None,
            question: None,
        }
    }

    pub fn answer_score(
        question: Option<String>,
        candidate_answer: impl Into<String>,
        reference_answer: impl Into<String>,
    ) -> Self {
        Self {
            kind: AnalysisKind::AnswerScore,
            primary_text: candidate_answer.into(),
            secondary_text: Some(reference_answer.into()),
            question,
        }
    }
}

/// Model variant per analysis kind: a lighter model for high-volume resume
/// matching, a more capable one for nuanced speech analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRoster {
    pub resume_match: String,
    pub speech_quality: String,
    pub answer_score: String,
}

impl ModelRoster {
    pub fn model_for(&self, kind: AnalysisKind) -> &str {
        match kind {
            AnalysisKind::ResumeMatch => &self.resume_match,
            AnalysisKind::SpeechQuality => &self.speech_quality,
            AnalysisKind::AnswerScore => &self.answer_score,
        }
    }
}
