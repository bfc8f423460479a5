use serde::{Deserialize, Serialize};

use crate::analysis::kinds::AnalysisKind;

/// Resume vs job description findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeMatch {
    /// Always rendered as `"<0-100>%"`.
    pub ats_score: String,
    pub strengths: Vec<String>,
    pub mistakes: Vec<String>,
    pub suggestions: Vec<String>,
    /// Present only when the job description was judged unrelated to the resume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_notice: Option<String>,
}

/// Accuracy is reported either as a number or as a label ("High", "Moderate").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccuracyLevel {
    Score(f64),
    Label(String),
}

/// Spoken-answer quality findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechQuality {
    pub confidence_points: Vec<String>,
    pub improvement_points: Vec<String>,
    pub accuracy_level: AccuracyLevel,
}

/// Mock-interview answer score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerScore {
    /// Clamped to 1..=10.
    pub rating: u8,
    pub feedback: String,
}

/// A fully validated analysis result. Never partially populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisResult {
    ResumeMatch(ResumeMatch),
    SpeechQuality(SpeechQuality),
    AnswerScore(AnswerScore),
}

impl AnalysisResult {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisResult::ResumeMatch(_) => AnalysisKind::ResumeMatch,
            AnalysisResult::SpeechQuality(_) => AnalysisKind::SpeechQuality,
            AnalysisResult::AnswerScore(_) => AnalysisKind::AnswerScore,
        }
    }
}
