//! Result Validator — parses an extracted payload and maps it onto the typed
//! result for its analysis kind.
//!
//! A payload either yields a fully populated `AnalysisResult` or a
//! `ValidationError`; partial objects never escape. Missing fields are
//! reported all at once, in schema order, by canonical name.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::analysis::extractor::{snippet, ExtractedPayload};
use crate::analysis::kinds::AnalysisKind;
use crate::analysis::models::{
    AccuracyLevel, AnalysisResult, AnswerScore, ResumeMatch, SpeechQuality,
};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 10;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("payload is not valid JSON: {reason} (payload starts with: {payload:?})")]
    MalformedJson { reason: String, payload: String },

    #[error("payload is missing required fields: {}", .missing.join(", "))]
    SchemaMismatch { missing: Vec<&'static str> },

    #[error("field '{field}' has the wrong type: expected {expected}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
    },
}

/// A schema field and the key spellings models are known to use for it.
struct Field {
    name: &'static str,
    keys: &'static [&'static str],
}

const ATS_SCORE: Field = Field {
    name: "ats_score",
    keys: &["ats_score", "atsScore"],
};
const STRENGTHS: Field = Field {
    name: "strengths",
    keys: &["strengths"],
};
const MISTAKES: Field = Field {
    name: "mistakes",
    keys: &["mistakes"],
};
const SUGGESTIONS: Field = Field {
    name: "suggestions",
    keys: &["suggestions"],
};
const RELEVANCE_NOTICE: Field = Field {
    name: "relevance_notice",
    keys: &["relevance_notice", "relevanceNotice", "message"],
};
const CONFIDENCE_POINTS: Field = Field {
    name: "confidence_points",
    keys: &["confidence_points", "confidence_level", "confidence"],
};
const IMPROVEMENT_POINTS: Field = Field {
    name: "improvement_points",
    keys: &["improvement_points", "improvements"],
};
const ACCURACY_LEVEL: Field = Field {
    name: "accuracy_level",
    keys: &["accuracy_level", "Accuracy_level", "accuracy"],
};
const RATING: Field = Field {
    name: "rating",
    keys: &["rating", "ratings"],
};
const FEEDBACK: Field = Field {
    name: "feedback",
    keys: &["feedback"],
};

const RESUME_MATCH_REQUIRED: &[&Field] = &[&STRENGTHS, &MISTAKES, &SUGGESTIONS, &ATS_SCORE];
const SPEECH_QUALITY_REQUIRED: &[&Field] =
    &[&CONFIDENCE_POINTS, &IMPROVEMENT_POINTS, &ACCURACY_LEVEL];
const ANSWER_SCORE_REQUIRED: &[&Field] = &[&RATING, &FEEDBACK];

/// Validates and normalizes `payload` into the result type for `kind`.
pub fn validate(
    kind: AnalysisKind,
    payload: ExtractedPayload<'_>,
) -> Result<AnalysisResult, ValidationError> {
    let value: Value =
        serde_json::from_str(payload.as_str()).map_err(|e| ValidationError::MalformedJson {
            reason: e.to_string(),
            payload: snippet(payload.as_str()),
        })?;

    let object = value.as_object().ok_or(ValidationError::TypeMismatch {
        field: "$",
        expected: "object",
    })?;

    let required = match kind {
        AnalysisKind::ResumeMatch => RESUME_MATCH_REQUIRED,
        AnalysisKind::SpeechQuality => SPEECH_QUALITY_REQUIRED,
        AnalysisKind::AnswerScore => ANSWER_SCORE_REQUIRED,
    };
    let missing: Vec<&'static str> = required
        .iter()
        .filter(|f| lookup(object, f).is_none())
        .map(|f| f.name)
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::SchemaMismatch { missing });
    }

    match kind {
        AnalysisKind::ResumeMatch => validate_resume_match(object).map(AnalysisResult::ResumeMatch),
        AnalysisKind::SpeechQuality => {
            validate_speech_quality(object).map(AnalysisResult::SpeechQuality)
        }
        AnalysisKind::AnswerScore => validate_answer_score(object).map(AnalysisResult::AnswerScore),
    }
}

fn validate_resume_match(object: &Map<String, Value>) -> Result<ResumeMatch, ValidationError> {
    let relevance_notice = match lookup(object, &RELEVANCE_NOTICE) {
        None => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            return Err(ValidationError::TypeMismatch {
                field: RELEVANCE_NOTICE.name,
                expected: "string",
            })
        }
    };

    Ok(ResumeMatch {
        ats_score: percentage(&ATS_SCORE, require(object, &ATS_SCORE)?)?,
        strengths: string_list(&STRENGTHS, require(object, &STRENGTHS)?)?,
        mistakes: string_list(&MISTAKES, require(object, &MISTAKES)?)?,
        suggestions: string_list(&SUGGESTIONS, require(object, &SUGGESTIONS)?)?,
        relevance_notice,
    })
}

fn validate_speech_quality(object: &Map<String, Value>) -> Result<SpeechQuality, ValidationError> {
    Ok(SpeechQuality {
        confidence_points: string_list(&CONFIDENCE_POINTS, require(object, &CONFIDENCE_POINTS)?)?,
        improvement_points: string_list(
            &IMPROVEMENT_POINTS,
            require(object, &IMPROVEMENT_POINTS)?,
        )?,
        accuracy_level: accuracy_level(require(object, &ACCURACY_LEVEL)?)?,
    })
}

fn validate_answer_score(object: &Map<String, Value>) -> Result<AnswerScore, ValidationError> {
    let raw = number(&RATING, require(object, &RATING)?)?;
    let rating = raw.round().clamp(f64::from(MIN_RATING), f64::from(MAX_RATING)) as u8;

    let feedback = match require(object, &FEEDBACK)? {
        Value::String(s) => s.trim().to_string(),
        _ => {
            return Err(ValidationError::TypeMismatch {
                field: FEEDBACK.name,
                expected: "string",
            })
        }
    };

    Ok(AnswerScore { rating, feedback })
}

/// First present key for `field`. `null` and blank strings count as absent.
fn lookup<'v>(object: &'v Map<String, Value>, field: &Field) -> Option<&'v Value> {
    field
        .keys
        .iter()
        .filter_map(|k| object.get(*k))
        .find(|v| match v {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        })
}

fn require<'v>(
    object: &'v Map<String, Value>,
    field: &Field,
) -> Result<&'v Value, ValidationError> {
    lookup(object, field).ok_or(ValidationError::SchemaMismatch {
        missing: vec![field.name],
    })
}

fn string_list(field: &Field, value: &Value) -> Result<Vec<String>, ValidationError> {
    let mismatch = ValidationError::TypeMismatch {
        field: field.name,
        expected: "array of strings",
    };
    let items = value.as_array().ok_or_else(|| mismatch.clone())?;

    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let text = item.as_str().ok_or_else(|| mismatch.clone())?.trim();
        if !text.is_empty() {
            out.push(text.to_string());
        }
    }
    Ok(out)
}

/// A JSON number, or a string that reads as one (`"8"`, `" 7.5 "`).
fn number(field: &Field, value: &Value) -> Result<f64, ValidationError> {
    let mismatch = || ValidationError::TypeMismatch {
        field: field.name,
        expected: "number",
    };
    let n = match value {
        Value::Number(n) => n.as_f64().ok_or_else(mismatch)?,
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| mismatch())?,
        _ => return Err(mismatch()),
    };
    if n.is_finite() {
        Ok(n)
    } else {
        Err(mismatch())
    }
}

/// Normalizes `72`, `"72"`, `"72%"` or `"72.4 %"` to `"72%"`, clamped to 0–100.
fn percentage(field: &Field, value: &Value) -> Result<String, ValidationError> {
    let n = match value {
        Value::String(s) => {
            let digits = s.trim().trim_end_matches('%').trim_end();
            number(field, &Value::String(digits.to_string())).map_err(|_| {
                ValidationError::TypeMismatch {
                    field: field.name,
                    expected: "percentage",
                }
            })?
        }
        other => number(field, other)?,
    };
    Ok(format!("{}%", n.round().clamp(0.0, 100.0) as u8))
}

fn accuracy_level(value: &Value) -> Result<AccuracyLevel, ValidationError> {
    match value {
        Value::Number(n) => {
            n.as_f64()
                .map(AccuracyLevel::Score)
                .ok_or(ValidationError::TypeMismatch {
                    field: ACCURACY_LEVEL.name,
                    expected: "number or label",
                })
        }
        Value::String(s) => Ok(AccuracyLevel::Label(s.trim().to_string())),
        _ => Err(ValidationError::TypeMismatch {
            field: ACCURACY_LEVEL.name,
            expected: "number or label",
        }),
    }
}
