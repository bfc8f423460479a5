use std::fmt;

use thiserror::Error;

use crate::analysis::extractor::ExtractionError;
use crate::analysis::validator::ValidationError;
use crate::document::DocumentError;
use crate::llm_client::LlmError;

/// Problems with what the caller supplied. Raised before any prompt is built.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{0} cannot be empty")]
    EmptyText(&'static str),

    #[error("unsupported document type '{0}': upload a PDF or DOCX file")]
    UnsupportedDocument(String),

    #[error("could not read the uploaded document: {0}")]
    UnreadableDocument(#[from] DocumentError),
}

/// Pipeline stage at which an analysis failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStage {
    Input,
    ModelCall,
    Extraction,
    Validation,
}

impl fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AnalysisStage::Input => "input",
            AnalysisStage::ModelCall => "model_call",
            AnalysisStage::Extraction => "extraction",
            AnalysisStage::Validation => "validation",
        })
    }
}

/// Tagged failure of one `analyze` call. Carries the cause for diagnostics;
/// callers show users only a generic notice.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid input: {0}")]
    Input(#[from] InputError),

    #[error("model unavailable: {0}")]
    ModelUnavailable(#[from] LlmError),

    #[error("extraction failed: {0}")]
    ExtractionFailed(#[from] ExtractionError),

    #[error("validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

impl AnalysisError {
    pub fn stage(&self) -> AnalysisStage {
        match self {
            AnalysisError::Input(_) => AnalysisStage::Input,
            AnalysisError::ModelUnavailable(_) => AnalysisStage::ModelCall,
            AnalysisError::ExtractionFailed(_) => AnalysisStage::Extraction,
            AnalysisError::ValidationFailed(_) => AnalysisStage::Validation,
        }
    }

    /// Taxonomy label used in logs and error codes.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::Input(_) => "InputError",
            AnalysisError::ModelUnavailable(_) => "ModelUnavailable",
            AnalysisError::ExtractionFailed(_) => "ExtractionFailed",
            AnalysisError::ValidationFailed(_) => "ValidationFailed",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, AnalysisError::ModelUnavailable(LlmError::TimedOut(_)))
    }
}
