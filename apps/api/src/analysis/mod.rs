// Structured-extraction pipeline for the three analysis flows:
// prompt → model → extract JSON → validate → typed result.
// All model calls go through llm_client; nothing here talks HTTP to the model directly.

pub mod errors;
pub mod extractor;
pub mod handlers;
pub mod kinds;
pub mod models;
pub mod orchestrator;
pub mod prompts;
pub mod validator;
