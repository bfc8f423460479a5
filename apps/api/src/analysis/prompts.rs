//! Prompt Builder — deterministic prompt text for each analysis kind.
//!
//! Templates embed caller text verbatim. Placeholders are substituted in a
//! single pass over the template, so braces or `{placeholder}`-looking text
//! inside user content are never re-expanded.

use crate::analysis::kinds::{AnalysisKind, AnalysisRequest};
use crate::llm_client::prompts::STRICT_JSON_INSTRUCTION;

/// Resume vs job description. Replace `{resume_text}` and `{job_description}`.
pub const RESUME_MATCH_TEMPLATE: &str = r#"Analyze the following resume against the job description.
Ignore spelling mistakes: silently read them as the intended word and do not report them.

STEP 1, RELEVANCE CHECK:
Decide whether the job description is topically related to the resume (same field, role family or skill set).
- If it IS related, judge the resume against the job description.
- If it is NOT related, still analyze the resume on its own merits for all four points below,
  and add the key "relevance_notice" with a one-sentence message saying the job description is unrelated to the resume.

STEP 2, ANALYSIS:
1. Strengths: what is good in the resume
2. Mistakes: errors in grammar, missing sections, formatting issues
3. Suggestions: how to improve the resume
4. ATS score: how well the resume matches the job description, as a percentage

RESUME:
"{resume_text}"

JOB DESCRIPTION:
"{job_description}"

OUTPUT SCHEMA (return exactly this structure):
{
  "strengths": ["Point 1", "Point 2"],
  "mistakes": ["Point 1", "Point 2"],
  "suggestions": ["Point 1", "Point 2"],
  "ats_score": "XX%",
  "relevance_notice": "Only when the job description is unrelated; omit this key otherwise"
}
"#;

/// Spoken answer quality. Replace `{transcript}`.
pub const SPEECH_QUALITY_TEMPLATE: &str = r#"Analyze this transcript of a spoken interview answer.

TRANSCRIPT:
"{transcript}"

Provide:
1. Confidence points: what the speaker did that sounds confident and clear
2. Improvement points: concrete areas to improve (filler words, structure, pacing, vagueness)
3. Accuracy level: how accurate and relevant the content is, as a number from 0 to 100

OUTPUT SCHEMA (return exactly this structure):
{
  "confidence_points": ["Point 1", "Point 2"],
  "improvement_points": ["Point 1", "Point 2"],
  "accuracy_level": 75
}
"#;

/// Mock interview answer scoring. Replace `{question}`, `{candidate_answer}`, `{reference_answer}`.
pub const ANSWER_SCORE_TEMPLATE: &str = r#"Compare a candidate's interview answer to the reference answer.

QUESTION:
"{question}"

CANDIDATE ANSWER:
"{candidate_answer}"

REFERENCE ANSWER:
"{reference_answer}"

Give a rating from 1 to 10 based on answer quality, and feedback on how to improve the answer.

OUTPUT SCHEMA (return exactly this structure):
{
  "rating": 7,
  "feedback": "Specific, actionable feedback"
}
"#;

/// Builds the prompt for a request. Pure and total: empty inputs pass through.
pub fn build(request: &AnalysisRequest) -> String {
    build_prompt(
        request.kind,
        &request.primary_text,
        request.secondary_text.as_deref(),
        request.question.as_deref(),
    )
}

pub fn build_prompt(
    kind: AnalysisKind,
    primary_text: &str,
    secondary_text: Option<&str>,
    question: Option<&str>,
) -> String {
    let secondary = secondary_text.unwrap_or("");
    let body = match kind {
        AnalysisKind::ResumeMatch => render(
            RESUME_MATCH_TEMPLATE,
            &[("resume_text", primary_text), ("job_description", secondary)],
        ),
        AnalysisKind::SpeechQuality => {
            render(SPEECH_QUALITY_TEMPLATE, &[("transcript", primary_text)])
        }
        AnalysisKind::AnswerScore => render(
            ANSWER_SCORE_TEMPLATE,
            &[
                ("question", question.unwrap_or("(not provided)")),
                ("candidate_answer", primary_text),
                ("reference_answer", secondary),
            ],
        ),
    };
    format!("{body}\n{STRICT_JSON_INSTRUCTION}")
}

/// Single-pass `{name}` substitution. Unknown `{...}` sequences are copied as-is.
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let values_len: usize = vars.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(template.len() + values_len);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let substituted = vars.iter().find_map(|(name, value)| {
            let token_len = name.len() + 2;
            let matches = tail.len() >= token_len
                && tail[1..].starts_with(name)
                && tail[1 + name.len()..].starts_with('}');
            matches.then_some((*value, token_len))
        });
        match substituted {
            Some((value, token_len)) => {
                out.push_str(value);
                rest = &tail[token_len..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
