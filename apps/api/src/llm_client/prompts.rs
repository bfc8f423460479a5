// Shared prompt fragments used by every analysis kind.
// Kind-specific templates live in analysis/prompts.rs.

/// System instruction that asks for JSON-only output.
/// Models still wrap replies in prose or fences often enough that the
/// extractor never relies on this being obeyed.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured interview coach. \
    You MUST respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Closing instruction appended to every analysis prompt.
pub const STRICT_JSON_INSTRUCTION: &str = "\
Return the output strictly as ONE JSON object in exactly the shape shown above. \
Use double quotes for every key and string. No comments, no trailing commas, no text before or after the object.";
