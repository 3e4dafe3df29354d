// Shared prompt constants and prompt-building utilities.
// Each stage that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// Instruction that keeps card names addressable after the model answers.
/// Every stage cross-references cards by name, so invented names are dropped.
pub const EXACT_NAMES_INSTRUCTION: &str = "\
    IMPORTANT: You MUST use the EXACT card names from the provided list. \
    Do not make up, shorten, or modify card names.";

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_INSTRUCTION: &str = "\
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON array. \
    Do NOT include explanations or apologies.";
