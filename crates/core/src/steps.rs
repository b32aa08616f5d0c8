//! Workflow step identifiers and their user-facing display names.
//!
//! The remote `analyzeWeb` workflow reports progress per step id. The
//! dashboard shows a friendly label instead, looked up here. Unknown ids
//! fall back to a slug-to-title transform so new steps still render.

/// Downloads and extracts the submitted URLs.
pub const STEP_FETCH_URLS: &str = "fetch-urls";

/// Produces the early title/emoji/description/topics preview.
pub const STEP_QUICK_METADATA: &str = "generate-quick-metadata";

/// Older workflow revisions name the preview step `metadata`.
pub const STEP_METADATA_LEGACY: &str = "metadata";

/// Per-URL deep analysis (topics, insights, sentiment).
pub const STEP_DETAILED_ANALYSIS: &str = "detailed-analysis";

/// Cross-URL synthesis.
pub const STEP_ENHANCED_COMBINE: &str = "enhanced-combine";

/// Final result assembly (entities, related URLs, confidence).
pub const STEP_FINAL_ASSEMBLY: &str = "final-assembly";

/// Static display-name table, in pipeline order.
const DISPLAY_NAMES: &[(&str, &str)] = &[
    (STEP_FETCH_URLS, "Fetching content"),
    (STEP_QUICK_METADATA, "Generating preview"),
    (STEP_METADATA_LEGACY, "Generating preview"),
    (STEP_DETAILED_ANALYSIS, "Analyzing content"),
    (STEP_ENHANCED_COMBINE, "Combining insights"),
    (STEP_FINAL_ASSEMBLY, "Assembling results"),
];

/// Whether `step_id` is the step that yields quick metadata.
pub fn is_quick_metadata_step(step_id: &str) -> bool {
    step_id == STEP_QUICK_METADATA || step_id == STEP_METADATA_LEGACY
}

/// Whether `step_id` is the per-URL detailed analysis step.
pub fn is_detailed_analysis_step(step_id: &str) -> bool {
    step_id == STEP_DETAILED_ANALYSIS
}

/// Display name for a step id.
pub fn display_name(step_id: &str) -> String {
    DISPLAY_NAMES
        .iter()
        .find(|(id, _)| *id == step_id)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| slug_to_title(step_id))
}

/// `extract-key_points` -> `Extract Key Points`.
pub fn slug_to_title(slug: &str) -> String {
    slug.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
