//! Input validation for user-submitted webs, spaces, feedback and settings.
//!
//! Handlers call these before touching the database so that malformed
//! requests are rejected with a 400 and never mutate state.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Maximum number of source URLs on a single web.
pub const MAX_URLS: usize = 10;

/// Maximum length of the optional analysis prompt (characters).
pub const MAX_PROMPT_LENGTH: usize = 4_000;

/// Maximum length of a space name (characters).
pub const MAX_SPACE_NAME_LENGTH: usize = 100;

/// Maximum length of free-text descriptions (characters).
pub const MAX_DESCRIPTION_LENGTH: usize = 1_000;

/// Maximum length of a feedback message (characters).
pub const MAX_FEEDBACK_LENGTH: usize = 5_000;

/// Maximum length of a chat message body (characters).
pub const MAX_MESSAGE_LENGTH: usize = 20_000;

/// Upper bound on an emoji value. Multi-codepoint sequences (flags,
/// skin tones, ZWJ families) stay well below this.
pub const MAX_EMOJI_CHARS: usize = 16;

/// Roles accepted on web messages.
pub const VALID_MESSAGE_ROLES: &[&str] = &["user", "assistant", "system"];

/// Themes accepted in user settings.
pub const VALID_THEMES: &[&str] = &["light", "dark", "system"];

// ---------------------------------------------------------------------------
// URLs and prompt
// ---------------------------------------------------------------------------

/// Merge the single `url` and list `urls` request fields into one
/// validated, de-duplicated list (first occurrence wins).
///
/// Every entry must be an absolute `http` or `https` URL with a host.
pub fn normalize_urls(
    url: Option<&str>,
    urls: Option<&[String]>,
) -> Result<Vec<String>, CoreError> {
    let mut out: Vec<String> = Vec::new();

    let candidates = url
        .into_iter()
        .chain(urls.unwrap_or_default().iter().map(String::as_str));

    for raw in candidates {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        validate_url(trimmed)?;
        if !out.iter().any(|existing| existing == trimmed) {
            out.push(trimmed.to_string());
        }
    }

    if out.is_empty() {
        return Err(CoreError::Validation(
            "At least one URL is required".to_string(),
        ));
    }
    if out.len() > MAX_URLS {
        return Err(CoreError::Validation(format!(
            "Too many URLs: {} (maximum is {MAX_URLS})",
            out.len()
        )));
    }
    Ok(out)
}

/// Validate a single source URL.
pub fn validate_url(raw: &str) -> Result<(), CoreError> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| CoreError::Validation(format!("Invalid URL '{raw}': {e}")))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(CoreError::Validation(format!(
                "Unsupported URL scheme '{other}' in '{raw}'. Must be http or https"
            )))
        }
    }

    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(CoreError::Validation(format!("URL '{raw}' has no host")));
    }
    Ok(())
}

/// Trim the optional prompt. Blank prompts become `None`.
pub fn normalize_prompt(prompt: Option<&str>) -> Result<Option<String>, CoreError> {
    let Some(prompt) = prompt.map(str::trim).filter(|p| !p.is_empty()) else {
        return Ok(None);
    };
    validate_length("prompt", prompt, MAX_PROMPT_LENGTH)?;
    Ok(Some(prompt.to_string()))
}

// ---------------------------------------------------------------------------
// Generic field checks
// ---------------------------------------------------------------------------

/// Require a non-blank value no longer than `max` characters.
pub fn validate_required(field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    validate_length(field, value, max)
}

/// Reject values longer than `max` characters.
pub fn validate_length(field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    let len = value.chars().count();
    if len > max {
        return Err(CoreError::Validation(format!(
            "{field} exceeds maximum length of {max} characters (got {len})"
        )));
    }
    Ok(())
}

/// Validate an emoji edit. Plain ASCII text is rejected.
pub fn validate_emoji(emoji: &str) -> Result<(), CoreError> {
    let emoji = emoji.trim();
    if emoji.is_empty() {
        return Err(CoreError::Validation("emoji must not be empty".to_string()));
    }
    if emoji.chars().count() > MAX_EMOJI_CHARS {
        return Err(CoreError::Validation(format!(
            "emoji exceeds maximum of {MAX_EMOJI_CHARS} characters"
        )));
    }
    if emoji.chars().all(|c| c.is_ascii()) {
        return Err(CoreError::Validation(format!(
            "'{emoji}' is not an emoji"
        )));
    }
    Ok(())
}

/// Feedback ratings are optional, but when present must be 1..=5.
pub fn validate_rating(rating: Option<i16>) -> Result<(), CoreError> {
    match rating {
        Some(r) if !(1..=5).contains(&r) => Err(CoreError::Validation(format!(
            "rating must be between 1 and 5 (got {r})"
        ))),
        _ => Ok(()),
    }
}

/// Validate that `value` is one of `allowed`.
pub fn validate_one_of(field: &str, value: &str, allowed: &[&str]) -> Result<(), CoreError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid {field} '{value}'. Must be one of: {allowed:?}"
        )))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
