const OPENING_FENCE: &str = "```json";
const CLOSING_FENCE: &str = "```";

/// Strips surrounding whitespace and one leading "```json" / trailing "```" marker.
///
/// This is a literal prefix/suffix strip: a payload that happens to start with
/// "```json" loses those characters even when they were not meant as a fence.
pub fn clean_json_text(raw: &str) -> &str {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix(OPENING_FENCE).unwrap_or(trimmed);
    trimmed.strip_suffix(CLOSING_FENCE).unwrap_or(trimmed)
}
