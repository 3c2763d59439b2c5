//! Shapes model output for the outbound channel: bounded length with a
//! visible truncation marker, plus a best-effort code-fence wrap.

const TRUNCATION_MARKER: &str = "\n\n[...response truncated...]";

/// Characters reserved below the limit so the marker and a little context
/// survive the cut.
const TRUNCATION_HEADROOM: usize = 100;

/// Keywords that suggest the text is code when no fence is present.
const CODE_KEYWORDS: [&str; 4] = ["def ", "class ", "import ", "function"];

/// Format a model reply for sending.
///
/// Text within `max_length` characters passes through unchanged. Longer
/// text is cut to `max_length - 100` characters (at a code-point boundary)
/// and the truncation marker is appended. Afterwards, unfenced text that
/// looks like code is wrapped in a fence pair.
///
/// # Examples
///
/// ```
/// use coderelay::format_response;
///
/// assert_eq!(format_response("short text", 4000), "short text");
/// let long = "x".repeat(5000);
/// let out = format_response(&long, 4000);
/// assert!(out.ends_with("[...response truncated...]"));
/// assert!(out.starts_with(&"x".repeat(3900)));
/// ```
pub fn format_response(text: &str, max_length: usize) -> String {
    let response = truncate(text, max_length);
    if looks_like_code(&response) {
        format!("```python\n{response}\n```")
    } else {
        response
    }
}

fn truncate(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }
    let keep = max_length.saturating_sub(TRUNCATION_HEADROOM);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(TRUNCATION_MARKER);
    out
}

/// Best-effort guess at whether unfenced text is code. This is a keyword
/// heuristic, not a parser; false positives and negatives are acceptable.
fn looks_like_code(text: &str) -> bool {
    if text.contains("```") {
        return false;
    }
    let lower = text.to_lowercase();
    CODE_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}
