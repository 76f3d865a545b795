//! Prompt input hygiene and reply cleanup.
//!
//! # Invariants
//! - Sanitized input is trimmed and at most `MAX_INPUT_CHARS` characters.
//! - Cleaned prose is a single line; cleaned task replies keep one line per
//!   non-empty source line.

use once_cell::sync::Lazy;
use regex::Regex;

/// Upper bound for user text inserted into a prompt.
pub const MAX_INPUT_CHARS: usize = 2000;

static ROLE_HIJACK_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)ты\s+[-–—]\s+",
        r"(?i)ты\s+теперь\s+",
        r"(?i)игнорируй\s+",
        r"(?i)забудь\s+",
        r"(?i)system\s*:",
        r"(?i)assistant\s*:",
        r"(?i)prompt\s*:",
        r"(?i)инструкция\s*:",
        r"(?i)новая\s+роль",
        r"(?i)притворись\s+",
        r"(?i)веди\s+себя\s+как",
        r"(?i)представь\s+что\s+ты",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid role hijack regex"))
    .collect()
});
static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*#{1,6}\s+").expect("valid heading regex"));
static BOLD_STAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid bold regex"));
static BOLD_UNDERSCORE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"__(.+?)__").expect("valid bold regex"));
static ITALIC_STAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*(.+?)\*").expect("valid italic regex"));
static ITALIC_UNDERSCORE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_(.+?)_").expect("valid italic regex"));
static NUMBERED_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*\d+\.\s+").expect("valid numbered list regex"));
static BULLET_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*[-*+]\s+").expect("valid bullet regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));
static INLINE_SPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+").expect("valid inline ws regex"));

/// Removes role-hijack phrases and bounds the length of user text.
pub fn sanitize_input(text: &str) -> String {
    let mut sanitized = text.to_string();
    for pattern in ROLE_HIJACK_RES.iter() {
        sanitized = pattern.replace_all(&sanitized, "").into_owned();
    }
    let bounded: String = sanitized.chars().take(MAX_INPUT_CHARS).collect();
    bounded.trim().to_string()
}

/// Strips markdown decoration and collapses all whitespace.
pub fn clean_response(text: &str) -> String {
    let stripped = strip_markdown(text);
    WHITESPACE_RE.replace_all(&stripped, " ").trim().to_string()
}

/// Strips markdown decoration but keeps the line layout the reply parser
/// relies on.
pub fn clean_task_reply(text: &str) -> String {
    let stripped = strip_markdown(text);
    stripped
        .lines()
        .map(|line| INLINE_SPACE_RE.replace_all(line.trim(), " ").into_owned())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_markdown(text: &str) -> String {
    let text = HEADING_RE.replace_all(text, "");
    let text = BOLD_STAR_RE.replace_all(&text, "$1");
    let text = BOLD_UNDERSCORE_RE.replace_all(&text, "$1");
    let text = ITALIC_STAR_RE.replace_all(&text, "$1");
    let text = ITALIC_UNDERSCORE_RE.replace_all(&text, "$1");
    let text = NUMBERED_ITEM_RE.replace_all(&text, "");
    BULLET_ITEM_RE.replace_all(&text, "").into_owned()
}
