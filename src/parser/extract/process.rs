use std::sync::LazyLock;

use regex::Regex;

/// CNJ case number: NNNNNNN-DD.YYYY.J.TR.OOOO, not glued to further digits.
static CNJ_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\D)(\d{7}-\d{2}\.\d{4}\.\d\.\d{2}\.\d{4})(?:\D|$)").unwrap()
});

pub fn extract(text: &str) -> Option<String> {
    CNJ_RE.captures(text).map(|caps| caps[1].to_string())
}
