use regex::Regex;
use std::sync::LazyLock;

const DEPRECATED_KEYWORD: &str = "deprecated";

/// Host prefixes removed from a captured redirect, each tried once in this order.
const REDIRECT_PREFIXES: [&str; 4] = ["http://", "https://", "github.com/", "package.elm-lang.org/"];

static REDIRECT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"((?:elm-lang\.org/|github\.com/)?\S+/[^.\s]+)").expect("valid redirect regex"));

/// Outcome of checking one piece of text for a deprecation notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deprecation {
    /// Normalized `owner/repo` target mentioned in the notice, if any.
    pub redirect: Option<String>,
}

/// Check `text` for a deprecation notice.
///
/// Returns `None` unless the text mentions "deprecated" (in any case). When it does, the first
/// path-shaped fragment in the text is taken as the replacement.
#[must_use]
pub fn detect(text: &str) -> Option<Deprecation> {
    if !text.to_lowercase().contains(DEPRECATED_KEYWORD) {
        return None;
    }

    let redirect = REDIRECT_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| strip_host_prefixes(m.as_str()));

    Some(Deprecation { redirect })
}

fn strip_host_prefixes(captured: &str) -> String {
    REDIRECT_PREFIXES
        .iter()
        .fold(captured, |s, prefix| s.strip_prefix(prefix).unwrap_or(s))
        .to_string()
}
