//! Display sanitizing.

use regex::Regex;
use std::sync::LazyLock;

/// ANSI escape sequences (CSI and OSC).
static ESCAPES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)|\x1b[@-_]")
        .expect("escape pattern is valid")
});

/// Strip escape sequences and control characters a display cannot show.
///
/// Tabs are kept; a carriage return keeps only the text after it, which is
/// what a terminal would have left visible for progress-bar style output.
pub fn sanitize(line: &str) -> String {
    let stripped = ESCAPES.replace_all(line, "");
    let visible = stripped.rsplit('\r').next().unwrap_or_default();
    visible
        .chars()
        .filter(|c| *c == '\t' || !c.is_control())
        .collect()
}
