//! Final Markdown cleanup before a document is served.

use regex::Regex;
use std::sync::LazyLock;

static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("EXCESS_NEWLINES regex is valid"));

/// Collapse runs of three or more newlines to one blank line and trim the
/// document.
///
/// This also collapses blank-line runs inside fenced code blocks.
#[must_use]
pub fn tidy_markdown(markdown: &str) -> String {
    EXCESS_NEWLINES
        .replace_all(markdown, "\n\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_blank_runs() {
        assert_eq!(tidy_markdown("a\n\n\n\nb\n\nc"), "a\n\nb\n\nc");
    }

    #[test]
    fn test_trims_edges() {
        assert_eq!(tidy_markdown("\n\n  # Title\n\ntext \n\n\n"), "# Title\n\ntext");
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(tidy_markdown("\n\n\n"), "");
    }
}
