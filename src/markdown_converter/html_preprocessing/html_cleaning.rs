//! String-level HTML cleaning.
//!
//! These helpers run on raw markup before (or instead of) DOM parsing. All
//! patterns use the `regex` crate, whose automata run in time linear in the
//! input, so attacker-controlled pages cannot trigger catastrophic
//! backtracking.

use html_escape::decode_html_entities;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

static STYLE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<style.*?</style>").expect("STYLE_BLOCK regex is valid")
});

static SCRIPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script.*?</script>").expect("SCRIPT_BLOCK regex is valid")
});

/// Any opening or closing tag. An unterminated tag at end of input counts too.
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"</?[^>]+(?:>|$)").expect("ANY_TAG regex is valid")
});

static LINE_BREAKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\r\n|\n|\r").expect("LINE_BREAKS regex is valid")
});

/// Remove `<style>` blocks.
#[must_use]
pub fn strip_style_blocks(html: &str) -> Cow<'_, str> {
    STYLE_BLOCK.replace_all(html, "")
}

/// Remove `<script>` blocks.
#[must_use]
pub fn strip_script_blocks(html: &str) -> Cow<'_, str> {
    SCRIPT_BLOCK.replace_all(html, "")
}

/// Remove both `<style>` and `<script>` blocks, styles first.
#[must_use]
pub fn strip_style_and_script_blocks(html: &str) -> String {
    let without_styles = strip_style_blocks(html);
    strip_script_blocks(&without_styles).into_owned()
}

/// Strip every tag, keeping text content.
#[must_use]
pub fn strip_tags(html: &str) -> Cow<'_, str> {
    ANY_TAG.replace_all(html, "")
}

/// Remove every line break (`\r\n`, `\n`, `\r`).
#[must_use]
pub fn strip_newlines(text: &str) -> Cow<'_, str> {
    LINE_BREAKS.replace_all(text, "")
}

/// Reduce an inline HTML fragment (a table cell, a caption) to one line of
/// plain text: strip tags, drop line breaks, decode entities, trim.
#[must_use]
pub fn clean_inline_fragment(html: &str) -> String {
    let text = strip_tags(html);
    let text = strip_newlines(&text);
    decode_html_entities(&text).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_style_and_script_blocks() {
        let html = "<head><STYLE type=\"text/css\">\nbody { color: red; }\n</style>\
                    <script>\nalert('x');\n</Script></head><body>Kept</body>";
        let result = strip_style_and_script_blocks(html);

        assert_eq!(result, "<head></head><body>Kept</body>");
    }

    #[test]
    fn test_strip_is_non_greedy() {
        let html = "<script>a</script>keep<script>b</script>";
        assert_eq!(strip_style_and_script_blocks(html), "keep");
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<b>bold</b> and <i class=\"x\">italic</i>"), "bold and italic");
        assert_eq!(strip_tags("text <unterminated"), "text ");
    }

    #[test]
    fn test_clean_inline_fragment() {
        let cell = "<td>\n  Fish &amp; <em>Chips</em>\r\n</td>";
        assert_eq!(clean_inline_fragment(cell), "Fish & Chips");
    }

    #[test]
    fn test_clean_inline_fragment_decodes_after_stripping() {
        // Encoded markup is text, not a tag.
        assert_eq!(clean_inline_fragment("<td>&lt;br&gt;</td>"), "<br>");
    }
}
