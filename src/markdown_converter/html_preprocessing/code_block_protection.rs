//! Code block protection during markdown conversion
//!
//! Extracts `<pre>` blocks from raw HTML text and renders them directly to
//! fenced Markdown, bypassing htmd so that whitespace, indentation and
//! angle brackets inside code survive intact. Each block is replaced in the
//! markup by a vault placeholder and restored after conversion.

use html_escape::decode_html_entities;
use regex::Regex;
use std::sync::LazyLock;

use super::html_cleaning::strip_tags;
use crate::markdown_converter::placeholder_vault::{FragmentKind, PlaceholderVault};

/// `<pre>` blocks, shortest match, across lines
static PRE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<pre(?:\s[^>]*)?>.*?</pre\s*>").expect("PRE_BLOCK regex is valid")
});

static BR_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br(?:\s[^>]*)?/?>").expect("BR_TAG regex is valid")
});

static P_OPEN_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<p(?:\s[^>]*)?>").expect("P_OPEN_TAG regex is valid")
});

/// Render a single `<pre>` fragment as a fenced code block.
///
/// `<br>` and paragraph starts become newlines, every other tag is dropped
/// (syntax-highlighting spans, the inner `<code>`), and entities are decoded.
#[must_use]
pub fn render_code_block(fragment: &str) -> String {
    let text = BR_TAG.replace_all(fragment, "\n");
    let text = P_OPEN_TAG.replace_all(&text, "\n");
    let text = strip_tags(&text);
    let text = decode_html_entities(&text);

    format!("```\n{text}\n```\n")
}

/// Replace every `<pre>` block in `html` by a placeholder.
///
/// The fenced Markdown for each block is recorded in `vault`. Unclosed or
/// overlapping `<pre>` tags are handled best effort: the shortest
/// `<pre>…</pre>` span wins.
pub fn protect_code_blocks(html: &str, vault: &mut PlaceholderVault) -> String {
    PRE_BLOCK
        .replace_all(html, |caps: &regex::Captures| {
            let markdown = render_code_block(&caps[0]);
            vault.shield(FragmentKind::CodeBlock, markdown)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_preserves_spaces() {
        let html = r#"<pre><code class="language-bash">export CLAUDE_CODE_USE_BEDROCK=1
export AWS_REGION=us-east-1  # or your preferred region</code></pre>"#;
        let markdown = render_code_block(html);

        assert_eq!(
            markdown,
            "```\nexport CLAUDE_CODE_USE_BEDROCK=1\nexport AWS_REGION=us-east-1  # or your preferred region\n```\n"
        );
    }

    #[test]
    fn test_render_converts_br_and_p_to_newlines() {
        let html = "<pre>line1<br>line2<BR/>line3<p>line4</p></pre>";
        assert_eq!(render_code_block(html), "```\nline1\nline2\nline3\nline4\n```\n");
    }

    #[test]
    fn test_render_strips_highlighting_and_decodes_entities() {
        let html = r#"<pre><span style="color:red">fn</span> get() -&gt; Rc&lt;[Rect]&gt; {}</pre>"#;
        assert_eq!(render_code_block(html), "```\nfn get() -> Rc<[Rect]> {}\n```\n");
    }

    #[test]
    fn test_protect_replaces_each_block() {
        let html = "<pre>alpha</pre><p>text</p><PRE class=\"x\">beta</PRE>";
        let mut vault = PlaceholderVault::for_document(html);
        let protected = protect_code_blocks(html, &mut vault);

        assert_eq!(vault.len(), 2);
        assert!(!protected.contains("alpha"));
        assert!(!protected.contains("beta"));
        assert!(!protected.to_lowercase().contains("<pre"));
        assert!(protected.contains("<p>text</p>"));

        let restored = vault.restore_all(&protected);
        assert!(restored.contains("```\nalpha\n```\n"));
        assert!(restored.contains("```\nbeta\n```\n"));
    }

    #[test]
    fn test_protect_ignores_similar_tags() {
        let html = "<preview>not code</preview>";
        let mut vault = PlaceholderVault::for_document(html);

        assert_eq!(protect_code_blocks(html, &mut vault), html);
        assert!(vault.is_empty());
    }

    #[test]
    fn test_identical_blocks_get_distinct_placeholders() {
        let html = "<pre>same</pre><pre>same</pre>";
        let mut vault = PlaceholderVault::for_document(html);
        let protected = protect_code_blocks(html, &mut vault);

        let tokens: Vec<&str> = vault.records().iter().map(|r| r.token.as_str()).collect();
        assert_eq!(tokens.len(), 2);
        assert_ne!(tokens[0], tokens[1]);
        assert_eq!(vault.restore_all(&protected).matches("```\nsame\n```\n").count(), 2);
    }
}
