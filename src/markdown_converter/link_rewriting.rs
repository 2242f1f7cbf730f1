//! Post-conversion link rewriting.
//!
//! Operates on Markdown text: root-relative link targets are resolved
//! against the page origin, and in link-free mode inline links collapse to
//! their labels.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// `[label](/path…)`: target starts with exactly one slash. The label may
/// hold images, as in a linked logo `[![alt](src)](/home)`.
static ROOT_RELATIVE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[((?:[^\[\]]|!\[[^\]]*\]\([^\)]*\))*)\]\(/((?:[^/\)][^\)]*)?)\)")
        .expect("ROOT_RELATIVE_LINK regex is valid")
});

/// `[label](target)`, also `[[n]](target)` where the label is a citation.
static INLINE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[?([^\]]+\]?)\]\([^\)]+\)").expect("INLINE_LINK regex is valid")
});

/// Bracketed or backslash-escaped number: `\[3\]`, `[[3]]`.
static CITATION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\\\[]+([0-9]+)[\\\]]+").expect("CITATION_MARKER regex is valid")
});

/// Rewrite root-relative link targets to absolute ones under `base_origin`.
///
/// `base_origin` is `scheme://host[:port]` without a trailing slash.
/// Absolute, scheme-relative (`//host/…`), fragment and page-relative targets
/// are left alone.
///
/// # Examples
///
/// ```rust
/// # use url_to_markdown::markdown_converter::link_rewriting::absolutize_links;
/// let md = absolutize_links("[Docs](/docs/intro)", "https://example.com");
/// assert_eq!(md, "[Docs](https://example.com/docs/intro)");
/// ```
#[must_use]
pub fn absolutize_links(markdown: &str, base_origin: &str) -> String {
    if base_origin.is_empty() {
        return markdown.to_string();
    }
    let base_origin = base_origin.trim_end_matches('/');

    let mut rewritten = 0usize;
    let result = rewrite_root_relative(markdown, base_origin, &mut rewritten);

    if rewritten > 0 {
        log::debug!("Absolutized {rewritten} root-relative links against {base_origin}");
    }
    result
}

/// Matches never overlap, so images inside a matched label are rewritten by
/// a second pass over the label.
fn rewrite_root_relative(markdown: &str, base_origin: &str, rewritten: &mut usize) -> String {
    ROOT_RELATIVE_LINK
        .replace_all(markdown, |caps: &Captures| {
            *rewritten += 1;
            let label = if caps[1].contains("](") {
                rewrite_root_relative(&caps[1], base_origin, rewritten)
            } else {
                caps[1].to_string()
            };
            format!("[{label}]({base_origin}/{})", &caps[2])
        })
        .into_owned()
}

/// Replace every inline link with its label and normalize citation markers
/// to `[n]`.
///
/// Images keep their `!` prefix, so `![alt](src)` becomes `!alt`; the label
/// text is what matters in link-free mode.
#[must_use]
pub fn strip_links(markdown: &str) -> String {
    let without_links = INLINE_LINK.replace_all(markdown, "${1}");
    CITATION_MARKER
        .replace_all(&without_links, "[${1}]")
        .into_owned()
}
