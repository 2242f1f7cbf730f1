//! Main content extraction from HTML documents.
//!
//! Picks the first semantic container that matches (`<main>`, `<article>`,
//! common content ids and classes), falling back to `<body>`, and serializes
//! its children while dropping navigation, headers, footers, sidebars and
//! similar chrome. The input is always parsed afresh, so the caller's
//! document is never touched.

use anyhow::{Result, bail};
use ego_tree::NodeId;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Maximum HTML input size accepted for extraction (10 MB)
pub(crate) const MAX_HTML_SIZE: usize = 10 * 1024 * 1024;

/// Deeper documents are rejected so the caller keeps the full markup.
const MAX_HTML_NESTING_DEPTH: usize = 100;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

fn parse_selectors(selectors: &[&str]) -> Vec<Selector> {
    selectors
        .iter()
        .map(|s| Selector::parse(s).expect("hardcoded CSS selector is valid"))
        .collect()
}

/// Content containers in priority order
static CONTENT_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    parse_selectors(&[
        "main",
        "article",
        "[role='main']",
        "#main-content",
        ".main-content",
        "#content",
        ".content",
        ".post-content",
        ".entry-content",
        "[itemprop='articleBody']",
        ".article-body",
        ".story-body",
    ])
});

/// Page chrome dropped from whichever container is chosen
static CHROME_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    parse_selectors(&[
        "nav",
        "header",
        "footer",
        "aside",
        ".sidebar",
        "#sidebar",
        ".navigation",
        ".header",
        ".footer",
        ".menu",
        ".ads",
        ".advertisement",
        ".social-share",
        ".comments",
        "#comments",
        ".related-posts",
        ".cookie-notice",
        ".popup",
        ".modal",
    ])
});

static BODY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("BODY_SELECTOR is valid"));

/// Serialize the children of `container`, skipping chrome elements.
fn serialize_without_chrome(container: &ElementRef) -> Result<String> {
    let mut skipped: HashSet<NodeId> = HashSet::new();
    for selector in CHROME_SELECTORS.iter() {
        skipped.extend(container.select(selector).map(|el| el.id()));
    }

    let mut output = String::new();
    serialize_children(container, &skipped, &mut output, 0)?;
    Ok(output)
}

fn serialize_children(
    element: &ElementRef,
    skipped: &HashSet<NodeId>,
    output: &mut String,
    depth: usize,
) -> Result<()> {
    if depth > MAX_HTML_NESTING_DEPTH {
        tracing::warn!(
            element = element.value().name(),
            limit = MAX_HTML_NESTING_DEPTH,
            "Maximum HTML nesting depth exceeded"
        );
        bail!("HTML nesting deeper than {MAX_HTML_NESTING_DEPTH} levels");
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                html_escape::encode_text_to_string(&**text, output);
            }
            Node::Element(_) => {
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                if skipped.contains(&child_el.id()) {
                    continue;
                }

                let name = child_el.value().name();
                output.push('<');
                output.push_str(name);
                for (attr, value) in child_el.value().attrs() {
                    output.push(' ');
                    output.push_str(attr);
                    output.push_str("=\"");
                    html_escape::encode_double_quoted_attribute_to_string(value, output);
                    output.push('"');
                }
                output.push('>');

                if VOID_ELEMENTS.contains(&name) {
                    continue;
                }

                serialize_children(&child_el, skipped, output, depth + 1)?;

                output.push_str("</");
                output.push_str(name);
                output.push('>');
            }
            Node::Comment(comment) => {
                output.push_str("<!--");
                output.push_str(comment);
                output.push_str("-->");
            }
            _ => {}
        }
    }
    Ok(())
}

/// Extract the main content of `html` as an HTML fragment.
///
/// # Errors
///
/// Fails when the input exceeds [`MAX_HTML_SIZE`], when the container nests
/// deeper than the serializer follows, or when the parsed document yields
/// no content container at all. Callers treat any error as
/// "use the full document".
pub fn extract_main_content(html: &str) -> Result<String> {
    if html.len() > MAX_HTML_SIZE {
        bail!(
            "HTML input too large: {} bytes (limit {} bytes)",
            html.len(),
            MAX_HTML_SIZE
        );
    }

    let document = Html::parse_document(html);

    for selector in CONTENT_SELECTORS.iter() {
        if let Some(container) = document.select(selector).next() {
            tracing::trace!(container = container.value().name(), "Main content container found");
            return serialize_without_chrome(&container);
        }
    }

    match document.select(&BODY_SELECTOR).next() {
        Some(body) => serialize_without_chrome(&body),
        None => bail!("document has no content container"),
    }
}
