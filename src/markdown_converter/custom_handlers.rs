//! htmd converter configuration and custom element handlers.
//!
//! Output style: ATX headings, fenced code blocks, `-` bullets and `_`
//! emphasis. `<head>`, `<script>` and `<style>` are skipped so the title
//! never leaks into the body when the full document is converted.

use htmd::{
    Element, HtmlToMarkdown,
    element_handler::{HandlerResult, Handlers},
    options::{BulletListMarker, CodeBlockStyle, HeadingStyle, Options},
};

/// Emphasis delimiter
const EM_DELIMITER: &str = "_";

/// Create the htmd converter used for every page.
#[must_use]
pub fn create_converter() -> HtmlToMarkdown {
    let options = Options {
        heading_style: HeadingStyle::Atx,
        code_block_style: CodeBlockStyle::Fenced,
        bullet_list_marker: BulletListMarker::Dash,
        ..Default::default()
    };

    HtmlToMarkdown::builder()
        .options(options)
        .skip_tags(vec!["head", "script", "style"])
        .add_handler(vec!["em", "i"], emphasis_handler)
        .add_handler(vec!["a"], link_handler)
        .build()
}

/// `<em>`/`<i>` as `_text_`, with surrounding whitespace kept outside the
/// delimiters.
fn emphasis_handler(handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
    let content = handlers.walk_children(element.node).content;
    let inner = content.trim();
    if inner.is_empty() {
        return (!content.is_empty()).then(|| HandlerResult::from(" ".to_string()));
    }

    let leading = if content.starts_with(char::is_whitespace) { " " } else { "" };
    let trailing = if content.ends_with(char::is_whitespace) { " " } else { "" };

    Some(HandlerResult::from(format!(
        "{leading}{EM_DELIMITER}{inner}{EM_DELIMITER}{trailing}"
    )))
}

/// `<a>` as `[text](href "title")`.
///
/// The title is kept because several repair filters key on it (section edit
/// links, pilcrow anchors). Empty anchors fall back to `aria-label`, then
/// the title attribute, so they don't render as `[](href)`.
fn link_handler(handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
    let content = handlers.walk_children(element.node).content;
    let text = content.trim();

    let Some(href) = get_attr(&element, "href") else {
        return Some(HandlerResult::from(text.to_string()));
    };

    let title = get_attr(&element, "title");

    let link_text = if text.is_empty() {
        get_attr(&element, "aria-label")
            .or_else(|| title.clone())
            .unwrap_or_default()
    } else {
        text.to_string()
    };

    let href = href.replace(' ', "%20");
    let result = match title {
        Some(title) => {
            let title = title.replace('"', "\\\"");
            format!("[{link_text}]({href} \"{title}\")")
        }
        None => format!("[{link_text}]({href})"),
    };

    Some(HandlerResult::from(result))
}

/// Get a non-blank attribute value from an element
fn get_attr(element: &Element, name: &str) -> Option<String> {
    element
        .attrs
        .iter()
        .find(|a| &*a.name.local == name)
        .map(|a| a.value.to_string())
        .filter(|v| !v.trim().is_empty())
}
