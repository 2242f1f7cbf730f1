//! Selection helpers over a parsed document: page title and element lookup.

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("TITLE_SELECTOR is valid"));

/// Trimmed text of the first `<title>`, or `None` when absent or blank.
#[must_use]
pub fn page_title(document: &Html) -> Option<String> {
    let title = document
        .select(&TITLE_SELECTOR)
        .next()?
        .text()
        .collect::<String>();
    let title = title.trim();

    (!title.is_empty()).then(|| title.to_string())
}

/// First element whose `id` attribute equals `id`.
///
/// Compared literally rather than through a CSS selector, so ids containing
/// selector syntax still match.
#[must_use]
pub fn find_element_by_id<'a>(document: &'a Html, id: &str) -> Option<ElementRef<'a>> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().id() == Some(id))
}

/// Serialized markup of the whole document.
#[must_use]
pub fn document_markup(document: &Html) -> String {
    document.root_element().html()
}

/// A standalone document holding only the inner markup of the element with
/// the given id, or `None` when no such element exists.
#[must_use]
pub fn element_document_markup(document: &Html, id: &str) -> Option<String> {
    let element = find_element_by_id(document, id)?;
    Some(format!(
        "<!DOCTYPE html><html><body>{}</body></html>",
        element.inner_html()
    ))
}
