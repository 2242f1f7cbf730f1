//! HTML to Markdown conversion pipeline.
//!
//! [`PageConverter`] runs one document through every stage:
//! 1. strip `<style>`/`<script>` blocks and parse
//! 2. read the title, optionally re-root to one element by id
//! 3. optionally extract the main content (falls back to the full markup)
//! 4. shield code blocks, then tables, behind placeholder tokens
//! 5. convert with htmd and restore the shielded fragments
//! 6. apply the site-aware filter chain, absolutize links, optionally strip
//!    them, and optionally prepend the title
//!
//! ```rust
//! # use url_to_markdown::filters::FilterRegistry;
//! # use url_to_markdown::markdown_converter::{ConversionOptions, PageConverter};
//! # use std::sync::Arc;
//! let converter = PageConverter::new(Arc::new(FilterRegistry::with_builtin_sets()?));
//! let html = "<html><head><title>Hi</title></head><body><p>See <a href=\"/docs\">docs</a></p></body></html>";
//!
//! let page = converter.convert(Some("https://example.com/a/b"), html, &ConversionOptions::default())?;
//! assert_eq!(page.title, "Hi");
//! assert!(page.markdown.starts_with("# Hi\n"));
//! assert!(page.markdown.contains("[docs](https://example.com/docs)"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod custom_handlers;
pub mod html_preprocessing;
pub mod link_rewriting;
pub mod markdown_postprocessing;
pub mod placeholder_vault;

use scraper::Html;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::filters::FilterRegistry;
use crate::utils::parse_source_url;
use html_preprocessing::{
    document_markup, element_document_markup, extract_main_content, page_title,
    protect_code_blocks, protect_tables, strip_style_and_script_blocks,
};
use placeholder_vault::PlaceholderVault;

pub use link_rewriting::{absolutize_links, strip_links};
pub use markdown_postprocessing::tidy_markdown;

/// Per-request conversion switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    /// Prepend `# {title}` when the page has a title (default: true)
    pub inline_title: bool,

    /// Collapse inline links to their labels (default: false)
    pub ignore_links: bool,

    /// Run main-content extraction (default: true)
    pub improve_readability: bool,

    /// Convert only the inner markup of the element with this id
    pub element_id: Option<String>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            inline_title: true,
            ignore_links: false,
            improve_readability: true,
            element_id: None,
        }
    }
}

/// Result of one conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertedPage {
    pub markdown: String,
    /// Trimmed `<title>` text, empty when the page has none
    pub title: String,
}

/// Errors raised by [`PageConverter`]
#[derive(Debug, Error)]
pub enum ConvertError {
    /// htmd failed to serialize the document
    #[error("Markdown conversion failed: {0}")]
    Markdown(#[from] std::io::Error),

    /// The blocking conversion task panicked or was cancelled
    #[error("Conversion task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Converts HTML documents to Markdown using a shared filter registry.
///
/// Holds no per-request state; clone it freely or share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PageConverter {
    filters: Arc<FilterRegistry>,
}

impl PageConverter {
    #[must_use]
    pub fn new(filters: Arc<FilterRegistry>) -> Self {
        Self { filters }
    }

    #[must_use]
    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    /// Convert `html`, fetched from `url` when known.
    ///
    /// Without a URL only the universal filter set runs and links are not
    /// absolutized.
    ///
    /// # Errors
    ///
    /// [`ConvertError::Markdown`] if htmd fails. Main-content extraction
    /// failures never surface; the full document is used instead.
    pub fn convert(
        &self,
        url: Option<&str>,
        html: &str,
        options: &ConversionOptions,
    ) -> Result<ConvertedPage, ConvertError> {
        let html = strip_style_and_script_blocks(html);
        let document = Html::parse_document(&html);
        let title = page_title(&document).unwrap_or_default();

        let working_markup = match options.element_id.as_deref() {
            Some(id) if !id.is_empty() => element_document_markup(&document, id)
                .unwrap_or_else(|| {
                    tracing::debug!(id, "Element id not found, converting full document");
                    document_markup(&document)
                }),
            _ => document_markup(&document),
        };
        drop(document);

        let content = if options.improve_readability {
            readable_content(&working_markup).unwrap_or(working_markup)
        } else {
            working_markup
        };

        let mut vault = PlaceholderVault::for_document(&content);
        let content = protect_code_blocks(&content, &mut vault);
        let content = protect_tables(&content, &mut vault);

        let converter = custom_handlers::create_converter();
        let markdown = converter.convert(&content)?;
        let markdown = vault.restore_all(&markdown);

        let source = url.and_then(parse_source_url);
        let hostname = source.as_ref().map_or("", |s| s.hostname.as_str());
        let mut markdown = self.filters.apply(hostname, &markdown);

        if let Some(source) = &source {
            markdown = absolutize_links(&markdown, &source.origin);
        }
        if options.ignore_links {
            markdown = strip_links(&markdown);
        }
        if options.inline_title && !title.is_empty() {
            markdown = format!("# {title}\n{markdown}");
        }

        Ok(ConvertedPage { markdown, title })
    }

    /// [`convert`](Self::convert) on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// As [`convert`](Self::convert), plus [`ConvertError::Task`] if the
    /// blocking task panics.
    pub async fn convert_async(
        &self,
        url: Option<String>,
        html: String,
        options: ConversionOptions,
    ) -> Result<ConvertedPage, ConvertError> {
        let converter = self.clone();
        tokio::task::spawn_blocking(move || converter.convert(url.as_deref(), &html, &options))
            .await?
    }
}

/// Main content of `markup`, or `None` when extraction fails or finds
/// nothing.
fn readable_content(markup: &str) -> Option<String> {
    match extract_main_content(markup) {
        Ok(content) if !content.trim().is_empty() => Some(content),
        Ok(_) => {
            tracing::debug!("Main content extraction found nothing, using full document");
            None
        }
        Err(e) => {
            tracing::debug!("Main content extraction failed: {e}, using full document");
            None
        }
    }
}
