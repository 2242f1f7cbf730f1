pub mod api;
pub mod config;
pub mod fetch;
pub mod filters;
pub mod markdown_converter;
pub mod utils;

pub use api::{AppState, build_router};
pub use config::{ConfigError, ServiceConfig};
pub use fetch::{FetchError, HttpFetcher};
pub use filters::{FilterError, FilterRegistry, FilterSet, Replacement};
pub use markdown_converter::{
    ConversionOptions, ConvertError, ConvertedPage, PageConverter, tidy_markdown,
};
pub use utils::{SourceLocation, is_valid_url, parse_source_url};

/// Fetch `url` and convert it to tidied Markdown.
///
/// Convenience wrapper for one-off use; services should share a
/// [`PageConverter`] and [`HttpFetcher`] instead of rebuilding them.
///
/// # Errors
///
/// Fails if the filter sets do not compile, the page cannot be fetched or
/// the conversion fails.
pub async fn convert_url(
    url: &str,
    options: ConversionOptions,
) -> anyhow::Result<ConvertedPage> {
    let config = ServiceConfig::default();
    let fetcher = HttpFetcher::new(&config)?;
    let converter = PageConverter::new(std::sync::Arc::new(FilterRegistry::with_builtin_sets()?));

    let html = fetcher.fetch(url).await?;
    let mut page = converter
        .convert_async(Some(url.to_string()), html, options)
        .await?;
    page.markdown = tidy_markdown(&page.markdown);
    Ok(page)
}
