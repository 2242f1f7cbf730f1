//! Test utilities and helper functions for the url_to_markdown test suite

use axum::Router;
use mockito::{Mock, Server};
use std::sync::Arc;
use std::time::Duration;
use url_to_markdown::{
    AppState, FilterRegistry, HttpFetcher, PageConverter, ServiceConfig, build_router,
};

/// Creates a test HTML document with specified content
#[allow(dead_code)]
pub fn create_test_html(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{}</title>
    <style>body {{ font-family: sans-serif; }}</style>
</head>
<body>
    {}
</body>
</html>"#,
        html_escape::encode_text(title),
        body
    )
}

/// Creates an article page with chrome, code, a table and relative links
#[allow(dead_code)]
pub fn create_article_html() -> String {
    create_test_html(
        "Complex Test Page",
        r#"<nav><a href="/">Home</a> <a href="/blog">Blog</a></nav>
    <article>
        <h1>Main Heading</h1>
        <p>This is a paragraph with <strong>bold</strong> and <em>italic</em> text.</p>
        <pre><code class="language-rust">fn main() {
    println!("Hello, world!");
}</code></pre>
        <p>Visit <a href="/docs/start">the docs</a> for more info.</p>
        <table>
            <thead><tr><th>Name</th><th>Value</th></tr></thead>
            <tbody>
                <tr><td>Item 1</td><td>100</td></tr>
                <tr><td>Item 2</td><td>200</td></tr>
            </tbody>
        </table>
    </article>
    <footer>Copyright</footer>"#,
    )
}

/// Creates a mock endpoint that returns HTML content
#[allow(dead_code)]
pub async fn create_html_mock(server: &mut Server, path: &str, html: &str) -> Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(html)
        .create_async()
        .await
}

/// Creates a mock endpoint that returns an error
#[allow(dead_code)]
pub async fn create_error_mock(server: &mut Server, path: &str, status: usize) -> Mock {
    server
        .mock("GET", path)
        .with_status(status)
        .with_body("Error")
        .create_async()
        .await
}

/// Helper to create test URLs
#[allow(dead_code)]
pub fn test_url(server: &Server, path: &str) -> String {
    format!("{}{}", server.url(), path)
}

/// Service configuration with a short fetch timeout
#[allow(dead_code)]
pub fn test_config() -> ServiceConfig {
    ServiceConfig::builder()
        .fetch_timeout(Duration::from_secs(2))
        .max_body_bytes(64 * 1024)
        .build()
        .expect("Failed to create test config")
}

/// Router wired exactly as the binary wires it
#[allow(dead_code)]
pub fn test_app() -> Router {
    let config = test_config();
    let converter = PageConverter::new(Arc::new(
        FilterRegistry::with_builtin_sets().expect("built-in filters compile"),
    ));
    let fetcher = HttpFetcher::new(&config).expect("Failed to build HTTP client");
    build_router(Arc::new(AppState::new(converter, fetcher, config)))
}

/// Compares two markdown strings, normalizing whitespace
#[allow(dead_code)]
pub fn assert_markdown_eq(actual: &str, expected: &str) {
    let normalize = |s: &str| {
        s.lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    };

    let actual_normalized = normalize(actual);
    let expected_normalized = normalize(expected);

    if actual_normalized != expected_normalized {
        println!("=== ACTUAL ===\n{actual}\n");
        println!("=== EXPECTED ===\n{expected}\n");
        panic!("Markdown content does not match");
    }
}
