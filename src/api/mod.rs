//! HTTP surface: `GET /?url=…`, `POST /`, health and CORS.

pub mod errors;
pub mod options;

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{DefaultBodyLimit, Query, State};
use axum::http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, Any, CorsLayer, ExposeHeaders};
use tower_http::trace::TraceLayer;

use crate::config::ServiceConfig;
use crate::fetch::HttpFetcher;
use crate::markdown_converter::{ConvertedPage, PageConverter, tidy_markdown};
use crate::utils::is_valid_url;
pub use errors::ApiError;
use options::{ConvertQuery, ConvertRequest};

/// Response header carrying the URL-encoded page title
pub const TITLE_HEADER: &str = "x-title";

const MARKDOWN_CONTENT_TYPE: &str = "text/markdown";

/// Shared, read-only request state
#[derive(Debug, Clone)]
pub struct AppState {
    pub converter: PageConverter,
    pub fetcher: HttpFetcher,
    pub config: ServiceConfig,
}

impl AppState {
    #[must_use]
    pub fn new(converter: PageConverter, fetcher: HttpFetcher, config: ServiceConfig) -> Self {
        Self {
            converter,
            fetcher,
            config,
        }
    }
}

/// Router with CORS, request tracing and the body size limit applied.
///
/// Conversion is also served on every other path: `GET ?url=` and `POST`
/// work anywhere, while the health document is only on `/` and `/health`.
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_body_bytes();

    Router::new()
        .route("/", get(get_root).post(post_convert))
        .route("/health", get(get_root))
        .fallback(any_path)
        .method_not_allowed_fallback(any_path)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(build_cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(AllowMethods::list([Method::GET, Method::POST, Method::OPTIONS]))
        .allow_headers(AllowHeaders::list([CONTENT_TYPE]))
        .expose_headers(ExposeHeaders::list([HeaderName::from_static(TITLE_HEADER)]))
}

async fn get_root(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConvertQuery>,
) -> Result<Response, ApiError> {
    if query.url.is_none() {
        return Ok(health().into_response());
    }
    convert_query(&state, query).await
}

async fn post_convert(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Response, ApiError> {
    convert_body(&state, &body).await
}

/// Paths without a dedicated route.
async fn any_path(
    State(state): State<Arc<AppState>>,
    method: Method,
    query: Result<Query<ConvertQuery>, QueryRejection>,
    body: Bytes,
) -> Result<Response, ApiError> {
    match (method, query) {
        (Method::GET, Ok(Query(query))) if query.url.is_some() => {
            convert_query(&state, query).await
        }
        (Method::POST, _) => convert_body(&state, &body).await,
        _ => Ok(not_found().into_response()),
    }
}

async fn convert_query(state: &AppState, query: ConvertQuery) -> Result<Response, ApiError> {
    let Some(url) = query.url.as_deref() else {
        return Err(ApiError::InvalidQueryUrl);
    };
    if !is_valid_url(url) {
        return Err(ApiError::InvalidQueryUrl);
    }

    let options = query.flags().conversion_options();
    let html = state
        .fetcher
        .fetch(url)
        .await
        .map_err(ApiError::fetch_plain)?;

    let page = state
        .converter
        .convert_async(Some(url.to_string()), html, options)
        .await
        .map_err(|e| ApiError::Unparseable {
            details: e.to_string(),
        })?;

    Ok(markdown_response(page))
}

async fn convert_body(state: &AppState, body: &[u8]) -> Result<Response, ApiError> {
    let request: ConvertRequest =
        serde_json::from_slice(body).map_err(|e| ApiError::Unparseable {
            details: e.to_string(),
        })?;

    let options = request.flags.conversion_options();
    let url = request.url.filter(|u| !u.is_empty());

    let html = match (request.html.filter(|h| !h.is_empty()), url.as_deref()) {
        (Some(html), _) => html,
        (None, Some(url)) => {
            if !is_valid_url(url) {
                return Err(ApiError::InvalidBodyUrl);
            }
            state
                .fetcher
                .fetch(url)
                .await
                .map_err(ApiError::fetch_json)?
        }
        (None, None) => return Err(ApiError::MissingInput),
    };

    let page = state
        .converter
        .convert_async(url, html, options)
        .await
        .map_err(|e| ApiError::Unparseable {
            details: e.to_string(),
        })?;

    Ok(markdown_response(page))
}

fn markdown_response(page: ConvertedPage) -> Response {
    let mut response = (
        [(CONTENT_TYPE, MARKDOWN_CONTENT_TYPE)],
        tidy_markdown(&page.markdown),
    )
        .into_response();

    if !page.title.is_empty()
        && let Ok(value) = HeaderValue::from_str(&urlencoding::encode(&page.title))
    {
        response
            .headers_mut()
            .insert(HeaderName::from_static(TITLE_HEADER), value);
    }
    response
}

fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "URL to Markdown API",
        "usage": {
            "GET": "/?url=https://example.com&title=true&links=true&clean=true",
            "POST": r#"{ "url": "https://example.com", "title": true, "links": true, "clean": true }"#,
        },
    }))
}

fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not found",
            "availableEndpoints": [
                "GET /?url=https://example.com - Convert URL to markdown",
                "POST / - Convert URL or HTML to markdown",
                "GET /health - Health check",
            ],
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FilterRegistry;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> Router {
        let config = ServiceConfig::default();
        let converter = PageConverter::new(Arc::new(
            FilterRegistry::with_builtin_sets().expect("built-in filters compile"),
        ));
        let fetcher = HttpFetcher::new(&config).expect("client builds");
        build_router(Arc::new(AppState::new(converter, fetcher, config)))
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body collects");
        String::from_utf8(bytes.to_vec()).expect("utf-8 body")
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    #[tokio::test]
    async fn test_health_on_root_and_health() {
        for uri in ["/", "/health"] {
            let response = app()
                .oneshot(Request::get(uri).body(Body::empty()).expect("request builds"))
                .await
                .expect("router responds");
            assert_eq!(response.status(), StatusCode::OK);

            let json: serde_json::Value =
                serde_json::from_str(&body_text(response).await).expect("json body");
            assert_eq!(json["status"], "ok");
            assert_eq!(json["message"], "URL to Markdown API");
        }
    }

    #[tokio::test]
    async fn test_invalid_query_url() {
        let response = app()
            .oneshot(
                Request::get("/?url=not-a-url")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_text(response).await,
            "Please specify a valid url query parameter"
        );
    }

    #[tokio::test]
    async fn test_post_html_returns_markdown_with_title() {
        let response = app()
            .oneshot(post_json(
                r#"{"html": "<html><head><title>Hello World</title></head><body><p>Body</p></body></html>", "title": true}"#,
            ))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], MARKDOWN_CONTENT_TYPE);
        assert_eq!(response.headers()[TITLE_HEADER], "Hello%20World");
        assert_eq!(body_text(response).await, "# Hello World\nBody");
    }

    #[tokio::test]
    async fn test_post_without_input() {
        let response = app()
            .oneshot(post_json(r#"{"title": true}"#))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json: serde_json::Value =
            serde_json::from_str(&body_text(response).await).expect("json body");
        assert_eq!(json["error"], "Please provide either a URL or HTML content");
    }

    #[tokio::test]
    async fn test_post_invalid_url() {
        let response = app()
            .oneshot(post_json(r#"{"url": "ftp://example.com/file"}"#))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json: serde_json::Value =
            serde_json::from_str(&body_text(response).await).expect("json body");
        assert_eq!(json["error"], "Please specify a valid URL");
    }

    #[tokio::test]
    async fn test_post_malformed_body() {
        let response = app()
            .oneshot(post_json("{not json"))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json: serde_json::Value =
            serde_json::from_str(&body_text(response).await).expect("json body");
        assert_eq!(json["error"], "Could not parse that document");
        assert!(json["details"].as_str().is_some_and(|d| !d.is_empty()));
    }

    #[tokio::test]
    async fn test_unknown_route_and_method() {
        for request in [
            Request::get("/nope").body(Body::empty()),
            Request::put("/").body(Body::empty()),
        ] {
            let response = app()
                .oneshot(request.expect("request builds"))
                .await
                .expect("router responds");
            assert_eq!(response.status(), StatusCode::NOT_FOUND);

            let json: serde_json::Value =
                serde_json::from_str(&body_text(response).await).expect("json body");
            assert_eq!(json["error"], "Not found");
            assert_eq!(json["availableEndpoints"].as_array().map(Vec::len), Some(3));
        }
    }

    #[tokio::test]
    async fn test_post_on_any_path_converts() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/convert/v1")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"html": "<p>Anywhere</p>"}"#))
            .expect("request builds");
        let response = app().oneshot(request).await.expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "Anywhere");
    }

    #[tokio::test]
    async fn test_invalid_query_url_on_any_path() {
        let response = app()
            .oneshot(
                Request::get("/some/page?url=ftp://example.com")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_plain_options_is_accepted() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/anything")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert!(response.status().is_success());
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn test_cors_preflight_and_expose() {
        let preflight = Request::builder()
            .method(Method::OPTIONS)
            .uri("/")
            .header("origin", "https://app.example")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .expect("request builds");
        let response = app().oneshot(preflight).await.expect("router responds");

        assert!(response.status().is_success());
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        let methods = response.headers()["access-control-allow-methods"]
            .to_str()
            .expect("ascii header");
        assert!(methods.contains("GET") && methods.contains("POST") && methods.contains("OPTIONS"));

        let response = app()
            .oneshot(post_json(r#"{"html": "<p>x</p>"}"#))
            .await
            .expect("router responds");
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert_eq!(response.headers()["access-control-expose-headers"], TITLE_HEADER);
    }
}
