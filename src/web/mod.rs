//! Embedded web UI
//!
//! One static page that posts the goal to `/api/runs` and renders the
//! returned HTML.

use axum::response::Html;
use axum::routing::get;
use axum::Router;
use pulldown_cmark::{html, Event, Options, Parser};

/// The UI page (compiled into the binary)
pub const INDEX_HTML: &str = include_str!("index.html");

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// UI routes
pub fn web_routes() -> Router {
    Router::new().route("/", get(index))
}

/// Render model output as HTML.
///
/// Raw HTML in the input is escaped rather than passed through.
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);

    html_output
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[test]
    fn test_render_markdown() {
        let html = render_markdown("## Signals\n\n- **Agents** go mainstream");
        assert!(html.contains("<h2>Signals</h2>"));
        assert!(html.contains("<strong>Agents</strong>"));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = render_markdown("<script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[tokio::test]
    async fn test_index_page() {
        let response = web_routes()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let page = String::from_utf8(body.to_vec()).unwrap();
        assert!(page.contains("Research Crew Demo"));
        assert!(page.contains("Run Research Crew"));
        assert!(page.contains("Crew running (30-90 seconds)..."));
    }
}
