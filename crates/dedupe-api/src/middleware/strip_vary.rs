//! # Strip Vary
//!
//! Removes the `Vary` header from file responses. Some clients refuse to
//! cache responses that carry it. Layered only onto the file-serving
//! routers; API responses keep their headers.

use axum::extract::Request;
use axum::http::header::VARY;
use axum::middleware::Next;
use axum::response::Response;

pub async fn strip_vary(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    response.headers_mut().remove(VARY);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    async fn with_vary() -> ([(axum::http::HeaderName, &'static str); 1], &'static str) {
        ([(VARY, "Accept-Encoding")], "body")
    }

    fn app() -> Router {
        let files = Router::new()
            .route("/files/a.txt", get(with_vary))
            .layer(from_fn(strip_vary));
        Router::new().route("/api", get(with_vary)).merge(files)
    }

    async fn vary_of(uri: &str) -> Option<String> {
        let response = app()
            .oneshot(HttpRequest::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        response
            .headers()
            .get(VARY)
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn file_responses_lose_vary() {
        assert_eq!(vary_of("/files/a.txt").await, None);
    }

    #[tokio::test]
    async fn other_responses_keep_vary() {
        assert_eq!(vary_of("/api").await.as_deref(), Some("Accept-Encoding"));
    }
}
