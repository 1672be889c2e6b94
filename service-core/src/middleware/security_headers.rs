use axum::{extract::Request, http::header, middleware::Next, response::IntoResponse};

/// Paths that only ever return JSON or plain text.
const MACHINE_PREFIXES: [&str; 4] = ["/api/", "/health", "/ready", "/metrics"];

pub async fn security_headers_middleware(req: Request, next: Next) -> impl IntoResponse {
    let path = req.uri().path();
    let is_machine_route = MACHINE_PREFIXES.iter().any(|prefix| path.starts_with(prefix));

    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        header::HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        header::HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    headers.insert(
        header::X_FRAME_OPTIONS,
        header::HeaderValue::from_static("DENY"),
    );

    if is_machine_route {
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            header::HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
        );
    } else {
        // Server-rendered pages: inline styles, same-origin form posts.
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            header::HeaderValue::from_static(
                "default-src 'self'; \
                 style-src 'self' 'unsafe-inline'; \
                 img-src 'self' data:; \
                 form-action 'self'; \
                 frame-ancestors 'none'",
            ),
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, middleware::from_fn, routing::get};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { "page" }))
            .route("/api/gemini", get(|| async { "{}" }))
            .layer(from_fn(security_headers_middleware))
    }

    async fn csp_for(uri: &str) -> String {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        response.headers()[header::CONTENT_SECURITY_POLICY]
            .to_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn api_routes_get_strict_policy() {
        assert_eq!(
            csp_for("/api/gemini").await,
            "default-src 'none'; frame-ancestors 'none'"
        );
    }

    #[tokio::test]
    async fn pages_allow_inline_styles() {
        let csp = csp_for("/").await;
        assert!(csp.contains("style-src 'self' 'unsafe-inline'"));
        assert!(csp.contains("form-action 'self'"));
    }
}
