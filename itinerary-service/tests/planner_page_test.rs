//! Planner page flow: form submission, session state and the day carousel.

mod common;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use common::provider_router;
use itinerary_service::services::providers::mock::{MockTextProvider, SAMPLE_REPLY};
use itinerary_service::services::providers::{ProviderError, ProviderResponse, TextProvider};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const LISBON_FORM: &str =
    "age=30&gender=Female&location=Lisbon&interests=surfing&budget=1800&days=3";

/// Browser stand-in that carries the session cookie between requests.
struct Visitor {
    app: Router,
    cookie: Option<String>,
}

impl Visitor {
    fn new(app: Router) -> Self {
        Self { app, cookie: None }
    }

    async fn post_form(&mut self, uri: &str, form: &str) -> StatusCode {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }

        let response = self
            .app
            .clone()
            .oneshot(request.body(Body::from(form.to_string())).unwrap())
            .await
            .unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
        response.status()
    }

    async fn page(&self) -> String {
        let mut request = Request::builder().uri("/");
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }

        let response = self
            .app
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }
}

/// Succeeds once with the sample reply, then fails every call.
struct FlakyProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl TextProvider for FlakyProvider {
    fn name(&self) -> &'static str {
        "flaky"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn generate(&self, _prompt: &str) -> Result<ProviderResponse, ProviderError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(ProviderResponse {
                text: Some(SAMPLE_REPLY.to_string()),
                ..Default::default()
            })
        } else {
            Err(ProviderError::Upstream {
                status: 503,
                message: "Gemini API error: Service Unavailable".to_string(),
            })
        }
    }
}

/// First call takes a while; every call returns the sample reply.
struct SlowFirstCallProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl TextProvider for SlowFirstCallProvider {
    fn name(&self) -> &'static str {
        "slow-first-call"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn generate(&self, _prompt: &str) -> Result<ProviderResponse, ProviderError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        Ok(ProviderResponse {
            text: Some(SAMPLE_REPLY.to_string()),
            ..Default::default()
        })
    }
}

#[tokio::test]
async fn fresh_visitor_sees_empty_form() {
    let visitor = Visitor::new(provider_router(Arc::new(MockTextProvider::new(true))));

    let html = visitor.page().await;

    assert!(html.contains("AI Travel Planner"));
    assert!(html.contains(r#"<option value="Male" selected>"#));
    assert!(html.contains("Get Itinerary"));
    assert!(!html.contains("Daily Itinerary"));
}

#[tokio::test]
async fn submitting_the_form_shows_the_first_day() {
    let mut visitor = Visitor::new(provider_router(Arc::new(MockTextProvider::new(true))));

    let status = visitor.post_form("/plan", LISBON_FORM).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert!(visitor.cookie.is_some());

    let html = visitor.page().await;
    assert!(html.contains("Tiles and Tides"));
    assert!(html.contains("Day 1: Alfama Wanderings"));
    assert!(html.contains("09:00 - 11:00: Ride tram 28 up to the castle"));
    assert!(html.contains("1 / 3"));
    assert!(html.contains("Join a walking tour"));
    assert!(html.contains(r#"value="Lisbon""#));
    assert!(html.contains(r#"<option value="Female" selected>"#));
    assert!(!html.contains("Generating..."));
}

#[tokio::test]
async fn carousel_is_clamped_at_both_ends() {
    let mut visitor = Visitor::new(provider_router(Arc::new(MockTextProvider::new(true))));
    visitor.post_form("/plan", LISBON_FORM).await;

    for _ in 0..5 {
        visitor.post_form("/carousel/next", "").await;
    }
    let html = visitor.page().await;
    assert!(html.contains("Day 3: Surf at Costa da Caparica"));
    assert!(html.contains("3 / 3"));

    for _ in 0..5 {
        visitor.post_form("/carousel/prev", "").await;
    }
    let html = visitor.page().await;
    assert!(html.contains("Day 1: Alfama Wanderings"));
    assert!(html.contains("1 / 3"));
}

#[tokio::test]
async fn invalid_age_blocks_submission() {
    let mut visitor = Visitor::new(provider_router(Arc::new(MockTextProvider::new(true))));

    visitor
        .post_form(
            "/plan",
            "age=130&gender=Male&location=Oslo&interests=fjords&budget=900&days=2",
        )
        .await;

    let html = visitor.page().await;
    assert!(html.contains("Age must be an integer between 0 and 120."));
    assert!(html.contains(r#"value="Oslo""#));
    assert!(!html.contains("Daily Itinerary"));
}

#[tokio::test]
async fn failed_request_keeps_previous_itinerary() {
    let provider = Arc::new(FlakyProvider {
        calls: AtomicUsize::new(0),
    });
    let mut visitor = Visitor::new(provider_router(provider.clone()));

    visitor.post_form("/plan", LISBON_FORM).await;
    visitor.post_form("/carousel/next", "").await;
    visitor
        .post_form(
            "/plan",
            "age=30&gender=Female&location=Porto&interests=wine&budget=1200&days=2",
        )
        .await;

    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    let html = visitor.page().await;
    assert!(html.contains("Tiles and Tides"));
    assert!(html.contains("Day 2: Belem and the River"));
    assert!(html.contains(r#"value="Porto""#));
    assert!(html.contains("Get Itinerary"));
}

#[tokio::test]
async fn failed_first_request_shows_no_result() {
    let mut visitor = Visitor::new(provider_router(Arc::new(MockTextProvider::with_reply(
        true,
        "Sorry, no plan.",
    ))));

    visitor.post_form("/plan", LISBON_FORM).await;

    let html = visitor.page().await;
    assert!(!html.contains("Daily Itinerary"));
    assert!(html.contains("Get Itinerary"));
}

#[tokio::test]
async fn abandoned_submission_does_not_lock_the_form() {
    let provider = Arc::new(SlowFirstCallProvider {
        calls: AtomicUsize::new(0),
    });
    let mut visitor = Visitor::new(provider_router(provider.clone()));

    // Establish the session cookie.
    visitor.post_form("/carousel/next", "").await;
    let cookie = visitor.cookie.clone().unwrap();

    // The visitor leaves while the first request is still running.
    let abandoned = visitor.app.clone().oneshot(
        Request::builder()
            .method("POST")
            .uri("/plan")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(header::COOKIE, &cookie)
            .body(Body::from(LISBON_FORM))
            .unwrap(),
    );
    assert!(tokio::time::timeout(Duration::from_millis(50), abandoned)
        .await
        .is_err());

    // The request still finishes in the background and clears the flag.
    let mut finished = false;
    for _ in 0..40 {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let html = visitor.page().await;
        if html.contains("Tiles and Tides") && !html.contains("Generating...") {
            finished = true;
            break;
        }
    }
    assert!(finished, "background submission never completed");

    let status = visitor.post_form("/plan", LISBON_FORM).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
}
