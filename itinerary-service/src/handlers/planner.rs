//! Planner page: the travel form and the day-by-day carousel.
//!
//! State is kept per visitor in the session; every action redirects back to
//! `/` so a refresh never resubmits.

use crate::models::planner::GENDER_OPTIONS;
use crate::models::{BudgetBreakdown, Day, PlannerState, TravelItinerary, TravelRequest};
use crate::services::metrics::record_itinerary_outcome;
use crate::startup::AppState;
use askama::Template;
use axum::{extract::State, response::Redirect, Form};
use serde_json::Value;
use service_core::error::AppError;
use std::collections::HashMap;
use time::{Duration, OffsetDateTime};
use tower_sessions::Session;

const PLANNER_SESSION_KEY: &str = "planner";

pub struct GenderOption {
    pub value: &'static str,
    pub selected: bool,
}

pub struct ItineraryView {
    pub trip_title: String,
    pub destination: String,
    pub budget: f64,
    pub breakdown: BudgetBreakdown,
    pub day: Option<Day>,
    pub position: usize,
    pub day_count: usize,
    pub has_prev: bool,
    pub has_next: bool,
    pub meeting_people_tips: Vec<String>,
    pub important_notes: Vec<String>,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub age: String,
    pub location: String,
    pub interests: String,
    pub budget: String,
    pub days: String,
    pub gender_options: Vec<GenderOption>,
    pub age_error: Option<String>,
    pub loading: bool,
    pub itinerary: Option<ItineraryView>,
}

impl From<&PlannerState> for IndexTemplate {
    fn from(planner: &PlannerState) -> Self {
        let gender = planner.field("gender");
        let itinerary = planner.result.as_ref().map(|result| ItineraryView {
            trip_title: result.trip_title.clone(),
            destination: result.destination.clone(),
            budget: result.budget,
            breakdown: result.budget_breakdown.clone(),
            day: planner.current_day_entry().cloned(),
            position: planner.current_day + 1,
            day_count: planner.day_count(),
            has_prev: planner.has_prev_day(),
            has_next: planner.has_next_day(),
            meeting_people_tips: result.meeting_people_tips.clone(),
            important_notes: result.important_notes.clone(),
        });

        Self {
            age: planner.field("age").to_string(),
            location: planner.field("location").to_string(),
            interests: planner.field("interests").to_string(),
            budget: planner.field("budget").to_string(),
            days: planner.field("days").to_string(),
            gender_options: GENDER_OPTIONS
                .iter()
                .map(|&value| GenderOption {
                    value,
                    selected: value == gender,
                })
                .collect(),
            age_error: planner.errors.age.clone(),
            loading: planner.loading,
            itinerary,
        }
    }
}

fn session_error(err: tower_sessions::session::Error) -> AppError {
    AppError::InternalError(anyhow::anyhow!("planner session: {}", err))
}

async fn load_planner(session: &Session) -> Result<PlannerState, AppError> {
    Ok(session
        .get::<PlannerState>(PLANNER_SESSION_KEY)
        .await
        .map_err(session_error)?
        .unwrap_or_default())
}

async fn store_planner(session: &Session, planner: &PlannerState) -> Result<(), AppError> {
    session
        .insert(PLANNER_SESSION_KEY, planner)
        .await
        .map_err(session_error)
}

pub async fn index(session: Session) -> Result<IndexTemplate, AppError> {
    let planner = load_planner(&session).await?;
    Ok(IndexTemplate::from(&planner))
}

/// `POST /plan`: store the submitted fields and, when the form validates and
/// nothing is in flight, request a new itinerary.
///
/// The request runs on its own task, which clears `loading` and saves the
/// session itself, so a visitor who leaves mid-request is not locked out.
pub async fn submit_plan(
    State(state): State<AppState>,
    session: Session,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Redirect, AppError> {
    let mut planner = load_planner(&session).await?;
    for (name, value) in fields {
        planner.set_field(&name, value);
    }

    let Some(payload) =
        planner.begin_submit(OffsetDateTime::now_utc(), submission_timeout(&state))
    else {
        store_planner(&session, &planner).await?;
        return Ok(Redirect::to("/"));
    };

    // Persist `loading` now so a second tab sees the submission in flight.
    store_planner(&session, &planner).await?;
    session.save().await.map_err(session_error)?;

    let task_session = session.clone();
    let submission = tokio::spawn(async move {
        let outcome = fetch_itinerary(&state, payload).await;
        planner.finish_submit(outcome);
        store_planner(&task_session, &planner).await?;
        task_session.save().await.map_err(session_error)
    });

    submission
        .await
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("itinerary submission: {}", e)))??;

    Ok(Redirect::to("/"))
}

/// How long a submission may stay in flight before a new one is allowed:
/// the upstream timeout plus some slack.
fn submission_timeout(state: &AppState) -> Duration {
    let upstream = i64::try_from(state.config.gemini.timeout_secs).unwrap_or(i64::MAX);
    Duration::seconds(upstream).saturating_add(Duration::seconds(30))
}

/// Run one itinerary request. Failures are logged and yield `None` so the
/// page keeps showing the previous result.
async fn fetch_itinerary(state: &AppState, payload: Value) -> Option<TravelItinerary> {
    let request = TravelRequest::from(payload);

    let value = match state.itinerary.generate(&request).await {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(error = %e, "Error fetching itinerary");
            record_itinerary_outcome(e.outcome());
            return None;
        }
    };

    match serde_json::from_value::<TravelItinerary>(value) {
        Ok(itinerary) => {
            record_itinerary_outcome("success");
            Some(itinerary)
        }
        Err(e) => {
            tracing::error!(error = %e, "Error fetching itinerary: unexpected itinerary shape");
            record_itinerary_outcome("malformed_upstream_json");
            None
        }
    }
}

pub async fn next_day(session: Session) -> Result<Redirect, AppError> {
    let mut planner = load_planner(&session).await?;
    planner.next_day();
    store_planner(&session, &planner).await?;
    Ok(Redirect::to("/"))
}

pub async fn prev_day(session: Session) -> Result<Redirect, AppError> {
    let mut planner = load_planner(&session).await?;
    planner.prev_day();
    store_planner(&session, &planner).await?;
    Ok(Redirect::to("/"))
}
