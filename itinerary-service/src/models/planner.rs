//! Planner page state: the form's field map, the last itinerary, and the
//! carousel position. Lives in the visitor's session between requests.

use super::{Day, TravelItinerary};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use time::{Duration, OffsetDateTime};
use validator::Validate;

/// Form fields, in display order.
pub const FORM_FIELDS: [&str; 6] = ["age", "gender", "location", "interests", "budget", "days"];

pub const GENDER_OPTIONS: [&str; 4] = ["Male", "Female", "Non-binary", "Prefer not to say"];

pub const AGE_ERROR: &str = "Age must be an integer between 0 and 120.";

#[derive(Debug, Validate)]
struct AgeInput {
    #[validate(range(min = 0, max = 120, message = "Age must be an integer between 0 and 120."))]
    age: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldErrors {
    pub age: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerState {
    pub fields: BTreeMap<String, String>,
    pub result: Option<TravelItinerary>,
    pub loading: bool,
    /// When the in-flight submission started.
    #[serde(default)]
    pub loading_since: Option<OffsetDateTime>,
    pub current_day: usize,
    pub errors: FieldErrors,
}

impl Default for PlannerState {
    fn default() -> Self {
        let mut fields: BTreeMap<String, String> = FORM_FIELDS
            .iter()
            .map(|name| (name.to_string(), String::new()))
            .collect();
        fields.insert("gender".to_string(), GENDER_OPTIONS[0].to_string());

        Self {
            fields,
            result: None,
            loading: false,
            loading_since: None,
            current_day: 0,
            errors: FieldErrors::default(),
        }
    }
}

impl PlannerState {
    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or_default()
    }

    /// Store a field value. Names outside [`FORM_FIELDS`] are ignored.
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) {
        if FORM_FIELDS.contains(&name) {
            self.fields.insert(name.to_string(), value.into());
        }
    }

    /// Check the age field, the only one validated before submitting.
    pub fn validate(&mut self) -> bool {
        let age_ok = self
            .field("age")
            .trim()
            .parse::<i64>()
            .ok()
            .map(|age| AgeInput { age }.validate().is_ok())
            .unwrap_or(false);

        self.errors = FieldErrors {
            age: (!age_ok).then(|| AGE_ERROR.to_string()),
        };
        age_ok
    }

    /// Start a submission.
    ///
    /// Returns the request payload (the field map as a JSON object of strings)
    /// and sets `loading`, or `None` when a submission is already in flight or
    /// the form does not validate.
    pub fn begin_submit(&mut self, now: OffsetDateTime, stale_after: Duration) -> Option<Value> {
        if self.submission_in_flight(now, stale_after) || !self.validate() {
            return None;
        }
        self.loading = true;
        self.loading_since = Some(now);

        let payload: Map<String, Value> = self
            .fields
            .iter()
            .map(|(name, value)| (name.clone(), Value::String(value.clone())))
            .collect();
        Some(Value::Object(payload))
    }

    /// Finish a submission. A new itinerary replaces the old one and rewinds
    /// the carousel; a failure keeps whatever was shown before.
    pub fn finish_submit(&mut self, outcome: Option<TravelItinerary>) {
        if let Some(itinerary) = outcome {
            self.result = Some(itinerary);
            self.current_day = 0;
        }
        self.loading = false;
        self.loading_since = None;
    }

    /// A submission older than `stale_after` counts as abandoned.
    pub fn submission_in_flight(&self, now: OffsetDateTime, stale_after: Duration) -> bool {
        self.loading
            && self
                .loading_since
                .is_some_and(|since| now - since < stale_after)
    }

    pub fn day_count(&self) -> usize {
        self.result.as_ref().map(|r| r.days.len()).unwrap_or(0)
    }

    fn last_day_index(&self) -> usize {
        self.day_count().saturating_sub(1)
    }

    pub fn next_day(&mut self) {
        self.current_day = (self.current_day + 1).min(self.last_day_index());
    }

    pub fn prev_day(&mut self) {
        self.current_day = self.current_day.saturating_sub(1).min(self.last_day_index());
    }

    pub fn has_prev_day(&self) -> bool {
        self.current_day > 0
    }

    pub fn has_next_day(&self) -> bool {
        self.current_day < self.last_day_index()
    }

    pub fn current_day_entry(&self) -> Option<&Day> {
        self.result.as_ref()?.days.get(self.current_day)
    }
}
