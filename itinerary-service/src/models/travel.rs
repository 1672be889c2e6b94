//! Traveller profile sent to the itinerary endpoint.

use serde_json::{Map, Value};
use std::borrow::Cow;

/// Profile values shown to the model.
///
/// Nothing is checked or converted: each value is rendered into the prompt
/// the way it was sent, and a field the client left out renders as
/// `undefined`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TravelRequest {
    fields: Map<String, Value>,
}

impl TravelRequest {
    pub fn field(&self, name: &str) -> Cow<'_, str> {
        match self.fields.get(name) {
            None => Cow::Borrowed("undefined"),
            Some(value) => render(value),
        }
    }
}

/// A non-object body carries no fields.
impl From<Value> for TravelRequest {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }
}

fn render(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(text) => Cow::Borrowed(text),
        Value::Null => Cow::Borrowed("null"),
        Value::Bool(flag) => Cow::Owned(flag.to_string()),
        Value::Number(number) => Cow::Owned(render_number(number)),
        Value::Array(items) => Cow::Owned(
            items
                .iter()
                .map(|item| match item {
                    Value::Null => Cow::Borrowed(""),
                    other => render(other),
                })
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Cow::Borrowed("[object Object]"),
    }
}

/// Whole floats print without a fraction (`1800.0` -> `1800`).
fn render_number(number: &serde_json::Number) -> String {
    match number.as_f64() {
        Some(float) if number.is_f64() && float.fract() == 0.0 && float.abs() < 1e15 => {
            format!("{}", float as i64)
        }
        _ => number.to_string(),
    }
}
