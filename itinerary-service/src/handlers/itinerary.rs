use crate::models::TravelRequest;
use crate::services::metrics::record_itinerary_outcome;
use crate::services::ItineraryError;
use crate::startup::AppState;
use axum::{body::Bytes, extract::State, Json};
use serde_json::Value;

/// `POST /api/gemini`: generate an itinerary from a traveller profile.
///
/// Responds with the model's JSON unchanged, or `{"error": ...}` with 400 for
/// a missing body, 500 for a missing credential, an unreadable body or a
/// reply that is not JSON, and the upstream's own status when the provider
/// fails.
#[tracing::instrument(skip(state, body), fields(body_len = body.len()))]
pub async fn generate_itinerary(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ItineraryError> {
    let result = async {
        let request = decode_travel_request(&body)?;
        state.itinerary.generate(&request).await
    }
    .await;

    match result {
        Ok(itinerary) => {
            record_itinerary_outcome("success");
            Ok(Json(itinerary))
        }
        Err(e) => {
            tracing::warn!(error = %e, outcome = e.outcome(), "Itinerary request failed");
            record_itinerary_outcome(e.outcome());
            Err(e)
        }
    }
}

/// Decode the request body.
///
/// An empty body or a falsy JSON value (`null`, `false`, `0`, `""`) counts as
/// missing. Any other JSON value is accepted as is; a body that is not JSON
/// is an internal error.
pub fn decode_travel_request(body: &[u8]) -> Result<TravelRequest, ItineraryError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ItineraryError::MissingInput);
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ItineraryError::Internal(format!("request body is not JSON: {}", e)))?;
    if is_falsy(&value) {
        return Err(ItineraryError::MissingInput);
    }

    Ok(TravelRequest::from(value))
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_falsy_bodies_are_missing() {
        for body in [
            &b""[..],
            &b"   \n"[..],
            &b"null"[..],
            &b"false"[..],
            &b"0"[..],
            &b"\"\""[..],
        ] {
            assert!(matches!(
                decode_travel_request(body),
                Err(ItineraryError::MissingInput)
            ));
        }
    }

    #[test]
    fn non_json_body_is_internal() {
        let err = decode_travel_request(b"age=30").unwrap_err();
        assert!(matches!(err, ItineraryError::Internal(_)));
        assert_eq!(err.to_string(), "Internal Server Error");
    }

    #[test]
    fn partial_bodies_are_accepted() {
        for body in [&b"{}"[..], &br#"{"location":"Paris"}"#[..], &br#"{"budget":""}"#[..]] {
            assert!(decode_travel_request(body).is_ok());
        }
    }

    #[test]
    fn form_payload_decodes() {
        let request = decode_travel_request(
            br#"{"age":"30","gender":"Male","location":"Hanoi","interests":"food","budget":"900","days":"2"}"#,
        )
        .unwrap();
        assert_eq!(request.field("location"), "Hanoi");
        assert_eq!(request.field("days"), "2");
    }
}
