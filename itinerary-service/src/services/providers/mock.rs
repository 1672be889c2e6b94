//! Mock provider for tests and offline runs.

use super::{ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;

/// Canned reply in the loose style the model tends to produce: a sentence of
/// prose around the JSON object.
pub const SAMPLE_REPLY: &str = r#"Here is your itinerary!
{
  "destination": "Lisbon",
  "trip_title": "Tiles and Tides",
  "budget": 1800,
  "budget_breakdown": {
    "flights_accommodation": 900,
    "activities_entertainment": 400,
    "food": 350,
    "transportation_misc": 150
  },
  "days": [
    {
      "day": 1,
      "title": "Alfama Wanderings",
      "activities": [
        { "time": "09:00 - 11:00", "description": "Ride tram 28 up to the castle" },
        { "time": "19:00 - 22:00", "description": "Fado dinner in a tasca" }
      ]
    },
    {
      "day": 2,
      "title": "Belem and the River",
      "activities": [
        { "time": "10:00 - 12:00", "description": "Jeronimos Monastery" }
      ]
    },
    {
      "day": 3,
      "title": "Surf at Costa da Caparica",
      "activities": [
        { "time": "08:00 - 12:00", "description": "Beginner surf lesson" }
      ]
    }
  ],
  "meeting_people_tips": ["Join a walking tour", "Hostel rooftop evenings"],
  "important_notes": ["Carry a Viva Viagem card"]
}
Enjoy the trip!"#;

/// Mock text provider returning a fixed reply.
pub struct MockTextProvider {
    enabled: bool,
    reply: String,
}

impl MockTextProvider {
    pub fn new(enabled: bool) -> Self {
        Self::with_reply(enabled, SAMPLE_REPLY)
    }

    pub fn with_reply(enabled: bool, reply: impl Into<String>) -> Self {
        Self {
            enabled,
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn is_configured(&self) -> bool {
        self.enabled
    }

    async fn generate(&self, prompt: &str) -> Result<ProviderResponse, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotConfigured(
                "Mock text provider not enabled".to_string(),
            ));
        }

        Ok(ProviderResponse {
            text: Some(self.reply.clone()),
            input_tokens: prompt.len() as i32 / 4,
            output_tokens: self.reply.len() as i32 / 4,
            finish_reason: Some("STOP".to_string()),
        })
    }
}
