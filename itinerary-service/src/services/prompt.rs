use crate::models::TravelRequest;

/// Build the instruction sent to the model: the JSON shape to fill in,
/// seeded with the destination and budget, followed by the traveller profile.
pub fn build_itinerary_prompt(request: &TravelRequest) -> String {
    format!(
        r#"
Generate a detailed travel itinerary in strict JSON format with no extra text or explanations.
Follow this structure exactly:
{{
  "destination": "{location}",
  "trip_title": "Short Title",
  "budget": {budget},
  "budget_breakdown": {{
    "flights_accommodation": Number,
    "activities_entertainment": Number,
    "food": Number,
    "transportation_misc": Number
  }},
  "days": [
    {{
      "day": 1,
      "title": "Day Title",
      "activities": [
        {{ "time": "Time Range", "description": "Activity description" }}
      ]
    }}
  ],
  "meeting_people_tips": ["Tip 1", "Tip 2"],
  "important_notes": ["Note 1", "Note 2"]
}}

Here is the user profile:
- Age: {age}
- Gender: {gender}
- Interests: {interests}
- Number of Days: {days}

Return only valid JSON with no extra text. Do not include this prompt in the response, start with the JSON structure ("{{...}}").
"#,
        location = request.field("location"),
        budget = request.field("budget"),
        age = request.field("age"),
        gender = request.field("gender"),
        interests = request.field("interests"),
        days = request.field("days"),
    )
}
