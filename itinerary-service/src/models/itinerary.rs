//! Itinerary shape requested from the model.
//!
//! The API endpoint passes the model's JSON through untouched; these types
//! are for the planner page, which decodes leniently so a sloppy reply still
//! renders.

use super::lenient;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelItinerary {
    pub destination: String,
    pub trip_title: String,
    #[serde(deserialize_with = "lenient::number")]
    pub budget: f64,
    pub budget_breakdown: BudgetBreakdown,
    pub days: Vec<Day>,
    pub meeting_people_tips: Vec<String>,
    pub important_notes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetBreakdown {
    #[serde(deserialize_with = "lenient::number")]
    pub flights_accommodation: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub activities_entertainment: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub food: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub transportation_misc: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Day {
    #[serde(deserialize_with = "lenient::number")]
    pub day: u32,
    pub title: String,
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Activity {
    pub time: String,
    pub description: String,
}
