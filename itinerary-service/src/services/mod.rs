pub mod itinerary;
pub mod metrics;
pub mod prompt;
pub mod providers;
pub mod salvage;

pub use itinerary::{ItineraryError, ItineraryService};
