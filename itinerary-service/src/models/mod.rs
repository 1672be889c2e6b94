pub mod itinerary;
mod lenient;
pub mod planner;
pub mod travel;

pub use itinerary::{Activity, BudgetBreakdown, Day, TravelItinerary};
pub use planner::{FieldErrors, PlannerState};
pub use travel::TravelRequest;
