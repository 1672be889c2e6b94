//! HTTP handlers: the itinerary API, the planner page, and operational
//! endpoints.

pub mod health;
pub mod itinerary;
pub mod metrics;
pub mod planner;
