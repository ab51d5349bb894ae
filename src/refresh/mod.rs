//! When to re-fetch a flight's prediction, and how to fold the answer in.

pub mod deriver;
pub mod policy;
pub mod service;

pub use deriver::{derive, estimate_delay_minutes, ReasonStyle};
pub use policy::{should_refresh, should_refresh_with, stamp_checked};
pub use service::{
    lookup_flight, refresh_due, refresh_flight, search_route, FlightQuery, RefreshOutcome,
};
