pub mod airport;
pub mod datetime;
pub mod flight;
pub mod risk;

pub use airport::{Airline, Airport};
pub use flight::{Flight, FlightEdit, FlightStatus, PredictionSnapshot};
pub use risk::{DelaySeverity, RiskLevel, SeverityLabel};
