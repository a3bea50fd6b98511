//! Station traffic aggregation, time-of-day filtering and visual scales.
//!
//! Trips are grouped by start and end station into departure and arrival
//! counts, merged onto fresh copies of the station records, and optionally
//! restricted to a ±60 minute window around a selected time of day.

pub mod aggregate;
pub mod filter;
pub mod scale;
pub mod types;

pub use aggregate::{TripCounts, aggregate_traffic};
pub use filter::{TimeFilter, filter_stations, filter_trips};
pub use scale::{FlowCategory, RadiusScale, departure_ratio};
pub use types::{Station, StationTraffic, TrafficData, Trip};
