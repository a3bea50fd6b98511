//! Data types used by the traffic pipeline.

use chrono::NaiveDateTime;

/// A bike-share dock. `id` is the station's short code and is unique.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: String,
    pub name: Option<String>,
    pub lon: f64,
    pub lat: f64,
    pub capacity: Option<u32>,
}

/// One rental, with timestamps already parsed to wall-clock date-times.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    pub start_station_id: String,
    pub end_station_id: String,
    pub started_at: NaiveDateTime,
    pub ended_at: NaiveDateTime,
}

/// A station together with the traffic counted against it.
///
/// The counters are only set through [`StationTraffic::new`], so
/// `total_traffic() == departures() + arrivals()` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct StationTraffic {
    station: Station,
    departures: usize,
    arrivals: usize,
    total_traffic: usize,
}

impl StationTraffic {
    pub fn new(station: Station, departures: usize, arrivals: usize) -> Self {
        Self {
            station,
            departures,
            arrivals,
            total_traffic: departures + arrivals,
        }
    }

    pub fn station(&self) -> &Station {
        &self.station
    }

    pub fn id(&self) -> &str {
        &self.station.id
    }

    pub fn departures(&self) -> usize {
        self.departures
    }

    pub fn arrivals(&self) -> usize {
        self.arrivals
    }

    pub fn total_traffic(&self) -> usize {
        self.total_traffic
    }

    /// Tooltip text shown on the station marker.
    pub fn tooltip(&self) -> String {
        format!(
            "{} trips ({} departures, {} arrivals)",
            self.total_traffic, self.departures, self.arrivals
        )
    }
}

/// The two source datasets, loaded together before any processing starts.
#[derive(Debug, Clone, Default)]
pub struct TrafficData {
    pub stations: Vec<Station>,
    pub trips: Vec<Trip>,
}
