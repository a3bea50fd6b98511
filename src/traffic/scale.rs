//! Visual encodings: marker radius from total traffic, and a discrete flow
//! category from the departure ratio.

use crate::traffic::filter::TimeFilter;
use crate::traffic::types::StationTraffic;

/// Radius range when every trip is shown.
pub const UNFILTERED_RADIUS: (f64, f64) = (0.0, 25.0);
/// Radius range while a time filter is active. The floor keeps quiet stations clickable.
pub const FILTERED_RADIUS: (f64, f64) = (3.0, 50.0);

/// Square-root scale from `[0, domain_max]` onto `range`, so marker area grows
/// linearly with traffic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusScale {
    domain_max: f64,
    range: (f64, f64),
}

impl RadiusScale {
    pub fn new(domain_max: usize, range: (f64, f64)) -> Self {
        Self {
            domain_max: domain_max as f64,
            range,
        }
    }

    /// Builds the scale for the current station set. The domain tops out at the
    /// busiest station; the range depends on whether `filter` is active.
    pub fn for_stations(stations: &[StationTraffic], filter: TimeFilter) -> Self {
        let max = stations.iter().map(StationTraffic::total_traffic).max().unwrap_or(0);
        let range = if filter.is_active() {
            FILTERED_RADIUS
        } else {
            UNFILTERED_RADIUS
        };
        Self::new(max, range)
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Radius for a station with `total_traffic` trips.
    ///
    /// An empty domain (no traffic anywhere) maps everything to the range minimum.
    pub fn radius(&self, total_traffic: usize) -> f64 {
        let (lo, hi) = self.range;
        if self.domain_max <= 0.0 {
            return lo;
        }
        let t = (total_traffic as f64).sqrt() / self.domain_max.sqrt();
        lo + t * (hi - lo)
    }
}

/// Quantized departure ratio. Three equal buckets over `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowCategory {
    ArrivalHeavy,
    Balanced,
    DepartureHeavy,
}

impl FlowCategory {
    /// Quantizes a departure ratio: `[0, 1/3)`, `[1/3, 2/3)`, `[2/3, 1]`.
    pub fn from_ratio(ratio: f64) -> Self {
        let ratio = ratio.clamp(0.0, 1.0);
        if ratio < 1.0 / 3.0 {
            FlowCategory::ArrivalHeavy
        } else if ratio < 2.0 / 3.0 {
            FlowCategory::Balanced
        } else {
            FlowCategory::DepartureHeavy
        }
    }

    pub fn for_station(station: &StationTraffic) -> Self {
        Self::from_ratio(departure_ratio(station))
    }

    /// Representative value of the bucket, written to the marker's
    /// `--departure-ratio` property.
    pub fn value(&self) -> f64 {
        match self {
            FlowCategory::ArrivalHeavy => 0.0,
            FlowCategory::Balanced => 0.5,
            FlowCategory::DepartureHeavy => 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FlowCategory::ArrivalHeavy => "arrival-heavy",
            FlowCategory::Balanced => "balanced",
            FlowCategory::DepartureHeavy => "departure-heavy",
        }
    }
}

/// `departures / total_traffic`, or 0 for a station with no traffic.
pub fn departure_ratio(station: &StationTraffic) -> f64 {
    if station.total_traffic() == 0 {
        0.0
    } else {
        station.departures() as f64 / station.total_traffic() as f64
    }
}
