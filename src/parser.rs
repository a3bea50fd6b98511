//! Decoders for the station list (JSON) and the trip log (CSV).

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::traffic::{Station, Trip};

#[derive(Deserialize)]
struct StationFeed {
    data: StationFeedData,
}

#[derive(Deserialize)]
struct StationFeedData {
    stations: Vec<RawStation>,
}

#[derive(Deserialize)]
struct RawStation {
    short_name: Option<String>,
    name: Option<String>,
    lon: Coordinate,
    lat: Coordinate,
    capacity: Option<u32>,
}

/// Coordinates show up both as JSON numbers and as numeric strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum Coordinate {
    Number(f64),
    Text(String),
}

impl Coordinate {
    fn value(&self) -> Result<f64> {
        match self {
            Coordinate::Number(v) => Ok(*v),
            Coordinate::Text(s) => s
                .trim()
                .parse()
                .with_context(|| format!("invalid coordinate '{s}'")),
        }
    }
}

#[derive(Deserialize)]
struct RawTrip {
    start_station_id: String,
    end_station_id: String,
    started_at: String,
    ended_at: String,
}

/// Decodes a station feed of the form `{"data": {"stations": [...]}}`.
///
/// Stations without a `short_name` cannot be matched to trips and are skipped.
///
/// # Errors
///
/// Returns an error if the document is not valid JSON of that shape or a
/// coordinate is not numeric.
pub fn parse_stations(bytes: &[u8]) -> Result<Vec<Station>> {
    let feed: StationFeed = serde_json::from_slice(bytes).context("failed to decode station feed")?;

    let mut stations = Vec::with_capacity(feed.data.stations.len());
    let mut skipped = 0usize;

    for raw in feed.data.stations {
        let Some(id) = raw.short_name.filter(|s| !s.is_empty()) else {
            skipped += 1;
            continue;
        };
        stations.push(Station {
            lon: raw.lon.value().with_context(|| format!("station {id}: bad longitude"))?,
            lat: raw.lat.value().with_context(|| format!("station {id}: bad latitude"))?,
            id,
            name: raw.name,
            capacity: raw.capacity,
        });
    }

    if skipped > 0 {
        warn!(skipped, "Stations without short_name were skipped");
    }
    debug!(stations = stations.len(), "Station feed parsed");

    Ok(stations)
}

/// Decodes a trip CSV. Only the station id and timestamp columns are read.
///
/// # Errors
///
/// Returns an error on malformed CSV, a missing column, or an unparseable timestamp.
pub fn parse_trips(bytes: &[u8]) -> Result<Vec<Trip>> {
    let mut rdr = csv::Reader::from_reader(bytes);
    let mut trips = Vec::new();

    for (row, result) in rdr.deserialize().enumerate() {
        let raw: RawTrip = result.with_context(|| format!("trip row {}", row + 1))?;
        trips.push(Trip {
            started_at: parse_timestamp(&raw.started_at)
                .with_context(|| format!("trip row {}: started_at", row + 1))?,
            ended_at: parse_timestamp(&raw.ended_at)
                .with_context(|| format!("trip row {}: ended_at", row + 1))?,
            start_station_id: raw.start_station_id,
            end_station_id: raw.end_station_id,
        });
    }

    debug!(trips = trips.len(), "Trip log parsed");
    Ok(trips)
}

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parses a trip timestamp as a wall-clock date-time.
///
/// Timestamps carrying a UTC offset keep the wall-clock time of that offset.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }

    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| anyhow!("unrecognised timestamp '{s}'"))
}
