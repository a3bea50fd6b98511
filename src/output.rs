//! Output formatting and persistence for station traffic.
//!
//! Supports pretty-printing, JSON serialization, and CSV export.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::traffic::{FlowCategory, StationTraffic, TimeFilter, departure_ratio};
use csv::WriterBuilder;
use std::fs::File;

/// One exported row per station.
#[derive(Debug, Serialize)]
pub struct StationRow<'a> {
    pub station_id: &'a str,
    pub name: Option<&'a str>,
    pub lon: f64,
    pub lat: f64,
    /// Minute of day of the active filter, empty when unfiltered.
    pub filter_minute: Option<u32>,
    pub departures: usize,
    pub arrivals: usize,
    pub total_traffic: usize,
    pub departure_ratio: f64,
    pub flow: &'static str,
}

impl<'a> StationRow<'a> {
    pub fn new(station: &'a StationTraffic, filter: TimeFilter) -> Self {
        let s = station.station();
        Self {
            station_id: &s.id,
            name: s.name.as_deref(),
            lon: s.lon,
            lat: s.lat,
            filter_minute: filter.minute(),
            departures: station.departures(),
            arrivals: station.arrivals(),
            total_traffic: station.total_traffic(),
            departure_ratio: departure_ratio(station),
            flow: FlowCategory::for_station(station).as_str(),
        }
    }
}

/// Logs station traffic using Rust's debug pretty-print format.
pub fn print_pretty(stations: &[StationTraffic]) {
    debug!("{:#?}", stations);
}

/// Logs station traffic as pretty-printed JSON.
pub fn print_json(stations: &[StationTraffic], filter: TimeFilter) -> Result<()> {
    let rows: Vec<_> = stations.iter().map(|s| StationRow::new(s, filter)).collect();
    info!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

/// Writes one CSV row per station to `path`, replacing any existing file.
pub fn write_station_csv(path: &str, stations: &[StationTraffic], filter: TimeFilter) -> Result<()> {
    debug!(path, rows = stations.len(), "Writing station CSV");

    let file = File::create(path).with_context(|| format!("failed to create {path}"))?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    for station in stations {
        writer.serialize(StationRow::new(station, filter))?;
    }
    writer.flush()?;

    Ok(())
}

/// The `n` stations with the most traffic, busiest first. Ties keep input order.
pub fn busiest(stations: &[StationTraffic], n: usize) -> Vec<&StationTraffic> {
    let mut ranked: Vec<_> = stations.iter().collect();
    ranked.sort_by(|a, b| b.total_traffic().cmp(&a.total_traffic()));
    ranked.truncate(n);
    ranked
}
