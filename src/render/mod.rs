//! Binding between station traffic and map markers.
//!
//! The map and the marker surface are abstracted behind [`MapView`] and
//! [`MarkerLayer`]. [`RenderBinder`] owns a layer and keeps one marker per
//! station, keyed by station id, in step with the latest traffic figures,
//! plus any bike-lane paths drawn beneath them.
//! [`Viewport`] and [`SvgLayer`] are the concrete implementations used by the CLI.

pub mod lanes;
pub mod svg;
pub mod viewport;

pub use lanes::{LanePath, parse_lanes};
pub use svg::SvgLayer;
pub use viewport::Viewport;

use std::time::Duration;
use tracing::debug;

use crate::traffic::{FlowCategory, RadiusScale, StationTraffic, TimeFilter};

/// Length of the radius animation played when the filter changes.
pub const TRANSITION: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LngLat {
    pub lon: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

/// Projection capability of the underlying map.
pub trait MapView {
    fn project(&self, at: LngLat) -> ScreenPoint;
}

/// Viewport notifications that require markers to be repositioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportEvent {
    Move,
    Zoom,
    Resize,
    MoveEnd,
}

/// Visual attributes of one station marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerStyle {
    pub radius: f64,
    pub fill: &'static str,
    pub stroke: &'static str,
    pub stroke_width: f64,
    pub opacity: f64,
    /// Quantized departure ratio; colour is derived from it by the stylesheet.
    pub departure_ratio: f64,
    pub title: String,
}

impl MarkerStyle {
    pub fn for_station(station: &StationTraffic, scale: &RadiusScale) -> Self {
        Self {
            radius: scale.radius(station.total_traffic()),
            fill: "steelblue",
            stroke: "white",
            stroke_width: 1.0,
            opacity: 0.6,
            departure_ratio: FlowCategory::for_station(station).value(),
            title: station.tooltip(),
        }
    }
}

/// Per-marker changes pushed when the filter changes.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerUpdate {
    pub radius: f64,
    pub departure_ratio: f64,
    pub title: String,
}

/// A surface holding one marker per station.
pub trait MarkerLayer {
    /// Creates a marker for `key`.
    fn insert(&mut self, key: &str, style: MarkerStyle);

    /// Updates an existing marker in place, animating the radius over `transition`.
    fn update(&mut self, key: &str, update: MarkerUpdate, transition: Duration);

    /// Moves a marker to a screen position.
    fn set_position(&mut self, key: &str, at: ScreenPoint);

    /// Replaces the bike-lane paths drawn beneath the markers.
    fn set_lanes(&mut self, paths: Vec<Vec<ScreenPoint>>);
}

/// Keeps a [`MarkerLayer`] joined to the current station traffic.
pub struct RenderBinder<L> {
    layer: L,
    coordinates: Vec<(String, LngLat)>,
    lanes: Vec<LanePath>,
}

impl<L: MarkerLayer> RenderBinder<L> {
    /// Creates one marker per station with the overall (unfiltered) radius scale
    /// and places each at its projected position.
    pub fn bind(mut layer: L, stations: &[StationTraffic], map: &impl MapView) -> Self {
        let scale = RadiusScale::for_stations(stations, TimeFilter::AnyTime);

        let mut coordinates = Vec::with_capacity(stations.len());
        for station in stations {
            layer.insert(station.id(), MarkerStyle::for_station(station, &scale));
            let s = station.station();
            coordinates.push((station.id().to_string(), LngLat::new(s.lon, s.lat)));
        }

        let mut binder = Self {
            layer,
            coordinates,
            lanes: Vec::new(),
        };
        binder.reposition(map);
        debug!(markers = binder.coordinates.len(), "Markers bound");
        binder
    }

    /// Projects every station and lane through `map` and moves the markers.
    pub fn reposition(&mut self, map: &impl MapView) {
        for (key, at) in &self.coordinates {
            self.layer.set_position(key, map.project(*at));
        }
        if !self.lanes.is_empty() {
            self.layer.set_lanes(project_lanes(&self.lanes, map));
        }
    }

    /// Adds bike-lane paths and draws them at the current projection.
    pub fn add_lanes(&mut self, lanes: Vec<LanePath>, map: &impl MapView) {
        self.lanes.extend(lanes);
        self.layer.set_lanes(project_lanes(&self.lanes, map));
        debug!(lanes = self.lanes.len(), "Lanes bound");
    }

    /// Pushes re-aggregated traffic onto the existing markers, matched by station id.
    pub fn rebind(&mut self, stations: &[StationTraffic], filter: TimeFilter) {
        let scale = RadiusScale::for_stations(stations, filter);

        for station in stations {
            let update = MarkerUpdate {
                radius: scale.radius(station.total_traffic()),
                departure_ratio: FlowCategory::for_station(station).value(),
                title: station.tooltip(),
            };
            self.layer.update(station.id(), update, TRANSITION);
        }
    }

    pub fn layer(&self) -> &L {
        &self.layer
    }

    pub fn into_layer(self) -> L {
        self.layer
    }
}

fn project_lanes(lanes: &[LanePath], map: &impl MapView) -> Vec<Vec<ScreenPoint>> {
    lanes
        .iter()
        .map(|path| path.iter().map(|at| map.project(*at)).collect())
        .collect()
}
