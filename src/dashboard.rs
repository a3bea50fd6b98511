//! Event-driven controller tying the slider, the loaded datasets and the
//! marker layer together.
//!
//! All state lives in one [`Dashboard`]. Before the datasets arrive the
//! session slot is empty and slider input only updates the time label; once
//! [`Dashboard::on_data_loaded`] fills it, every slider event re-runs the
//! filter against the loaded trips.

use anyhow::{Result, bail};
use tracing::{debug, info};

use crate::render::{LanePath, MapView, MarkerLayer, RenderBinder, ViewportEvent};
use crate::traffic::{
    StationTraffic, TimeFilter, TrafficData, aggregate_traffic, filter_stations, filter_trips,
};

/// The two text elements next to the slider.
pub trait TimeDisplay {
    /// Sets the selected-time label. Empty when no filter is active.
    fn set_selected_time(&mut self, label: &str);

    /// Shows or hides the "(any time)" hint.
    fn set_any_time_visible(&mut self, visible: bool);
}

struct Session<L> {
    data: TrafficData,
    overall: Vec<StationTraffic>,
    filtered: Vec<StationTraffic>,
    binder: RenderBinder<L>,
}

pub struct Dashboard<D, L> {
    display: D,
    time_filter: TimeFilter,
    session: Option<Session<L>>,
    /// Lanes that arrived before the marker layer existed.
    pending_lanes: Vec<LanePath>,
}

impl<D: TimeDisplay, L: MarkerLayer> Dashboard<D, L> {
    /// Starts with no filter and no data, with the display already showing "any time".
    pub fn new(display: D) -> Self {
        let mut dashboard = Self {
            display,
            time_filter: TimeFilter::AnyTime,
            session: None,
            pending_lanes: Vec::new(),
        };
        dashboard.refresh_display();
        dashboard
    }

    pub fn time_filter(&self) -> TimeFilter {
        self.time_filter
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn is_loaded(&self) -> bool {
        self.session.is_some()
    }

    /// Station traffic across all trips, once loaded.
    pub fn overall_stations(&self) -> Option<&[StationTraffic]> {
        self.session.as_ref().map(|s| s.overall.as_slice())
    }

    /// Station traffic under the current filter, once loaded.
    pub fn filtered_stations(&self) -> Option<&[StationTraffic]> {
        self.session.as_ref().map(|s| s.filtered.as_slice())
    }

    /// Number of trips admitted by the current filter, once loaded. Trips
    /// touching stations missing from the station list are included.
    pub fn filtered_trip_count(&self) -> Option<usize> {
        self.session
            .as_ref()
            .map(|s| filter_trips(&s.data.trips, self.time_filter).count())
    }

    pub fn layer(&self) -> Option<&L> {
        self.session.as_ref().map(|s| s.binder.layer())
    }

    /// Handles a slider `input` event. `-1` clears the filter.
    pub fn on_slider_input(&mut self, value: i32) {
        self.time_filter = TimeFilter::from_slider(value);
        self.refresh_display();
        self.apply_filter();
    }

    /// Installs the loaded datasets: aggregates overall traffic, binds one
    /// marker per station, then applies the current filter.
    ///
    /// # Errors
    ///
    /// Returns an error if data has already been loaded.
    pub fn on_data_loaded(&mut self, data: TrafficData, layer: L, map: &impl MapView) -> Result<()> {
        if self.session.is_some() {
            bail!("station and trip data already loaded");
        }

        let overall = aggregate_traffic(&data.stations, &data.trips);
        let mut binder = RenderBinder::bind(layer, &overall, map);
        if !self.pending_lanes.is_empty() {
            binder.add_lanes(std::mem::take(&mut self.pending_lanes), map);
        }
        info!(
            stations = data.stations.len(),
            trips = data.trips.len(),
            "Station traffic computed"
        );

        self.session = Some(Session {
            filtered: overall.clone(),
            overall,
            data,
            binder,
        });
        self.apply_filter();
        Ok(())
    }

    /// Installs bike-lane paths. They are held until the marker layer exists.
    pub fn on_lanes_loaded(&mut self, lanes: Vec<LanePath>, map: &impl MapView) {
        match self.session.as_mut() {
            Some(session) => session.binder.add_lanes(lanes, map),
            None => self.pending_lanes.extend(lanes),
        }
    }

    /// Handles a map move/zoom/resize notification.
    pub fn on_viewport_change(&mut self, event: ViewportEvent, map: &impl MapView) {
        if let Some(session) = self.session.as_mut() {
            debug!(?event, "Repositioning markers");
            session.binder.reposition(map);
        }
    }

    /// Consumes the dashboard and hands back the marker layer, if data was loaded.
    pub fn into_layer(self) -> Option<L> {
        self.session.map(|s| s.binder.into_layer())
    }

    fn refresh_display(&mut self) {
        match self.time_filter.label() {
            Some(label) => {
                self.display.set_selected_time(&label);
                self.display.set_any_time_visible(false);
            }
            None => {
                self.display.set_selected_time("");
                self.display.set_any_time_visible(true);
            }
        }
    }

    fn apply_filter(&mut self) {
        let filter = self.time_filter;
        let Some(session) = self.session.as_mut() else {
            return;
        };

        session.filtered = filter_stations(&session.data.stations, &session.data.trips, filter);
        session.binder.rebind(&session.filtered, filter);

        debug!(minute = ?filter.minute(), trips = ?self.filtered_trip_count(), "Filter applied");
    }
}
