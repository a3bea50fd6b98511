use crate::time::{MINUTES_PER_DAY, format_time, minutes_since_midnight};
use crate::traffic::aggregate::aggregate_traffic;
use crate::traffic::types::{Station, StationTraffic, Trip};

/// Half-width of the time window, in minutes. Both ends are inclusive.
pub const WINDOW_MINUTES: u32 = 60;

/// Slider value meaning "any time".
pub const SLIDER_ANY_TIME: i32 = -1;

/// The currently selected time-of-day filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFilter {
    /// No filtering; every trip counts.
    #[default]
    AnyTime,
    /// Only trips starting or ending within [`WINDOW_MINUTES`] of this minute-of-day.
    At(u32),
}

impl TimeFilter {
    /// Maps a raw slider value onto a filter. Negative values mean "any time".
    pub fn from_slider(value: i32) -> Self {
        if value < 0 {
            TimeFilter::AnyTime
        } else {
            TimeFilter::At((value as u32).min(MINUTES_PER_DAY - 1))
        }
    }

    pub fn minute(&self) -> Option<u32> {
        match self {
            TimeFilter::AnyTime => None,
            TimeFilter::At(m) => Some(*m),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, TimeFilter::At(_))
    }

    /// Label for the selected-time display; `None` when no filter is set.
    pub fn label(&self) -> Option<String> {
        self.minute().map(format_time)
    }

    /// Whether `trip` starts or ends inside the window.
    ///
    /// Either endpoint is enough. There is no wraparound across midnight.
    pub fn admits(&self, trip: &Trip) -> bool {
        match self {
            TimeFilter::AnyTime => true,
            TimeFilter::At(m) => {
                let started = minutes_since_midnight(&trip.started_at);
                let ended = minutes_since_midnight(&trip.ended_at);
                started.abs_diff(*m) <= WINDOW_MINUTES || ended.abs_diff(*m) <= WINDOW_MINUTES
            }
        }
    }
}

/// Trips admitted by `filter`, borrowed from `trips`.
pub fn filter_trips(trips: &[Trip], filter: TimeFilter) -> impl Iterator<Item = &Trip> + Clone {
    trips.iter().filter(move |trip| filter.admits(trip))
}

/// Re-derives station traffic from only the trips admitted by `filter`.
///
/// Always aggregates from scratch, so a station with no trips in the window
/// drops back to zero.
pub fn filter_stations(stations: &[Station], trips: &[Trip], filter: TimeFilter) -> Vec<StationTraffic> {
    aggregate_traffic(stations, filter_trips(trips, filter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traffic::test_support::{station, trip};

    #[test]
    fn test_from_slider() {
        assert_eq!(TimeFilter::from_slider(SLIDER_ANY_TIME), TimeFilter::AnyTime);
        assert_eq!(TimeFilter::from_slider(0), TimeFilter::At(0));
        assert_eq!(TimeFilter::from_slider(1439), TimeFilter::At(1439));
        assert_eq!(TimeFilter::from_slider(5000), TimeFilter::At(1439));
    }

    #[test]
    fn test_label() {
        assert_eq!(TimeFilter::AnyTime.label(), None);
        assert_eq!(TimeFilter::At(480).label().as_deref(), Some("8:00 AM"));
    }

    #[test]
    fn test_window_is_inclusive() {
        let t = trip("A", "B", "09:00", "09:00");
        assert!(TimeFilter::At(480).admits(&t));
        assert!(TimeFilter::At(600).admits(&t));
        assert!(!TimeFilter::At(479).admits(&t));
        assert!(!TimeFilter::At(601).admits(&t));
    }

    #[test]
    fn test_either_endpoint_admits() {
        // Starts well before the window, ends inside it.
        let t = trip("A", "B", "05:00", "07:30");
        assert!(TimeFilter::At(480).admits(&t));
        // Starts inside, ends well after.
        let t = trip("A", "B", "08:30", "11:00");
        assert!(TimeFilter::At(480).admits(&t));
        // Spans the window without either end inside it.
        let t = trip("A", "B", "06:00", "10:00");
        assert!(!TimeFilter::At(480).admits(&t));
    }

    #[test]
    fn test_no_midnight_wraparound() {
        let t = trip("A", "B", "23:50", "23:55");
        assert!(!TimeFilter::At(10).admits(&t));
        assert!(TimeFilter::At(1439).admits(&t));
    }

    #[test]
    fn test_matching_window_keeps_trip() {
        let stations = vec![station("A"), station("B")];
        let trips = vec![trip("A", "B", "08:10", "08:25")];

        let unfiltered = filter_stations(&stations, &trips, TimeFilter::AnyTime);
        let morning = filter_stations(&stations, &trips, TimeFilter::At(480));

        assert_eq!(unfiltered, morning);
        assert_eq!(morning[0].departures(), 1);
        assert_eq!(morning[1].arrivals(), 1);
    }

    #[test]
    fn test_distant_window_zeroes_stations() {
        let stations = vec![station("A"), station("B")];
        let trips = vec![trip("A", "B", "08:10", "08:25")];

        let evening = filter_stations(&stations, &trips, TimeFilter::At(1200));

        assert!(evening.iter().all(|s| s.total_traffic() == 0));
    }

    #[test]
    fn test_reset_reproduces_unfiltered() {
        let stations = vec![station("A"), station("B"), station("C")];
        let trips = vec![
            trip("A", "B", "07:00", "07:20"),
            trip("B", "C", "13:00", "13:05"),
            trip("C", "A", "22:30", "22:50"),
        ];

        let overall = aggregate_traffic(&stations, &trips);
        let _noon = filter_stations(&stations, &trips, TimeFilter::At(780));
        let reset = filter_stations(&stations, &trips, TimeFilter::from_slider(SLIDER_ANY_TIME));

        assert_eq!(overall, reset);
    }

    #[test]
    fn test_counted_trips_match_predicate() {
        let trips = vec![
            trip("A", "B", "06:00", "06:59"),
            trip("A", "B", "07:00", "07:10"),
            trip("A", "B", "08:00", "09:30"),
            trip("A", "B", "09:01", "09:30"),
            trip("A", "B", "04:00", "07:00"),
        ];
        let filter = TimeFilter::At(480);

        let kept: Vec<_> = filter_trips(&trips, filter).collect();

        assert_eq!(kept.len(), 3);
        for t in &trips {
            let start = minutes_since_midnight(&t.started_at);
            let end = minutes_since_midnight(&t.ended_at);
            let expected = start.abs_diff(480) <= 60 || end.abs_diff(480) <= 60;
            assert_eq!(kept.contains(&t), expected);
        }
    }
}
