use crate::traffic::types::{Station, StationTraffic, Trip};
use std::collections::HashMap;

/// Number of trips per station id, for one trip endpoint.
///
/// Looking up a station that never appeared yields zero.
#[derive(Debug, Default)]
pub struct TripCounts<'a>(HashMap<&'a str, usize>);

impl<'a> TripCounts<'a> {
    /// Counts trips grouped by the station id `key` picks out of each trip.
    pub fn count_by<I, F>(trips: I, key: F) -> Self
    where
        I: IntoIterator<Item = &'a Trip>,
        F: Fn(&'a Trip) -> &'a str,
    {
        let mut counts: HashMap<&'a str, usize> = HashMap::new();
        for trip in trips {
            *counts.entry(key(trip)).or_default() += 1;
        }
        Self(counts)
    }

    pub fn departures<I>(trips: I) -> Self
    where
        I: IntoIterator<Item = &'a Trip>,
    {
        Self::count_by(trips, |t| t.start_station_id.as_str())
    }

    pub fn arrivals<I>(trips: I) -> Self
    where
        I: IntoIterator<Item = &'a Trip>,
    {
        Self::count_by(trips, |t| t.end_station_id.as_str())
    }

    pub fn get(&self, station_id: &str) -> usize {
        self.0.get(station_id).copied().unwrap_or(0)
    }

    /// Sum over every key, including ids that match no known station.
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }
}

/// Counts departures and arrivals per station and returns a fresh
/// [`StationTraffic`] for every station, in input order.
///
/// Stations untouched by any trip come back with all counters at zero.
pub fn aggregate_traffic<'a, I>(stations: &[Station], trips: I) -> Vec<StationTraffic>
where
    I: IntoIterator<Item = &'a Trip>,
    I::IntoIter: Clone,
{
    let trips = trips.into_iter();
    let departures = TripCounts::departures(trips.clone());
    let arrivals = TripCounts::arrivals(trips);

    stations
        .iter()
        .map(|station| {
            StationTraffic::new(
                station.clone(),
                departures.get(&station.id),
                arrivals.get(&station.id),
            )
        })
        .collect()
}
