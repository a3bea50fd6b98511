//! Loading of the station, trip and bike-lane datasets from local files or HTTP.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use bytes::Bytes;
use flate2::read::GzDecoder;
use std::io::Read;
use tracing::{debug, info, warn};

use crate::parser::{parse_stations, parse_trips};
use crate::render::{LanePath, parse_lanes};
use crate::traffic::TrafficData;

/// GETs `url` and returns the body. Non-2xx responses are errors.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Bytes> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?)
}

fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

fn is_gzip(source: &str) -> bool {
    source.split(['?', '#']).next().unwrap_or(source).ends_with(".gz")
}

/// Decompresses a gzip payload.
pub fn gunzip(bytes: &[u8]) -> Result<Bytes> {
    let mut out = Vec::new();
    GzDecoder::new(bytes)
        .read_to_end(&mut out)
        .context("failed to decompress gzip payload")?;
    Ok(out.into())
}

/// Reads `source` from disk, or fetches it when it is an `http(s)` URL.
/// Sources ending in `.gz` are decompressed.
#[tracing::instrument(skip(client))]
pub async fn load_source<C: HttpClient>(client: &C, source: &str) -> Result<Bytes> {
    let raw = if is_url(source) {
        fetch_bytes(client, source)
            .await
            .with_context(|| format!("failed to fetch {source}"))?
    } else {
        Bytes::from(
            tokio::fs::read(source)
                .await
                .with_context(|| format!("failed to read {source}"))?,
        )
    };
    debug!(bytes = raw.len(), "Source loaded");

    if is_gzip(source) {
        gunzip(&raw)
    } else {
        Ok(raw)
    }
}

/// Loads stations and trips concurrently. Both must succeed.
#[tracing::instrument(skip(client))]
pub async fn load_datasets<C: HttpClient>(
    client: &C,
    stations_source: &str,
    trips_source: &str,
) -> Result<TrafficData> {
    let (station_bytes, trip_bytes) = tokio::try_join!(
        load_source(client, stations_source),
        load_source(client, trips_source)
    )?;

    let stations = parse_stations(&station_bytes)?;
    let trips = parse_trips(&trip_bytes)?;

    info!(stations = stations.len(), trips = trips.len(), "Datasets loaded");
    Ok(TrafficData { stations, trips })
}

/// Loads bike-lane GeoJSON from each source. A source that cannot be loaded or
/// decoded is skipped with a warning; lanes are decoration and never block the map.
#[tracing::instrument(skip(client))]
pub async fn load_lanes<C: HttpClient>(client: &C, sources: &[String]) -> Vec<LanePath> {
    let mut lanes = Vec::new();
    for source in sources {
        let loaded = load_source(client, source)
            .await
            .and_then(|bytes| parse_lanes(&bytes));
        match loaded {
            Ok(paths) => {
                debug!(source = %source, paths = paths.len(), "Lanes loaded");
                lanes.extend(paths);
            }
            Err(e) => warn!(source = %source, error = %e, "Skipping bike lane source"),
        }
    }
    info!(paths = lanes.len(), "Bike lanes loaded");
    lanes
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::env;
    use std::fs;
    use std::io::Write;

    const STATIONS: &str = r#"{"data": {"stations": [
        {"short_name": "A", "lon": -71.1, "lat": 42.36},
        {"short_name": "B", "lon": -71.08, "lat": 42.35}
    ]}}"#;

    const TRIPS: &str = "started_at,ended_at,start_station_id,end_station_id\n\
                         2024-03-01 08:10:00,2024-03-01 08:25:00,A,B\n";

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    #[test]
    fn test_source_kinds() {
        assert!(is_url("https://example.com/trips.csv"));
        assert!(!is_url("data/trips.csv"));
        assert!(is_gzip("data/trips.csv.gz"));
        assert!(is_gzip("https://example.com/trips.csv.gz?raw=1"));
        assert!(!is_gzip("data/trips.csv"));
    }

    #[test]
    fn test_gunzip() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(TRIPS.as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();

        assert_eq!(gunzip(&compressed).unwrap(), TRIPS.as_bytes());
        assert!(gunzip(b"plain text").is_err());
    }

    #[tokio::test]
    async fn test_load_datasets_from_files() {
        let stations_path = temp_path("bikeshare_traffic_test_stations.json");
        let trips_path = temp_path("bikeshare_traffic_test_trips.csv.gz");
        fs::write(&stations_path, STATIONS).unwrap();
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(TRIPS.as_bytes()).unwrap();
        fs::write(&trips_path, encoder.finish().unwrap()).unwrap();

        let data = load_datasets(&BasicClient::new(), &stations_path, &trips_path)
            .await
            .unwrap();

        assert_eq!(data.stations.len(), 2);
        assert_eq!(data.trips.len(), 1);

        fs::remove_file(&stations_path).unwrap();
        fs::remove_file(&trips_path).unwrap();
    }

    #[tokio::test]
    async fn test_load_lanes_skips_bad_sources() {
        let lanes_path = temp_path("bikeshare_traffic_test_lanes.geojson");
        fs::write(
            &lanes_path,
            r#"{"type": "LineString", "coordinates": [[-71.1, 42.36], [-71.09, 42.361]]}"#,
        )
        .unwrap();

        let lanes = load_lanes(
            &BasicClient::new(),
            &[lanes_path.clone(), temp_path("bikeshare_traffic_no_such_lanes.geojson")],
        )
        .await;

        assert_eq!(lanes.len(), 1);
        assert_eq!(lanes[0].len(), 2);
        fs::remove_file(&lanes_path).unwrap();
    }

    #[tokio::test]
    async fn test_load_datasets_fails_if_either_missing() {
        let stations_path = temp_path("bikeshare_traffic_test_only_stations.json");
        fs::write(&stations_path, STATIONS).unwrap();

        let result = load_datasets(
            &BasicClient::new(),
            &stations_path,
            &temp_path("bikeshare_traffic_no_such_trips.csv"),
        )
        .await;

        assert!(result.is_err());
        fs::remove_file(&stations_path).unwrap();
    }
}
