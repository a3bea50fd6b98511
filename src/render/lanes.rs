//! Bike-lane overlays decoded from GeoJSON and drawn beneath the station markers.

use anyhow::{Context, Result};
use geojson::{GeoJson, Geometry, Value};
use tracing::debug;

use super::LngLat;

/// Boston's existing bike network.
pub const BOSTON_LANES: &str =
    "https://bostonopendata-boston.opendata.arcgis.com/datasets/boston::existing-bike-network-2022.geojson";
/// Cambridge bike facilities.
pub const CAMBRIDGE_LANES: &str = "https://raw.githubusercontent.com/cambridgegis/cambridgegis_data/main/Recreation/Bike_Facilities/RECREATION_BikeFacilities.geojson";

/// One polyline of a bike lane, in map coordinates.
pub type LanePath = Vec<LngLat>;

/// Stroke used for every lane path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneStyle {
    pub stroke: &'static str,
    pub stroke_width: f64,
    pub opacity: f64,
}

pub const LANE_STYLE: LaneStyle = LaneStyle {
    stroke: "#32D400",
    stroke_width: 5.0,
    opacity: 0.6,
};

/// Decodes a GeoJSON document into lane polylines.
///
/// `LineString` and `MultiLineString` geometries become paths, including those
/// nested in geometry collections. Other geometry types and paths with fewer
/// than two positions are skipped.
pub fn parse_lanes(bytes: &[u8]) -> Result<Vec<LanePath>> {
    let text = std::str::from_utf8(bytes).context("lane GeoJSON is not UTF-8")?;
    let geojson: GeoJson = text.parse().context("failed to decode lane GeoJSON")?;

    let mut paths = Vec::new();
    match &geojson {
        GeoJson::FeatureCollection(fc) => {
            for geometry in fc.features.iter().filter_map(|f| f.geometry.as_ref()) {
                collect_paths(geometry, &mut paths);
            }
        }
        GeoJson::Feature(f) => {
            if let Some(geometry) = &f.geometry {
                collect_paths(geometry, &mut paths);
            }
        }
        GeoJson::Geometry(g) => collect_paths(g, &mut paths),
    }

    debug!(paths = paths.len(), "Lane GeoJSON decoded");
    Ok(paths)
}

fn collect_paths(geometry: &Geometry, out: &mut Vec<LanePath>) {
    match &geometry.value {
        Value::LineString(ls) => push_path(ls, out),
        Value::MultiLineString(mls) => {
            for ls in mls {
                push_path(ls, out);
            }
        }
        Value::GeometryCollection(gc) => {
            for g in gc {
                collect_paths(g, out);
            }
        }
        _ => {}
    }
}

fn push_path(positions: &[Vec<f64>], out: &mut Vec<LanePath>) {
    let path: LanePath = positions
        .iter()
        .filter(|p| p.len() >= 2)
        .map(|p| LngLat::new(p[0], p[1]))
        .collect();
    if path.len() >= 2 {
        out.push(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_collection_lines() {
        let doc = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"FacilityType": "Bike Lane"},
                 "geometry": {"type": "LineString", "coordinates": [[-71.5, 42.25], [-71.25, 42.5]]}},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "MultiLineString", "coordinates": [
                    [[-71.08, 42.35], [-71.07, 42.35], [-71.06, 42.351]],
                    [[-71.0, 42.125], [-70.75, 42.125]]
                 ]}},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "Point", "coordinates": [-71.0, 42.0]}},
                {"type": "Feature", "properties": {}, "geometry": null}
            ]
        }"#;

        let paths = parse_lanes(doc.as_bytes()).unwrap();

        assert_eq!(paths.len(), 3);
        assert_eq!(paths[0], vec![LngLat::new(-71.5, 42.25), LngLat::new(-71.25, 42.5)]);
        assert_eq!(paths[1].len(), 3);
        assert_eq!(paths[2][1], LngLat::new(-70.75, 42.125));
    }

    #[test]
    fn test_bare_geometry_and_collection() {
        let doc = r#"{"type": "GeometryCollection", "geometries": [
            {"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]},
            {"type": "Point", "coordinates": [5.0, 5.0]}
        ]}"#;

        let paths = parse_lanes(doc.as_bytes()).unwrap();

        assert_eq!(paths, vec![vec![LngLat::new(0.0, 0.0), LngLat::new(1.0, 1.0)]]);
    }

    #[test]
    fn test_invalid_geojson() {
        assert!(parse_lanes(b"{\"type\": \"Nope\"}").is_err());
        assert!(parse_lanes(b"not json").is_err());
    }
}
