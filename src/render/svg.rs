//! A [`MarkerLayer`] that renders station markers into a standalone SVG document.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fmt::{self, Write as _};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use super::lanes::LANE_STYLE;
use super::{MarkerLayer, MarkerStyle, MarkerUpdate, ScreenPoint};

/// Colours each circle from its `--departure-ratio`: 1 is all departures, 0 all arrivals.
const STYLESHEET: &str = "circle {\n  \
    --color-departures: steelblue;\n  \
    --color-arrivals: darkorange;\n  \
    --color: color-mix(in oklch, var(--color-departures) calc(100% * var(--departure-ratio)), var(--color-arrivals));\n  \
    fill: var(--color);\n  \
    pointer-events: auto;\n\
}\n";

#[derive(Debug, Clone)]
struct SvgMarker {
    key: String,
    style: MarkerStyle,
    position: Option<ScreenPoint>,
    /// Radius before the last update, with the transition length.
    animate_from: Option<(f64, Duration)>,
}

/// Markers in insertion order, addressable by station id, over lane paths.
#[derive(Debug, Default)]
pub struct SvgLayer {
    markers: Vec<SvgMarker>,
    index: HashMap<String, usize>,
    lanes: Vec<Vec<ScreenPoint>>,
}

impl SvgLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn style(&self, key: &str) -> Option<&MarkerStyle> {
        self.index.get(key).map(|&i| &self.markers[i].style)
    }

    pub fn position(&self, key: &str) -> Option<ScreenPoint> {
        self.index.get(key).and_then(|&i| self.markers[i].position)
    }

    /// Lane paths in screen coordinates.
    pub fn lanes(&self) -> &[Vec<ScreenPoint>] {
        &self.lanes
    }

    /// Renders the layer as an SVG document of the given pixel size.
    /// Lanes are drawn first so the markers sit on top of them.
    pub fn to_svg(&self, width: f64, height: f64) -> Result<String, fmt::Error> {
        let mut out = String::new();
        writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        )?;
        writeln!(out, "<style>\n{STYLESHEET}</style>")?;

        if !self.lanes.is_empty() {
            writeln!(
                out,
                r#"<g class="lanes" fill="none" stroke="{}" stroke-width="{}" stroke-opacity="{}">"#,
                LANE_STYLE.stroke, LANE_STYLE.stroke_width, LANE_STYLE.opacity
            )?;
            for path in &self.lanes {
                write_path(&mut out, path)?;
            }
            writeln!(out, "</g>")?;
        }

        for m in &self.markers {
            let Some(at) = m.position else {
                continue;
            };
            let s = &m.style;
            write!(
                out,
                r#"<circle data-station="{}" cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" stroke="{}" stroke-width="{}" opacity="{}" style="--departure-ratio: {}">"#,
                escape(&m.key),
                at.x,
                at.y,
                s.radius,
                s.fill,
                s.stroke,
                s.stroke_width,
                s.opacity,
                s.departure_ratio,
            )?;
            if let Some((from, dur)) = m.animate_from {
                write!(
                    out,
                    r#"<animate attributeName="r" from="{:.2}" to="{:.2}" dur="{}ms" fill="freeze"/>"#,
                    from,
                    s.radius,
                    dur.as_millis()
                )?;
            }
            writeln!(out, "<title>{}</title></circle>", escape(&s.title))?;
        }

        out.push_str("</svg>\n");
        Ok(out)
    }

    /// Writes [`SvgLayer::to_svg`] to `path`.
    pub fn write(&self, path: impl AsRef<Path>, width: f64, height: f64) -> Result<()> {
        let path = path.as_ref();
        let svg = self.to_svg(width, height).context("failed to render SVG")?;
        std::fs::write(path, svg).with_context(|| format!("failed to write {}", path.display()))?;
        info!(
            path = %path.display(),
            markers = self.markers.len(),
            lanes = self.lanes.len(),
            "SVG written"
        );
        Ok(())
    }
}

impl MarkerLayer for SvgLayer {
    fn insert(&mut self, key: &str, style: MarkerStyle) {
        if let Some(&i) = self.index.get(key) {
            warn!(station = key, "Duplicate station marker replaced");
            self.markers[i].style = style;
            return;
        }
        self.index.insert(key.to_string(), self.markers.len());
        self.markers.push(SvgMarker {
            key: key.to_string(),
            style,
            position: None,
            animate_from: None,
        });
    }

    fn update(&mut self, key: &str, update: MarkerUpdate, transition: Duration) {
        let Some(&i) = self.index.get(key) else {
            warn!(station = key, "Update for unknown station marker ignored");
            return;
        };
        let m = &mut self.markers[i];
        m.animate_from = Some((m.style.radius, transition));
        m.style.radius = update.radius;
        m.style.departure_ratio = update.departure_ratio;
        m.style.title = update.title;
    }

    fn set_position(&mut self, key: &str, at: ScreenPoint) {
        if let Some(&i) = self.index.get(key) {
            self.markers[i].position = Some(at);
        }
    }

    fn set_lanes(&mut self, paths: Vec<Vec<ScreenPoint>>) {
        self.lanes = paths;
    }
}

fn write_path(out: &mut String, path: &[ScreenPoint]) -> fmt::Result {
    let Some((first, rest)) = path.split_first() else {
        return Ok(());
    };
    write!(out, r#"<path d="M{:.2} {:.2}"#, first.x, first.y)?;
    for p in rest {
        write!(out, " L{:.2} {:.2}", p.x, p.y)?;
    }
    writeln!(out, r#""/>"#)
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
