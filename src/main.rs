//! CLI entry point for the bike-share station traffic tool.
//!
//! Loads the station list and trip log, aggregates traffic per station
//! (optionally restricted to a time-of-day window), and either summarizes it,
//! exports it, or renders it as an SVG marker map.

use anyhow::{Context, Result};
use bikeshare_traffic::{
    dashboard::{Dashboard, TimeDisplay},
    fetch::{BasicClient, load_datasets, load_lanes},
    output::{busiest, print_json, print_pretty, write_station_csv},
    render::{
        LngLat, SvgLayer, Viewport, ViewportEvent,
        lanes::{BOSTON_LANES, CAMBRIDGE_LANES},
        viewport,
    },
    time::parse_time_of_day,
    traffic::{TimeFilter, TrafficData, filter::SLIDER_ANY_TIME, filter_stations},
};
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEFAULT_STATIONS: &str = "https://dsc106.com/labs/lab07/data/bluebikes-stations.json";
const DEFAULT_TRIPS: &str = "https://dsc106.com/labs/lab07/data/bluebikes-traffic-2024-03.csv";

#[derive(Parser)]
#[command(name = "bikeshare_traffic")]
#[command(about = "Bike-share station traffic by time of day", long_about = None)]
struct Cli {
    #[command(flatten)]
    sources: Sources,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Sources {
    /// Station list (JSON): path or URL
    #[arg(long, global = true, env = "STATIONS_URL", default_value = DEFAULT_STATIONS)]
    stations: String,

    /// Trip log (CSV, optionally .gz): path or URL
    #[arg(long, global = true, env = "TRIPS_URL", default_value = DEFAULT_TRIPS)]
    trips: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Log the busiest stations
    Summary {
        /// Only count trips within an hour of this time (HH:MM or minute of day)
        #[arg(short, long, value_parser = parse_time_of_day)]
        time: Option<u32>,

        /// Number of stations to list
        #[arg(short = 'n', long, default_value_t = 10)]
        top: usize,
    },
    /// Render station markers to an SVG file
    Render {
        #[arg(short, long, value_parser = parse_time_of_day)]
        time: Option<u32>,

        /// SVG file to write
        #[arg(short, long, default_value = "stations.svg")]
        output: String,

        #[arg(long, default_value_t = viewport::DEFAULT_CENTER.lon, allow_hyphen_values = true)]
        center_lon: f64,

        #[arg(long, default_value_t = viewport::DEFAULT_CENTER.lat, allow_hyphen_values = true)]
        center_lat: f64,

        #[arg(short, long, default_value_t = viewport::DEFAULT_ZOOM)]
        zoom: f64,

        #[arg(long, default_value_t = 1024.0)]
        width: f64,

        #[arg(long, default_value_t = 768.0)]
        height: f64,

        /// Bike-lane GeoJSON to draw under the markers: path or URL, repeatable
        #[arg(
            long,
            env = "LANES_URL",
            value_delimiter = ',',
            default_values_t = [BOSTON_LANES.to_string(), CAMBRIDGE_LANES.to_string()]
        )]
        lanes: Vec<String>,

        /// Skip the bike-lane overlay
        #[arg(long, default_value_t = false)]
        no_lanes: bool,
    },
    /// Write per-station traffic to CSV
    Export {
        #[arg(short, long, value_parser = parse_time_of_day)]
        time: Option<u32>,

        /// CSV file to write
        #[arg(short, long, default_value = "stations.csv")]
        output: String,

        /// Also log the rows as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

/// Mirrors the slider labels into the log.
#[derive(Default)]
struct LogDisplay {
    selected: String,
}

impl TimeDisplay for LogDisplay {
    fn set_selected_time(&mut self, label: &str) {
        self.selected = label.to_string();
    }

    fn set_any_time_visible(&mut self, visible: bool) {
        if visible {
            info!("Showing trips at any time");
        } else {
            info!(time = %self.selected, "Showing trips around selected time");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/bikeshare_traffic.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("bikeshare_traffic.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let client = BasicClient::new();
    let data = load(&client, &cli.sources).await?;

    match cli.command {
        Commands::Summary { time, top } => {
            let filter = to_filter(time);
            let stations = filter_stations(&data.stations, &data.trips, filter);

            for (rank, station) in busiest(&stations, top).into_iter().enumerate() {
                info!(
                    rank = rank + 1,
                    station_id = %station.id(),
                    name = station.station().name.as_deref().unwrap_or(""),
                    "{}",
                    station.tooltip()
                );
            }

            let trips = data.trips.iter().filter(|t| filter.admits(t)).count();
            let idle = stations.iter().filter(|s| s.total_traffic() == 0).count();
            info!(
                time = %filter.label().unwrap_or_else(|| "any".to_string()),
                trips,
                stations = stations.len(),
                idle,
                "Summary"
            );
        }
        Commands::Render {
            time,
            output,
            center_lon,
            center_lat,
            zoom,
            width,
            height,
            lanes,
            no_lanes,
        } => {
            let map = Viewport::new(LngLat::new(center_lon, center_lat), zoom, width, height);
            info!(center = ?map.center(), zoom = map.zoom(), "Viewport ready");

            let mut dashboard = Dashboard::new(LogDisplay::default());
            dashboard.on_data_loaded(data, SvgLayer::new(), &map)?;
            if !no_lanes {
                dashboard.on_lanes_loaded(load_lanes(&client, &lanes).await, &map);
            }
            dashboard.on_viewport_change(ViewportEvent::MoveEnd, &map);
            dashboard.on_slider_input(time.map_or(SLIDER_ANY_TIME, |m| m as i32));

            let layer = dashboard
                .into_layer()
                .context("no markers were bound")?;
            let (width, height) = map.size();
            layer.write(&output, width, height)?;
        }
        Commands::Export { time, output, json } => {
            let filter = to_filter(time);
            let stations = filter_stations(&data.stations, &data.trips, filter);

            print_pretty(&stations);
            if json {
                print_json(&stations, filter)?;
            }
            write_station_csv(&output, &stations, filter)?;
            info!(output = %output, rows = stations.len(), "Station CSV written");
        }
    }

    Ok(())
}

fn to_filter(time: Option<u32>) -> TimeFilter {
    time.map_or(TimeFilter::AnyTime, TimeFilter::At)
}

/// Loads both datasets. A failure here stops the run before anything is drawn.
async fn load(client: &BasicClient, sources: &Sources) -> Result<TrafficData> {
    match load_datasets(client, &sources.stations, &sources.trips).await {
        Ok(data) => Ok(data),
        Err(e) => {
            error!(error = %e, "Error loading station or traffic data");
            Err(e)
        }
    }
}
