use anyhow::Result;
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use tripdash::{
    aggregate,
    cache::TableCache,
    config::DashboardConfig,
    export::{self, Summary},
    join_weather, normalize,
    process::{self, utils::fmt_int},
    synthetic, CanonicalTable, WeatherTable,
};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) configuration ────────────────────────────────────────────
    let cfg = DashboardConfig::resolve(env::args().nth(1).as_deref())?;
    let search_dirs = cfg.effective_search_dirs();
    fs::create_dir_all(&cfg.output_dir)?;

    // ─── 3) trips: file if present, synthetic otherwise ─────────────
    let mut cache = TableCache::new();
    let trips_path = process::locate_input(&cfg.trips_path, &search_dirs);
    let (source, synthetic_used, table) =
        match &trips_path {
            Some(path) => {
                info!("loading trips from {}", path.display());
                let table = cache.get_or_load(path, |p| {
                    let raw = process::load_raw_csv(p)?;
                    Ok(normalize(&raw, &cfg.normalize)?)
                });
                match table {
                    Ok(t) => (path.display().to_string(), false, t),
                    Err(e) => {
                        error!("cannot normalize {}: {:#}", path.display(), e);
                        return Err(e);
                    }
                }
            }
            None => {
                warn!(
                    "trips file {} not found; using synthetic trips",
                    cfg.trips_path
                );
                let raw = synthetic::synthetic_trips(&cfg.synthetic)?;
                let table = normalize(&raw, &cfg.normalize)?;
                ("synthetic".to_string(), true, table.into())
            }
        };

    // ─── 4) weather (optional) ───────────────────────────────────────
    let weather = match cfg.weather_path.as_deref() {
        Some(name) => load_weather(name, &search_dirs),
        None => trips_path.as_deref().and_then(embedded_weather),
    };

    // ─── 5) chart data ───────────────────────────────────────────────
    let mut unavailable = Vec::new();
    let out = cfg.output_dir.as_path();

    export::write_parquet(&out.join("trips.parquet"), table.batch())?;

    let view = join_weather(&table, weather.as_ref());
    if !view.has_weather() {
        unavailable.push("weather".to_string());
    }
    export::write_parquet(&out.join("daily.parquet"), &export::daily_batch(&view)?)?;

    let top = aggregate::top_stations(&table, cfg.top_stations, &cfg.seasons);
    match &top {
        Some(rows) => {
            export::write_parquet(&out.join("top_stations.parquet"), &export::stations_batch(rows)?)?
        }
        None => unavailable.push("top_stations".to_string()),
    }

    match aggregate::avg_duration_by_weekday_rider(&table) {
        Some(rows) => export::write_parquet(
            &out.join("weekday_rider_duration.parquet"),
            &export::weekday_rider_batch(&rows)?,
        )?,
        None => unavailable.push("weekday_rider_duration".to_string()),
    }

    for feature in &unavailable {
        warn!("{} not available for this dataset", feature);
    }

    // ─── 6) summary ──────────────────────────────────────────────────
    let summary = summarize(&cfg, &table, source, synthetic_used, &view, top, unavailable);
    info!(
        "{} trips, {} rides over {} days",
        fmt_int(summary.trips as u64),
        summary.total_rides_display,
        summary.days
    );
    export::write_summary(&out.join("summary.json"), &summary)?;

    info!("all done");
    Ok(())
}

fn load_weather(name: &str, search_dirs: &[PathBuf]) -> Option<WeatherTable> {
    let Some(path) = process::locate_input(name, search_dirs) else {
        info!("no weather file {}; continuing without temperature", name);
        return None;
    };
    let loaded = process::load_raw_csv(&path)
        .and_then(|raw| WeatherTable::from_raw(&raw).map_err(Into::into));
    match loaded {
        Ok(w) => Some(w),
        Err(e) => {
            warn!("ignoring weather file {}: {:#}", path.display(), e);
            None
        }
    }
}

/// Temperature carried by the trips file itself (pre-aggregated daily export).
fn embedded_weather(trips: &Path) -> Option<WeatherTable> {
    let raw = match process::load_raw_csv(trips) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("cannot re-read {} for temperature: {:#}", trips.display(), e);
            return None;
        }
    };
    if !WeatherTable::has_temperature(&raw) {
        info!("no weather file configured; continuing without temperature");
        return None;
    }
    match WeatherTable::from_raw(&raw) {
        Ok(w) => {
            info!("using temperature from {}", trips.display());
            Some(w)
        }
        Err(e) => {
            warn!("ignoring temperature in {}: {:#}", trips.display(), e);
            None
        }
    }
}

fn summarize(
    cfg: &DashboardConfig,
    table: &CanonicalTable,
    source: String,
    synthetic: bool,
    view: &tripdash::DailyView,
    top: Option<Vec<aggregate::StationCount>>,
    unavailable: Vec<String>,
) -> Summary {
    let total = aggregate::total_rides(table, &cfg.seasons);
    Summary {
        source,
        synthetic,
        trips: table.num_rows(),
        total_rides: total,
        total_rides_display: fmt_int(total),
        seasons: aggregate::seasons_present(table)
            .iter()
            .map(|s| s.to_string())
            .collect(),
        days: view.len(),
        has_weather: view.has_weather(),
        top_station: top.and_then(|rows| rows.into_iter().next().map(|r| r.station)),
        unavailable,
    }
}
