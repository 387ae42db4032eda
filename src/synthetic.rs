// src/synthetic.rs

use anyhow::{anyhow, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, Gamma};
use serde::Deserialize;
use tracing::info;

use crate::process::raw_table::RawTable;

pub const MEMBER_SHARE: f64 = 0.78;

pub const STATIONS: &[&str] = &[
    "W 21 St & 6 Ave",
    "West St & Chambers St",
    "Broadway & W 58 St",
    "6 Ave & W 33 St",
    "1 Ave & E 68 St",
    "Central Park S & 6 Ave",
    "E 17 St & Broadway",
    "Pier 40 - Hudson River Park",
];

const GAMMA_SHAPE: f64 = 2.0;
const GAMMA_SCALE_MIN: f64 = 7.0;
const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub rows: usize,
    pub seed: u64,
    pub start: NaiveDateTime,
    pub step_minutes: i64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            rows: 5_000,
            seed: 42,
            start: NaiveDate::from_ymd_opt(2022, 1, 1)
                .unwrap_or(NaiveDate::MIN)
                .and_time(NaiveTime::MIN),
            step_minutes: 105,
        }
    }
}

/// Stand-in trip export for when no trips file is available, so the
/// downstream charts never face an empty dataset.
///
/// Columns: `ride_id`, `started_at`, `ended_at`, `member_casual`,
/// `start_station_name`. Same seed, same table.
pub fn synthetic_trips(cfg: &SyntheticConfig) -> Result<RawTable> {
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let gamma = Gamma::new(GAMMA_SHAPE, GAMMA_SCALE_MIN)
        .map_err(|e| anyhow!("invalid gamma parameters: {}", e))?;

    let headers = [
        "ride_id",
        "started_at",
        "ended_at",
        "member_casual",
        "start_station_name",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let mut rows = Vec::with_capacity(cfg.rows);
    for i in 0..cfg.rows {
        let started = start_of(cfg, i)?;
        let minutes: f64 = gamma.sample(&mut rng);
        let ended = Duration::try_milliseconds((minutes * 60_000.0).round() as i64)
            .and_then(|d| started.checked_add_signed(d))
            .ok_or_else(|| anyhow!("synthetic trip {} ends out of range", i + 1))?;
        let rider = if rng.random::<f64>() < MEMBER_SHARE {
            "member"
        } else {
            "casual"
        };
        let station = STATIONS[rng.random_range(0..STATIONS.len())];

        rows.push(vec![
            (i + 1).to_string(),
            started.format(TS_FORMAT).to_string(),
            ended.format(TS_FORMAT).to_string(),
            rider.to_string(),
            station.to_string(),
        ]);
    }

    info!(rows = rows.len(), seed = cfg.seed, "generated synthetic trips");
    Ok(RawTable::new(headers, rows))
}

/// `start + i * step_minutes`, or an error when that leaves chrono's range.
fn start_of(cfg: &SyntheticConfig, i: usize) -> Result<NaiveDateTime> {
    i64::try_from(i)
        .ok()
        .and_then(|i| cfg.step_minutes.checked_mul(i))
        .and_then(Duration::try_minutes)
        .and_then(|offset| cfg.start.checked_add_signed(offset))
        .ok_or_else(|| {
            anyhow!(
                "synthetic trip {} start out of range (start {}, step {} min)",
                i + 1,
                cfg.start,
                cfg.step_minutes
            )
        })
}
