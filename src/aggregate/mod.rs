// src/aggregate/mod.rs

//! Chart data derived from the canonical trip table.
//!
//! Every aggregation that depends on an optional column returns `None` when
//! that column is absent, so callers can show "not available" instead of an
//! empty chart.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::process::{
    calendar::{DayOfWeek, Season},
    canonical::CanonicalTable,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyRides {
    pub date: NaiveDate,
    pub rides: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationCount {
    pub station: String,
    pub trip_count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeekdayRiderDuration {
    pub day_of_week: DayOfWeek,
    pub rider: String,
    pub avg_duration_min: f64,
    pub trips: u64,
}

/// Row mask for a season filter. An empty filter keeps every row,
/// undated ones included.
fn season_mask(table: &CanonicalTable, seasons: &[Season]) -> Vec<bool> {
    if seasons.is_empty() {
        return vec![true; table.num_rows()];
    }
    table
        .seasons()
        .into_iter()
        .map(|s| s.is_some_and(|s| seasons.contains(&s)))
        .collect()
}

/// Ride totals per calendar date, sorted by date. Undated rows are skipped.
pub fn daily_rides(table: &CanonicalTable) -> Vec<DailyRides> {
    let mut per_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for (date, rides) in table.dates().into_iter().zip(table.rides()) {
        if let Some(date) = date {
            let total = per_day.entry(date).or_default();
            *total = total.saturating_add(rides);
        }
    }
    per_day
        .into_iter()
        .map(|(date, rides)| DailyRides { date, rides })
        .collect()
}

/// Sum of `rides` over rows in `seasons` (all rows when empty). Saturates
/// at `u64::MAX`.
pub fn total_rides(table: &CanonicalTable, seasons: &[Season]) -> u64 {
    season_mask(table, seasons)
        .into_iter()
        .zip(table.rides())
        .filter_map(|(keep, rides)| keep.then_some(rides))
        .fold(0u64, u64::saturating_add)
}

/// Distinct seasons present, in calendar order.
pub fn seasons_present(table: &CanonicalTable) -> Vec<Season> {
    let set: BTreeSet<Season> = table.seasons().into_iter().flatten().collect();
    set.into_iter().collect()
}

/// The `n` busiest start stations by summed rides, busiest first.
/// Ties go to the alphabetically earlier name.
pub fn top_stations(
    table: &CanonicalTable,
    n: usize,
    seasons: &[Season],
) -> Option<Vec<StationCount>> {
    let stations = table.stations()?;
    let mask = season_mask(table, seasons);

    let mut counts: HashMap<&str, u64> = HashMap::new();
    for ((station, rides), keep) in stations.into_iter().zip(table.rides()).zip(mask) {
        if let (Some(station), true) = (station, keep) {
            let total = counts.entry(station).or_default();
            *total = total.saturating_add(rides);
        }
    }

    let mut ranked: Vec<StationCount> = counts
        .into_iter()
        .map(|(station, trip_count)| StationCount {
            station: station.to_string(),
            trip_count,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.trip_count
            .cmp(&a.trip_count)
            .then_with(|| a.station.cmp(&b.station))
    });
    ranked.truncate(n);
    Some(ranked)
}

/// Mean trip duration per (weekday, rider label), ordered Monday..Sunday
/// then by label. The label is the raw `member_casual` value.
pub fn avg_duration_by_weekday_rider(table: &CanonicalTable) -> Option<Vec<WeekdayRiderDuration>> {
    let durations = table.durations()?;
    let riders = table.member_casual()?;
    let days = table.days_of_week();

    let mut acc: BTreeMap<(DayOfWeek, &str), (f64, u64)> = BTreeMap::new();
    for ((day, rider), minutes) in days.into_iter().zip(riders).zip(durations) {
        if let (Some(day), Some(rider), Some(minutes)) = (day, rider, minutes) {
            let e = acc.entry((day, rider)).or_insert((0.0, 0));
            e.0 += minutes;
            e.1 += 1;
        }
    }

    Some(
        acc.into_iter()
            .map(|((day_of_week, rider), (sum, trips))| WeekdayRiderDuration {
                day_of_week,
                rider: rider.to_string(),
                avg_duration_min: sum / trips as f64,
                trips,
            })
            .collect(),
    )
}
