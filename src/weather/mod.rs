// src/weather/mod.rs

use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::aggregate::{daily_rides, DailyRides};
use crate::error::NormalizeError;
use crate::process::{
    canonical::CanonicalTable,
    columns::resolve,
    date_parser::parse_day,
    raw_table::RawTable,
    utils::parse_f64,
};

pub const WEATHER_DATE_CANDIDATES: &[&str] = &["date", "DATE"];

/// Temperature source columns, in priority order. `avg_temp_f_tenths` is
/// divided by 10; `avgTemp` is the pre-aggregated dashboard export's name.
pub const TEMP_CANDIDATES: &[&str] = &[
    "avg_temp_f",
    "tavg_f",
    "tavg",
    "temp_avg_f",
    "avg_temp_f_tenths",
    "avgTemp",
];

const TENTHS_COLUMN: &str = "avg_temp_f_tenths";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyTemp {
    pub date: NaiveDate,
    pub avg_temp_f: f64,
}

/// Daily average temperature series, one entry per date, sorted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherTable {
    days: Vec<DailyTemp>,
}

impl WeatherTable {
    /// Whether `raw` carries a temperature column of its own, as the
    /// pre-aggregated daily export does with `avgTemp`.
    pub fn has_temperature(raw: &RawTable) -> bool {
        TEMP_CANDIDATES.iter().any(|c| raw.has_column(c))
    }

    pub fn days(&self) -> &[DailyTemp] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    fn lookup(&self) -> BTreeMap<NaiveDate, f64> {
        self.days.iter().map(|d| (d.date, d.avg_temp_f)).collect()
    }

    /// Reconcile a raw weather export into a daily series.
    ///
    /// Needs a date column and one of the temperature candidates. Several
    /// readings for one date are averaged; rows with a bad date or
    /// temperature are skipped.
    #[tracing::instrument(level = "info", skip_all, fields(rows = raw.num_rows()))]
    pub fn from_raw(raw: &RawTable) -> Result<Self, NormalizeError> {
        let date_res = resolve(raw, "weather_date", WEATHER_DATE_CANDIDATES).ok_or(
            NormalizeError::MissingColumn {
                attribute: "weather date",
                expected: WEATHER_DATE_CANDIDATES,
            },
        )?;
        let temp_res = resolve(raw, "avg_temp_f", TEMP_CANDIDATES).ok_or(
            NormalizeError::MissingColumn {
                attribute: "temperature",
                expected: TEMP_CANDIDATES,
            },
        )?;
        let divisor = if temp_res.chosen == TENTHS_COLUMN {
            10.0
        } else {
            1.0
        };

        let mut sums: BTreeMap<NaiveDate, (f64, u32)> = BTreeMap::new();
        let mut skipped = 0usize;
        for r in 0..raw.num_rows() {
            let date = parse_day(raw.cell(r, date_res.index));
            let temp = parse_f64(raw.cell(r, temp_res.index));
            match (date, temp) {
                (Some(date), Some(temp)) => {
                    let e = sums.entry(date).or_insert((0.0, 0));
                    e.0 += temp;
                    e.1 += 1;
                }
                _ => skipped += 1,
            }
        }
        if skipped > 0 {
            debug!(skipped, "weather rows without a usable date or temperature");
        }

        let days: Vec<DailyTemp> = sums
            .into_iter()
            .map(|(date, (sum, n))| DailyTemp {
                date,
                avg_temp_f: sum / f64::from(n) / divisor,
            })
            .collect();
        info!(days = days.len(), source = %temp_res.chosen, "weather series");
        Ok(Self { days })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyRidesWeather {
    pub date: NaiveDate,
    pub rides: u64,
    pub avg_temp_f: f64,
}

/// Daily ride totals, with or without temperature.
///
/// The two cases are distinct: without a weather table there is no
/// temperature series at all, not an empty one.
#[derive(Debug, Clone, PartialEq)]
pub enum DailyView {
    TripsOnly(Vec<DailyRides>),
    WithWeather(Vec<DailyRidesWeather>),
}

impl DailyView {
    pub fn has_weather(&self) -> bool {
        matches!(self, DailyView::WithWeather(_))
    }

    pub fn len(&self) -> usize {
        match self {
            DailyView::TripsOnly(v) => v.len(),
            DailyView::WithWeather(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Aggregate trips per day and, when weather is supplied, inner-join the
/// daily temperature on date. Dates present on only one side are dropped.
pub fn join_weather(table: &CanonicalTable, weather: Option<&WeatherTable>) -> DailyView {
    let daily = daily_rides(table);
    let Some(weather) = weather else {
        return DailyView::TripsOnly(daily);
    };

    let temps = weather.lookup();
    let trip_days = daily.len();
    let joined: Vec<DailyRidesWeather> = daily
        .into_iter()
        .filter_map(|d| {
            temps.get(&d.date).map(|t| DailyRidesWeather {
                date: d.date,
                rides: d.rides,
                avg_temp_f: *t,
            })
        })
        .collect();

    info!(
        joined = joined.len(),
        trips_only = trip_days - joined.len(),
        weather_only = weather.len() - joined.len(),
        "joined daily rides with weather"
    );
    DailyView::WithWeather(joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::normalize::{normalize, NormalizeOptions};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn trips(dates: &[&str]) -> CanonicalTable {
        let rows: Vec<Vec<String>> = dates.iter().map(|s| vec![s.to_string()]).collect();
        normalize(
            &RawTable::new(vec!["date".into()], rows),
            &NormalizeOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn inner_join_keeps_only_shared_dates() {
        let t = trips(&["2022-01-01", "2022-01-01", "2022-01-02"]);
        let w = WeatherTable::from_raw(&RawTable::from_rows(
            &["date", "avg_temp_f"],
            &[&["2022-01-01", "40"], &["2022-01-03", "35"]],
        ))
        .unwrap();

        match join_weather(&t, Some(&w)) {
            DailyView::WithWeather(rows) => {
                assert_eq!(
                    rows,
                    vec![DailyRidesWeather {
                        date: d(2022, 1, 1),
                        rides: 2,
                        avg_temp_f: 40.0
                    }]
                );
            }
            other => panic!("expected weather view, got {:?}", other),
        }
    }

    #[test]
    fn absent_weather_is_its_own_outcome() {
        let t = trips(&["2022-01-01", "2022-01-02"]);
        let view = join_weather(&t, None);
        assert!(!view.has_weather());
        assert_eq!(view.len(), 2);

        let empty = WeatherTable::default();
        let view = join_weather(&t, Some(&empty));
        assert!(view.has_weather());
        assert!(view.is_empty());
    }

    #[test]
    fn tenths_are_scaled_and_duplicates_averaged() {
        let w = WeatherTable::from_raw(&RawTable::from_rows(
            &["DATE", "avg_temp_f_tenths"],
            &[
                &["2022-07-01", "801"],
                &["2022-07-01", "799"],
                &["2022-07-02", "bad"],
                &["", "700"],
            ],
        ))
        .unwrap();
        assert_eq!(
            w.days(),
            &[DailyTemp {
                date: d(2022, 7, 1),
                avg_temp_f: 80.0
            }]
        );
    }

    #[test]
    fn temperature_priority() {
        let w = WeatherTable::from_raw(&RawTable::from_rows(
            &["date", "tavg", "tavg_f"],
            &[&["2022-07-01", "10", "50"]],
        ))
        .unwrap();
        assert_eq!(w.days()[0].avg_temp_f, 50.0);
    }

    #[test]
    fn daily_export_supplies_its_own_temperature() {
        let raw = RawTable::from_rows(
            &["date", "bike_rides_daily", "avgTemp"],
            &[&["2022-07-01", "120", "81.5"], &["2022-07-02", "95", "77"]],
        );
        assert!(WeatherTable::has_temperature(&raw));

        let t = normalize(&raw, &NormalizeOptions::default()).unwrap();
        let w = WeatherTable::from_raw(&raw).unwrap();
        match join_weather(&t, Some(&w)) {
            DailyView::WithWeather(rows) => assert_eq!(
                rows,
                vec![
                    DailyRidesWeather {
                        date: d(2022, 7, 1),
                        rides: 120,
                        avg_temp_f: 81.5
                    },
                    DailyRidesWeather {
                        date: d(2022, 7, 2),
                        rides: 95,
                        avg_temp_f: 77.0
                    },
                ]
            ),
            other => panic!("expected weather view, got {:?}", other),
        }

        let trips_only = RawTable::from_rows(&["started_at", "ended_at"], &[]);
        assert!(!WeatherTable::has_temperature(&trips_only));
    }

    #[test]
    fn weather_without_temperature_is_an_error() {
        let err = WeatherTable::from_raw(&RawTable::from_rows(&["date", "prcp"], &[])).unwrap_err();
        assert!(err.to_string().contains("avg_temp_f, tavg_f, tavg"));
    }
}
