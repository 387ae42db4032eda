// src/export/mod.rs

use anyhow::{Context, Result};
use arrow::{datatypes::Schema, record_batch::RecordBatch};
use parquet::{arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties};
use serde::Serialize;
use std::{
    fs::{self, File},
    path::Path,
    sync::Arc,
};
use tracing::info;

use crate::aggregate::{StationCount, WeekdayRiderDuration};
use crate::process::convert::ColumnValues;
use crate::weather::DailyView;

/// Write one batch to a SNAPPY-compressed parquet file.
pub fn write_parquet(path: &Path, batch: &RecordBatch) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {:?}", parent))?;
    }
    let file = File::create(path).with_context(|| format!("creating {:?}", path))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
        .context("creating Arrow writer")?;
    writer.write(batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    info!(path = %path.display(), rows = batch.num_rows(), "wrote parquet");
    Ok(())
}

fn build_batch(cols: Vec<(&str, ColumnValues)>) -> Result<RecordBatch> {
    let (fields, arrays): (Vec<_>, Vec<_>) = cols
        .into_iter()
        .map(|(name, values)| values.into_column(name))
        .unzip();
    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).map_err(Into::into)
}

/// `date, rides[, avg_temp_f]`
pub fn daily_batch(view: &DailyView) -> Result<RecordBatch> {
    match view {
        DailyView::TripsOnly(rows) => build_batch(vec![
            ("date", ColumnValues::Date(rows.iter().map(|r| Some(r.date)).collect())),
            ("rides", ColumnValues::Count(rows.iter().map(|r| r.rides).collect())),
        ]),
        DailyView::WithWeather(rows) => build_batch(vec![
            ("date", ColumnValues::Date(rows.iter().map(|r| Some(r.date)).collect())),
            ("rides", ColumnValues::Count(rows.iter().map(|r| r.rides).collect())),
            (
                "avg_temp_f",
                ColumnValues::Float(rows.iter().map(|r| Some(r.avg_temp_f)).collect()),
            ),
        ]),
    }
}

/// `start_station_name, trip_count`
pub fn stations_batch(rows: &[StationCount]) -> Result<RecordBatch> {
    build_batch(vec![
        (
            "start_station_name",
            ColumnValues::Utf8(rows.iter().map(|r| Some(r.station.clone())).collect()),
        ),
        (
            "trip_count",
            ColumnValues::Count(rows.iter().map(|r| r.trip_count).collect()),
        ),
    ])
}

/// `day_of_week, member_casual, avg_duration_min, trips`
pub fn weekday_rider_batch(rows: &[WeekdayRiderDuration]) -> Result<RecordBatch> {
    build_batch(vec![
        (
            "day_of_week",
            ColumnValues::Utf8(
                rows.iter()
                    .map(|r| Some(r.day_of_week.as_str().to_string()))
                    .collect(),
            ),
        ),
        (
            "member_casual",
            ColumnValues::Utf8(rows.iter().map(|r| Some(r.rider.clone())).collect()),
        ),
        (
            "avg_duration_min",
            ColumnValues::Float(rows.iter().map(|r| Some(r.avg_duration_min)).collect()),
        ),
        (
            "trips",
            ColumnValues::Count(rows.iter().map(|r| r.trips).collect()),
        ),
    ])
}

/// Run-level summary written next to the parquet outputs.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub source: String,
    pub synthetic: bool,
    pub trips: usize,
    pub total_rides: u64,
    pub total_rides_display: String,
    pub seasons: Vec<String>,
    pub days: usize,
    pub has_weather: bool,
    pub top_station: Option<String>,
    pub unavailable: Vec<String>,
}

pub fn write_summary(path: &Path, summary: &Summary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).context("serializing summary")?;
    fs::write(path, json).with_context(|| format!("writing {:?}", path))?;
    Ok(())
}
