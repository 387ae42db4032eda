use arrow::{datatypes::Schema, record_batch::RecordBatch};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::NormalizeError;
use crate::process::{
    calendar::{month_label, DayOfWeek, Season},
    canonical::*,
    columns::{self, resolve, ColumnResolution},
    convert::ColumnValues,
    date_parser::{minutes_between, parse_day, parse_timestamp},
    raw_table::RawTable,
    rider::RiderType,
    utils::{clean_str, parse_count, parse_f64},
};

/// What to do with a trip whose duration comes out below zero
/// (end timestamp before start, or a negative precomputed value).
///
/// Whatever the choice, it is applied to every row alike and the row is
/// marked in `duration_negative`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativeDurationPolicy {
    /// Null the duration; the trip drops out of duration statistics.
    Reject,
    /// Replace with `0.0`.
    Clamp,
    /// Keep the negative value as-is.
    #[default]
    PassThrough,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    pub negative_duration: NegativeDurationPolicy,
    /// Remove rows whose date cannot be parsed instead of keeping them with
    /// null date-derived columns.
    pub drop_undated_rows: bool,
}

/// Reconcile a raw trip export into the canonical table.
///
/// Fails only when no date-like column exists. Every other gap (no duration
/// source, no rider column, bad cells) degrades to absent columns or nulls.
#[tracing::instrument(level = "info", skip_all, fields(rows = raw.num_rows()))]
pub fn normalize(
    raw: &RawTable,
    opts: &NormalizeOptions,
) -> Result<CanonicalTable, NormalizeError> {
    let date_res = resolve(raw, columns::ATTR_DATE, columns::DATE_CANDIDATES).ok_or(
        NormalizeError::MissingColumn {
            attribute: "date-like",
            expected: columns::DATE_CANDIDATES,
        },
    )?;

    let parsed_dates: Vec<Option<NaiveDate>> =
        raw.column_cells(date_res.index).map(parse_day).collect();
    let undated = parsed_dates.iter().filter(|d| d.is_none()).count();
    if undated > 0 {
        debug!(undated, source = %date_res.chosen, "unparseable dates");
    }

    let keep: Vec<usize> = (0..raw.num_rows())
        .filter(|&r| !opts.drop_undated_rows || parsed_dates[r].is_some())
        .collect();

    let dates: Vec<Option<NaiveDate>> = keep.iter().map(|&r| parsed_dates[r]).collect();
    let months = dates.iter().map(|d| d.map(month_label)).collect();
    let weekdays = dates
        .iter()
        .map(|d| d.map(|d| DayOfWeek::of(d).as_str().to_string()))
        .collect();
    let seasons = dates
        .iter()
        .map(|d| d.map(|d| Season::of(d).as_str().to_string()))
        .collect();

    let mut cols: Vec<(&str, ColumnValues)> = vec![
        (COL_DATE, ColumnValues::Date(dates)),
        (COL_MONTH, ColumnValues::Utf8(months)),
        (COL_DAY_OF_WEEK, ColumnValues::Utf8(weekdays)),
        (COL_SEASON, ColumnValues::Utf8(seasons)),
    ];

    let mut resolutions = vec![date_res];

    match resolve_durations(raw, &keep) {
        Some((res, minutes)) => {
            resolutions.extend(res);
            let (minutes, negative) = apply_negative_policy(minutes, opts.negative_duration);
            cols.push((COL_DURATION, ColumnValues::Float(minutes)));
            cols.push((COL_DURATION_NEGATIVE, ColumnValues::Bool(negative)));
        }
        None => debug!("no duration source; {} unavailable", COL_DURATION),
    }

    if let Some(res) = resolve(raw, columns::ATTR_RIDER, columns::RIDER_CANDIDATES) {
        let labels = non_empty_cells(raw, res.index, &keep);
        let canonical = labels
            .iter()
            .map(|l| {
                l.as_deref()
                    .and_then(RiderType::from_label)
                    .map(|t| t.as_str().to_string())
            })
            .collect();
        cols.push((COL_MEMBER_CASUAL, ColumnValues::Utf8(labels)));
        cols.push((COL_RIDER_TYPE, ColumnValues::Utf8(canonical)));
        resolutions.push(res);
    }

    if let Some(res) = resolve(raw, columns::ATTR_STATION, columns::STATION_CANDIDATES) {
        cols.push((
            COL_STATION,
            ColumnValues::Utf8(non_empty_cells(raw, res.index, &keep)),
        ));
        resolutions.push(res);
    }

    let rides = match resolve(raw, columns::ATTR_RIDES, columns::RIDES_CANDIDATES) {
        Some(res) => {
            let counts: Vec<Option<u64>> = keep
                .iter()
                .map(|&r| parse_count(raw.cell(r, res.index)))
                .collect();
            let bad = counts.iter().filter(|c| c.is_none()).count();
            if bad > 0 {
                debug!(bad, source = %res.chosen, "unparseable ride counts treated as 0");
            }
            resolutions.push(res);
            counts.into_iter().map(|c| c.unwrap_or(0)).collect()
        }
        None => vec![1; keep.len()],
    };
    cols.push((COL_RIDES, ColumnValues::Count(rides)));

    let (fields, arrays): (Vec<_>, Vec<_>) = cols
        .into_iter()
        .map(|(name, values)| values.into_column(name))
        .unzip();
    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;

    info!(
        rows = batch.num_rows(),
        dropped = raw.num_rows() - batch.num_rows(),
        columns = batch.num_columns(),
        "normalized trip table"
    );
    Ok(CanonicalTable::new(batch, resolutions))
}

/// Duration in minutes per kept row: (a) canonical column, (b) alternates,
/// (c) end − start. `None` when no source exists at all.
fn resolve_durations(
    raw: &RawTable,
    keep: &[usize],
) -> Option<(Vec<ColumnResolution>, Vec<Option<f64>>)> {
    if let Some(res) = resolve(raw, columns::ATTR_DURATION, columns::DURATION_CANDIDATES) {
        let minutes = keep
            .iter()
            .map(|&r| parse_f64(raw.cell(r, res.index)))
            .collect();
        return Some((vec![res], minutes));
    }

    let start = resolve(raw, columns::ATTR_START, columns::START_TS_CANDIDATES)?;
    let end = resolve(raw, columns::ATTR_END, columns::END_TS_CANDIDATES)?;
    let minutes = keep
        .iter()
        .map(|&r| {
            let s = parse_timestamp(raw.cell(r, start.index))?;
            let e = parse_timestamp(raw.cell(r, end.index))?;
            Some(minutes_between(s, e))
        })
        .collect();
    Some((vec![start, end], minutes))
}

fn apply_negative_policy(
    minutes: Vec<Option<f64>>,
    policy: NegativeDurationPolicy,
) -> (Vec<Option<f64>>, Vec<bool>) {
    let (minutes, negative): (Vec<Option<f64>>, Vec<bool>) = minutes
        .into_iter()
        .map(|m| match m {
            Some(v) if v < 0.0 => {
                let out = match policy {
                    NegativeDurationPolicy::Reject => None,
                    NegativeDurationPolicy::Clamp => Some(0.0),
                    NegativeDurationPolicy::PassThrough => Some(v),
                };
                (out, true)
            }
            other => (other, false),
        })
        .unzip();

    let count = negative.iter().filter(|n| **n).count();
    if count > 0 {
        warn!(count, ?policy, "negative trip durations");
    }
    (minutes, negative)
}

fn non_empty_cells(raw: &RawTable, col: usize, keep: &[usize]) -> Vec<Option<String>> {
    keep.iter()
        .map(|&r| {
            let v = clean_str(raw.cell(r, col));
            (!v.is_empty()).then(|| v.to_string())
        })
        .collect()
}
