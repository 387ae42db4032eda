use arrow::{
    array::{Array, BooleanArray, Date32Array, Float64Array, StringArray, UInt64Array},
    record_batch::RecordBatch,
};
use chrono::NaiveDate;

use crate::process::{
    calendar::{DayOfWeek, Season},
    columns::ColumnResolution,
    convert::days_to_date,
    rider::RiderType,
};

pub const COL_DATE: &str = "date";
pub const COL_MONTH: &str = "month";
pub const COL_DAY_OF_WEEK: &str = "day_of_week";
pub const COL_SEASON: &str = "season";
pub const COL_DURATION: &str = "trip_duration_min";
pub const COL_DURATION_NEGATIVE: &str = "duration_negative";
pub const COL_MEMBER_CASUAL: &str = "member_casual";
pub const COL_RIDER_TYPE: &str = "rider_type";
pub const COL_STATION: &str = "start_station_name";
pub const COL_RIDES: &str = "rides";

/// The normalized trip table. Read-only once built.
///
/// `date`, `month`, `day_of_week`, `season` and `rides` are always present.
/// Duration, rider and station columns exist only when the raw input had a
/// source for them; accessors return `None` in that case so callers have to
/// handle "feature unavailable" explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalTable {
    batch: RecordBatch,
    resolutions: Vec<ColumnResolution>,
}

impl CanonicalTable {
    pub(crate) fn new(batch: RecordBatch, resolutions: Vec<ColumnResolution>) -> Self {
        Self { batch, resolutions }
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.batch.column_by_name(name).is_some()
    }

    /// Every column decision taken while normalizing, in resolution order.
    pub fn resolutions(&self) -> &[ColumnResolution] {
        &self.resolutions
    }

    pub fn resolution(&self, attribute: &str) -> Option<&ColumnResolution> {
        self.resolutions.iter().find(|r| r.attribute == attribute)
    }

    fn utf8(&self, name: &str) -> Option<&StringArray> {
        self.batch
            .column_by_name(name)?
            .as_any()
            .downcast_ref::<StringArray>()
    }

    fn strings(&self, name: &str) -> Option<Vec<Option<&str>>> {
        self.utf8(name).map(|arr| arr.iter().collect())
    }

    pub fn dates(&self) -> Vec<Option<NaiveDate>> {
        self.batch
            .column_by_name(COL_DATE)
            .and_then(|c| c.as_any().downcast_ref::<Date32Array>())
            .map(|arr| arr.iter().map(|v| v.and_then(days_to_date)).collect())
            .unwrap_or_default()
    }

    pub fn months(&self) -> Vec<Option<&str>> {
        self.strings(COL_MONTH).unwrap_or_default()
    }

    pub fn days_of_week(&self) -> Vec<Option<DayOfWeek>> {
        self.utf8(COL_DAY_OF_WEEK)
            .map(|arr| {
                arr.iter()
                    .map(|v| v.and_then(DayOfWeek::from_label))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn seasons(&self) -> Vec<Option<Season>> {
        self.utf8(COL_SEASON)
            .map(|arr| arr.iter().map(|v| v.and_then(Season::from_label)).collect())
            .unwrap_or_default()
    }

    pub fn durations(&self) -> Option<Vec<Option<f64>>> {
        let arr = self
            .batch
            .column_by_name(COL_DURATION)?
            .as_any()
            .downcast_ref::<Float64Array>()?;
        Some(arr.iter().collect())
    }

    pub fn negative_duration_flags(&self) -> Option<Vec<bool>> {
        let arr = self
            .batch
            .column_by_name(COL_DURATION_NEGATIVE)?
            .as_any()
            .downcast_ref::<BooleanArray>()?;
        Some(arr.iter().map(|v| v.unwrap_or(false)).collect())
    }

    /// Raw rider labels, vocabulary untouched.
    pub fn member_casual(&self) -> Option<Vec<Option<&str>>> {
        self.strings(COL_MEMBER_CASUAL)
    }

    pub fn rider_types(&self) -> Option<Vec<Option<RiderType>>> {
        self.utf8(COL_RIDER_TYPE).map(|arr| {
            arr.iter()
                .map(|v| v.and_then(RiderType::from_label))
                .collect()
        })
    }

    pub fn stations(&self) -> Option<Vec<Option<&str>>> {
        self.strings(COL_STATION)
    }

    pub fn rides(&self) -> Vec<u64> {
        self.batch
            .column_by_name(COL_RIDES)
            .and_then(|c| c.as_any().downcast_ref::<UInt64Array>())
            .map(|arr| arr.values().iter().copied().collect())
            .unwrap_or_default()
    }
}
