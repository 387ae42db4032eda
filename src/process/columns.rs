//! Candidate column names per canonical attribute, and the first-present-wins
//! resolution over them.

use tracing::{debug, warn};

use crate::process::raw_table::RawTable;

pub const ATTR_DATE: &str = "date";
pub const ATTR_START: &str = "start_timestamp";
pub const ATTR_END: &str = "end_timestamp";
pub const ATTR_DURATION: &str = "trip_duration_min";
pub const ATTR_RIDER: &str = "member_casual";
pub const ATTR_STATION: &str = "start_station_name";
pub const ATTR_RIDES: &str = "rides";

pub const DATE_CANDIDATES: &[&str] = &["date", "started_at", "start_time", "start_datetime"];

/// Start timestamp used when deriving durations. Precise timestamps outrank a
/// date-only `date` column here.
pub const START_TS_CANDIDATES: &[&str] = &["started_at", "start_time", "start_datetime", "date"];

pub const END_TS_CANDIDATES: &[&str] = &["ended_at", "stoptime", "end_time"];

pub const DURATION_CANONICAL: &str = "trip_duration_min";

/// Canonical name first, then the alternates in priority order.
pub const DURATION_CANDIDATES: &[&str] = &[
    DURATION_CANONICAL,
    "trip_duration",
    "duration_min",
    "ride_length_min",
    "ride_duration_min",
    "tripduration_min",
];

pub const RIDER_CANDIDATES: &[&str] = &["member_casual", "rider_type", "usertype", "user_type"];

pub const STATION_CANDIDATES: &[&str] = &["start_station_name", "start_station", "from_station_name"];

/// Pre-aggregated exports carry a ride count per row.
pub const RIDES_CANDIDATES: &[&str] = &["bike_rides_daily", "trip_count", "rides"];

/// One column-reconciliation decision: which source name fed a canonical
/// attribute, and which other present candidates lost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnResolution {
    pub attribute: &'static str,
    pub chosen: String,
    pub index: usize,
    pub rejected: Vec<String>,
}

impl ColumnResolution {
    pub fn is_contested(&self) -> bool {
        !self.rejected.is_empty()
    }
}

/// Scan `candidates` in order and pick the first present in `raw`.
/// Later candidates that are also present are recorded as rejected.
pub fn resolve(
    raw: &RawTable,
    attribute: &'static str,
    candidates: &[&str],
) -> Option<ColumnResolution> {
    let mut present = candidates
        .iter()
        .filter_map(|name| raw.column_index(name).map(|idx| (*name, idx)));

    let (chosen, index) = present.next()?;
    let rejected: Vec<String> = present.map(|(name, _)| name.to_string()).collect();

    let res = ColumnResolution {
        attribute,
        chosen: chosen.to_string(),
        index,
        rejected,
    };
    if res.is_contested() {
        warn!(
            attribute,
            chosen = %res.chosen,
            rejected = ?res.rejected,
            "several candidate columns present; using the first by priority"
        );
    } else {
        debug!(attribute, chosen = %res.chosen, "resolved column");
    }
    Some(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_candidate_wins_and_rest_are_recorded() {
        let raw = RawTable::from_rows(&["start_time", "x", "started_at"], &[]);
        let res = resolve(&raw, "date", DATE_CANDIDATES).unwrap();
        assert_eq!(res.chosen, "started_at");
        assert_eq!(res.index, 2);
        assert_eq!(res.rejected, vec!["start_time"]);
        assert!(res.is_contested());
    }

    #[test]
    fn header_order_does_not_matter() {
        let a = RawTable::from_rows(&["usertype", "member_casual"], &[]);
        let b = RawTable::from_rows(&["member_casual", "usertype"], &[]);
        assert_eq!(resolve(&a, "rider", RIDER_CANDIDATES).unwrap().chosen, "member_casual");
        assert_eq!(resolve(&b, "rider", RIDER_CANDIDATES).unwrap().chosen, "member_casual");
    }

    #[test]
    fn absent_is_none() {
        let raw = RawTable::from_rows(&["ride_id"], &[]);
        assert!(resolve(&raw, "date", DATE_CANDIDATES).is_none());
    }
}
