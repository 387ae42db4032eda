use chrono::{Datelike, NaiveDate, Weekday};
use serde::Deserialize;
use std::fmt;

/// English weekday with the fixed week order `Monday < … < Sunday`.
///
/// The derived `Ord` follows declaration order, so grouping and sorting never
/// fall back to lexicographic order of the labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn of(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        DayOfWeek::ALL.into_iter().find(|d| d.as_str() == s)
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Meteorological season, Northern hemisphere: Dec–Feb is winter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    pub fn of(date: NaiveDate) -> Self {
        match date.month() {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            _ => Season::Fall,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        [Season::Winter, Season::Spring, Season::Summer, Season::Fall]
            .into_iter()
            .find(|season| season.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `YYYY-MM` label for the month containing `date`.
pub fn month_label(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn weekday_names_and_order() {
        assert_eq!(DayOfWeek::of(d(2022, 3, 1)), DayOfWeek::Tuesday);
        assert_eq!(DayOfWeek::of(d(2022, 1, 2)).as_str(), "Sunday");

        // Lexicographic order would put Friday first.
        let mut days: Vec<DayOfWeek> = ["Sunday", "Friday", "Monday", "Wednesday"]
            .iter()
            .filter_map(|s| DayOfWeek::from_label(s))
            .collect();
        days.sort();
        assert_eq!(
            days,
            vec![
                DayOfWeek::Monday,
                DayOfWeek::Wednesday,
                DayOfWeek::Friday,
                DayOfWeek::Sunday
            ]
        );
        assert_eq!(DayOfWeek::from_label("monday"), None);
    }

    #[test]
    fn seasons() {
        assert_eq!(Season::of(d(2022, 12, 1)), Season::Winter);
        assert_eq!(Season::of(d(2022, 2, 28)), Season::Winter);
        assert_eq!(Season::of(d(2022, 3, 1)), Season::Spring);
        assert_eq!(Season::of(d(2022, 8, 31)), Season::Summer);
        assert_eq!(Season::of(d(2022, 11, 30)), Season::Fall);
        assert_eq!(Season::from_label(" summer"), Some(Season::Summer));
    }

    #[test]
    fn month_labels() {
        assert_eq!(month_label(d(2022, 3, 1)), "2022-03");
        assert_eq!(month_label(d(2022, 11, 30)), "2022-11");
    }
}
