//! Date-anchored theme rotation.
//!
//! Replaces the old "last index" side-effect file with a pure function of the
//! calendar date: the same date always yields the same theme, with no stored
//! counter and no race between concurrent callers.

use chrono::{Duration, NaiveDate, Utc};
use tracing::debug;

use crate::tutor::core::errors::{TutorError, TutorResult};

/// Calendar date format used everywhere in the tutor.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date string.
///
/// # Errors
/// Returns [`TutorError::InvalidConfig`] when the string does not parse.
pub fn parse_date(raw: &str) -> TutorResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|err| TutorError::InvalidConfig(format!("bad date {raw:?}: {err}")))
}

/// Pick the theme for a calendar date.
///
/// Dates are treated as plain UTC day numbers, so the result never drifts with
/// the server timezone. Dates before the anchor produce negative offsets and
/// are normalized back into `[0, themes.len())`.
///
/// # Errors
/// Returns [`TutorError::InvalidConfig`] when `themes` is empty or either date
/// does not parse as `YYYY-MM-DD`.
pub fn theme_for_date<'a>(
    date_str: &str,
    themes: &'a [String],
    anchor_date: &str,
) -> TutorResult<&'a str> {
    if themes.is_empty() {
        return Err(TutorError::InvalidConfig(
            "themes must not be empty".to_string(),
        ));
    }

    let date = parse_date(date_str)?;
    let anchor = parse_date(anchor_date)?;

    let day_offset = (date - anchor).num_days();
    let index = day_offset.rem_euclid(themes.len() as i64) as usize;
    let theme = themes[index].as_str();

    debug!(date = date_str, theme, index, day_offset, "resolved daily theme");
    Ok(theme)
}

/// Today's date string under the configured UTC offset.
///
/// The offset only decides which calendar day "today" is (e.g. +480 minutes
/// for Taiwan); the resulting string is then interpreted as a UTC day number
/// by [`theme_for_date`].
#[must_use]
pub fn today_date_string(utc_offset_minutes: i32) -> String {
    let now = Utc::now() + Duration::minutes(i64::from(utc_offset_minutes));
    now.date_naive().format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn themes(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    #[test]
    fn anchor_day_maps_to_first_theme() {
        let topics = themes(&["A", "B", "C"]);
        assert_eq!(
            theme_for_date("2025-11-01", &topics, "2025-11-01").unwrap_or(""),
            "A"
        );
    }

    #[test]
    fn offset_wraps_around_the_list() {
        let topics = themes(&["A", "B", "C"]);
        // offset 3 mod 3 = 0
        assert_eq!(
            theme_for_date("2025-11-04", &topics, "2025-11-01").unwrap_or(""),
            "A"
        );
        assert_eq!(
            theme_for_date("2025-11-03", &topics, "2025-11-01").unwrap_or(""),
            "C"
        );
    }

    #[test]
    fn dates_before_the_anchor_normalize() {
        let topics = themes(&["A", "B", "C"]);
        // offset -1 normalizes to index 2
        assert_eq!(
            theme_for_date("2025-10-31", &topics, "2025-11-01").unwrap_or(""),
            "C"
        );
        assert_eq!(
            theme_for_date("2025-10-29", &topics, "2025-11-01").unwrap_or(""),
            "A"
        );
    }

    #[test]
    fn same_inputs_always_yield_the_same_theme() {
        let topics = themes(&["daily life", "travel", "school"]);
        let first = theme_for_date("2026-02-14", &topics, "2025-11-01").unwrap_or("x");
        let second = theme_for_date("2026-02-14", &topics, "2025-11-01").unwrap_or("y");
        assert_eq!(first, second);
    }

    #[test]
    fn index_stays_in_range_for_far_dates() {
        let topics = themes(&["A", "B", "C", "D", "E", "F", "G"]);
        for date in ["1999-01-01", "2025-11-01", "2077-12-31"] {
            let theme = theme_for_date(date, &topics, "2025-11-01");
            assert!(theme.is_ok_and(|t| topics.iter().any(|x| x == t)));
        }
    }

    #[test]
    fn empty_theme_list_is_a_config_error() {
        let err = theme_for_date("2025-11-01", &[], "2025-11-01");
        assert!(matches!(err, Err(TutorError::InvalidConfig(_))));
    }

    #[test]
    fn unparseable_dates_are_config_errors() {
        let topics = themes(&["A"]);
        assert!(theme_for_date("2025/11/01", &topics, "2025-11-01").is_err());
        assert!(theme_for_date("2025-11-01", &topics, "yesterday").is_err());
    }

    #[test]
    fn today_string_has_the_expected_shape() {
        let today = today_date_string(480);
        assert!(parse_date(&today).is_ok());
    }
}
