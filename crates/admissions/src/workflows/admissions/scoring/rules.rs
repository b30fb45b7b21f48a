use chrono::{Datelike, NaiveDate};

pub(crate) const ACADEMIC_MAX: u8 = 70;
pub(crate) const TRACK_MAX: u8 = 15;
pub(crate) const EXPERIENCE_MAX: u8 = 10;
pub(crate) const SPEED_BONUS: u8 = 5;

pub(crate) fn academic_component(average: f64) -> u8 {
    if average > 14.0 {
        ACADEMIC_MAX
    } else if average >= 12.0 {
        50
    } else if average >= 10.0 {
        30
    } else {
        10
    }
}

/// Rules are checked in order; the first substring hit wins.
pub(crate) fn track_component(track: &str) -> u8 {
    let track = track.to_lowercase();
    if track.contains('s') || track.contains("scientifique") {
        TRACK_MAX
    } else if track.contains("es") || track.contains("economique") {
        12
    } else if track.contains('l') || track.contains("litteraire") {
        8
    } else {
        5
    }
}

/// Years may be fractional; anything not above 3 (including NaN) is junior.
pub(crate) fn experience_component(years: f64) -> u8 {
    if years > 5.0 {
        EXPERIENCE_MAX
    } else if years >= 3.0 {
        7
    } else {
        3
    }
}

/// Returns the awarded bonus and the days elapsed since intake opened on
/// 1 January of the submission year. The bonus does not depend on the delay.
pub(crate) fn speed_component(submitted_on: NaiveDate) -> (u8, i64) {
    let days = NaiveDate::from_ymd_opt(submitted_on.year(), 1, 1)
        .map(|opening| (submitted_on - opening).num_days().abs())
        .unwrap_or_default();
    (SPEED_BONUS, days)
}
