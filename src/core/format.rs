//! Formatting utilities for notification text.

use std::fmt::Display;

use chrono::{DateTime, TimeZone};

/// Google Maps link centred on a coordinate.
///
/// Coordinates keep a trailing `.0` for whole degrees (`40.0`, not `40`).
///
/// # Examples
///
/// ```
/// use creature_notifier::core::format::maps_link;
///
/// assert_eq!(
///     maps_link(40.001, -75.0),
///     "http://maps.google.com/maps?q=40.001,-75.0&20z"
/// );
/// ```
pub fn maps_link(lat: f64, lng: f64) -> String {
    format!(
        "http://maps.google.com/maps?q={},{}&20z",
        decimal(lat),
        decimal(lng)
    )
}

/// Plain decimal notation, never an exponent
fn decimal(degrees: f64) -> String {
    let s = degrees.to_string();
    if s.contains('.') || !degrees.is_finite() {
        s
    } else {
        format!("{s}.0")
    }
}

/// Wall-clock despawn time in `tz`, as `3:45PM`.
///
/// Returns `"?"` for timestamps chrono cannot represent.
pub fn format_disappear_time<Tz>(epoch_secs: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match DateTime::from_timestamp(epoch_secs, 0) {
        Some(utc) => utc.with_timezone(tz).format("%-I:%M%p").to_string(),
        None => "?".to_string(),
    }
}

/// Notification for an event within the distance threshold
pub fn nearby_message(name: &str, time: &str, link: &str) -> String {
    format!("{} is nearby until {} ({})", name, time, link)
}

/// Notification for an event beyond the distance threshold.
/// The distance is truncated to whole meters.
pub fn far_message(name: &str, distance_m: f64, time: &str, link: &str) -> String {
    format!("{} is {}m away until {} ({})", name, distance_m as i64, time, link)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_maps_link() {
        assert_eq!(
            maps_link(51.5, -0.125),
            "http://maps.google.com/maps?q=51.5,-0.125&20z"
        );
    }

    #[test]
    fn test_maps_link_small_coordinates_stay_decimal() {
        assert_eq!(
            maps_link(0.00001, 179.0),
            "http://maps.google.com/maps?q=0.00001,179.0&20z"
        );
        assert_eq!(
            maps_link(-0.0000025, 0.0),
            "http://maps.google.com/maps?q=-0.0000025,0.0&20z"
        );
    }

    #[test]
    fn test_disappear_time_afternoon() {
        // 2016-07-20 15:45:00 UTC
        assert_eq!(format_disappear_time(1_469_029_500, &Utc), "3:45PM");
    }

    #[test]
    fn test_disappear_time_no_leading_zero() {
        // 2016-07-20 09:05:00 UTC
        assert_eq!(format_disappear_time(1_469_005_500, &Utc), "9:05AM");
    }

    #[test]
    fn test_disappear_time_midnight_and_noon() {
        // 2016-07-20 00:30:00 UTC
        assert_eq!(format_disappear_time(1_468_974_600, &Utc), "12:30AM");
        // 2016-07-20 12:00:00 UTC
        assert_eq!(format_disappear_time(1_469_016_000, &Utc), "12:00PM");
    }

    #[test]
    fn test_disappear_time_uses_given_zone() {
        let est = FixedOffset::west_opt(5 * 3600).unwrap();
        // 15:45 UTC is 10:45 at UTC-5
        assert_eq!(format_disappear_time(1_469_029_500, &est), "10:45AM");
    }

    #[test]
    fn test_disappear_time_out_of_range() {
        assert_eq!(format_disappear_time(i64::MAX, &Utc), "?");
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            nearby_message("Rattata", "3:45PM", "LINK"),
            "Rattata is nearby until 3:45PM (LINK)"
        );
        assert_eq!(
            far_message("Snorlax", 412.98, "3:45PM", "LINK"),
            "Snorlax is 412m away until 3:45PM (LINK)"
        );
    }
}
