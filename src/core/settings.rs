//! Validated, immutable notification settings
//!
//! `Settings` is built once at startup (see `app::config`) and passed by
//! reference into every evaluation. Every optional filter is `None` when the
//! feature is disabled; a `Some` set is never empty.

use std::collections::HashSet;

use super::types::GeoPoint;

/// Weekday/hour notification window
///
/// Weekdays count from Monday = 0 to Sunday = 6.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    pub weekdays: Option<HashSet<u8>>,
    pub hours: Option<HashSet<u8>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Point distances are measured from
    pub origin: GeoPoint,
    pub slack_key: String,
    pub slack_channel: String,
    /// Names or ids never notified while near
    pub ignore: Option<HashSet<String>>,
    /// Names or ids never notified while far
    pub far_ignore: Option<HashSet<String>>,
    /// Events further than this many meters count as far
    pub distance_threshold_m: Option<u32>,
    /// Notify far events when no far-ignore list is configured.
    /// Off by default: far events are dropped unless a far list exists.
    pub far_unlisted: bool,
    /// `None` disables the schedule gate entirely
    pub schedule: Option<Schedule>,
}

impl Settings {
    /// Settings with every filter disabled
    pub fn new(origin: GeoPoint, slack_key: &str, slack_channel: &str) -> Self {
        Self {
            origin,
            slack_key: slack_key.to_string(),
            slack_channel: slack_channel.to_string(),
            ignore: None,
            far_ignore: None,
            distance_threshold_m: None,
            far_unlisted: false,
            schedule: None,
        }
    }
}

/// Split a comma-separated ignore list into lowercase, trimmed identifiers.
///
/// Returns `None` for an empty or all-blank list so an empty string disables
/// the filter instead of producing an empty set.
///
/// # Examples
///
/// ```
/// use creature_notifier::core::settings::parse_id_list;
///
/// let set = parse_id_list("Pidgey, RATTATA ,16").unwrap();
/// assert!(set.contains("pidgey"));
/// assert!(set.contains("rattata"));
/// assert!(set.contains("16"));
/// assert_eq!(parse_id_list(" , "), None);
/// ```
pub fn parse_id_list(list: &str) -> Option<HashSet<String>> {
    let set: HashSet<String> = list
        .split(',')
        .map(|entry| entry.trim().to_lowercase())
        .filter(|entry| !entry.is_empty())
        .collect();

    if set.is_empty() {
        None
    } else {
        Some(set)
    }
}
