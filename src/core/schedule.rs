//! Schedule gate - is `now` inside the configured notification window

use chrono::{DateTime, Datelike, TimeZone, Timelike};
use tracing::debug;

use super::settings::Settings;

/// True when notifications are allowed at `now`.
///
/// A disabled schedule always allows. Weekday and hour constraints are
/// AND-ed; an unset constraint never rejects.
pub fn is_allowed<Tz: TimeZone>(now: &DateTime<Tz>, settings: &Settings) -> bool {
    let Some(schedule) = &settings.schedule else {
        return true;
    };

    let weekday = now.weekday().num_days_from_monday() as u8;
    if let Some(weekdays) = &schedule.weekdays {
        if !weekdays.contains(&weekday) {
            debug!("{} not in scheduled weekdays.", weekday);
            return false;
        }
    }

    let hour = now.hour() as u8;
    if let Some(hours) = &schedule.hours {
        if !hours.contains(&hour) {
            debug!("{} not in scheduled hours.", hour);
            return false;
        }
    }

    true
}
