//! Notification filter - decides whether a creature event is worth a message
//!
//! The decision runs in a fixed order:
//! 1. Schedule gate (nothing else is computed outside the window)
//! 2. Distance from the origin, when a threshold is configured
//! 3. Ignore lists, chosen by whether the event is far or near
//! 4. Message formatting

use std::collections::HashSet;
use std::fmt::Display;

use chrono::{DateTime, TimeZone};
use tracing::debug;

use super::distance::distance;
use super::format::{far_message, format_disappear_time, maps_link, nearby_message};
use super::schedule;
use super::settings::Settings;
use super::types::CreatureEvent;

// =============================================================================
// DECISION
// =============================================================================

/// Why an event was not notified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `now` is outside the configured schedule window
    OutsideSchedule,
    /// Name or id is on the ignore list that applies
    Ignored,
    /// Far event with no far-ignore list configured
    FarUnlisted,
}

/// Notify with a message, or skip for a reason
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Notify(String),
    Skip(SkipReason),
}

/// Outcome of evaluating one event
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationDecision {
    pub is_far: bool,
    /// Only computed when a distance threshold is configured
    pub distance_m: Option<f64>,
    pub verdict: Verdict,
}

impl NotificationDecision {
    fn skip(reason: SkipReason, is_far: bool, distance_m: Option<f64>) -> Self {
        Self {
            is_far,
            distance_m,
            verdict: Verdict::Skip(reason),
        }
    }

    fn notify(message: String, is_far: bool, distance_m: Option<f64>) -> Self {
        Self {
            is_far,
            distance_m,
            verdict: Verdict::Notify(message),
        }
    }

    pub fn should_notify(&self) -> bool {
        matches!(self.verdict, Verdict::Notify(_))
    }

    pub fn message(&self) -> Option<&str> {
        match &self.verdict {
            Verdict::Notify(message) => Some(message),
            Verdict::Skip(_) => None,
        }
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self.verdict {
            Verdict::Skip(reason) => Some(reason),
            Verdict::Notify(_) => None,
        }
    }
}

// =============================================================================
// EVALUATION
// =============================================================================

/// Decide whether `event` should be notified at `now`.
///
/// The despawn time in the message is rendered in `now`'s timezone.
pub fn evaluate<Tz>(
    event: &CreatureEvent,
    settings: &Settings,
    now: &DateTime<Tz>,
) -> NotificationDecision
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if !schedule::is_allowed(now, settings) {
        return NotificationDecision::skip(SkipReason::OutsideSchedule, false, None);
    }

    let (is_far, distance_m) = match settings.distance_threshold_m {
        Some(threshold) => {
            let meters = distance(settings.origin, event.position());
            let far = meters > f64::from(threshold);
            if far {
                debug!("{} is far away.", event.name);
            }
            (far, Some(meters))
        }
        None => (false, None),
    };

    if let Some(reason) = suppression(event, settings, is_far) {
        debug!("Ignored {}.", event.name);
        return NotificationDecision::skip(reason, is_far, distance_m);
    }

    debug!("Notifying {}:{}.", event.id, event.name);

    let link = maps_link(event.lat, event.lng);
    let time = format_disappear_time(event.disappear_time, &now.timezone());
    let message = match distance_m {
        Some(meters) if is_far => far_message(&event.name, meters, &time, &link),
        _ => nearby_message(&event.name, &time, &link),
    };

    NotificationDecision::notify(message, is_far, distance_m)
}

/// Which ignore rule, if any, drops this event.
///
/// Far events are denied by default: without a far-ignore list they are
/// dropped unless `far_unlisted` is set. Near events are only dropped when
/// they appear on the ignore list.
fn suppression(event: &CreatureEvent, settings: &Settings, is_far: bool) -> Option<SkipReason> {
    if is_far {
        match &settings.far_ignore {
            Some(list) if is_listed(list, event) => Some(SkipReason::Ignored),
            Some(_) => None,
            None if settings.far_unlisted => None,
            None => Some(SkipReason::FarUnlisted),
        }
    } else {
        match &settings.ignore {
            Some(list) if is_listed(list, event) => Some(SkipReason::Ignored),
            _ => None,
        }
    }
}

fn is_listed(list: &HashSet<String>, event: &CreatureEvent) -> bool {
    list.contains(&event.name.to_lowercase()) || list.contains(&event.id)
}
