//! Notifier - runs the filter and hands accepted messages to a poster
//!
//! `Notifier` pairs the immutable settings with a `MessagePoster`. It holds
//! no other state, so evaluating one event never affects the next.

use std::fmt::Display;
use std::io::BufRead;

use chrono::{DateTime, TimeZone};
use tracing::{debug, error, info, warn};

use super::filter::{evaluate, SkipReason, Verdict};
use super::io_traits::{DeliveryResult, DispatchError, MessagePoster};
use super::settings::Settings;
use super::types::CreatureEvent;

// =============================================================================
// OUTCOMES
// =============================================================================

/// Result of handling a single event
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Dropped by the filter
    Skipped(SkipReason),
    /// Posted; the service's answer is attached
    Posted {
        message: String,
        delivery: DeliveryResult,
    },
}

/// Counters for a batch of events read from a stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub posted: usize,
    pub skipped: usize,
    /// Transport errors and `ok: false` responses
    pub failed: usize,
    /// Lines that were not a valid event
    pub malformed: usize,
}

// =============================================================================
// NOTIFIER
// =============================================================================

pub struct Notifier<'a, P: MessagePoster> {
    settings: &'a Settings,
    poster: P,
}

impl<'a, P: MessagePoster> Notifier<'a, P> {
    pub fn new(settings: &'a Settings, poster: P) -> Self {
        Self { settings, poster }
    }

    /// Evaluate one event and post it if the filter accepts it.
    ///
    /// Delivery errors are returned to the caller untouched.
    pub fn handle<Tz>(
        &self,
        event: &CreatureEvent,
        now: &DateTime<Tz>,
    ) -> Result<Outcome, DispatchError>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let message = match evaluate(event, self.settings, now).verdict {
            Verdict::Notify(message) => message,
            Verdict::Skip(reason) => return Ok(Outcome::Skipped(reason)),
        };

        let delivery = self.poster.post(&message)?;
        Ok(Outcome::Posted { message, delivery })
    }

    /// Handle newline-delimited JSON events one after another.
    ///
    /// `clock` is read once per event. Blank lines are ignored; malformed
    /// lines and failed deliveries are logged and counted without stopping
    /// the run. Only a read error on `reader` ends it early.
    pub fn run_lines<R, Tz, C>(&self, reader: R, clock: C) -> std::io::Result<RunSummary>
    where
        R: BufRead,
        Tz: TimeZone,
        Tz::Offset: Display,
        C: Fn() -> DateTime<Tz>,
    {
        let mut summary = RunSummary::default();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let event = match CreatureEvent::from_json(&line) {
                Ok(event) => event,
                Err(e) => {
                    warn!(line = index + 1, error = %e, "[notifier] Skipping malformed event");
                    summary.malformed += 1;
                    continue;
                }
            };

            summary.processed += 1;
            Self::record(&mut summary, &event, self.handle(&event, &clock()));
        }

        info!(
            processed = summary.processed,
            posted = summary.posted,
            skipped = summary.skipped,
            failed = summary.failed,
            malformed = summary.malformed,
            "[notifier] Finished"
        );
        Ok(summary)
    }

    fn record(
        summary: &mut RunSummary,
        event: &CreatureEvent,
        result: Result<Outcome, DispatchError>,
    ) {
        match result {
            Ok(Outcome::Skipped(reason)) => {
                debug!(id = %event.id, name = %event.name, ?reason, "[notifier] Skipped");
                summary.skipped += 1;
            }
            Ok(Outcome::Posted { delivery, .. }) if delivery.ok => {
                info!(id = %event.id, name = %event.name, "[notifier] Posted");
                summary.posted += 1;
            }
            Ok(Outcome::Posted { delivery, .. }) => {
                warn!(
                    name = %event.name,
                    error = delivery.error.as_deref().unwrap_or("unknown"),
                    "[notifier] Chat service rejected message"
                );
                summary.failed += 1;
            }
            Err(e) => {
                error!(name = %event.name, error = %e, "[notifier] Delivery failed");
                summary.failed += 1;
            }
        }
    }
}
