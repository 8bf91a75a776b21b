//! Core module - filtering logic with no network or file access

pub mod distance;
pub mod filter;
pub mod format;
pub mod io_traits;
pub mod notifier;
pub mod schedule;
pub mod settings;
pub mod types;

pub use distance::distance;
pub use filter::{evaluate, NotificationDecision, SkipReason, Verdict};
pub use io_traits::{DeliveryResult, DispatchError, MessagePoster};
pub use notifier::{Notifier, Outcome, RunSummary};
pub use settings::{Schedule, Settings};
pub use types::{CreatureEvent, GeoPoint};
