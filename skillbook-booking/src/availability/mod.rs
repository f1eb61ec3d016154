pub mod resolver;

pub use resolver::*;

use serde::Deserialize;

/// Resolver behavior when a rules/exceptions/bookings lookup fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupErrorPolicy {
    /// Degrade to the full unfiltered candidate list (historical behavior).
    FailOpen,
    /// Surface the upstream error to the caller.
    FailClosed,
}

/// How to read an exception that marks a date available without a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenEndedExceptionPolicy {
    /// The whole candidate grid is open that day.
    FullDay,
    /// The date is listed but yields no slots.
    NoSlots,
}
