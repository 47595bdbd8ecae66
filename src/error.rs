//! # Bus errors
//!
//! None of these abort anything: channels report them through `tracing` and
//! carry on. The `try_*` operations hand them back to the caller instead.

use thiserror::Error;

/// Diagnostics raised by channels, messages and the tick driver
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The handler is already attached to this topic
    #[error("{channel}: handler already attached to {topic}")]
    DuplicateRegistration {
        /// Channel debug name
        channel: &'static str,
        /// Topic, rendered with `Debug`
        topic: String,
    },

    /// The topic has no listeners or the handler is not one of them
    #[error("{channel}: no such handler attached to {topic}")]
    MissingRegistration {
        /// Channel debug name
        channel: &'static str,
        /// Topic, rendered with `Debug`
        topic: String,
    },

    /// A handler panicked or returned an error while receiving a message
    #[error("{channel}: handler for {topic} failed: {reason}")]
    DeliveryFailure {
        /// Channel debug name
        channel: &'static str,
        /// Topic, rendered with `Debug`
        topic: String,
        /// Panic message or handler error
        reason: String,
    },

    /// The message payload is not of the requested type
    #[error("cannot read payload of type {found} as {expected}")]
    PayloadTypeMismatch {
        /// Requested type
        expected: &'static str,
        /// Stored type, or `()` when the message has no payload
        found: &'static str,
    },

    /// The callback is already registered with the driver
    #[error("tick callback already registered")]
    DuplicateDriverCallback,

    /// The callback is not registered with the driver
    #[error("tick callback not registered")]
    MissingDriverCallback,
}

impl BusError {
    /// Returns a short stable label (snake_case) for use in logs
    pub fn as_label(&self) -> &'static str {
        match self {
            BusError::DuplicateRegistration { .. } => "duplicate_registration",
            BusError::MissingRegistration { .. } => "missing_registration",
            BusError::DeliveryFailure { .. } => "delivery_failure",
            BusError::PayloadTypeMismatch { .. } => "payload_type_mismatch",
            BusError::DuplicateDriverCallback => "duplicate_driver_callback",
            BusError::MissingDriverCallback => "missing_driver_callback",
        }
    }
}
