//! Event destinations.
//!
//! The simulator hands every event to an [`EventSink`] and records the
//! [`Delivery`] it gets back. A failed delivery is reported, never raised:
//! sinks swallow their own errors after logging them.

use std::future::Future;

use chrono::SecondsFormat;
use journey_seeder_core::Event;
use tracing::{info, warn};

use crate::klaviyo::CreateEventInput;

/// Outcome of handing one event to a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The endpoint accepted the event.
    Accepted { status: u16 },
    /// The endpoint answered with a non-success status.
    Rejected { status: u16 },
    /// No response was received (connection, TLS, serialization failure).
    Failed,
    /// The sink intentionally did not send anything.
    Skipped,
}

impl Delivery {
    /// HTTP status of the response, if there was one.
    #[must_use]
    pub const fn status(self) -> Option<u16> {
        match self {
            Self::Accepted { status } | Self::Rejected { status } => Some(status),
            Self::Failed | Self::Skipped => None,
        }
    }

    #[must_use]
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// A destination for journey events.
pub trait EventSink {
    /// Submit one event and report what happened.
    fn deliver(&self, event: &Event<'_>) -> impl Future<Output = Delivery> + Send;
}

/// Logs each payload instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunSink;

impl EventSink for DryRunSink {
    async fn deliver(&self, event: &Event<'_>) -> Delivery {
        let time = event.time.to_rfc3339_opts(SecondsFormat::Secs, true);
        match serde_json::to_string(&CreateEventInput::from(event)) {
            Ok(payload) => {
                info!(
                    metric = %event.metric,
                    email = %event.profile.email,
                    time = %time,
                    payload = %payload,
                    "Dry run, event not sent"
                );
                Delivery::Skipped
            }
            Err(e) => {
                warn!(metric = %event.metric, error = %e, "Failed to serialize event");
                Delivery::Failed
            }
        }
    }
}
