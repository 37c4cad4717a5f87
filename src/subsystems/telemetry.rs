/*!
 * Telemetry Provider
 * Best-effort session that reports lifecycle events through tracing
 */

use super::traits::TelemetryProvider;
use crate::monitoring::tracer::generate_session_id;
use parking_lot::Mutex;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug)]
struct TelemetrySession {
    id: String,
    started_at: Instant,
    events: u64,
}

/// Default telemetry provider
#[derive(Debug, Default)]
pub struct TracingTelemetry {
    session: Mutex<Option<TelemetrySession>>,
}

impl TracingTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_registered(&self) -> bool {
        self.session.lock().is_some()
    }

    /// Current session id, if registered
    pub fn session_id(&self) -> Option<String> {
        self.session.lock().as_ref().map(|session| session.id.clone())
    }

    /// Record an event against the session; dropped when not registered
    pub fn record_event(&self, name: &str, payload: serde_json::Value) -> bool {
        let mut guard = self.session.lock();
        let Some(session) = guard.as_mut() else {
            return false;
        };

        session.events += 1;
        debug!(
            session_id = %session.id,
            event = name,
            payload = %payload,
            "Telemetry event"
        );
        true
    }
}

impl TelemetryProvider for TracingTelemetry {
    fn register(&self) {
        let mut guard = self.session.lock();
        if guard.is_some() {
            return;
        }

        let session = TelemetrySession {
            id: generate_session_id(),
            started_at: Instant::now(),
            events: 0,
        };
        info!(session_id = %session.id, "Telemetry provider registered");
        *guard = Some(session);
    }

    fn unregister(&self) {
        if let Some(session) = self.session.lock().take() {
            info!(
                session_id = %session.id,
                events = session.events,
                uptime_ms = session.started_at.elapsed().as_millis() as u64,
                "Telemetry provider unregistered"
            );
        }
    }
}
