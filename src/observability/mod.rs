//! Observability for the paginator
//!
//! - Structured logging (JSON lines on stderr)
//! - Monotonic counters
//!
//! Observability never changes a result: logging failures are ignored and
//! counters are write-only from the paginator's point of view.

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log an event at its own severity
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        // This just verifies no panic
        log_event(Event::CacheMiss, &[]);
        log_event(Event::QueryFailed, &[("message", "no such column")]);
    }
}
