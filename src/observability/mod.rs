//! Observability subsystem
//!
//! Structured one-line JSON logging and typed lifecycle events.
//!
//! # Usage
//!
//! ```ignore
//! use partdb::observability::{log_event, Event, Logger, Severity};
//!
//! Logger::set_min_severity(Severity::Trace);
//! log_event(Event::PartitionOpen, &[("data", "/tmp/col/data")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a typed event at its own severity
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
