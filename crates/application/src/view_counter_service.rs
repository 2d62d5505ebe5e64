//! View counting ports and application service.
//!
//! Attributes each badge request to a counter record, counting a client at
//! most once per dedupe window and pruning attribution history on every write.

mod ports;
mod service;

#[cfg(test)]
mod tests;

pub use ports::CounterRepository;
pub use service::{RecordedView, ViewCounterService};
