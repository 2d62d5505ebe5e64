//! Application services and ports.

#![forbid(unsafe_code)]

mod view_counter_service;

pub use view_counter_service::{CounterRepository, RecordedView, ViewCounterService};
