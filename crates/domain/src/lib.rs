//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod badge;
mod counter;

pub use badge::{BADGE_COLOR, BADGE_LABEL, BADGE_SCHEMA_VERSION, ViewBadge};
pub use counter::{
    Attribution, ClientId, CounterRecord, DedupeWindow, RESOURCE_KEY_MAX_LENGTH, ResourceKey,
    VisitOutcome,
};
