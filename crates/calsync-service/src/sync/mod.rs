//! Reconciliation of incoming calendar documents with the canonical calendar.

mod engine;
mod observer;

#[cfg(test)]
mod engine_tests;

pub use engine::CalendarSync;
pub use observer::{ChangeKind, EventChange, EventObserver};
