//! iCalendar document model, text codec and date normalization.

pub mod build;
pub mod core;
pub mod date;
pub mod parse;
