//! iCalendar document model.
//!
//! A document is a tree of [`Component`]s, each holding a [`PropertyStore`]
//! of attributed, possibly multi-valued properties. Component kinds are chosen
//! at creation time through a [`ComponentRegistry`]; events normalize their
//! date properties to UTC and calendars expose an event view.

mod calendar;
mod component;
mod event;
mod property;
mod registry;

pub use component::{Component, ComponentKind};
pub use event::{DATE_PROPERTIES, EventJson, Reference, References, is_date_property};
pub use property::{Attributes, CompactValue, PropertyError, PropertyStore, PropertyValue, names};
pub use registry::{ComponentFactory, ComponentRegistry};
