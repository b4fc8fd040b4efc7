//! Track layout for resource calendars.
//!
//! This crate assigns every booking a visual lane ("track") so that bookings
//! sharing a calendar day on the same resource never share a lane:
//! - Day expansion: which local days an event touches
//! - Resource projection: which events belong to which vehicle row
//! - Track assignment: greedy first-fit over each row's days
//! - Layout store: the cached slot map, full recompute and single patches

pub mod day;
pub mod event;
pub mod resource;
mod slots;
mod store;
pub mod track;
mod trigger;
mod types;

pub use day::{DateWindow, DayKey, DayKeyParseError, MAX_SPAN_DAYS, expand_days};
pub use event::{
    Accessors, Event, FieldConfig, FieldConfigError, RecordError, Resource, ResourceRef, Scheduled,
};
pub use resource::ResourceKey;
pub use slots::{Collision, SlotMap};
pub use store::{LayoutOptions, LayoutStore};
pub use track::DaySlots;
pub use trigger::{Recompute, RecomputeTrigger};
pub use types::{EventId, ResourceId, Track, ValidationError};
