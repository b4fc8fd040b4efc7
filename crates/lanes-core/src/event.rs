//! Bookings and resources as seen by the layout engine.
//!
//! The engine never owns these values. Hosts either use [`Event`] and
//! [`Resource`] directly or plug their own shapes in through the
//! [`Scheduled`] trait and an [`Accessors`] pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::{EventId, ResourceId};

/// Something with an identity and a time span that can be laid out.
pub trait Scheduled {
    /// Returns the event's stable identifier.
    fn id(&self) -> &EventId;

    /// Returns when the event starts.
    fn start(&self) -> DateTime<Utc>;

    /// Returns when the event ends.
    fn end(&self) -> DateTime<Utc>;

    /// Start and end with `end < start` collapsed onto `start`.
    fn span(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.start();
        (start, self.end().max(start))
    }
}

/// Which resources an event is booked on.
///
/// Mirrors a resource field that may hold nothing, one id, or a list of ids.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceRef {
    #[default]
    None,
    One(ResourceId),
    Many(Vec<ResourceId>),
}

impl ResourceRef {
    /// All referenced ids, in field order.
    pub fn ids(&self) -> &[ResourceId] {
        match self {
            Self::None => &[],
            Self::One(id) => std::slice::from_ref(id),
            Self::Many(ids) => ids,
        }
    }

    pub fn contains(&self, id: &ResourceId) -> bool {
        self.ids().contains(id)
    }

    pub fn is_none(&self) -> bool {
        self.ids().is_empty()
    }
}

/// A booking on the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "ResourceRef::is_none")]
    pub resource: ResourceRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Scheduled for Event {
    fn id(&self) -> &EventId {
        &self.id
    }

    fn start(&self) -> DateTime<Utc> {
        self.start
    }

    fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// A vehicle, supplier or any other row of the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Typed replacements for "which attribute holds the resource id" lookups.
pub struct Accessors<E, R> {
    resource_id_of: Box<dyn Fn(&R) -> ResourceId>,
    event_resources_of: Box<dyn Fn(&E) -> ResourceRef>,
}

impl<E, R> Accessors<E, R> {
    pub fn new(
        resource_id_of: impl Fn(&R) -> ResourceId + 'static,
        event_resources_of: impl Fn(&E) -> ResourceRef + 'static,
    ) -> Self {
        Self {
            resource_id_of: Box::new(resource_id_of),
            event_resources_of: Box::new(event_resources_of),
        }
    }

    pub fn resource_id(&self, resource: &R) -> ResourceId {
        (self.resource_id_of)(resource)
    }

    pub fn event_resources(&self, event: &E) -> ResourceRef {
        (self.event_resources_of)(event)
    }
}

impl Accessors<Event, Resource> {
    /// Accessors for the crate's own [`Event`] and [`Resource`] types.
    pub fn standard() -> Self {
        Self::new(
            |resource: &Resource| resource.id.clone(),
            |event: &Event| event.resource.clone(),
        )
    }
}

/// Attribute names used to read raw event and resource records.
///
/// Hosts shape their records differently per screen, so these are
/// configuration rather than constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub event_id_field: String,
    pub event_start_field: String,
    pub event_end_field: String,
    pub event_resource_field: String,
    pub resource_id_field: String,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            event_id_field: "id".to_string(),
            event_start_field: "start".to_string(),
            event_end_field: "end".to_string(),
            event_resource_field: "resource_id".to_string(),
            resource_id_field: "id".to_string(),
        }
    }
}

/// A field configuration naming an empty attribute.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("field name for {setting} cannot be empty")]
pub struct FieldConfigError {
    setting: &'static str,
}

impl FieldConfig {
    pub fn validate(&self) -> Result<(), FieldConfigError> {
        let settings = [
            ("event_id_field", &self.event_id_field),
            ("event_start_field", &self.event_start_field),
            ("event_end_field", &self.event_end_field),
            ("event_resource_field", &self.event_resource_field),
            ("resource_id_field", &self.resource_id_field),
        ];
        match settings.iter().find(|(_, name)| name.trim().is_empty()) {
            Some((setting, _)) => Err(FieldConfigError { setting: *setting }),
            None => Ok(()),
        }
    }
}

/// Errors converting a raw JSON record into an [`Event`] or [`Resource`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("missing field {field:?}")]
    MissingField { field: String },

    #[error("field {field:?} is not a valid identifier")]
    InvalidId { field: String },

    #[error("field {field:?} is not an RFC 3339 timestamp: {value}")]
    InvalidTimestamp { field: String, value: String },
}

impl Event {
    /// Reads an event from a raw record using the configured attribute names.
    ///
    /// A missing end makes the event zero-length. A resource attribute that
    /// is absent or `null` means the event is not booked on any resource.
    pub fn from_record(record: &Value, fields: &FieldConfig) -> Result<Self, RecordError> {
        let object = record.as_object().ok_or(RecordError::NotAnObject)?;

        let id = required_id(object, &fields.event_id_field)?;
        let id = EventId::new(id).map_err(|_| RecordError::InvalidId {
            field: fields.event_id_field.clone(),
        })?;

        let start = object
            .get(&fields.event_start_field)
            .ok_or_else(|| RecordError::MissingField {
                field: fields.event_start_field.clone(),
            })
            .and_then(|value| parse_instant(value, &fields.event_start_field))?;
        let end = match object.get(&fields.event_end_field) {
            None | Some(Value::Null) => start,
            Some(value) => parse_instant(value, &fields.event_end_field)?,
        };

        let resource = match object.get(&fields.event_resource_field) {
            None | Some(Value::Null) => ResourceRef::None,
            Some(Value::Array(items)) => ResourceRef::Many(
                items
                    .iter()
                    .filter_map(id_string)
                    .filter_map(|id| ResourceId::new(id).ok())
                    .collect(),
            ),
            Some(value) => id_string(value)
                .and_then(|id| ResourceId::new(id).ok())
                .map_or(ResourceRef::None, ResourceRef::One),
        };

        let title = object
            .get("title")
            .and_then(Value::as_str)
            .map(String::from);

        Ok(Self {
            id,
            start,
            end,
            resource,
            title,
        })
    }
}

impl Resource {
    /// Reads a resource from a raw record using the configured id attribute.
    pub fn from_record(record: &Value, fields: &FieldConfig) -> Result<Self, RecordError> {
        let object = record.as_object().ok_or(RecordError::NotAnObject)?;

        let id = required_id(object, &fields.resource_id_field)?;
        let id = ResourceId::new(id).map_err(|_| RecordError::InvalidId {
            field: fields.resource_id_field.clone(),
        })?;

        let text = |name: &str| object.get(name).and_then(Value::as_str).map(String::from);

        Ok(Self {
            id,
            name: text("name"),
            color: text("color"),
        })
    }
}

fn required_id(object: &Map<String, Value>, field: &str) -> Result<String, RecordError> {
    let value = object.get(field).ok_or_else(|| RecordError::MissingField {
        field: field.to_string(),
    })?;
    id_string(value).ok_or_else(|| RecordError::InvalidId {
        field: field.to_string(),
    })
}

/// Ids arrive as strings or numbers depending on the backend.
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_instant(value: &Value, field: &str) -> Result<DateTime<Utc>, RecordError> {
    let invalid = || RecordError::InvalidTimestamp {
        field: field.to_string(),
        value: value.to_string(),
    };
    let text = value.as_str().ok_or_else(invalid)?;
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| invalid())
}
