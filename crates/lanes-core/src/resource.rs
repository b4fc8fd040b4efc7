//! Resource buckets: which events are laid out against which row.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::event::Accessors;
use crate::types::ResourceId;

/// The bucket an event is laid out in.
///
/// `All` is the single bucket used when no resources are configured. It is
/// written as `"all"`. Keys compare by their text form, so a resource whose
/// id is `all` is the same key as `All`; the two never coexist in one layout.
#[derive(Debug, Clone)]
pub enum ResourceKey {
    All,
    Resource(ResourceId),
}

impl ResourceKey {
    pub const ALL: &'static str = "all";

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => Self::ALL,
            Self::Resource(id) => id.as_str(),
        }
    }

    /// Parses a key as written by [`fmt::Display`]. Empty input yields `None`.
    pub fn parse(s: &str) -> Option<Self> {
        if s == Self::ALL {
            return Some(Self::All);
        }
        ResourceId::new(s).ok().map(Self::Resource)
    }
}

impl PartialEq for ResourceKey {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for ResourceKey {}

impl PartialOrd for ResourceKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ResourceKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl Hash for ResourceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl From<ResourceId> for ResourceKey {
    fn from(id: ResourceId) -> Self {
        Self::Resource(id)
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(Self::ALL),
            Self::Resource(id) => write!(f, "{id}"),
        }
    }
}

impl Serialize for ResourceKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResourceKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).ok_or_else(|| serde::de::Error::custom("resource key cannot be empty"))
    }
}

/// The buckets to lay out, in resource order.
///
/// With no resources every event goes to [`ResourceKey::All`]. Repeated
/// resource ids collapse into one bucket.
pub fn buckets<E, R>(resources: &[R], accessors: &Accessors<E, R>) -> Vec<ResourceKey> {
    if resources.is_empty() {
        return vec![ResourceKey::All];
    }

    let mut seen = HashSet::with_capacity(resources.len());
    resources
        .iter()
        .map(|resource| accessors.resource_id(resource))
        .filter(|id| seen.insert(id.clone()))
        .map(ResourceKey::Resource)
        .collect()
}

/// Events belonging to one bucket, in input order.
///
/// An event booked on several resources is returned for each of them.
pub fn project<'a, E, R>(
    events: impl IntoIterator<Item = &'a E>,
    key: &ResourceKey,
    accessors: &Accessors<E, R>,
) -> Vec<&'a E>
where
    E: 'a,
{
    match key {
        ResourceKey::All => events.into_iter().collect(),
        ResourceKey::Resource(id) => events
            .into_iter()
            .filter(|event| accessors.event_resources(event).contains(id))
            .collect(),
    }
}

/// Events that land in no bucket because none of their resources is known.
///
/// Always empty when no resources are configured.
pub fn unplaced<'a, E, R>(
    events: &'a [E],
    resources: &[R],
    accessors: &Accessors<E, R>,
) -> Vec<&'a E> {
    if resources.is_empty() {
        return Vec::new();
    }

    let known: HashSet<ResourceId> = resources
        .iter()
        .map(|resource| accessors.resource_id(resource))
        .collect();
    events
        .iter()
        .filter(|event| {
            !accessors
                .event_resources(event)
                .ids()
                .iter()
                .any(|id| known.contains(id))
        })
        .collect()
}
