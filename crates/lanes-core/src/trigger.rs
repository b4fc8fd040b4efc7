//! Re-runs the layout when its inputs change.
//!
//! The host calls [`RecomputeTrigger::observe`] on every state change (new
//! events, new resources, different field configuration, a new visible
//! window). Only a real difference in what the layout depends on causes a
//! recompute, so an interactive patch survives unrelated re-renders.

use chrono::{DateTime, TimeZone, Utc};

use crate::day::DateWindow;
use crate::event::{Accessors, FieldConfig, ResourceRef, Scheduled};
use crate::resource::{ResourceKey, buckets};
use crate::store::LayoutStore;
use crate::types::EventId;

/// Whether an observation rebuilt the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recompute {
    Ran,
    Skipped,
}

/// Everything the layout depends on, normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
struct InputFingerprint {
    events: Vec<(EventId, DateTime<Utc>, DateTime<Utc>, ResourceRef)>,
    buckets: Vec<ResourceKey>,
    fields: FieldConfig,
    window: Option<DateWindow>,
}

impl InputFingerprint {
    fn of<E, R>(
        events: &[E],
        resources: &[R],
        accessors: &Accessors<E, R>,
        fields: &FieldConfig,
        window: Option<DateWindow>,
    ) -> Self
    where
        E: Scheduled,
    {
        let events = events
            .iter()
            .map(|event| {
                let (start, end) = event.span();
                (
                    event.id().clone(),
                    start,
                    end,
                    accessors.event_resources(event),
                )
            })
            .collect();

        Self {
            events,
            buckets: buckets(resources, accessors),
            fields: fields.clone(),
            window,
        }
    }
}

/// Remembers the last inputs laid out by a [`LayoutStore`].
#[derive(Debug, Default)]
pub struct RecomputeTrigger {
    last: Option<InputFingerprint>,
}

impl RecomputeTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes `store` if the inputs differ from the last observed ones.
    ///
    /// `fields` describes what `accessors` read; hosts that switch accessors
    /// pass the matching configuration so the switch is noticed.
    pub fn observe<E, R, Tz>(
        &mut self,
        store: &mut LayoutStore<Tz>,
        events: &[E],
        resources: &[R],
        accessors: &Accessors<E, R>,
        fields: &FieldConfig,
    ) -> Recompute
    where
        E: Scheduled,
        Tz: TimeZone,
    {
        let fingerprint =
            InputFingerprint::of(events, resources, accessors, fields, store.options().window);
        if self.last.as_ref() == Some(&fingerprint) {
            tracing::trace!("layout inputs unchanged");
            return Recompute::Skipped;
        }

        store.recompute_all(events, resources, accessors);
        self.last = Some(fingerprint);
        Recompute::Ran
    }

    /// Forces the next [`observe`](Self::observe) to recompute.
    pub fn invalidate(&mut self) {
        self.last = None;
    }
}
