//! Layout store: owns the current slot map and its two mutators.
//!
//! The store is single-writer. Readers that need a stable view take a
//! [`LayoutStore::snapshot`]; a recompute swaps in a fresh map and a patch
//! copies on write, so a snapshot never changes under its holder. Hosts that
//! share the store across threads put it behind one `Mutex`.

use std::sync::Arc;

use chrono::TimeZone;

use crate::day::{DateWindow, DayKey};
use crate::event::{Accessors, Scheduled};
use crate::resource::{ResourceKey, buckets, project, unplaced};
use crate::slots::SlotMap;
use crate::track::{assign_tracks, sort_by_start};
use crate::types::{EventId, Track};

/// How days are computed and which of them are laid out.
#[derive(Debug, Clone)]
pub struct LayoutOptions<Tz: TimeZone> {
    /// Zone whose calendar dates form the day keys.
    pub timezone: Tz,
    /// Visible days; `None` lays out every day an event touches.
    pub window: Option<DateWindow>,
}

impl<Tz: TimeZone> LayoutOptions<Tz> {
    pub const fn new(timezone: Tz) -> Self {
        Self {
            timezone,
            window: None,
        }
    }

    #[must_use]
    pub fn with_window(mut self, window: DateWindow) -> Self {
        self.window = Some(window);
        self
    }
}

#[derive(Debug)]
pub struct LayoutStore<Tz: TimeZone> {
    options: LayoutOptions<Tz>,
    slots: Arc<SlotMap>,
}

impl<Tz: TimeZone> LayoutStore<Tz> {
    pub fn new(options: LayoutOptions<Tz>) -> Self {
        Self {
            options,
            slots: Arc::new(SlotMap::new()),
        }
    }

    pub const fn options(&self) -> &LayoutOptions<Tz> {
        &self.options
    }

    /// Changes the visible days. Takes effect on the next recompute.
    pub fn set_window(&mut self, window: Option<DateWindow>) {
        self.options.window = window;
    }

    /// The current slot map.
    pub fn slots(&self) -> &SlotMap {
        &self.slots
    }

    /// A handle to the current slot map that later mutations do not touch.
    pub fn snapshot(&self) -> Arc<SlotMap> {
        Arc::clone(&self.slots)
    }

    /// Rebuilds the whole slot map from the given events and resources.
    ///
    /// Events are ordered by start (ties keep input order), split into
    /// resource buckets, and laid out bucket by bucket. Events whose resources
    /// are all unknown get no track.
    pub fn recompute_all<E, R>(
        &mut self,
        events: &[E],
        resources: &[R],
        accessors: &Accessors<E, R>,
    ) -> &SlotMap
    where
        E: Scheduled,
    {
        let mut sorted: Vec<&E> = events.iter().collect();
        sort_by_start(&mut sorted);

        let mut slots = SlotMap::new();
        for key in buckets(resources, accessors) {
            let members = project(sorted.iter().copied(), &key, accessors);
            let day_slots = assign_tracks(
                &members,
                &self.options.timezone,
                self.options.window.as_ref(),
            );
            slots.set_bucket(key, day_slots);
        }

        let unplaced_count = unplaced(events, resources, accessors).len();
        tracing::debug!(
            event_count = events.len(),
            resource_count = resources.len(),
            bucket_count = slots.resources().count(),
            unplaced_count,
            "recomputed layout"
        );

        self.slots = Arc::new(slots);
        &self.slots
    }

    /// Overrides the track of one event on one resource and day.
    ///
    /// Missing buckets are created. The value is taken as given: the caller
    /// has already checked for collisions. Re-applying a value that is
    /// already present changes nothing.
    pub fn patch_one(
        &mut self,
        resource: ResourceKey,
        day: DayKey,
        event: EventId,
        track: Track,
    ) -> &SlotMap {
        if self.slots.track(&resource, day, &event) == Some(track) {
            return &self.slots;
        }

        tracing::debug!(%resource, %day, event_id = %event, %track, "patching track");
        Arc::make_mut(&mut self.slots).insert(resource, day, event, track);
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Event, Resource, ResourceRef};
    use crate::types::ResourceId;
    use chrono::{DateTime, FixedOffset, Utc};
    use std::sync::Mutex;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, day, hour, 0, 0)
            .single()
            .expect("valid test timestamp")
    }

    fn rid(s: &str) -> ResourceId {
        ResourceId::new(s).unwrap()
    }

    fn eid(s: &str) -> EventId {
        EventId::new(s).unwrap()
    }

    fn day(s: &str) -> DayKey {
        s.parse().unwrap()
    }

    fn van(s: &str) -> ResourceKey {
        ResourceKey::Resource(rid(s))
    }

    fn resource(id: &str) -> Resource {
        Resource {
            id: rid(id),
            name: Some(format!("Vehicle {id}")),
            color: None,
        }
    }

    fn booking(id: &str, start: DateTime<Utc>, end: DateTime<Utc>, on: ResourceRef) -> Event {
        Event {
            id: eid(id),
            start,
            end,
            resource: on,
            title: None,
        }
    }

    fn utc_store() -> LayoutStore<Utc> {
        LayoutStore::new(LayoutOptions::new(Utc))
    }

    #[test]
    fn test_empty_inputs_give_empty_map() {
        let mut store = utc_store();
        let accessors = Accessors::standard();
        assert!(store.recompute_all(&[], &[], &accessors).is_empty());
        assert!(
            store
                .recompute_all(&[], &[resource("van-1")], &accessors)
                .is_empty()
        );
    }

    #[test]
    fn test_no_resources_lays_out_under_all() {
        let mut store = utc_store();
        let events = vec![
            booking("a", at(1, 9), at(1, 12), ResourceRef::One(rid("van-1"))),
            booking("b", at(1, 10), at(1, 11), ResourceRef::None),
        ];
        let slots = store.recompute_all(&events, &[], &Accessors::standard());

        assert_eq!(slots.resources().collect::<Vec<_>>(), vec![&ResourceKey::All]);
        assert_eq!(slots.track(&ResourceKey::All, day("2025-04-01"), &eid("a")), Some(Track::new(0)));
        assert_eq!(slots.track(&ResourceKey::All, day("2025-04-01"), &eid("b")), Some(Track::new(1)));
    }

    #[test]
    fn test_resources_are_laid_out_independently() {
        let mut store = utc_store();
        let events = vec![
            booking("a1", at(2, 9), at(2, 12), ResourceRef::One(rid("van-a"))),
            booking("b1", at(2, 8), at(2, 12), ResourceRef::One(rid("van-b"))),
            booking("a2", at(2, 10), at(2, 11), ResourceRef::One(rid("van-a"))),
            booking("b2", at(2, 9), at(2, 10), ResourceRef::One(rid("van-b"))),
        ];
        let resources = vec![resource("van-a"), resource("van-b")];
        let slots = store.recompute_all(&events, &resources, &Accessors::standard());
        let d = day("2025-04-02");

        assert_eq!(slots.track(&van("van-a"), d, &eid("a1")), Some(Track::new(0)));
        assert_eq!(slots.track(&van("van-a"), d, &eid("a2")), Some(Track::new(1)));
        assert_eq!(slots.track(&van("van-b"), d, &eid("b1")), Some(Track::new(0)));
        assert_eq!(slots.track(&van("van-b"), d, &eid("b2")), Some(Track::new(1)));
        assert!(slots.collisions().is_empty());
    }

    #[test]
    fn test_multi_resource_event_gets_independent_tracks() {
        let mut store = utc_store();
        let events = vec![
            booking("early", at(3, 8), at(3, 9), ResourceRef::One(rid("van-a"))),
            booking(
                "shared",
                at(3, 10),
                at(3, 11),
                ResourceRef::Many(vec![rid("van-a"), rid("van-b")]),
            ),
        ];
        let resources = vec![resource("van-a"), resource("van-b")];
        let slots = store.recompute_all(&events, &resources, &Accessors::standard());
        let d = day("2025-04-03");

        assert_eq!(slots.track(&van("van-a"), d, &eid("shared")), Some(Track::new(1)));
        assert_eq!(slots.track(&van("van-b"), d, &eid("shared")), Some(Track::new(0)));
    }

    #[test]
    fn test_unknown_resource_gets_no_track() {
        let mut store = utc_store();
        let events = vec![booking("ghost", at(3, 8), at(3, 9), ResourceRef::One(rid("van-z")))];
        let slots = store.recompute_all(&events, &[resource("van-a")], &Accessors::standard());
        assert!(slots.is_empty());
    }

    #[test]
    fn test_recompute_is_deterministic() {
        let events = vec![
            booking("a", at(1, 9), at(4, 9), ResourceRef::One(rid("van-a"))),
            booking("b", at(2, 9), at(2, 10), ResourceRef::One(rid("van-a"))),
            booking("c", at(2, 9), at(3, 10), ResourceRef::One(rid("van-a"))),
        ];
        let resources = vec![resource("van-a")];
        let accessors = Accessors::standard();

        let mut store = utc_store();
        let first = store.recompute_all(&events, &resources, &accessors).clone();
        let second = store.recompute_all(&events, &resources, &accessors).clone();
        assert_eq!(first, second);
    }

    #[test]
    fn test_patch_with_existing_value_is_idempotent() {
        let mut store = utc_store();
        let events = vec![booking("a", at(1, 9), at(1, 10), ResourceRef::None)];
        let before = store
            .recompute_all(&events, &[], &Accessors::standard())
            .clone();
        let snapshot = store.snapshot();

        let after = store.patch_one(ResourceKey::All, day("2025-04-01"), eid("a"), Track::new(0));
        assert_eq!(*after, before);
        assert!(Arc::ptr_eq(&snapshot, &store.snapshot()));
    }

    #[test]
    fn test_resource_named_all_repatches_idempotently() {
        let mut store = utc_store();
        let events = vec![booking("a", at(1, 9), at(1, 10), ResourceRef::One(rid("all")))];
        store.recompute_all(&events, &[resource("all")], &Accessors::standard());
        let before = store.snapshot();

        let key = ResourceKey::parse("all").unwrap();
        assert_eq!(before.track(&key, day("2025-04-01"), &eid("a")), Some(Track::new(0)));

        store.patch_one(key, day("2025-04-01"), eid("a"), Track::new(0));
        assert!(Arc::ptr_eq(&before, &store.snapshot()));

        let json = serde_json::to_string(store.slots()).unwrap();
        assert_eq!(json, r#"{"all":{"2025-04-01":{"a":0}}}"#);
        let parsed: SlotMap = serde_json::from_str(&json).unwrap();
        assert_eq!(&parsed, store.slots());
    }

    #[test]
    fn test_patch_is_taken_on_trust() {
        let mut store = utc_store();
        let events = vec![
            booking("a", at(1, 9), at(1, 10), ResourceRef::One(rid("van-a"))),
            booking("b", at(5, 9), at(5, 10), ResourceRef::One(rid("van-b"))),
        ];
        let resources = vec![resource("van-a"), resource("van-b")];
        store.recompute_all(&events, &resources, &Accessors::standard());

        // Drop "b" onto van-a's day 1, track 0, which "a" already holds.
        let slots = store.patch_one(van("van-a"), day("2025-04-01"), eid("b"), Track::new(0));
        assert_eq!(slots.track(&van("van-a"), day("2025-04-01"), &eid("b")), Some(Track::new(0)));
        assert_eq!(slots.track(&van("van-a"), day("2025-04-01"), &eid("a")), Some(Track::new(0)));
        assert_eq!(slots.collisions().len(), 1);

        // Untouched buckets stay as they were.
        assert_eq!(slots.track(&van("van-b"), day("2025-04-05"), &eid("b")), Some(Track::new(0)));
    }

    #[test]
    fn test_patch_creates_missing_buckets() {
        let mut store = utc_store();
        let slots = store.patch_one(van("van-new"), day("2030-01-01"), eid("x"), Track::new(4));
        assert_eq!(slots.lane_count(&van("van-new"), day("2030-01-01")), 5);
    }

    #[test]
    fn test_snapshot_survives_patch_and_recompute() {
        let mut store = utc_store();
        let events = vec![booking("a", at(1, 9), at(1, 10), ResourceRef::None)];
        store.recompute_all(&events, &[], &Accessors::standard());

        let snapshot = store.snapshot();
        store.patch_one(ResourceKey::All, day("2025-04-01"), eid("a"), Track::new(3));
        assert_eq!(snapshot.track(&ResourceKey::All, day("2025-04-01"), &eid("a")), Some(Track::new(0)));

        store.recompute_all(&[], &[], &Accessors::standard());
        assert!(!snapshot.is_empty());
        assert!(store.slots().is_empty());
    }

    #[test]
    fn test_window_and_time_zone() {
        // 23:00 UTC on the 6th is the 7th at UTC+02:00.
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let window = DateWindow::day(day("2025-04-07").date());
        let mut store = LayoutStore::new(LayoutOptions::new(plus_two).with_window(window));
        let events = vec![
            booking("late", at(6, 23), at(7, 1), ResourceRef::None),
            booking("before", at(6, 8), at(6, 9), ResourceRef::None),
        ];
        let slots = store.recompute_all(&events, &[], &Accessors::standard());

        assert_eq!(slots.track(&ResourceKey::All, day("2025-04-07"), &eid("late")), Some(Track::new(0)));
        assert_eq!(slots.bucket(&ResourceKey::All).map(|b| b.len()), Some(1));
        assert!(!slots.placed_events().contains(&eid("before")));

        store.set_window(None);
        let slots = store.recompute_all(&events, &[], &Accessors::standard());
        assert_eq!(slots.track(&ResourceKey::All, day("2025-04-06"), &eid("before")), Some(Track::new(0)));
    }

    #[test]
    fn test_store_behind_mutex_across_threads() {
        let store = Arc::new(Mutex::new(utc_store()));
        let events = vec![booking("a", at(1, 9), at(1, 10), ResourceRef::None)];

        let worker = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                let mut store = store.lock().unwrap();
                store.recompute_all(&events, &[], &Accessors::standard());
                store.snapshot()
            })
        };
        let snapshot = worker.join().unwrap();
        assert_eq!(snapshot.track(&ResourceKey::All, day("2025-04-01"), &eid("a")), Some(Track::new(0)));
    }
}
