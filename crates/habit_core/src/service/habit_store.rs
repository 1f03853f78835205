//! Habit state owner and command/query surface.
//!
//! # Responsibility
//! - Own the habit collection for one interactive session.
//! - Apply add/toggle/delete commands and persist the full collection after each.
//! - Derive momentum on demand.
//!
//! # Invariants
//! - Ids are unique and strictly increasing in issue order, so a deleted id is
//!   never handed out again.
//! - A failed save never rolls back the in-memory mutation.
//! - Loading never fails: unusable persisted state falls back to the seed habit.

use crate::model::collection::{CodecError, HabitCollection};
use crate::model::habit::{Habit, HabitId, Weekday, WEEK_LEN};
use crate::model::palette::palette_color;
use crate::repo::kv_store::{KeyValueStore, StoreError};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Storage key for the habit blob. Changing it orphans existing user data.
pub const HABITS_STORAGE_KEY: &str = "massive_habits_final";
pub const SEED_HABIT_ID: HabitId = 1;
pub const SEED_HABIT_NAME: &str = "Deep Work Architecture";

/// Time source for new habit ids.
pub trait Clock {
    fn now_epoch_ms(&self) -> i64;
}

/// Wall clock in Unix epoch milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }
}

/// How the in-memory collection was initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Decoded from the persisted blob.
    Persisted,
    /// Nothing persisted yet; seed habit created.
    Seeded,
    /// Persisted blob was malformed; seed habit created.
    RecoveredFromCorrupt,
    /// Adapter read failed; seed habit created.
    RecoveredFromReadError,
}

impl LoadSource {
    /// Whether persisted data existed but could not be used.
    pub fn is_recovery(self) -> bool {
        matches!(self, Self::RecoveredFromCorrupt | Self::RecoveredFromReadError)
    }
}

/// Contract violations rejected by store commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HabitStoreError {
    InvalidDayIndex { index: usize },
}

impl Display for HabitStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDayIndex { index } => write!(
                f,
                "day index {index} is out of range; expected 0..={}",
                WEEK_LEN - 1
            ),
        }
    }
}

impl Error for HabitStoreError {}

/// Save failure reported alongside an applied command.
#[derive(Debug)]
pub enum PersistError {
    Encode(CodecError),
    Write(StoreError),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode habits: {err}"),
            Self::Write(err) => write!(f, "failed to save habits: {err}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            Self::Write(err) => Some(err),
        }
    }
}

impl From<CodecError> for PersistError {
    fn from(value: CodecError) -> Self {
        Self::Encode(value)
    }
}

impl From<StoreError> for PersistError {
    fn from(value: StoreError) -> Self {
        Self::Write(value)
    }
}

/// Result of an applied command.
///
/// `save_warning` is set when the mutation stands in memory but could not be
/// persisted. With a deferred adapter such as `QueuedKvStore` it only reports
/// enqueue failures; check `QueuedKvStore::flush` for the write itself.
#[derive(Debug)]
pub struct CommandOutcome<T> {
    pub value: T,
    pub save_warning: Option<PersistError>,
}

impl<T> CommandOutcome<T> {
    fn unsaved(value: T) -> Self {
        Self {
            value,
            save_warning: None,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.save_warning.is_none()
    }
}

/// Owner of the habit collection for one session.
pub struct HabitStore<S: KeyValueStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
    habits: HabitCollection,
    last_issued_id: HabitId,
    load_source: LoadSource,
}

impl<S: KeyValueStore> HabitStore<S> {
    /// Loads habits from `store` using the wall clock for new ids.
    pub fn load(store: S) -> Self {
        Self::load_with_clock(store, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> HabitStore<S, C> {
    /// Loads habits from `store`, seeding the default habit when nothing
    /// usable is persisted.
    pub fn load_with_clock(store: S, clock: C) -> Self {
        let (habits, load_source) = match store.read(HABITS_STORAGE_KEY) {
            Ok(Some(blob)) => match HabitCollection::decode(&blob) {
                Ok(habits) => (habits, LoadSource::Persisted),
                Err(err) => {
                    warn!(
                        "event=habits_load module=service status=recovered error_code=blob_corrupt bytes={} error={}",
                        blob.len(),
                        err
                    );
                    (seed_collection(), LoadSource::RecoveredFromCorrupt)
                }
            },
            Ok(None) => (seed_collection(), LoadSource::Seeded),
            Err(err) => {
                warn!(
                    "event=habits_load module=service status=recovered error_code=read_failed error={}",
                    err
                );
                (seed_collection(), LoadSource::RecoveredFromReadError)
            }
        };

        info!(
            "event=habits_load module=service status=ok source={:?} count={}",
            load_source,
            habits.len()
        );

        Self {
            last_issued_id: habits.max_id().unwrap_or(0),
            store,
            clock,
            habits,
            load_source,
        }
    }

    pub fn load_source(&self) -> LoadSource {
        self.load_source
    }

    /// Current habits in insertion order.
    pub fn list_habits(&self) -> &[Habit] {
        self.habits.as_slice()
    }

    pub fn get(&self, id: HabitId) -> Option<&Habit> {
        self.habits.get(id)
    }

    pub fn len(&self) -> usize {
        self.habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    /// Percentage of completed day slots across all habits, rounded half up.
    ///
    /// Returns 0 for an empty collection.
    pub fn momentum(&self) -> u8 {
        let total = self.habits.len() * WEEK_LEN;
        if total == 0 {
            return 0;
        }
        let completed = self.habits.completed_slots();
        // round(100 * c / t) == floor((200 * c + t) / (2 * t)) for half-up rounding.
        let percent = (200 * completed + total) / (2 * total);
        u8::try_from(percent.min(100)).unwrap_or(100)
    }

    /// Appends a habit named `name` (trimmed).
    ///
    /// Blank names are ignored: nothing changes and nothing is saved.
    /// The same holds when the id space above the highest issued id is
    /// exhausted. Returns the new id, or `None` for the ignored cases.
    pub fn add_habit(&mut self, name: &str) -> CommandOutcome<Option<HabitId>> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            debug!("event=habit_add module=service status=skipped reason=blank_name");
            return CommandOutcome::unsaved(None);
        }

        let Some(id) = self.next_id() else {
            warn!(
                "event=habit_add module=service status=error error_code=id_exhausted last_issued_id={}",
                self.last_issued_id
            );
            return CommandOutcome::unsaved(None);
        };
        let color = palette_color(self.habits.len());
        if !self.habits.push(Habit::new(id, trimmed, color)) {
            warn!(
                "event=habit_add module=service status=error error_code=id_collision habit_id={}",
                id
            );
            return CommandOutcome::unsaved(None);
        }
        info!(
            "event=habit_add module=service status=ok habit_id={} count={}",
            id,
            self.habits.len()
        );

        self.persist(Some(id))
    }

    /// Flips one day slot of a habit.
    ///
    /// # Errors
    /// - `InvalidDayIndex` when `day_index` is outside `0..7`; nothing changes.
    ///
    /// Unknown ids are a no-op and yield `value == None`.
    pub fn toggle_habit(
        &mut self,
        id: HabitId,
        day_index: usize,
    ) -> Result<CommandOutcome<Option<bool>>, HabitStoreError> {
        let day = Weekday::from_index(day_index)
            .ok_or(HabitStoreError::InvalidDayIndex { index: day_index })?;
        Ok(self.toggle_day(id, day))
    }

    /// Typed variant of `toggle_habit`.
    pub fn toggle_day(&mut self, id: HabitId, day: Weekday) -> CommandOutcome<Option<bool>> {
        let toggled = self.habits.get_mut(id).map(|habit| habit.toggle(day));
        match toggled {
            Some(value) => info!(
                "event=habit_toggle module=service status=ok habit_id={} day={} completed={}",
                id,
                day.index(),
                value
            ),
            None => debug!(
                "event=habit_toggle module=service status=not_found habit_id={}",
                id
            ),
        }
        self.persist(toggled)
    }

    /// Removes a habit. Returns whether one was removed.
    pub fn delete_habit(&mut self, id: HabitId) -> CommandOutcome<bool> {
        let removed = self.habits.remove(id).is_some();
        info!(
            "event=habit_delete module=service status={} habit_id={} count={}",
            if removed { "ok" } else { "not_found" },
            id,
            self.habits.len()
        );
        self.persist(removed)
    }

    /// Serializes the whole collection and writes it under the storage key.
    ///
    /// Success means the adapter accepted the write. For `QueuedKvStore` that
    /// is only the enqueue; background write failures surface from
    /// `QueuedKvStore::flush`, never from here or from `save_warning`.
    pub fn save(&self) -> Result<(), PersistError> {
        let blob = self.habits.encode()?;
        self.store.write(HABITS_STORAGE_KEY, &blob)?;
        debug!(
            "event=habits_save module=service status=ok count={} bytes={}",
            self.habits.len(),
            blob.len()
        );
        Ok(())
    }

    fn persist<T>(&self, value: T) -> CommandOutcome<T> {
        let save_warning = match self.save() {
            Ok(()) => None,
            Err(err) => {
                warn!(
                    "event=habits_save module=service status=error count={} error={}",
                    self.habits.len(),
                    err
                );
                Some(err)
            }
        };
        CommandOutcome {
            value,
            save_warning,
        }
    }

    /// Next unused id, or `None` once `last_issued_id` is `HabitId::MAX`.
    fn next_id(&mut self) -> Option<HabitId> {
        let floor = self.last_issued_id.checked_add(1)?;
        let id = self.clock.now_epoch_ms().max(floor);
        self.last_issued_id = id;
        Some(id)
    }
}

fn seed_collection() -> HabitCollection {
    HabitCollection::from_habits(vec![Habit::new(
        SEED_HABIT_ID,
        SEED_HABIT_NAME,
        palette_color(0),
    )])
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{Clock, HabitStore, SEED_HABIT_ID};
    use crate::repo::kv_store::MemoryKvStore;
    use std::cell::Cell;

    struct FrozenClock(Cell<i64>);

    impl Clock for FrozenClock {
        fn now_epoch_ms(&self) -> i64 {
            self.0.get()
        }
    }

    #[test]
    fn ids_stay_unique_when_clock_does_not_advance() {
        let clock = FrozenClock(Cell::new(1_700_000_000_000));
        let mut store = HabitStore::load_with_clock(MemoryKvStore::new(), clock);

        let first = store.add_habit("a").value.unwrap();
        let second = store.add_habit("b").value.unwrap();
        assert_eq!(first, 1_700_000_000_000);
        assert_eq!(second, first + 1);
    }

    #[test]
    fn ids_are_not_reused_after_deleting_newest() {
        let clock = FrozenClock(Cell::new(0));
        let mut store = HabitStore::load_with_clock(MemoryKvStore::new(), clock);

        let added = store.add_habit("a").value.unwrap();
        assert_eq!(added, SEED_HABIT_ID + 1);
        assert!(store.delete_habit(added).value);

        let next = store.add_habit("b").value.unwrap();
        assert!(next > added);
    }

    #[test]
    fn clock_behind_persisted_ids_never_collides() {
        let clock = FrozenClock(Cell::new(5));
        let mut store = HabitStore::load_with_clock(MemoryKvStore::new(), clock);
        store.add_habit("a");
        store.clock.0.set(1);
        let id = store.add_habit("b").value.unwrap();
        assert_eq!(id, 6);
    }

    #[test]
    fn next_id_is_none_once_id_space_is_exhausted() {
        let clock = FrozenClock(Cell::new(i64::MAX));
        let mut store = HabitStore::load_with_clock(MemoryKvStore::new(), clock);

        assert_eq!(store.next_id(), Some(i64::MAX));
        assert_eq!(store.next_id(), None);
        assert_eq!(store.last_issued_id, i64::MAX);
    }
}
