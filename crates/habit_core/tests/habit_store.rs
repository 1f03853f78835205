use habit_core::{
    HabitCollection, HabitStore, HabitStoreError, KeyValueStore, LoadSource, MemoryKvStore,
    PersistError, StoreError, StoreResult, HABITS_STORAGE_KEY, PALETTE, SEED_HABIT_ID,
    SEED_HABIT_NAME,
};
use std::cell::Cell;
use std::collections::HashSet;

fn empty_store() -> HabitStore<MemoryKvStore> {
    HabitStore::load(MemoryKvStore::with_entry(HABITS_STORAGE_KEY, "[]"))
}

fn persisted(store: &impl KeyValueStore) -> HabitCollection {
    let blob = store.read(HABITS_STORAGE_KEY).unwrap().expect("blob saved");
    HabitCollection::decode(&blob).unwrap()
}

#[test]
fn load_without_persisted_state_seeds_default_habit() {
    let store = HabitStore::load(MemoryKvStore::new());

    assert_eq!(store.load_source(), LoadSource::Seeded);
    let habits = store.list_habits();
    assert_eq!(habits.len(), 1);
    assert_eq!(habits[0].id, SEED_HABIT_ID);
    assert_eq!(habits[0].name, SEED_HABIT_NAME);
    assert_eq!(habits[0].completed, [false; 7]);
    assert_eq!(habits[0].color, PALETTE[0]);
}

#[test]
fn load_with_corrupt_blob_falls_back_to_seed() {
    let backing = MemoryKvStore::with_entry(HABITS_STORAGE_KEY, "{not-json");
    let store = HabitStore::load(&backing);

    assert_eq!(store.load_source(), LoadSource::RecoveredFromCorrupt);
    assert!(store.load_source().is_recovery());
    assert_eq!(store.len(), 1);
    assert_eq!(store.list_habits()[0].name, "Deep Work Architecture");
    assert_eq!(backing.write_count(), 0, "load must not overwrite stored data");
}

struct UnreadableStore {
    writes: Cell<usize>,
}

impl KeyValueStore for UnreadableStore {
    fn read(&self, _key: &str) -> StoreResult<Option<String>> {
        Err(StoreError::Unavailable("storage disabled".to_string()))
    }

    fn write(&self, _key: &str, _value: &str) -> StoreResult<()> {
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

#[test]
fn load_with_read_error_falls_back_to_seed_without_writing() {
    let backing = UnreadableStore {
        writes: Cell::new(0),
    };
    let store = HabitStore::load(&backing);

    assert_eq!(store.load_source(), LoadSource::RecoveredFromReadError);
    assert!(store.load_source().is_recovery());
    let habits = store.list_habits();
    assert_eq!(habits.len(), 1);
    assert_eq!(habits[0].id, SEED_HABIT_ID);
    assert_eq!(habits[0].name, SEED_HABIT_NAME);
    assert_eq!(backing.writes.get(), 0);
}

#[test]
fn load_restores_previous_session() {
    let backing = MemoryKvStore::new();
    {
        let mut store = HabitStore::load(&backing);
        let id = store.add_habit("Read").value.unwrap();
        store.toggle_habit(id, 4).unwrap();
    }

    let reloaded = HabitStore::load(&backing);
    assert_eq!(reloaded.load_source(), LoadSource::Persisted);
    assert_eq!(reloaded.len(), 2);
    let read = &reloaded.list_habits()[1];
    assert_eq!(read.name, "Read");
    assert!(read.completed[4]);
}

#[test]
fn add_to_empty_store_appends_with_first_palette_color() {
    let mut store = empty_store();

    let outcome = store.add_habit("  Read  ");
    assert!(outcome.is_persisted());
    let id = outcome.value.expect("habit added");

    let habits = store.list_habits();
    assert_eq!(habits.len(), 1);
    assert_eq!(habits[0].id, id);
    assert_eq!(habits[0].name, "Read");
    assert_eq!(habits[0].completed, [false; 7]);
    assert_eq!(habits[0].color, PALETTE[0]);
    assert_eq!(store.momentum(), 0);
}

#[test]
fn add_cycles_palette_by_pre_insertion_count() {
    let mut store = empty_store();
    for index in 0..6 {
        store.add_habit(&format!("habit {index}"));
    }

    let colors = store
        .list_habits()
        .iter()
        .map(|habit| habit.color.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        colors,
        vec![PALETTE[0], PALETTE[1], PALETTE[2], PALETTE[3], PALETTE[4], PALETTE[0]]
    );
}

#[test]
fn add_blank_name_is_noop_without_save() {
    let backing = MemoryKvStore::new();
    let mut store = HabitStore::load(&backing);
    let before = store.list_habits().to_vec();

    assert_eq!(store.add_habit("").value, None);
    assert_eq!(store.add_habit("   ").value, None);
    assert_eq!(store.add_habit("\t\n").value, None);

    assert_eq!(store.list_habits(), before.as_slice());
    assert_eq!(backing.write_count(), 0);
}

#[test]
fn add_after_max_persisted_id_is_rejected_without_save() {
    let blob = r##"[{"id":9223372036854775807,"name":"Read","completed":[false,false,false,false,false,false,false],"color":"#6366f1"}]"##;
    let backing = MemoryKvStore::with_entry(HABITS_STORAGE_KEY, blob);
    let mut store = HabitStore::load(&backing);
    assert_eq!(store.load_source(), LoadSource::Persisted);

    let outcome = store.add_habit("Write");

    assert_eq!(outcome.value, None);
    assert!(outcome.save_warning.is_none());
    assert_eq!(store.len(), 1);
    assert_eq!(store.list_habits()[0].name, "Read");
    assert_eq!(backing.write_count(), 0);
}

#[test]
fn toggle_twice_restores_slot() {
    let mut store = empty_store();
    let id = store.add_habit("Read").value.unwrap();

    let first = store.toggle_habit(id, 2).unwrap();
    assert_eq!(first.value, Some(true));
    assert!(store.get(id).unwrap().completed[2]);

    let second = store.toggle_habit(id, 2).unwrap();
    assert_eq!(second.value, Some(false));
    assert_eq!(store.get(id).unwrap().completed, [false; 7]);
}

#[test]
fn toggle_touches_only_target_habit() {
    let mut store = empty_store();
    let a = store.add_habit("a").value.unwrap();
    let b = store.add_habit("b").value.unwrap();

    store.toggle_habit(a, 0).unwrap();

    assert_eq!(store.get(b).unwrap().completed, [false; 7]);
    assert_eq!(store.get(a).unwrap().completed_count(), 1);
}

#[test]
fn toggle_out_of_range_day_is_rejected_without_change() {
    let backing = MemoryKvStore::new();
    let mut store = HabitStore::load(&backing);
    let before = store.list_habits().to_vec();

    let err = store.toggle_habit(SEED_HABIT_ID, 9).unwrap_err();
    assert_eq!(err, HabitStoreError::InvalidDayIndex { index: 9 });
    assert!(err.to_string().contains("out of range"));
    assert!(store.toggle_habit(SEED_HABIT_ID, 7).is_err());

    assert_eq!(store.list_habits(), before.as_slice());
    assert_eq!(backing.write_count(), 0);
}

#[test]
fn toggle_unknown_id_is_noop() {
    let mut store = HabitStore::load(MemoryKvStore::new());
    let before = store.list_habits().to_vec();

    let outcome = store.toggle_habit(404, 3).unwrap();
    assert_eq!(outcome.value, None);
    assert_eq!(store.list_habits(), before.as_slice());
}

#[test]
fn delete_removes_exactly_one_and_is_idempotent() {
    let mut store = empty_store();
    let a = store.add_habit("a").value.unwrap();
    let b = store.add_habit("b").value.unwrap();
    let c = store.add_habit("c").value.unwrap();

    assert!(store.delete_habit(b).value);
    assert!(!store.delete_habit(b).value);
    assert!(!store.delete_habit(12345).value);

    let ids = store.list_habits().iter().map(|h| h.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![a, c]);
}

#[test]
fn momentum_matches_documented_scenarios() {
    let mut store = empty_store();
    assert_eq!(store.momentum(), 0);

    let first = store.add_habit("first").value.unwrap();
    store.toggle_habit(first, 0).unwrap();
    assert_eq!(store.momentum(), 14);

    for day in 1..7 {
        store.toggle_habit(first, day).unwrap();
    }
    store.add_habit("second");
    assert_eq!(store.momentum(), 50);

    store.delete_habit(first);
    assert_eq!(store.momentum(), 0);
}

#[test]
fn momentum_rounds_to_nearest_with_halves_up() {
    let mut store = empty_store();
    for index in 0..8 {
        store.add_habit(&format!("habit {index}"));
    }
    let first = store.list_habits()[0].id;

    // 1 of 56 slots is 1.79%.
    store.toggle_habit(first, 0).unwrap();
    assert_eq!(store.momentum(), 2);

    // 7 of 56 slots is exactly 12.5%.
    for day in 1..7 {
        store.toggle_habit(first, day).unwrap();
    }
    assert_eq!(store.momentum(), 13);
}

#[test]
fn momentum_is_zero_after_deleting_everything() {
    let mut store = HabitStore::load(MemoryKvStore::new());
    store.delete_habit(SEED_HABIT_ID);
    assert!(store.is_empty());
    assert_eq!(store.momentum(), 0);
}

#[test]
fn ids_stay_unique_across_mixed_commands() {
    let mut store = HabitStore::load(MemoryKvStore::new());
    for round in 0..20 {
        let id = store.add_habit(&format!("habit {round}")).value.unwrap();
        store.toggle_habit(id, round % 7).unwrap();
        if round % 3 == 0 {
            store.delete_habit(id);
        }
    }

    let ids = store.list_habits().iter().map(|h| h.id).collect::<HashSet<_>>();
    assert_eq!(ids.len(), store.len());
    assert!(store.list_habits().iter().all(|h| h.completed.len() == 7));
    assert!(store.momentum() <= 100);
}

#[test]
fn every_mutation_persists_full_collection() {
    let backing = MemoryKvStore::new();
    let mut store = HabitStore::load(&backing);

    let id = store.add_habit("Read").value.unwrap();
    assert_eq!(persisted(&backing).len(), 2);

    store.toggle_habit(id, 6).unwrap();
    assert!(persisted(&backing).get(id).unwrap().completed[6]);

    store.delete_habit(SEED_HABIT_ID);
    let saved = persisted(&backing);
    assert_eq!(saved.len(), 1);
    assert_eq!(saved.as_slice(), store.list_habits());
    assert_eq!(backing.write_count(), 3);
}

#[test]
fn write_failure_keeps_mutation_and_reports_warning() {
    let backing = MemoryKvStore::new();
    let mut store = HabitStore::load(&backing);
    backing.set_fail_writes(true);

    let outcome = store.add_habit("Read");
    let id = outcome.value.expect("mutation applies despite save failure");
    assert!(matches!(outcome.save_warning, Some(PersistError::Write(_))));
    assert_eq!(store.len(), 2);
    assert!(store.get(id).is_some());

    backing.set_fail_writes(false);
    let outcome = store.toggle_habit(id, 1).unwrap();
    assert!(outcome.is_persisted());
    assert_eq!(persisted(&backing).len(), 2);
}
