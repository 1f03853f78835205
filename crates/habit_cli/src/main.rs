//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `habit_core` linkage.
//! - Run a short in-memory session so output stays deterministic apart from ids.

use habit_core::{HabitStore, MemoryKvStore, Weekday};

fn main() {
    println!("habit_core ping={}", habit_core::ping());
    println!("habit_core version={}", habit_core::core_version());

    let mut store = HabitStore::load(MemoryKvStore::new());
    println!("load source={:?}", store.load_source());

    if let Some(id) = store.add_habit("Read 20 pages").value {
        for day in [Weekday::Monday, Weekday::Tuesday, Weekday::Wednesday] {
            store.toggle_day(id, day);
        }
    }

    for habit in store.list_habits() {
        let week = Weekday::ALL
            .iter()
            .map(|day| {
                if habit.is_completed(*day) {
                    day.short_label()
                } else {
                    "."
                }
            })
            .collect::<String>();
        println!("habit id={} color={} week={} name={}", habit.id, habit.color, week, habit.name);
    }
    println!("momentum={}%", store.momentum());
}
