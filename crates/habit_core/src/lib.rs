//! Core domain logic for the habit tracker.
//! This crate is the single source of truth for habit invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::collection::{CodecError, CodecResult, HabitCollection};
pub use model::habit::{
    Habit, HabitId, HabitValidationError, WeekCompletion, Weekday, WEEK_LEN,
};
pub use model::palette::{palette_color, PALETTE};
pub use repo::kv_store::{KeyValueStore, MemoryKvStore, SqliteKvStore, StoreError, StoreResult};
pub use repo::queued_store::QueuedKvStore;
pub use service::habit_store::{
    Clock, CommandOutcome, HabitStore, HabitStoreError, LoadSource, PersistError, SystemClock,
    HABITS_STORAGE_KEY, SEED_HABIT_ID, SEED_HABIT_NAME,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
