//! FFI use-case API for the Flutter habit widget.
//!
//! # Responsibility
//! - Expose stable, use-case-level habit functions to Dart via FRB.
//! - Map core outcomes into flat response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Load-modify-save cycles are serialized per process so a later state is
//!   never overwritten by an earlier one.
//! - The UI re-queries `habits_snapshot` after every command.

use habit_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CommandOutcome, Habit, HabitStore, SqliteKvStore, StoreError,
};
use log::warn;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

const HABIT_DB_FILE_NAME: &str = "habit_tracker.sqlite3";
const HABIT_DB_PATH_ENV: &str = "HABIT_TRACKER_DB_PATH";
static HABIT_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static STORE_LOCK: Mutex<()> = Mutex::new(());

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One habit card as rendered by the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitItem {
    pub id: i64,
    pub name: String,
    /// Seven slots, Monday first.
    pub completed: Vec<bool>,
    pub color: String,
    pub completed_count: u32,
}

/// Full queryable state after load or a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitSnapshot {
    pub items: Vec<HabitItem>,
    /// Aggregate completion percentage in `0..=100`.
    pub momentum: u8,
    /// True when stored data was unreadable and the seed habit was used.
    pub recovered: bool,
    pub message: String,
}

/// Result envelope for habit commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitActionResponse {
    /// Whether the command was accepted (no-ops count as accepted).
    pub ok: bool,
    /// Habit the command created or touched, when any.
    pub habit_id: Option<i64>,
    /// Non-fatal persistence warning; the change still applies in memory.
    pub warning: Option<String>,
    pub message: String,
}

impl HabitActionResponse {
    fn accepted<T>(
        message: impl Into<String>,
        habit_id: Option<i64>,
        outcome: &CommandOutcome<T>,
    ) -> Self {
        Self {
            ok: true,
            habit_id,
            warning: outcome.save_warning.as_ref().map(ToString::to_string),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            habit_id: None,
            warning: None,
            message: message.into(),
        }
    }
}

/// Returns current habits and momentum.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; open failures yield an empty snapshot with a message.
#[flutter_rust_bridge::frb(sync)]
pub fn habits_snapshot() -> HabitSnapshot {
    match with_habit_store(|store| HabitSnapshot {
        items: store.list_habits().iter().map(to_habit_item).collect(),
        momentum: store.momentum(),
        recovered: store.load_source().is_recovery(),
        message: format!("{} habit(s).", store.len()),
    }) {
        Ok(snapshot) => snapshot,
        Err(err) => HabitSnapshot {
            items: Vec::new(),
            momentum: 0,
            recovered: false,
            message: format!("habits_snapshot failed: {err}"),
        },
    }
}

/// Adds a habit. Blank names are accepted as a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn habit_add(name: String) -> HabitActionResponse {
    match with_habit_store(|store| store.add_habit(&name)) {
        Ok(outcome) => match outcome.value {
            Some(id) => HabitActionResponse::accepted("Habit added.", Some(id), &outcome),
            None if name.trim().is_empty() => {
                HabitActionResponse::accepted("Blank name ignored.", None, &outcome)
            }
            None => HabitActionResponse::failure("habit_add rejected: no habit ids left"),
        },
        Err(err) => HabitActionResponse::failure(format!("habit_add failed: {err}")),
    }
}

/// Flips one day slot. `day_index` must be in `0..=6`.
#[flutter_rust_bridge::frb(sync)]
pub fn habit_toggle(id: i64, day_index: u32) -> HabitActionResponse {
    let result = with_habit_store(|store| {
        let day_index = usize::try_from(day_index).unwrap_or(usize::MAX);
        store.toggle_habit(id, day_index)
    });
    match result {
        Ok(Ok(outcome)) => match outcome.value {
            Some(_) => HabitActionResponse::accepted("Habit toggled.", Some(id), &outcome),
            None => HabitActionResponse::accepted("Habit not found.", None, &outcome),
        },
        Ok(Err(err)) => HabitActionResponse::failure(format!("habit_toggle rejected: {err}")),
        Err(err) => HabitActionResponse::failure(format!("habit_toggle failed: {err}")),
    }
}

/// Deletes a habit. Unknown ids are accepted as a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn habit_delete(id: i64) -> HabitActionResponse {
    match with_habit_store(|store| store.delete_habit(id)) {
        Ok(outcome) if outcome.value => {
            HabitActionResponse::accepted("Habit deleted.", Some(id), &outcome)
        }
        Ok(outcome) => HabitActionResponse::accepted("Habit not found.", None, &outcome),
        Err(err) => HabitActionResponse::failure(format!("habit_delete failed: {err}")),
    }
}

fn resolve_habit_db_path() -> PathBuf {
    HABIT_DB_PATH
        .get_or_init(|| db_path_from_env(std::env::var(HABIT_DB_PATH_ENV).ok()))
        .clone()
}

fn db_path_from_env(raw: Option<String>) -> PathBuf {
    raw.as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join(HABIT_DB_FILE_NAME))
}

fn with_habit_store<R>(f: impl FnOnce(&mut HabitStore<SqliteKvStore>) -> R) -> Result<R, String> {
    let _guard = STORE_LOCK.lock().unwrap_or_else(|poisoned| {
        warn!("event=ffi_store_lock module=ffi status=recovered error_code=lock_poisoned");
        poisoned.into_inner()
    });
    let kv = SqliteKvStore::open(resolve_habit_db_path()).map_err(|err| match err {
        StoreError::Db(db_err) if db_err.is_schema_too_new() => {
            format!("habit DB was written by a newer app version: {db_err}")
        }
        other => format!("habit DB open failed: {other}"),
    })?;
    let mut store = HabitStore::load(kv);
    Ok(f(&mut store))
}

fn to_habit_item(habit: &Habit) -> HabitItem {
    HabitItem {
        id: habit.id,
        name: habit.name.clone(),
        completed: habit.completed.to_vec(),
        color: habit.color.clone(),
        completed_count: u32::try_from(habit.completed_count()).unwrap_or(u32::MAX),
    }
}
