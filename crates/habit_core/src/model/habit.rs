//! Habit domain model.
//!
//! # Responsibility
//! - Define the canonical habit record and its weekly completion slots.
//! - Provide weekday indexing shared by store commands and UI projections.
//!
//! # Invariants
//! - `id` is stable and never reused for another habit.
//! - `name` is non-empty after trimming.
//! - `completed` always holds exactly `WEEK_LEN` slots.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier for a habit.
///
/// Fresh ids are derived from epoch milliseconds, so persisted blobs written
/// by older builds keep their numeric identity.
pub type HabitId = i64;

/// Number of completion slots per habit.
pub const WEEK_LEN: usize = 7;

/// Weekly completion record, Monday at index 0.
pub type WeekCompletion = [bool; WEEK_LEN];

/// Day position inside the tracked week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// All days in slot order.
    pub const ALL: [Weekday; WEEK_LEN] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Maps a slot index to a day. Returns `None` outside `0..WEEK_LEN`.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Slot index inside `WeekCompletion`.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }

    /// Single-letter label used by compact week grids.
    pub fn short_label(self) -> &'static str {
        match self {
            Self::Monday => "M",
            Self::Tuesday | Self::Thursday => "T",
            Self::Wednesday => "W",
            Self::Friday => "F",
            Self::Saturday | Self::Sunday => "S",
        }
    }
}

/// Validation errors for habit records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HabitValidationError {
    BlankName { id: HabitId },
}

impl Display for HabitValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName { id } => write!(f, "habit {id} has a blank name"),
        }
    }
}

impl Error for HabitValidationError {}

/// Canonical habit record.
///
/// Serialized field names are part of the persisted blob format and must not
/// change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "HabitRecord")]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    /// Completion per weekday, Monday..Sunday.
    pub completed: WeekCompletion,
    /// Palette token assigned at creation.
    pub color: String,
}

/// Unvalidated wire shape; `Habit` deserialization goes through `validate()`.
#[derive(Deserialize)]
struct HabitRecord {
    id: HabitId,
    name: String,
    completed: WeekCompletion,
    color: String,
}

impl TryFrom<HabitRecord> for Habit {
    type Error = HabitValidationError;

    fn try_from(value: HabitRecord) -> Result<Self, Self::Error> {
        let habit = Self {
            id: value.id,
            name: value.name,
            completed: value.completed,
            color: value.color,
        };
        habit.validate()?;
        Ok(habit)
    }
}

impl Habit {
    /// Creates a habit with an empty week.
    pub fn new(id: HabitId, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            completed: [false; WEEK_LEN],
            color: color.into(),
        }
    }

    /// Checks record invariants not expressible in the type.
    pub fn validate(&self) -> Result<(), HabitValidationError> {
        if self.name.trim().is_empty() {
            return Err(HabitValidationError::BlankName { id: self.id });
        }
        Ok(())
    }

    pub fn is_completed(&self, day: Weekday) -> bool {
        self.completed[day.index()]
    }

    /// Number of completed slots this week.
    pub fn completed_count(&self) -> usize {
        self.completed.iter().filter(|done| **done).count()
    }

    /// Flips one slot and returns its new value.
    pub(crate) fn toggle(&mut self, day: Weekday) -> bool {
        let slot = &mut self.completed[day.index()];
        *slot = !*slot;
        *slot
    }
}
