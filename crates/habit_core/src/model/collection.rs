//! Ordered habit collection and its persisted blob codec.
//!
//! # Responsibility
//! - Keep habits in insertion order with unique ids.
//! - Encode/decode the whole collection as one JSON blob.
//!
//! # Invariants
//! - No two habits share an id.
//! - `decode(encode(c)) == c` for every collection.
//! - Decoding rejects blobs that would break model invariants instead of
//!   masking them.

use super::habit::{Habit, HabitId};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised while decoding a persisted blob.
#[derive(Debug)]
pub enum CodecError {
    /// Blob is not valid JSON or violates the per-habit shape.
    Json(serde_json::Error),
    /// Blob lists the same id more than once.
    DuplicateId(HabitId),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "malformed habit blob: {err}"),
            Self::DuplicateId(id) => write!(f, "duplicate habit id in blob: {id}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::DuplicateId(_) => None,
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Insertion-ordered habits with unique ids.
///
/// Encoded as a JSON array of habits; only `decode` and `from_habits` build
/// one from outside data, so the id check cannot be skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitCollection {
    habits: Vec<Habit>,
}

impl HabitCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection, rejecting duplicate ids.
    pub fn from_habits(habits: Vec<Habit>) -> CodecResult<Self> {
        let mut seen = HashSet::with_capacity(habits.len());
        for habit in &habits {
            if !seen.insert(habit.id) {
                return Err(CodecError::DuplicateId(habit.id));
            }
        }
        Ok(Self { habits })
    }

    /// Decodes a persisted blob.
    pub fn decode(blob: &str) -> CodecResult<Self> {
        let habits: Vec<Habit> = serde_json::from_str(blob)?;
        Self::from_habits(habits)
    }

    /// Encodes the whole collection as one blob.
    pub fn encode(&self) -> CodecResult<String> {
        Ok(serde_json::to_string(&self.habits)?)
    }

    pub fn as_slice(&self) -> &[Habit] {
        &self.habits
    }

    pub fn len(&self) -> usize {
        self.habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    pub fn contains(&self, id: HabitId) -> bool {
        self.habits.iter().any(|habit| habit.id == id)
    }

    pub fn get(&self, id: HabitId) -> Option<&Habit> {
        self.habits.iter().find(|habit| habit.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: HabitId) -> Option<&mut Habit> {
        self.habits.iter_mut().find(|habit| habit.id == id)
    }

    /// Highest id present, if any.
    pub fn max_id(&self) -> Option<HabitId> {
        self.habits.iter().map(|habit| habit.id).max()
    }

    /// Appends a habit. Returns `false` without inserting on id collision.
    #[must_use]
    pub(crate) fn push(&mut self, habit: Habit) -> bool {
        if self.contains(habit.id) {
            return false;
        }
        self.habits.push(habit);
        true
    }

    /// Removes a habit by id, preserving the order of the rest.
    pub(crate) fn remove(&mut self, id: HabitId) -> Option<Habit> {
        let index = self.habits.iter().position(|habit| habit.id == id)?;
        Some(self.habits.remove(index))
    }

    /// Total completed slots across all habits.
    pub fn completed_slots(&self) -> usize {
        self.habits.iter().map(Habit::completed_count).sum()
    }
}
