//! Habit domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by habit business logic.
//! - Define the persisted blob shape for the whole habit collection.
//!
//! # Invariants
//! - Every habit is identified by a stable `HabitId` that is never reused.
//! - Weekly completion is always exactly seven slots (Monday..Sunday).

pub mod collection;
pub mod habit;
pub mod palette;
