//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate model mutations and persistence into use-case level APIs.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod habit_store;
