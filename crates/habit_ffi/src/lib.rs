//! Flutter-facing bindings for the habit tracker core.

pub mod api;
