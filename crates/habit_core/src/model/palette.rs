//! Fixed color palette assigned round-robin to new habits.

/// Color tokens in assignment order.
pub const PALETTE: [&str; 5] = ["#6366f1", "#10b981", "#f59e0b", "#ec4899", "#06b6d4"];

/// Returns the palette token for a creation position.
///
/// Callers pass the habit count *before* insertion.
pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}
