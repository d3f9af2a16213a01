//! Constants for board sizes, SGF coordinates and default header properties.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size used when a record carries no `SZ` property.
pub const DEFAULT_BOARD_SIZE: usize = 19;

/// Smallest accepted `SZ` value.
pub const MIN_BOARD_SIZE: usize = 1;

/// Largest accepted `SZ` value.
pub const MAX_BOARD_SIZE: usize = 25;

// =============================================================================
// SGF Coordinates
// =============================================================================

/// Letters used for SGF coordinates, in index order: `a`..`z` then `A`..`Z`.
pub const SGF_ALPHABET: &[u8; 52] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Largest coordinate that has an SGF-letter form.
pub const MAX_SGF_COORD: i32 = 51;

/// Longest treepath the parser will expand, counting repeated indices.
pub const MAX_TREEPATH_LEN: usize = 1 << 16;

// =============================================================================
// SGF Header
// =============================================================================

/// Header properties every new tree root starts with.
pub const DEFAULT_HEADER: [(&str, &str); 3] = [("GM", "1"), ("FF", "4"), ("CA", "UTF-8")];

// =============================================================================
// Analysis
// =============================================================================

/// Win-rate drop (0..1, mover's perspective) above which a move is a blunder.
pub const DEFAULT_BLUNDER_THRESHOLD: f64 = 0.15;
