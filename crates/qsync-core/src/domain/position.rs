//! Blind position codes.
//!
//! The hub only understands nine discrete openness levels, in steps of one
//! eighth.  Each level has a fixed one-byte code; the codes are not ordered
//! by openness, so the mapping is a plain lookup table.
//!
//! | open % | code |
//! |-------:|-----:|
//! |    0   | 0x02 |
//! |   12.5 | 0x0e |
//! |   25   | 0x0c |
//! |   37.5 | 0x0b |
//! |   50   | 0x08 |
//! |   62.5 | 0x09 |
//! |   75   | 0x07 |
//! |   87.5 | 0x06 |
//! |  100   | 0x01 |
//!
//! Values outside the table are never clamped to the nearest level; they map
//! to [`INVALID_POSITION_CODE`] and it is up to the caller to reject them.

/// Code returned for any percentage that is not one of the nine levels.
pub const INVALID_POSITION_CODE: u8 = 0x00;

/// `(percent open, code)` for every level the hub supports.
pub const POSITION_TABLE: [(f64, u8); 9] = [
    (0.0, 0x02),
    (12.5, 0x0e),
    (25.0, 0x0c),
    (37.5, 0x0b),
    (50.0, 0x08),
    (62.5, 0x09),
    (75.0, 0x07),
    (87.5, 0x06),
    (100.0, 0x01),
];

/// Maps a percentage (0 = closed, 100 = fully open) to its protocol code.
///
/// Returns [`INVALID_POSITION_CODE`] for any value not in [`POSITION_TABLE`].
///
/// # Examples
///
/// ```rust
/// use qsync_core::domain::position::{position_to_code, INVALID_POSITION_CODE};
///
/// assert_eq!(position_to_code(100.0), 0x01);
/// assert_eq!(position_to_code(33.0), INVALID_POSITION_CODE);
/// ```
pub fn position_to_code(percent: f64) -> u8 {
    // Every table entry is exactly representable, so direct comparison is exact.
    POSITION_TABLE
        .iter()
        .find(|(level, _)| *level == percent)
        .map(|(_, code)| *code)
        .unwrap_or(INVALID_POSITION_CODE)
}

/// Reverse lookup, used to display scene settings.
pub fn code_to_position(code: u8) -> Option<f64> {
    POSITION_TABLE
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(level, _)| *level)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
