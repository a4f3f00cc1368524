//! Errors raised before anything reaches the backend.

use thiserror::Error;

/// A seat row from the backend that cannot be rendered.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The bitmap holds something other than `'0'` or `'1'`.
    #[error("row {row_number}: invalid seat character {found:?} at position {position}")]
    InvalidSeatChar {
        /// Row the bitmap belongs to
        row_number: u32,
        /// Offending character
        found: char,
        /// Zero-based index within the row
        position: usize,
    },

    /// The bitmap is empty.
    #[error("row {row_number}: empty seat bitmap")]
    EmptyRow {
        /// Row the bitmap belongs to
        row_number: u32,
    },

    /// The bitmap is longer than the coach's row width.
    #[error("row {row_number}: {len} seats exceed the row width of {max}")]
    RowTooWide {
        /// Row the bitmap belongs to
        row_number: u32,
        /// Seats in the bitmap
        len: usize,
        /// Row width
        max: u32,
    },

    /// Row numbers are 1-based and bounded so seat numbers fit in a `u32`.
    #[error("row id {row_id}: row number {row_number} is out of range")]
    RowNumberOutOfRange {
        /// Server row id
        row_id: i64,
        /// Offending row number
        row_number: u32,
    },
}

/// Input rejected on the client side.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Booking count outside `1..=7`.
    #[error("Seat count must be between {min} and {max}, got {got}")]
    SeatCountOutOfRange {
        /// The rejected count
        got: u32,
        /// Smallest allowed count
        min: u32,
        /// Largest allowed count
        max: u32,
    },

    /// A required form field was left blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The email field does not look like an address.
    #[error("Email address is invalid")]
    InvalidEmail,
}
