//! Seat map domain: bitmap decoding, global seat numbering, free-seat counts.
//!
//! The backend describes each row of the coach as a bitmap string, one
//! character per seat from left to right, `'0'` free and `'1'` booked.
//! Seats are numbered globally from the row number, never from the row's
//! position in the response:
//!
//! ```text
//! seat_number = (row_number - 1) * ROW_WIDTH + (index + 1)
//! ```

use crate::error::{DecodeError, ValidationError};
use railseat_client::SeatRowRecord;
use std::fmt;

/// Seats per row of the coach.
pub const ROW_WIDTH: u32 = 7;

/// Largest row number whose seats still have a `u32` seat number.
pub const MAX_ROW_NUMBER: u32 = u32::MAX / ROW_WIDTH;

/// Global seat number for `index` (0-based) within row `row_number` (1-based).
///
/// `row_number` must be in `1..=MAX_ROW_NUMBER`; decoded rows always are.
///
/// # Examples
///
/// ```
/// use railseat::seats::seat_number;
///
/// assert_eq!(seat_number(1, 0), 1);
/// assert_eq!(seat_number(2, 3), 11);
/// ```
#[must_use]
pub const fn seat_number(row_number: u32, index: u32) -> u32 {
    (row_number - 1) * ROW_WIDTH + (index + 1)
}

/// Inverse of [`seat_number`]: the `(row_number, index)` a seat number maps to.
///
/// Returns `None` for seat number 0, which no seat has.
#[must_use]
pub const fn locate(seat_number: u32) -> Option<(u32, u32)> {
    if seat_number == 0 {
        return None;
    }
    let zero_based = seat_number - 1;
    Some((zero_based / ROW_WIDTH + 1, zero_based % ROW_WIDTH))
}

/// Occupancy of a single seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeatStatus {
    /// Available for booking
    Free,
    /// Already booked
    Booked,
}

/// A seat with its global number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seat {
    /// Global seat number
    pub number: u32,
    /// Occupancy
    pub status: SeatStatus,
}

/// Validated occupancy bitmap of one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatBits(Vec<SeatStatus>);

impl SeatBits {
    /// Parse a wire bitmap for `row_number`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if the bitmap is empty, wider than
    /// [`ROW_WIDTH`], or contains anything but `'0'` and `'1'`.
    pub fn parse(row_number: u32, bits: &str) -> Result<Self, DecodeError> {
        let seats = bits
            .chars()
            .enumerate()
            .map(|(position, found)| match found {
                '0' => Ok(SeatStatus::Free),
                '1' => Ok(SeatStatus::Booked),
                _ => Err(DecodeError::InvalidSeatChar {
                    row_number,
                    found,
                    position,
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        if seats.is_empty() {
            return Err(DecodeError::EmptyRow { row_number });
        }
        if seats.len() > ROW_WIDTH as usize {
            return Err(DecodeError::RowTooWide {
                row_number,
                len: seats.len(),
                max: ROW_WIDTH,
            });
        }

        Ok(Self(seats))
    }

    /// Number of seats in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a parsed bitmap.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Count of free seats.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.0.iter().filter(|s| **s == SeatStatus::Free).count()
    }

    /// Seat statuses from left to right.
    pub fn iter(&self) -> impl Iterator<Item = SeatStatus> + '_ {
        self.0.iter().copied()
    }
}

impl fmt::Display for SeatBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for status in &self.0 {
            f.write_str(match status {
                SeatStatus::Free => "0",
                SeatStatus::Booked => "1",
            })?;
        }
        Ok(())
    }
}

/// Server-assigned row identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowId(pub i64);

/// One decoded row of the coach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatRow {
    id: RowId,
    row_number: u32,
    seat_bits: SeatBits,
}

impl SeatRow {
    /// Decode a row as returned by `GET /seats`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] for a row number outside `1..=MAX_ROW_NUMBER`
    /// or an invalid bitmap.
    pub fn decode(record: &SeatRowRecord) -> Result<Self, DecodeError> {
        if record.seatrow == 0 || record.seatrow > MAX_ROW_NUMBER {
            return Err(DecodeError::RowNumberOutOfRange {
                row_id: record.id,
                row_number: record.seatrow,
            });
        }

        Ok(Self {
            id: RowId(record.id),
            row_number: record.seatrow,
            seat_bits: SeatBits::parse(record.seatrow, &record.seatbit)?,
        })
    }

    /// Server row id.
    #[must_use]
    pub const fn id(&self) -> RowId {
        self.id
    }

    /// 1-based row number.
    #[must_use]
    pub const fn row_number(&self) -> u32 {
        self.row_number
    }

    /// Occupancy bitmap.
    #[must_use]
    pub const fn seat_bits(&self) -> &SeatBits {
        &self.seat_bits
    }

    /// Free seats in this row.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.seat_bits.free_count()
    }

    /// Seats of this row with their global numbers.
    pub fn seats(&self) -> impl Iterator<Item = Seat> + '_ {
        (0..).zip(self.seat_bits.iter()).map(|(index, status)| Seat {
            number: seat_number(self.row_number, index),
            status,
        })
    }
}

/// The whole seat map as of one successful fetch, in server order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SeatMapSnapshot {
    rows: Vec<SeatRow>,
    free_seat_count: usize,
}

impl SeatMapSnapshot {
    /// Decode every row of a `GET /seats` response.
    ///
    /// # Errors
    ///
    /// Returns the first [`DecodeError`] encountered; no partial snapshot is
    /// produced.
    pub fn decode(records: &[SeatRowRecord]) -> Result<Self, DecodeError> {
        let rows = records
            .iter()
            .map(SeatRow::decode)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_rows(rows))
    }

    /// Build a snapshot from already decoded rows.
    #[must_use]
    pub fn from_rows(rows: Vec<SeatRow>) -> Self {
        let free_seat_count = rows.iter().map(SeatRow::free_count).sum();
        Self {
            rows,
            free_seat_count,
        }
    }

    /// Rows in server order.
    #[must_use]
    pub fn rows(&self) -> &[SeatRow] {
        &self.rows
    }

    /// Total `'0'` seats across all rows.
    #[must_use]
    pub const fn free_seat_count(&self) -> usize {
        self.free_seat_count
    }

    /// Every seat in the map, row by row in server order.
    pub fn seats(&self) -> impl Iterator<Item = Seat> + '_ {
        self.rows.iter().flat_map(SeatRow::seats)
    }

    /// Status of a seat by global number, if the map contains it.
    #[must_use]
    pub fn status_of(&self, number: u32) -> Option<SeatStatus> {
        let (row_number, index) = locate(number)?;
        let row = self.rows.iter().find(|r| r.row_number == row_number)?;
        row.seat_bits.iter().nth(index as usize)
    }
}

/// Number of seats to book in one request, `1..=7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatCount(u32);

impl SeatCount {
    /// Smallest bookable count
    pub const MIN: u32 = 1;
    /// Largest bookable count
    pub const MAX: u32 = ROW_WIDTH;

    /// Validate a requested count.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::SeatCountOutOfRange`] outside `1..=7`.
    pub const fn new(count: u32) -> Result<Self, ValidationError> {
        if count < Self::MIN || count > Self::MAX {
            return Err(ValidationError::SeatCountOutOfRange {
                got: count,
                min: Self::MIN,
                max: Self::MAX,
            });
        }
        Ok(Self(count))
    }

    /// The validated count.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for SeatCount {
    type Error = ValidationError;

    fn try_from(count: u32) -> Result<Self, Self::Error> {
        Self::new(count)
    }
}

/// Seat numbers the server assigned to a booking, in its order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingResult {
    booked_seat_numbers: Vec<u32>,
}

impl BookingResult {
    /// Wrap the server's assignment.
    #[must_use]
    pub const fn new(booked_seat_numbers: Vec<u32>) -> Self {
        Self {
            booked_seat_numbers,
        }
    }

    /// Assigned seat numbers.
    #[must_use]
    pub fn booked_seat_numbers(&self) -> &[u32] {
        &self.booked_seat_numbers
    }

    /// Message shown after a successful booking.
    #[must_use]
    pub fn success_message(&self) -> String {
        let seats = self
            .booked_seat_numbers
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        format!("Successfully booked seats: {seats}")
    }
}
