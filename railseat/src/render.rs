//! Plain-text rendering of a seat map view.

use crate::seats::{SeatMapSnapshot, SeatStatus};
use crate::sync::SeatMapState;
use std::fmt::Write;

/// Marker printed after a booked seat's number.
pub const BOOKED_MARKER: char = '*';

/// Render the seat grid, one line per row in server order.
///
/// ```text
///  1 |   1*   2*   3    4    5    6    7
///  2 |   8    9   10   11   12   13   14
/// ```
#[must_use]
pub fn render_grid(snapshot: &SeatMapSnapshot) -> String {
    let mut out = String::new();
    for row in snapshot.rows() {
        let _ = write!(out, "{:>2} |", row.row_number());
        for seat in row.seats() {
            let marker = match seat.status {
                SeatStatus::Free => ' ',
                SeatStatus::Booked => BOOKED_MARKER,
            };
            let _ = write!(out, " {:>3}{marker}", seat.number);
        }
        out.push('\n');
    }
    out
}

/// Render the whole view: free-seat header, grid, and any messages.
///
/// Refresh failures are not shown; the previous grid stays on screen.
#[must_use]
pub fn render_view(state: &SeatMapState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Available Seats: {}", state.free_seat_count());

    match &state.snapshot {
        Some(snapshot) => {
            out.push_str(&render_grid(snapshot));
            let _ = writeln!(out, "({BOOKED_MARKER} booked)");
        },
        None => out.push_str("Loading seats...\n"),
    }

    if let Some(result) = &state.booking.result {
        if !result.booked_seat_numbers().is_empty() {
            let _ = writeln!(out, "{}", result.success_message());
        }
    }
    if let Some(error) = &state.booking.error {
        let _ = writeln!(out, "{error}");
    }
    if let Some(error) = &state.reset_error {
        let _ = writeln!(out, "{error}");
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use crate::seats::BookingResult;
    use crate::sync::Lifecycle;
    use railseat_client::SeatRowRecord;

    fn snapshot() -> SeatMapSnapshot {
        SeatMapSnapshot::decode(&[
            SeatRowRecord {
                id: 1,
                seatbit: "1100000".to_string(),
                seatrow: 1,
            },
            SeatRowRecord {
                id: 2,
                seatbit: "000".to_string(),
                seatrow: 12,
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_grid_numbers_and_marks_seats() {
        let grid = render_grid(&snapshot());
        let lines: Vec<_> = grid.lines().collect();

        assert_eq!(lines[0], " 1 |   1*   2*   3    4    5    6    7 ");
        assert_eq!(lines[1], "12 |  78   79   80 ");
    }

    #[test]
    fn test_view_shows_count_and_messages() {
        let mut state = SeatMapState {
            lifecycle: Lifecycle::Mounted,
            snapshot: Some(snapshot()),
            ..SeatMapState::default()
        };
        state.booking.result = Some(BookingResult::new(vec![4, 5, 9]));
        state.reset_error = Some("not permitted".to_string());

        let view = render_view(&state);

        assert!(view.starts_with("Available Seats: 8\n"));
        assert!(view.contains("Successfully booked seats: 4, 5, 9\n"));
        assert!(view.ends_with("not permitted\n"));
    }

    #[test]
    fn test_view_before_first_fetch() {
        let view = render_view(&SeatMapState::default());
        assert_eq!(view, "Available Seats: 0\nLoading seats...\n");
    }
}
