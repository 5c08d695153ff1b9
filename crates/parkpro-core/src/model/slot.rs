// ── Parking slots ──
//
// The lot is a fixed 5x5 grid: rows A through E, columns 1 through 5.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

const ROWS: u8 = 5;
const COLS: u8 = 5;

/// One of the 25 slots, `A1` through `E5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParkingSlot {
    /// Zero-based row index (`0` is `A`).
    row: u8,
    /// One-based column number.
    col: u8,
}

impl ParkingSlot {
    pub const COUNT: usize = 25;

    /// Every slot in row-major order.
    #[allow(clippy::as_conversions)]
    pub const ALL: [Self; Self::COUNT] = {
        let mut slots = [Self { row: 0, col: 1 }; Self::COUNT];
        let mut row = 0;
        while row < ROWS {
            let mut col = 0;
            while col < COLS {
                slots[(row * COLS + col) as usize] = Self { row, col: col + 1 };
                col += 1;
            }
            row += 1;
        }
        slots
    };

    /// Build from a row letter and column number, `None` when off the grid.
    pub fn new(row: char, col: u8) -> Option<Self> {
        let row = row.to_ascii_uppercase();
        if !('A'..='E').contains(&row) || !(1..=COLS).contains(&col) {
            return None;
        }
        let row = u8::try_from(row).ok()? - b'A';
        Some(Self { row, col })
    }

    pub fn row(self) -> char {
        char::from(b'A' + self.row)
    }

    pub fn col(self) -> u8 {
        self.col
    }

    /// Iterator over [`Self::ALL`].
    pub fn all() -> impl Iterator<Item = Self> {
        Self::ALL.into_iter()
    }
}

impl fmt::Display for ParkingSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row(), self.col)
    }
}

/// Returned when a string doesn't name a slot on the grid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown parking slot '{0}' (expected A1..E5)")]
pub struct ParseSlotError(pub String);

impl FromStr for ParkingSlot {
    type Err = ParseSlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let (Some(row), Some(col), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(ParseSlotError(s.to_owned()));
        };
        col.to_digit(10)
            .and_then(|c| u8::try_from(c).ok())
            .and_then(|c| Self::new(row, c))
            .ok_or_else(|| ParseSlotError(s.to_owned()))
    }
}

impl Serialize for ParkingSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn grid_is_row_major() {
        let names: Vec<String> = ParkingSlot::all().map(|s| s.to_string()).collect();
        assert_eq!(names.len(), ParkingSlot::COUNT);
        assert_eq!(names.first().map(String::as_str), Some("A1"));
        assert_eq!(names.get(5).map(String::as_str), Some("B1"));
        assert_eq!(names.last().map(String::as_str), Some("E5"));
    }

    #[test]
    fn parsing_is_case_insensitive() {
        assert_eq!("c3".parse::<ParkingSlot>().unwrap().to_string(), "C3");
        assert_eq!(" E5 ".parse::<ParkingSlot>().unwrap().to_string(), "E5");
    }

    #[test]
    fn off_grid_is_rejected() {
        for bad in ["F1", "A0", "A6", "A10", "", "1A"] {
            assert!(bad.parse::<ParkingSlot>().is_err(), "{bad} should not parse");
        }
    }
}
