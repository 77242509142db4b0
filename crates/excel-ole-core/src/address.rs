//! Cell address and range types

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// A cell address (e.g., "A1", "AA5")
///
/// Both coordinates are 1-based, the way the automation layer numbers them. Column
/// letters use bijective base-26 (A=1 ... Z=26, AA=27 ...), so there is no zero digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellAddress {
    /// Row number (1..=1048576)
    pub row: u32,
    /// Column number (1..=16384, A=1)
    pub col: u32,
}

impl CellAddress {
    /// Create a cell address from a 1-based row and column.
    ///
    /// # Examples
    /// ```
    /// use excel_ole_core::CellAddress;
    ///
    /// let addr = CellAddress::new(5, 27).unwrap();
    /// assert_eq!(addr.to_a1_string(), "AA5");
    ///
    /// assert!(CellAddress::new(0, 1).is_err());
    /// ```
    pub fn new(row: u32, col: u32) -> Result<Self> {
        if row == 0 || row > MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS));
        }
        if col == 0 || col > MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS));
        }
        Ok(Self { row, col })
    }

    /// Parse a cell address from A1-style notation.
    ///
    /// Letters are case-insensitive. `$` markers are accepted and ignored, since the
    /// automation layer resolves absolute and relative references to the same cell.
    ///
    /// # Examples
    /// ```
    /// use excel_ole_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("AA5").unwrap();
    /// assert_eq!((addr.row, addr.col), (5, 27));
    ///
    /// let addr = CellAddress::parse("$b$2").unwrap();
    /// assert_eq!((addr.row, addr.col), (2, 2));
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let bytes = s.as_bytes();
        let mut pos = 0;

        if bytes.get(pos) == Some(&b'$') {
            pos += 1;
        }

        let col_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }

        if pos == col_start {
            return Err(Error::InvalidAddress(format!(
                "no column letters in '{}'",
                s
            )));
        }

        let col = Self::letters_to_column(&s[col_start..pos])?;

        if bytes.get(pos) == Some(&b'$') {
            pos += 1;
        }

        let row_str = &s[pos..];
        if row_str.is_empty() {
            return Err(Error::InvalidAddress(format!("no row number in '{}'", s)));
        }
        if !row_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidAddress(format!(
                "invalid row number in '{}'",
                s
            )));
        }

        let row: u32 = row_str
            .parse()
            .map_err(|_| Error::RowOutOfBounds(u32::MAX, MAX_ROWS))?;

        Self::new(row, col)
    }

    /// Convert a 1-based column number to letters (1 = A, 26 = Z, 27 = AA, etc.)
    ///
    /// Returns an empty string for column 0, which has no letter form.
    pub fn column_to_letters(col: u32) -> String {
        let mut letters = Vec::new();
        let mut n = col;

        while n > 0 {
            let mut quotient = n / 26;
            let mut remainder = n % 26;
            // No zero digit: a multiple of 26 ends in Z and borrows from the quotient.
            if remainder == 0 {
                remainder = 26;
                quotient -= 1;
            }
            letters.push((b'A' + (remainder - 1) as u8) as char);
            n = quotient;
        }

        letters.iter().rev().collect()
    }

    /// Convert column letters to a 1-based column number (A = 1, Z = 26, AA = 27, etc.)
    pub fn letters_to_column(letters: &str) -> Result<u32> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }

        let mut col: u32 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!(
                    "invalid column letter '{}'",
                    c
                )));
            }
            col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
            if col > MAX_COLS {
                return Err(Error::ColumnOutOfBounds(col, MAX_COLS));
            }
        }

        Ok(col)
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        format!("{}{}", Self::column_to_letters(self.col), self.row)
    }

    /// Create a range from this address to another
    pub fn to(&self, other: CellAddress) -> CellRange {
        CellRange::new(*self, other)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A rectangular range of cells (e.g., "A1:B10")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellRange {
    /// Start address (top-left)
    pub start: CellAddress,
    /// End address (bottom-right)
    pub end: CellAddress,
}

impl CellRange {
    /// Create a new cell range, normalized so `start` is the top-left corner.
    pub fn new(start: CellAddress, end: CellAddress) -> Self {
        Self {
            start: CellAddress {
                row: start.row.min(end.row),
                col: start.col.min(end.col),
            },
            end: CellAddress {
                row: start.row.max(end.row),
                col: start.col.max(end.col),
            },
        }
    }

    /// Create a single-cell range
    pub fn single(addr: CellAddress) -> Self {
        Self {
            start: addr,
            end: addr,
        }
    }

    /// The range of `rows` x `cols` cells whose top-left corner is `origin`.
    pub fn from_origin(origin: CellAddress, rows: u32, cols: u32) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidAddress(format!(
                "empty {rows}x{cols} range at {origin}"
            )));
        }
        let end = CellAddress::new(
            origin.row.saturating_add(rows - 1),
            origin.col.saturating_add(cols - 1),
        )?;
        Ok(Self::new(origin, end))
    }

    /// Parse a range from A1:B10 notation. A bare address is a single-cell range.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if let Some((start, end)) = s.split_once(':') {
            Ok(Self::new(CellAddress::parse(start)?, CellAddress::parse(end)?))
        } else {
            Ok(Self::single(CellAddress::parse(s)?))
        }
    }

    /// Get the number of rows in the range
    pub fn row_count(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Get the number of columns in the range
    pub fn col_count(&self) -> u32 {
        self.end.col - self.start.col + 1
    }

    /// Format as A1:B10 string
    pub fn to_a1_string(&self) -> String {
        if self.start == self.end {
            self.start.to_a1_string()
        } else {
            format!("{}:{}", self.start.to_a1_string(), self.end.to_a1_string())
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
