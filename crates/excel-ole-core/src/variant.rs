//! Tagged values as exchanged with the automation layer.
//!
//! A [`TaggedValue`] is a [`VariantKind`] tag plus the raw little-endian bytes of the
//! payload, or a grid of nested tagged values for the array tag. The bytes only mean
//! something together with the tag; [`crate::decode`] is the one place that reads them.

use std::fmt;

use bytes::Bytes;

use crate::error::DecodeError;

/// The VARIANT type tag. Codes match the `VT_*` constants of OLE automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    Empty,
    Null,
    I2,
    I4,
    R4,
    R8,
    Currency,
    Date,
    Bstr,
    Dispatch,
    Error,
    Bool,
    Variant,
    Unknown,
    Decimal,
    I1,
    UI1,
    UI2,
    UI4,
    I8,
    UI8,
    Int,
    UInt,
    /// Two-dimensional array of VARIANTs (`VT_ARRAY | VT_VARIANT`).
    Array,
    /// Any tag this crate does not interpret.
    Other(u16),
}

/// Flag bit marking a SAFEARRAY payload.
pub const VT_ARRAY: u16 = 0x2000;

impl VariantKind {
    /// Parse from the wire code.
    pub fn from_code(code: u16) -> VariantKind {
        match code {
            0 => VariantKind::Empty,
            1 => VariantKind::Null,
            2 => VariantKind::I2,
            3 => VariantKind::I4,
            4 => VariantKind::R4,
            5 => VariantKind::R8,
            6 => VariantKind::Currency,
            7 => VariantKind::Date,
            8 => VariantKind::Bstr,
            9 => VariantKind::Dispatch,
            10 => VariantKind::Error,
            11 => VariantKind::Bool,
            12 => VariantKind::Variant,
            13 => VariantKind::Unknown,
            14 => VariantKind::Decimal,
            16 => VariantKind::I1,
            17 => VariantKind::UI1,
            18 => VariantKind::UI2,
            19 => VariantKind::UI4,
            20 => VariantKind::I8,
            21 => VariantKind::UI8,
            22 => VariantKind::Int,
            23 => VariantKind::UInt,
            c if c == VT_ARRAY | 12 => VariantKind::Array,
            other => VariantKind::Other(other),
        }
    }

    /// The wire code.
    pub fn code(self) -> u16 {
        match self {
            VariantKind::Empty => 0,
            VariantKind::Null => 1,
            VariantKind::I2 => 2,
            VariantKind::I4 => 3,
            VariantKind::R4 => 4,
            VariantKind::R8 => 5,
            VariantKind::Currency => 6,
            VariantKind::Date => 7,
            VariantKind::Bstr => 8,
            VariantKind::Dispatch => 9,
            VariantKind::Error => 10,
            VariantKind::Bool => 11,
            VariantKind::Variant => 12,
            VariantKind::Unknown => 13,
            VariantKind::Decimal => 14,
            VariantKind::I1 => 16,
            VariantKind::UI1 => 17,
            VariantKind::UI2 => 18,
            VariantKind::UI4 => 19,
            VariantKind::I8 => 20,
            VariantKind::UI8 => 21,
            VariantKind::Int => 22,
            VariantKind::UInt => 23,
            VariantKind::Array => VT_ARRAY | 12,
            VariantKind::Other(code) => code,
        }
    }

    /// Width in bytes of a fixed-size scalar payload, `None` for variable or opaque payloads.
    pub fn scalar_width(self) -> Option<usize> {
        match self {
            VariantKind::Empty | VariantKind::Null => Some(0),
            VariantKind::I1 | VariantKind::UI1 => Some(1),
            VariantKind::I2 | VariantKind::UI2 | VariantKind::Bool => Some(2),
            VariantKind::I4
            | VariantKind::UI4
            | VariantKind::Int
            | VariantKind::UInt
            | VariantKind::R4
            | VariantKind::Error => Some(4),
            VariantKind::I8
            | VariantKind::UI8
            | VariantKind::R8
            | VariantKind::Currency
            | VariantKind::Date => Some(8),
            _ => None,
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantKind::Empty => write!(f, "VT_EMPTY"),
            VariantKind::Null => write!(f, "VT_NULL"),
            VariantKind::I2 => write!(f, "VT_I2"),
            VariantKind::I4 => write!(f, "VT_I4"),
            VariantKind::R4 => write!(f, "VT_R4"),
            VariantKind::R8 => write!(f, "VT_R8"),
            VariantKind::Currency => write!(f, "VT_CY"),
            VariantKind::Date => write!(f, "VT_DATE"),
            VariantKind::Bstr => write!(f, "VT_BSTR"),
            VariantKind::Dispatch => write!(f, "VT_DISPATCH"),
            VariantKind::Error => write!(f, "VT_ERROR"),
            VariantKind::Bool => write!(f, "VT_BOOL"),
            VariantKind::Variant => write!(f, "VT_VARIANT"),
            VariantKind::Unknown => write!(f, "VT_UNKNOWN"),
            VariantKind::Decimal => write!(f, "VT_DECIMAL"),
            VariantKind::I1 => write!(f, "VT_I1"),
            VariantKind::UI1 => write!(f, "VT_UI1"),
            VariantKind::UI2 => write!(f, "VT_UI2"),
            VariantKind::UI4 => write!(f, "VT_UI4"),
            VariantKind::I8 => write!(f, "VT_I8"),
            VariantKind::UI8 => write!(f, "VT_UI8"),
            VariantKind::Int => write!(f, "VT_INT"),
            VariantKind::UInt => write!(f, "VT_UINT"),
            VariantKind::Array => write!(f, "VT_ARRAY|VT_VARIANT"),
            VariantKind::Other(code) => write!(f, "VT(0x{code:04X})"),
        }
    }
}

/// The payload of a tagged value.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Little-endian scalar bytes, UTF-16LE code units for strings, or an opaque blob.
    Raw(Bytes),
    /// Row-major grid for the array tag.
    Array(VariantArray),
}

/// A two-dimensional, row-major grid of tagged values.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantArray {
    rows: usize,
    cols: usize,
    items: Vec<TaggedValue>,
}

impl VariantArray {
    /// Build a grid, checking that `items` holds exactly `rows * cols` elements.
    pub fn new(rows: usize, cols: usize, items: Vec<TaggedValue>) -> Result<Self, DecodeError> {
        if rows.checked_mul(cols) != Some(items.len()) {
            return Err(DecodeError::GridShape {
                kind: VariantKind::Array,
                rows,
                cols,
                len: items.len(),
            });
        }
        Ok(Self { rows, cols, items })
    }

    /// Build a grid from rows of possibly different lengths, padding short rows with
    /// empty values.
    pub fn from_rows(rows: Vec<Vec<TaggedValue>>) -> Self {
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        let row_count = rows.len();
        let mut items = Vec::with_capacity(row_count * cols);
        for mut row in rows {
            row.resize(cols, TaggedValue::empty());
            items.extend(row);
        }
        Self {
            rows: row_count,
            cols,
            items,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Element at a 0-based position.
    pub fn get(&self, row: usize, col: usize) -> Option<&TaggedValue> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.items.get(row * self.cols + col)
    }

    /// Iterate over rows as slices.
    pub fn row_slices(&self) -> impl Iterator<Item = &[TaggedValue]> {
        // chunks(0) panics; an empty grid has no rows to yield anyway.
        self.items.chunks(self.cols.max(1)).take(self.rows)
    }
}

/// A dynamically-typed value as exchanged with the external object model.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedValue {
    pub kind: VariantKind,
    pub payload: Payload,
}

impl TaggedValue {
    /// A tagged value with raw payload bytes.
    pub fn raw(kind: VariantKind, bytes: impl Into<Bytes>) -> Self {
        Self {
            kind,
            payload: Payload::Raw(bytes.into()),
        }
    }

    pub fn empty() -> Self {
        Self::raw(VariantKind::Empty, Bytes::new())
    }

    pub fn null() -> Self {
        Self::raw(VariantKind::Null, Bytes::new())
    }

    pub fn bool(value: bool) -> Self {
        // VARIANT_TRUE is -1
        let raw: i16 = if value { -1 } else { 0 };
        Self::raw(VariantKind::Bool, raw.to_le_bytes().to_vec())
    }

    pub fn i2(value: i16) -> Self {
        Self::raw(VariantKind::I2, value.to_le_bytes().to_vec())
    }

    pub fn i4(value: i32) -> Self {
        Self::raw(VariantKind::I4, value.to_le_bytes().to_vec())
    }

    pub fn i8(value: i64) -> Self {
        Self::raw(VariantKind::I8, value.to_le_bytes().to_vec())
    }

    pub fn r4(value: f32) -> Self {
        Self::raw(VariantKind::R4, value.to_le_bytes().to_vec())
    }

    pub fn r8(value: f64) -> Self {
        Self::raw(VariantKind::R8, value.to_le_bytes().to_vec())
    }

    /// Currency from its stored fixed-point integer (value * 10,000).
    pub fn currency(scaled: i64) -> Self {
        Self::raw(VariantKind::Currency, scaled.to_le_bytes().to_vec())
    }

    /// Date from an OLE serial day count.
    pub fn date(serial: f64) -> Self {
        Self::raw(VariantKind::Date, serial.to_le_bytes().to_vec())
    }

    /// Error from its SCODE.
    pub fn error(scode: i32) -> Self {
        Self::raw(VariantKind::Error, scode.to_le_bytes().to_vec())
    }

    pub fn bstr(value: &str) -> Self {
        let bytes: Vec<u8> = value.encode_utf16().flat_map(u16::to_le_bytes).collect();
        Self::raw(VariantKind::Bstr, bytes)
    }

    pub fn array(grid: VariantArray) -> Self {
        Self {
            kind: VariantKind::Array,
            payload: Payload::Array(grid),
        }
    }

    /// True for the empty and null tags.
    pub fn is_empty(&self) -> bool {
        matches!(self.kind, VariantKind::Empty | VariantKind::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes_round_trip() {
        for code in 0u16..=23 {
            if code == 15 {
                assert_eq!(VariantKind::from_code(15), VariantKind::Other(15));
                continue;
            }
            assert_eq!(VariantKind::from_code(code).code(), code);
        }
        assert_eq!(VariantKind::from_code(0x200C), VariantKind::Array);
        assert_eq!(VariantKind::from_code(0x2005), VariantKind::Other(0x2005));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(VariantKind::I4.to_string(), "VT_I4");
        assert_eq!(VariantKind::Other(0x48).to_string(), "VT(0x0048)");
    }

    #[test]
    fn test_array_shape() {
        let items = vec![TaggedValue::i4(1), TaggedValue::i4(2), TaggedValue::i4(3)];
        assert!(VariantArray::new(2, 2, items.clone()).is_err());

        let grid = VariantArray::new(1, 3, items).unwrap();
        assert_eq!(grid.get(0, 2), Some(&TaggedValue::i4(3)));
        assert_eq!(grid.get(1, 0), None);
        assert_eq!(grid.row_slices().count(), 1);
    }

    #[test]
    fn test_array_from_ragged_rows() {
        let grid = VariantArray::from_rows(vec![
            vec![TaggedValue::i4(1)],
            vec![TaggedValue::i4(2), TaggedValue::i4(3)],
        ]);
        assert_eq!((grid.rows(), grid.cols()), (2, 2));
        assert_eq!(grid.get(0, 1), Some(&TaggedValue::empty()));
    }

    #[test]
    fn test_bstr_payload_is_utf16le() {
        let value = TaggedValue::bstr("Hi");
        assert_eq!(value.payload, Payload::Raw(Bytes::from_static(&[b'H', 0, b'i', 0])));
    }
}
