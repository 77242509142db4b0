//! Host-native values decoded from tagged values

use std::fmt;

use bytes::Bytes;
use chrono::NaiveDateTime;

use crate::variant::VariantKind;

/// A decoded value.
///
/// Every tag the codec understands maps to exactly one variant here; anything else
/// is kept as [`NativeValue::Opaque`] so it can still be inspected or sent back.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    /// Empty or null; renders as the empty string
    Empty,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    /// Doubles, and currency amounts after scaling
    F64(f64),
    String(String),
    /// A date converted from its OLE serial
    Timestamp(NaiveDateTime),
    /// Spreadsheet error value (#DIV/0!, #N/A, ...)
    Error(CellError),
    /// Row-major grid, e.g. the value of a multi-cell range
    Array(Vec<Vec<NativeValue>>),
    /// A value the codec passes through untouched (object handles, decimals, ...)
    Opaque { kind: VariantKind, payload: Bytes },
}

impl NativeValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, NativeValue::Empty)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            NativeValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            NativeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Any integer variant that fits in an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            NativeValue::I8(n) => Some(n.into()),
            NativeValue::I16(n) => Some(n.into()),
            NativeValue::I32(n) => Some(n.into()),
            NativeValue::I64(n) => Some(n),
            NativeValue::U8(n) => Some(n.into()),
            NativeValue::U16(n) => Some(n.into()),
            NativeValue::U32(n) => Some(n.into()),
            NativeValue::U64(n) => i64::try_from(n).ok(),
            _ => None,
        }
    }

    /// Any numeric variant, widened to f64.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            NativeValue::F32(n) => Some(n.into()),
            NativeValue::F64(n) => Some(n),
            NativeValue::U64(n) => Some(n as f64),
            _ => self.as_i64().map(|n| n as f64),
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            NativeValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Vec<NativeValue>]> {
        match self {
            NativeValue::Array(rows) => Some(rows),
            _ => None,
        }
    }

    /// Name of the variant, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            NativeValue::Empty => "empty",
            NativeValue::Bool(_) => "bool",
            NativeValue::I8(_) => "i8",
            NativeValue::I16(_) => "i16",
            NativeValue::I32(_) => "i32",
            NativeValue::I64(_) => "i64",
            NativeValue::U8(_) => "u8",
            NativeValue::U16(_) => "u16",
            NativeValue::U32(_) => "u32",
            NativeValue::U64(_) => "u64",
            NativeValue::F32(_) => "f32",
            NativeValue::F64(_) => "f64",
            NativeValue::String(_) => "string",
            NativeValue::Timestamp(_) => "timestamp",
            NativeValue::Error(_) => "error",
            NativeValue::Array(_) => "array",
            NativeValue::Opaque { .. } => "opaque",
        }
    }
}

impl fmt::Display for NativeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::codec::stringify(self))
    }
}

impl From<&str> for NativeValue {
    fn from(s: &str) -> Self {
        NativeValue::String(s.to_string())
    }
}

impl From<String> for NativeValue {
    fn from(s: String) -> Self {
        NativeValue::String(s)
    }
}

impl From<bool> for NativeValue {
    fn from(b: bool) -> Self {
        NativeValue::Bool(b)
    }
}

impl From<i32> for NativeValue {
    fn from(n: i32) -> Self {
        NativeValue::I32(n)
    }
}

impl From<i64> for NativeValue {
    fn from(n: i64) -> Self {
        NativeValue::I64(n)
    }
}

impl From<u32> for NativeValue {
    fn from(n: u32) -> Self {
        NativeValue::U32(n)
    }
}

impl From<f32> for NativeValue {
    fn from(n: f32) -> Self {
        NativeValue::F32(n)
    }
}

impl From<f64> for NativeValue {
    fn from(n: f64) -> Self {
        NativeValue::F64(n)
    }
}

impl From<NaiveDateTime> for NativeValue {
    fn from(t: NaiveDateTime) -> Self {
        NativeValue::Timestamp(t)
    }
}

impl From<CellError> for NativeValue {
    fn from(e: CellError) -> Self {
        NativeValue::Error(e)
    }
}

impl<T: Into<NativeValue>> From<Option<T>> for NativeValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(NativeValue::Empty)
    }
}

impl From<Vec<Vec<NativeValue>>> for NativeValue {
    fn from(rows: Vec<Vec<NativeValue>>) -> Self {
        NativeValue::Array(rows)
    }
}

/// Spreadsheet error values as carried in a `VT_ERROR` SCODE.
///
/// The application reports cell errors as `0x800A0000 | code` where `code` is the
/// `xlErr*` constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellError {
    /// #NULL!
    Null,
    /// #DIV/0!
    Div0,
    /// #VALUE!
    Value,
    /// #REF!
    Ref,
    /// #NAME?
    Name,
    /// #NUM!
    Num,
    /// #N/A
    NA,
    /// Any other SCODE
    Other(i32),
}

const XL_ERR_FACILITY: u32 = 0x800A_0000;

impl CellError {
    /// Interpret a `VT_ERROR` SCODE.
    pub fn from_scode(scode: i32) -> Self {
        let raw = scode as u32;
        if raw & 0xFFFF_0000 != XL_ERR_FACILITY {
            return CellError::Other(scode);
        }
        match raw & 0xFFFF {
            2000 => CellError::Null,
            2007 => CellError::Div0,
            2015 => CellError::Value,
            2023 => CellError::Ref,
            2029 => CellError::Name,
            2036 => CellError::Num,
            2042 => CellError::NA,
            _ => CellError::Other(scode),
        }
    }

    /// The SCODE this error is transmitted as.
    pub fn scode(self) -> i32 {
        let code = match self {
            CellError::Null => 2000,
            CellError::Div0 => 2007,
            CellError::Value => 2015,
            CellError::Ref => 2023,
            CellError::Name => 2029,
            CellError::Num => 2036,
            CellError::NA => 2042,
            CellError::Other(scode) => return scode,
        };
        (XL_ERR_FACILITY | code) as i32
    }

    /// Get the error string as displayed in a cell
    pub fn as_str(&self) -> String {
        match self {
            CellError::Null => "#NULL!".into(),
            CellError::Div0 => "#DIV/0!".into(),
            CellError::Value => "#VALUE!".into(),
            CellError::Ref => "#REF!".into(),
            CellError::Name => "#NAME?".into(),
            CellError::Num => "#NUM!".into(),
            CellError::NA => "#N/A".into(),
            CellError::Other(scode) => format!("#ERR(0x{:08X})", *scode as u32),
        }
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}
