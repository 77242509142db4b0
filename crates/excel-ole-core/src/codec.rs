//! Conversion between [`TaggedValue`] and [`NativeValue`].

use bytes::{Buf, Bytes};

use crate::date::{datetime_to_serial, format_timestamp, serial_to_datetime};
use crate::error::DecodeError;
use crate::value::{CellError, NativeValue};
use crate::variant::{Payload, TaggedValue, VariantArray, VariantKind};

/// Currency is a 64-bit integer scaled by 10,000.
const CURRENCY_SCALE: f64 = 10_000.0;

/// Decode a tagged value into a native value.
///
/// Dispatches exhaustively on the tag. Object handles, decimals and tags this crate
/// does not know decode to [`NativeValue::Opaque`]. A payload that does not fit its
/// tag is a [`DecodeError`] naming the tag.
pub fn decode(tv: &TaggedValue) -> Result<NativeValue, DecodeError> {
    let kind = tv.kind;
    let raw = match &tv.payload {
        Payload::Array(grid) if kind == VariantKind::Array => return decode_grid(grid),
        Payload::Array(_) => return Err(DecodeError::UnexpectedArray { kind }),
        Payload::Raw(raw) => raw,
    };

    if let Some(expected) = kind.scalar_width() {
        if raw.len() != expected {
            return Err(DecodeError::PayloadWidth {
                kind,
                expected,
                actual: raw.len(),
            });
        }
    }

    let mut buf = raw.clone();
    let value = match kind {
        VariantKind::Empty | VariantKind::Null => NativeValue::Empty,
        VariantKind::I1 => NativeValue::I8(buf.get_i8()),
        VariantKind::UI1 => NativeValue::U8(buf.get_u8()),
        VariantKind::I2 => NativeValue::I16(buf.get_i16_le()),
        VariantKind::UI2 => NativeValue::U16(buf.get_u16_le()),
        VariantKind::I4 | VariantKind::Int => NativeValue::I32(buf.get_i32_le()),
        VariantKind::UI4 | VariantKind::UInt => NativeValue::U32(buf.get_u32_le()),
        VariantKind::I8 => NativeValue::I64(buf.get_i64_le()),
        VariantKind::UI8 => NativeValue::U64(buf.get_u64_le()),
        VariantKind::R4 => NativeValue::F32(buf.get_f32_le()),
        VariantKind::R8 => NativeValue::F64(buf.get_f64_le()),
        VariantKind::Bool => NativeValue::Bool(buf.get_i16_le() != 0),
        VariantKind::Currency => NativeValue::F64(buf.get_i64_le() as f64 / CURRENCY_SCALE),
        VariantKind::Date => {
            let serial = buf.get_f64_le();
            let t = serial_to_datetime(serial)
                .ok_or(DecodeError::DateOutOfRange { kind, serial })?;
            NativeValue::Timestamp(t)
        }
        VariantKind::Error => NativeValue::Error(CellError::from_scode(buf.get_i32_le())),
        VariantKind::Bstr => NativeValue::String(decode_utf16(kind, raw)?),
        VariantKind::Array => return Err(DecodeError::ExpectedArray { kind }),
        VariantKind::Dispatch
        | VariantKind::Unknown
        | VariantKind::Variant
        | VariantKind::Decimal
        | VariantKind::Other(_) => NativeValue::Opaque {
            kind,
            payload: raw.clone(),
        },
    };
    Ok(value)
}

fn decode_grid(grid: &VariantArray) -> Result<NativeValue, DecodeError> {
    let rows = grid
        .row_slices()
        .map(|row| row.iter().map(decode).collect::<Result<Vec<_>, _>>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(NativeValue::Array(rows))
}

fn decode_utf16(kind: VariantKind, raw: &Bytes) -> Result<String, DecodeError> {
    if raw.len() % 2 != 0 {
        return Err(DecodeError::PayloadWidth {
            kind,
            expected: raw.len() + 1,
            actual: raw.len(),
        });
    }
    let units: Vec<u16> = raw
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).map_err(|_| DecodeError::InvalidString { kind })
}

/// Encode a native value for writing through the automation layer.
///
/// Currency amounts were widened to `F64` on decode and are written back as doubles.
pub fn encode(value: &NativeValue) -> TaggedValue {
    match value {
        NativeValue::Empty => TaggedValue::empty(),
        NativeValue::Bool(b) => TaggedValue::bool(*b),
        NativeValue::I8(n) => TaggedValue::raw(VariantKind::I1, n.to_le_bytes().to_vec()),
        NativeValue::I16(n) => TaggedValue::i2(*n),
        NativeValue::I32(n) => TaggedValue::i4(*n),
        NativeValue::I64(n) => TaggedValue::i8(*n),
        NativeValue::U8(n) => TaggedValue::raw(VariantKind::UI1, vec![*n]),
        NativeValue::U16(n) => TaggedValue::raw(VariantKind::UI2, n.to_le_bytes().to_vec()),
        NativeValue::U32(n) => TaggedValue::raw(VariantKind::UI4, n.to_le_bytes().to_vec()),
        NativeValue::U64(n) => TaggedValue::raw(VariantKind::UI8, n.to_le_bytes().to_vec()),
        NativeValue::F32(n) => TaggedValue::r4(*n),
        NativeValue::F64(n) => TaggedValue::r8(*n),
        NativeValue::String(s) => TaggedValue::bstr(s),
        NativeValue::Timestamp(t) => TaggedValue::date(datetime_to_serial(*t)),
        NativeValue::Error(e) => TaggedValue::error(e.scode()),
        NativeValue::Array(rows) => TaggedValue::array(VariantArray::from_rows(
            rows.iter()
                .map(|row| row.iter().map(encode).collect())
                .collect(),
        )),
        NativeValue::Opaque { kind, payload } => TaggedValue::raw(*kind, payload.clone()),
    }
}

/// Render any native value as text.
///
/// - integers in base 10
/// - floats with two decimals (the value itself keeps full precision)
/// - booleans as `TRUE` / `FALSE`, the way the spreadsheet displays them
/// - timestamps as `YYYY-MM-DD HH:MM:SS`
/// - grids as `[[a, b], [c, d]]`
pub fn stringify(value: &NativeValue) -> String {
    match value {
        NativeValue::Empty => String::new(),
        NativeValue::Bool(true) => "TRUE".to_string(),
        NativeValue::Bool(false) => "FALSE".to_string(),
        NativeValue::I8(n) => n.to_string(),
        NativeValue::I16(n) => n.to_string(),
        NativeValue::I32(n) => n.to_string(),
        NativeValue::I64(n) => n.to_string(),
        NativeValue::U8(n) => n.to_string(),
        NativeValue::U16(n) => n.to_string(),
        NativeValue::U32(n) => n.to_string(),
        NativeValue::U64(n) => n.to_string(),
        NativeValue::F32(n) => format!("{:.2}", f64::from(*n)),
        NativeValue::F64(n) => format!("{n:.2}"),
        NativeValue::String(s) => s.clone(),
        NativeValue::Timestamp(t) => format_timestamp(t),
        NativeValue::Error(e) => e.as_str(),
        NativeValue::Array(rows) => {
            let rows: Vec<String> = rows
                .iter()
                .map(|row| {
                    let cells: Vec<String> = row.iter().map(stringify).collect();
                    format!("[{}]", cells.join(", "))
                })
                .collect();
            format!("[{}]", rows.join(", "))
        }
        NativeValue::Opaque { kind, payload } => format!("<{kind}, {} bytes>", payload.len()),
    }
}
