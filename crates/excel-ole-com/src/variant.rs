//! Conversion between COM `VARIANT`s and [`TaggedValue`]s.
//!
//! Scalars are copied as raw little-endian bytes out of (and into) the 8-byte
//! `ullVal` slot of the union; the tag alone decides how many of those bytes mean
//! anything. Strings travel as UTF-16 code units. Two-dimensional `SAFEARRAY`s of
//! `VARIANT` map to row-major [`VariantArray`]s, with COM's 1-based bounds dropped.
//
// The VARIANT struct wraps inner unions in ManuallyDrop, so fields are set with
// ptr::write.

#![cfg(windows)]

use std::ffi::c_void;
use std::mem::ManuallyDrop;
use std::ptr;

use bytes::Bytes;
use excel_ole::Fault;
use excel_ole_core::{Payload, TaggedValue, VariantArray, VariantKind};
use windows::{
    core::BSTR,
    Win32::System::{
        Com::{IDispatch, SAFEARRAY, SAFEARRAYBOUND},
        Ole::{
            SafeArrayCreate, SafeArrayGetDim, SafeArrayGetElement, SafeArrayGetLBound,
            SafeArrayGetUBound, SafeArrayPutElement,
        },
        Variant::{VARENUM, VARIANT, VT_ARRAY, VT_DISPATCH, VT_VARIANT},
    },
};

/// Width of the DECIMAL payload, which overlays the start of the VARIANT.
const DECIMAL_WIDTH: usize = 16;

fn vt_of(v: &VARIANT) -> u16 {
    unsafe { v.Anonymous.Anonymous.vt.0 }
}

/// The object held by a `VT_DISPATCH` variant, if any.
pub fn dispatch_of(v: &VARIANT) -> Option<IDispatch> {
    unsafe {
        if v.Anonymous.Anonymous.vt == VT_DISPATCH {
            let held: &Option<IDispatch> = &v.Anonymous.Anonymous.Anonymous.pdispVal;
            held.clone()
        } else {
            None
        }
    }
}

/// Copy a VARIANT into a tagged value.
///
/// Object handles come back as empty `VT_DISPATCH` / `VT_UNKNOWN` values; acquire
/// objects through `Dispatch::get_object` instead.
pub fn from_variant(v: &VARIANT) -> Result<TaggedValue, Fault> {
    let kind = VariantKind::from_code(vt_of(v));
    match kind {
        VariantKind::Bstr => {
            let units: Vec<u8> = unsafe {
                let bstr: &BSTR = &v.Anonymous.Anonymous.Anonymous.bstrVal;
                bstr.as_wide().iter().flat_map(|u| u.to_le_bytes()).collect()
            };
            Ok(TaggedValue::raw(kind, units))
        }
        VariantKind::Array => read_grid(v),
        VariantKind::Dispatch | VariantKind::Unknown => Ok(TaggedValue::raw(kind, Bytes::new())),
        VariantKind::Decimal => {
            let bytes = unsafe { ptr::read(v as *const VARIANT as *const [u8; DECIMAL_WIDTH]) };
            Ok(TaggedValue::raw(kind, bytes.to_vec()))
        }
        _ => {
            let bits = unsafe { v.Anonymous.Anonymous.Anonymous.ullVal };
            let width = kind.scalar_width().unwrap_or(8);
            Ok(TaggedValue::raw(kind, bits.to_le_bytes()[..width].to_vec()))
        }
    }
}

fn read_grid(v: &VARIANT) -> Result<TaggedValue, Fault> {
    let fault = |e: windows::core::Error| Fault::with_code(e.code().0, format!("SAFEARRAY access failed: {e}"));
    unsafe {
        let psa: *mut SAFEARRAY = v.Anonymous.Anonymous.Anonymous.parray;
        if psa.is_null() {
            return VariantArray::new(0, 0, Vec::new())
                .map(TaggedValue::array)
                .map_err(|e| Fault::new(e.to_string()));
        }
        let dims = SafeArrayGetDim(psa);
        if dims == 0 || dims > 2 {
            return Err(Fault::new(format!("unsupported {dims}-dimensional array")));
        }

        let row_lo = SafeArrayGetLBound(psa, 1).map_err(fault)?;
        let row_hi = SafeArrayGetUBound(psa, 1).map_err(fault)?;
        let (col_lo, col_hi) = if dims == 2 {
            (
                SafeArrayGetLBound(psa, 2).map_err(fault)?,
                SafeArrayGetUBound(psa, 2).map_err(fault)?,
            )
        } else {
            (0, 0)
        };

        let rows = usize::try_from(row_hi - row_lo + 1).unwrap_or(0);
        let cols = usize::try_from(col_hi - col_lo + 1).unwrap_or(0);
        let mut items = Vec::with_capacity(rows * cols);
        for r in row_lo..=row_hi {
            for c in col_lo..=col_hi {
                let indices = [r, c];
                let mut item = VARIANT::default();
                SafeArrayGetElement(psa, indices.as_ptr(), &mut item as *mut VARIANT as *mut c_void)
                    .map_err(fault)?;
                items.push(from_variant(&item)?);
            }
        }
        VariantArray::new(rows, cols, items)
            .map(TaggedValue::array)
            .map_err(|e| Fault::new(e.to_string()))
    }
}

fn with_bits(vt: u16, bits: u64) -> VARIANT {
    unsafe {
        let mut v = VARIANT::default();
        let inner = &mut *v.Anonymous.Anonymous;
        ptr::write(&mut inner.vt, VARENUM(vt));
        ptr::write(&mut inner.Anonymous.ullVal, bits);
        v
    }
}

/// Build a VARIANT from a tagged value.
pub fn to_variant(tv: &TaggedValue) -> Result<VARIANT, Fault> {
    let code = tv.kind.code();
    match (&tv.kind, &tv.payload) {
        (VariantKind::Array, Payload::Array(grid)) => write_grid(grid),
        (_, Payload::Array(_)) => Err(Fault::new(format!("array payload under {}", tv.kind))),
        (VariantKind::Bstr, Payload::Raw(bytes)) => {
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect();
            let text = String::from_utf16_lossy(&units);
            unsafe {
                let mut v = VARIANT::default();
                let inner = &mut *v.Anonymous.Anonymous;
                ptr::write(&mut inner.vt, VARENUM(code));
                ptr::write(&mut inner.Anonymous.bstrVal, ManuallyDrop::new(BSTR::from(text.as_str())));
                Ok(v)
            }
        }
        (VariantKind::Decimal, Payload::Raw(bytes)) if bytes.len() == DECIMAL_WIDTH => unsafe {
            let mut v = VARIANT::default();
            ptr::copy_nonoverlapping(bytes.as_ptr(), &mut v as *mut VARIANT as *mut u8, DECIMAL_WIDTH);
            let inner = &mut *v.Anonymous.Anonymous;
            ptr::write(&mut inner.vt, VARENUM(code));
            Ok(v)
        },
        (kind, Payload::Raw(bytes)) => match kind.scalar_width() {
            Some(width) if bytes.len() == width => {
                let mut buf = [0u8; 8];
                buf[..width].copy_from_slice(bytes);
                Ok(with_bits(code, u64::from_le_bytes(buf)))
            }
            _ => Err(Fault::new(format!(
                "cannot send a {kind} value with a {}-byte payload",
                bytes.len()
            ))),
        },
    }
}

fn write_grid(grid: &VariantArray) -> Result<VARIANT, Fault> {
    if grid.rows() == 0 || grid.cols() == 0 {
        return Ok(VARIANT::default());
    }
    let too_large = || Fault::new("array too large");
    let bounds = [
        SAFEARRAYBOUND {
            cElements: u32::try_from(grid.rows()).map_err(|_| too_large())?,
            lLbound: 1,
        },
        SAFEARRAYBOUND {
            cElements: u32::try_from(grid.cols()).map_err(|_| too_large())?,
            lLbound: 1,
        },
    ];

    unsafe {
        let psa = SafeArrayCreate(VT_VARIANT, 2, bounds.as_ptr());
        if psa.is_null() {
            return Err(Fault::new("SafeArrayCreate failed"));
        }
        // Owned by `v` from here on
        let mut v = VARIANT::default();
        {
            let inner = &mut *v.Anonymous.Anonymous;
            ptr::write(&mut inner.vt, VARENUM(VT_ARRAY.0 | VT_VARIANT.0));
            ptr::write(&mut inner.Anonymous.parray, psa);
        }

        for (r, row) in grid.row_slices().enumerate() {
            for (c, item) in row.iter().enumerate() {
                let element = to_variant(item)?;
                let indices = [r as i32 + 1, c as i32 + 1];
                SafeArrayPutElement(psa, indices.as_ptr(), &element as *const VARIANT as *const c_void)
                    .map_err(|e| Fault::with_code(e.code().0, format!("SafeArrayPutElement failed: {e}")))?;
            }
        }
        Ok(v)
    }
}
