//! # excel-ole-core
//!
//! Value layer for the excel-ole automation binding.
//!
//! Nothing in this crate talks to a running application. It provides:
//! - [`CellAddress`] and [`CellRange`] - A1-style addressing with bijective base-26 columns
//! - [`TaggedValue`] and [`VariantKind`] - the tag + raw payload form exchanged with the
//!   automation layer
//! - [`decode`], [`encode`] and [`stringify`] - conversion between tagged values and
//!   [`NativeValue`]
//!
//! ## Example
//!
//! ```rust
//! use excel_ole_core::{decode, stringify, CellAddress, NativeValue, TaggedValue};
//!
//! let addr = CellAddress::new(5, 27).unwrap();
//! assert_eq!(addr.to_string(), "AA5");
//!
//! let value = decode(&TaggedValue::r8(1234.5678)).unwrap();
//! assert_eq!(value, NativeValue::F64(1234.5678));
//! assert_eq!(stringify(&value), "1234.57");
//! ```

pub mod address;
pub mod codec;
pub mod date;
pub mod error;
pub mod value;
pub mod variant;

pub use address::{CellAddress, CellRange};
pub use codec::{decode, encode, stringify};
pub use error::{DecodeError, Error, Result};
pub use value::{CellError, NativeValue};
pub use variant::{Payload, TaggedValue, VariantArray, VariantKind};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u32 = 16_384;
