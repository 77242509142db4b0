//! # excel-ole
//!
//! Drive a spreadsheet application through a late-bound automation object model.
//!
//! The crate is written against the [`Dispatch`] trait: get and put named properties,
//! call named methods. `excel-ole-com` implements it over COM `IDispatch` on Windows;
//! tests implement it with an in-memory mock.
//!
//! - [`path`] - typed property-path access (`["Font", "Size"]`)
//! - [`Session`], [`Workbook`], [`Sheet`], [`Range`] - the workbook facade
//! - [`AppOptions`] - application toggles, pushed only when they change
//! - [`FileFormat`] - `SaveAs` format ids
//!
//! Every operation returns [`Result`]; [`OrPanic`] turns any of them into the
//! panicking form.
//!
//! ## Example
//!
//! ```rust,ignore
//! use excel_ole::{AppOptions, Session};
//!
//! let session = Session::attach(app, AppOptions::headless())?;
//! let workbook = session.add_workbook()?;
//! let sheet = workbook.sheet(0)?;
//! sheet.write_cell(1, 1, "Total")?;
//! sheet.write_cell(1, 2, 42.5)?;
//! assert_eq!(sheet.read_cell(1, 2)?, "42.50");
//!
//! // Any property reachable from a range, by path
//! let cell = sheet.cell(1, 1)?;
//! cell.put_one(&["Font", "Bold"], true)?;
//! let summary = cell.get(&["Font", "Size,Bold"])?;
//!
//! workbook.save_as("C:\\out\\report.xlsx", None)?;
//! session.quit();
//! ```

pub mod collection;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod options;
pub mod path;
pub mod session;
pub mod sheet;
pub mod workbook;

pub use collection::ItemRef;
pub use dispatch::{Dispatch, HandleChain};
pub use error::{Error, Fault, OrPanic, Result};
pub use format::{FileFormat, UnknownFormat};
pub use options::{AppOptions, AppSetting, Calculation, SessionConfig};
pub use session::Session;
pub use sheet::{Range, Sheet};
pub use workbook::Workbook;

pub use excel_ole_core::{CellAddress, CellError, CellRange, NativeValue, TaggedValue, VariantKind};
