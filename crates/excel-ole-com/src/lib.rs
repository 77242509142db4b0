//! COM adapter for excel-ole.
//!
//! Implements [`excel_ole::Dispatch`] over `IDispatch` late binding and starts
//! sessions against a locally installed application. On targets other than
//! Windows this crate is empty.
//!
//! # Example
//!
//! ```rust,ignore
//! use excel_ole::{OrPanic, SessionConfig};
//!
//! let session = excel_ole_com::start(SessionConfig::headless())?;
//! let workbook = session.open_workbook("C:\\data\\input.xlsx")?;
//! let sheet = workbook.sheet("Data")?;
//! println!("B2 = {}", sheet.read_cell(2, 2).or_panic());
//! workbook.save_as("C:\\data\\output.csv", None)?;
//! session.quit();
//! ```
//!
//! A session and everything obtained from it must stay on the thread that
//! started it.

mod apartment;
mod object;
mod session;
mod variant;

#[cfg(windows)]
pub use apartment::ComApartment;
#[cfg(windows)]
pub use object::ComObject;
#[cfg(windows)]
pub use session::{start, ComSession};
#[cfg(windows)]
pub use variant::{from_variant, to_variant};
