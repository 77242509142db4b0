//! Worksheets and ranges.

use excel_ole_core::{decode, stringify, CellAddress, CellRange, NativeValue, TaggedValue};

use crate::dispatch::Dispatch;
use crate::error::{Error, Result};
use crate::path;

/// Read a property as text, stringifying anything that is not already a string.
pub(crate) fn text_property<D: Dispatch>(
    handle: &D,
    property: &str,
    operation: &'static str,
) -> Result<String> {
    let raw = handle
        .get_property(property, &[])
        .map_err(Error::automation(operation))?;
    match decode(&raw).map_err(Error::decode(operation))? {
        NativeValue::String(text) => Ok(text),
        other => Ok(stringify(&other)),
    }
}

/// Call a method and discard its result.
pub(crate) fn invoke<D: Dispatch>(
    handle: &D,
    method: &str,
    args: &[TaggedValue],
    operation: &'static str,
) -> Result<()> {
    handle
        .call_method(method, args)
        .map(drop)
        .map_err(Error::automation(operation))
}

/// A worksheet.
pub struct Sheet<D: Dispatch> {
    handle: D,
}

impl<D: Dispatch> Sheet<D> {
    pub(crate) fn new(handle: D) -> Self {
        Self { handle }
    }

    /// The underlying handle, for property-path access.
    pub fn handle(&self) -> &D {
        &self.handle
    }

    pub fn name(&self) -> Result<String> {
        text_property(&self.handle, "Name", "sheet_name")
    }

    pub fn rename(&self, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::bad_argument("rename_sheet", "empty sheet name"));
        }
        self.handle
            .put_property("Name", TaggedValue::bstr(name))
            .map_err(Error::automation("rename_sheet"))
    }

    pub fn select(&self) -> Result<()> {
        invoke(&self.handle, "Select", &[], "select_sheet")
    }

    pub fn activate(&self) -> Result<()> {
        invoke(&self.handle, "Activate", &[], "activate_sheet")
    }

    /// Delete the sheet from its workbook. With alerts enabled the application asks
    /// for confirmation first.
    pub fn delete(self) -> Result<()> {
        invoke(&self.handle, "Delete", &[], "delete_sheet")
    }

    /// A single cell by 1-based row and column.
    pub fn cell(&self, row: u32, col: u32) -> Result<Range<D>> {
        let addr = CellAddress::new(row, col).map_err(Error::address("cell"))?;
        self.open_range(CellRange::single(addr), "cell")
    }

    /// A range from an A1-style reference, e.g. `"B2"` or `"A1:C3"`.
    pub fn range(&self, reference: &str) -> Result<Range<D>> {
        let range = CellRange::parse(reference).map_err(Error::address("range"))?;
        self.open_range(range, "range")
    }

    fn open_range(&self, range: CellRange, operation: &'static str) -> Result<Range<D>> {
        let reference = range.to_a1_string();
        let handle = self
            .handle
            .get_object("Range", &[TaggedValue::bstr(&reference)])
            .map_err(Error::automation(operation))?;
        tracing::debug!(reference = %reference, "acquired range");
        Ok(Range { handle, range })
    }

    pub fn cell_value(&self, row: u32, col: u32) -> Result<NativeValue> {
        self.cell(row, col)?.value()
    }

    pub fn set_cell_value(&self, row: u32, col: u32, value: &NativeValue) -> Result<()> {
        self.cell(row, col)?.set_value(value.clone())
    }

    /// Read a cell as text, using the uniform value formatting.
    pub fn read_cell(&self, row: u32, col: u32) -> Result<String> {
        self.cell_value(row, col).map(|value| stringify(&value))
    }

    /// Write anything convertible to a [`NativeValue`] into a cell.
    pub fn write_cell(&self, row: u32, col: u32, value: impl Into<NativeValue>) -> Result<()> {
        self.cell(row, col)?.set_value(value)
    }

    /// All values of a range, row-major.
    pub fn range_values(&self, reference: &str) -> Result<Vec<Vec<NativeValue>>> {
        self.range(reference)?.values()
    }

    /// Write a grid whose top-left corner is `origin`. Short rows are padded with
    /// empty cells.
    pub fn set_range_values(&self, origin: CellAddress, grid: Vec<Vec<NativeValue>>) -> Result<()> {
        let rows = grid.len();
        let cols = grid.iter().map(Vec::len).max().unwrap_or(0);
        if rows == 0 || cols == 0 {
            return Err(Error::bad_argument("set_range_values", "no value supplied"));
        }
        let (Ok(rows), Ok(cols)) = (u32::try_from(rows), u32::try_from(cols)) else {
            return Err(Error::bad_argument("set_range_values", "grid too large"));
        };
        let range =
            CellRange::from_origin(origin, rows, cols).map_err(Error::address("set_range_values"))?;
        self.open_range(range, "set_range_values")?.set_values(grid)
    }
}

/// A cell or rectangular range on a sheet.
///
/// The handle is released when the range is dropped.
pub struct Range<D: Dispatch> {
    handle: D,
    range: CellRange,
}

impl<D: Dispatch> Range<D> {
    pub fn handle(&self) -> &D {
        &self.handle
    }

    /// The address this range was opened with.
    pub fn address(&self) -> CellRange {
        self.range
    }

    pub fn value(&self) -> Result<NativeValue> {
        path::get_value(&self.handle)
    }

    pub fn set_value(&self, value: impl Into<NativeValue>) -> Result<()> {
        path::put_value(&self.handle, value)
    }

    /// The range's values as a grid. A single cell yields a 1x1 grid.
    pub fn values(&self) -> Result<Vec<Vec<NativeValue>>> {
        match self.value()? {
            NativeValue::Array(rows) => Ok(rows),
            scalar => Ok(vec![vec![scalar]]),
        }
    }

    pub fn set_values(&self, grid: Vec<Vec<NativeValue>>) -> Result<()> {
        path::put_value(&self.handle, NativeValue::Array(grid))
    }

    /// The formula in A1 notation; a constant's text when the cell has no formula.
    pub fn formula(&self) -> Result<String> {
        text_property(&self.handle, "Formula", "formula")
    }

    pub fn set_formula(&self, formula: &str) -> Result<()> {
        self.handle
            .put_property("Formula", TaggedValue::bstr(formula))
            .map_err(Error::automation("set_formula"))
    }

    /// See [`path::get`].
    pub fn get(&self, path: &[&str]) -> Result<NativeValue> {
        path::get(&self.handle, path)
    }

    pub fn get_one(&self, path: &[&str]) -> Result<NativeValue> {
        path::get_one(&self.handle, path)
    }

    pub fn get_many(&self, path: &[&str], keys: &[&str]) -> Result<String> {
        path::get_many(&self.handle, path, keys)
    }

    pub fn put_one(&self, path: &[&str], value: impl Into<NativeValue>) -> Result<()> {
        path::put_one(&self.handle, path, value)
    }

    pub fn put_many(&self, path: &[&str], pairs: &[(&str, NativeValue)]) -> Result<()> {
        path::put_many(&self.handle, path, pairs)
    }
}
