//! Open workbooks.

use std::path::Path;

use excel_ole_core::TaggedValue;

use crate::collection::{self, ItemRef};
use crate::dispatch::Dispatch;
use crate::error::{Error, Result};
use crate::format::FileFormat;
use crate::sheet::{invoke, text_property, Sheet};

/// A workbook open in a session.
pub struct Workbook<D: Dispatch> {
    handle: D,
    version: f64,
}

impl<D: Dispatch> Workbook<D> {
    pub(crate) fn new(handle: D, version: f64) -> Self {
        Self { handle, version }
    }

    pub fn handle(&self) -> &D {
        &self.handle
    }

    pub fn name(&self) -> Result<String> {
        text_property(&self.handle, "Name", "workbook_name")
    }

    pub fn activate(&self) -> Result<()> {
        invoke(&self.handle, "Activate", &[], "activate_workbook")
    }

    pub fn save(&self) -> Result<()> {
        invoke(&self.handle, "Save", &[], "save")?;
        tracing::info!("saved workbook");
        Ok(())
    }

    /// Save under a new path. Without an explicit format, the format is taken from
    /// the path's extension.
    pub fn save_as(&self, path: impl AsRef<Path>, format: Option<FileFormat>) -> Result<()> {
        let path = path.as_ref();
        let format = match format {
            Some(format) => format,
            None => FileFormat::from_path(path).ok_or_else(|| {
                Error::bad_argument(
                    "save_as",
                    format!("cannot infer a file format from '{}'", path.display()),
                )
            })?,
        };
        let code = format.code_for_version(self.version).ok_or_else(|| {
            Error::bad_argument(
                "save_as",
                format!("{format} is not supported by version {}", self.version),
            )
        })?;

        let target = path.to_string_lossy();
        invoke(
            &self.handle,
            "SaveAs",
            &[TaggedValue::bstr(&target), TaggedValue::i4(code)],
            "save_as",
        )?;
        tracing::info!(path = %target, format = %format, "saved workbook");
        Ok(())
    }

    /// Close the workbook, optionally saving changes first.
    pub fn close(self, save_changes: bool) -> Result<()> {
        invoke(
            &self.handle,
            "Close",
            &[TaggedValue::bool(save_changes)],
            "close_workbook",
        )
    }

    fn worksheets(&self, operation: &'static str) -> Result<D> {
        self.handle
            .get_object("Worksheets", &[])
            .map_err(Error::automation(operation))
    }

    pub fn sheet_count(&self) -> Result<usize> {
        collection::count(&self.worksheets("sheet_count")?, "sheet_count")
    }

    pub fn sheets(&self) -> Result<Vec<Sheet<D>>> {
        let worksheets = self.worksheets("sheets")?;
        let handles = collection::items(&worksheets, "sheets")?;
        Ok(handles.into_iter().map(Sheet::new).collect())
    }

    pub fn sheet(&self, id: impl Into<ItemRef>) -> Result<Sheet<D>> {
        let worksheets = self.worksheets("sheet")?;
        collection::item(&worksheets, &id.into(), "sheet").map(Sheet::new)
    }

    /// Insert a new worksheet, name it if a name is given, and select it.
    pub fn add_sheet(&self, name: Option<&str>) -> Result<Sheet<D>> {
        let worksheets = self.worksheets("add_sheet")?;
        let sheet = worksheets
            .call_object("Add", &[])
            .map(Sheet::new)
            .map_err(Error::automation("add_sheet"))?;
        if let Some(name) = name {
            sheet.rename(name)?;
        }
        sheet.select()?;
        tracing::debug!(name = ?name, "added sheet");
        Ok(sheet)
    }
}
