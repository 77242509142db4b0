//! A session with one running application instance.

use std::path::{Path, PathBuf};

use excel_ole_core::{decode, NativeValue, TaggedValue};

use crate::collection::{self, ItemRef};
use crate::dispatch::Dispatch;
use crate::error::{Error, Fault, Result};
use crate::format::FileFormat;
use crate::options::AppOptions;
use crate::sheet::{invoke, Sheet};
use crate::workbook::Workbook;

/// Owns the application root and its `Workbooks` collection.
///
/// Workbooks, sheets and ranges obtained from a session hold their own handles and
/// release them when dropped. Call [`Session::quit`] to close the application;
/// dropping a session only releases its handles.
pub struct Session<D: Dispatch> {
    // Declared before `app` so it is released first.
    workbooks: D,
    app: D,
    version: f64,
    options: AppOptions,
}

impl<D: Dispatch> Session<D> {
    /// Take ownership of an application root: read `Workbooks` and `Version`, then
    /// push every option.
    pub fn attach(app: D, options: AppOptions) -> Result<Self> {
        let init = |source: Fault| Error::Initialize {
            operation: "attach",
            source,
        };

        let workbooks = app.get_object("Workbooks", &[]).map_err(init)?;
        let raw = app.get_property("Version", &[]).map_err(init)?;
        let version = parse_version(&raw).map_err(init)?;

        for setting in options.settings() {
            app.put_property(setting.property(), setting.value())
                .map_err(init)?;
            tracing::debug!(?setting, "applied option");
        }

        tracing::info!(version, "attached to application");
        Ok(Self {
            workbooks,
            app,
            version,
            options,
        })
    }

    /// The application root, for property-path access.
    pub fn app(&self) -> &D {
        &self.app
    }

    /// Application version, e.g. `16.0`.
    pub fn version(&self) -> f64 {
        self.version
    }

    pub fn options(&self) -> &AppOptions {
        &self.options
    }

    /// Push the settings of `next` that differ from the current options.
    ///
    /// On failure the settings pushed so far are kept and reflected in
    /// [`Session::options`].
    pub fn set_options(&mut self, next: AppOptions) -> Result<()> {
        for setting in self.options.changes(&next) {
            self.app
                .put_property(setting.property(), setting.value())
                .map_err(Error::automation("set_options"))?;
            self.options.apply(setting);
            tracing::debug!(?setting, "applied option");
        }
        Ok(())
    }

    fn workbook_from(&self, handle: D) -> Workbook<D> {
        Workbook::new(handle, self.version)
    }

    /// Create a new, empty workbook.
    pub fn add_workbook(&self) -> Result<Workbook<D>> {
        let handle = self
            .workbooks
            .call_object("Add", &[])
            .map_err(Error::automation("add_workbook"))?;
        Ok(self.workbook_from(handle))
    }

    pub fn open_workbook(&self, path: impl AsRef<Path>) -> Result<Workbook<D>> {
        let path = path.as_ref().to_string_lossy();
        if path.is_empty() {
            return Err(Error::bad_argument("open_workbook", "empty path"));
        }
        let handle = self
            .workbooks
            .call_object("Open", &[TaggedValue::bstr(&path)])
            .map_err(Error::automation("open_workbook"))?;
        tracing::info!(path = %path, "opened workbook");
        Ok(self.workbook_from(handle))
    }

    pub fn workbook_count(&self) -> Result<usize> {
        collection::count(&self.workbooks, "workbook_count")
    }

    pub fn workbooks(&self) -> Result<Vec<Workbook<D>>> {
        let handles = collection::items(&self.workbooks, "workbooks")?;
        Ok(handles.into_iter().map(|h| self.workbook_from(h)).collect())
    }

    pub fn workbook(&self, id: impl Into<ItemRef>) -> Result<Workbook<D>> {
        collection::item(&self.workbooks, &id.into(), "workbook").map(|h| self.workbook_from(h))
    }

    pub fn active_workbook(&self) -> Result<Workbook<D>> {
        let handle = self
            .app
            .get_object("ActiveWorkbook", &[])
            .map_err(Error::automation("active_workbook"))?;
        Ok(self.workbook_from(handle))
    }

    pub fn activate_workbook(&self, id: impl Into<ItemRef>) -> Result<Workbook<D>> {
        let workbook = self.workbook(id)?;
        workbook.activate()?;
        Ok(workbook)
    }

    fn worksheets(&self, operation: &'static str) -> Result<D> {
        self.app
            .get_object("Worksheets", &[])
            .map_err(Error::automation(operation))
    }

    /// Number of worksheets in the active workbook.
    pub fn sheet_count(&self) -> Result<usize> {
        collection::count(&self.worksheets("sheet_count")?, "sheet_count")
    }

    /// Worksheets of the active workbook.
    pub fn sheets(&self) -> Result<Vec<Sheet<D>>> {
        let worksheets = self.worksheets("sheets")?;
        let handles = collection::items(&worksheets, "sheets")?;
        Ok(handles.into_iter().map(Sheet::new).collect())
    }

    /// A worksheet of the active workbook.
    pub fn sheet(&self, id: impl Into<ItemRef>) -> Result<Sheet<D>> {
        let arg = id.into().to_arg("sheet")?;
        self.app
            .get_object("Worksheets", &[arg])
            .map(Sheet::new)
            .map_err(Error::automation("sheet"))
    }

    pub fn select_sheet(&self, id: impl Into<ItemRef>) -> Result<Sheet<D>> {
        let sheet = self.sheet(id)?;
        sheet.select()?;
        Ok(sheet)
    }

    /// Save every open workbook in place.
    pub fn save_all(&self) -> Result<()> {
        for workbook in self.workbooks()? {
            workbook.save()?;
        }
        Ok(())
    }

    /// Save every open workbook under `path`. With more than one workbook open, the
    /// i-th (0-based) is saved as `<stem>_<i>.<ext>`.
    pub fn save_all_as(&self, path: impl AsRef<Path>, format: Option<FileFormat>) -> Result<()> {
        let path = path.as_ref();
        let workbooks = self.workbooks()?;
        if workbooks.len() < 2 {
            for workbook in &workbooks {
                workbook.save_as(path, format)?;
            }
            return Ok(());
        }

        let format = match format {
            Some(format) => Some(format),
            None => FileFormat::from_path(path),
        };
        for (i, workbook) in workbooks.iter().enumerate() {
            workbook.save_as(numbered(path, i), format)?;
        }
        Ok(())
    }

    /// Recalculate all open workbooks.
    pub fn recalculate(&self) -> Result<()> {
        invoke(&self.app, "Calculate", &[], "recalculate")
    }

    /// Close every workbook without saving and quit the application.
    ///
    /// Teardown is best effort: faults are logged and the remaining steps still run.
    pub fn quit(self) {
        if let Err(err) = self.workbooks.call_method("Close", &[]) {
            tracing::warn!(error = %err, "closing workbooks failed during quit");
        }
        if let Err(err) = self.app.call_method("Quit", &[]) {
            tracing::warn!(error = %err, "quitting the application failed");
        }
        tracing::info!("session closed");
    }
}

fn parse_version(raw: &TaggedValue) -> std::result::Result<f64, Fault> {
    let value = decode(raw).map_err(|err| Fault::new(format!("unreadable Version: {err}")))?;
    let parsed = match &value {
        NativeValue::String(text) => text.trim().parse::<f64>().ok(),
        other => other.as_f64(),
    };
    parsed.ok_or_else(|| Fault::new(format!("unreadable Version: {value}")))
}

/// `dir/book.xlsx` -> `dir/book_<i>.xlsx`
fn numbered(path: &Path, i: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}_{i}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{i}"),
    };
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered() {
        assert_eq!(numbered(Path::new("out/book.xlsx"), 0), PathBuf::from("out/book_0.xlsx"));
        assert_eq!(numbered(Path::new("book.tar.csv"), 2), PathBuf::from("book.tar_2.csv"));
        assert_eq!(numbered(Path::new("book"), 1), PathBuf::from("book_1"));
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version(&TaggedValue::bstr("16.0")).unwrap(), 16.0);
        assert_eq!(parse_version(&TaggedValue::bstr(" 11.0 ")).unwrap(), 11.0);
        assert_eq!(parse_version(&TaggedValue::r8(12.0)).unwrap(), 12.0);
        assert!(parse_version(&TaggedValue::bstr("sixteen")).is_err());
    }
}
