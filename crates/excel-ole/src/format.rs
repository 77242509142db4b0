//! File formats accepted by `SaveAs`.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// First application version whose `XlFileFormat` ids include the OpenXML formats.
pub const OPENXML_VERSION: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FileFormat {
    /// Unicode text
    Txt,
    Csv,
    Html,
    /// OpenXML workbook
    Xlsx,
    /// Legacy binary workbook
    Xls,
}

impl FileFormat {
    pub const ALL: [FileFormat; 5] = [
        FileFormat::Txt,
        FileFormat::Csv,
        FileFormat::Html,
        FileFormat::Xlsx,
        FileFormat::Xls,
    ];

    /// Short name, which is also the file extension.
    pub fn name(self) -> &'static str {
        match self {
            FileFormat::Txt => "txt",
            FileFormat::Csv => "csv",
            FileFormat::Html => "html",
            FileFormat::Xlsx => "xlsx",
            FileFormat::Xls => "xls",
        }
    }

    /// `XlFileFormat` id for version 12 and later.
    pub fn code(self) -> i32 {
        match self {
            FileFormat::Txt => -4158,
            FileFormat::Csv => 6,
            FileFormat::Html => 44,
            FileFormat::Xlsx => 51,
            FileFormat::Xls => 56,
        }
    }

    /// Constant name and id used before version 12. `None` for xlsx, which older
    /// versions cannot write.
    pub fn legacy(self) -> Option<(&'static str, i32)> {
        match self {
            FileFormat::Txt => Some(("xlUnicodeText", -4158)),
            FileFormat::Csv => Some(("xlCSV", 6)),
            FileFormat::Html => Some(("xlHTML", 44)),
            FileFormat::Xls => Some(("xlNormal", -4143)),
            FileFormat::Xlsx => None,
        }
    }

    /// The id to pass to `SaveAs` on the given application version.
    pub fn code_for_version(self, version: f64) -> Option<i32> {
        if version >= OPENXML_VERSION {
            Some(self.code())
        } else {
            self.legacy().map(|(_, code)| code)
        }
    }

    /// Infer from a path's extension, case-insensitively.
    pub fn from_path(path: impl AsRef<Path>) -> Option<FileFormat> {
        let ext = path.as_ref().extension()?.to_str()?;
        ext.parse().ok()
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown file format '{0}' (expected txt, csv, html, xlsx or xls)")]
pub struct UnknownFormat(pub String);

impl FromStr for FileFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().trim_start_matches('.').to_ascii_lowercase();
        FileFormat::ALL
            .into_iter()
            .find(|format| format.name() == lower)
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(FileFormat::Txt.code(), -4158);
        assert_eq!(FileFormat::Csv.code(), 6);
        assert_eq!(FileFormat::Html.code(), 44);
        assert_eq!(FileFormat::Xlsx.code(), 51);
        assert_eq!(FileFormat::Xls.code(), 56);
    }

    #[test]
    fn test_legacy_versions() {
        assert_eq!(FileFormat::Xls.code_for_version(11.0), Some(-4143));
        assert_eq!(FileFormat::Xls.code_for_version(16.0), Some(56));
        assert_eq!(FileFormat::Xlsx.code_for_version(11.0), None);
        assert_eq!(FileFormat::Csv.legacy(), Some(("xlCSV", 6)));
    }

    #[test]
    fn test_parse() {
        assert_eq!("XLSX".parse::<FileFormat>(), Ok(FileFormat::Xlsx));
        assert_eq!(".csv".parse::<FileFormat>(), Ok(FileFormat::Csv));
        assert!("ods".parse::<FileFormat>().is_err());
    }

    #[test]
    fn test_from_path() {
        assert_eq!(FileFormat::from_path("C:\\out\\report.Xls"), Some(FileFormat::Xls));
        assert_eq!(FileFormat::from_path("data.txt"), Some(FileFormat::Txt));
        assert_eq!(FileFormat::from_path("noext"), None);
    }
}
