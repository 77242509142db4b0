//! Indexing into automation collections (`Workbooks`, `Worksheets`, `Sheets`).

use std::fmt;

use excel_ole_core::{decode, TaggedValue};

use crate::dispatch::Dispatch;
use crate::error::{Error, Fault, Result};

/// Identifies one member of a collection.
///
/// Indices are 0-based here and converted to the collection's 1-based numbering on
/// the way out. Negative indices are rejected when used.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemRef {
    Index(i64),
    Name(String),
}

impl ItemRef {
    /// Read an identifier as written by a user: all digits is a 0-based index,
    /// anything else a name.
    pub fn parse(s: &str) -> Self {
        match s.trim().parse::<u32>() {
            Ok(index) => ItemRef::Index(index.into()),
            Err(_) => ItemRef::Name(s.to_string()),
        }
    }

    /// The argument to pass to `Item` or to an indexed collection property.
    pub fn to_arg(&self, operation: &'static str) -> Result<TaggedValue> {
        match self {
            ItemRef::Index(index) if *index < 0 => {
                Err(Error::bad_argument(operation, format!("negative index {index}")))
            }
            ItemRef::Index(index) => index
                .checked_add(1)
                .and_then(|n| i32::try_from(n).ok())
                .map(TaggedValue::i4)
                .ok_or_else(|| Error::bad_argument(operation, format!("index {index} out of range"))),
            ItemRef::Name(name) if name.is_empty() => {
                Err(Error::bad_argument(operation, "empty name"))
            }
            ItemRef::Name(name) => Ok(TaggedValue::bstr(name)),
        }
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemRef::Index(index) => write!(f, "#{index}"),
            ItemRef::Name(name) => write!(f, "'{name}'"),
        }
    }
}

impl From<i32> for ItemRef {
    fn from(index: i32) -> Self {
        ItemRef::Index(index.into())
    }
}

impl From<i64> for ItemRef {
    fn from(index: i64) -> Self {
        ItemRef::Index(index)
    }
}

impl From<u32> for ItemRef {
    fn from(index: u32) -> Self {
        ItemRef::Index(index.into())
    }
}

impl From<usize> for ItemRef {
    fn from(index: usize) -> Self {
        ItemRef::Index(i64::try_from(index).unwrap_or(i64::MAX))
    }
}

impl From<&str> for ItemRef {
    fn from(name: &str) -> Self {
        ItemRef::Name(name.to_string())
    }
}

impl From<String> for ItemRef {
    fn from(name: String) -> Self {
        ItemRef::Name(name)
    }
}

/// Read a collection's `Count`.
pub(crate) fn count<D: Dispatch>(collection: &D, operation: &'static str) -> Result<usize> {
    let raw = collection
        .get_property("Count", &[])
        .map_err(Error::automation(operation))?;
    let value = decode(&raw).map_err(Error::decode(operation))?;
    value
        .as_i64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| Error::Automation {
            operation,
            source: Fault::new(format!("Count returned {}", value.type_name())),
        })
}

/// Fetch one member through the collection's `Item` property.
pub(crate) fn item<D: Dispatch>(collection: &D, id: &ItemRef, operation: &'static str) -> Result<D> {
    let arg = id.to_arg(operation)?;
    collection
        .get_object("Item", &[arg])
        .map_err(Error::automation(operation))
}

/// Fetch every member, in collection order.
pub(crate) fn items<D: Dispatch>(collection: &D, operation: &'static str) -> Result<Vec<D>> {
    let total = count(collection, operation)?;
    (0..total)
        .map(|index| item(collection, &ItemRef::from(index), operation))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(ItemRef::parse("2"), ItemRef::Index(2));
        assert_eq!(ItemRef::parse("Sheet1"), ItemRef::Name("Sheet1".into()));
        assert_eq!(ItemRef::parse("-1"), ItemRef::Name("-1".into()));
    }

    #[test]
    fn test_args_are_one_based() {
        assert_eq!(ItemRef::Index(0).to_arg("t").unwrap(), TaggedValue::i4(1));
        assert_eq!(
            ItemRef::from("Data").to_arg("t").unwrap(),
            TaggedValue::bstr("Data")
        );
        assert!(ItemRef::from(u32::MAX).to_arg("t").is_err());
        assert!(ItemRef::from(-1).to_arg("t").is_err());
        assert!(ItemRef::from("").to_arg("t").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ItemRef::Index(3).to_string(), "#3");
        assert_eq!(ItemRef::from("Data").to_string(), "'Data'");
    }
}
