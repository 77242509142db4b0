//! Property-path access over a [`Dispatch`] root.
//!
//! A path such as `["Font", "Size"]` is walked one property at a time: every segment
//! but the last is fetched as an object off the previous handle, and the last is read
//! or assigned on the handle reached. Intermediate handles live in a [`HandleChain`]
//! and are released innermost first on every exit path.
//!
//! A segment may carry one index argument, `Range(B2)` or `Worksheets(2)`. The argument
//! is sent as a 32-bit integer when it parses as one and as a string otherwise.
//! Commas inside the parentheses belong to the argument, so `Item(1,2)` is one key.
//!
//! An empty path addresses the root's default `Value` property.

use excel_ole_core::{decode, encode, stringify, NativeValue, TaggedValue};

use crate::dispatch::{Dispatch, HandleChain};
use crate::error::{Error, Fault, Result};

/// Property read or written when a path is empty.
pub const DEFAULT_PROPERTY: &str = "Value";

/// Separates sibling keys in the final segment of a multi-get.
pub const KEY_DELIMITER: char = ',';

/// Separates `key:value` entries in a multi-get summary.
pub const SUMMARY_SEPARATOR: &str = ", ";

/// A parsed path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub name: &'a str,
    pub arg: Option<SegmentArg<'a>>,
}

/// The index argument of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentArg<'a> {
    Index(i32),
    Key(&'a str),
}

impl<'a> Segment<'a> {
    /// Split `Name(arg)` into its name and argument. Quotes around a string argument
    /// are stripped; `Name()` has no argument.
    pub fn parse(raw: &'a str) -> Self {
        let raw = raw.trim();
        let Some(open) = raw.find('(') else {
            return Self {
                name: raw,
                arg: None,
            };
        };
        let Some(inner) = raw[open + 1..].strip_suffix(')') else {
            return Self {
                name: raw,
                arg: None,
            };
        };

        let inner = inner.trim();
        let arg = if inner.is_empty() {
            None
        } else if let Ok(index) = inner.parse::<i32>() {
            Some(SegmentArg::Index(index))
        } else {
            Some(SegmentArg::Key(inner.trim_matches('"')))
        };

        Self {
            name: raw[..open].trim(),
            arg,
        }
    }

    /// Arguments to pass along with the property access.
    pub fn args(&self) -> Vec<TaggedValue> {
        match self.arg {
            None => Vec::new(),
            Some(SegmentArg::Index(index)) => vec![TaggedValue::i4(index)],
            Some(SegmentArg::Key(key)) => vec![TaggedValue::bstr(key)],
        }
    }
}

/// Split a final segment on the commas outside parentheses.
///
/// Returns `None` when there is no such comma, i.e. the segment names a single key.
pub fn split_keys(raw: &str) -> Option<Vec<&str>> {
    let mut keys = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in raw.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            KEY_DELIMITER if depth == 0 => {
                keys.push(raw[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    if keys.is_empty() {
        return None;
    }
    keys.push(raw[start..].trim());
    keys.retain(|k| !k.is_empty());
    Some(keys)
}

fn describe(path: &[&str]) -> String {
    if path.is_empty() {
        DEFAULT_PROPERTY.to_string()
    } else {
        path.join(".")
    }
}

fn walk_error(operation: &'static str, path: &[&str], segment: &str) -> impl FnOnce(Fault) -> Error {
    let path = describe(path);
    let segment = segment.to_string();
    move |source| Error::Walk {
        operation,
        path,
        segment,
        source,
    }
}

/// Acquire a handle for each of `segments` in turn, starting at `root`.
///
/// `path` is the full path being accessed, for error messages.
pub fn walk<'r, D: Dispatch>(
    root: &'r D,
    segments: &[&str],
    path: &[&str],
    operation: &'static str,
) -> Result<HandleChain<'r, D>> {
    let mut chain = HandleChain::new(root);
    for raw in segments {
        let segment = Segment::parse(raw);
        let next = chain
            .target()
            .get_object(segment.name, &segment.args())
            .map_err(walk_error(operation, path, raw))?;
        chain.push(next);
        tracing::debug!(operation, segment = %raw, depth = chain.depth(), "acquired handle");
    }
    Ok(chain)
}

fn read_key<D: Dispatch>(
    target: &D,
    raw: &str,
    path: &[&str],
    operation: &'static str,
) -> Result<NativeValue> {
    let segment = Segment::parse(raw);
    let value = target
        .get_property(segment.name, &segment.args())
        .map_err(walk_error(operation, path, raw))?;
    decode(&value).map_err(Error::decode(operation))
}

fn assignable<'a>(raw: &'a str, operation: &'static str) -> Result<&'a str> {
    let segment = Segment::parse(raw);
    if segment.name.is_empty() {
        return Err(Error::bad_argument(operation, "empty property name"));
    }
    if segment.arg.is_some() {
        return Err(Error::bad_argument(
            operation,
            format!("indexed property '{raw}' cannot be assigned"),
        ));
    }
    Ok(segment.name)
}

/// Read and decode the root's default `Value` property.
pub fn get_value<D: Dispatch>(root: &D) -> Result<NativeValue> {
    read_key(root, DEFAULT_PROPERTY, &[], "get_value")
}

/// Walk all but the last segment of `path`, then read the last one.
///
/// An empty path reads the default `Value` property.
pub fn get_one<D: Dispatch>(root: &D, path: &[&str]) -> Result<NativeValue> {
    let Some((last, parents)) = path.split_last() else {
        return get_value(root);
    };
    let chain = walk(root, parents, path, "get_one")?;
    read_key(chain.target(), last, path, "get_one")
}

/// Walk the whole of `path`, then read each of `keys` off the handle reached.
///
/// Returns a read-only summary `"key:value, key:value"` with each value stringified.
pub fn get_many<D: Dispatch>(root: &D, path: &[&str], keys: &[&str]) -> Result<String> {
    if keys.is_empty() {
        return Err(Error::bad_argument("get_many", "no keys requested"));
    }
    let joined = keys.join(",");
    let full: Vec<&str> = path.iter().copied().chain([joined.as_str()]).collect();
    let chain = walk(root, path, &full, "get_many")?;

    let mut entries = Vec::with_capacity(keys.len());
    for key in keys {
        let value = read_key(chain.target(), key, &full, "get_many")?;
        entries.push(format!("{}:{}", key.trim(), stringify(&value)));
    }
    Ok(entries.join(SUMMARY_SEPARATOR))
}

/// Read a path, accepting a comma-separated list of keys in the final segment.
///
/// `["Font", "Size"]` reads one value. `["Font", "Size,Bold"]` returns the
/// [`get_many`] summary as a [`NativeValue::String`].
pub fn get<D: Dispatch>(root: &D, path: &[&str]) -> Result<NativeValue> {
    let Some((last, parents)) = path.split_last() else {
        return get_value(root);
    };
    match split_keys(last) {
        Some(keys) => get_many(root, parents, &keys).map(NativeValue::String),
        None => get_one(root, path),
    }
}

/// Write the root's default `Value` property.
pub fn put_value<D: Dispatch>(root: &D, value: impl Into<NativeValue>) -> Result<()> {
    let value = encode(&value.into());
    root.put_property(DEFAULT_PROPERTY, value)
        .map_err(walk_error("put_value", &[], DEFAULT_PROPERTY))
}

/// Walk all but the last segment of `path`, then assign `value` to the last one.
///
/// An empty path writes the default `Value` property.
pub fn put_one<D: Dispatch>(root: &D, path: &[&str], value: impl Into<NativeValue>) -> Result<()> {
    let Some((last, parents)) = path.split_last() else {
        return put_value(root, value);
    };
    let name = assignable(last, "put_one")?;
    let chain = walk(root, parents, path, "put_one")?;
    tracing::debug!(path = %describe(path), "assigning property");
    chain
        .target()
        .put_property(name, encode(&value.into()))
        .map_err(walk_error("put_one", path, last))
}

/// Walk the whole of `path`, then assign every `(key, value)` pair on the handle
/// reached, in order.
///
/// Keys are validated and the path is walked before anything is assigned. The first
/// failing assignment aborts the rest and is returned.
pub fn put_many<D: Dispatch>(root: &D, path: &[&str], pairs: &[(&str, NativeValue)]) -> Result<()> {
    if pairs.is_empty() {
        return Err(Error::bad_argument("put_many", "no value supplied"));
    }
    let names = pairs
        .iter()
        .map(|(key, _)| assignable(key, "put_many"))
        .collect::<Result<Vec<_>>>()?;

    let chain = walk(root, path, path, "put_many")?;
    for (name, (key, value)) in names.into_iter().zip(pairs) {
        let full: Vec<&str> = path.iter().copied().chain([*key]).collect();
        chain
            .target()
            .put_property(name, encode(value))
            .map_err(walk_error("put_many", &full, key))?;
        tracing::debug!(path = %describe(&full), "assigned property");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_parse() {
        assert_eq!(
            Segment::parse("Font"),
            Segment {
                name: "Font",
                arg: None
            }
        );
        assert_eq!(
            Segment::parse("Worksheets(2)"),
            Segment {
                name: "Worksheets",
                arg: Some(SegmentArg::Index(2))
            }
        );
        assert_eq!(
            Segment::parse(" Range( B2:C3 ) "),
            Segment {
                name: "Range",
                arg: Some(SegmentArg::Key("B2:C3"))
            }
        );
        assert_eq!(
            Segment::parse("Worksheets(\"Data\")"),
            Segment {
                name: "Worksheets",
                arg: Some(SegmentArg::Key("Data"))
            }
        );
        assert_eq!(Segment::parse("Calculate()").arg, None);
        // Unbalanced parentheses are left alone
        assert_eq!(Segment::parse("Odd(1").name, "Odd(1");
    }

    #[test]
    fn test_segment_args() {
        assert_eq!(Segment::parse("Item(3)").args(), vec![TaggedValue::i4(3)]);
        assert_eq!(Segment::parse("Range(A1)").args(), vec![TaggedValue::bstr("A1")]);
        assert!(Segment::parse("Value").args().is_empty());
    }

    #[test]
    fn test_split_keys() {
        assert_eq!(split_keys("Size"), None);
        assert_eq!(split_keys("Item(1,2)"), None);
        assert_eq!(split_keys("Size, Bold"), Some(vec!["Size", "Bold"]));
        assert_eq!(split_keys("Size,Item(1,2)"), Some(vec!["Size", "Item(1,2)"]));
        assert_eq!(split_keys("Size,"), Some(vec!["Size"]));
    }

    #[test]
    fn test_assignable() {
        assert_eq!(assignable("Size", "t").unwrap(), "Size");
        assert!(assignable("Item(1)", "t").is_err());
        assert!(assignable("  ", "t").is_err());
    }
}
