//! Property-path walks against the in-memory object model.

mod common;

use common::{Fixture, MockObject, Node, Registry};
use excel_ole::path::{get, get_many, put_many, put_one, put_value};
use excel_ole::{Error, NativeValue, OrPanic, TaggedValue, VariantKind};
use pretty_assertions::assert_eq;

fn cell(fx: &Fixture) -> MockObject {
    MockObject::root(&fx.a1, &fx.registry)
}

#[test]
fn test_empty_path_reads_default_value() {
    let fx = Fixture::new("16.0");
    let root = cell(&fx);

    assert_eq!(get(&root, &[]).unwrap(), NativeValue::String("Total".into()));
    assert_eq!(fx.registry.calls(), vec!["get Value"]);
    assert!(fx.registry.released().is_empty());
}

#[test]
fn test_walks_intermediate_then_reads_last() {
    let fx = Fixture::new("16.0");
    let root = cell(&fx);

    assert_eq!(get(&root, &["Font", "Size"]).unwrap(), NativeValue::F64(11.0));
    assert_eq!(fx.registry.calls(), vec!["get Font", "get Size"]);
    assert_eq!(fx.registry.released(), vec!["Font"]);
}

#[test]
fn test_multi_get_summary() {
    let fx = Fixture::new("16.0");
    let root = cell(&fx);

    let summary = get(&root, &["Font", "Size,Bold"]).unwrap();
    assert_eq!(summary, NativeValue::String("Size:11.00, Bold:FALSE".into()));

    let summary = get_many(&root, &["Font"], &["Bold", "Size"]).unwrap();
    assert_eq!(summary, "Bold:FALSE, Size:11.00");
    assert_eq!(fx.registry.released(), vec!["Font", "Font"]);
}

#[test]
fn test_comma_inside_index_is_one_key() {
    let fx = Fixture::new("16.0");
    fx.font.set_prop("Item(1,2)", TaggedValue::i4(7));
    let root = cell(&fx);

    assert_eq!(get(&root, &["Font", "Item(1,2)"]).unwrap(), NativeValue::I32(7));
    assert_eq!(fx.registry.calls(), vec!["get Font", "get Item(1,2)"]);

    let summary = get(&root, &["Font", "Size,Item(1,2)"]).unwrap();
    assert_eq!(summary, NativeValue::String("Size:11.00, Item(1,2):7".into()));
}

#[test]
fn test_indexed_segments() {
    let fx = Fixture::new("16.0");
    let sheet = MockObject::root(&fx.sheet1, &fx.registry);

    let bold = get(&sheet, &["Range(A1)", "Font", "Bold"]).unwrap();
    assert_eq!(bold, NativeValue::Bool(false));
    assert_eq!(fx.registry.released(), vec!["Font", "A1"]);
}

#[test]
fn test_put_single_value_writes_default_property() {
    let fx = Fixture::new("16.0");
    let root = cell(&fx);

    put_value(&root, "Grand total").unwrap();
    assert_eq!(fx.a1.prop("Value"), Some(TaggedValue::bstr("Grand total")));
    assert_eq!(fx.registry.calls(), vec!["put Value=Grand total"]);
}

#[test]
fn test_put_walks_then_assigns() {
    let fx = Fixture::new("16.0");
    let root = cell(&fx);

    put_one(&root, &["Font", "Size"], 12).unwrap();
    assert_eq!(fx.font.prop("Size"), Some(TaggedValue::i4(12)));
    assert_eq!(fx.registry.released(), vec!["Font"]);
}

#[test]
fn test_put_many_assigns_every_pair() {
    let fx = Fixture::new("16.0");
    let root = cell(&fx);

    put_many(
        &root,
        &["Font"],
        &[
            ("Size", NativeValue::from(14)),
            ("Bold", NativeValue::from(true)),
        ],
    )
    .unwrap();
    assert_eq!(fx.font.prop("Size"), Some(TaggedValue::i4(14)));
    assert_eq!(fx.font.prop("Bold"), Some(TaggedValue::bool(true)));
}

#[test]
fn test_put_many_stops_at_first_failure() {
    let fx = Fixture::new("16.0");
    fx.font.reject("Bold");
    let root = cell(&fx);

    let err = put_many(
        &root,
        &["Font"],
        &[
            ("Size", NativeValue::from(14)),
            ("Bold", NativeValue::from(true)),
            ("Italic", NativeValue::from(true)),
        ],
    )
    .unwrap_err();

    match err {
        Error::Walk { segment, path, .. } => {
            assert_eq!(segment, "Bold");
            assert_eq!(path, "Font.Bold");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fx.font.prop("Size"), Some(TaggedValue::i4(14)));
    assert_eq!(fx.font.prop("Italic"), None);
    assert_eq!(fx.registry.released(), vec!["Font"]);
}

#[test]
fn test_put_many_requires_a_value() {
    let fx = Fixture::new("16.0");
    let root = cell(&fx);

    let err = put_many(&root, &["Font"], &[]).unwrap_err();
    assert!(matches!(err, Error::BadArgument { .. }));
    assert_eq!(err.to_string(), "put_many: no value supplied");
    assert!(fx.registry.calls().is_empty());
}

#[test]
fn test_indexed_property_is_not_assignable() {
    let fx = Fixture::new("16.0");
    let root = cell(&fx);

    let err = put_one(&root, &["Font", "Item(1)"], 1).unwrap_err();
    assert!(matches!(err, Error::BadArgument { .. }));
    // Rejected before anything is walked
    assert!(fx.registry.calls().is_empty());
}

fn chain() -> (std::rc::Rc<Registry>, MockObject) {
    let registry = Registry::new();
    let root = Node::new("Root");
    let a = Node::new("A");
    let b = Node::new("B");
    let c = Node::new("C");
    root.add_child("A", &a);
    a.add_child("B", &b);
    b.add_child("C", &c);
    c.set_prop("Value", TaggedValue::i4(42));
    let handle = MockObject::root(&root, &registry);
    (registry, handle)
}

#[test]
fn test_handles_released_innermost_first() {
    let (registry, root) = chain();

    assert_eq!(get(&root, &["A", "B", "C", "Value"]).unwrap(), NativeValue::I32(42));
    assert_eq!(registry.released(), vec!["C", "B", "A"]);
}

#[test]
fn test_failed_walk_releases_what_it_acquired() {
    let (registry, root) = chain();

    let err = get(&root, &["A", "B", "Missing", "Value"]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "get_one: property walk 'A.B.Missing.Value' failed at 'Missing': unknown name 'Missing' on B"
    );
    assert_eq!(registry.released(), vec!["B", "A"]);

    drop(root);
    assert_eq!(registry.outstanding(), 0);
}

#[test]
fn test_malformed_payload_is_a_decode_error() {
    let fx = Fixture::new("16.0");
    fx.a1
        .set_prop("Broken", TaggedValue::raw(VariantKind::I4, vec![1u8]));
    let root = cell(&fx);

    let err = get(&root, &["Broken"]).unwrap_err();
    assert!(matches!(err, Error::Decode { operation: "get_one", .. }));
}

#[test]
#[should_panic(expected = "unknown name 'Nope' on A1")]
fn test_or_panic_keeps_the_fault_message() {
    let fx = Fixture::new("16.0");
    let root = cell(&fx);
    get(&root, &["Nope"]).or_panic();
}
