//! In-memory object model for exercising excel-ole without an application.
//!
//! A [`Node`] is one object: named properties, child objects reachable by property,
//! and objects or values returned by methods. Members are keyed by name, or by
//! `Name(arg,...)` when called with arguments, e.g. `Range(A1)` or `Item(2)`.
//! Every handle handed out is a [`MockObject`] that records its release in the
//! shared [`Registry`].

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use excel_ole::{Dispatch, Fault, TaggedValue};
use excel_ole_core::{decode, stringify};

/// Shared log of what the code under test did.
#[derive(Default)]
pub struct Registry {
    pub acquired: Cell<usize>,
    pub released: RefCell<Vec<String>>,
    pub calls: RefCell<Vec<String>>,
}

impl Registry {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn released(&self) -> Vec<String> {
        self.released.borrow().clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Calls whose log entry starts with `prefix`.
    pub fn calls_matching(&self, prefix: &str) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .cloned()
            .collect()
    }

    pub fn outstanding(&self) -> usize {
        self.acquired.get() - self.released.borrow().len()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    fn log(&self, entry: String) {
        self.calls.borrow_mut().push(entry);
    }
}

#[derive(Default)]
pub struct Node {
    pub name: String,
    props: RefCell<HashMap<String, TaggedValue>>,
    children: RefCell<HashMap<String, Rc<Node>>>,
    method_values: RefCell<HashMap<String, TaggedValue>>,
    method_objects: RefCell<HashMap<String, Rc<Node>>>,
    rejected: RefCell<HashSet<String>>,
}

impl Node {
    pub fn new(name: &str) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_string(),
            ..Self::default()
        })
    }

    pub fn set_prop(&self, key: &str, value: TaggedValue) -> &Self {
        self.props.borrow_mut().insert(key.to_string(), value);
        self
    }

    pub fn prop(&self, key: &str) -> Option<TaggedValue> {
        self.props.borrow().get(key).cloned()
    }

    pub fn add_child(&self, key: &str, child: &Rc<Node>) -> &Self {
        self.children
            .borrow_mut()
            .insert(key.to_string(), Rc::clone(child));
        self
    }

    pub fn on_call(&self, key: &str, value: TaggedValue) -> &Self {
        self.method_values
            .borrow_mut()
            .insert(key.to_string(), value);
        self
    }

    pub fn on_call_object(&self, key: &str, child: &Rc<Node>) -> &Self {
        self.method_objects
            .borrow_mut()
            .insert(key.to_string(), Rc::clone(child));
        self
    }

    /// Make any access to `key` fail.
    pub fn reject(&self, key: &str) -> &Self {
        self.rejected.borrow_mut().insert(key.to_string());
        self
    }

    /// Give this node `Count` and `Item(i)` members over `items`.
    pub fn collection(&self, items: &[&Rc<Node>]) -> &Self {
        self.set_prop("Count", TaggedValue::i4(items.len() as i32));
        for (i, item) in items.iter().enumerate() {
            self.add_child(&format!("Item({})", i + 1), item);
            self.add_child(&format!("Item({})", item.name), item);
        }
        self
    }
}

fn render(arg: &TaggedValue) -> String {
    match decode(arg) {
        Ok(value) => stringify(&value),
        Err(err) => format!("<{err}>"),
    }
}

fn key(name: &str, args: &[TaggedValue]) -> String {
    if args.is_empty() {
        name.to_string()
    } else {
        let args: Vec<String> = args.iter().map(render).collect();
        format!("{name}({})", args.join(","))
    }
}

/// A handle onto a [`Node`].
pub struct MockObject {
    pub node: Rc<Node>,
    registry: Rc<Registry>,
}

impl MockObject {
    /// A handle to `node` that counts as acquired.
    pub fn root(node: &Rc<Node>, registry: &Rc<Registry>) -> Self {
        registry.acquired.set(registry.acquired.get() + 1);
        Self {
            node: Rc::clone(node),
            registry: Rc::clone(registry),
        }
    }

    fn check(&self, key: &str, base: &str) -> Result<(), Fault> {
        let rejected = self.node.rejected.borrow();
        if rejected.contains(key) || rejected.contains(base) {
            return Err(Fault::with_code(
                0x8002_0009_u32 as i32,
                format!("{}.{key} raised an exception", self.node.name),
            ));
        }
        Ok(())
    }

    fn unknown(&self, key: &str) -> Fault {
        Fault::with_code(
            0x8002_0006_u32 as i32,
            format!("unknown name '{key}' on {}", self.node.name),
        )
    }
}

impl Dispatch for MockObject {
    fn get_property(&self, name: &str, args: &[TaggedValue]) -> Result<TaggedValue, Fault> {
        let key = key(name, args);
        self.registry.log(format!("get {key}"));
        self.check(&key, name)?;
        self.node.prop(&key).ok_or_else(|| self.unknown(&key))
    }

    fn get_object(&self, name: &str, args: &[TaggedValue]) -> Result<Self, Fault> {
        let key = key(name, args);
        self.registry.log(format!("get {key}"));
        self.check(&key, name)?;
        let child = self
            .node
            .children
            .borrow()
            .get(&key)
            .cloned()
            .ok_or_else(|| self.unknown(&key))?;
        Ok(MockObject::root(&child, &self.registry))
    }

    fn put_property(&self, name: &str, value: TaggedValue) -> Result<(), Fault> {
        self.registry
            .log(format!("put {name}={}", render(&value)));
        self.check(name, name)?;
        self.node.set_prop(name, value);
        Ok(())
    }

    fn call_method(&self, name: &str, args: &[TaggedValue]) -> Result<TaggedValue, Fault> {
        let key = key(name, args);
        self.registry.log(format!("call {key}"));
        self.check(&key, name)?;
        let values = self.node.method_values.borrow();
        Ok(values
            .get(&key)
            .or_else(|| values.get(name))
            .cloned()
            .unwrap_or_else(TaggedValue::empty))
    }

    fn call_object(&self, name: &str, args: &[TaggedValue]) -> Result<Self, Fault> {
        let key = key(name, args);
        self.registry.log(format!("call {key}"));
        self.check(&key, name)?;
        let objects = self.node.method_objects.borrow();
        let child = objects
            .get(&key)
            .or_else(|| objects.get(name))
            .cloned()
            .ok_or_else(|| self.unknown(&key))?;
        Ok(MockObject::root(&child, &self.registry))
    }
}

impl Drop for MockObject {
    fn drop(&mut self) {
        self.registry
            .released
            .borrow_mut()
            .push(self.node.name.clone());
    }
}

/// A running application with one workbook holding two sheets.
pub struct Fixture {
    pub registry: Rc<Registry>,
    pub app: Rc<Node>,
    pub workbooks: Rc<Node>,
    pub book: Rc<Node>,
    pub new_book: Rc<Node>,
    pub worksheets: Rc<Node>,
    pub sheet1: Rc<Node>,
    pub sheet2: Rc<Node>,
    pub new_sheet: Rc<Node>,
    pub a1: Rc<Node>,
    pub font: Rc<Node>,
    pub block: Rc<Node>,
}

impl Fixture {
    pub fn new(version: &str) -> Self {
        let registry = Registry::new();
        let app = Node::new("Application");
        let workbooks = Node::new("Workbooks");
        let book = Node::new("Book1");
        let new_book = Node::new("Book2");
        let worksheets = Node::new("Worksheets");
        let sheet1 = Node::new("Sheet1");
        let sheet2 = Node::new("Data");
        let new_sheet = Node::new("Sheet3");
        let a1 = Node::new("A1");
        let font = Node::new("Font");
        let block = Node::new("A1:B2");

        app.set_prop("Version", TaggedValue::bstr(version))
            .add_child("Workbooks", &workbooks)
            .add_child("ActiveWorkbook", &book)
            .add_child("Worksheets", &worksheets)
            .add_child("Worksheets(1)", &sheet1)
            .add_child("Worksheets(Data)", &sheet2);

        workbooks
            .collection(&[&book])
            .on_call_object("Add", &new_book)
            .on_call_object("Open", &book);

        book.set_prop("Name", TaggedValue::bstr("Book1.xlsx"))
            .add_child("Worksheets", &worksheets);
        new_book.set_prop("Name", TaggedValue::bstr("Book2"));

        worksheets
            .collection(&[&sheet1, &sheet2])
            .on_call_object("Add", &new_sheet);

        sheet1
            .set_prop("Name", TaggedValue::bstr("Sheet1"))
            .add_child("Range(A1)", &a1)
            .add_child("Range(A1:B2)", &block);
        sheet2.set_prop("Name", TaggedValue::bstr("Data"));
        new_sheet.set_prop("Name", TaggedValue::bstr("Sheet3"));

        a1.set_prop("Value", TaggedValue::bstr("Total"))
            .set_prop("Formula", TaggedValue::bstr("=SUM(B1:B9)"))
            .add_child("Font", &font);
        font.set_prop("Size", TaggedValue::r8(11.0))
            .set_prop("Bold", TaggedValue::bool(false));

        Self {
            registry,
            app,
            workbooks,
            book,
            new_book,
            worksheets,
            sheet1,
            sheet2,
            new_sheet,
            a1,
            font,
            block,
        }
    }

    /// A fresh handle to the application root.
    pub fn app_handle(&self) -> MockObject {
        MockObject::root(&self.app, &self.registry)
    }
}
