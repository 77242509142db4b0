//! The capability interface the rest of the crate is written against.
//!
//! Anything that can get and put named properties and call named methods on a remote
//! object can drive a [`crate::Session`]: the COM adapter in `excel-ole-com`, or a mock
//! in tests.

use excel_ole_core::TaggedValue;

use crate::error::Fault;

/// A handle to an object in a late-bound object model.
///
/// Handles are owned: dropping one releases the underlying reference exactly once.
/// Every method is a synchronous round trip; implementations are not expected to be
/// usable from more than one thread.
pub trait Dispatch: Sized {
    /// Read a property. `args` are index arguments, e.g. `Worksheets(2)`.
    fn get_property(&self, name: &str, args: &[TaggedValue]) -> Result<TaggedValue, Fault>;

    /// Read a property that holds an object, acquiring a new handle to it.
    fn get_object(&self, name: &str, args: &[TaggedValue]) -> Result<Self, Fault>;

    /// Assign a property.
    fn put_property(&self, name: &str, value: TaggedValue) -> Result<(), Fault>;

    /// Call a method, arguments in natural order.
    fn call_method(&self, name: &str, args: &[TaggedValue]) -> Result<TaggedValue, Fault>;

    /// Call a method that returns an object, acquiring a new handle to it.
    fn call_object(&self, name: &str, args: &[TaggedValue]) -> Result<Self, Fault>;
}

/// Handles acquired while walking from a borrowed root towards a target.
///
/// Step *i + 1* is always read off the handle from step *i*. When the chain goes out
/// of scope, on success or on an early `?` return, the held handles are released
/// innermost first. The root is borrowed and never released here.
pub struct HandleChain<'r, D> {
    root: &'r D,
    held: Vec<D>,
}

impl<'r, D> HandleChain<'r, D> {
    pub fn new(root: &'r D) -> Self {
        Self {
            root,
            held: Vec::new(),
        }
    }

    /// Take ownership of the next handle in the chain.
    pub fn push(&mut self, handle: D) {
        self.held.push(handle);
    }

    /// The innermost handle, or the root if nothing has been acquired yet.
    pub fn target(&self) -> &D {
        self.held.last().unwrap_or(self.root)
    }

    /// Number of handles held (the root is not counted).
    pub fn depth(&self) -> usize {
        self.held.len()
    }
}

impl<D> Drop for HandleChain<'_, D> {
    fn drop(&mut self) {
        while let Some(handle) = self.held.pop() {
            drop(handle);
            tracing::trace!(depth = self.held.len(), "released walk handle");
        }
    }
}
