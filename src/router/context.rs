use crate::runtime::ObjectRef;
use crate::{MockError, Result};
use std::cell::RefCell;

/// One active mock callback: the receiving object, or `None` for static and
/// free function calls
pub type ContextEntry = Option<ObjectRef>;

/// Tracks which object's mock callback is currently executing.
///
/// Frames are only pushed through [`CallContextStack::enter`], whose guard pops
/// the frame again on every exit path, including unwinding.
#[derive(Debug, Default)]
pub struct CallContextStack {
    stack: RefCell<Vec<ContextEntry>>,
}

impl CallContextStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `target` for the lifetime of the returned guard
    pub fn enter(&self, target: Option<&ObjectRef>) -> ContextFrame<'_> {
        self.stack.borrow_mut().push(target.cloned());
        ContextFrame { owner: self }
    }

    /// The object whose instance method callback is running
    pub fn current(&self) -> Result<ObjectRef> {
        match self.stack.borrow().last() {
            Some(Some(object)) => Ok(object.clone()),
            _ => Err(MockError::NoCurrentContext),
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.borrow().is_empty()
    }

    /// Snapshot of the stack, innermost frame last
    pub fn frames(&self) -> Vec<ContextEntry> {
        self.stack.borrow().clone()
    }

    fn pop(&self) -> Option<ContextEntry> {
        self.stack.borrow_mut().pop()
    }
}

/// Restores the previous context when dropped
#[must_use = "the context is restored as soon as the frame is dropped"]
pub struct ContextFrame<'a> {
    owner: &'a CallContextStack,
}

impl Drop for ContextFrame<'_> {
    fn drop(&mut self) {
        self.owner.pop();
    }
}
