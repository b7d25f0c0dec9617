//! Interception provider contract and an in-process provider.
//!
//! A provider routes every call of a symbol through the handler installed for
//! it. The handler answers with a [`DispatchOutcome`]: either the call was
//! handled and this is its result, or the original implementation should run.

use crate::runtime::object::ObjectRef;
use crate::runtime::symbols::SymbolKey;
use crate::Result;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// What an intercepted call resolved to
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The substitute ran; use this value as the call's result
    Handled(Value),
    /// Run the original implementation and use its result
    PassThrough,
}

/// Handler invoked synchronously for every call of an intercepted symbol.
///
/// `target` is the receiving object, or `None` for static and free calls.
pub type InterceptHandler = Rc<dyn Fn(Option<&ObjectRef>, &[Value]) -> Result<DispatchOutcome>>;

/// The low-level interception primitive.
pub trait InterceptionProvider {
    /// Install `handler` for `key`, replacing any previous one; `None` removes it.
    fn register(&self, key: &SymbolKey, handler: Option<InterceptHandler>);
}

/// In-process provider: a table of handlers that instrumented code calls through.
///
/// Cloning yields another handle to the same table.
#[derive(Clone, Default)]
pub struct InterceptTable {
    handlers: Rc<RefCell<HashMap<SymbolKey, InterceptHandler>>>,
}

impl InterceptTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle usable as the router's provider
    pub fn provider(&self) -> Rc<dyn InterceptionProvider> {
        Rc::new(self.clone())
    }

    /// Check if a handler is installed for `key`
    pub fn is_intercepted(&self, key: &SymbolKey) -> bool {
        self.handlers.borrow().contains_key(key)
    }

    /// Number of installed handlers
    pub fn len(&self) -> usize {
        self.handlers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.borrow().is_empty()
    }

    /// Call `key` through its handler, falling back to `original`.
    ///
    /// `original` runs when no handler is installed or when the handler answers
    /// [`DispatchOutcome::PassThrough`].
    pub fn invoke<F>(
        &self,
        key: &SymbolKey,
        target: Option<&ObjectRef>,
        args: &[Value],
        original: F,
    ) -> Result<Value>
    where
        F: FnOnce(&[Value]) -> Result<Value>,
    {
        // The handler may reenter the table, so the borrow must end here.
        let handler = self.handlers.borrow().get(key).cloned();
        let Some(handler) = handler else {
            return original(args);
        };

        match handler(target, args)? {
            DispatchOutcome::Handled(value) => Ok(value),
            DispatchOutcome::PassThrough => original(args),
        }
    }
}

impl InterceptionProvider for InterceptTable {
    fn register(&self, key: &SymbolKey, handler: Option<InterceptHandler>) {
        let mut handlers = self.handlers.borrow_mut();
        match handler {
            Some(handler) => {
                handlers.insert(key.clone(), handler);
            }
            None => {
                handlers.remove(key);
            }
        }
    }
}
