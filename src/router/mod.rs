//! Mock routing: which mock, if any, handles an intercepted call.
//!
//! The router owns every mock record, keyed by [`SymbolKey`]:
//!
//! - class-level records apply to every instance and to static or free calls
//! - object-level records apply only to the objects present in the map
//!
//! A key never has both kinds at once. On the first registration for a key the
//! router installs a handler with the [`InterceptionProvider`]; the handler
//! calls back into [`MockRouter::dispatch`].

pub mod context;
pub mod record;

pub use context::{CallContextStack, ContextFrame};
pub use record::{Behavior, CallRecord, MockCallback, MockRecord};

use crate::logging;
use crate::runtime::{
    DispatchOutcome, InterceptHandler, InterceptionProvider, ObjectId, ObjectRef, SymbolKey,
    SymbolTable, Target,
};
use crate::{Conflict, MockError, Missing, Result};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

#[derive(Default)]
struct MockTables {
    class_level: HashMap<SymbolKey, MockRecord>,
    object_level: HashMap<SymbolKey, HashMap<ObjectId, MockRecord>>,
}

struct RouterInner {
    symbols: SymbolTable,
    provider: Rc<dyn InterceptionProvider>,
    tables: RefCell<MockTables>,
    context: CallContextStack,
}

/// Routes intercepted calls to mock records and keeps their call history.
///
/// Cloning yields another handle to the same router. No internal borrow is
/// held while a substitute runs, so substitutes may call other mocked symbols.
#[derive(Clone)]
pub struct MockRouter {
    inner: Rc<RouterInner>,
}

impl MockRouter {
    pub fn new(symbols: SymbolTable, provider: Rc<dyn InterceptionProvider>) -> Self {
        Self {
            inner: Rc::new(RouterInner {
                symbols,
                provider,
                tables: RefCell::new(MockTables::default()),
                context: CallContextStack::new(),
            }),
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.inner.symbols
    }

    /// Mock `class::method` for every instance and for static calls.
    ///
    /// `class` must be the type that declares `method`.
    pub fn register_class_level(
        &self,
        class: &str,
        method: &str,
        behavior: Behavior,
    ) -> Result<SymbolKey> {
        let key = self.inner.symbols.class_method_key(class, method, true)?;
        self.install_class_level(key, behavior, Conflict::Method)
    }

    /// Mock a free function by its fully qualified name
    pub fn register_global(&self, name: &str, behavior: Behavior) -> Result<SymbolKey> {
        let key = self.inner.symbols.function_key(name)?;
        self.install_class_level(key, behavior, Conflict::Function)
    }

    /// Mock `method` for one object only.
    ///
    /// The key is resolved from the object's runtime type; other instances keep
    /// running the original implementation.
    pub fn register_object_level(
        &self,
        target: &Target,
        method: &str,
        behavior: Behavior,
    ) -> Result<(SymbolKey, ObjectRef)> {
        let object = target.resolve(method)?;
        let key = self
            .inner
            .symbols
            .class_method_key(object.class(), method, false)?;
        let behavior_name = behavior.name();

        let first_for_key = {
            let mut tables = self.inner.tables.borrow_mut();
            if tables.class_level.contains_key(&key) {
                return Err(MockError::AlreadyMocked {
                    symbol: key.to_string(),
                    conflict: Conflict::ClassLevel,
                });
            }
            let objects = tables.object_level.entry(key.clone()).or_default();
            if objects.contains_key(&object.id()) {
                return Err(MockError::AlreadyMocked {
                    symbol: key.to_string(),
                    conflict: Conflict::Object,
                });
            }
            let first = objects.is_empty();
            objects.insert(object.id(), MockRecord::new(behavior));
            first
        };

        if first_for_key {
            self.intercept(&key);
        }
        logging::log_object_mock_installed(&key, object.id(), behavior_name);
        Ok((key, object.clone()))
    }

    /// Entry point for the provider's handler.
    ///
    /// Class-level records win over object-level ones; an object without a
    /// record passes through without being recorded.
    pub fn dispatch(
        &self,
        key: &SymbolKey,
        target: Option<&ObjectRef>,
        args: &[Value],
    ) -> Result<DispatchOutcome> {
        let behavior = {
            let mut guard = self.inner.tables.borrow_mut();
            let tables = &mut *guard;
            if let Some(record) = tables.class_level.get_mut(key) {
                record.record(target, args)
            } else if let Some(objects) = tables.object_level.get_mut(key) {
                let Some(object) = target else {
                    return Err(MockError::StaticViaObjectMock(key.to_string()));
                };
                match objects.get_mut(&object.id()) {
                    Some(record) => record.record(target, args),
                    None => {
                        logging::log_pass_through(key);
                        return Ok(DispatchOutcome::PassThrough);
                    }
                }
            } else {
                logging::log_pass_through(key);
                return Ok(DispatchOutcome::PassThrough);
            }
        };

        logging::log_dispatch(key, target.map(ObjectRef::id), behavior.name());
        let _frame = self.inner.context.enter(target);
        behavior.invoke(target, args)
    }

    /// Call history of a class-level (`identity == None`) or object-level record
    pub fn calls(&self, key: &SymbolKey, identity: Option<ObjectId>) -> Result<Vec<CallRecord>> {
        self.with_record(key, identity, |record| record.calls().to_vec())
    }

    pub fn num_calls(&self, key: &SymbolKey, identity: Option<ObjectId>) -> Result<usize> {
        self.with_record(key, identity, |record| record.calls().len())
    }

    /// Arguments of the `index`-th call, in call order
    pub fn args_for_call(
        &self,
        key: &SymbolKey,
        identity: Option<ObjectId>,
        index: usize,
    ) -> Result<Vec<Value>> {
        self.with_record(key, identity, |record| {
            let calls = record.calls();
            calls
                .get(index)
                .map(|call| call.args.clone())
                .ok_or(MockError::IndexOutOfRange {
                    index,
                    total: calls.len(),
                })
        })?
    }

    /// Remove a class-level or free function record and its provider handler
    pub fn unregister_class_level(&self, key: &SymbolKey) -> Result<()> {
        let removed = self.inner.tables.borrow_mut().class_level.remove(key);
        let Some(record) = removed else {
            return Err(Self::not_mocked(key, None));
        };

        self.inner.provider.register(key, None);
        logging::log_mock_removed(key, record.calls().len());
        Ok(())
    }

    /// Remove one object's record; the handler goes once no object is left
    pub fn unregister_object_level(&self, key: &SymbolKey, identity: ObjectId) -> Result<()> {
        let (record, last_for_key) = {
            let mut tables = self.inner.tables.borrow_mut();
            let objects = tables
                .object_level
                .get_mut(key)
                .ok_or_else(|| Self::not_mocked(key, Some(Missing::ObjectLevel)))?;
            let record = objects
                .remove(&identity)
                .ok_or_else(|| Self::not_mocked(key, Some(Missing::Object)))?;
            let last = objects.is_empty();
            if last {
                tables.object_level.remove(key);
            }
            (record, last)
        };

        if last_for_key {
            self.inner.provider.register(key, None);
        }
        logging::log_mock_removed(key, record.calls().len());
        Ok(())
    }

    /// The object whose instance method callback is currently running
    pub fn current_object(&self) -> Result<ObjectRef> {
        self.inner.context.current()
    }

    pub fn context_depth(&self) -> usize {
        self.inner.context.depth()
    }

    /// Number of symbols with any active mock
    pub fn num_mock_keys(&self) -> usize {
        let tables = self.inner.tables.borrow();
        tables.class_level.len() + tables.object_level.len()
    }

    /// All mocked symbols, sorted
    pub fn mocked_keys(&self) -> Vec<SymbolKey> {
        let tables = self.inner.tables.borrow();
        let mut keys: Vec<SymbolKey> = tables
            .class_level
            .keys()
            .chain(tables.object_level.keys())
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    fn install_class_level(
        &self,
        key: SymbolKey,
        behavior: Behavior,
        conflict: Conflict,
    ) -> Result<SymbolKey> {
        let behavior_name = behavior.name();
        {
            let mut tables = self.inner.tables.borrow_mut();
            if tables.class_level.contains_key(&key) || tables.object_level.contains_key(&key) {
                return Err(MockError::AlreadyMocked {
                    symbol: key.to_string(),
                    conflict,
                });
            }
            tables
                .class_level
                .insert(key.clone(), MockRecord::new(behavior));
        }

        self.intercept(&key);
        logging::log_mock_installed(&key, behavior_name);
        Ok(key)
    }

    fn intercept(&self, key: &SymbolKey) {
        let router: Weak<RouterInner> = Rc::downgrade(&self.inner);
        let dispatch_key = key.clone();
        let handler: InterceptHandler =
            Rc::new(move |target: Option<&ObjectRef>, args: &[Value]| {
                match router.upgrade() {
                    Some(inner) => MockRouter { inner }.dispatch(&dispatch_key, target, args),
                    None => Ok(DispatchOutcome::PassThrough),
                }
            });
        self.inner.provider.register(key, Some(handler));
    }

    fn with_record<T>(
        &self,
        key: &SymbolKey,
        identity: Option<ObjectId>,
        f: impl FnOnce(&MockRecord) -> T,
    ) -> Result<T> {
        let tables = self.inner.tables.borrow();
        match identity {
            None => tables
                .class_level
                .get(key)
                .map(f)
                .ok_or_else(|| Self::not_mocked(key, None)),
            Some(id) => {
                let objects = tables
                    .object_level
                    .get(key)
                    .ok_or_else(|| Self::not_mocked(key, Some(Missing::ObjectLevel)))?;
                objects
                    .get(&id)
                    .map(f)
                    .ok_or_else(|| Self::not_mocked(key, Some(Missing::Object)))
            }
        }
    }

    fn not_mocked(key: &SymbolKey, reason: Option<Missing>) -> MockError {
        let reason = reason.unwrap_or(if key.is_function() {
            Missing::Function
        } else {
            Missing::ClassLevel
        });
        MockError::NotMocked {
            symbol: key.to_string(),
            reason,
        }
    }
}
