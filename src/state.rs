//! The process-wide interception state.
//!
//! [`InterceptionState`] bundles the router with the registry of long-lived
//! handles. Create one per test binary (it starts empty) and call
//! [`InterceptionState::deactivate_all`] at every suite boundary.

use crate::config::Config;
use crate::mocks::{Deactivatable, FunctionMock, MethodMockContainer, MockRegistry};
use crate::router::{Behavior, MockRouter};
use crate::runtime::{InterceptionProvider, ObjectRef, SymbolTable, Target};
use crate::Result;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// Router plus registry; cloning yields another handle to the same state.
#[derive(Clone)]
pub struct InterceptionState {
    router: MockRouter,
    registry: Rc<RefCell<MockRegistry>>,
}

impl InterceptionState {
    pub fn new(symbols: SymbolTable, provider: Rc<dyn InterceptionProvider>) -> Self {
        Self::with_config(symbols, provider, &Config::default())
    }

    pub fn with_config(
        symbols: SymbolTable,
        provider: Rc<dyn InterceptionProvider>,
        config: &Config,
    ) -> Self {
        Self {
            router: MockRouter::new(symbols, provider),
            registry: Rc::new(RefCell::new(MockRegistry::from_config(&config.registry))),
        }
    }

    pub fn router(&self) -> &MockRouter {
        &self.router
    }

    /// Container for class-level method mocks on `class`
    pub fn mock_class(&self, class: &str) -> Rc<MethodMockContainer> {
        self.track(MethodMockContainer::for_class(&self.router, class))
    }

    /// Container for method mocks on one object
    pub fn mock_object(&self, target: impl Into<Target>) -> Rc<MethodMockContainer> {
        self.track(MethodMockContainer::for_object(&self.router, target.into()))
    }

    pub fn mock_class_method<F>(
        &self,
        class: &str,
        method: &str,
        callback: F,
    ) -> Result<Rc<FunctionMock>>
    where
        F: Fn(Option<&ObjectRef>, &[Value]) -> Result<Value> + 'static,
    {
        self.class_method(class, method, Behavior::custom(callback))
    }

    pub fn mock_object_method<F>(
        &self,
        target: impl Into<Target>,
        method: &str,
        callback: F,
    ) -> Result<Rc<FunctionMock>>
    where
        F: Fn(Option<&ObjectRef>, &[Value]) -> Result<Value> + 'static,
    {
        self.object_method(target.into(), method, Behavior::custom(callback))
    }

    pub fn mock_global_function<F>(&self, name: &str, callback: F) -> Result<Rc<FunctionMock>>
    where
        F: Fn(Option<&ObjectRef>, &[Value]) -> Result<Value> + 'static,
    {
        self.global_function(name, Behavior::custom(callback))
    }

    /// Record calls to `class::method` and keep running the original
    pub fn spy_class_method(&self, class: &str, method: &str) -> Result<Rc<FunctionMock>> {
        self.class_method(class, method, Behavior::Spy)
    }

    pub fn spy_object_method(
        &self,
        target: impl Into<Target>,
        method: &str,
    ) -> Result<Rc<FunctionMock>> {
        self.object_method(target.into(), method, Behavior::Spy)
    }

    pub fn spy_global_function(&self, name: &str) -> Result<Rc<FunctionMock>> {
        self.global_function(name, Behavior::Spy)
    }

    /// Record calls to `class::method` and return `null` instead
    pub fn noop_class_method(&self, class: &str, method: &str) -> Result<Rc<FunctionMock>> {
        self.class_method(class, method, Behavior::Noop)
    }

    pub fn noop_object_method(
        &self,
        target: impl Into<Target>,
        method: &str,
    ) -> Result<Rc<FunctionMock>> {
        self.object_method(target.into(), method, Behavior::Noop)
    }

    pub fn noop_global_function(&self, name: &str) -> Result<Rc<FunctionMock>> {
        self.global_function(name, Behavior::Noop)
    }

    /// Deactivate every registered handle and empty the registry.
    ///
    /// The registry borrow is released before any handle runs, so handles may
    /// be dropped or created from within deactivation.
    pub fn deactivate_all(&self) -> Result<()> {
        let mut drained = {
            let mut registry = self.registry.borrow_mut();
            let fresh = MockRegistry::with_limits(registry.soft_limit(), registry.prune_interval());
            std::mem::replace(&mut *registry, fresh)
        };
        drained.deactivate_all()
    }

    /// The object whose instance method callback is running
    pub fn current_object(&self) -> Result<ObjectRef> {
        self.router.current_object()
    }

    pub fn num_mock_keys(&self) -> usize {
        self.router.num_mock_keys()
    }

    /// Number of handles awaiting [`deactivate_all`](Self::deactivate_all)
    pub fn num_registered(&self) -> usize {
        self.registry.borrow().len()
    }

    fn class_method(
        &self,
        class: &str,
        method: &str,
        behavior: Behavior,
    ) -> Result<Rc<FunctionMock>> {
        let mock = FunctionMock::class_method(&self.router, class, method, behavior)?;
        Ok(self.track(mock))
    }

    fn object_method(
        &self,
        target: Target,
        method: &str,
        behavior: Behavior,
    ) -> Result<Rc<FunctionMock>> {
        let mock = FunctionMock::object_method(&self.router, &target, method, behavior)?;
        Ok(self.track(mock))
    }

    fn global_function(&self, name: &str, behavior: Behavior) -> Result<Rc<FunctionMock>> {
        let mock = FunctionMock::global_function(&self.router, name, behavior)?;
        Ok(self.track(mock))
    }

    fn track<T: Deactivatable + 'static>(&self, handle: T) -> Rc<T> {
        let handle = Rc::new(handle);
        self.registry.borrow_mut().register(handle.clone());
        handle
    }
}
