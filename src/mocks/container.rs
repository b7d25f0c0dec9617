use crate::mocks::{Deactivatable, FunctionMock};
use crate::router::{Behavior, MockRouter};
use crate::runtime::{ObjectRef, Target};
use crate::{MockError, Missing, Result};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone)]
enum ContainerTarget {
    Class(String),
    Object(Target),
}

/// Groups method mocks on one class or one object so they can be deactivated
/// together.
pub struct MethodMockContainer {
    router: MockRouter,
    target: ContainerTarget,
    methods: RefCell<HashMap<String, Rc<FunctionMock>>>,
    deactivated: Cell<bool>,
}

impl MethodMockContainer {
    /// Container for class-level mocks on `class`
    pub fn for_class(router: &MockRouter, class: &str) -> Self {
        Self::new(router, ContainerTarget::Class(class.to_string()))
    }

    /// Container for object-level mocks on `target`.
    ///
    /// The target is validated when the first method is mocked.
    pub fn for_object(router: &MockRouter, target: Target) -> Self {
        Self::new(router, ContainerTarget::Object(target))
    }

    fn new(router: &MockRouter, target: ContainerTarget) -> Self {
        Self {
            router: router.clone(),
            target,
            methods: RefCell::new(HashMap::new()),
            deactivated: Cell::new(false),
        }
    }

    /// Replace `method` with `callback`
    pub fn mock_method<F>(&self, method: &str, callback: F) -> Result<Rc<FunctionMock>>
    where
        F: Fn(Option<&ObjectRef>, &[Value]) -> Result<Value> + 'static,
    {
        self.install(method, Behavior::custom(callback))
    }

    pub fn spy_method(&self, method: &str) -> Result<Rc<FunctionMock>> {
        self.install(method, Behavior::Spy)
    }

    pub fn noop_method(&self, method: &str) -> Result<Rc<FunctionMock>> {
        self.install(method, Behavior::Noop)
    }

    /// The handle created for `method` by this container
    pub fn get_method_mock(&self, method: &str) -> Result<Rc<FunctionMock>> {
        self.methods
            .borrow()
            .get(method)
            .cloned()
            .ok_or_else(|| MockError::NotMocked {
                symbol: method.to_string(),
                reason: Missing::ContainerMethod,
            })
    }

    /// Names of the methods mocked through this container, sorted
    pub fn mocked_methods(&self) -> Vec<String> {
        let mut names: Vec<String> = self.methods.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    fn install(&self, method: &str, behavior: Behavior) -> Result<Rc<FunctionMock>> {
        if self.deactivated.get() {
            return Err(MockError::UseAfterDeactivation);
        }

        let mock = match &self.target {
            ContainerTarget::Class(class) => {
                FunctionMock::class_method(&self.router, class, method, behavior)?
            }
            ContainerTarget::Object(target) => {
                FunctionMock::object_method(&self.router, target, method, behavior)?
            }
        };
        let mock = Rc::new(mock);
        self.methods
            .borrow_mut()
            .insert(method.to_string(), Rc::clone(&mock));
        Ok(mock)
    }
}

impl Deactivatable for MethodMockContainer {
    /// Deactivate every child and forget them.
    ///
    /// All children are attempted; the first failure is returned.
    fn deactivate(&self) -> Result<()> {
        self.deactivated.set(true);
        let children: Vec<Rc<FunctionMock>> =
            self.methods.borrow_mut().drain().map(|(_, mock)| mock).collect();

        let mut first_error = None;
        for child in children {
            if let Err(e) = child.deactivate() {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn is_deactivated(&self) -> bool {
        self.deactivated.get()
    }
}

impl fmt::Debug for MethodMockContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodMockContainer")
            .field("target", &self.target)
            .field("methods", &self.mocked_methods())
            .field("deactivated", &self.deactivated.get())
            .finish()
    }
}
