use crate::mocks::Deactivatable;
use crate::router::{Behavior, CallRecord, MockRouter};
use crate::runtime::{ObjectId, ObjectRef, SymbolKey, Target};
use crate::{MockError, Result};
use serde_json::Value;
use std::cell::Cell;
use std::fmt;

/// Handle to one mocked class method, object method or free function.
///
/// Call history stays readable until the handle is deactivated; after that
/// every accessor fails with [`MockError::UseAfterDeactivation`].
pub struct FunctionMock {
    router: MockRouter,
    key: SymbolKey,
    /// Set for object-level mocks only
    object: Option<ObjectRef>,
    deactivated: Cell<bool>,
}

impl FunctionMock {
    /// Mock `class::method` for all instances and static calls
    pub fn class_method(
        router: &MockRouter,
        class: &str,
        method: &str,
        behavior: Behavior,
    ) -> Result<Self> {
        let key = router.register_class_level(class, method, behavior)?;
        Ok(Self::new(router, key, None))
    }

    /// Mock `method` for the object behind `target` only
    pub fn object_method(
        router: &MockRouter,
        target: &Target,
        method: &str,
        behavior: Behavior,
    ) -> Result<Self> {
        let (key, object) = router.register_object_level(target, method, behavior)?;
        Ok(Self::new(router, key, Some(object)))
    }

    pub fn global_function(router: &MockRouter, name: &str, behavior: Behavior) -> Result<Self> {
        let key = router.register_global(name, behavior)?;
        Ok(Self::new(router, key, None))
    }

    fn new(router: &MockRouter, key: SymbolKey, object: Option<ObjectRef>) -> Self {
        Self {
            router: router.clone(),
            key,
            object,
            deactivated: Cell::new(false),
        }
    }

    pub fn key(&self) -> &SymbolKey {
        &self.key
    }

    /// The mocked object, for object-level mocks
    pub fn object(&self) -> Option<&ObjectRef> {
        self.object.as_ref()
    }

    pub fn calls(&self) -> Result<Vec<CallRecord>> {
        self.ensure_active()?;
        self.router.calls(&self.key, self.identity())
    }

    pub fn num_calls(&self) -> Result<usize> {
        self.ensure_active()?;
        self.router.num_calls(&self.key, self.identity())
    }

    /// Arguments of the `index`-th call, oldest first
    pub fn args_for_call(&self, index: usize) -> Result<Vec<Value>> {
        self.ensure_active()?;
        self.router.args_for_call(&self.key, self.identity(), index)
    }

    fn identity(&self) -> Option<ObjectId> {
        self.object.as_ref().map(ObjectRef::id)
    }

    fn ensure_active(&self) -> Result<()> {
        if self.deactivated.get() {
            return Err(MockError::UseAfterDeactivation);
        }
        Ok(())
    }
}

impl Deactivatable for FunctionMock {
    fn deactivate(&self) -> Result<()> {
        if self.deactivated.get() {
            return Ok(());
        }

        match &self.object {
            Some(object) => self.router.unregister_object_level(&self.key, object.id())?,
            None => self.router.unregister_class_level(&self.key)?,
        }
        self.deactivated.set(true);
        Ok(())
    }

    fn is_deactivated(&self) -> bool {
        self.deactivated.get()
    }
}

impl fmt::Debug for FunctionMock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionMock")
            .field("key", &self.key)
            .field("object", &self.object)
            .field("deactivated", &self.deactivated.get())
            .finish()
    }
}
