//! Fixture classes.
//!
//! Every method routes through the interception table before running its
//! original body, so it can be mocked like a method of an instrumented runtime.

use crate::FixtureEnv;
use interpose::{ObjectRef, Result, Value};
use serde_json::json;
use std::ops::Deref;

/// Value standing for an object in call results
pub fn object_value(object: &ObjectRef) -> Value {
    json!({ "class": object.class(), "id": object.id().as_u64() })
}

fn first(args: &[Value]) -> Value {
    args.first().cloned().unwrap_or(Value::Null)
}

pub struct TestClass {
    env: FixtureEnv,
    object: ObjectRef,
}

impl TestClass {
    pub fn new(env: &FixtureEnv) -> Self {
        Self::of_class(env, "TestClass")
    }

    fn of_class(env: &FixtureEnv, class: &str) -> Self {
        Self {
            env: env.clone(),
            object: ObjectRef::new(class),
        }
    }

    pub fn object(&self) -> &ObjectRef {
        &self.object
    }

    pub fn return_input(&self, input: Value) -> Result<Value> {
        self.call("returnInput", &[input], |args| Ok(first(args)))
    }

    pub fn return_this(&self) -> Result<Value> {
        let this = object_value(&self.object);
        self.call("returnThis", &[], move |_| Ok(this))
    }

    /// Runs `callback`; the mocked method receives it as its only argument
    pub fn return_callback_result(
        &self,
        callback: impl Fn() -> Result<Value> + 'static,
    ) -> Result<Value> {
        let handle = self.env.store_callback(callback);
        let env = self.env.clone();
        self.call("returnCallbackResult", &[handle], move |args| {
            env.run_callback(&first(args))
        })
    }

    /// Calls `protectedReturnInput`, which calls `privateReturnInput`
    pub fn public_return_input(&self, input: Value) -> Result<Value> {
        self.call("publicReturnInput", &[input], |args| {
            self.protected_return_input(first(args))
        })
    }

    fn protected_return_input(&self, input: Value) -> Result<Value> {
        self.call("protectedReturnInput", &[input], |args| {
            self.private_return_input(first(args))
        })
    }

    fn private_return_input(&self, input: Value) -> Result<Value> {
        self.call("privateReturnInput", &[input], |args| Ok(first(args)))
    }

    pub fn overridden_return_input(&self, input: Value) -> Result<Value> {
        self.call("overriddenReturnInput", &[input], |args| Ok(first(args)))
    }

    /// Creates a fresh `TestClass` and calls `publicReturnInput` on it
    pub fn static_return_input(env: &FixtureEnv, input: Value) -> Result<Value> {
        static_return_input_on(env, "TestClass", input)
    }

    pub fn overridden_static_return_input(env: &FixtureEnv, input: Value) -> Result<Value> {
        env.call_static("TestClass", "overriddenStaticReturnInput", &[input], |args| {
            Ok(first(args))
        })
    }

    pub fn trait_static_return_input(env: &FixtureEnv, input: Value) -> Result<Value> {
        env.call_static("TestClass", "traitStaticReturnInput", &[input], |args| {
            Ok(first(args))
        })
    }

    fn call<F>(&self, method: &str, args: &[Value], original: F) -> Result<Value>
    where
        F: FnOnce(&[Value]) -> Result<Value>,
    {
        self.env.call_method(&self.object, method, args, original)
    }
}

fn static_return_input_on(env: &FixtureEnv, class: &str, input: Value) -> Result<Value> {
    env.call_static(class, "staticReturnInput", &[input], |args| {
        TestClass::new(env).public_return_input(first(args))
    })
}

/// `TestClass` subclass overriding the `overridden*` methods
pub struct ChildClass(TestClass);

impl ChildClass {
    pub fn new(env: &FixtureEnv) -> Self {
        Self(TestClass::of_class(env, "ChildClass"))
    }

    pub fn static_return_input(env: &FixtureEnv, input: Value) -> Result<Value> {
        static_return_input_on(env, "ChildClass", input)
    }

    pub fn overridden_static_return_input(env: &FixtureEnv, input: Value) -> Result<Value> {
        env.call_static("ChildClass", "overriddenStaticReturnInput", &[input], |args| {
            Ok(first(args))
        })
    }
}

impl Deref for ChildClass {
    type Target = TestClass;

    fn deref(&self) -> &TestClass {
        &self.0
    }
}

pub struct AnotherClass {
    env: FixtureEnv,
    object: ObjectRef,
}

impl AnotherClass {
    pub fn new(env: &FixtureEnv) -> Self {
        Self {
            env: env.clone(),
            object: ObjectRef::new("AnotherClass"),
        }
    }

    pub fn object(&self) -> &ObjectRef {
        &self.object
    }

    pub fn another_return_input(&self, input: Value) -> Result<Value> {
        self.env
            .call_method(&self.object, "anotherReturnInput", &[input], |args| {
                Ok(first(args))
            })
    }

    pub fn another_static_return_input(env: &FixtureEnv, input: Value) -> Result<Value> {
        env.call_static("AnotherClass", "anotherStaticReturnInput", &[input], |args| {
            Ok(first(args))
        })
    }
}
