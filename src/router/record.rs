use crate::runtime::{DispatchOutcome, ObjectId, ObjectRef};
use crate::Result;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::rc::Rc;

/// User supplied substitute: receives the call target and arguments
pub type MockCallback = Rc<dyn Fn(Option<&ObjectRef>, &[Value]) -> Result<Value>>;

/// A single intercepted call
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CallRecord {
    pub args: Vec<Value>,
    /// Receiving object, `None` for static and free calls
    pub target: Option<ObjectId>,
}

/// What runs in place of the original implementation
#[derive(Clone)]
pub enum Behavior {
    /// Record the call and let the original run
    Spy,
    /// Record the call and return `null` without running the original
    Noop,
    /// Record the call and return the callback's result
    Custom(MockCallback),
}

impl Behavior {
    /// Wrap a closure as a custom behavior
    pub fn custom<F>(callback: F) -> Self
    where
        F: Fn(Option<&ObjectRef>, &[Value]) -> Result<Value> + 'static,
    {
        Behavior::Custom(Rc::new(callback))
    }

    /// Behavior that always answers `value`
    pub fn returning(value: Value) -> Self {
        Self::custom(move |_, _| Ok(value.clone()))
    }

    pub fn invoke(&self, target: Option<&ObjectRef>, args: &[Value]) -> Result<DispatchOutcome> {
        match self {
            Behavior::Spy => Ok(DispatchOutcome::PassThrough),
            Behavior::Noop => Ok(DispatchOutcome::Handled(Value::Null)),
            Behavior::Custom(callback) => callback(target, args).map(DispatchOutcome::Handled),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Behavior::Spy => "spy",
            Behavior::Noop => "noop",
            Behavior::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Substitute behavior plus the history of calls routed to it
#[derive(Debug)]
pub struct MockRecord {
    behavior: Behavior,
    calls: Vec<CallRecord>,
}

impl MockRecord {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: Vec::new(),
        }
    }

    /// Append the call and hand back the behavior to run
    pub fn record(&mut self, target: Option<&ObjectRef>, args: &[Value]) -> Behavior {
        self.calls.push(CallRecord {
            args: args.to_vec(),
            target: target.map(ObjectRef::id),
        });
        self.behavior.clone()
    }

    pub fn calls(&self) -> &[CallRecord] {
        &self.calls
    }
}
