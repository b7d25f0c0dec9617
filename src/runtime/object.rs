use crate::{MockError, Result, TargetKind};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of a live object.
///
/// Ids are handed out once from a process-wide counter and never reused, so two
/// distinct objects never share an id even if one of them has been dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Allocate the identity for a newly created object
    pub fn fresh() -> Self {
        Self(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Reference to a live object as seen by the interception engine.
///
/// Equality and hashing go through the identity only; the runtime type name is
/// carried along so object-level mocks can resolve the declaring symbol.
#[derive(Debug, Clone)]
pub struct ObjectRef {
    id: ObjectId,
    class: Rc<str>,
}

impl ObjectRef {
    /// Create a reference for a brand new object of the given runtime type
    pub fn new(class: &str) -> Self {
        Self {
            id: ObjectId::fresh(),
            class: Rc::from(class),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Runtime type of the object
    pub fn class(&self) -> &str {
        &self.class
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ObjectRef {}

impl Hash for ObjectRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.class, self.id)
    }
}

/// Anything a caller may hand to an object-level mock.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Null,
    /// A plain value, e.g. a number or a string
    Value(Value),
    Object(ObjectRef),
}

impl Target {
    /// Resolve to an object, failing for `null` and non-object values
    pub fn resolve(&self, method: &str) -> Result<&ObjectRef> {
        match self {
            Target::Object(object) => Ok(object),
            Target::Null => Err(MockError::InvalidTarget {
                method: method.to_string(),
                target: TargetKind::Null,
            }),
            Target::Value(_) => Err(MockError::InvalidTarget {
                method: method.to_string(),
                target: TargetKind::NonObject,
            }),
        }
    }
}

impl From<ObjectRef> for Target {
    fn from(object: ObjectRef) -> Self {
        Target::Object(object)
    }
}

impl From<&ObjectRef> for Target {
    fn from(object: &ObjectRef) -> Self {
        Target::Object(object.clone())
    }
}

impl From<Value> for Target {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Target::Null,
            other => Target::Value(other),
        }
    }
}

impl From<Option<ObjectRef>> for Target {
    fn from(object: Option<ObjectRef>) -> Self {
        object.map_or(Target::Null, Target::Object)
    }
}
