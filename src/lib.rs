pub mod config;
pub mod logging;
pub mod mocks;
pub mod router;
pub mod runtime;
pub mod state;
use miette::Diagnostic;
use std::fmt;

pub use mocks::{
    Deactivatable, FunctionMock, MethodMockContainer, MockRegistry, Scoped, REGISTRY_SOFT_LIMIT,
};
pub use router::{Behavior, CallRecord, MockCallback, MockRouter};
pub use runtime::{
    DispatchOutcome, InterceptHandler, InterceptTable, InterceptionProvider, ObjectId, ObjectRef,
    SymbolKey, SymbolTable, Target, TypeDef,
};
pub use serde_json::Value;
pub use state::InterceptionState;

/// Result type alias for the interception engine
pub type Result<T> = std::result::Result<T, MockError>;

/// Error types for the interception engine
///
/// The `Display` text of every variant is stable: test suites match on it.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Diagnostic)]
pub enum MockError {
    #[error("{}", already_mocked_message(.conflict, .symbol))]
    #[diagnostic(
        code(interpose::already_mocked),
        help("Deactivate the existing mock before installing a new one for the same symbol.")
    )]
    AlreadyMocked { symbol: String, conflict: Conflict },

    #[error("{}", not_mocked_message(.reason, .symbol))]
    #[diagnostic(
        code(interpose::not_mocked),
        help("Only symbols with an active mock expose call history.")
    )]
    NotMocked { symbol: String, reason: Missing },

    #[error("The {kind} `{symbol}` does not exist.")]
    #[diagnostic(
        code(interpose::symbol_not_found),
        help("Check the symbol table: functions must be registered by their fully qualified name.")
    )]
    SymbolNotFound { symbol: String, kind: SymbolKind },

    #[error("The method `{method}` cannot be resolved for {target}.")]
    #[diagnostic(
        code(interpose::invalid_target),
        help("Object-level mocks require an object target.")
    )]
    InvalidTarget { method: String, target: TargetKind },

    #[error("The method `{requested}::{method}` is declared in `{declaring}`. Please use `{declaring}::{method}` instead.")]
    #[diagnostic(
        code(interpose::declaring_class_mismatch),
        help("Class-level mocks are keyed by the type that declares the method.")
    )]
    DeclaringClassMismatch {
        requested: String,
        declaring: String,
        method: String,
    },

    #[error("The static method `{0}` was mocked through an object-level mock. Static methods may only be mocked by class-level mocks.")]
    #[diagnostic(code(interpose::static_via_object_mock))]
    StaticViaObjectMock(String),

    #[error("Cannot access index {index} of calls (total number of calls: {total}).")]
    #[diagnostic(code(interpose::index_out_of_range))]
    IndexOutOfRange { index: usize, total: usize },

    #[error("This function mock has been deactivated. Further interaction with this function mock is prohibited.")]
    #[diagnostic(
        code(interpose::use_after_deactivation),
        help("Keep the mock active until every assertion on it has run.")
    )]
    UseAfterDeactivation,

    #[error("The current object may only be accessed during the execution of an instance method mock callback.")]
    #[diagnostic(code(interpose::no_current_context))]
    NoCurrentContext,

    #[error("Mock callback failed: {0}")]
    #[diagnostic(code(interpose::callback_failed))]
    CallbackFailed(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(interpose::config),
        help("Ensure .interpose.toml is valid TOML and readable.")
    )]
    Config(String),
}

/// Which existing registration an `AlreadyMocked` error collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflict {
    /// A class-level (or object-level, for class-level registration) record exists.
    Method,
    /// Object-level registration hit an existing class-level record.
    ClassLevel,
    /// The object already has a record under this key.
    Object,
    Function,
}

fn already_mocked_message(conflict: &Conflict, symbol: &str) -> String {
    match conflict {
        Conflict::Method => format!("The method `{symbol}` has already been mocked."),
        Conflict::ClassLevel => format!("The method `{symbol}` already has a class-level mock."),
        Conflict::Object => {
            format!("The method `{symbol}` has already been mocked for this object.")
        }
        Conflict::Function => format!("The function `{symbol}` has already been mocked."),
    }
}

/// Why a `NotMocked` lookup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    ClassLevel,
    ObjectLevel,
    Object,
    Function,
    /// A container has no mock for the method name.
    ContainerMethod,
}

fn not_mocked_message(reason: &Missing, symbol: &str) -> String {
    match reason {
        Missing::ClassLevel => format!("The method `{symbol}` does not have a class-level mock."),
        Missing::ObjectLevel => {
            format!("The method `{symbol}` does not have an object-level mock.")
        }
        Missing::Object => format!("The method `{symbol}` has not been mocked for this object."),
        Missing::Function => format!("The function `{symbol}` has not been mocked."),
        Missing::ContainerMethod => format!("There is no mock for the method `{symbol}`."),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Method,
    Function,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolKind::Method => write!(f, "method"),
            SymbolKind::Function => write!(f, "function"),
        }
    }
}

/// The shape of a target that could not be resolved to an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Null,
    NonObject,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Null => write!(f, "`null`"),
            TargetKind::NonObject => write!(f, "a non-object"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_mocked_messages() {
        let err = MockError::AlreadyMocked {
            symbol: "TestClass::returnInput".to_string(),
            conflict: Conflict::ClassLevel,
        };
        assert_eq!(
            err.to_string(),
            "The method `TestClass::returnInput` already has a class-level mock."
        );

        let err = MockError::AlreadyMocked {
            symbol: "return_input".to_string(),
            conflict: Conflict::Function,
        };
        assert_eq!(
            err.to_string(),
            "The function `return_input` has already been mocked."
        );
    }

    #[test]
    fn test_diagnostic_code_and_help() {
        let err = MockError::AlreadyMocked {
            symbol: "TestClass::returnInput".to_string(),
            conflict: Conflict::Method,
        };
        assert_eq!(
            err.code().map(|code| code.to_string()).as_deref(),
            Some("interpose::already_mocked")
        );
        assert!(err
            .help()
            .map(|help| help.to_string())
            .is_some_and(|help| help.starts_with("Deactivate the existing mock")));

        let err = MockError::StaticViaObjectMock("TestClass::staticReturnInput".to_string());
        assert_eq!(
            err.code().map(|code| code.to_string()).as_deref(),
            Some("interpose::static_via_object_mock")
        );
        assert!(err.help().is_none());
    }

    #[test]
    fn test_target_and_symbol_messages() {
        let err = MockError::InvalidTarget {
            method: "returnInput".to_string(),
            target: TargetKind::Null,
        };
        assert_eq!(
            err.to_string(),
            "The method `returnInput` cannot be resolved for `null`."
        );

        let err = MockError::SymbolNotFound {
            symbol: "TestClass::nonexistentMethod".to_string(),
            kind: SymbolKind::Method,
        };
        assert_eq!(
            err.to_string(),
            "The method `TestClass::nonexistentMethod` does not exist."
        );
    }

    #[test]
    fn test_declaring_mismatch_message() {
        let err = MockError::DeclaringClassMismatch {
            requested: "ChildClass".to_string(),
            declaring: "TestClass".to_string(),
            method: "returnInput".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "The method `ChildClass::returnInput` is declared in `TestClass`. Please use `TestClass::returnInput` instead."
        );
    }
}
