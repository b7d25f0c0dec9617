pub mod assertions;
pub mod builder;
pub mod classes;
pub mod functions;

pub use builder::{FixtureEnv, FixtureEnvBuilder};
pub use classes::{object_value, AnotherClass, ChildClass, TestClass};

use interpose::{SymbolTable, TypeDef};

/// Fully qualified name of [`functions::return_input`]
pub const RETURN_INPUT: &str = "fixtures::return_input";
/// Fully qualified name of [`functions::return_inputs`]
pub const RETURN_INPUTS: &str = "fixtures::return_inputs";

/// Type hierarchy and function catalog of the fixtures.
///
/// `traitStaticReturnInput` comes from a trait mixed into `TestClass`, so it is
/// listed there.
pub fn fixture_symbols() -> SymbolTable {
    SymbolTable::new()
        .with_type(TypeDef::new("TestClass").methods([
            "returnInput",
            "returnThis",
            "returnCallbackResult",
            "staticReturnInput",
            "publicReturnInput",
            "protectedReturnInput",
            "privateReturnInput",
            "overriddenReturnInput",
            "overriddenStaticReturnInput",
            "traitStaticReturnInput",
        ]))
        .with_type(
            TypeDef::new("ChildClass")
                .extends("TestClass")
                .methods(["overriddenReturnInput", "overriddenStaticReturnInput"]),
        )
        .with_type(
            TypeDef::new("AnotherClass").methods(["anotherReturnInput", "anotherStaticReturnInput"]),
        )
        .with_function(RETURN_INPUT)
        .with_function(RETURN_INPUTS)
}
