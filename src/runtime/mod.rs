pub mod object;
pub mod provider;
pub mod symbols;

pub use object::{ObjectId, ObjectRef, Target};
pub use provider::{DispatchOutcome, InterceptHandler, InterceptTable, InterceptionProvider};
pub use symbols::{resolve_declaring_type, SymbolKey, SymbolTable, TypeDef};
