//! Consumer-facing mock handles.
//!
//! Every handle delegates to the [`MockRouter`](crate::router::MockRouter) and
//! can be deactivated once, after which the original implementation is back in
//! place and the handle refuses further interaction.

pub mod container;
pub mod function;
pub mod registry;
pub mod scoped;

pub use container::MethodMockContainer;
pub use function::FunctionMock;
pub use registry::{MockRegistry, DEFAULT_PRUNE_INTERVAL, REGISTRY_SOFT_LIMIT};
pub use scoped::Scoped;

use crate::Result;

/// A handle whose mocks can be removed.
pub trait Deactivatable {
    /// Remove the underlying mocks. Calling it again is a no-op.
    fn deactivate(&self) -> Result<()>;

    fn is_deactivated(&self) -> bool;
}
