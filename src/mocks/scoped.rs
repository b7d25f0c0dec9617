use crate::logging;
use crate::mocks::Deactivatable;
use crate::Result;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

/// Deactivates the wrapped handle when dropped.
///
/// Errors raised on drop cannot be propagated and are logged instead; call
/// [`Scoped::finish`] to observe them.
#[must_use = "the mock is deactivated as soon as the guard is dropped"]
pub struct Scoped<T: Deactivatable + ?Sized> {
    handle: Rc<T>,
}

impl<T: Deactivatable + ?Sized> Scoped<T> {
    pub fn new(handle: Rc<T>) -> Self {
        Self { handle }
    }

    /// Shared handle, e.g. for registering with a [`MockRegistry`](crate::MockRegistry)
    pub fn handle(&self) -> Rc<T> {
        Rc::clone(&self.handle)
    }

    /// Deactivate now and report the outcome
    pub fn finish(self) -> Result<()> {
        self.handle.deactivate()
    }
}

impl<T: Deactivatable + ?Sized> Deref for Scoped<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.handle
    }
}

impl<T: Deactivatable + ?Sized> Drop for Scoped<T> {
    fn drop(&mut self) {
        if let Err(e) = self.handle.deactivate() {
            logging::log_scoped_deactivate_failed(e);
        }
    }
}

impl<T: Deactivatable + fmt::Debug + ?Sized> fmt::Debug for Scoped<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Scoped").field(&&*self.handle).finish()
    }
}
