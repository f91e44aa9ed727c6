//! The `Device` close/name contract shared by every hardware handle.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::HalResult;

/// A hardware handle that can be released.
///
/// Every handle returned by a [`HardwareProvider`][crate::HardwareProvider]
/// implements this.  The stage controller guarantees `close` is invoked
/// exactly once per acquired handle per stage run; implementations should
/// make a second call a no-op rather than an error.
pub trait Device: Send {
    /// Diagnostic name, e.g. `"motor-left(B)"`.  Stable for the handle's
    /// lifetime; used in logs and close-failure reports.
    fn name(&self) -> &str;

    /// Release the underlying hardware.
    fn close(&mut self) -> HalResult<()>;
}

/// How stage code shares a handle between the controller (which keeps it for
/// teardown) and the behaviors that use it.
pub type Shared<T> = Arc<Mutex<T>>;

/// Poison-tolerant lock.
///
/// A behavior that panics while holding a device must not wedge hardware
/// teardown, so all device access goes through this instead of `lock()?`.
pub fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
