// Motion Logger - Task Wake-up & Reset Seams
//
// The edge dispatcher runs in interrupt context, so everything it calls
// through these traits must be non-blocking and allocation-free.

use std::sync::{Condvar, Mutex, PoisonError};

/// Interrupt-safe "wake up" handoff. Signals raised before the waiter
/// consumes the previous one coalesce into a single pending wake-up.
pub trait Signal: Send + Sync {
    fn signal(&self);
}

/// Waiting side of a [`Signal`]. Blocks until a signal is pending and
/// consumes it.
pub trait SignalWait {
    fn wait(&self);
}

/// Request an immediate reboot into firmware-update mode. Implementations
/// must not wait for or flush anything.
pub trait ResetControl: Send + Sync {
    fn reboot_to_bootloader(&self);
}

impl<T: Signal + ?Sized> Signal for std::sync::Arc<T> {
    fn signal(&self) {
        (**self).signal();
    }
}

impl<T: SignalWait + ?Sized> SignalWait for std::sync::Arc<T> {
    fn wait(&self) {
        (**self).wait();
    }
}

impl<T: ResetControl + ?Sized> ResetControl for std::sync::Arc<T> {
    fn reboot_to_bootloader(&self) {
        (**self).reboot_to_bootloader();
    }
}

/// Binary semaphore for host builds and tests.
#[derive(Debug, Default)]
pub struct BinarySignal {
    pending: Mutex<bool>,
    wake: Condvar,
}

impl BinarySignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a pending signal without blocking.
    pub fn try_take(&self) -> bool {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *pending)
    }
}

impl Signal for BinarySignal {
    fn signal(&self) {
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.wake.notify_one();
    }
}

impl SignalWait for BinarySignal {
    fn wait(&self) {
        let pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let mut pending = self
            .wake
            .wait_while(pending, |pending| !*pending)
            .unwrap_or_else(PoisonError::into_inner);
        *pending = false;
    }
}
