// Motion Logger - FreeRTOS Task Notification Signal
//
// The waiting task owns the `Notification`; the ISR gets its notifier.
// Notifying a task that already has a pending notification just ORs the
// bits again, which gives the coalescing wake-up the mount task wants.

use std::num::NonZeroU32;
use std::sync::Arc;

use esp_idf_hal::delay::BLOCK;
use esp_idf_hal::task::notification::{Notification, Notifier};

use crate::signal::{Signal, SignalWait};

#[derive(Clone)]
pub struct TaskNotifier(Arc<Notifier>);

impl Signal for TaskNotifier {
    fn signal(&self) {
        #[allow(unused_unsafe)]
        unsafe {
            self.0.notify_and_yield(NonZeroU32::MIN);
        }
    }
}

/// Must be created on the thread that will wait on it.
pub struct TaskNotification(Notification);

impl TaskNotification {
    pub fn new() -> Self {
        Self(Notification::new())
    }

    pub fn notifier(&self) -> TaskNotifier {
        TaskNotifier(self.0.notifier())
    }
}

impl SignalWait for TaskNotification {
    fn wait(&self) {
        let _ = self.0.wait(BLOCK);
    }
}
