// Motion Logger - Button Edge Dispatcher
//
// Called from the GPIO pin-change interrupt. Debounces all three buttons
// against one shared timestamp (the buttons are never pressed together in
// practice) and turns accepted edges into events:
//   - sensor button  -> flip `sensor_enabled` in place
//   - storage button -> wake the mount task (coalescing)
//   - reset button   -> reboot into firmware-update mode, nothing else
//
// Nothing here blocks, allocates or logs.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::config::DEBOUNCE_MS;
use crate::events::{Button, ButtonEvent};
use crate::signal::{ResetControl, Signal};
use crate::state::SystemState;

/// `true` when an edge at `now_ms` is far enough from the last accepted one.
/// Wrap-safe across the 49-day rollover of the millisecond clock.
pub fn debounce_accepts(last_accepted_ms: u32, now_ms: u32) -> bool {
    now_ms.wrapping_sub(last_accepted_ms) > DEBOUNCE_MS
}

pub struct EdgeDispatcher<S, R> {
    state: Arc<SystemState>,
    storage_signal: S,
    reset: R,
    // Starts at 0, so edges in the first debounce window after boot are dropped.
    last_accepted_ms: AtomicU32,
}

impl<S: Signal, R: ResetControl> EdgeDispatcher<S, R> {
    pub fn new(state: Arc<SystemState>, storage_signal: S, reset: R) -> Self {
        Self {
            state,
            storage_signal,
            reset,
            last_accepted_ms: AtomicU32::new(0),
        }
    }

    /// Handle one raw edge. Returns the dispatched event, or `None` if the
    /// edge fell inside the debounce window.
    pub fn on_edge(&self, button: Button, now_ms: u32) -> Option<ButtonEvent> {
        let last = self.last_accepted_ms.load(Ordering::Acquire);
        if !debounce_accepts(last, now_ms) {
            return None;
        }
        // A nested interrupt may have accepted an edge since the load.
        self.last_accepted_ms
            .compare_exchange(last, now_ms, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;

        let event = ButtonEvent::from(button);
        match event {
            ButtonEvent::ToggleSensor => {
                self.state.toggle_sensor();
            }
            ButtonEvent::ToggleStorage => self.storage_signal.signal(),
            ButtonEvent::EmergencyReset => self.reset.reboot_to_bootloader(),
        }
        Some(event)
    }
}
