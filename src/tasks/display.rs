// Motion Logger - Display Task
//
// Polls the system state and shows a one-line status plus the sample
// counter. The screen is redrawn only when either of them changes.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::{DISPLAY_POLL_MS, DISPLAY_TITLE};
use crate::hal::DisplayDriver;
use crate::state::{MountDirection, Snapshot, SystemState};

const TEXT_X: i32 = 4;
const TITLE_Y: i32 = 2;
const STATUS_Y: i32 = 24;
const COUNTER_Y: i32 = 40;

/// Status line for a state snapshot. The transition carries its own
/// direction, so it is checked before the mount status.
pub fn status_text(snap: &Snapshot) -> &'static str {
    match snap.transition() {
        Some(MountDirection::Mount) => return "mounting...",
        Some(MountDirection::Unmount) => return "unmounting...",
        None => {}
    }
    if !snap.storage_mounted {
        "mount storage"
    } else if snap.ready() && snap.sensor_enabled {
        "system on"
    } else if snap.ready() {
        "system ready"
    } else if snap.capturing() {
        "sampling..."
    } else if snap.storage_error {
        "storage error"
    } else if snap.writing() {
        "writing..."
    } else {
        "unknown state"
    }
}

pub struct DisplayTask<D> {
    state: Arc<SystemState>,
    display: D,
    shown: Option<(&'static str, u32)>,
}

impl<D: DisplayDriver> DisplayTask<D> {
    pub fn new(state: Arc<SystemState>, display: D) -> Self {
        Self {
            state,
            display,
            shown: None,
        }
    }

    /// Redraw if the status or counter changed. Returns whether a frame was
    /// sent. A failed flush is retried on the next call.
    pub fn step(&mut self) -> anyhow::Result<bool> {
        let snap = self.state.snapshot();
        let frame = (status_text(&snap), snap.sample_index);
        if self.shown == Some(frame) {
            return Ok(false);
        }

        self.display.clear();
        self.display.draw_text(DISPLAY_TITLE, TEXT_X, TITLE_Y);
        self.display.draw_text(frame.0, TEXT_X, STATUS_Y);
        self.display.draw_text(&format!("samples: {}", frame.1), TEXT_X, COUNTER_Y);
        self.display.flush()?;

        self.shown = Some(frame);
        Ok(true)
    }
}

/// Task entry point. Never returns.
pub fn display_task<D: DisplayDriver>(state: Arc<SystemState>, display: D) -> ! {
    log::info!("Display task started");

    let mut task = DisplayTask::new(state, display);
    let poll_interval = Duration::from_millis(DISPLAY_POLL_MS);

    loop {
        if let Err(e) = task.step() {
            log::error!("Display error: {:#}", e);
        }
        thread::sleep(poll_interval);
    }
}
