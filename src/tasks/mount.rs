// Motion Logger - Mount Task
//
// Sleeps until the storage button is pressed, then mounts or unmounts the
// card depending on its current status. Sampling is forced off for the
// whole transition so the capture task never touches the file meanwhile.
// After a successful mount the sample counter resumes from the log tail.

use std::sync::Arc;

use crate::error::LoggerError;
use crate::hal::{lock_storage, SharedStorage, StorageDriver};
use crate::resume::{resume, Resume};
use crate::signal::SignalWait;
use crate::state::{MountDirection, SystemState};

/// Result of one completed transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    Mounted(Resume),
    Unmounted,
}

pub struct MountTask<D> {
    state: Arc<SystemState>,
    storage: SharedStorage<D>,
}

impl<D: StorageDriver> MountTask<D> {
    pub fn new(state: Arc<SystemState>, storage: SharedStorage<D>) -> Self {
        Self { state, storage }
    }

    /// Run one mount or unmount. State always ends ready, with
    /// `storage_mounted` and `storage_error` reflecting the outcome.
    pub fn transition(&mut self) -> Result<MountOutcome, LoggerError> {
        let direction = self.state.begin_transition();
        let mut storage = lock_storage(&self.storage);

        match direction {
            MountDirection::Mount => {
                log::info!("Mounting storage");
                if let Err(e) = storage.mount() {
                    self.state.finish_transition(false, true);
                    return Err(LoggerError::StorageMount(e));
                }
                match resume(&mut *storage) {
                    Ok(resumed) => {
                        self.state.set_sample_index(resumed.next_index());
                        self.state.finish_transition(true, false);
                        Ok(MountOutcome::Mounted(resumed))
                    }
                    Err(e) => {
                        // Mounted, but the log is unusable: counter untouched.
                        self.state.finish_transition(true, true);
                        Err(e)
                    }
                }
            }
            MountDirection::Unmount => {
                log::info!("Unmounting storage");
                match storage.unmount() {
                    Ok(()) => {
                        self.state.finish_transition(false, false);
                        Ok(MountOutcome::Unmounted)
                    }
                    Err(e) => {
                        self.state.finish_transition(true, true);
                        Err(LoggerError::StorageUnmount(e))
                    }
                }
            }
        }
    }
}

/// Task entry point. Blocks on `toggle` between transitions; never returns.
pub fn mount_task<D: StorageDriver, W: SignalWait>(
    state: Arc<SystemState>,
    storage: SharedStorage<D>,
    toggle: W,
) -> ! {
    log::info!("Mount task started");

    let mut task = MountTask::new(state, storage);
    loop {
        toggle.wait();

        match task.transition() {
            Ok(MountOutcome::Mounted(Resume::Unparsed)) => {
                log::warn!("Storage mounted; {}, counter restarts at 0", LoggerError::ResumeParse);
            }
            Ok(MountOutcome::Mounted(resumed)) => {
                log::info!("Storage mounted ({:?}), next sample {}", resumed, resumed.next_index());
            }
            Ok(MountOutcome::Unmounted) => log::info!("Storage unmounted, safe to remove"),
            Err(e) => log::error!("{}", e),
        }
    }
}
