// Motion Logger - Error Taxonomy
//
// Every variant is recovered inside the task that raised it: the task logs
// it, updates `storage_error` where applicable and goes back to idle. None
// of them is retried until the operator presses the button again.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("sensor read failed: {0:#}")]
    SensorRead(anyhow::Error),
    #[error("storage mount failed: {0:#}")]
    StorageMount(anyhow::Error),
    #[error("storage unmount failed: {0:#}")]
    StorageUnmount(anyhow::Error),
    #[error("log write failed: {0:#}")]
    StorageWrite(anyhow::Error),
    #[error("log file open failed: {0:#}")]
    StorageOpen(anyhow::Error),
    /// Non-fatal: the counter restarts at 0.
    #[error("could not parse a sample index from the last log line")]
    ResumeParse,
    #[error("capture cycle displaced by a storage transition")]
    CapturePreempted,
}

impl LoggerError {
    /// Whether this failure raises the user-visible `storage_error` flag.
    pub fn is_storage_fault(&self) -> bool {
        matches!(
            self,
            Self::StorageMount(_) | Self::StorageUnmount(_) | Self::StorageWrite(_) | Self::StorageOpen(_)
        )
    }
}
