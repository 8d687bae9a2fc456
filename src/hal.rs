// Motion Logger - Driver Interfaces
//
// The tasks only see these traits. The ESP-IDF implementations live in
// `drivers/`; `mocks` provides in-memory ones for tests.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::events::RawReading;

/// 6-axis IMU on a blocking bus.
pub trait SensorDriver: Send {
    fn init(&mut self) -> anyhow::Result<()>;
    fn reset(&mut self) -> anyhow::Result<()>;
    fn read_raw(&mut self) -> anyhow::Result<RawReading>;
}

/// Removable block storage holding the single append-only log file.
pub trait StorageDriver: Send {
    fn mount(&mut self) -> anyhow::Result<()>;
    fn unmount(&mut self) -> anyhow::Result<()>;
    /// Create the log file holding just `header`. Returns `false` when the
    /// file already exists (it is left untouched).
    fn create_with_header_if_absent(&mut self, header: &str) -> anyhow::Result<bool>;
    fn append_line(&mut self, line: &str) -> anyhow::Result<()>;
    /// Last `max_bytes` of the log file, or the whole file if it is shorter.
    fn read_tail(&mut self, max_bytes: usize) -> anyhow::Result<Vec<u8>>;
}

/// Small monochrome text display with an off-screen buffer.
pub trait DisplayDriver: Send {
    fn clear(&mut self);
    fn draw_text(&mut self, text: &str, x: i32, y: i32);
    fn flush(&mut self) -> anyhow::Result<()>;
}

/// Tri-colour status LED, one on/off switch per colour.
pub trait RgbIndicator: Send {
    fn set(&mut self, color: LedColor) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedColor {
    pub red: bool,
    pub green: bool,
    pub blue: bool,
}

impl LedColor {
    pub const OFF: Self = Self::rgb(false, false, false);
    pub const RED: Self = Self::rgb(true, false, false);
    pub const GREEN: Self = Self::rgb(false, true, false);
    pub const BLUE: Self = Self::rgb(false, false, true);
    pub const RED_GREEN: Self = Self::rgb(true, true, false);
    pub const RED_BLUE: Self = Self::rgb(true, false, true);

    pub const fn rgb(red: bool, green: bool, blue: bool) -> Self {
        Self { red, green, blue }
    }
}

/// Storage driver shared by the capture and mount tasks.
pub type SharedStorage<D> = Arc<Mutex<D>>;

/// Lock the shared storage driver. A task that panicked mid-operation leaves
/// the driver usable; the file system state is re-checked on the next mount.
pub fn lock_storage<D>(storage: &Mutex<D>) -> MutexGuard<'_, D> {
    storage.lock().unwrap_or_else(PoisonError::into_inner)
}
