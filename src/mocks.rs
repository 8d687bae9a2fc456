//! In-memory drivers for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::bail;

use crate::events::RawReading;
use crate::hal::{DisplayDriver, LedColor, RgbIndicator, SensorDriver, StorageDriver};
use crate::signal::ResetControl;

/// Returns the same reading every time; fails while `fail` is set.
#[derive(Debug, Default)]
pub struct MockSensor {
    pub reading: RawReading,
    pub fail: bool,
    pub reads: usize,
}

impl SensorDriver for MockSensor {
    fn init(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn reset(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn read_raw(&mut self) -> anyhow::Result<RawReading> {
        self.reads += 1;
        if self.fail {
            bail!("i2c nack");
        }
        Ok(self.reading)
    }
}

/// A card holding at most one file. `file == None` means it does not exist.
#[derive(Debug, Default)]
pub struct MockStorage {
    pub file: Option<Vec<u8>>,
    pub mounted: bool,
    pub fail_mount: bool,
    pub fail_unmount: bool,
    pub fail_write: bool,
    pub fail_open: bool,
    /// Number of calls that touched the file.
    pub file_accesses: usize,
}

impl MockStorage {
    pub fn with_file(contents: &str) -> Self {
        Self {
            file: Some(contents.as_bytes().to_vec()),
            ..Self::default()
        }
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(self.file.as_deref().unwrap_or_default()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    fn check_mounted(&self) -> anyhow::Result<()> {
        if !self.mounted {
            bail!("volume not mounted");
        }
        Ok(())
    }
}

impl StorageDriver for MockStorage {
    fn mount(&mut self) -> anyhow::Result<()> {
        if self.fail_mount {
            bail!("no card");
        }
        self.mounted = true;
        Ok(())
    }

    fn unmount(&mut self) -> anyhow::Result<()> {
        if self.fail_unmount {
            bail!("card busy");
        }
        self.mounted = false;
        Ok(())
    }

    fn create_with_header_if_absent(&mut self, header: &str) -> anyhow::Result<bool> {
        self.file_accesses += 1;
        self.check_mounted()?;
        if self.fail_open {
            bail!("directory full");
        }
        if self.file.is_some() {
            return Ok(false);
        }
        self.file = Some(header.as_bytes().to_vec());
        Ok(true)
    }

    fn append_line(&mut self, line: &str) -> anyhow::Result<()> {
        self.file_accesses += 1;
        self.check_mounted()?;
        if self.fail_write {
            bail!("write protected");
        }
        match self.file.as_mut() {
            Some(file) => file.extend_from_slice(line.as_bytes()),
            None => self.file = Some(line.as_bytes().to_vec()),
        }
        Ok(())
    }

    fn read_tail(&mut self, max_bytes: usize) -> anyhow::Result<Vec<u8>> {
        self.file_accesses += 1;
        self.check_mounted()?;
        let Some(file) = self.file.as_deref() else {
            bail!("file not found");
        };
        let start = file.len().saturating_sub(max_bytes);
        Ok(file[start..].to_vec())
    }
}

#[derive(Debug, Default)]
pub struct MockDisplay {
    pub lines: Vec<(String, i32, i32)>,
    pub shown: Vec<Vec<(String, i32, i32)>>,
}

impl MockDisplay {
    /// Text of the last flushed frame, top to bottom.
    pub fn last_frame(&self) -> Vec<&str> {
        self.shown
            .last()
            .map(|frame| frame.iter().map(|(text, _, _)| text.as_str()).collect())
            .unwrap_or_default()
    }
}

impl DisplayDriver for MockDisplay {
    fn clear(&mut self) {
        self.lines.clear();
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32) {
        self.lines.push((text.to_owned(), x, y));
    }

    fn flush(&mut self) -> anyhow::Result<()> {
        self.shown.push(self.lines.clone());
        Ok(())
    }
}

/// Records every colour written, in order.
#[derive(Debug, Default)]
pub struct MockLed {
    pub history: Vec<LedColor>,
}

impl RgbIndicator for MockLed {
    fn set(&mut self, color: LedColor) -> anyhow::Result<()> {
        self.history.push(color);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ResetRecorder {
    requests: AtomicUsize,
}

impl ResetRecorder {
    pub fn count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl ResetControl for ResetRecorder {
    fn reboot_to_bootloader(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}
