// Motion Logger - SD Card Storage Driver
//
// FAT volume on an SD card over SPI (embedded-sdmmc). The volume and root
// directory stay open while mounted; the log file itself is opened and
// closed around every operation so a pulled card loses at most one line.

use embedded_sdmmc::{Mode, RawDirectory, RawFile, RawVolume, SdCard, TimeSource, Timestamp, VolumeIdx, VolumeManager};
use esp_idf_hal::delay::Delay;
use esp_idf_hal::spi::{SpiDeviceDriver, SpiDriver};

use crate::hal::StorageDriver;

pub type SdSpi = SpiDeviceDriver<'static, SpiDriver<'static>>;
type Card = SdCard<SdSpi, Delay>;
type Volumes = VolumeManager<Card, FixedTime>;
type SdError = embedded_sdmmc::Error<embedded_sdmmc::SdCardError>;

/// No RTC on board: every file gets the same timestamp.
pub struct FixedTime;

impl TimeSource for FixedTime {
    fn get_timestamp(&self) -> Timestamp {
        Timestamp::from_fat(0, 0)
    }
}

fn sd_error(e: SdError) -> anyhow::Error {
    anyhow::anyhow!("SD card: {:?}", e)
}

pub struct SdStorage {
    volumes: Volumes,
    file_name: &'static str,
    open: Option<(RawVolume, RawDirectory)>,
}

impl SdStorage {
    pub fn new(card: Card, file_name: &'static str) -> Self {
        Self {
            volumes: VolumeManager::new(card, FixedTime),
            file_name,
            open: None,
        }
    }

    fn root(&self) -> anyhow::Result<RawDirectory> {
        match self.open {
            Some((_, root)) => Ok(root),
            None => anyhow::bail!("SD card not mounted"),
        }
    }

    /// Open the log file in `mode`, run `op` on it and close it again, also
    /// when `op` fails.
    fn with_file<T>(
        &mut self,
        mode: Mode,
        op: impl FnOnce(&mut Volumes, RawFile) -> Result<T, SdError>,
    ) -> anyhow::Result<Result<T, SdError>> {
        let root = self.root()?;
        let file = match self.volumes.open_file_in_dir(root, self.file_name, mode) {
            Ok(file) => file,
            Err(e) => return Ok(Err(e)),
        };
        let result = op(&mut self.volumes, file);
        let closed = self.volumes.close_file(file);
        Ok(result.and_then(|value| closed.map(|()| value)))
    }
}

impl StorageDriver for SdStorage {
    fn mount(&mut self) -> anyhow::Result<()> {
        if self.open.is_some() {
            return Ok(());
        }
        let volume = self.volumes.open_raw_volume(VolumeIdx(0)).map_err(sd_error)?;
        match self.volumes.open_root_dir(volume) {
            Ok(root) => {
                self.open = Some((volume, root));
                Ok(())
            }
            Err(e) => {
                let _ = self.volumes.close_volume(volume);
                Err(sd_error(e))
            }
        }
    }

    fn unmount(&mut self) -> anyhow::Result<()> {
        let Some((volume, root)) = self.open else {
            return Ok(());
        };
        self.volumes.close_dir(root).map_err(sd_error)?;
        self.open = None;
        self.volumes.close_volume(volume).map_err(sd_error)?;
        Ok(())
    }

    fn create_with_header_if_absent(&mut self, header: &str) -> anyhow::Result<bool> {
        let created = self.with_file(Mode::ReadWriteCreate, |volumes, file| {
            volumes.write(file, header.as_bytes())
        })?;
        match created {
            Ok(()) => Ok(true),
            Err(embedded_sdmmc::Error::FileAlreadyExists) => Ok(false),
            Err(e) => Err(sd_error(e)),
        }
    }

    fn append_line(&mut self, line: &str) -> anyhow::Result<()> {
        self.with_file(Mode::ReadWriteAppend, |volumes, file| volumes.write(file, line.as_bytes()))?
            .map_err(sd_error)
    }

    fn read_tail(&mut self, max_bytes: usize) -> anyhow::Result<Vec<u8>> {
        self.with_file(Mode::ReadOnly, |volumes, file| {
            let length = volumes.file_length(file)? as usize;
            let want = length.min(max_bytes);
            volumes.file_seek_from_end(file, want as u32)?;

            let mut tail = vec![0u8; want];
            let mut filled = 0;
            while filled < want {
                match volumes.read(file, &mut tail[filled..])? {
                    0 => break,
                    n => filled += n,
                }
            }
            tail.truncate(filled);
            Ok(tail)
        })?
        .map_err(sd_error)
    }
}
