// Motion Logger - Capture Task
//
// Idle -> Sampling -> Writing -> Idle, forever. A cycle starts only when
// sampling is enabled, the card is mounted and nothing else is in flight.
// Each cycle reads one sample, appends it to the log and bumps the counter
// on success. Any failure ends the cycle; the task keeps running.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::config::CAPTURE_INTERVAL_MS;
use crate::error::LoggerError;
use crate::hal::{lock_storage, SensorDriver, SharedStorage, StorageDriver};
use crate::record::SampleRecord;
use crate::state::SystemState;

pub struct CaptureTask<S, D> {
    state: Arc<SystemState>,
    sensor: S,
    storage: SharedStorage<D>,
}

impl<S: SensorDriver, D: StorageDriver> CaptureTask<S, D> {
    pub fn new(state: Arc<SystemState>, sensor: S, storage: SharedStorage<D>) -> Self {
        Self { state, sensor, storage }
    }

    /// Run one cycle if the start guard holds. Returns the index written, or
    /// `None` when the task stayed idle.
    pub fn cycle(&mut self) -> Result<Option<u32>, LoggerError> {
        if !self.state.try_begin_capture() {
            return Ok(None);
        }
        let result = self.sample_and_write();
        self.state.finish_capture();
        result.map(Some)
    }

    fn sample_and_write(&mut self) -> Result<u32, LoggerError> {
        let raw = self.sensor.read_raw().map_err(LoggerError::SensorRead)?;
        let record = SampleRecord::from_raw(self.state.sample_index(), &raw);
        log::debug!(
            "Sample {}: accel {:?} g, gyro {:?} °/s, {:.1} °C",
            record.index,
            record.accel,
            record.gyro,
            raw.temperature_c()
        );

        if !self.state.begin_write() {
            return Err(LoggerError::CapturePreempted);
        }

        // Hold the driver across append and counter update so a mount
        // transition waiting on it sees the final index.
        let mut storage = lock_storage(&self.storage);
        if !self.state.snapshot().writing() {
            // A transition ran while we waited for the driver.
            return Err(LoggerError::CapturePreempted);
        }
        if let Err(e) = storage.append_line(&record.to_line()) {
            self.state.flag_storage_error();
            return Err(LoggerError::StorageWrite(e));
        }
        self.state.advance_sample_index();
        Ok(record.index)
    }
}

/// Task entry point. Never returns.
pub fn capture_task<S: SensorDriver, D: StorageDriver>(
    state: Arc<SystemState>,
    mut sensor: S,
    storage: SharedStorage<D>,
) -> ! {
    log::info!("Capture task started");

    if let Err(e) = sensor.init() {
        // Keep going: every cycle will report the read failure until the
        // sensor answers again.
        log::error!("Sensor init failed in capture task: {:#}", e);
    }

    let mut task = CaptureTask::new(state, sensor, storage);
    let interval = Duration::from_millis(CAPTURE_INTERVAL_MS);

    loop {
        let tick_start = Instant::now();

        match task.cycle() {
            Ok(Some(index)) => log::debug!("Sample {} written", index),
            Ok(None) => {}
            Err(e @ LoggerError::CapturePreempted) => log::warn!("{}", e),
            Err(e) if e.is_storage_fault() => log::error!("Capture cycle failed, storage error raised: {}", e),
            Err(e) => log::error!("Capture cycle failed: {}", e),
        }

        let elapsed = tick_start.elapsed();
        if elapsed < interval {
            thread::sleep(interval - elapsed);
        }
    }
}
