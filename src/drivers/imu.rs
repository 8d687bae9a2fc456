// Motion Logger - MPU6050 IMU Driver
//
// Register-level driver over the shared I2C bus. Runs the sensor at its
// power-on ranges (±2 g, ±250 °/s); scaling happens in `RawReading`.

use std::sync::PoisonError;

use anyhow::Context;
use esp_idf_hal::delay::FreeRtos;

use crate::config::*;
use crate::drivers::SharedBus;
use crate::events::RawReading;
use crate::hal::SensorDriver;

// MPU6050 register addresses
const REG_PWR_MGMT_1: u8 = 0x6B;
const REG_ACCEL_XOUT_H: u8 = 0x3B; // Start of 14-byte sensor burst
const REG_WHO_AM_I: u8 = 0x75;
const WHO_AM_I_EXPECTED: u8 = 0x68;

const PWR_DEVICE_RESET: u8 = 0x80;
const PWR_WAKE: u8 = 0x00;

pub struct Mpu6050 {
    bus: SharedBus,
}

impl Mpu6050 {
    pub fn new(bus: SharedBus) -> Self {
        Self { bus }
    }

    /// Verify the device is reachable on the I2C bus.
    pub fn is_connected(&self) -> bool {
        let mut bus = self.bus.lock().unwrap_or_else(PoisonError::into_inner);
        let mut buf = [0u8; 1];
        match bus.write_read(I2C_ADDR_MPU6050, &[REG_WHO_AM_I], &mut buf, I2C_TIMEOUT_TICKS) {
            Ok(()) => buf[0] == WHO_AM_I_EXPECTED,
            Err(_) => false,
        }
    }

    fn write_power(&self, value: u8) -> anyhow::Result<()> {
        let mut bus = self.bus.lock().unwrap_or_else(PoisonError::into_inner);
        bus.write(I2C_ADDR_MPU6050, &[REG_PWR_MGMT_1, value], I2C_TIMEOUT_TICKS)
            .context("MPU6050 PWR_MGMT_1 write")?;
        Ok(())
    }
}

impl SensorDriver for Mpu6050 {
    fn init(&mut self) -> anyhow::Result<()> {
        self.reset()?;
        log::info!("MPU6050 initialised (±2g, ±250°/s)");
        Ok(())
    }

    /// Full device reset followed by wake-up. The bus lock is released while
    /// the sensor settles so the OLED can keep using it.
    fn reset(&mut self) -> anyhow::Result<()> {
        self.write_power(PWR_DEVICE_RESET)?;
        FreeRtos::delay_ms(SENSOR_RESET_SETTLE_MS);
        self.write_power(PWR_WAKE)?;
        FreeRtos::delay_ms(SENSOR_WAKE_SETTLE_MS);
        Ok(())
    }

    /// Burst-read accelerometer, temperature and gyroscope registers.
    fn read_raw(&mut self) -> anyhow::Result<RawReading> {
        let mut bus = self.bus.lock().unwrap_or_else(PoisonError::into_inner);
        let mut raw = [0u8; 14];
        bus.write_read(
            I2C_ADDR_MPU6050,
            &[REG_ACCEL_XOUT_H],
            &mut raw,
            I2C_TIMEOUT_TICKS,
        )
        .context("MPU6050 burst read")?;

        let word = |i: usize| i16::from_be_bytes([raw[i], raw[i + 1]]);
        Ok(RawReading {
            accel: [word(0), word(2), word(4)],
            temp: word(6),
            gyro: [word(8), word(10), word(12)],
        })
    }
}
