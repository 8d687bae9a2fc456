// Motion Logger - ESP-IDF Drivers

use std::sync::Mutex;

use esp_idf_hal::i2c::I2cDriver;

pub mod boot;
pub mod imu;
pub mod led;
pub mod notify;
pub mod oled;
pub mod sdcard;

/// Thread-safe handle to the I2C bus shared by the IMU and the OLED.
pub type SharedBus = &'static Mutex<I2cDriver<'static>>;

/// Milliseconds since boot (wraps at ~49 days). Safe to call from an ISR.
pub fn now_ms() -> u32 {
    unsafe { (esp_idf_sys::esp_timer_get_time() / 1000) as u32 }
}
