// Motion Logger - Hardware & System Configuration
// Target: ESP32-C3 (RISC-V) under ESP-IDF

// ---------------------------------------------------------------------------
// GPIO Pin Definitions
// ---------------------------------------------------------------------------
pub const PIN_BUTTON_SENSOR: i32 = 3;   // Sampling on/off (INPUT_PULLUP, active LOW)
pub const PIN_BUTTON_STORAGE: i32 = 4;  // Mount/unmount SD card (INPUT_PULLUP, active LOW)
pub const PIN_BUTTON_RESET: i32 = 5;    // Emergency reboot into download mode
pub const PIN_I2C_SDA: i32 = 6;         // Shared by MPU6050 and OLED
pub const PIN_I2C_SCL: i32 = 7;
pub const PIN_SD_SCK: i32 = 8;
pub const PIN_SD_MISO: i32 = 0;
pub const PIN_SD_MOSI: i32 = 10;
pub const PIN_SD_CS: i32 = 1;
pub const PIN_LED_RED: i32 = 2;
pub const PIN_LED_GREEN: i32 = 20;
pub const PIN_LED_BLUE: i32 = 21;

// ---------------------------------------------------------------------------
// Buses
// ---------------------------------------------------------------------------
pub const I2C_ADDR_MPU6050: u8 = 0x68;
pub const I2C_ADDR_OLED: u8 = 0x3C;
pub const I2C_BAUDRATE_KHZ: u32 = 400;
pub const I2C_TIMEOUT_TICKS: u32 = 1000; // FreeRTOS ticks
pub const SD_SPI_BAUDRATE_KHZ: u32 = 400; // SD cards must be initialised at <= 400 kHz

// ---------------------------------------------------------------------------
// Display (SSD1306 OLED)
// ---------------------------------------------------------------------------
pub const SCREEN_WIDTH: u32 = 128;
pub const SCREEN_HEIGHT: u32 = 64;
pub const DISPLAY_BUFFER_SIZE: usize = (SCREEN_WIDTH as usize * SCREEN_HEIGHT as usize) / 8; // 1024
pub const DISPLAY_TITLE: &str = "Motion Logger";

// ---------------------------------------------------------------------------
// Task Stack Sizes (bytes)
// ---------------------------------------------------------------------------
pub const STACK_CAPTURE: usize = 8192; // embedded-sdmmc keeps a 512-byte block on the stack
pub const STACK_MOUNT: usize = 8192;
pub const STACK_INDICATOR: usize = 3072;
pub const STACK_DISPLAY: usize = 4096;

// ---------------------------------------------------------------------------
// Timing (milliseconds)
// ---------------------------------------------------------------------------
pub const DEBOUNCE_MS: u32 = 200;           // Shared by all three buttons
pub const CAPTURE_INTERVAL_MS: u64 = 100;   // ~10 Hz upper bound on sampling
pub const INDICATOR_POLL_MS: u64 = 100;
pub const BLINK_ON_MS: u64 = 50;
pub const DISPLAY_POLL_MS: u64 = 250;
pub const INPUT_REARM_MS: u64 = 20;         // GPIO interrupts disarm after each edge
pub const BOOT_STATUS_DISPLAY_MS: u64 = 1000;
pub const SENSOR_RESET_SETTLE_MS: u32 = 100;
pub const SENSOR_WAKE_SETTLE_MS: u32 = 10;

// ---------------------------------------------------------------------------
// Log File
// ---------------------------------------------------------------------------
pub const LOG_FILE_NAME: &str = "DATA.CSV"; // 8.3 name, FAT root directory
pub const LOG_HEADER: &str = "sample_index;accel_x;accel_y;accel_z;gyro_x;gyro_y;gyro_z\n";

// Resume scan: read this much of the file tail first, double while no line
// boundary is found, give up past the limit.
pub const RESUME_CHUNK_BYTES: usize = 64;
pub const RESUME_MAX_BYTES: usize = 4096;

// ---------------------------------------------------------------------------
// MPU6050 Sensor Scale Factors (power-on ranges)
// ---------------------------------------------------------------------------
pub const ACCEL_SCALE_2G: f32 = 16384.0;  // LSB/g  at ±2 g
pub const GYRO_SCALE_250: f32 = 131.0;    // LSB/°/s at ±250 °/s
pub const TEMP_SCALE: f32 = 340.0;        // LSB/°C
pub const TEMP_OFFSET_C: f32 = 36.53;
