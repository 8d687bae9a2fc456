// Motion Logger - Firmware Entry Point
//
// Boot sequence:
//   1. Bring up the shared I2C bus, the OLED and the MPU6050.
//   2. Show the component self-test for 1 second.
//   3. Prepare the SD card driver (not mounted yet) and the RGB LED.
//   4. Spawn the capture, mount, indicator and display tasks.
//   5. Hook the three buttons to the edge dispatcher (falling-edge ISRs).
//   6. Keep re-arming the button interrupts forever.
//
// Operator controls:
//   - sensor button:  sampling on/off
//   - storage button: mount/unmount the SD card
//   - reset button:   reboot into the ROM download mode, immediately

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    firmware::run()
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!("motion-logger runs on ESP-IDF; build with --target riscv32imc-esp-espidf");
}

#[cfg(target_os = "espidf")]
mod firmware {
    use std::sync::mpsc;
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    use esp_idf_hal::delay::Delay;
    use esp_idf_hal::gpio::{AnyInputPin, Input, InputPin, InterruptType, OutputPin, PinDriver};
    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::prelude::*;
    use esp_idf_hal::spi::{SpiConfig, SpiDeviceDriver, SpiDriver, SpiDriverConfig};
    use embedded_sdmmc::SdCard;

    use motion_logger::config::*;
    use motion_logger::drivers::boot::DownloadModeReset;
    use motion_logger::drivers::imu::Mpu6050;
    use motion_logger::drivers::led::RgbLed;
    use motion_logger::drivers::notify::{TaskNotification, TaskNotifier};
    use motion_logger::drivers::oled::OledDisplay;
    use motion_logger::drivers::sdcard::SdStorage;
    use motion_logger::drivers::{now_ms, SharedBus};
    use motion_logger::events::Button;
    use motion_logger::input::EdgeDispatcher;
    use motion_logger::state::SystemState;
    use motion_logger::tasks;

    type Dispatcher = EdgeDispatcher<TaskNotifier, DownloadModeReset>;

    pub fn run() -> anyhow::Result<()> {
        // Link esp-idf-sys runtime patches and initialise logging.
        esp_idf_svc::sys::link_patches();
        esp_idf_svc::log::EspLogger::initialize_default();
        log::info!("Motion Logger firmware starting...");

        // ---- Peripherals ------------------------------------------------------
        let peripherals = Peripherals::take()?;
        let pins = peripherals.pins;

        // ---- I2C bus (shared between OLED and MPU6050) ------------------------
        let i2c_config = I2cConfig::new().baudrate(I2C_BAUDRATE_KHZ.kHz().into());
        let i2c = I2cDriver::new(peripherals.i2c0, pins.gpio6, pins.gpio7, &i2c_config)?;
        // Firmware never exits: the bus lives for the whole programme.
        let i2c_bus: SharedBus = Box::leak(Box::new(Mutex::new(i2c)));

        // ---- Component self-test ---------------------------------------------
        let mut display = OledDisplay::new(i2c_bus);
        let display_ok = display.is_connected();
        if let Err(e) = display.init() {
            log::error!("OLED init failed: {:#}", e);
        }
        let imu = Mpu6050::new(i2c_bus);
        let imu_ok = imu.is_connected();

        if let Err(e) = display.show_boot_status(imu_ok, display_ok) {
            log::error!("Display error: {:#}", e);
        }
        thread::sleep(Duration::from_millis(BOOT_STATUS_DISPLAY_MS));

        if !display_ok || !imu_ok {
            log::error!("Boot check FAILED: OLED:{} IMU:{}", display_ok, imu_ok);
            // Continue anyway so we can still debug via serial.
        }

        // ---- SD card (SPI2), mounted later by the operator --------------------
        let spi = SpiDriver::new(
            peripherals.spi2,
            pins.gpio8,        // SCK
            pins.gpio10,       // MOSI
            Some(pins.gpio0),  // MISO
            &SpiDriverConfig::new(),
        )?;
        let sd_spi = SpiDeviceDriver::new(
            spi,
            Some(pins.gpio1),  // CS
            &SpiConfig::new().baudrate(SD_SPI_BAUDRATE_KHZ.kHz().into()),
        )?;
        let card = SdCard::new(sd_spi, Delay::new_default());
        let storage = Arc::new(Mutex::new(SdStorage::new(card, LOG_FILE_NAME)));

        // ---- RGB status LED ---------------------------------------------------
        let led = RgbLed::new(
            PinDriver::output(pins.gpio2.downgrade_output())?,
            PinDriver::output(pins.gpio20.downgrade_output())?,
            PinDriver::output(pins.gpio21.downgrade_output())?,
        );

        // ---- Shared state -----------------------------------------------------
        let state = Arc::new(SystemState::new());

        // ---- Spawn tasks (map to FreeRTOS tasks via std::thread) ---------------
        let capture_state = Arc::clone(&state);
        let capture_storage = Arc::clone(&storage);
        thread::Builder::new()
            .name("capture".into())
            .stack_size(STACK_CAPTURE)
            .spawn(move || {
                tasks::capture::capture_task(capture_state, imu, capture_storage);
            })?;

        // The notification belongs to the mount thread; its notifier comes
        // back here for the button ISR.
        let (notifier_tx, notifier_rx) = mpsc::channel();
        let mount_state = Arc::clone(&state);
        thread::Builder::new()
            .name("mount".into())
            .stack_size(STACK_MOUNT)
            .spawn(move || {
                let notification = TaskNotification::new();
                if notifier_tx.send(notification.notifier()).is_err() {
                    log::error!("Main thread gone before mount task started");
                    return;
                }
                tasks::mount::mount_task(mount_state, storage, notification);
            })?;
        let storage_signal = notifier_rx.recv()?;

        let indicator_state = Arc::clone(&state);
        thread::Builder::new()
            .name("indicator".into())
            .stack_size(STACK_INDICATOR)
            .spawn(move || {
                tasks::indicator::indicator_task(indicator_state, led);
            })?;

        let display_state = Arc::clone(&state);
        thread::Builder::new()
            .name("display".into())
            .stack_size(STACK_DISPLAY)
            .spawn(move || {
                tasks::display::display_task(display_state, display);
            })?;

        // ---- Buttons -> edge dispatcher (ISR context) ------------------------
        let dispatcher = Arc::new(EdgeDispatcher::new(state, storage_signal, DownloadModeReset));
        let mut buttons = [
            button(pins.gpio3.downgrade_input(), PIN_BUTTON_SENSOR, Button::Sensor, &dispatcher)?,
            button(pins.gpio4.downgrade_input(), PIN_BUTTON_STORAGE, Button::Storage, &dispatcher)?,
            button(pins.gpio5.downgrade_input(), PIN_BUTTON_RESET, Button::Reset, &dispatcher)?,
        ];
        log::info!(
            "Boot complete, buttons on GPIO{}/{}/{}, log file {}",
            PIN_BUTTON_SENSOR,
            PIN_BUTTON_STORAGE,
            PIN_BUTTON_RESET,
            LOG_FILE_NAME
        );

        // ESP-IDF disarms a GPIO interrupt each time it fires.
        let rearm = Duration::from_millis(INPUT_REARM_MS);
        loop {
            for pin in buttons.iter_mut() {
                if let Err(e) = pin.enable_interrupt() {
                    log::warn!("Button interrupt re-arm failed: {}", e);
                }
            }
            thread::sleep(rearm);
        }
    }

    /// Configure a pulled-up, falling-edge button and route it to `dispatcher`.
    fn button(
        pin: AnyInputPin,
        gpio: i32,
        which: Button,
        dispatcher: &Arc<Dispatcher>,
    ) -> anyhow::Result<PinDriver<'static, AnyInputPin, Input>> {
        let mut driver = PinDriver::input(pin)?;
        configure_pullup(gpio);
        driver.set_interrupt_type(InterruptType::NegEdge)?;

        let dispatcher = Arc::clone(dispatcher);
        // SAFETY: the callback only touches atomics and ISR-safe FreeRTOS /
        // ROM calls through the dispatcher.
        unsafe {
            driver.subscribe(move || {
                let _ = dispatcher.on_edge(which, now_ms());
            })?;
        }
        driver.enable_interrupt()?;
        Ok(driver)
    }

    /// Enable the internal pull-up through the raw API; the downgraded pin
    /// type does not expose `set_pull`.
    fn configure_pullup(gpio: i32) {
        unsafe {
            esp_idf_sys::gpio_set_pull_mode(gpio, esp_idf_sys::gpio_pull_mode_t_GPIO_PULLUP_ONLY);
        }
    }
}
