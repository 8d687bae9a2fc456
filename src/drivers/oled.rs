// Motion Logger - SSD1306 OLED Driver
//
// 128x64 panel on the shared I2C bus. Drawing goes to a `MonoFrame`;
// `flush` streams the whole frame in horizontal addressing mode.

use std::sync::PoisonError;

use anyhow::Context;

use crate::config::*;
use crate::drivers::SharedBus;
use crate::frame::MonoFrame;
use crate::hal::DisplayDriver;

const CONTROL_COMMAND: u8 = 0x00;
const CONTROL_DATA: u8 = 0x40;

const INIT_SEQUENCE: &[u8] = &[
    0xAE,       // display off
    0xD5, 0x80, // clock divide
    0xA8, 0x3F, // multiplex 64
    0xD3, 0x00, // no display offset
    0x40,       // start line 0
    0x8D, 0x14, // charge pump on
    0x20, 0x00, // horizontal addressing
    0xA1,       // segment remap
    0xC8,       // COM scan descending
    0xDA, 0x12, // COM pins
    0x81, 0xCF, // contrast
    0xD9, 0xF1, // pre-charge
    0xDB, 0x40, // VCOMH deselect
    0xA4,       // follow RAM
    0xA6,       // normal (not inverted)
    0xAF,       // display on
];

pub struct OledDisplay {
    bus: SharedBus,
    frame: MonoFrame,
}

impl OledDisplay {
    pub fn new(bus: SharedBus) -> Self {
        Self {
            bus,
            frame: MonoFrame::new(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.command(&[0xE3]).is_ok() // NOP
    }

    pub fn init(&mut self) -> anyhow::Result<()> {
        self.command(INIT_SEQUENCE).context("SSD1306 init")?;
        self.clear();
        self.flush()
    }

    /// Boot self-test result screen.
    pub fn show_boot_status(&mut self, sensor_ok: bool, display_ok: bool) -> anyhow::Result<()> {
        let verdict = |ok: bool| if ok { "ok" } else { "FAIL" };
        self.clear();
        self.draw_text(DISPLAY_TITLE, 4, 2);
        self.draw_text(&format!("IMU:  {}", verdict(sensor_ok)), 4, 24);
        self.draw_text(&format!("OLED: {}", verdict(display_ok)), 4, 40);
        self.flush()
    }

    fn command(&self, bytes: &[u8]) -> anyhow::Result<()> {
        let mut bus = self.bus.lock().unwrap_or_else(PoisonError::into_inner);
        let mut buf = Vec::with_capacity(bytes.len() + 1);
        buf.push(CONTROL_COMMAND);
        buf.extend_from_slice(bytes);
        bus.write(I2C_ADDR_OLED, &buf, I2C_TIMEOUT_TICKS)?;
        Ok(())
    }
}

impl DisplayDriver for OledDisplay {
    fn clear(&mut self) {
        self.frame.clear();
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32) {
        self.frame.draw_text(text, x, y);
    }

    fn flush(&mut self) -> anyhow::Result<()> {
        let last_column = (SCREEN_WIDTH - 1) as u8;
        let last_page = (SCREEN_HEIGHT / 8 - 1) as u8;
        self.command(&[0x21, 0, last_column, 0x22, 0, last_page])
            .context("SSD1306 address window")?;

        let mut bus = self.bus.lock().unwrap_or_else(PoisonError::into_inner);
        let mut buf = [0u8; SCREEN_WIDTH as usize + 1];
        buf[0] = CONTROL_DATA;
        for page in self.frame.pages() {
            buf[1..].copy_from_slice(page);
            bus.write(I2C_ADDR_OLED, &buf, I2C_TIMEOUT_TICKS)
                .context("SSD1306 page write")?;
        }
        Ok(())
    }
}
