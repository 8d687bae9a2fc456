// Motion Logger - RGB Status LED Driver
//
// Three plain GPIO outputs, active HIGH.

use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};

use crate::hal::{LedColor, RgbIndicator};

pub struct RgbLed<'d> {
    red: PinDriver<'d, AnyOutputPin, Output>,
    green: PinDriver<'d, AnyOutputPin, Output>,
    blue: PinDriver<'d, AnyOutputPin, Output>,
}

impl<'d> RgbLed<'d> {
    pub fn new(
        red: PinDriver<'d, AnyOutputPin, Output>,
        green: PinDriver<'d, AnyOutputPin, Output>,
        blue: PinDriver<'d, AnyOutputPin, Output>,
    ) -> Self {
        Self { red, green, blue }
    }
}

impl RgbIndicator for RgbLed<'static> {
    fn set(&mut self, color: LedColor) -> anyhow::Result<()> {
        self.red.set_level(color.red.into())?;
        self.green.set_level(color.green.into())?;
        self.blue.set_level(color.blue.into())?;
        Ok(())
    }
}
