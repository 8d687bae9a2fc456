// Motion Logger - System Events & Data Types

use crate::config::*;

// ---------------------------------------------------------------------------
// Raw sensor reading (MPU6050 register values, big-endian decoded)
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawReading {
    pub accel: [i16; 3],
    pub gyro: [i16; 3],
    pub temp: i16,
}

impl RawReading {
    /// Acceleration in g at the power-on ±2 g range.
    pub fn accel_g(&self) -> [f32; 3] {
        self.accel.map(|v| f32::from(v) / ACCEL_SCALE_2G)
    }

    /// Angular rate in °/s at the power-on ±250 °/s range.
    pub fn gyro_dps(&self) -> [f32; 3] {
        self.gyro.map(|v| f32::from(v) / GYRO_SCALE_250)
    }

    pub fn temperature_c(&self) -> f32 {
        f32::from(self.temp) / TEMP_SCALE + TEMP_OFFSET_C
    }
}

// ---------------------------------------------------------------------------
// Buttons
// ---------------------------------------------------------------------------

/// Physical input a pin-change interrupt came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Sensor,
    Storage,
    Reset,
}

/// Logical event produced by an accepted (debounced) edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    /// Flip operator-requested sampling on/off.
    ToggleSensor,
    /// Wake the mount task to mount or unmount the card.
    ToggleStorage,
    /// Reboot into firmware-update mode, no cleanup.
    EmergencyReset,
}

impl From<Button> for ButtonEvent {
    fn from(button: Button) -> Self {
        match button {
            Button::Sensor => Self::ToggleSensor,
            Button::Storage => Self::ToggleStorage,
            Button::Reset => Self::EmergencyReset,
        }
    }
}
