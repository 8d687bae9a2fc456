// Motion Logger - Sample Record & Log Line Format
//
// One record per line, `;`-separated, two decimals:
//   {index};{ax};{ay};{az};{gx};{gy};{gz}\n

use crate::events::RawReading;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRecord {
    pub index: u32,
    /// g
    pub accel: [f32; 3],
    /// °/s
    pub gyro: [f32; 3],
}

impl SampleRecord {
    pub fn from_raw(index: u32, raw: &RawReading) -> Self {
        Self {
            index,
            accel: raw.accel_g(),
            gyro: raw.gyro_dps(),
        }
    }

    pub fn to_line(&self) -> String {
        let [ax, ay, az] = self.accel;
        let [gx, gy, gz] = self.gyro;
        format!(
            "{};{:.2};{:.2};{:.2};{:.2};{:.2};{:.2}\n",
            self.index, ax, ay, az, gx, gy, gz
        )
    }
}

/// Leading integer field of a log line, if it has one. The header line and
/// torn or garbled lines yield `None`.
pub fn parse_index(line: &str) -> Option<u32> {
    line.split(';').next()?.trim().parse().ok()
}
