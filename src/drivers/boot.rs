// Motion Logger - Firmware-Update Reboot
//
// Latches "force download boot" in the RTC option register and restarts,
// so the ROM bootloader comes up waiting for a new image over USB/UART.
// Nothing is flushed: an in-flight SD write may be lost.

use crate::signal::ResetControl;

// ESP32-C3 RTC_CNTL_OPTION1_REG and its FORCE_DOWNLOAD_BOOT bit.
const RTC_CNTL_OPTION1_REG: usize = 0x6000_8000 + 0x0128;
const RTC_CNTL_FORCE_DOWNLOAD_BOOT: u32 = 1 << 0;

#[derive(Debug, Clone, Copy, Default)]
pub struct DownloadModeReset;

impl ResetControl for DownloadModeReset {
    fn reboot_to_bootloader(&self) {
        unsafe {
            let option1 = RTC_CNTL_OPTION1_REG as *mut u32;
            option1.write_volatile(option1.read_volatile() | RTC_CNTL_FORCE_DOWNLOAD_BOOT);
            esp_idf_sys::esp_restart();
        }
    }
}
