// Motion Logger - Tasks
//
// Four equal-priority threads (FreeRTOS tasks under ESP-IDF), each looping
// forever. They share only `SystemState`; the capture and mount tasks also
// share the storage driver behind a mutex.

pub mod capture;
pub mod display;
pub mod indicator;
pub mod mount;

#[cfg(test)]
mod scenarios;
