// Motion Logger - Core Library
//
// Everything that decides *what* the logger does: the shared state, the
// button edge dispatcher, the log format and resume scan, and the four
// tasks. Hardware access goes through the traits in `hal`; the ESP-IDF
// implementations are in `drivers` and only build for that target.

pub mod config;
pub mod error;
pub mod events;
pub mod frame;
pub mod hal;
pub mod input;
pub mod record;
pub mod resume;
pub mod signal;
pub mod state;
pub mod tasks;

#[cfg(target_os = "espidf")]
pub mod drivers;

#[cfg(test)]
mod mocks;
