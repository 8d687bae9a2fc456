// Motion Logger - Indicator Task
//
// Maps the system state onto the RGB LED, first match wins:
//   ready          -> green
//   capturing      -> red
//   storage error  -> red + blue, blinking
//   mounting       -> red + green
//   writing        -> blue, blinking
//   otherwise      -> off

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::{BLINK_ON_MS, INDICATOR_POLL_MS};
use crate::hal::{LedColor, RgbIndicator};
use crate::state::{Snapshot, SystemState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorPattern {
    Steady(LedColor),
    /// On for `BLINK_ON_MS`, then off until the next poll.
    Blink(LedColor),
}

pub fn indicator_pattern(snap: &Snapshot) -> IndicatorPattern {
    if snap.ready() {
        IndicatorPattern::Steady(LedColor::GREEN)
    } else if snap.capturing() {
        IndicatorPattern::Steady(LedColor::RED)
    } else if snap.storage_error {
        IndicatorPattern::Blink(LedColor::RED_BLUE)
    } else if snap.mounting() {
        IndicatorPattern::Steady(LedColor::RED_GREEN)
    } else if snap.writing() {
        IndicatorPattern::Blink(LedColor::BLUE)
    } else {
        IndicatorPattern::Steady(LedColor::OFF)
    }
}

pub struct IndicatorTask<L> {
    state: Arc<SystemState>,
    led: L,
    blink_on: Duration,
}

impl<L: RgbIndicator> IndicatorTask<L> {
    pub fn new(state: Arc<SystemState>, led: L) -> Self {
        Self {
            state,
            led,
            blink_on: Duration::from_millis(BLINK_ON_MS),
        }
    }

    /// Evaluate the state once and drive the LED. A blink occupies its on-time
    /// inside this call and leaves the LED off.
    pub fn step(&mut self) -> anyhow::Result<IndicatorPattern> {
        let pattern = indicator_pattern(&self.state.snapshot());
        match pattern {
            IndicatorPattern::Steady(color) => self.led.set(color)?,
            IndicatorPattern::Blink(color) => {
                self.led.set(color)?;
                thread::sleep(self.blink_on);
                self.led.set(LedColor::OFF)?;
            }
        }
        Ok(pattern)
    }
}

/// Task entry point. Never returns.
pub fn indicator_task<L: RgbIndicator>(state: Arc<SystemState>, mut led: L) -> ! {
    log::info!("Indicator task started");

    if let Err(e) = led.set(LedColor::OFF) {
        log::warn!("LED init error: {:#}", e);
    }
    let mut task = IndicatorTask::new(state, led);
    let poll_interval = Duration::from_millis(INDICATOR_POLL_MS);

    loop {
        if let Err(e) = task.step() {
            log::warn!("LED error: {:#}", e);
        }
        thread::sleep(poll_interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockLed;
    use crate::state::{Activity, MountDirection};

    fn snap(activity: Activity, storage_error: bool) -> Snapshot {
        Snapshot {
            activity,
            storage_error,
            ..Snapshot::default()
        }
    }

    #[test]
    fn precedence_follows_activity() {
        use IndicatorPattern::*;
        let cases = [
            (snap(Activity::Idle, true), Steady(LedColor::GREEN)),
            (snap(Activity::Sampling, true), Steady(LedColor::RED)),
            (snap(Activity::Writing, true), Blink(LedColor::RED_BLUE)),
            (snap(Activity::Transition(MountDirection::Mount), true), Blink(LedColor::RED_BLUE)),
            (snap(Activity::Transition(MountDirection::Unmount), false), Steady(LedColor::RED_GREEN)),
            (snap(Activity::Writing, false), Blink(LedColor::BLUE)),
        ];
        for (snapshot, expected) in cases {
            assert_eq!(indicator_pattern(&snapshot), expected, "{:?}", snapshot);
        }
    }

    #[test]
    fn blink_ends_with_led_off() {
        let state = Arc::new(SystemState::new());
        state.finish_transition(true, false);
        state.set_sensor_enabled(true);
        assert!(state.try_begin_capture());
        assert!(state.begin_write());

        let mut task = IndicatorTask::new(Arc::clone(&state), MockLed::default());
        task.blink_on = Duration::ZERO;
        assert_eq!(task.step().unwrap(), IndicatorPattern::Blink(LedColor::BLUE));
        assert_eq!(task.led.history, [LedColor::BLUE, LedColor::OFF]);
    }

    #[test]
    fn ready_state_is_steady_green() {
        let mut task = IndicatorTask::new(Arc::new(SystemState::new()), MockLed::default());
        task.step().unwrap();
        assert_eq!(task.led.history, [LedColor::GREEN]);
    }
}
