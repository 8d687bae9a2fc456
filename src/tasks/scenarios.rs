//! End-to-end runs of the dispatcher and tasks over the mock drivers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::config::LOG_HEADER;
use crate::events::{Button, ButtonEvent, RawReading};
use crate::hal::{lock_storage, SharedStorage};
use crate::input::EdgeDispatcher;
use crate::mocks::{MockSensor, MockStorage, ResetRecorder};
use crate::record::parse_index;
use crate::signal::BinarySignal;
use crate::state::SystemState;
use crate::tasks::capture::CaptureTask;
use crate::tasks::mount::MountTask;

struct Rig {
    state: Arc<SystemState>,
    storage: SharedStorage<MockStorage>,
    signal: Arc<BinarySignal>,
    reset: Arc<ResetRecorder>,
    dispatcher: EdgeDispatcher<Arc<BinarySignal>, Arc<ResetRecorder>>,
    capture: CaptureTask<MockSensor, MockStorage>,
    mount: MountTask<MockStorage>,
    clock_ms: u32,
}

impl Rig {
    fn new(storage: MockStorage) -> Self {
        let state = Arc::new(SystemState::new());
        let storage = Arc::new(Mutex::new(storage));
        let signal = Arc::new(BinarySignal::new());
        let reset = Arc::new(ResetRecorder::default());
        let sensor = MockSensor {
            reading: RawReading {
                accel: [1638, -1638, 16384],
                gyro: [0, 655, -131],
                temp: 340,
            },
            ..MockSensor::default()
        };
        Self {
            dispatcher: EdgeDispatcher::new(Arc::clone(&state), Arc::clone(&signal), Arc::clone(&reset)),
            capture: CaptureTask::new(Arc::clone(&state), sensor, Arc::clone(&storage)),
            mount: MountTask::new(Arc::clone(&state), Arc::clone(&storage)),
            state,
            storage,
            signal,
            reset,
            clock_ms: 1_000,
        }
    }

    /// Press a button well clear of the debounce window.
    fn press(&mut self, button: Button) -> Option<ButtonEvent> {
        self.clock_ms += 1_000;
        self.dispatcher.on_edge(button, self.clock_ms)
    }

    /// Storage button plus the mount task consuming the wake-up.
    fn toggle_storage(&mut self) {
        self.press(Button::Storage);
        assert!(self.signal.try_take());
        let _ = self.mount.transition();
    }

    fn capture(&mut self, cycles: usize) {
        for _ in 0..cycles {
            self.capture.cycle().unwrap();
        }
    }

    fn logged_indices(&self) -> Vec<u32> {
        lock_storage(&self.storage)
            .lines()
            .iter()
            .skip(1)
            .filter_map(|line| parse_index(line))
            .collect()
    }
}

#[test]
fn scenario_a_three_captures_after_mount() {
    let mut rig = Rig::new(MockStorage::default());
    rig.toggle_storage();
    rig.press(Button::Sensor);
    rig.capture(3);

    let lines = lock_storage(&rig.storage).lines();
    assert_eq!(lines[0], LOG_HEADER.trim_end());
    assert_eq!(lines[1], "0;0.10;-0.10;1.00;0.00;5.00;-1.00");
    assert_eq!(rig.logged_indices(), [0, 1, 2]);
    assert_eq!(rig.state.sample_index(), 3);
}

#[test]
fn scenario_b_remount_resumes_counter() {
    let mut rig = Rig::new(MockStorage::default());
    rig.toggle_storage();
    rig.press(Button::Sensor);
    rig.capture(2);

    rig.toggle_storage();
    assert!(!rig.state.snapshot().storage_mounted);
    rig.state.set_sample_index(0);

    rig.toggle_storage();
    assert_eq!(rig.state.sample_index(), 2);

    // Mounting switched sampling off; the operator turns it back on.
    assert!(!rig.state.snapshot().sensor_enabled);
    rig.press(Button::Sensor);
    rig.capture(1);
    assert_eq!(rig.logged_indices(), [0, 1, 2]);
}

#[test]
fn scenario_c_failed_mount_never_touches_log() {
    let mut rig = Rig::new(MockStorage {
        fail_mount: true,
        ..MockStorage::default()
    });
    rig.toggle_storage();

    let snap = rig.state.snapshot();
    assert!(snap.storage_error && !snap.storage_mounted && snap.ready());

    rig.press(Button::Sensor);
    rig.capture(2);
    assert_eq!(lock_storage(&rig.storage).file_accesses, 0);
}

#[test]
fn scenario_d_emergency_reset_does_not_wait_for_write() {
    let mut rig = Rig::new(MockStorage::default());
    rig.toggle_storage();
    rig.press(Button::Sensor);
    assert!(rig.state.try_begin_capture());
    assert!(rig.state.begin_write());

    assert_eq!(rig.press(Button::Reset), Some(ButtonEvent::EmergencyReset));
    assert_eq!(rig.reset.count(), 1);
    assert!(rig.state.snapshot().writing(), "no cleanup before reset");
}

#[test]
fn concurrent_tasks_never_show_two_activities() {
    let mut rig = Rig::new(MockStorage::default());
    rig.toggle_storage();

    let stop = Arc::new(AtomicBool::new(false));
    let observer = {
        let state = Arc::clone(&rig.state);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut observed = 0usize;
            loop {
                let snap = state.snapshot();
                let busy = [snap.capturing(), snap.writing(), snap.mounting()];
                assert!(busy.iter().filter(|b| **b).count() <= 1, "{:?}", snap);
                assert_eq!(snap.ready(), !busy.iter().any(|b| *b));
                observed += 1;
                if stop.load(Ordering::Relaxed) {
                    break;
                }
            }
            observed
        })
    };

    let Rig { state, mut capture, mut mount, .. } = rig;
    let capturer = {
        let state = Arc::clone(&state);
        thread::spawn(move || {
            for _ in 0..2_000 {
                state.set_sensor_enabled(true);
                let _ = capture.cycle();
            }
        })
    };
    for _ in 0..200 {
        let _ = mount.transition();
    }

    capturer.join().unwrap();
    stop.store(true, Ordering::Relaxed);
    assert!(observer.join().unwrap() > 0);

    assert!(state.snapshot().ready());
}
