// Motion Logger - Shared System State
//
// The activity and the three status flags live in one atomic word, so every
// transition is a single compare-and-swap and a reader never sees a torn
// combination (e.g. capturing and mounting at once). The sample counter is a
// separate atomic; nothing needs it to change together with the flags.

use std::sync::atomic::{AtomicU32, Ordering};

const ACTIVITY_MASK: u32 = 0b111;
const SENSOR_ENABLED: u32 = 1 << 3;
const STORAGE_MOUNTED: u32 = 1 << 4;
const STORAGE_ERROR: u32 = 1 << 5;

/// Which way a storage transition is going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountDirection {
    Mount,
    Unmount,
}

/// What the system is busy with. `Idle` is the only state in which it is ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activity {
    #[default]
    Idle,
    Sampling,
    Writing,
    Transition(MountDirection),
}

impl Activity {
    const fn code(self) -> u32 {
        match self {
            Self::Idle => 0,
            Self::Sampling => 1,
            Self::Writing => 2,
            Self::Transition(MountDirection::Mount) => 3,
            Self::Transition(MountDirection::Unmount) => 4,
        }
    }

    const fn from_code(code: u32) -> Self {
        match code & ACTIVITY_MASK {
            1 => Self::Sampling,
            2 => Self::Writing,
            3 => Self::Transition(MountDirection::Mount),
            4 => Self::Transition(MountDirection::Unmount),
            _ => Self::Idle,
        }
    }
}

const fn with_activity(word: u32, activity: Activity) -> u32 {
    (word & !ACTIVITY_MASK) | activity.code()
}

const fn set_bit(word: u32, bit: u32, on: bool) -> u32 {
    if on {
        word | bit
    } else {
        word & !bit
    }
}

/// Self-consistent copy of the state, taken with one atomic load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub activity: Activity,
    pub sensor_enabled: bool,
    pub storage_mounted: bool,
    pub storage_error: bool,
    pub sample_index: u32,
}

impl Snapshot {
    pub fn ready(&self) -> bool {
        self.activity == Activity::Idle
    }

    pub fn capturing(&self) -> bool {
        self.activity == Activity::Sampling
    }

    pub fn writing(&self) -> bool {
        self.activity == Activity::Writing
    }

    pub fn mounting(&self) -> bool {
        matches!(self.activity, Activity::Transition(_))
    }

    /// Direction of the in-flight storage transition, if any.
    pub fn transition(&self) -> Option<MountDirection> {
        match self.activity {
            Activity::Transition(direction) => Some(direction),
            _ => None,
        }
    }
}

/// State shared by the edge dispatcher and all four tasks.
#[derive(Debug, Default)]
pub struct SystemState {
    word: AtomicU32,
    sample_index: AtomicU32,
}

impl SystemState {
    /// Power-on state: idle, sampling off, nothing mounted, counter at 0.
    pub const fn new() -> Self {
        Self {
            word: AtomicU32::new(0),
            sample_index: AtomicU32::new(0),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let word = self.word.load(Ordering::Acquire);
        Snapshot {
            activity: Activity::from_code(word),
            sensor_enabled: word & SENSOR_ENABLED != 0,
            storage_mounted: word & STORAGE_MOUNTED != 0,
            storage_error: word & STORAGE_ERROR != 0,
            sample_index: self.sample_index.load(Ordering::Acquire),
        }
    }

    // -----------------------------------------------------------------------
    // Sensor toggle (interrupt-safe: one atomic RMW, no locks)
    // -----------------------------------------------------------------------

    /// Flip `sensor_enabled` and return the new value.
    pub fn toggle_sensor(&self) -> bool {
        let previous = self.word.fetch_xor(SENSOR_ENABLED, Ordering::AcqRel);
        previous & SENSOR_ENABLED == 0
    }

    pub fn set_sensor_enabled(&self, enabled: bool) {
        if enabled {
            self.word.fetch_or(SENSOR_ENABLED, Ordering::AcqRel);
        } else {
            self.word.fetch_and(!SENSOR_ENABLED, Ordering::AcqRel);
        }
    }

    // -----------------------------------------------------------------------
    // Capture cycle: Idle -> Sampling -> Writing -> Idle
    // -----------------------------------------------------------------------

    /// Leave Idle for Sampling if sampling is requested, the card is mounted
    /// and nothing else is in flight. Returns `false` when the guard fails.
    pub fn try_begin_capture(&self) -> bool {
        self.update(|word| {
            let idle = Activity::from_code(word) == Activity::Idle;
            let armed = word & (SENSOR_ENABLED | STORAGE_MOUNTED) == SENSOR_ENABLED | STORAGE_MOUNTED;
            (idle && armed).then(|| with_activity(word, Activity::Sampling))
        })
    }

    /// Sampling -> Writing. Fails if a storage transition took over meanwhile.
    pub fn begin_write(&self) -> bool {
        self.update(|word| {
            (Activity::from_code(word) == Activity::Sampling).then(|| with_activity(word, Activity::Writing))
        })
    }

    /// Back to Idle from either capture phase. A transition that displaced
    /// the capture is left alone.
    pub fn finish_capture(&self) {
        self.update(|word| match Activity::from_code(word) {
            Activity::Sampling | Activity::Writing => Some(with_activity(word, Activity::Idle)),
            _ => None,
        });
    }

    pub fn flag_storage_error(&self) {
        self.word.fetch_or(STORAGE_ERROR, Ordering::AcqRel);
    }

    // -----------------------------------------------------------------------
    // Storage transition: Idle -> Transition(direction) -> Idle
    // -----------------------------------------------------------------------

    /// Force sampling off and enter a transition. The direction follows the
    /// mount status at entry. Any capture phase in flight is displaced.
    pub fn begin_transition(&self) -> MountDirection {
        let mut direction = MountDirection::Mount;
        self.update(|word| {
            direction = if word & STORAGE_MOUNTED != 0 {
                MountDirection::Unmount
            } else {
                MountDirection::Mount
            };
            let word = set_bit(word, SENSOR_ENABLED, false);
            Some(with_activity(word, Activity::Transition(direction)))
        });
        direction
    }

    /// Publish the outcome of a transition and return to Idle in one step.
    pub fn finish_transition(&self, mounted: bool, storage_error: bool) {
        self.update(|word| {
            let word = set_bit(word, STORAGE_MOUNTED, mounted);
            let word = set_bit(word, STORAGE_ERROR, storage_error);
            Some(with_activity(word, Activity::Idle))
        });
    }

    // -----------------------------------------------------------------------
    // Sample counter
    // -----------------------------------------------------------------------

    pub fn sample_index(&self) -> u32 {
        self.sample_index.load(Ordering::Acquire)
    }

    pub fn set_sample_index(&self, index: u32) {
        self.sample_index.store(index, Ordering::Release);
    }

    /// Count one persisted record; returns the index that was just written.
    pub fn advance_sample_index(&self) -> u32 {
        self.sample_index.fetch_add(1, Ordering::AcqRel)
    }

    fn update(&self, mut f: impl FnMut(u32) -> Option<u32>) -> bool {
        self.word
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |word| f(word))
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mounted_and_enabled() -> SystemState {
        let state = SystemState::new();
        state.finish_transition(true, false);
        state.set_sensor_enabled(true);
        state
    }

    #[test]
    fn power_on_state_is_ready_and_idle() {
        let snap = SystemState::new().snapshot();
        assert!(snap.ready());
        assert!(!snap.sensor_enabled && !snap.storage_mounted && !snap.storage_error);
        assert_eq!(snap.sample_index, 0);
    }

    #[test]
    fn toggle_sensor_flips_only_its_bit() {
        let state = SystemState::new();
        state.finish_transition(true, true);
        assert!(state.toggle_sensor());
        assert!(state.snapshot().sensor_enabled);
        assert!(!state.toggle_sensor());
        let snap = state.snapshot();
        assert!(!snap.sensor_enabled);
        assert!(snap.storage_mounted && snap.storage_error);
    }

    #[test]
    fn capture_requires_enabled_mounted_and_ready() {
        let state = SystemState::new();
        state.set_sensor_enabled(true);
        assert!(!state.try_begin_capture(), "not mounted");

        let state = SystemState::new();
        state.finish_transition(true, false);
        assert!(!state.try_begin_capture(), "sampling off");

        let state = mounted_and_enabled();
        assert!(state.try_begin_capture());
        assert!(!state.try_begin_capture(), "already capturing");
    }

    #[test]
    fn capture_cycle_walks_through_phases() {
        let state = mounted_and_enabled();
        assert!(state.try_begin_capture());
        let snap = state.snapshot();
        assert!(snap.capturing() && !snap.ready());

        assert!(state.begin_write());
        let snap = state.snapshot();
        assert!(snap.writing() && !snap.capturing());

        state.finish_capture();
        assert!(state.snapshot().ready());
    }

    #[test]
    fn transition_displaces_capture_and_disables_sensor() {
        let state = mounted_and_enabled();
        assert!(state.try_begin_capture());

        assert_eq!(state.begin_transition(), MountDirection::Unmount);
        let snap = state.snapshot();
        assert!(snap.mounting() && !snap.capturing() && !snap.sensor_enabled);

        assert!(!state.begin_write());
        state.finish_capture();
        assert_eq!(state.snapshot().transition(), Some(MountDirection::Unmount));

        state.finish_transition(false, false);
        let snap = state.snapshot();
        assert!(snap.ready() && !snap.storage_mounted);
    }

    #[test]
    fn finish_transition_sets_and_clears_error() {
        let state = SystemState::new();
        assert_eq!(state.begin_transition(), MountDirection::Mount);
        state.finish_transition(false, true);
        assert!(state.snapshot().storage_error);

        state.begin_transition();
        state.finish_transition(true, false);
        let snap = state.snapshot();
        assert!(!snap.storage_error && snap.storage_mounted && snap.ready());
    }

    #[test]
    fn storage_error_survives_capture_cycles() {
        let state = mounted_and_enabled();
        state.flag_storage_error();
        assert!(state.try_begin_capture());
        assert!(state.begin_write());
        state.finish_capture();
        assert!(state.snapshot().storage_error);
    }

    #[test]
    fn activity_flags_are_mutually_exclusive() {
        let activities = [
            Activity::Idle,
            Activity::Sampling,
            Activity::Writing,
            Activity::Transition(MountDirection::Mount),
            Activity::Transition(MountDirection::Unmount),
        ];
        for activity in activities {
            assert_eq!(Activity::from_code(activity.code()), activity);
            let snap = Snapshot { activity, ..Snapshot::default() };
            let busy = [snap.capturing(), snap.writing(), snap.mounting()];
            assert!(busy.iter().filter(|b| **b).count() <= 1);
            assert_eq!(snap.ready(), !busy.iter().any(|b| *b));
        }
    }

    #[test]
    fn counter_advances_and_resets() {
        let state = SystemState::new();
        assert_eq!(state.advance_sample_index(), 0);
        assert_eq!(state.advance_sample_index(), 1);
        assert_eq!(state.sample_index(), 2);
        state.set_sample_index(40);
        assert_eq!(state.snapshot().sample_index, 40);
    }
}
