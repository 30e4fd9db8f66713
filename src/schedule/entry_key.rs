use crate::window::TimeInterval;

/// A total-order key for `f64` using IEEE-754 total order (`total_cmp`).
/// This lets `f64`-backed times serve as `BTreeMap` keys.
///
/// NaN is meaningless as a time, so it is rejected on insert.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct F64Key(pub(crate) f64);

impl F64Key {
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Eq for F64Key {}

impl Ord for F64Key {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for F64Key {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// A task execution placed on a platform timeline.
///
/// `task` is the task's position in the instance task list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry {
    pub(crate) task: usize,
    pub(crate) window: TimeInterval,
    pub(crate) interval: TimeInterval,
}

impl Entry {
    pub fn new(task: usize, window: TimeInterval, interval: TimeInterval) -> Self {
        Self {
            task,
            window,
            interval,
        }
    }

    pub fn task(&self) -> usize {
        self.task
    }

    /// The chosen window the execution sits in.
    pub fn window(&self) -> TimeInterval {
        self.window
    }

    /// The execution interval.
    pub fn interval(&self) -> TimeInterval {
        self.interval
    }
}
