//! Session stamp that namespaces every search metric series.

use chrono::{DateTime, Utc};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug)]
struct SessionState {
    base: String,
    generation: u32,
}

impl SessionState {
    fn id(&self) -> String {
        if self.generation == 0 {
            self.base.clone()
        } else {
            format!("{}_{}", self.base, self.generation)
        }
    }
}

/// Holder of the current metrics session id (`s_YYYYMMDD_HHMMSS`, UTC).
///
/// Rotating produces a fresh id, so later increments land on new series and
/// the old ones go stale. Two rotations inside the same second get a
/// `_<n>` suffix to keep ids distinct.
#[derive(Debug)]
pub struct MetricsSession {
    state: RwLock<SessionState>,
}

impl MetricsSession {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            state: RwLock::new(SessionState {
                base: stamp(now),
                generation: 0,
            }),
        }
    }

    pub fn current(&self) -> String {
        self.read().id()
    }

    /// Switches to a session derived from `now` and returns its id.
    pub fn rotate(&self, now: DateTime<Utc>) -> String {
        let base = stamp(now);
        let mut state = self.write();
        if state.base == base {
            state.generation += 1;
        } else {
            state.base = base;
            state.generation = 0;
        }
        state.id()
    }

    /// `base` suffixed with the current session id.
    pub fn series(&self, base: &str) -> String {
        format!("{base}_{}", self.current())
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Session stamp for `now`.
pub fn stamp(now: DateTime<Utc>) -> String {
    now.format("s_%Y%m%d_%H%M%S").to_string()
}
