// Reduced-motion preference. Injected once at mount, refreshed by host change events,
// and passed by value into every animated component.

use serde::{Deserialize, Serialize};

/// Motion mode every animation is sampled under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Motion {
    #[default]
    Full,
    Reduced,
}

impl Motion {
    pub fn from_reduced(reduced: bool) -> Self {
        if reduced {
            Motion::Reduced
        } else {
            Motion::Full
        }
    }

    pub fn is_reduced(&self) -> bool {
        matches!(self, Motion::Reduced)
    }

    /// Choose between the full and the reduced value.
    pub fn pick<T>(&self, full: T, reduced: T) -> T {
        match self {
            Motion::Full => full,
            Motion::Reduced => reduced,
        }
    }
}

/// Holder of the OS-level preference for the session.
#[derive(Debug, Clone, Default)]
pub struct MotionPreference {
    motion: Motion,
}

impl MotionPreference {
    pub fn new(reduced: bool) -> Self {
        MotionPreference {
            motion: Motion::from_reduced(reduced),
        }
    }

    pub fn current(&self) -> Motion {
        self.motion
    }

    /// Apply a change notification. Returns the new mode only when it differs.
    pub fn update(&mut self, reduced: bool) -> Option<Motion> {
        let next = Motion::from_reduced(reduced);
        if next == self.motion {
            return None;
        }
        self.motion = next;
        tracing::debug!(?next, "reduced-motion preference changed");
        Some(next)
    }
}
