// Visibility tracking over host-forwarded intersection geometry.
// Emits one change per active/inactive transition; repeated observations are silent.

use kurbo::Rect;
use serde::{Deserialize, Serialize};

use crate::types::{intersection_ratio, Ratio, RootMargin};

/// Threshold and margin for one observed element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriggerConfig {
    pub threshold: Ratio,
    pub root_margin: RootMargin,
}

impl TriggerConfig {
    pub fn new(threshold: f64, root_margin: RootMargin) -> Self {
        TriggerConfig {
            threshold: Ratio::new(threshold),
            root_margin,
        }
    }

    /// A threshold of 0 means "any overlap at all".
    pub fn is_met(&self, ratio: Ratio) -> bool {
        if self.threshold.get() <= 0.0 {
            ratio.get() > 0.0
        } else {
            ratio >= self.threshold
        }
    }
}

/// Direction of a visibility transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisibilityChange {
    Entered,
    Left,
}

impl VisibilityChange {
    pub fn is_active(&self) -> bool {
        matches!(self, VisibilityChange::Entered)
    }
}

/// Why an observation could not be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonFiniteGeometry;

/// Per-element visibility state. Starts inactive.
#[derive(Debug, Clone)]
pub struct VisibilityTracker {
    trigger: TriggerConfig,
    active: bool,
    ratio: Ratio,
}

impl VisibilityTracker {
    pub fn new(trigger: TriggerConfig) -> Self {
        VisibilityTracker {
            trigger,
            active: false,
            ratio: Ratio::ZERO,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn ratio(&self) -> Ratio {
        self.ratio
    }

    pub fn trigger(&self) -> &TriggerConfig {
        &self.trigger
    }

    /// Evaluate an intersection entry. Returns the transition, if any.
    pub fn observe(
        &mut self,
        bounds: Rect,
        root: Rect,
    ) -> Result<Option<VisibilityChange>, NonFiniteGeometry> {
        let ratio =
            intersection_ratio(bounds, root, &self.trigger.root_margin).ok_or(NonFiniteGeometry)?;
        Ok(self.observe_ratio(ratio))
    }

    /// Evaluate an already-computed ratio.
    pub fn observe_ratio(&mut self, ratio: Ratio) -> Option<VisibilityChange> {
        self.ratio = ratio;
        let active = self.trigger.is_met(ratio);
        if active == self.active {
            return None;
        }
        self.active = active;
        Some(if active {
            VisibilityChange::Entered
        } else {
            VisibilityChange::Left
        })
    }
}
