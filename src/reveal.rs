// Reveal-on-view: entrance transition (offset, opacity, blur) started whenever a block
// crosses its threshold on the way in. Leaving resets, so scrolling back replays it.

use kurbo::Rect;
use serde::{Deserialize, Serialize};

use crate::config::TimingSettings;
use crate::easing::{lerp, Easing};
use crate::motion::Motion;
use crate::types::{RootMargin, Timestamp};
use crate::visibility::{NonFiniteGeometry, TriggerConfig, VisibilityChange, VisibilityTracker};

/// Shape and timing of an entrance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevealStyle {
    pub offset_px: f64,
    pub blur_px: f64,
    pub duration_secs: f64,
    pub reduced_duration_secs: f64,
    pub stagger_secs: f64,
    pub easing: Easing,
}

impl RevealStyle {
    /// Text entrance from the timing table.
    pub fn text(timing: &TimingSettings) -> Self {
        RevealStyle {
            offset_px: timing.reveal_offset_px,
            blur_px: timing.reveal_blur_px,
            duration_secs: timing.reveal_secs,
            reduced_duration_secs: timing.reveal_reduced_secs,
            stagger_secs: timing.stagger_secs,
            easing: Easing::HOUSE,
        }
    }

    /// Opacity-only fade; instant under reduced motion.
    pub fn fade(duration_secs: f64) -> Self {
        RevealStyle {
            offset_px: 0.0,
            blur_px: 0.0,
            duration_secs,
            reduced_duration_secs: 0.0,
            stagger_secs: 0.0,
            easing: Easing::HOUSE,
        }
    }

    pub fn duration(&self, motion: Motion) -> f64 {
        motion.pick(self.duration_secs, self.reduced_duration_secs)
    }

    pub fn stagger(&self, motion: Motion) -> f64 {
        motion.pick(self.stagger_secs, 0.0)
    }
}

/// Visual state of one revealed element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevealFrame {
    pub translate_y: f64,
    pub opacity: f64,
    pub blur_px: f64,
}

impl RevealFrame {
    pub const SHOWN: RevealFrame = RevealFrame {
        translate_y: 0.0,
        opacity: 1.0,
        blur_px: 0.0,
    };
}

/// Entrance state machine without its own tracker.
#[derive(Debug, Clone)]
pub struct Reveal {
    style: RevealStyle,
    once: bool,
    started: Option<Timestamp>,
}

impl Reveal {
    pub fn new(style: RevealStyle, once: bool) -> Self {
        Reveal {
            style,
            once,
            started: None,
        }
    }

    pub fn style(&self) -> &RevealStyle {
        &self.style
    }

    pub fn on_change(&mut self, change: VisibilityChange, now: Timestamp) {
        match change {
            VisibilityChange::Entered => {
                if !(self.once && self.started.is_some()) {
                    self.started = Some(now);
                }
            }
            VisibilityChange::Left => {
                if !self.once {
                    self.started = None;
                }
            }
        }
    }

    fn hidden(&self, motion: Motion) -> RevealFrame {
        RevealFrame {
            translate_y: motion.pick(self.style.offset_px, 0.0),
            opacity: 0.0,
            blur_px: motion.pick(self.style.blur_px, 0.0),
        }
    }

    /// Sample with an extra start delay (used for staggering).
    pub fn sample(&self, delay_secs: f64, motion: Motion, now: Timestamp) -> RevealFrame {
        let Some(started) = self.started else {
            return self.hidden(motion);
        };
        let start = started.offset_secs(delay_secs);
        if now < start {
            return self.hidden(motion);
        }
        let duration = self.style.duration(motion);
        if duration <= 0.0 {
            return RevealFrame::SHOWN;
        }
        let t = (now.secs_since(start) / duration).clamp(0.0, 1.0);
        if t >= 1.0 {
            return RevealFrame::SHOWN;
        }
        let eased = self.style.easing.apply(t);
        let from = self.hidden(motion);
        RevealFrame {
            translate_y: lerp(from.translate_y, 0.0, eased),
            opacity: lerp(0.0, 1.0, eased),
            blur_px: lerp(from.blur_px, 0.0, eased),
        }
    }
}

/// A tracked group of text blocks revealed together, optionally cascading.
#[derive(Debug, Clone)]
pub struct RevealGroup {
    tracker: VisibilityTracker,
    reveal: Reveal,
    children: usize,
    staggered: bool,
}

impl RevealGroup {
    pub fn new(
        threshold: f64,
        children: usize,
        staggered: bool,
        once: bool,
        style: RevealStyle,
    ) -> Self {
        RevealGroup {
            tracker: VisibilityTracker::new(TriggerConfig::new(threshold, RootMargin::default())),
            reveal: Reveal::new(style, once),
            children: children.max(1),
            staggered,
        }
    }

    pub fn observe(
        &mut self,
        bounds: Rect,
        root: Rect,
        now: Timestamp,
    ) -> Result<Option<VisibilityChange>, NonFiniteGeometry> {
        let change = self.tracker.observe(bounds, root)?;
        if let Some(change) = change {
            self.reveal.on_change(change, now);
        }
        Ok(change)
    }

    /// One frame per child, in order.
    pub fn sample(&self, motion: Motion, now: Timestamp) -> Vec<RevealFrame> {
        let stagger = if self.staggered {
            self.reveal.style().stagger(motion)
        } else {
            0.0
        };
        (0..self.children)
            .map(|i| self.reveal.sample(i as f64 * stagger, motion, now))
            .collect()
    }
}
