// Scroll-progress animators: map normalized progress over a scroll window through
// piecewise-linear ranges. Under reduced motion every range collapses to a constant.

use kurbo::Rect;
use serde::{Deserialize, Serialize};

use crate::easing::lerp;
use crate::motion::Motion;

/// Document scroll state as last reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ScrollState {
    pub offset_y: f64,
    pub document_height: f64,
    pub viewport_height: f64,
}

impl ScrollState {
    /// Progress over the whole scrollable range.
    pub fn document_progress(&self) -> f64 {
        window_progress(
            self.offset_y,
            0.0,
            self.document_height - self.viewport_height,
        )
    }

    /// Progress of a target (document coordinates) through `offsets`.
    pub fn element_progress(&self, target: Rect, offsets: &ScrollOffsets) -> f64 {
        let start = target.y0 + offsets.target_start * target.height()
            - offsets.viewport_start * self.viewport_height;
        let end = target.y0 + offsets.target_end * target.height()
            - offsets.viewport_end * self.viewport_height;
        window_progress(self.offset_y, start, end)
    }
}

/// clamp01((position - start) / (end - start)). A collapsed window is a step.
pub fn window_progress(position: f64, start: f64, end: f64) -> f64 {
    if !position.is_finite() || !start.is_finite() || !end.is_finite() {
        return 0.0;
    }
    let span = end - start;
    if span <= 0.0 {
        return if position >= start { 1.0 } else { 0.0 };
    }
    ((position - start) / span).clamp(0.0, 1.0)
}

/// Scroll window as "target edge meets viewport line" pairs, all as fractions.
/// `target_start = 0, viewport_start = 0.8` reads as CSS `start 80%`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollOffsets {
    pub target_start: f64,
    pub viewport_start: f64,
    pub target_end: f64,
    pub viewport_end: f64,
}

impl ScrollOffsets {
    /// `start 80%` → `end 20%`.
    pub const HEADING: ScrollOffsets = ScrollOffsets {
        target_start: 0.0,
        viewport_start: 0.8,
        target_end: 1.0,
        viewport_end: 0.2,
    };
}

/// Piecewise-linear map from progress to an output value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollTransform {
    /// `(progress, value)` stops, sorted by progress.
    stops: Vec<(f64, f64)>,
    /// Constant used under reduced motion.
    rest: f64,
}

impl ScrollTransform {
    pub fn new(stops: Vec<(f64, f64)>, rest: f64) -> Self {
        let mut stops = stops;
        stops.sort_by(|a, b| a.0.total_cmp(&b.0));
        ScrollTransform { stops, rest }
    }

    /// Single range over [0, 1].
    pub fn linear(from: f64, to: f64, rest: f64) -> Self {
        ScrollTransform::new(vec![(0.0, from), (1.0, to)], rest)
    }

    /// Output range actually used under `motion`.
    pub fn range(&self, motion: Motion) -> (f64, f64) {
        match (motion, self.stops.first(), self.stops.last()) {
            (Motion::Reduced, _, _) | (_, None, _) | (_, _, None) => (self.rest, self.rest),
            (Motion::Full, Some(first), Some(last)) => (first.1, last.1),
        }
    }

    pub fn map(&self, progress: f64, motion: Motion) -> f64 {
        if motion.is_reduced() || self.stops.is_empty() {
            return self.rest;
        }
        let p = progress.clamp(0.0, 1.0);
        let first = self.stops[0];
        if p <= first.0 {
            return first.1;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if p <= b.0 {
                let span = b.0 - a.0;
                if span <= 0.0 {
                    return b.1;
                }
                return lerp(a.1, b.1, (p - a.0) / span);
            }
        }
        self.stops[self.stops.len() - 1].1
    }
}

/// Background grid drift, tied to document progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct GridFrame {
    pub x: f64,
    pub y: f64,
    pub opacity: f64,
}

/// Heading parallax, tied to its own progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ParallaxFrame {
    pub y: f64,
    pub opacity: f64,
}

/// Global scroll-linked effects.
#[derive(Debug, Clone)]
pub struct GlobalScrollEffects {
    grid_x: ScrollTransform,
    grid_y: ScrollTransform,
    grid_opacity: ScrollTransform,
    hud_scale: ScrollTransform,
}

impl Default for GlobalScrollEffects {
    fn default() -> Self {
        GlobalScrollEffects {
            grid_x: ScrollTransform::linear(0.0, -120.0, 0.0),
            grid_y: ScrollTransform::linear(0.0, -80.0, 0.0),
            grid_opacity: ScrollTransform::linear(0.14, 0.08, 0.14),
            hud_scale: ScrollTransform::linear(1.0, 0.98, 1.0),
        }
    }
}

impl GlobalScrollEffects {
    pub fn grid(&self, scroll: &ScrollState, motion: Motion) -> GridFrame {
        let p = scroll.document_progress();
        GridFrame {
            x: self.grid_x.map(p, motion),
            y: self.grid_y.map(p, motion),
            opacity: self.grid_opacity.map(p, motion),
        }
    }

    pub fn hud_scale(&self, scroll: &ScrollState, motion: Motion) -> f64 {
        self.hud_scale.map(scroll.document_progress(), motion)
    }
}

/// Heading parallax for one page.
#[derive(Debug, Clone)]
pub struct ParallaxAnimator {
    offsets: ScrollOffsets,
    y: ScrollTransform,
    opacity: ScrollTransform,
    /// Target rect in document coordinates, once measured.
    target: Option<Rect>,
}

impl Default for ParallaxAnimator {
    fn default() -> Self {
        ParallaxAnimator {
            offsets: ScrollOffsets::HEADING,
            y: ScrollTransform::linear(24.0, -12.0, 0.0),
            opacity: ScrollTransform::linear(0.0, 1.0, 1.0),
            target: None,
        }
    }
}

impl ParallaxAnimator {
    /// Record the target from a client rect observed at `scroll_offset`.
    pub fn measure(&mut self, client: Rect, scroll_offset: f64) {
        self.target = Some(client + kurbo::Vec2::new(0.0, scroll_offset));
    }

    pub fn target(&self) -> Option<Rect> {
        self.target
    }

    /// Sample against `fallback` (document coordinates) until measured.
    pub fn sample(&self, scroll: &ScrollState, fallback: Rect, motion: Motion) -> ParallaxFrame {
        let p = scroll.element_progress(self.target.unwrap_or(fallback), &self.offsets);
        ParallaxFrame {
            y: self.y.map(p, motion),
            opacity: self.opacity.map(p, motion),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scroll(offset_y: f64) -> ScrollState {
        ScrollState {
            offset_y,
            document_height: 10_000.0,
            viewport_height: 1_000.0,
        }
    }

    #[test]
    fn document_progress_spans_scrollable_range() {
        assert_eq!(scroll(0.0).document_progress(), 0.0);
        assert!((scroll(4_500.0).document_progress() - 0.5).abs() < 1e-9);
        assert_eq!(scroll(9_000.0).document_progress(), 1.0);
        assert_eq!(scroll(12_000.0).document_progress(), 1.0);
    }

    #[test]
    fn unscrollable_document_is_a_step() {
        let s = ScrollState {
            offset_y: 0.0,
            document_height: 500.0,
            viewport_height: 1_000.0,
        };
        assert_eq!(s.document_progress(), 1.0);
    }

    #[test]
    fn heading_window() {
        let target = Rect::new(0.0, 2_000.0, 800.0, 2_200.0);
        // Starts when the top hits 80% of the viewport: 2000 - 800.
        assert_eq!(scroll(1_200.0).element_progress(target, &ScrollOffsets::HEADING), 0.0);
        // Ends when the bottom hits 20%: 2200 - 200.
        assert_eq!(scroll(2_000.0).element_progress(target, &ScrollOffsets::HEADING), 1.0);
        let mid = scroll(1_600.0).element_progress(target, &ScrollOffsets::HEADING);
        assert!((mid - 0.5).abs() < 1e-9);
    }

    #[test]
    fn grid_drifts_with_document() {
        let effects = GlobalScrollEffects::default();
        let end = effects.grid(&scroll(9_000.0), Motion::Full);
        assert_eq!(end.x, -120.0);
        assert_eq!(end.y, -80.0);
        assert!((end.opacity - 0.08).abs() < 1e-12);
    }

    #[test]
    fn reduced_motion_collapses_ranges() {
        let effects = GlobalScrollEffects::default();
        for t in [
            &effects.grid_x,
            &effects.grid_y,
            &effects.grid_opacity,
            &effects.hud_scale,
        ] {
            let (start, end) = t.range(Motion::Reduced);
            assert_eq!(start, end);
        }
        assert_eq!(effects.hud_scale(&scroll(9_000.0), Motion::Reduced), 1.0);
        let grid = effects.grid(&scroll(4_000.0), Motion::Reduced);
        assert_eq!((grid.x, grid.y), (0.0, 0.0));
    }

    #[test]
    fn multi_stop_transform() {
        let t = ScrollTransform::new(vec![(0.5, 1.0), (0.0, 0.0), (1.0, 0.0)], 0.0);
        assert_eq!(t.map(0.0, Motion::Full), 0.0);
        assert_eq!(t.map(0.5, Motion::Full), 1.0);
        assert!((t.map(0.75, Motion::Full) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn parallax_uses_measured_target() {
        let mut parallax = ParallaxAnimator::default();
        let fallback = Rect::new(0.0, 0.0, 800.0, 1_000.0);
        parallax.measure(Rect::new(0.0, 500.0, 800.0, 700.0), 1_500.0);
        assert_eq!(parallax.target(), Some(Rect::new(0.0, 2_000.0, 800.0, 2_200.0)));
        let frame = parallax.sample(&scroll(1_200.0), fallback, Motion::Full);
        assert_eq!(frame.y, 24.0);
        assert_eq!(frame.opacity, 0.0);
        let reduced = parallax.sample(&scroll(1_200.0), fallback, Motion::Reduced);
        assert_eq!(reduced, ParallaxFrame { y: 0.0, opacity: 1.0 });
    }

    proptest! {
        #[test]
        fn reduced_motion_pins_rest_value(
            progress in -2.0f64..3.0,
            offset_y in 0.0f64..20_000.0,
            from in -200.0f64..200.0,
            to in -200.0f64..200.0,
            rest in -200.0f64..200.0,
        ) {
            let t = ScrollTransform::linear(from, to, rest);
            prop_assert_eq!(t.map(progress, Motion::Reduced), rest);

            let parallax = ParallaxAnimator::default();
            let fallback = Rect::new(0.0, 2_000.0, 800.0, 3_000.0);
            let frame = parallax.sample(&scroll(offset_y), fallback, Motion::Reduced);
            prop_assert_eq!(frame, ParallaxFrame { y: 0.0, opacity: 1.0 });
        }

        #[test]
        fn progress_is_normalized(
            position in -1e6f64..1e6,
            start in -1e6f64..1e6,
            len in -1e3f64..1e6,
        ) {
            let p = window_progress(position, start, start + len);
            prop_assert!((0.0..=1.0).contains(&p));
        }
    }
}
