// Self-drawing vector mark. Every drawable primitive gets {length, offset}; the offset
// runs from length to 0 as a pure function of elapsed time. Each visibility entry
// restarts the draw from hidden. Bad or missing assets fall back to the raster logo.

use kurbo::{BezPath, Rect, Shape};
use serde::{Deserialize, Serialize};
use usvg::tiny_skia_path::PathSegment;

use crate::config::AssetSettings;
use crate::easing::Easing;
use crate::error::LandingError;
use crate::motion::Motion;
use crate::types::{RootMargin, Timestamp};
use crate::visibility::{NonFiniteGeometry, TriggerConfig, VisibilityChange, VisibilityTracker};

/// Accuracy passed to kurbo arc-length estimation, in user units.
const LENGTH_ACCURACY: f64 = 0.25;

/// Observable lifecycle of the mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawState {
    NotLoaded,
    LoadedIdle,
    Drawing,
    Drawn,
    /// Asset unusable; the raster fallback is shown for the rest of the session.
    Fallback,
}

/// One drawable primitive of the asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// Position in document order among drawable primitives.
    pub index: usize,
    /// Element id; empty when the markup has none.
    pub id: String,
    pub length: f64,
}

/// Parsed vector asset.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorAsset {
    pub strokes: Vec<Stroke>,
}

/// Validate a fetch result and measure every drawable primitive.
pub fn parse_asset(status: u16, body: &str, fallback_length: f64) -> Result<VectorAsset, LandingError> {
    if !(200..300).contains(&status) {
        return Err(LandingError::AssetRejected(format!("HTTP status {}", status)));
    }
    if !body.contains("<svg") {
        return Err(LandingError::AssetRejected("missing <svg> markup".into()));
    }
    let tree = usvg::Tree::from_str(body, &usvg::Options::default())
        .map_err(|e| LandingError::AssetRejected(e.to_string()))?;

    let mut strokes = Vec::new();
    collect_strokes(tree.root(), fallback_length, &mut strokes);
    if strokes.is_empty() {
        return Err(LandingError::AssetRejected("no drawable primitives".into()));
    }
    Ok(VectorAsset { strokes })
}

fn collect_strokes(group: &usvg::Group, fallback_length: f64, out: &mut Vec<Stroke>) {
    for node in group.children() {
        match node {
            usvg::Node::Group(g) => collect_strokes(g, fallback_length, out),
            usvg::Node::Path(p) => {
                let length = measure(p.data()).unwrap_or_else(|| {
                    tracing::debug!(id = p.id(), fallback_length, "path length unavailable");
                    fallback_length
                });
                out.push(Stroke {
                    index: out.len(),
                    id: p.id().to_string(),
                    length,
                });
            }
            _ => {}
        }
    }
}

/// Total arc length, or `None` when the geometry does not yield a usable length.
fn measure(path: &usvg::tiny_skia_path::Path) -> Option<f64> {
    let mut bez = BezPath::new();
    for segment in path.segments() {
        match segment {
            PathSegment::MoveTo(p) => bez.move_to((p.x as f64, p.y as f64)),
            PathSegment::LineTo(p) => bez.line_to((p.x as f64, p.y as f64)),
            PathSegment::QuadTo(c, p) => bez.quad_to((c.x as f64, c.y as f64), (p.x as f64, p.y as f64)),
            PathSegment::CubicTo(c1, c2, p) => bez.curve_to(
                (c1.x as f64, c1.y as f64),
                (c2.x as f64, c2.y as f64),
                (p.x as f64, p.y as f64),
            ),
            PathSegment::Close => bez.close_path(),
        }
    }
    let length = bez.perimeter(LENGTH_ACCURACY);
    (length.is_finite() && length > 0.0).then_some(length)
}

/// Stroke styling applied to every primitive so the mark always draws as an outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub linecap: String,
    pub linejoin: String,
    pub vector_effect: String,
}

impl StrokeStyle {
    fn from_assets(assets: &AssetSettings) -> Self {
        StrokeStyle {
            fill: "none".into(),
            stroke: assets.stroke_color.clone(),
            stroke_width: assets.stroke_width,
            linecap: "round".into(),
            linejoin: "round".into(),
            vector_effect: "non-scaling-stroke".into(),
        }
    }
}

/// Dash state of one primitive. The host matches frames to elements by `index`,
/// the document order of `path, line, polyline, polygon, rect, circle, ellipse`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeFrame {
    pub index: usize,
    pub id: String,
    pub dasharray: f64,
    pub dashoffset: f64,
}

/// What the host renders for the mark this frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "render")]
pub enum DrawingFrame {
    Raster {
        src: String,
    },
    Vector {
        /// Bumped on every visibility entry; a new key means a fresh draw.
        draw_key: u32,
        style: StrokeStyle,
        strokes: Vec<StrokeFrame>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    /// Hidden state written; the run starts on the frame after `shown_at`.
    Primed { shown_at: Option<Timestamp> },
    Running { start: Timestamp, duration_secs: f64 },
}

#[derive(Debug, Clone)]
enum Asset {
    Pending,
    Ready(VectorAsset),
    Failed,
}

/// Animator for one self-drawing mark.
#[derive(Debug, Clone)]
pub struct DrawingAnimator {
    tracker: VisibilityTracker,
    asset: Asset,
    phase: Phase,
    draw_key: u32,
    duration_secs: f64,
    easing: Easing,
    fallback_src: String,
    fallback_length: f64,
    style: StrokeStyle,
    mounted: bool,
}

impl DrawingAnimator {
    pub fn new(threshold: f64, duration_secs: f64, fallback_src: String, assets: &AssetSettings) -> Self {
        DrawingAnimator {
            tracker: VisibilityTracker::new(TriggerConfig::new(threshold, RootMargin::default())),
            asset: Asset::Pending,
            phase: Phase::Idle,
            draw_key: 0,
            duration_secs,
            easing: Easing::HOUSE,
            fallback_src,
            fallback_length: assets.fallback_stroke_length,
            style: StrokeStyle::from_assets(assets),
            mounted: true,
        }
    }

    pub fn draw_key(&self) -> u32 {
        self.draw_key
    }

    pub fn state(&self, now: Timestamp) -> DrawState {
        match (&self.asset, self.phase) {
            (Asset::Pending, _) => DrawState::NotLoaded,
            (Asset::Failed, _) => DrawState::Fallback,
            (Asset::Ready(_), Phase::Idle) => DrawState::LoadedIdle,
            (Asset::Ready(_), Phase::Primed { .. }) => DrawState::Drawing,
            (Asset::Ready(_), Phase::Running { start, duration_secs }) => {
                if now.secs_since(start) >= duration_secs {
                    DrawState::Drawn
                } else {
                    DrawState::Drawing
                }
            }
        }
    }

    /// Fetch completed. Ignored after teardown.
    pub fn on_fetch(&mut self, status: u16, body: &str, motion: Motion, now: Timestamp) {
        if !self.mounted {
            return;
        }
        match parse_asset(status, body, self.fallback_length) {
            Ok(asset) => {
                tracing::debug!(strokes = asset.strokes.len(), "vector asset ready");
                self.asset = Asset::Ready(asset);
                if self.tracker.is_active() {
                    self.begin(motion, now);
                }
            }
            Err(err) => self.on_fetch_failed(&err.to_string()),
        }
    }

    /// Network-level failure, or unusable content.
    pub fn on_fetch_failed(&mut self, reason: &str) {
        if !self.mounted {
            return;
        }
        tracing::warn!(reason, fallback = %self.fallback_src, "vector asset unavailable, using raster fallback");
        self.asset = Asset::Failed;
        self.phase = Phase::Idle;
    }

    pub fn observe(
        &mut self,
        bounds: Rect,
        root: Rect,
        motion: Motion,
        now: Timestamp,
    ) -> Result<Option<VisibilityChange>, NonFiniteGeometry> {
        let change = self.tracker.observe(bounds, root)?;
        if change == Some(VisibilityChange::Entered) && self.mounted {
            self.draw_key = self.draw_key.wrapping_add(1);
            if matches!(self.asset, Asset::Ready(_)) {
                self.begin(motion, now);
            }
        }
        Ok(change)
    }

    fn begin(&mut self, motion: Motion, now: Timestamp) {
        self.phase = if motion.is_reduced() {
            Phase::Running {
                start: now,
                duration_secs: 0.0,
            }
        } else {
            Phase::Primed { shown_at: None }
        };
    }

    /// Animation-frame tick. The hidden state must be on screen for one frame
    /// before the run starts, or the browser collapses the transition.
    pub fn advance(&mut self, motion: Motion, now: Timestamp) {
        if let Phase::Primed { shown_at } = self.phase {
            match shown_at {
                None => self.phase = Phase::Primed { shown_at: Some(now) },
                Some(shown) if now > shown => {
                    self.phase = Phase::Running {
                        start: now,
                        duration_secs: motion.pick(self.duration_secs, 0.0),
                    }
                }
                Some(_) => {}
            }
        }
    }

    /// Switching to reduced motion finishes a draw in flight.
    pub fn set_motion(&mut self, motion: Motion, now: Timestamp) {
        if motion.is_reduced() && matches!(self.phase, Phase::Primed { .. } | Phase::Running { .. }) {
            self.phase = Phase::Running {
                start: now,
                duration_secs: 0.0,
            };
        }
    }

    /// Cancel pending frame work and stop accepting fetch results.
    pub fn teardown(&mut self) {
        self.mounted = false;
        if matches!(self.phase, Phase::Primed { .. }) {
            self.phase = Phase::Idle;
        }
    }

    /// Reduced motion applies to runs already in flight: any started draw shows complete.
    fn offset_fraction(&self, motion: Motion, now: Timestamp) -> f64 {
        match self.phase {
            Phase::Idle => 1.0,
            Phase::Primed { .. } | Phase::Running { .. } if motion.is_reduced() => 0.0,
            Phase::Primed { .. } => 1.0,
            Phase::Running { start, duration_secs } => {
                if duration_secs <= 0.0 {
                    return 0.0;
                }
                let t = (now.secs_since(start) / duration_secs).clamp(0.0, 1.0);
                if t >= 1.0 {
                    0.0
                } else {
                    1.0 - self.easing.apply(t)
                }
            }
        }
    }

    pub fn sample(&self, motion: Motion, now: Timestamp) -> DrawingFrame {
        let Asset::Ready(asset) = &self.asset else {
            return DrawingFrame::Raster {
                src: self.fallback_src.clone(),
            };
        };
        let fraction = self.offset_fraction(motion, now);
        DrawingFrame::Vector {
            draw_key: self.draw_key,
            style: self.style.clone(),
            strokes: asset
                .strokes
                .iter()
                .map(|s| StrokeFrame {
                    index: s.index,
                    id: s.id.clone(),
                    dasharray: s.length,
                    dashoffset: s.length * fraction,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 200 200">
        <path id="bar" d="M 0 0 L 60 80" stroke="black" fill="none"/>
        <g><rect id="box" x="10" y="10" width="50" height="30" stroke="black" fill="none"/></g>
    </svg>"#;

    const ROOT: Rect = Rect::new(0.0, 0.0, 1000.0, 1000.0);
    const IN_VIEW: Rect = Rect::new(0.0, 100.0, 1000.0, 900.0);
    const OUT_OF_VIEW: Rect = Rect::new(0.0, 1500.0, 1000.0, 2300.0);

    fn ms(n: u64) -> Timestamp {
        Timestamp::from_millis(n)
    }

    fn animator() -> DrawingAnimator {
        DrawingAnimator::new(0.75, 1.8, "/assets/logo.png".into(), &AssetSettings::default())
    }

    fn offsets(frame: &DrawingFrame) -> Vec<(f64, f64)> {
        match frame {
            DrawingFrame::Vector { strokes, .. } => {
                strokes.iter().map(|s| (s.dasharray, s.dashoffset)).collect()
            }
            DrawingFrame::Raster { .. } => panic!("expected vector frame"),
        }
    }

    #[test]
    fn measures_primitives() {
        let asset = parse_asset(200, SVG, 1200.0).unwrap();
        assert_eq!(asset.strokes.len(), 2);
        assert_eq!(asset.strokes[0].id, "bar");
        assert!((asset.strokes[0].length - 100.0).abs() < 0.5);
        assert!((asset.strokes[1].length - 160.0).abs() < 0.5);
    }

    #[test]
    fn rejects_bad_responses() {
        assert!(parse_asset(404, SVG, 1200.0).is_err());
        assert!(parse_asset(200, "<html>not found</html>", 1200.0).is_err());
        assert!(parse_asset(200, "<svg", 1200.0).is_err());
    }

    #[test]
    fn raster_until_loaded_and_on_failure() {
        let mut a = animator();
        assert_eq!(a.state(ms(0)), DrawState::NotLoaded);
        assert!(matches!(a.sample(Motion::Full, ms(0)), DrawingFrame::Raster { .. }));
        a.on_fetch(500, "", Motion::Full, ms(0));
        assert_eq!(a.state(ms(0)), DrawState::Fallback);
        assert_eq!(
            a.sample(Motion::Full, ms(0)),
            DrawingFrame::Raster {
                src: "/assets/logo.png".into()
            }
        );
    }

    #[test]
    fn draws_and_redraws_on_reentry() {
        let mut a = animator();
        a.on_fetch(200, SVG, Motion::Full, ms(0));
        assert_eq!(a.state(ms(0)), DrawState::LoadedIdle);

        a.observe(IN_VIEW, ROOT, Motion::Full, ms(100)).unwrap();
        assert_eq!(a.draw_key(), 1);
        a.advance(Motion::Full, ms(116));
        for (len, off) in offsets(&a.sample(Motion::Full, ms(116))) {
            assert_eq!(off, len, "primed frame is fully hidden");
        }
        a.advance(Motion::Full, ms(133));
        assert_eq!(a.state(ms(133)), DrawState::Drawing);
        for (len, off) in offsets(&a.sample(Motion::Full, ms(133))) {
            assert_eq!(off, len, "run starts from hidden");
        }

        let done = ms(133 + 1_800);
        assert_eq!(a.state(done), DrawState::Drawn);
        assert!(offsets(&a.sample(Motion::Full, done)).iter().all(|&(_, off)| off == 0.0));

        a.observe(OUT_OF_VIEW, ROOT, Motion::Full, ms(3_000)).unwrap();
        a.observe(IN_VIEW, ROOT, Motion::Full, ms(4_000)).unwrap();
        assert_eq!(a.draw_key(), 2);
        for (len, off) in offsets(&a.sample(Motion::Full, ms(4_000))) {
            assert_eq!(off, len);
        }
    }

    #[test]
    fn loads_while_visible_starts_drawing() {
        let mut a = animator();
        a.observe(IN_VIEW, ROOT, Motion::Full, ms(0)).unwrap();
        a.on_fetch(200, SVG, Motion::Full, ms(50));
        assert_eq!(a.state(ms(50)), DrawState::Drawing);
    }

    #[test]
    fn reduced_motion_reveals_instantly() {
        let mut a = animator();
        a.on_fetch(200, SVG, Motion::Reduced, ms(0));
        a.observe(IN_VIEW, ROOT, Motion::Reduced, ms(10)).unwrap();
        assert_eq!(a.state(ms(10)), DrawState::Drawn);
        assert!(offsets(&a.sample(Motion::Reduced, ms(10))).iter().all(|&(_, off)| off == 0.0));
    }

    #[test]
    fn reduced_motion_mid_draw_completes() {
        let mut a = animator();
        a.on_fetch(200, SVG, Motion::Full, ms(0));
        a.observe(IN_VIEW, ROOT, Motion::Full, ms(10)).unwrap();
        a.advance(Motion::Full, ms(16));
        a.advance(Motion::Full, ms(33));
        assert!(offsets(&a.sample(Motion::Full, ms(40))).iter().all(|&(len, off)| off > len * 0.5));

        // The frame reads the new preference before the event lands.
        assert!(offsets(&a.sample(Motion::Reduced, ms(40))).iter().all(|&(_, off)| off == 0.0));

        a.set_motion(Motion::Reduced, ms(50));
        assert_eq!(a.state(ms(50)), DrawState::Drawn);
        assert!(offsets(&a.sample(Motion::Reduced, ms(60))).iter().all(|&(_, off)| off == 0.0));
    }

    #[test]
    fn unlabeled_primitives_keep_document_order() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 200 200">
            <path d="M 0 0 L 60 80" stroke="black" fill="none"/>
            <path d="M 0 100 L 54 172" stroke="black" fill="none"/>
            <path d="M 100 0 L 130 40" stroke="black" fill="none"/>
        </svg>"#;
        let asset = parse_asset(200, svg, 1200.0).unwrap();
        let indices: Vec<usize> = asset.strokes.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(asset.strokes.iter().all(|s| s.id.is_empty()));
        assert!((asset.strokes[1].length - 90.0).abs() < 0.5);

        let mut a = animator();
        a.on_fetch(200, svg, Motion::Full, ms(0));
        match a.sample(Motion::Full, ms(0)) {
            DrawingFrame::Vector { strokes, .. } => {
                let framed: Vec<(usize, f64)> = strokes.iter().map(|s| (s.index, s.dasharray)).collect();
                assert_eq!(framed.len(), 3);
                assert_eq!(framed[2].0, 2);
                assert!((framed[2].1 - 50.0).abs() < 0.5);
            }
            DrawingFrame::Raster { .. } => panic!("expected vector frame"),
        }
    }

    #[test]
    fn fetch_after_teardown_is_ignored() {
        let mut a = animator();
        a.teardown();
        a.on_fetch(200, SVG, Motion::Full, ms(0));
        assert_eq!(a.state(ms(0)), DrawState::NotLoaded);
    }

    #[test]
    fn teardown_cancels_pending_kickoff() {
        let mut a = animator();
        a.on_fetch(200, SVG, Motion::Full, ms(0));
        a.observe(IN_VIEW, ROOT, Motion::Full, ms(10)).unwrap();
        a.teardown();
        a.advance(Motion::Full, ms(20));
        a.advance(Motion::Full, ms(40));
        assert_eq!(a.state(ms(40)), DrawState::LoadedIdle);
    }

    proptest! {
        #[test]
        fn offsets_stay_within_length(
            steps in proptest::collection::vec((0u8..4, 1u64..400), 1..40),
            reduced in any::<bool>(),
        ) {
            let motion = Motion::from_reduced(reduced);
            let mut a = animator();
            a.on_fetch(200, SVG, motion, ms(0));
            let mut now = 0;
            for (op, delta) in steps {
                now += delta;
                match op {
                    0 => { a.observe(IN_VIEW, ROOT, motion, ms(now)).unwrap(); }
                    1 => { a.observe(OUT_OF_VIEW, ROOT, motion, ms(now)).unwrap(); }
                    2 => a.advance(motion, ms(now)),
                    _ => a.set_motion(Motion::Reduced, ms(now)),
                }
                for (len, off) in offsets(&a.sample(motion, ms(now))) {
                    prop_assert!(off >= 0.0 && off <= len, "offset {} outside [0, {}]", off, len);
                }
            }
        }
    }
}
