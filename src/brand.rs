// Brand choreography: one shared logo + wordmark element driven by the current page.
// Centered and compact renders carry the same identity key, so the element travels
// between them instead of cross-fading. Layouts are pure functions of viewport size.

use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

use crate::config::{BrandMapping, BrandSettings};
use crate::easing::{Easing, Lerp, Tween};
use crate::motion::Motion;
use crate::types::{Breakpoint, PageIndex, Timestamp};

/// Identity key shared by every render of the travelling brand element.
pub const BRAND_KEY: &str = "brand";

const EDGE_INSET_PX: f64 = 16.0;
const CENTERED_LOGO_PX: f64 = 280.0;
const EXIT_SECS: f64 = 0.25;

/// Visual variant of the brand element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrandVariant {
    /// No brand; the page shows the self-drawing mark instead.
    Hidden,
    /// Large and centered, wordmark typed in after a delay.
    Centered,
    /// Small, pinned top-left.
    Compact,
    /// Static corner mark plus a "Log in" affordance.
    Corner,
}

impl BrandVariant {
    pub fn identity_key(&self) -> Option<&'static str> {
        match self {
            BrandVariant::Centered | BrandVariant::Compact => Some(BRAND_KEY),
            BrandVariant::Hidden | BrandVariant::Corner => None,
        }
    }

    fn shows_chrome(&self) -> bool {
        matches!(self, BrandVariant::Compact | BrandVariant::Corner)
    }
}

/// Resolve the variant for a page from the configured mapping.
pub fn variant_for(page: PageIndex, mapping: &[BrandMapping], default: BrandVariant) -> BrandVariant {
    mapping
        .iter()
        .find(|m| m.page == page.get())
        .map(|m| m.variant)
        .unwrap_or(default)
}

/// Screen placement of the brand element.
///
/// `anchor` is a viewport point in px; `align` is the fraction of the element's own
/// box placed on the anchor, so `(0.5, 0.5)` centers and `(0, 0)` pins the top-left
/// corner. Every field interpolates linearly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrandLayout {
    pub anchor: Point,
    pub align: Point,
    pub logo_px: f64,
    pub wordmark_px: f64,
    pub offset_y: f64,
    pub scale: f64,
    pub opacity: f64,
}

impl Lerp for BrandLayout {
    fn lerp(self, to: Self, t: f64) -> Self {
        BrandLayout {
            anchor: self.anchor.lerp(to.anchor, t),
            align: self.align.lerp(to.align, t),
            logo_px: self.logo_px.lerp(to.logo_px, t),
            wordmark_px: self.wordmark_px.lerp(to.wordmark_px, t),
            offset_y: self.offset_y.lerp(to.offset_y, t),
            scale: self.scale.lerp(to.scale, t),
            // Springs overshoot; opacity must not.
            opacity: self.opacity.lerp(to.opacity, t).clamp(0.0, 1.0),
        }
    }
}

impl BrandLayout {
    /// Resting layout of a variant. `None` for variants without the shared element.
    pub fn resting(variant: BrandVariant, viewport: Size, breakpoint: Breakpoint) -> Option<Self> {
        let md = breakpoint == Breakpoint::Md;
        match variant {
            BrandVariant::Centered => Some(BrandLayout {
                anchor: Point::new(viewport.width / 2.0, viewport.height / 2.0),
                align: Point::new(0.5, 0.5),
                logo_px: CENTERED_LOGO_PX,
                wordmark_px: viewport.width * if md { 0.08 } else { 0.14 },
                offset_y: 0.0,
                scale: 1.0,
                opacity: 1.0,
            }),
            BrandVariant::Compact => Some(BrandLayout {
                anchor: Point::new(EDGE_INSET_PX, EDGE_INSET_PX),
                align: Point::ZERO,
                logo_px: if md { 64.0 } else { 52.0 },
                wordmark_px: if md { 36.0 } else { 28.0 },
                offset_y: 0.0,
                scale: 1.0,
                opacity: 1.0,
            }),
            BrandVariant::Hidden | BrandVariant::Corner => None,
        }
    }

    /// Where the element starts when it appears without a predecessor.
    fn entrance_from(self, variant: BrandVariant, motion: Motion) -> Self {
        match variant {
            BrandVariant::Centered => BrandLayout {
                offset_y: motion.pick(18.0, 0.0),
                scale: 0.98,
                opacity: 0.0,
                ..self
            },
            _ => BrandLayout {
                offset_y: motion.pick(-8.0, 0.0),
                opacity: 0.0,
                ..self
            },
        }
    }

    /// The compact HUD settles with a spring; everything else uses the house curve.
    fn entrance_easing(variant: BrandVariant) -> Easing {
        match variant {
            BrandVariant::Compact => Easing::Spring,
            _ => Easing::HOUSE,
        }
    }

    fn faded(self) -> Self {
        BrandLayout {
            opacity: 0.0,
            ..self
        }
    }
}

/// One render of the brand element in a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandElementFrame {
    /// Identity key; equal keys across frames mean the same element.
    pub key: Option<String>,
    pub layout: BrandLayout,
    /// Number of wordmark characters currently shown.
    pub wordmark_chars: usize,
}

/// Brand state for one animation frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandFrame {
    pub variant: BrandVariant,
    pub element: Option<BrandElementFrame>,
    /// Element fading out after its variant went away.
    pub exiting: Option<BrandElementFrame>,
    pub corner_mark: bool,
    pub login: bool,
}

#[derive(Debug, Clone)]
struct Shown {
    key: Option<&'static str>,
    tween: Tween<BrandLayout>,
}

/// State machine selecting and animating the brand variant.
#[derive(Debug, Clone)]
pub struct BrandChoreographer {
    settings: BrandSettings,
    viewport: Size,
    breakpoint: Breakpoint,
    variant: BrandVariant,
    shown: Option<Shown>,
    exiting: Option<Tween<BrandLayout>>,
    typewriter_start: Option<Timestamp>,
}

impl BrandChoreographer {
    pub fn new(settings: BrandSettings) -> Self {
        let variant = variant_for(PageIndex::FIRST, &settings.variants, settings.default_variant);
        BrandChoreographer {
            settings,
            viewport: Size::ZERO,
            breakpoint: Breakpoint::Base,
            variant,
            shown: None,
            exiting: None,
            typewriter_start: None,
        }
    }

    pub fn variant(&self) -> BrandVariant {
        self.variant
    }

    /// Responsive update. Running transitions snap to the new resting layout.
    pub fn set_viewport(&mut self, viewport: Size, breakpoint: Breakpoint) {
        self.viewport = viewport;
        self.breakpoint = breakpoint;
        if let Some(shown) = self.shown.as_mut() {
            if let Some(rest) = BrandLayout::resting(self.variant, viewport, breakpoint) {
                shown.tween = Tween::settled(rest);
            }
        }
    }

    /// React to the current page. Returns the new variant when it changed.
    pub fn on_page(&mut self, page: PageIndex, motion: Motion, now: Timestamp) -> Option<BrandVariant> {
        let next = variant_for(page, &self.settings.variants, self.settings.default_variant);
        if next == self.variant {
            return None;
        }
        tracing::debug!(from = ?self.variant, to = ?next, %page, "brand variant changed");
        self.transition(next, motion, now);
        Some(next)
    }

    fn transition(&mut self, next: BrandVariant, motion: Motion, now: Timestamp) {
        let key = next.identity_key();
        let morph_secs = motion.pick(self.settings.morph_secs, 0.0);
        let current = self.shown.take().map(|s| (s.key, s.tween.sample(now)));

        match (BrandLayout::resting(next, self.viewport, self.breakpoint), current) {
            // Same identity on both sides: travel from wherever the element is now.
            (Some(target), Some((prev_key, from))) if prev_key.is_some() && prev_key == key => {
                self.shown = Some(Shown {
                    key,
                    tween: Tween::new(from, target, now, morph_secs, Easing::HOUSE),
                });
            }
            (Some(target), previous) => {
                if let Some((_, from)) = previous {
                    self.start_exit(from, motion, now);
                }
                self.shown = Some(Shown {
                    key,
                    tween: Tween::new(
                        target.entrance_from(next, motion),
                        target,
                        now,
                        morph_secs,
                        BrandLayout::entrance_easing(next),
                    ),
                });
            }
            (None, Some((_, from))) => self.start_exit(from, motion, now),
            (None, None) => {}
        }

        self.typewriter_start = match next {
            BrandVariant::Centered => {
                Some(now.offset_secs(self.settings.typewriter_delay_ms as f64 / 1000.0))
            }
            _ => None,
        };
        self.variant = next;
    }

    fn start_exit(&mut self, from: BrandLayout, motion: Motion, now: Timestamp) {
        self.exiting = if motion.is_reduced() {
            None
        } else {
            Some(Tween::new(from, from.faded(), now, EXIT_SECS, Easing::EaseOut))
        };
    }

    /// Characters of the wordmark visible at `now`.
    pub fn wordmark_chars(&self, motion: Motion, now: Timestamp) -> usize {
        let total = self.settings.wordmark.chars().count();
        let Some(start) = self.typewriter_start else {
            return total;
        };
        if motion.is_reduced() {
            return total;
        }
        if now < start {
            return 0;
        }
        let step = self.settings.typewriter_step_ms.max(1) as f64;
        let typed = 1 + (now.secs_since(start) * 1000.0 / step).floor() as usize;
        typed.min(total)
    }

    pub fn sample(&self, motion: Motion, now: Timestamp) -> BrandFrame {
        let chars = self.wordmark_chars(motion, now);
        let element = self.shown.as_ref().map(|shown| BrandElementFrame {
            key: shown.key.map(str::to_string),
            layout: if motion.is_reduced() {
                shown.tween.to
            } else {
                shown.tween.sample(now)
            },
            wordmark_chars: chars,
        });
        let exiting = self
            .exiting
            .as_ref()
            .filter(|tween| !motion.is_reduced() && !tween.is_finished(now))
            .map(|tween| BrandElementFrame {
                key: None,
                layout: tween.sample(now),
                wordmark_chars: self.settings.wordmark.chars().count(),
            });

        BrandFrame {
            variant: self.variant,
            element,
            exiting,
            corner_mark: self.variant == BrandVariant::Corner,
            login: self.variant.shows_chrome(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(n: u32) -> PageIndex {
        PageIndex::new(n).unwrap()
    }

    fn ms(n: u64) -> Timestamp {
        Timestamp::from_millis(n)
    }

    fn choreographer() -> BrandChoreographer {
        let mut c = BrandChoreographer::new(BrandSettings::default());
        c.set_viewport(Size::new(1280.0, 800.0), Breakpoint::Md);
        c
    }

    #[test]
    fn mapping_covers_every_page() {
        let settings = BrandSettings::default();
        let v = |n| variant_for(page(n), &settings.variants, settings.default_variant);
        assert_eq!(v(1), BrandVariant::Hidden);
        assert_eq!(v(2), BrandVariant::Centered);
        assert_eq!(v(3), BrandVariant::Compact);
        assert_eq!(v(4), BrandVariant::Corner);
        assert_eq!(v(12), BrandVariant::Corner);
    }

    #[test]
    fn page_one_renders_no_brand() {
        let c = choreographer();
        let frame = c.sample(Motion::Full, ms(0));
        assert_eq!(frame.variant, BrandVariant::Hidden);
        assert!(frame.element.is_none());
        assert!(!frame.login);
    }

    #[test]
    fn page_two_is_centered() {
        let mut c = choreographer();
        c.on_page(page(2), Motion::Full, ms(0));
        let frame = c.sample(Motion::Full, ms(2_000));
        let element = frame.element.unwrap();
        assert_eq!(element.layout.anchor, Point::new(640.0, 400.0));
        assert_eq!(element.layout.align, Point::new(0.5, 0.5));
        assert_eq!(element.layout.opacity, 1.0);
        assert_eq!(element.key.as_deref(), Some(BRAND_KEY));
    }

    #[test]
    fn typewriter_waits_then_types() {
        let mut c = choreographer();
        c.on_page(page(2), Motion::Full, ms(1_000));
        assert_eq!(c.wordmark_chars(Motion::Full, ms(1_500)), 0);
        assert_eq!(c.wordmark_chars(Motion::Full, ms(1_600)), 1);
        assert_eq!(c.wordmark_chars(Motion::Full, ms(1_740)), 3);
        assert_eq!(c.wordmark_chars(Motion::Full, ms(9_000)), "Lif3away".len());
    }

    #[test]
    fn page_three_morphs_the_same_element() {
        let mut c = choreographer();
        c.on_page(page(2), Motion::Full, ms(0));
        let centered = c.sample(Motion::Full, ms(1_000)).element.unwrap();

        c.on_page(page(3), Motion::Full, ms(1_000));
        let start = c.sample(Motion::Full, ms(1_000));
        let start_el = start.element.clone().unwrap();
        assert_eq!(start_el.key, centered.key, "continuity needs a shared key");
        assert_eq!(start_el.layout, centered.layout, "morph starts where the element was");
        assert!(start.exiting.is_none(), "no cross-fade copy");

        let mid = c.sample(Motion::Full, ms(1_250)).element.unwrap();
        assert!(mid.layout.logo_px < centered.layout.logo_px);
        assert!(mid.layout.logo_px > 64.0);

        let end = c.sample(Motion::Full, ms(2_000)).element.unwrap();
        assert_eq!(end.layout.anchor, Point::new(16.0, 16.0));
        assert_eq!(end.layout.align, Point::ZERO);
        assert_eq!(end.layout.logo_px, 64.0);
        assert!(c.sample(Motion::Full, ms(2_000)).login);
    }

    #[test]
    fn compact_entrance_springs_into_place() {
        let mut c = choreographer();
        c.on_page(page(3), Motion::Full, ms(0));
        let start = c.sample(Motion::Full, ms(0)).element.unwrap();
        assert_eq!(start.layout.offset_y, -8.0);
        assert_eq!(start.layout.opacity, 0.0);

        let early = c.sample(Motion::Full, ms(50)).element.unwrap();
        assert!(early.layout.offset_y > 0.0, "spring overshoots its rest position");
        assert_eq!(early.layout.opacity, 1.0);

        let rest = c.sample(Motion::Full, ms(500)).element.unwrap();
        assert_eq!(rest.layout.offset_y, 0.0);
        assert_eq!(rest.layout.anchor, Point::new(16.0, 16.0));
    }

    #[test]
    fn later_pages_show_corner_chrome() {
        let mut c = choreographer();
        c.on_page(page(3), Motion::Full, ms(0));
        c.on_page(page(5), Motion::Full, ms(1_000));
        let frame = c.sample(Motion::Full, ms(1_100));
        assert_eq!(frame.variant, BrandVariant::Corner);
        assert!(frame.element.is_none());
        assert!(frame.corner_mark);
        assert!(frame.login);
        assert!(frame.exiting.is_some(), "compact brand fades out");
        assert!(c.sample(Motion::Full, ms(2_000)).exiting.is_none());
    }

    #[test]
    fn same_variant_is_a_no_op() {
        let mut c = choreographer();
        assert!(c.on_page(page(4), Motion::Full, ms(0)).is_some());
        assert!(c.on_page(page(7), Motion::Full, ms(10)).is_none());
    }

    #[test]
    fn reduced_motion_is_instant() {
        let mut c = choreographer();
        c.on_page(page(2), Motion::Reduced, ms(0));
        let frame = c.sample(Motion::Reduced, ms(0));
        let element = frame.element.unwrap();
        assert_eq!(element.layout.opacity, 1.0);
        assert_eq!(element.wordmark_chars, "Lif3away".len());

        c.on_page(page(3), Motion::Reduced, ms(10));
        let element = c.sample(Motion::Reduced, ms(10)).element.unwrap();
        assert_eq!(element.layout.anchor, Point::new(16.0, 16.0));

        c.on_page(page(4), Motion::Reduced, ms(20));
        assert!(c.sample(Motion::Reduced, ms(20)).exiting.is_none());
    }

    #[test]
    fn centered_size_follows_breakpoint() {
        let narrow = BrandLayout::resting(BrandVariant::Centered, Size::new(400.0, 800.0), Breakpoint::Base).unwrap();
        let wide = BrandLayout::resting(BrandVariant::Centered, Size::new(1000.0, 800.0), Breakpoint::Md).unwrap();
        assert!((narrow.wordmark_px - 56.0).abs() < 1e-9);
        assert!((wide.wordmark_px - 80.0).abs() < 1e-9);
    }

    #[test]
    fn interrupted_morph_reverses_from_current_position() {
        let mut c = choreographer();
        c.on_page(page(2), Motion::Full, ms(0));
        c.on_page(page(3), Motion::Full, ms(1_000));
        let mid = c.sample(Motion::Full, ms(1_200)).element.unwrap();
        c.on_page(page(2), Motion::Full, ms(1_200));
        let back = c.sample(Motion::Full, ms(1_200)).element.unwrap();
        assert_eq!(back.layout, mid.layout);
    }
}
