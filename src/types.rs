// Strong typing over strings. Newtypes for timestamps, page indices, ratios and margins.
// Geometry is kurbo in CSS pixels, viewport-relative, y growing downwards.

use kurbo::{Rect, Size};
use serde::{Deserialize, Serialize};

/// Timestamp in microseconds. Newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn from_micros(us: u64) -> Self {
        Timestamp(us)
    }

    pub fn from_millis(ms: u64) -> Self {
        Timestamp(ms.saturating_mul(1000))
    }

    pub fn as_micros(&self) -> u64 {
        self.0
    }

    pub fn as_millis(&self) -> f64 {
        self.0 as f64 / 1000.0
    }

    pub fn as_secs(&self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    /// Shift forward by a duration in seconds. Negative or non-finite input is a no-op.
    pub fn offset_secs(&self, secs: f64) -> Self {
        if !secs.is_finite() || secs <= 0.0 {
            return *self;
        }
        Timestamp(self.0.saturating_add((secs * 1_000_000.0).round() as u64))
    }

    /// Seconds elapsed since `earlier`, zero if `earlier` is in the future.
    pub fn secs_since(&self, earlier: Timestamp) -> f64 {
        self.0.saturating_sub(earlier.0) as f64 / 1_000_000.0
    }
}

/// 1-based page index. Page order is fixed at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PageIndex(u32);

impl PageIndex {
    pub const FIRST: PageIndex = PageIndex(1);

    /// Returns `None` for 0; pages are numbered from 1.
    pub fn new(index: u32) -> Option<Self> {
        (index >= 1).then_some(PageIndex(index))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for PageIndex {
    type Error = String;

    fn try_from(index: u32) -> Result<Self, Self::Error> {
        PageIndex::new(index).ok_or_else(|| "page index must be at least 1".to_string())
    }
}

impl From<PageIndex> for u32 {
    fn from(page: PageIndex) -> u32 {
        page.0
    }
}

impl Default for PageIndex {
    fn default() -> Self {
        PageIndex::FIRST
    }
}

impl std::fmt::Display for PageIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fraction in [0, 1]. Used for intersection ratios and thresholds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, Default)]
pub struct Ratio(f64);

impl Ratio {
    pub const ZERO: Ratio = Ratio(0.0);
    pub const ONE: Ratio = Ratio(1.0);

    /// Clamps into [0, 1]; NaN maps to 0.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            Ratio(0.0)
        } else {
            Ratio(value.clamp(0.0, 1.0))
        }
    }

    pub fn get(&self) -> f64 {
        self.0
    }
}

/// One side of a root margin, CSS style.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Length {
    Px(f64),
    /// Percent of the root's extent along the same axis.
    Percent(f64),
}

impl Length {
    fn resolve(&self, extent: f64) -> f64 {
        match *self {
            Length::Px(px) => px,
            Length::Percent(pct) => extent * pct / 100.0,
        }
    }
}

impl Default for Length {
    fn default() -> Self {
        Length::Px(0.0)
    }
}

/// Grows (positive) or shrinks (negative) the effective viewport before
/// intersecting, for early or late triggering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct RootMargin {
    #[serde(default)]
    pub top: Length,
    #[serde(default)]
    pub right: Length,
    #[serde(default)]
    pub bottom: Length,
    #[serde(default)]
    pub left: Length,
}

impl RootMargin {
    /// Margin that only moves the bottom edge, e.g. `0px 0px -10% 0px`.
    pub fn bottom(length: Length) -> Self {
        RootMargin {
            bottom: length,
            ..Default::default()
        }
    }

    pub fn apply(&self, root: Rect) -> Rect {
        let (w, h) = (root.width(), root.height());
        Rect::new(
            root.x0 - self.left.resolve(w),
            root.y0 - self.top.resolve(h),
            root.x1 + self.right.resolve(w),
            root.y1 + self.bottom.resolve(h),
        )
    }
}

/// Visible-area fraction of `target` inside the margin-adjusted `root`.
/// Returns `None` when either rectangle holds non-finite coordinates.
pub fn intersection_ratio(target: Rect, root: Rect, margin: &RootMargin) -> Option<Ratio> {
    if !target.is_finite() || !root.is_finite() {
        return None;
    }
    let target = target.abs();
    let root = margin.apply(root.abs());
    let area = target.area();
    if area <= 0.0 {
        // Zero-area targets count as fully visible when they sit inside the root.
        let inside = target.x0 >= root.x0
            && target.x0 <= root.x1
            && target.y0 >= root.y0
            && target.y0 <= root.y1;
        return Some(if inside { Ratio::ONE } else { Ratio::ZERO });
    }
    Some(Ratio::new(target.intersect(root).area() / area))
}

/// Responsive breakpoint derived from viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Breakpoint {
    #[default]
    Base,
    /// Medium and up.
    Md,
}

impl Breakpoint {
    pub fn from_width(width: f64, md_min_width: f64) -> Self {
        if width >= md_min_width {
            Breakpoint::Md
        } else {
            Breakpoint::Base
        }
    }
}

/// What an intersection or media event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TargetId {
    /// The full-viewport section of a page.
    Section { page: PageIndex },
    /// Block `block` (0-based, in config order) inside a page.
    Block { page: PageIndex, block: usize },
}

impl TargetId {
    pub fn page(&self) -> PageIndex {
        match *self {
            TargetId::Section { page } | TargetId::Block { page, .. } => page,
        }
    }
}

/// Batch of host events (minimizes JS↔WASM crossings).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventBatch {
    pub events: Vec<HostEvent>,
}

/// Single observation forwarded by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostEvent {
    pub timestamp: Timestamp,
    pub event_type: EventType,
}

/// Type of host observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventType {
    /// Viewport size at mount or after a resize.
    Viewport { size: Size },
    /// Document scroll position. Applied on the next animation frame.
    Scroll {
        offset_y: f64,
        document_height: f64,
    },
    /// Intersection observer entry. `bounds` is the target's client rect,
    /// `root` the viewport rect. Videos also report their playback position.
    Intersection {
        target: TargetId,
        bounds: Rect,
        root: Rect,
        #[serde(default)]
        media_time: Option<f64>,
    },
    /// Reduced-motion media query value, at mount and on every change.
    ReducedMotion { reduced: bool },
    /// Vector asset fetch completed (any status).
    AssetLoaded {
        target: TargetId,
        status: u16,
        body: String,
    },
    /// Vector asset fetch failed at the network level.
    AssetFailed { target: TargetId, reason: String },
    /// `play()` promise resolved.
    PlayResolved { target: TargetId, generation: u32 },
    /// `play()` promise rejected (autoplay policy).
    PlayRejected { target: TargetId, generation: u32 },
}
