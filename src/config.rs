// Landing configuration passed from JS. Page table and brand mapping are data, not code.
// Every field has a serde default so `{}` yields the canonical 12-page layout.

use serde::{Deserialize, Serialize};

use crate::brand::BrandVariant;
use crate::error::LandingError;
use crate::types::{Length, PageIndex, RootMargin};

/// Engine configuration passed from JS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandingConfig {
    #[serde(default = "canonical_pages")]
    pub pages: Vec<PageSpec>,
    #[serde(default)]
    pub brand: BrandSettings,
    #[serde(default)]
    pub timing: TimingSettings,
    #[serde(default)]
    pub assets: AssetSettings,
    /// Minimum viewport width for the `md` breakpoint.
    #[serde(default = "default_md_min_width")]
    pub md_min_width: f64,
    /// Gap between consecutive sections, laid out by the host.
    #[serde(default = "default_spacer_px")]
    pub spacer_px: f64,
    /// `prefers-reduced-motion` as read at mount, before the first frame.
    #[serde(default)]
    pub reduced_motion: bool,
}

impl Default for LandingConfig {
    fn default() -> Self {
        LandingConfig {
            pages: canonical_pages(),
            brand: BrandSettings::default(),
            timing: TimingSettings::default(),
            assets: AssetSettings::default(),
            md_min_width: default_md_min_width(),
            spacer_px: default_spacer_px(),
            reduced_motion: false,
        }
    }
}

/// One full-viewport section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSpec {
    pub index: u32,
    /// Fraction of the section that must intersect for it to become current.
    #[serde(default = "default_section_threshold")]
    pub threshold: f64,
    #[serde(default)]
    pub root_margin: RootMargin,
    #[serde(default)]
    pub blocks: Vec<BlockSpec>,
}

impl PageSpec {
    fn new(index: u32, blocks: Vec<BlockSpec>) -> Self {
        PageSpec {
            index,
            threshold: default_section_threshold(),
            root_margin: RootMargin::default(),
            blocks,
        }
    }
}

/// Animated content inside a page. The content itself stays with the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BlockSpec {
    /// Self-drawing vector mark with a raster fallback.
    Drawing {
        src: String,
        fallback: String,
        #[serde(default = "default_drawing_threshold")]
        threshold: f64,
    },
    /// Slot where the shared brand element rests on its page.
    Brand,
    /// Heading with scroll-linked vertical parallax.
    Parallax,
    /// Reveal-on-view group of `children` text blocks.
    RevealGroup {
        #[serde(default = "default_children")]
        children: usize,
        #[serde(default = "default_reveal_threshold")]
        threshold: f64,
        /// Reveal only the first time. Default replays on every re-entry.
        #[serde(default)]
        once: bool,
        /// Cascade children with a per-child delay.
        #[serde(default)]
        staggered: bool,
    },
    /// Muted inline video that plays only while visible.
    Video {
        src: String,
        #[serde(default = "default_video_threshold")]
        threshold: f64,
        #[serde(default = "default_video_margin")]
        root_margin: RootMargin,
    },
}

impl BlockSpec {
    fn threshold(&self) -> Option<f64> {
        match self {
            BlockSpec::Drawing { threshold, .. }
            | BlockSpec::RevealGroup { threshold, .. }
            | BlockSpec::Video { threshold, .. } => Some(*threshold),
            BlockSpec::Brand | BlockSpec::Parallax => None,
        }
    }

    fn reveal(children: usize) -> Self {
        BlockSpec::RevealGroup {
            children,
            threshold: default_reveal_threshold(),
            once: false,
            staggered: false,
        }
    }

    fn video(src: &str) -> Self {
        BlockSpec::Video {
            src: src.to_string(),
            threshold: default_video_threshold(),
            root_margin: default_video_margin(),
        }
    }
}

/// Explicit page → brand variant entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BrandMapping {
    pub page: u32,
    pub variant: BrandVariant,
}

/// Brand choreography settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandSettings {
    #[serde(default = "default_brand_mapping")]
    pub variants: Vec<BrandMapping>,
    /// Variant for every page not listed in `variants`.
    #[serde(default = "default_brand_variant")]
    pub default_variant: BrandVariant,
    #[serde(default = "default_wordmark")]
    pub wordmark: String,
    /// Delay before the first wordmark character appears.
    #[serde(default = "default_typewriter_delay_ms")]
    pub typewriter_delay_ms: u64,
    /// Interval between wordmark characters.
    #[serde(default = "default_typewriter_step_ms")]
    pub typewriter_step_ms: u64,
    /// Duration of the centered ↔ compact morph.
    #[serde(default = "default_morph_secs")]
    pub morph_secs: f64,
}

impl Default for BrandSettings {
    fn default() -> Self {
        BrandSettings {
            variants: default_brand_mapping(),
            default_variant: default_brand_variant(),
            wordmark: default_wordmark(),
            typewriter_delay_ms: default_typewriter_delay_ms(),
            typewriter_step_ms: default_typewriter_step_ms(),
            morph_secs: default_morph_secs(),
        }
    }
}

/// Animation timing. Reduced-motion values sit beside the full ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingSettings {
    #[serde(default = "default_reveal_secs")]
    pub reveal_secs: f64,
    #[serde(default = "default_reveal_reduced_secs")]
    pub reveal_reduced_secs: f64,
    #[serde(default = "default_stagger_secs")]
    pub stagger_secs: f64,
    #[serde(default = "default_reveal_offset_px")]
    pub reveal_offset_px: f64,
    #[serde(default = "default_reveal_blur_px")]
    pub reveal_blur_px: f64,
    #[serde(default = "default_drawing_secs")]
    pub drawing_secs: f64,
    #[serde(default = "default_video_fade_secs")]
    pub video_fade_secs: f64,
    /// Playback rate while a video is in view and motion is not reduced.
    #[serde(default = "default_fast_rate")]
    pub fast_rate: f64,
    /// Videos at or before this position seek here before playing.
    #[serde(default = "default_seek_floor_secs")]
    pub seek_floor_secs: f64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        TimingSettings {
            reveal_secs: default_reveal_secs(),
            reveal_reduced_secs: default_reveal_reduced_secs(),
            stagger_secs: default_stagger_secs(),
            reveal_offset_px: default_reveal_offset_px(),
            reveal_blur_px: default_reveal_blur_px(),
            drawing_secs: default_drawing_secs(),
            video_fade_secs: default_video_fade_secs(),
            fast_rate: default_fast_rate(),
            seek_floor_secs: default_seek_floor_secs(),
        }
    }
}

/// Fixed asset paths and stroke styling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetSettings {
    #[serde(default = "default_logo")]
    pub logo: String,
    /// Stroke length used when a primitive cannot be measured.
    #[serde(default = "default_fallback_stroke_length")]
    pub fallback_stroke_length: f64,
    #[serde(default = "default_stroke_color")]
    pub stroke_color: String,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
}

impl Default for AssetSettings {
    fn default() -> Self {
        AssetSettings {
            logo: default_logo(),
            fallback_stroke_length: default_fallback_stroke_length(),
            stroke_color: default_stroke_color(),
            stroke_width: default_stroke_width(),
        }
    }
}

impl LandingConfig {
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    pub fn page(&self, index: PageIndex) -> Option<&PageSpec> {
        self.pages.get(index.get() as usize - 1)
    }

    /// Check dense 1..N indices, sane thresholds and finite timings.
    pub fn validate(&self) -> Result<(), LandingError> {
        if self.pages.is_empty() {
            return Err(LandingError::InvalidConfig("no pages configured".into()));
        }
        for (i, page) in self.pages.iter().enumerate() {
            let expected = i as u32 + 1;
            if page.index != expected {
                return Err(LandingError::InvalidConfig(format!(
                    "page indices must be dense from 1: expected {}, found {}",
                    expected, page.index
                )));
            }
            check_fraction(&format!("page {} threshold", page.index), page.threshold)?;
            for (b, block) in page.blocks.iter().enumerate() {
                if let Some(t) = block.threshold() {
                    check_fraction(&format!("page {} block {} threshold", page.index, b), t)?;
                }
            }
        }

        let n = self.page_count();
        for mapping in &self.brand.variants {
            if mapping.page == 0 || mapping.page > n {
                return Err(LandingError::InvalidConfig(format!(
                    "brand mapping for page {} outside 1..={}",
                    mapping.page, n
                )));
            }
        }

        let t = &self.timing;
        for (name, value) in [
            ("reveal_secs", t.reveal_secs),
            ("reveal_reduced_secs", t.reveal_reduced_secs),
            ("stagger_secs", t.stagger_secs),
            ("drawing_secs", t.drawing_secs),
            ("video_fade_secs", t.video_fade_secs),
            ("seek_floor_secs", t.seek_floor_secs),
            ("morph_secs", self.brand.morph_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(LandingError::InvalidConfig(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if !t.fast_rate.is_finite() || t.fast_rate <= 0.0 {
            return Err(LandingError::InvalidConfig(format!(
                "fast_rate must be positive, got {}",
                t.fast_rate
            )));
        }
        if !self.assets.fallback_stroke_length.is_finite() || self.assets.fallback_stroke_length <= 0.0 {
            return Err(LandingError::InvalidConfig(
                "fallback_stroke_length must be positive".into(),
            ));
        }
        Ok(())
    }
}

fn check_fraction(name: &str, value: f64) -> Result<(), LandingError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(LandingError::InvalidConfig(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )))
    }
}

/// Twelve pages: drawn mark, centered brand, hero, copy and video slides, contact.
pub fn canonical_pages() -> Vec<PageSpec> {
    vec![
        PageSpec::new(
            1,
            vec![BlockSpec::Drawing {
                src: "/assets/drawline.svg".into(),
                fallback: default_logo(),
                threshold: default_drawing_threshold(),
            }],
        ),
        PageSpec::new(2, vec![BlockSpec::Brand]),
        PageSpec::new(
            3,
            vec![
                BlockSpec::Parallax,
                BlockSpec::RevealGroup {
                    children: 3,
                    threshold: 0.2,
                    once: false,
                    staggered: true,
                },
            ],
        ),
        PageSpec::new(4, vec![BlockSpec::reveal(1), BlockSpec::reveal(3), BlockSpec::reveal(1)]),
        PageSpec::new(5, vec![BlockSpec::reveal(1), BlockSpec::reveal(2)]),
        PageSpec::new(6, vec![BlockSpec::reveal(1), BlockSpec::reveal(4)]),
        PageSpec::new(7, vec![BlockSpec::video("/assets/page 7.mp4")]),
        PageSpec::new(8, vec![BlockSpec::reveal(1), BlockSpec::reveal(2)]),
        PageSpec::new(9, vec![BlockSpec::video("/assets/page 9.mp4")]),
        PageSpec::new(10, vec![BlockSpec::reveal(1), BlockSpec::reveal(2)]),
        PageSpec::new(11, vec![BlockSpec::video("/assets/page 11.mp4")]),
        PageSpec::new(12, vec![BlockSpec::reveal(1)]),
    ]
}

fn default_brand_mapping() -> Vec<BrandMapping> {
    vec![
        BrandMapping {
            page: 1,
            variant: BrandVariant::Hidden,
        },
        BrandMapping {
            page: 2,
            variant: BrandVariant::Centered,
        },
        BrandMapping {
            page: 3,
            variant: BrandVariant::Compact,
        },
    ]
}

fn default_brand_variant() -> BrandVariant {
    BrandVariant::Corner
}

fn default_wordmark() -> String {
    "Lif3away".into()
}

fn default_typewriter_delay_ms() -> u64 {
    600
}

fn default_typewriter_step_ms() -> u64 {
    70
}

fn default_morph_secs() -> f64 {
    0.5
}

fn default_section_threshold() -> f64 {
    0.6
}

fn default_drawing_threshold() -> f64 {
    0.75
}

fn default_reveal_threshold() -> f64 {
    0.3
}

fn default_children() -> usize {
    1
}

fn default_video_threshold() -> f64 {
    0.2
}

fn default_video_margin() -> RootMargin {
    RootMargin::bottom(Length::Percent(-10.0))
}

fn default_md_min_width() -> f64 {
    768.0
}

fn default_spacer_px() -> f64 {
    24.0
}

fn default_reveal_secs() -> f64 {
    0.6
}

fn default_reveal_reduced_secs() -> f64 {
    0.25
}

fn default_stagger_secs() -> f64 {
    0.08
}

fn default_reveal_offset_px() -> f64 {
    24.0
}

fn default_reveal_blur_px() -> f64 {
    6.0
}

fn default_drawing_secs() -> f64 {
    1.8
}

fn default_video_fade_secs() -> f64 {
    0.5
}

fn default_fast_rate() -> f64 {
    2.5
}

fn default_seek_floor_secs() -> f64 {
    0.05
}

fn default_logo() -> String {
    "/assets/logo.png".into()
}

fn default_fallback_stroke_length() -> f64 {
    1200.0
}

fn default_stroke_color() -> String {
    "#23B088".into()
}

fn default_stroke_width() -> f64 {
    6.0
}
