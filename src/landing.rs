// Landing orchestrator. Owns the current-page register, the motion preference and
// every per-page animator; host events mutate state, frames read it.
// Faults are contained per block: one bad block never blanks the page or the session.

use std::collections::HashMap;

use kurbo::{Rect, Size};
use serde::{Deserialize, Serialize};

use crate::brand::{BrandChoreographer, BrandFrame};
use crate::config::{BlockSpec, LandingConfig};
use crate::drawing::{DrawingAnimator, DrawingFrame};
use crate::error::LandingError;
use crate::media::{AutoplayController, MediaCommand, MediaFrame};
use crate::motion::{Motion, MotionPreference};
use crate::register::CurrentPageRegister;
use crate::reveal::{RevealFrame, RevealGroup, RevealStyle};
use crate::scroll::{GlobalScrollEffects, GridFrame, ParallaxAnimator, ParallaxFrame, ScrollState};
use crate::types::{Breakpoint, EventBatch, EventType, HostEvent, PageIndex, TargetId, Timestamp};
use crate::visibility::{NonFiniteGeometry, TriggerConfig, VisibilityTracker};

enum BlockState {
    Drawing(DrawingAnimator),
    Brand,
    Parallax(ParallaxAnimator),
    Reveal(RevealGroup),
    Video(AutoplayController),
}

impl BlockState {
    fn from_spec(page: PageIndex, block: usize, spec: &BlockSpec, config: &LandingConfig) -> Self {
        match spec {
            BlockSpec::Drawing {
                fallback,
                threshold,
                ..
            } => BlockState::Drawing(DrawingAnimator::new(
                *threshold,
                config.timing.drawing_secs,
                fallback.clone(),
                &config.assets,
            )),
            BlockSpec::Brand => BlockState::Brand,
            BlockSpec::Parallax => BlockState::Parallax(ParallaxAnimator::default()),
            BlockSpec::RevealGroup {
                children,
                threshold,
                once,
                staggered,
            } => BlockState::Reveal(RevealGroup::new(
                *threshold,
                *children,
                *staggered,
                *once,
                RevealStyle::text(&config.timing),
            )),
            BlockSpec::Video {
                threshold,
                root_margin,
                ..
            } => BlockState::Video(AutoplayController::new(
                TargetId::Block { page, block },
                *threshold,
                *root_margin,
                &config.timing,
            )),
        }
    }
}

/// Render state of one block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BlockFrame {
    Drawing { drawing: DrawingFrame },
    /// The brand element is rendered by the HUD; the slot only reserves space.
    Brand,
    Parallax { parallax: ParallaxFrame },
    Reveal { children: Vec<RevealFrame> },
    Video { media: MediaFrame },
    /// Minimal inline fallback in place of a failed block.
    Fault { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageFrame {
    pub page: PageIndex,
    /// Section currently above its visibility threshold.
    pub in_view: bool,
    pub blocks: Vec<BlockFrame>,
}

/// Everything the host needs to paint one animation frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandingFrame {
    pub timestamp: Timestamp,
    pub current_page: PageIndex,
    pub motion: Motion,
    pub grid: GridFrame,
    pub hud_scale: f64,
    pub brand: BrandFrame,
    pub pages: Vec<PageFrame>,
}

pub struct Landing {
    config: LandingConfig,
    motion: MotionPreference,
    register: CurrentPageRegister,
    sections: Vec<VisibilityTracker>,
    blocks: Vec<Vec<BlockState>>,
    faults: HashMap<(PageIndex, usize), String>,
    brand: BrandChoreographer,
    effects: GlobalScrollEffects,
    scroll: ScrollState,
    viewport: Size,
    scroll_dirty: bool,
    grid: GridFrame,
    hud_scale: f64,
    torn_down: bool,
}

impl Landing {
    pub fn new(config: LandingConfig) -> Result<Self, LandingError> {
        config.validate()?;

        let mut sections = Vec::with_capacity(config.pages.len());
        let mut blocks = Vec::with_capacity(config.pages.len());
        for spec in &config.pages {
            let page = PageIndex::new(spec.index)
                .ok_or_else(|| LandingError::InvalidConfig("page index 0".into()))?;
            sections.push(VisibilityTracker::new(TriggerConfig::new(
                spec.threshold,
                spec.root_margin,
            )));
            blocks.push(
                spec.blocks
                    .iter()
                    .enumerate()
                    .map(|(i, b)| BlockState::from_spec(page, i, b, &config))
                    .collect(),
            );
        }

        tracing::debug!(pages = config.page_count(), "landing mounted");
        Ok(Landing {
            register: CurrentPageRegister::new(config.page_count()),
            brand: BrandChoreographer::new(config.brand.clone()),
            motion: MotionPreference::new(config.reduced_motion),
            sections,
            blocks,
            faults: HashMap::new(),
            effects: GlobalScrollEffects::default(),
            scroll: ScrollState::default(),
            viewport: Size::ZERO,
            scroll_dirty: true,
            grid: GridFrame::default(),
            hud_scale: 1.0,
            torn_down: false,
            config,
        })
    }

    pub fn config(&self) -> &LandingConfig {
        &self.config
    }

    pub fn current_page(&self) -> PageIndex {
        self.register.current()
    }

    pub fn motion(&self) -> Motion {
        self.motion.current()
    }

    /// Number of visibility-tracked sections.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Apply a batch in order. Bad events are logged and skipped.
    pub fn dispatch(&mut self, batch: &EventBatch) -> Vec<MediaCommand> {
        let mut commands = Vec::new();
        for event in &batch.events {
            match self.handle(event) {
                Ok(mut cmds) => commands.append(&mut cmds),
                Err(err) => tracing::warn!(error = %err, "host event skipped"),
            }
        }
        commands
    }

    pub fn handle(&mut self, event: &HostEvent) -> Result<Vec<MediaCommand>, LandingError> {
        if self.torn_down {
            return Ok(Vec::new());
        }
        let now = event.timestamp;
        let motion = self.motion.current();

        match &event.event_type {
            EventType::Viewport { size } => {
                self.viewport = *size;
                self.scroll.viewport_height = size.height;
                let breakpoint = Breakpoint::from_width(size.width, self.config.md_min_width);
                self.brand.set_viewport(*size, breakpoint);
                self.scroll_dirty = true;
            }
            EventType::Scroll {
                offset_y,
                document_height,
            } => {
                self.scroll.offset_y = *offset_y;
                self.scroll.document_height = *document_height;
                self.scroll_dirty = true;
            }
            EventType::ReducedMotion { reduced } => {
                if let Some(next) = self.motion.update(*reduced) {
                    self.scroll_dirty = true;
                    for block in self.blocks.iter_mut().flatten() {
                        if let BlockState::Drawing(d) = block {
                            d.set_motion(next, now);
                        }
                    }
                    return Ok(self.videos_mut().flat_map(|v| v.set_motion(next)).collect());
                }
            }
            EventType::Intersection {
                target,
                bounds,
                root,
                media_time,
            } => return self.on_intersection(*target, *bounds, *root, *media_time, motion, now),
            EventType::AssetLoaded {
                target,
                status,
                body,
            } => self.drawing_mut(*target)?.on_fetch(*status, body, motion, now),
            EventType::AssetFailed { target, reason } => {
                self.drawing_mut(*target)?.on_fetch_failed(reason)
            }
            EventType::PlayResolved { target, generation } => {
                self.video_mut(*target)?.on_play_result(*generation, true)
            }
            EventType::PlayRejected { target, generation } => {
                self.video_mut(*target)?.on_play_result(*generation, false)
            }
        }
        Ok(Vec::new())
    }

    fn on_intersection(
        &mut self,
        target: TargetId,
        bounds: Rect,
        root: Rect,
        media_time: Option<f64>,
        motion: Motion,
        now: Timestamp,
    ) -> Result<Vec<MediaCommand>, LandingError> {
        let (page, block) = match target {
            TargetId::Section { page } => {
                let tracker = self
                    .sections
                    .get_mut(page.get() as usize - 1)
                    .ok_or(LandingError::UnknownTarget(target))?;
                let change = tracker
                    .observe(bounds, root)
                    .map_err(|_| LandingError::InvalidGeometry(target))?;
                if let Some(change) = change {
                    if self.register.on_visibility_change(page, change.is_active()) {
                        self.brand.on_page(self.register.current(), motion, now);
                    }
                }
                return Ok(Vec::new());
            }
            TargetId::Block { page, block } => (page, block),
        };

        let scroll_offset = self.scroll.offset_y;
        let state = self.block_mut(target)?;
        let outcome = match state {
            BlockState::Drawing(d) => d.observe(bounds, root, motion, now).map(|_| Vec::new()),
            BlockState::Reveal(r) => r.observe(bounds, root, now).map(|_| Vec::new()),
            BlockState::Video(v) => v.observe(bounds, root, media_time, motion, now),
            BlockState::Parallax(p) => {
                if bounds.is_finite() {
                    p.measure(bounds, scroll_offset);
                    Ok(Vec::new())
                } else {
                    Err(NonFiniteGeometry)
                }
            }
            BlockState::Brand => Ok(Vec::new()),
        };

        match outcome {
            Ok(commands) => {
                self.faults.remove(&(page, block));
                Ok(commands)
            }
            Err(_) => {
                let fault = LandingError::BlockFault {
                    page,
                    block,
                    message: "non-finite geometry".into(),
                };
                tracing::warn!(error = %fault, "block fault contained");
                self.faults.insert((page, block), fault.to_string());
                Ok(Vec::new())
            }
        }
    }

    fn block_mut(&mut self, target: TargetId) -> Result<&mut BlockState, LandingError> {
        let TargetId::Block { page, block } = target else {
            return Err(LandingError::UnknownTarget(target));
        };
        self.blocks
            .get_mut(page.get() as usize - 1)
            .and_then(|blocks| blocks.get_mut(block))
            .ok_or(LandingError::UnknownTarget(target))
    }

    fn drawing_mut(&mut self, target: TargetId) -> Result<&mut DrawingAnimator, LandingError> {
        match self.block_mut(target)? {
            BlockState::Drawing(d) => Ok(d),
            _ => Err(LandingError::UnknownTarget(target)),
        }
    }

    fn video_mut(&mut self, target: TargetId) -> Result<&mut AutoplayController, LandingError> {
        match self.block_mut(target)? {
            BlockState::Video(v) => Ok(v),
            _ => Err(LandingError::UnknownTarget(target)),
        }
    }

    fn videos_mut(&mut self) -> impl Iterator<Item = &mut AutoplayController> {
        self.blocks.iter_mut().flatten().filter_map(|b| match b {
            BlockState::Video(v) => Some(v),
            _ => None,
        })
    }

    /// Section rect in document coordinates, assuming full-viewport sections
    /// separated by the configured spacer.
    fn estimated_section(&self, page: PageIndex) -> Rect {
        let height = self.viewport.height;
        let top = (page.get() - 1) as f64 * (height + self.config.spacer_px);
        Rect::new(0.0, top, self.viewport.width, top + height)
    }

    /// Advance frame-scheduled work and produce the render state for `now`.
    pub fn frame(&mut self, now: Timestamp) -> LandingFrame {
        let motion = self.motion.current();

        if !self.torn_down {
            for block in self.blocks.iter_mut().flatten() {
                if let BlockState::Drawing(d) = block {
                    d.advance(motion, now);
                }
            }
        }

        if self.scroll_dirty {
            self.grid = self.effects.grid(&self.scroll, motion);
            self.hud_scale = self.effects.hud_scale(&self.scroll, motion);
            self.scroll_dirty = false;
        }

        let pages = self
            .blocks
            .iter()
            .enumerate()
            .map(|(i, blocks)| {
                let page = PageIndex::new(i as u32 + 1).unwrap_or_default();
                PageFrame {
                    page,
                    in_view: self.sections[i].is_active(),
                    blocks: blocks
                        .iter()
                        .enumerate()
                        .map(|(b, state)| self.block_frame(page, b, state, motion, now))
                        .collect(),
                }
            })
            .collect();

        LandingFrame {
            timestamp: now,
            current_page: self.register.current(),
            motion,
            grid: self.grid,
            hud_scale: self.hud_scale,
            brand: self.brand.sample(motion, now),
            pages,
        }
    }

    fn block_frame(
        &self,
        page: PageIndex,
        block: usize,
        state: &BlockState,
        motion: Motion,
        now: Timestamp,
    ) -> BlockFrame {
        if let Some(message) = self.faults.get(&(page, block)) {
            return BlockFrame::Fault {
                message: message.clone(),
            };
        }
        match state {
            BlockState::Drawing(d) => BlockFrame::Drawing {
                drawing: d.sample(motion, now),
            },
            BlockState::Brand => BlockFrame::Brand,
            BlockState::Parallax(p) => BlockFrame::Parallax {
                parallax: p.sample(&self.scroll, self.estimated_section(page), motion),
            },
            BlockState::Reveal(r) => BlockFrame::Reveal {
                children: r.sample(motion, now),
            },
            BlockState::Video(v) => BlockFrame::Video {
                media: v.sample(motion, now),
            },
        }
    }

    /// Pause all media, cancel frame work, and stop accepting events.
    pub fn teardown(&mut self) -> Vec<MediaCommand> {
        if self.torn_down {
            return Vec::new();
        }
        self.torn_down = true;
        let mut commands = Vec::new();
        for block in self.blocks.iter_mut().flatten() {
            match block {
                BlockState::Video(v) => commands.extend(v.teardown()),
                BlockState::Drawing(d) => d.teardown(),
                _ => {}
            }
        }
        tracing::debug!(paused = commands.len() / 2, "landing torn down");
        commands
    }
}

/// JSON-friendly batch result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchResult {
    pub commands: Vec<MediaCommand>,
    pub current_page: PageIndex,
}
