// Autoplay media controller: visibility drives play/pause and playback rate.
// The engine decides; the host executes the returned commands on the <video> element.

use kurbo::Rect;
use serde::{Deserialize, Serialize};

use crate::config::TimingSettings;
use crate::motion::Motion;
use crate::reveal::{Reveal, RevealStyle};
use crate::types::{RootMargin, TargetId, Timestamp};
use crate::visibility::{NonFiniteGeometry, TriggerConfig, VisibilityChange, VisibilityTracker};

const NORMAL_RATE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    Paused,
    Playing,
}

/// Imperative step for the host to run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum MediaAction {
    SetRate { rate: f64 },
    Seek { seconds: f64 },
    /// Call `play()`; report the outcome with this generation.
    Play { generation: u32 },
    Pause,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediaCommand {
    pub target: TargetId,
    #[serde(flatten)]
    pub action: MediaAction,
}

/// Per-frame media state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediaFrame {
    pub state: PlaybackState,
    pub rate: f64,
    pub opacity: f64,
}

/// Controller bound to exactly one video element.
#[derive(Debug, Clone)]
pub struct AutoplayController {
    target: TargetId,
    tracker: VisibilityTracker,
    fade: Reveal,
    state: PlaybackState,
    rate: f64,
    generation: u32,
    fast_rate: f64,
    seek_floor: f64,
    torn_down: bool,
}

impl AutoplayController {
    pub fn new(target: TargetId, threshold: f64, root_margin: RootMargin, timing: &TimingSettings) -> Self {
        AutoplayController {
            target,
            tracker: VisibilityTracker::new(TriggerConfig::new(threshold, root_margin)),
            fade: Reveal::new(RevealStyle::fade(timing.video_fade_secs), false),
            state: PlaybackState::Paused,
            rate: NORMAL_RATE,
            generation: 0,
            fast_rate: timing.fast_rate,
            seek_floor: timing.seek_floor_secs,
            torn_down: false,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    fn in_view_rate(&self, motion: Motion) -> f64 {
        motion.pick(self.fast_rate, NORMAL_RATE)
    }

    fn command(&self, action: MediaAction) -> MediaCommand {
        MediaCommand {
            target: self.target,
            action,
        }
    }

    /// Feed an intersection entry. `media_time` is the element's current position;
    /// unknown positions are treated as the very start.
    pub fn observe(
        &mut self,
        bounds: Rect,
        root: Rect,
        media_time: Option<f64>,
        motion: Motion,
        now: Timestamp,
    ) -> Result<Vec<MediaCommand>, NonFiniteGeometry> {
        if self.torn_down {
            return Ok(Vec::new());
        }
        let Some(change) = self.tracker.observe(bounds, root)? else {
            return Ok(Vec::new());
        };
        self.fade.on_change(change, now);
        Ok(match change {
            VisibilityChange::Entered => self.start(media_time.unwrap_or(0.0), motion),
            VisibilityChange::Left => self.stop(),
        })
    }

    fn start(&mut self, media_time: f64, motion: Motion) -> Vec<MediaCommand> {
        self.rate = self.in_view_rate(motion);
        self.state = PlaybackState::Playing;
        self.generation = self.generation.wrapping_add(1);

        let mut commands = vec![self.command(MediaAction::SetRate { rate: self.rate })];
        if media_time.is_nan() || media_time <= self.seek_floor {
            commands.push(self.command(MediaAction::Seek {
                seconds: self.seek_floor,
            }));
        }
        commands.push(self.command(MediaAction::Play {
            generation: self.generation,
        }));
        commands
    }

    fn stop(&mut self) -> Vec<MediaCommand> {
        self.state = PlaybackState::Paused;
        self.rate = NORMAL_RATE;
        vec![
            self.command(MediaAction::Pause),
            self.command(MediaAction::SetRate { rate: NORMAL_RATE }),
        ]
    }

    /// Outcome of a `play()` request. Rejections leave the element paused and
    /// are never retried; outcomes of superseded requests are ignored.
    pub fn on_play_result(&mut self, generation: u32, resolved: bool) {
        if resolved || generation != self.generation || self.state != PlaybackState::Playing {
            return;
        }
        tracing::debug!(target_id = ?self.target, generation, "autoplay rejected, staying paused");
        self.state = PlaybackState::Paused;
    }

    /// Reduced-motion change while playing retunes the rate.
    pub fn set_motion(&mut self, motion: Motion) -> Vec<MediaCommand> {
        if self.torn_down || self.state != PlaybackState::Playing {
            return Vec::new();
        }
        let rate = self.in_view_rate(motion);
        if rate == self.rate {
            return Vec::new();
        }
        self.rate = rate;
        vec![self.command(MediaAction::SetRate { rate })]
    }

    /// Force paused at normal rate regardless of visibility.
    pub fn teardown(&mut self) -> Vec<MediaCommand> {
        self.torn_down = true;
        self.stop()
    }

    pub fn sample(&self, motion: Motion, now: Timestamp) -> MediaFrame {
        MediaFrame {
            state: self.state,
            rate: self.rate,
            opacity: if motion.is_reduced() {
                1.0
            } else {
                self.fade.sample(0.0, motion, now).opacity
            },
        }
    }
}
