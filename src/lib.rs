// landing_core: Rust/WASM choreography engine for the scroll-driven landing page.
// All state machines live here; JS forwards observations and applies the results.

mod brand;
mod config;
mod devcheck;
mod drawing;
mod easing;
mod error;
mod landing;
mod media;
mod motion;
mod register;
mod reveal;
mod scroll;
mod types;
mod visibility;

use wasm_bindgen::prelude::*;

pub use brand::{variant_for, BrandChoreographer, BrandFrame, BrandLayout, BrandVariant, BRAND_KEY};
pub use config::{BlockSpec, BrandMapping, LandingConfig, PageSpec};
pub use devcheck::{SelfCheckProbe, SelfCheckReport};
pub use drawing::{parse_asset, DrawState, DrawingAnimator, DrawingFrame};
pub use easing::{Easing, Tween};
pub use error::LandingError;
pub use landing::{BlockFrame, DispatchResult, Landing, LandingFrame, PageFrame};
pub use media::{AutoplayController, MediaAction, MediaCommand, MediaFrame, PlaybackState};
pub use motion::{Motion, MotionPreference};
pub use register::CurrentPageRegister;
pub use reveal::{RevealFrame, RevealGroup, RevealStyle};
pub use scroll::{GlobalScrollEffects, ParallaxAnimator, ScrollOffsets, ScrollState, ScrollTransform};
pub use types::*;
pub use visibility::{TriggerConfig, VisibilityChange, VisibilityTracker};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn js_error(err: LandingError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| js_error(e.into()))
}

/// Main engine interface exposed to JavaScript.
/// Batch interface to minimize JS↔WASM crossings.
#[wasm_bindgen]
pub struct Engine {
    landing: Landing,
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<Engine, JsValue> {
        let config: LandingConfig = serde_json::from_str(config_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?;
        let landing = Landing::new(config).map_err(js_error)?;
        Ok(Engine { landing })
    }

    /// Apply a batch of host events. Returns media commands plus the current page.
    pub fn dispatch(&mut self, events_json: &str) -> Result<String, JsValue> {
        let batch: EventBatch = serde_json::from_str(events_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid events: {}", e)))?;
        let commands = self.landing.dispatch(&batch);
        to_json(&DispatchResult {
            commands,
            current_page: self.landing.current_page(),
        })
    }

    /// Render state for the animation frame at `timestamp_us`.
    pub fn frame(&mut self, timestamp_us: u64) -> Result<String, JsValue> {
        let frame = self.landing.frame(Timestamp::from_micros(timestamp_us));
        to_json(&frame)
    }

    pub fn current_page(&self) -> u32 {
        self.landing.current_page().get()
    }

    /// Development builds only; release builds return a disabled, empty report.
    pub fn self_check(&self, probe_json: &str) -> Result<String, JsValue> {
        let probe: SelfCheckProbe = serde_json::from_str(probe_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid probe: {}", e)))?;
        to_json(&devcheck::run(self.landing.config(), &probe))
    }

    /// Pause all media and stop reacting. Returns the final media commands.
    pub fn teardown(&mut self) -> Result<String, JsValue> {
        to_json(&self.landing.teardown())
    }
}

/// Await an `HTMLMediaElement.play()` promise. Never throws: rejection
/// (autoplay policy) resolves to `false`.
#[wasm_bindgen]
pub async fn settle_play(promise: js_sys::Promise) -> bool {
    wasm_bindgen_futures::JsFuture::from(promise).await.is_ok()
}
