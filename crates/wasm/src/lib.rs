//! Browser bridge.
//!
//! The page owns the `<video>`, the `<canvas>` and `requestAnimationFrame`;
//! this crate owns the decisions. Typical wiring:
//!
//! ```js
//! const overlay = new OverlayHandle(poseJsonBytes, null);
//! let raf = 0;
//! const schedule = (ticket) => {
//!   if (ticket === undefined) return;
//!   cancelAnimationFrame(raf);
//!   raf = requestAnimationFrame(() => {
//!     const json = overlay.paint(ticket, video.currentTime, video.duration,
//!       video.videoWidth, video.videoHeight, box.width, box.height);
//!     if (json) drawCommands(ctx, JSON.parse(json));
//!   });
//! };
//! video.addEventListener("timeupdate", () => schedule(overlay.notify("timeupdate")));
//! ```

use pose_overlay_core::{
    CommandLog, ManualClock, MediaSnapshot, OverlayConfig, PoseOverlay, Ticket, Trigger,
    parse_pose_data,
};
use pose_overlay_protocol::Size;
use wasm_bindgen::prelude::*;

/// Skeleton overlay for one results view.
#[wasm_bindgen]
pub struct OverlayHandle {
    overlay: PoseOverlay<ManualClock>,
}

#[wasm_bindgen]
impl OverlayHandle {
    /// Load pose data (a frame array or a full analysis result) and an
    /// optional JSON config.
    #[wasm_bindgen(constructor)]
    pub fn new(pose_data: &[u8], config_json: Option<String>) -> Result<OverlayHandle, JsError> {
        let frames = parse_pose_data(pose_data).map_err(|e| JsError::new(&e.to_string()))?;
        let config = match config_json {
            Some(text) => {
                OverlayConfig::from_json(&text).map_err(|e| JsError::new(&e.to_string()))?
            }
            None => OverlayConfig::default(),
        };
        let overlay = PoseOverlay::with_config(frames, &config, ManualClock::new())
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(Self { overlay })
    }

    /// Forward a media/container event. Returns the repaint ticket to pass to
    /// `paint` on the next animation frame, or `undefined` when nothing needs
    /// repainting.
    pub fn notify(&mut self, event: &str) -> Result<Option<f64>, JsError> {
        let trigger = Trigger::from_event_name(event)
            .ok_or_else(|| JsError::new(&format!("unknown overlay event: {event}")))?;
        Ok(self.overlay.notify(trigger).map(ticket_to_js))
    }

    /// Show or hide the skeleton; returns the repaint ticket.
    pub fn set_enabled(&mut self, enabled: bool) -> Option<f64> {
        self.overlay.set_enabled(enabled).map(ticket_to_js)
    }

    /// Redeem a ticket on an animation frame.
    ///
    /// Returns the render commands as JSON, or `undefined` when the ticket was
    /// superseded or the overlay was torn down. `duration` may be `NaN` and
    /// the video size `0` while metadata is loading.
    #[allow(clippy::too_many_arguments)]
    pub fn paint(
        &mut self,
        ticket: f64,
        current_time: f64,
        duration: f64,
        video_width: f64,
        video_height: f64,
        container_width: f64,
        container_height: f64,
    ) -> Result<Option<String>, JsError> {
        if !(ticket.is_finite() && ticket >= 0.0) {
            return Err(JsError::new("invalid repaint ticket"));
        }
        let media = MediaSnapshot {
            current_time,
            duration: duration.is_finite().then_some(duration),
            intrinsic_size: Some(Size::new(video_width, video_height)),
        };
        let container = Size::new(container_width, container_height);

        // The animation frame has arrived: nothing stays outstanding.
        self.overlay.scheduler_mut().clock_mut().take_due();

        let mut log = CommandLog::default();
        if !self
            .overlay
            .on_frame(Ticket(ticket as u64), &media, container, &mut log)
        {
            return Ok(None);
        }
        let Some(commands) = log.last() else {
            return Ok(None);
        };
        serde_json::to_string(commands)
            .map(Some)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Cancel pending work; every later `notify`/`paint` is a no-op.
    pub fn teardown(&mut self) {
        self.overlay.teardown();
    }

    #[wasm_bindgen(getter)]
    pub fn enabled(&self) -> bool {
        self.overlay.is_enabled()
    }

    #[wasm_bindgen(getter)]
    pub fn frame_count(&self) -> usize {
        self.overlay.frames().len()
    }
}

fn ticket_to_js(ticket: Ticket) -> f64 {
    ticket.0 as f64
}
