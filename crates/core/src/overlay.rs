//! The overlay controller: trigger signals in, render passes out.
//!
//! ```text
//!   trigger ──▶ RedrawScheduler ──ticket──▶ FrameClock
//!                                              │ next paint
//!   MediaSource ─┐                             ▼
//!   container ───┼──▶ geometry ──▶ select ──▶ skeleton ──▶ Surface
//!   PoseFrame[] ─┘
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use pose_overlay_protocol::{PoseFrame, RenderCommand, Size};

use crate::config::{ConfigError, OverlayConfig, OverlayStyle};
use crate::connections::ConnectionGraph;
use crate::geometry::geometry_for;
use crate::scheduler::{FrameClock, RedrawScheduler, SchedulerState, Ticket};
use crate::select::{MATCH_TOLERANCE_SECS, select_frame_within};
use crate::signals::{SignalHub, SubscriptionId, Trigger};
use crate::skeleton::{clear_only, render_skeleton};

/// Live playback state, read at repaint time.
pub trait MediaSource {
    /// Playback position in seconds.
    fn current_time(&self) -> f64;
    /// Clip length in seconds, once known.
    fn duration(&self) -> Option<f64>;
    /// Decoded frame size; `None` until metadata has loaded.
    fn intrinsic_size(&self) -> Option<Size>;
}

/// Plain-data [`MediaSource`] for hosts that copy player state per frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MediaSnapshot {
    pub current_time: f64,
    pub duration: Option<f64>,
    pub intrinsic_size: Option<Size>,
}

impl MediaSource for MediaSnapshot {
    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn intrinsic_size(&self) -> Option<Size> {
        self.intrinsic_size
    }
}

/// Anything that can execute a render pass.
pub trait Surface {
    fn present(&mut self, commands: &[RenderCommand]);
}

/// Surface that records every pass it is given.
#[derive(Debug, Default)]
pub struct CommandLog {
    passes: Vec<Vec<RenderCommand>>,
}

impl CommandLog {
    pub fn passes(&self) -> &[Vec<RenderCommand>] {
        &self.passes
    }

    pub fn last(&self) -> Option<&[RenderCommand]> {
        self.passes.last().map(Vec::as_slice)
    }
}

impl Surface for CommandLog {
    fn present(&mut self, commands: &[RenderCommand]) {
        self.passes.push(commands.to_vec());
    }
}

/// Skeleton overlay for one results view.
pub struct PoseOverlay<C: FrameClock> {
    frames: Vec<PoseFrame>,
    graph: ConnectionGraph,
    style: OverlayStyle,
    tolerance: f64,
    enabled: bool,
    scheduler: RedrawScheduler<C>,
}

impl<C: FrameClock> PoseOverlay<C> {
    /// An enabled overlay with the default skeleton and style.
    pub fn new(frames: Vec<PoseFrame>, clock: C) -> Self {
        Self {
            frames,
            graph: ConnectionGraph::default(),
            style: OverlayStyle::default(),
            tolerance: MATCH_TOLERANCE_SECS,
            enabled: true,
            scheduler: RedrawScheduler::new(clock),
        }
    }

    /// An overlay drawn with `config`, which is validated first.
    pub fn with_config(
        frames: Vec<PoseFrame>,
        config: &OverlayConfig,
        clock: C,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            graph: config.connection_graph()?,
            style: config.style.clone(),
            tolerance: config.match_tolerance_secs,
            ..Self::new(frames, clock)
        })
    }

    pub fn frames(&self) -> &[PoseFrame] {
        &self.frames
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn scheduler(&self) -> &RedrawScheduler<C> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut RedrawScheduler<C> {
        &mut self.scheduler
    }

    pub fn is_torn_down(&self) -> bool {
        self.scheduler.state() == SchedulerState::TornDown
    }

    /// Show or hide the skeleton. Schedules a repaint so hiding clears it.
    pub fn set_enabled(&mut self, enabled: bool) -> Option<Ticket> {
        self.enabled = enabled;
        self.notify(Trigger::OverlayToggled)
    }

    /// React to a trigger signal. Without pose data there is nothing to keep
    /// in sync, so triggers are ignored.
    pub fn notify(&mut self, trigger: Trigger) -> Option<Ticket> {
        if self.frames.is_empty() {
            tracing::trace!(?trigger, "no pose data; ignoring trigger");
            return None;
        }
        self.scheduler.trigger(trigger)
    }

    /// Redeem a frame-clock ticket: run the pipeline and present the pass.
    ///
    /// Returns `false` without touching the surface when the ticket was
    /// superseded, already used, or the overlay was torn down.
    pub fn on_frame(
        &mut self,
        ticket: Ticket,
        media: &dyn MediaSource,
        container: Size,
        surface: &mut dyn Surface,
    ) -> bool {
        if !self.scheduler.begin_repaint(ticket) {
            return false;
        }
        let commands = self.render(media, container);
        surface.present(&commands);
        true
    }

    /// One full pass: map the viewport, pick the frame, draw the skeleton.
    ///
    /// The surface extent is the container. Pure: identical inputs give
    /// identical passes.
    pub fn render(&self, media: &dyn MediaSource, container: Size) -> Vec<RenderCommand> {
        if !self.enabled {
            return clear_only(container);
        }
        let Some(geometry) = geometry_for(media.intrinsic_size(), container) else {
            tracing::debug!(
                intrinsic = ?media.intrinsic_size(),
                ?container,
                "no viewport geometry yet; clearing only"
            );
            return clear_only(container);
        };
        let frame = select_frame_within(
            &self.frames,
            media.current_time(),
            media.duration(),
            self.tolerance,
        );
        render_skeleton(frame, &geometry, container, &self.graph, &self.style)
    }

    /// Cancel any pending repaint; no pass will be presented afterwards.
    pub fn teardown(&mut self) {
        self.scheduler.teardown();
    }
}

/// Live subscriptions of an overlay on a [`SignalHub`].
#[must_use = "dropping an Attachment leaves the overlay subscribed"]
pub struct Attachment<C: FrameClock> {
    overlay: Weak<RefCell<PoseOverlay<C>>>,
    subscriptions: Vec<SubscriptionId>,
}

/// Subscribe `overlay` to all four triggers on `hub`.
///
/// Listeners hold a weak handle, so a dropped overlay is never repainted by a
/// late event.
pub fn attach<C: FrameClock + 'static>(
    overlay: &Rc<RefCell<PoseOverlay<C>>>,
    hub: &mut SignalHub,
) -> Attachment<C> {
    let subscriptions = Trigger::ALL
        .iter()
        .map(|&trigger| {
            let weak = Rc::downgrade(overlay);
            hub.subscribe(trigger, move |fired| {
                let Some(overlay) = weak.upgrade() else {
                    return;
                };
                match overlay.try_borrow_mut() {
                    Ok(mut overlay) => {
                        overlay.notify(fired);
                    }
                    Err(_) => {
                        tracing::warn!(
                            trigger = ?fired,
                            "overlay busy; dropping re-entrant trigger"
                        );
                    }
                }
            })
        })
        .collect();
    Attachment {
        overlay: Rc::downgrade(overlay),
        subscriptions,
    }
}

impl<C: FrameClock> Attachment<C> {
    /// Remove every subscription and tear the overlay down.
    pub fn detach(self, hub: &mut SignalHub) {
        for id in &self.subscriptions {
            hub.unsubscribe(*id);
        }
        if let Some(overlay) = self.overlay.upgrade() {
            overlay.borrow_mut().teardown();
        }
    }
}
