//! Integration test: load a squat analysis result, attach an overlay to a
//! simulated video element and drive it through playback the way a browser
//! would (bursts of time updates, one display refresh at a time).

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use pose_overlay_core::{
    CommandLog, ManualClock, MediaSnapshot, MediaSource, PixelSurface, PoseOverlay, SignalHub,
    Surface, Trigger, attach, parse_pose_data,
};
use pose_overlay_protocol::{Landmark, Landmarks, Point, PoseFrame, RenderCommand, Size};

const FIXTURE: &[u8] = include_bytes!("fixtures/squat_analysis.json");

/// Portrait phone clip shown in a landscape player.
const CONTAINER: Size = Size {
    width: 800.0,
    height: 450.0,
};

/// A `<video>` element stand-in whose state changes between events.
struct FakeVideo {
    current_time: Cell<f64>,
    metadata_loaded: Cell<bool>,
}

impl FakeVideo {
    fn new() -> Self {
        Self {
            current_time: Cell::new(0.0),
            metadata_loaded: Cell::new(true),
        }
    }

    fn seek(&self, t: f64) {
        self.current_time.set(t);
    }

    fn snapshot(&self) -> MediaSnapshot {
        MediaSnapshot {
            current_time: self.current_time(),
            duration: self.duration(),
            intrinsic_size: self.intrinsic_size(),
        }
    }
}

impl MediaSource for FakeVideo {
    fn current_time(&self) -> f64 {
        self.current_time.get()
    }

    fn duration(&self) -> Option<f64> {
        self.metadata_loaded.get().then_some(4.5)
    }

    fn intrinsic_size(&self) -> Option<Size> {
        self.metadata_loaded
            .get()
            .then_some(Size::new(1080.0, 1920.0))
    }
}

fn overlay() -> PoseOverlay<ManualClock> {
    let frames = parse_pose_data(FIXTURE).expect("fixture should parse");
    assert_eq!(frames.len(), 7);
    PoseOverlay::new(frames, ManualClock::new())
}

/// Run every due ticket against `surface`; returns how many repaints ran.
fn refresh(
    overlay: &mut PoseOverlay<ManualClock>,
    video: &FakeVideo,
    surface: &mut dyn Surface,
) -> usize {
    let due = overlay.scheduler_mut().clock_mut().take_due();
    due.into_iter()
        .filter(|&ticket| overlay.on_frame(ticket, video, CONTAINER, surface))
        .count()
}

fn lines(pass: &[RenderCommand]) -> Vec<(Point, Point)> {
    pass.iter()
        .filter_map(|c| match c {
            RenderCommand::DrawLine { from, to, .. } => Some((*from, *to)),
            _ => None,
        })
        .collect()
}

#[test]
fn burst_of_time_updates_paints_once_with_latest_time() {
    let mut overlay = overlay();
    let video = FakeVideo::new();
    let mut log = CommandLog::default();

    for t in [0.0, 0.5, 1.0, 1.5, 2.0] {
        video.seek(t);
        overlay.notify(Trigger::TimeAdvanced);
    }
    assert_eq!(overlay.scheduler().clock().outstanding(), 1);
    assert_eq!(refresh(&mut overlay, &video, &mut log), 1);

    let presented = log.last().expect("one pass presented");
    assert_eq!(presented, overlay.render(&video.snapshot(), CONTAINER).as_slice());

    let first = MediaSnapshot {
        current_time: 0.0,
        ..video.snapshot()
    };
    assert_ne!(presented, overlay.render(&first, CONTAINER).as_slice());

    // Nothing left to do until the next event.
    assert_eq!(refresh(&mut overlay, &video, &mut log), 0);
    assert_eq!(log.passes().len(), 1);
}

#[test]
fn repeated_passes_are_pixel_identical() {
    let mut overlay = overlay();
    let video = FakeVideo::new();
    video.seek(1.52);
    let mut surface = PixelSurface::new(800, 450, overlay.style().palette);

    overlay.notify(Trigger::MetadataReady);
    assert_eq!(refresh(&mut overlay, &video, &mut surface), 1);
    let first = surface.clone();
    assert!(first.painted() > 0);

    overlay.notify(Trigger::ContainerResized);
    assert_eq!(refresh(&mut overlay, &video, &mut surface), 1);
    assert_eq!(surface.pixels(), first.pixels());
}

#[test]
fn skeleton_stays_inside_the_pillarboxed_video() {
    let overlay = overlay();
    let video = FakeVideo::new();
    let content_left = (800.0 - 450.0 * 1080.0 / 1920.0) / 2.0;
    let content_right = 800.0 - content_left;

    for t in [0.0, 0.7, 1.5, 2.6, 3.0, 4.4] {
        video.seek(t);
        let pass = overlay.render(&video.snapshot(), CONTAINER);
        for cmd in &pass {
            if let RenderCommand::FillCircle { center, .. } = cmd {
                assert!(
                    center.x >= content_left && center.x <= content_right,
                    "joint at x={} outside video content at t={t}",
                    center.x
                );
                assert!(center.y >= 0.0 && center.y <= 450.0);
            }
        }
    }
}

#[test]
fn low_visibility_wrist_is_never_connected() {
    let mut overlay = overlay();
    let video = FakeVideo::new();
    let mut log = CommandLog::default();

    for step in 0..45 {
        video.seek(f64::from(step) * 0.1);
        overlay.notify(Trigger::TimeAdvanced);
        refresh(&mut overlay, &video, &mut log);
    }
    assert_eq!(log.passes().len(), 45);

    for pass in log.passes() {
        // 24 default edges minus the elbow-wrist edge on the left arm.
        assert_eq!(lines(pass).len(), 23);
        let joints = pass
            .iter()
            .filter(|c| matches!(c, RenderCommand::FillCircle { .. }))
            .count();
        assert_eq!(joints, 24);
    }
}

#[test]
fn metadata_arriving_late_starts_drawing() {
    let mut overlay = overlay();
    let video = FakeVideo::new();
    video.metadata_loaded.set(false);
    let mut log = CommandLog::default();

    overlay.notify(Trigger::TimeAdvanced);
    refresh(&mut overlay, &video, &mut log);
    assert_eq!(log.last().map(<[RenderCommand]>::len), Some(1));

    video.metadata_loaded.set(true);
    overlay.notify(Trigger::MetadataReady);
    refresh(&mut overlay, &video, &mut log);
    assert!(log.last().is_some_and(|pass| !lines(pass).is_empty()));
}

#[test]
fn toggling_off_clears_and_on_redraws() {
    let mut overlay = overlay();
    let video = FakeVideo::new();
    let mut surface = PixelSurface::new(800, 450, overlay.style().palette);

    overlay.notify(Trigger::MetadataReady);
    refresh(&mut overlay, &video, &mut surface);
    let drawn = surface.painted();
    assert!(drawn > 0);

    overlay.set_enabled(false);
    refresh(&mut overlay, &video, &mut surface);
    assert_eq!(surface.painted(), 0);

    overlay.set_enabled(true);
    refresh(&mut overlay, &video, &mut surface);
    assert_eq!(surface.painted(), drawn);
}

#[test]
fn no_repaint_after_detach() {
    let overlay = Rc::new(RefCell::new(overlay()));
    let video = FakeVideo::new();
    let mut hub = SignalHub::new();
    let mut log = CommandLog::default();

    let attachment = attach(&overlay, &mut hub);
    video.seek(1.0);
    hub.emit(Trigger::TimeAdvanced);
    // A repaint was requested but the view is torn down before the next frame.
    let stale = overlay.borrow_mut().scheduler_mut().clock_mut().take_due();
    assert_eq!(stale.len(), 1);

    attachment.detach(&mut hub);

    video.seek(2.0);
    assert_eq!(hub.emit(Trigger::TimeAdvanced), 0);
    assert_eq!(hub.emit(Trigger::ContainerResized), 0);

    let mut overlay = overlay.borrow_mut();
    for ticket in stale {
        assert!(!overlay.on_frame(ticket, &video, CONTAINER, &mut log));
    }
    assert_eq!(refresh(&mut overlay, &video, &mut log), 0);
    assert!(log.passes().is_empty());
}

#[test]
fn dropped_overlay_ignores_late_events() {
    let overlay = Rc::new(RefCell::new(overlay()));
    let mut hub = SignalHub::new();
    let _attachment = attach(&overlay, &mut hub);
    drop(overlay);

    // Listeners are still registered but hold only a weak handle.
    assert_eq!(hub.emit(Trigger::TimeAdvanced), 1);
}

#[test]
fn wildly_out_of_range_landmark_does_not_break_the_repaint() {
    let landmarks: Landmarks = [
        ("nose", Landmark::new(1.0e300, 0.5)),
        ("left_shoulder", Landmark::new(0.4, -1.0e300)),
        ("right_shoulder", Landmark::new(0.6, 0.3)),
    ]
    .into_iter()
    .collect();
    let mut overlay = PoseOverlay::new(vec![PoseFrame::new(0, 0.0, landmarks)], ManualClock::new());
    let video = FakeVideo::new();
    let mut surface = PixelSurface::new(800, 450, overlay.style().palette);

    overlay.notify(Trigger::MetadataReady);
    assert_eq!(refresh(&mut overlay, &video, &mut surface), 1);
    // Only the on-screen shoulder lands on the surface.
    assert!(surface.painted() > 0);
}
