//! Pose skeleton overlay kept in sync with video playback.
//!
//! The pipeline per repaint: [`geometry`] maps the video's intrinsic frame
//! onto its letterboxed/pillarboxed rectangle, [`select`] picks the pose
//! sample for the current playback time, and [`skeleton`] turns it into
//! render commands. [`scheduler`] and [`overlay`] decide when that happens.

pub mod config;
pub mod connections;
pub mod geometry;
pub mod overlay;
pub mod parse;
pub mod raster;
pub mod scheduler;
pub mod select;
pub mod signals;
pub mod skeleton;
pub mod svg;

pub use config::{ConfigError, OverlayConfig, OverlayStyle, Palette};
pub use connections::{ConnectionGraph, ConnectionGraphError};
pub use geometry::{ViewportGeometry, compute_geometry, geometry_for};
pub use overlay::{Attachment, CommandLog, MediaSnapshot, MediaSource, PoseOverlay, Surface, attach};
pub use parse::{PoseDataError, parse_pose_data};
pub use raster::PixelSurface;
pub use scheduler::{FrameClock, ManualClock, RedrawScheduler, SchedulerState, Ticket};
pub use select::{MATCH_TOLERANCE_SECS, select_frame, select_frame_within};
pub use signals::{SignalHub, SubscriptionId, Trigger};
pub use skeleton::render_skeleton;
