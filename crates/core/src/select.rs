use pose_overlay_protocol::PoseFrame;

/// Default window for treating a pose sample as "the frame at this time".
pub const MATCH_TOLERANCE_SECS: f64 = 0.1;

/// Pick the pose frame to show at `current_time`.
///
/// Uses the default [`MATCH_TOLERANCE_SECS`]. See [`select_frame_within`].
pub fn select_frame(
    frames: &[PoseFrame],
    current_time: f64,
    duration: Option<f64>,
) -> Option<&PoseFrame> {
    select_frame_within(frames, current_time, duration, MATCH_TOLERANCE_SECS)
}

/// Pick the pose frame to show at `current_time`.
///
/// 1. The first frame whose timestamp lies strictly within `tolerance` of
///    `current_time` wins, in sequence order.
/// 2. Otherwise, when the media duration is known and positive, the frame at
///    `floor(current_time / duration * len)`, assuming samples spread evenly
///    over the clip.
/// 3. Otherwise the first frame, so the overlay stays visible.
///
/// Returns `None` only for an empty sequence.
pub fn select_frame_within(
    frames: &[PoseFrame],
    current_time: f64,
    duration: Option<f64>,
    tolerance: f64,
) -> Option<&PoseFrame> {
    let first = frames.first()?;

    if let Some(frame) = frames
        .iter()
        .find(|f| (f.timestamp - current_time).abs() < tolerance)
    {
        return Some(frame);
    }

    let by_index = duration
        .and_then(|d| proportional_index(current_time, d, frames.len()))
        .and_then(|i| frames.get(i));

    Some(by_index.unwrap_or(first))
}

/// Index of `current_time` if samples were spread uniformly over `duration`.
/// `None` for unknown/zero/NaN durations and out-of-range results.
fn proportional_index(current_time: f64, duration: f64, len: usize) -> Option<usize> {
    if !duration.is_finite() || duration <= 0.0 {
        return None;
    }
    let index = ((current_time / duration) * len as f64).floor();
    if index.is_finite() && index >= 0.0 && index < len as f64 {
        Some(index as usize)
    } else {
        None
    }
}
