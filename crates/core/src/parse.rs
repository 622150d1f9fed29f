use pose_overlay_protocol::PoseFrame;
use serde::Deserialize;
use thiserror::Error;

use crate::connections::is_landmark_name;

#[derive(Debug, Error)]
pub enum PoseDataError {
    #[error("invalid pose data JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("analysis result has no pose_data")]
    MissingPoseData,
}

/// The two shapes pose data arrives in: the bare frame list, or the full
/// analysis result carrying it under `pose_data`.
#[derive(Deserialize)]
#[serde(untagged)]
enum PoseDocument {
    Frames(Vec<PoseFrame>),
    AnalysisResult {
        #[serde(default)]
        pose_data: Option<Vec<PoseFrame>>,
    },
}

/// Load the ordered pose-frame sequence for one results view.
///
/// The sequence is returned as delivered. Decreasing timestamps and landmark
/// names outside the MediaPipe vocabulary are logged, not rejected.
pub fn parse_pose_data(data: &[u8]) -> Result<Vec<PoseFrame>, PoseDataError> {
    let frames = match serde_json::from_slice::<PoseDocument>(data) {
        Ok(PoseDocument::Frames(frames)) => frames,
        Ok(PoseDocument::AnalysisResult { pose_data }) => {
            pose_data.ok_or(PoseDataError::MissingPoseData)?
        }
        // Re-parse strictly so the error points at the offending frame
        // instead of serde's untagged "did not match any variant".
        Err(_) => serde_json::from_slice::<Vec<PoseFrame>>(data)?,
    };
    check_sequence(&frames);
    Ok(frames)
}

fn check_sequence(frames: &[PoseFrame]) {
    for (i, pair) in frames.windows(2).enumerate() {
        if pair[1].timestamp < pair[0].timestamp {
            tracing::warn!(
                index = i + 1,
                previous = pair[0].timestamp,
                timestamp = pair[1].timestamp,
                "pose timestamps decrease; frame lookup may pick an earlier sample"
            );
        }
    }
    let unknown = frames
        .iter()
        .filter_map(|f| f.landmarks.as_ref())
        .flat_map(|lms| lms.iter().map(|(name, _)| name))
        .find(|name| !is_landmark_name(name));
    if let Some(name) = unknown {
        tracing::warn!(%name, "pose data contains a landmark outside the MediaPipe set");
    }
    tracing::debug!(frames = frames.len(), "loaded pose data");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_frame_list() {
        let json = br#"[
            {"frame_number": 0, "timestamp": 0.0, "landmarks": {"nose": {"x": 0.5, "y": 0.1, "z": 0.0}}},
            {"frame_number": 3, "timestamp": 0.1, "landmarks": {}}
        ]"#;
        let frames = parse_pose_data(json).unwrap_or_default();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].frame_number, 3);
    }

    #[test]
    fn parses_analysis_result_envelope() {
        let json = br#"{
            "video_id": "abc",
            "overall_score": 82.5,
            "pose_data": [{"frame_number": 0, "timestamp": 0.0, "landmarks": {}}]
        }"#;
        let frames = parse_pose_data(json).unwrap_or_default();
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn result_without_pose_data_is_an_error() {
        let json = br#"{"video_id": "abc", "overall_score": 82.5}"#;
        assert!(matches!(
            parse_pose_data(json),
            Err(PoseDataError::MissingPoseData)
        ));
    }

    #[test]
    fn malformed_frame_reports_json_error() {
        let json = br#"[{"frame_number": 0}]"#;
        assert!(matches!(parse_pose_data(json), Err(PoseDataError::Json(_))));
    }

    #[test]
    fn keeps_delivered_order() {
        let json = br#"[{"timestamp": 1.0}, {"timestamp": 0.5}]"#;
        let frames = parse_pose_data(json).unwrap_or_default();
        let stamps: Vec<f64> = frames.iter().map(|f| f.timestamp).collect();
        assert_eq!(stamps, vec![1.0, 0.5]);
    }
}
