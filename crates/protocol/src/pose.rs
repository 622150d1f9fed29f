use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::shared_str::SharedStr;

/// Coerce an optional coordinate to a drawable number.
///
/// Missing and non-finite values become `0.0`. Every place that turns a
/// landmark into a position goes through this helper.
#[inline]
pub fn as_finite(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Accepts any JSON value and keeps it only if it is a finite number.
fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64().filter(|v| v.is_finite()))
}

/// One estimated keypoint, normalized to the source video's intrinsic frame
/// (`0..=1`, top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    /// Estimation confidence in `0..=1`, when the model reports one.
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: None,
            visibility: None,
        }
    }

    pub fn with_visibility(mut self, visibility: f64) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Normalized `(x, y)` with malformed components coerced to `0.0`.
    pub fn position(&self) -> (f64, f64) {
        (as_finite(self.x), as_finite(self.y))
    }

    /// Whether the landmark passes a visibility gate.
    ///
    /// Landmarks without visibility data always pass, as does everything when
    /// no threshold is configured.
    pub fn is_visible(&self, threshold: Option<f64>) -> bool {
        match (threshold, self.visibility) {
            (Some(threshold), Some(visibility)) => visibility >= threshold,
            _ => true,
        }
    }
}

/// Landmark name -> coordinate map for one frame.
///
/// `null` entries in the source JSON are dropped on load, so a lookup either
/// finds a landmark or reports it absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<SharedStr, Option<Landmark>>",
    into = "BTreeMap<SharedStr, Option<Landmark>>"
)]
pub struct Landmarks(BTreeMap<SharedStr, Landmark>);

impl Landmarks {
    pub fn get(&self, name: &str) -> Option<&Landmark> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SharedStr, &Landmark)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<SharedStr, Option<Landmark>>> for Landmarks {
    fn from(raw: BTreeMap<SharedStr, Option<Landmark>>) -> Self {
        Self(
            raw.into_iter()
                .filter_map(|(name, landmark)| landmark.map(|lm| (name, lm)))
                .collect(),
        )
    }
}

impl From<Landmarks> for BTreeMap<SharedStr, Option<Landmark>> {
    fn from(landmarks: Landmarks) -> Self {
        landmarks.0.into_iter().map(|(k, v)| (k, Some(v))).collect()
    }
}

impl<N: Into<SharedStr>> FromIterator<(N, Landmark)> for Landmarks {
    fn from_iter<T: IntoIterator<Item = (N, Landmark)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(n, lm)| (n.into(), lm)).collect())
    }
}

/// Pose estimate for one sampled video frame, as delivered by the analysis
/// pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    /// Source frame index. Informational only.
    #[serde(default)]
    pub frame_number: u64,
    /// Seconds from clip start.
    #[serde(alias = "timestamp_seconds")]
    pub timestamp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<Landmarks>,
    /// Joint angles in degrees, keyed by joint (e.g. `left_elbow`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub angles: BTreeMap<SharedStr, f64>,
}

impl PoseFrame {
    pub fn new(frame_number: u64, timestamp: f64, landmarks: Landmarks) -> Self {
        Self {
            frame_number,
            timestamp,
            landmarks: Some(landmarks),
            angles: BTreeMap::new(),
        }
    }
}
