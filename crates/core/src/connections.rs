use pose_overlay_protocol::SharedStr;
use thiserror::Error;

/// The 33 landmark names produced by the MediaPipe pose model.
pub const LANDMARK_NAMES: [&str; 33] = [
    "nose",
    "left_eye_inner",
    "left_eye",
    "left_eye_outer",
    "right_eye_inner",
    "right_eye",
    "right_eye_outer",
    "left_ear",
    "right_ear",
    "mouth_left",
    "mouth_right",
    "left_shoulder",
    "right_shoulder",
    "left_elbow",
    "right_elbow",
    "left_wrist",
    "right_wrist",
    "left_pinky",
    "right_pinky",
    "left_index",
    "right_index",
    "left_thumb",
    "right_thumb",
    "left_hip",
    "right_hip",
    "left_knee",
    "right_knee",
    "left_ankle",
    "right_ankle",
    "left_heel",
    "right_heel",
    "left_foot_index",
    "right_foot_index",
];

/// Simplified skeleton drawn over the video: face outline, arms, torso, legs, feet.
pub const DEFAULT_CONNECTIONS: [(&str, &str); 24] = [
    // Face
    ("nose", "left_eye_inner"),
    ("nose", "right_eye_inner"),
    ("left_eye_inner", "left_eye"),
    ("right_eye_inner", "right_eye"),
    ("left_eye", "left_eye_outer"),
    ("right_eye", "right_eye_outer"),
    ("left_eye_outer", "left_ear"),
    ("right_eye_outer", "right_ear"),
    // Upper body
    ("left_shoulder", "right_shoulder"),
    ("left_shoulder", "left_elbow"),
    ("right_shoulder", "right_elbow"),
    ("left_elbow", "left_wrist"),
    ("right_elbow", "right_wrist"),
    ("left_shoulder", "left_hip"),
    ("right_shoulder", "right_hip"),
    // Lower body
    ("left_hip", "right_hip"),
    ("left_hip", "left_knee"),
    ("right_hip", "right_knee"),
    ("left_knee", "left_ankle"),
    ("right_knee", "right_ankle"),
    ("left_ankle", "left_heel"),
    ("right_ankle", "right_heel"),
    ("left_heel", "left_foot_index"),
    ("right_heel", "right_foot_index"),
];

pub fn is_landmark_name(name: &str) -> bool {
    LANDMARK_NAMES.contains(&name)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConnectionGraphError {
    #[error("unknown landmark {name:?} in connection {index}")]
    UnknownLandmark { index: usize, name: String },
    #[error("connection {index} joins {name:?} to itself")]
    SelfLoop { index: usize, name: String },
}

/// Which joints are joined by a drawn edge.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionGraph {
    pairs: Vec<(SharedStr, SharedStr)>,
}

impl ConnectionGraph {
    /// Build a graph, checking every endpoint against [`LANDMARK_NAMES`].
    pub fn new<I, A, B>(pairs: I) -> Result<Self, ConnectionGraphError>
    where
        I: IntoIterator<Item = (A, B)>,
        A: AsRef<str>,
        B: AsRef<str>,
    {
        let mut out = Vec::new();
        for (index, (from, to)) in pairs.into_iter().enumerate() {
            let (from, to) = (from.as_ref(), to.as_ref());
            for name in [from, to] {
                if !is_landmark_name(name) {
                    return Err(ConnectionGraphError::UnknownLandmark {
                        index,
                        name: name.to_string(),
                    });
                }
            }
            if from == to {
                return Err(ConnectionGraphError::SelfLoop {
                    index,
                    name: from.to_string(),
                });
            }
            out.push((SharedStr::from(from), SharedStr::from(to)));
        }
        Ok(Self { pairs: out })
    }

    pub fn pairs(&self) -> &[(SharedStr, SharedStr)] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl Default for ConnectionGraph {
    fn default() -> Self {
        Self {
            pairs: DEFAULT_CONNECTIONS
                .iter()
                .map(|&(a, b)| (SharedStr::from(a), SharedStr::from(b)))
                .collect(),
        }
    }
}
