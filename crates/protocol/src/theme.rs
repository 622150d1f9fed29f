use serde::{Deserialize, Serialize};

/// Semantic color tokens resolved by the active overlay palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    /// Edges between connected joints.
    SkeletonLine,
    /// Joint markers.
    Joint,
    /// Joint angle annotations.
    AngleLabel,
}
