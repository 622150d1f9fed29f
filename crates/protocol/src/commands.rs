use serde::{Deserialize, Serialize};

use crate::shared_str::SharedStr;
use crate::theme::ThemeToken;
use crate::types::{Point, Rect};

/// A single, stateless render instruction.
///
/// One overlay pass is a `Vec<RenderCommand>` that always starts with a
/// `Clear` over the whole surface. Surfaces consume the list sequentially;
/// each command carries all the data it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Reset a region to fully transparent.
    Clear { rect: Rect },

    /// Draw a straight line segment.
    DrawLine {
        from: Point,
        to: Point,
        color: ThemeToken,
        width: f64,
    },

    /// Draw a filled circle.
    FillCircle {
        center: Point,
        radius: f64,
        color: ThemeToken,
    },

    /// Draw a text string at a position.
    DrawText {
        position: Point,
        text: SharedStr,
        color: ThemeToken,
        font_size: f64,
        align: TextAlign,
    },

    /// Begin a logical group (the skeleton edges, the joints). Surfaces may
    /// use this for layering; it has no visual effect on its own.
    BeginGroup { id: SharedStr },

    /// End the current group.
    EndGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}
