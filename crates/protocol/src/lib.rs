pub mod commands;
pub mod pose;
pub mod shared_str;
pub mod theme;
pub mod types;

pub use commands::{RenderCommand, TextAlign};
pub use pose::{Landmark, Landmarks, PoseFrame, as_finite};
pub use shared_str::SharedStr;
pub use theme::ThemeToken;
pub use types::{Color, ColorParseError, Point, Rect, Size};
