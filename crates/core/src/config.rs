use std::fs;
use std::path::Path;

use pose_overlay_protocol::{Color, ThemeToken};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::connections::{ConnectionGraph, ConnectionGraphError};
use crate::select::MATCH_TOLERANCE_SECS;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("connections: {0}")]
    Connections(#[from] ConnectionGraphError),
    #[error("match tolerance must be a positive number of seconds, got {0}")]
    Tolerance(f64),
    #[error("style.{field} must be between 0 and {max}, got {value}")]
    StyleOutOfRange {
        field: &'static str,
        value: f64,
        max: f64,
    },
}

/// Upper bound for stroke widths, joint radii and font sizes, in surface pixels.
pub const MAX_STYLE_SIZE: f64 = 256.0;

/// Colors used by one overlay pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    #[serde(default = "default_skeleton_color")]
    pub skeleton: Color,
    #[serde(default = "default_joint_color")]
    pub joint: Color,
    #[serde(default = "default_label_color")]
    pub label: Color,
}

fn default_skeleton_color() -> Color {
    Color::rgb(0x00, 0xff, 0x00)
}

fn default_joint_color() -> Color {
    Color::rgb(0x00, 0xff, 0x00)
}

fn default_label_color() -> Color {
    Color::rgb(0xff, 0xff, 0xff)
}

impl Palette {
    pub fn resolve(&self, token: ThemeToken) -> Color {
        match token {
            ThemeToken::SkeletonLine => self.skeleton,
            ThemeToken::Joint => self.joint,
            ThemeToken::AngleLabel => self.label,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            skeleton: default_skeleton_color(),
            joint: default_joint_color(),
            label: default_label_color(),
        }
    }
}

/// How the skeleton is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayStyle {
    /// Stroke width of skeleton edges, in surface pixels.
    #[serde(default = "default_line_width")]
    pub line_width: f64,
    /// Radius of joint markers, in surface pixels.
    #[serde(default = "default_joint_radius")]
    pub joint_radius: f64,
    /// Landmarks reporting a visibility below this are not drawn. `null`
    /// draws every landmark regardless of confidence.
    #[serde(default = "default_visibility_threshold")]
    pub visibility_threshold: Option<f64>,
    /// Annotate joints with the frame's measured angles.
    #[serde(default)]
    pub show_angles: bool,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default)]
    pub palette: Palette,
}

fn default_line_width() -> f64 {
    2.0
}

fn default_joint_radius() -> f64 {
    4.0
}

fn default_visibility_threshold() -> Option<f64> {
    Some(0.5)
}

fn default_font_size() -> f64 {
    11.0
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            line_width: default_line_width(),
            joint_radius: default_joint_radius(),
            visibility_threshold: default_visibility_threshold(),
            show_angles: false,
            font_size: default_font_size(),
            palette: Palette::default(),
        }
    }
}

impl OverlayStyle {
    fn validate(&self) -> Result<(), ConfigError> {
        let sizes = [
            ("line_width", self.line_width),
            ("joint_radius", self.joint_radius),
            ("font_size", self.font_size),
        ];
        for (field, value) in sizes {
            check_range(field, value, MAX_STYLE_SIZE)?;
        }
        if let Some(threshold) = self.visibility_threshold {
            check_range("visibility_threshold", threshold, 1.0)?;
        }
        Ok(())
    }
}

fn check_range(field: &'static str, value: f64, max: f64) -> Result<(), ConfigError> {
    if (0.0..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::StyleOutOfRange { field, value, max })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    #[serde(default)]
    pub style: OverlayStyle,
    /// Half-width of the window in which a pose sample counts as the frame at
    /// the current playback time.
    #[serde(default = "default_match_tolerance")]
    pub match_tolerance_secs: f64,
    /// Custom `[from, to]` landmark pairs replacing the default skeleton.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<Vec<[String; 2]>>,
}

fn default_match_tolerance() -> f64 {
    MATCH_TOLERANCE_SECS
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            style: OverlayStyle::default(),
            match_tolerance_secs: default_match_tolerance(),
            connections: None,
        }
    }
}

impl OverlayConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: OverlayConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Check every value a repaint relies on. `from_json` and `load` call
    /// this; configs built in code are checked when an overlay is created.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tolerance = self.match_tolerance_secs;
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(ConfigError::Tolerance(tolerance));
        }
        self.style.validate()?;
        self.connection_graph()?;
        Ok(())
    }

    /// The configured skeleton, or the default MediaPipe one.
    pub fn connection_graph(&self) -> Result<ConnectionGraph, ConnectionGraphError> {
        match &self.connections {
            Some(pairs) => ConnectionGraph::new(pairs.iter().map(|[a, b]| (a, b))),
            None => Ok(ConnectionGraph::default()),
        }
    }
}
