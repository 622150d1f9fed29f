use pose_overlay_protocol::{
    Landmark, Point, PoseFrame, Rect, RenderCommand, SharedStr, Size, TextAlign, ThemeToken,
};

use crate::config::OverlayStyle;
use crate::connections::ConnectionGraph;
use crate::geometry::ViewportGeometry;

const LABEL_OFFSET: f64 = 6.0;

/// The pass emitted when there is nothing to draw: wipe the surface.
pub fn clear_only(surface: Size) -> Vec<RenderCommand> {
    vec![RenderCommand::Clear {
        rect: Rect::from_size(surface),
    }]
}

/// Render one frame's skeleton.
///
/// The first command always clears the full `surface`. Edges come before
/// joints so the joint markers sit on top. A frame without landmarks yields
/// the clear alone.
pub fn render_skeleton(
    frame: Option<&PoseFrame>,
    geometry: &ViewportGeometry,
    surface: Size,
    graph: &ConnectionGraph,
    style: &OverlayStyle,
) -> Vec<RenderCommand> {
    let mut commands = clear_only(surface);
    let Some(frame) = frame else {
        return commands;
    };
    let Some(landmarks) = frame.landmarks.as_ref() else {
        return commands;
    };

    let threshold = style.visibility_threshold;
    let visible = |name: &str| landmarks.get(name).filter(|lm| lm.is_visible(threshold));

    commands.reserve(graph.len() + landmarks.len() + 4);

    commands.push(RenderCommand::BeginGroup {
        id: "skeleton".into(),
    });
    for (from, to) in graph.pairs() {
        let (Some(a), Some(b)) = (visible(from), visible(to)) else {
            continue;
        };
        commands.push(RenderCommand::DrawLine {
            from: geometry.map(a),
            to: geometry.map(b),
            color: ThemeToken::SkeletonLine,
            width: style.line_width,
        });
    }
    commands.push(RenderCommand::EndGroup);

    commands.push(RenderCommand::BeginGroup {
        id: "joints".into(),
    });
    for (_, landmark) in landmarks.iter().filter(|(_, lm)| lm.is_visible(threshold)) {
        commands.push(RenderCommand::FillCircle {
            center: geometry.map(landmark),
            radius: style.joint_radius,
            color: ThemeToken::Joint,
        });
    }
    commands.push(RenderCommand::EndGroup);

    if style.show_angles {
        for (name, degrees) in &frame.angles {
            let Some(joint) = visible(angle_joint(name)) else {
                continue;
            };
            if degrees.is_finite() {
                commands.push(angle_label(joint, *degrees, geometry, style));
            }
        }
    }

    commands
}

/// Angle keys are either the joint name or the joint name with an `_angle`
/// suffix (`left_knee_angle`).
fn angle_joint(name: &str) -> &str {
    name.strip_suffix("_angle").unwrap_or(name)
}

fn angle_label(
    joint: &Landmark,
    degrees: f64,
    geometry: &ViewportGeometry,
    style: &OverlayStyle,
) -> RenderCommand {
    let at = geometry.map(joint);
    RenderCommand::DrawText {
        position: Point::new(at.x + style.joint_radius + LABEL_OFFSET, at.y),
        text: SharedStr::from(format!("{degrees:.0}°")),
        color: ThemeToken::AngleLabel,
        font_size: style.font_size,
        align: TextAlign::Left,
    }
}
