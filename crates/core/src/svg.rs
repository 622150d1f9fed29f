//! SVG export: converts one overlay pass into a standalone SVG string.

use pose_overlay_protocol::{RenderCommand, Size, TextAlign};

use crate::config::Palette;

/// Render a pass as an SVG document sized to `surface`.
///
/// `Clear` resets everything emitted so far, matching what a canvas would
/// show after the pass. Groups become `<g>` elements.
pub fn render_svg(commands: &[RenderCommand], surface: Size, palette: &Palette) -> String {
    let (width, height) = (surface.width, surface.height);
    let mut body = String::with_capacity(commands.len() * 96);

    for cmd in commands {
        match cmd {
            RenderCommand::Clear { .. } => body.clear(),
            RenderCommand::DrawLine {
                from,
                to,
                color,
                width: line_width,
            } => {
                let stroke = palette.resolve(*color).to_hex();
                body.push_str(&format!(
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{stroke}" stroke-width="{line_width}" stroke-linecap="round"/>"#,
                    from.x, from.y, to.x, to.y,
                ));
            }
            RenderCommand::FillCircle {
                center,
                radius,
                color,
            } => {
                let fill = palette.resolve(*color).to_hex();
                body.push_str(&format!(
                    r#"<circle cx="{}" cy="{}" r="{radius}" fill="{fill}"/>"#,
                    center.x, center.y,
                ));
            }
            RenderCommand::DrawText {
                position,
                text,
                color,
                font_size,
                align,
            } => {
                let fill = palette.resolve(*color).to_hex();
                let anchor = match align {
                    TextAlign::Left => "start",
                    TextAlign::Center => "middle",
                    TextAlign::Right => "end",
                };
                body.push_str(&format!(
                    r#"<text x="{}" y="{}" fill="{fill}" font-size="{font_size}" text-anchor="{anchor}" dominant-baseline="middle">{}</text>"#,
                    position.x,
                    position.y,
                    escape_xml(text),
                ));
            }
            RenderCommand::BeginGroup { id } => {
                body.push_str(&format!(r#"<g id="{}">"#, escape_xml(id)));
            }
            RenderCommand::EndGroup => body.push_str("</g>"),
        }
    }

    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}" style="font-family:system-ui,-apple-system,sans-serif">{body}</svg>"#,
    )
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
