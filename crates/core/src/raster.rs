use pose_overlay_protocol::{Point, Rect, RenderCommand};

use crate::config::Palette;
use crate::overlay::Surface;

/// Software surface: `0xAARRGGBB` pixels, transparent when cleared.
///
/// Text commands are ignored; there is no font rasterizer here.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelSurface {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
    palette: Palette,
}

impl PixelSurface {
    pub fn new(width: usize, height: usize, palette: Palette) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
            palette,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    /// Resize to a new container size, discarding the contents.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels = vec![0; width * height];
    }

    /// Number of non-transparent pixels.
    pub fn painted(&self) -> usize {
        self.pixels.iter().filter(|&&p| p != 0).count()
    }

    fn clear(&mut self, rect: &Rect) {
        let (x0, y0) = (clamp_coord(rect.x, self.width), clamp_coord(rect.y, self.height));
        let x1 = clamp_coord(rect.x + rect.w, self.width);
        let y1 = clamp_coord(rect.y + rect.h, self.height);
        for y in y0..y1 {
            self.pixels[y * self.width + x0..y * self.width + x1].fill(0);
        }
    }

    /// Bresenham line, thickened by stamping a disc at each step.
    ///
    /// Strokes wider than the surface are clamped to it.
    fn draw_line(&mut self, from: Point, to: Point, width: f64, color: u32) {
        let limit = self.width.max(self.height) as f64;
        let radius = ((width - 1.0) / 2.0).clamp(0.0, limit).round();
        if radius.is_nan() {
            return;
        }
        let margin = radius + 1.0;
        let bounds = Rect::new(
            -margin,
            -margin,
            self.width as f64 + 2.0 * margin,
            self.height as f64 + 2.0 * margin,
        );
        let Some((from, to)) = clip_segment(from, to, &bounds) else {
            return;
        };
        // Endpoints are now within the surface plus a bounded margin.
        let (mut x, mut y) = (from.x.round() as i64, from.y.round() as i64);
        let (x1, y1) = (to.x.round() as i64, to.y.round() as i64);
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.fill_disc(x as f64, y as f64, radius, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: u32) {
        self.fill_disc(
            center.x.round(),
            center.y.round(),
            radius.max(0.0).round(),
            color,
        );
    }

    /// Paint every pixel within `radius` of `(cx, cy)`.
    ///
    /// Only the part of the bounding box that overlaps the surface is
    /// visited, so far-off or oversized discs cost at most one surface.
    fn fill_disc(&mut self, cx: f64, cy: f64, radius: f64, color: u32) {
        if !(cx.is_finite() && cy.is_finite() && radius.is_finite()) || self.pixels.is_empty() {
            return;
        }
        let (w, h) = (self.width as f64, self.height as f64);
        let misses_x = cx + radius < 0.0 || cx - radius > w - 1.0;
        let misses_y = cy + radius < 0.0 || cy - radius > h - 1.0;
        if misses_x || misses_y {
            return;
        }
        let x0 = (cx - radius).max(0.0) as usize;
        let x1 = (cx + radius).min(w - 1.0) as usize;
        let y0 = (cy - radius).max(0.0) as usize;
        let y1 = (cy + radius).min(h - 1.0) as usize;
        let r2 = radius * radius;

        for y in y0..=y1 {
            let dy = y as f64 - cy;
            let row = y * self.width;
            for x in x0..=x1 {
                let dx = x as f64 - cx;
                if dx * dx + dy * dy <= r2 {
                    self.pixels[row + x] = color;
                }
            }
        }
    }
}

/// Liang-Barsky clip of a segment against `bounds`. `None` when the segment
/// misses the rectangle entirely or has non-finite endpoints.
fn clip_segment(from: Point, to: Point, bounds: &Rect) -> Option<(Point, Point)> {
    if ![from.x, from.y, to.x, to.y].iter().all(|v| v.is_finite()) {
        return None;
    }
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    let edges = [
        (-dx, from.x - bounds.x),
        (dx, bounds.x + bounds.w - from.x),
        (-dy, from.y - bounds.y),
        (dy, bounds.y + bounds.h - from.y),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((
        Point::new(from.x + t0 * dx, from.y + t0 * dy),
        Point::new(from.x + t1 * dx, from.y + t1 * dy),
    ))
}

/// Clamp a float coordinate into `0..=limit`. NaN lands on 0.
fn clamp_coord(v: f64, limit: usize) -> usize {
    if v.is_nan() || v <= 0.0 {
        0
    } else {
        (v.round() as usize).min(limit)
    }
}

impl Surface for PixelSurface {
    fn present(&mut self, commands: &[RenderCommand]) {
        for cmd in commands {
            match cmd {
                RenderCommand::Clear { rect } => self.clear(rect),
                RenderCommand::DrawLine {
                    from,
                    to,
                    color,
                    width,
                } => {
                    let argb = self.palette.resolve(*color).to_argb();
                    self.draw_line(*from, *to, *width, argb);
                }
                RenderCommand::FillCircle {
                    center,
                    radius,
                    color,
                } => {
                    let argb = self.palette.resolve(*color).to_argb();
                    self.fill_circle(*center, *radius, argb);
                }
                RenderCommand::DrawText { .. }
                | RenderCommand::BeginGroup { .. }
                | RenderCommand::EndGroup => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pose_overlay_protocol::ThemeToken;

    const GREEN: u32 = 0xff00ff00;

    #[test]
    fn draws_a_horizontal_line() {
        let mut surface = PixelSurface::new(10, 5, Palette::default());
        surface.present(&[RenderCommand::DrawLine {
            from: Point::new(1.0, 2.0),
            to: Point::new(8.0, 2.0),
            color: ThemeToken::SkeletonLine,
            width: 1.0,
        }]);
        assert_eq!(surface.painted(), 8);
        assert_eq!(surface.pixel(1, 2), Some(GREEN));
        assert_eq!(surface.pixel(8, 2), Some(GREEN));
        assert_eq!(surface.pixel(0, 2), Some(0));
    }

    #[test]
    fn fills_circle_and_clips_at_edges() {
        let mut surface = PixelSurface::new(20, 20, Palette::default());
        surface.present(&[RenderCommand::FillCircle {
            center: Point::new(0.0, 0.0),
            radius: 4.0,
            color: ThemeToken::Joint,
        }]);
        // Quarter of a radius-4 disc stays on the surface.
        assert!(surface.painted() > 10 && surface.painted() < 25);
        assert_eq!(surface.pixel(0, 0), Some(GREEN));
        assert_eq!(surface.pixel(5, 0), Some(0));
    }

    #[test]
    fn clear_resets_region() {
        let mut surface = PixelSurface::new(10, 10, Palette::default());
        surface.present(&[RenderCommand::FillCircle {
            center: Point::new(5.0, 5.0),
            radius: 3.0,
            color: ThemeToken::Joint,
        }]);
        assert!(surface.painted() > 0);
        surface.present(&[RenderCommand::Clear {
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
        }]);
        assert_eq!(surface.painted(), 0);
    }

    #[test]
    fn oversized_clear_is_clamped() {
        let mut surface = PixelSurface::new(4, 4, Palette::default());
        surface.present(&[RenderCommand::FillCircle {
            center: Point::new(2.0, 2.0),
            radius: 1.0,
            color: ThemeToken::Joint,
        }]);
        surface.present(&[RenderCommand::Clear {
            rect: Rect::new(-10.0, -10.0, 100.0, 100.0),
        }]);
        assert_eq!(surface.painted(), 0);
        assert_eq!(surface.pixels().len(), 16);
    }

    #[test]
    fn corrupt_joint_positions_are_skipped() {
        let mut surface = PixelSurface::new(800, 450, Palette::default());
        for (x, y) in [
            (1.0e300, 225.0),
            (-1.0e300, 225.0),
            (400.0, 1.0e300),
            (f64::MAX, f64::MAX),
            (f64::MIN, f64::MIN),
            (f64::MAX, -f64::MAX),
        ] {
            surface.present(&[RenderCommand::FillCircle {
                center: Point::new(x, y),
                radius: 4.0,
                color: ThemeToken::Joint,
            }]);
        }
        assert_eq!(surface.painted(), 0);
    }

    #[test]
    fn oversized_shapes_are_bounded_by_the_surface() {
        let mut surface = PixelSurface::new(8, 6, Palette::default());
        surface.present(&[RenderCommand::FillCircle {
            center: Point::new(4.0, 3.0),
            radius: 1.0e10,
            color: ThemeToken::Joint,
        }]);
        assert_eq!(surface.painted(), 48);

        let mut surface = PixelSurface::new(8, 6, Palette::default());
        surface.present(&[RenderCommand::DrawLine {
            from: Point::new(0.0, 0.0),
            to: Point::new(f64::MAX, 3.0),
            color: ThemeToken::SkeletonLine,
            width: 1.0e300,
        }]);
        assert_eq!(surface.painted(), 48);
    }

    #[test]
    fn far_off_surface_lines_are_clipped() {
        let mut surface = PixelSurface::new(10, 10, Palette::default());
        surface.present(&[RenderCommand::DrawLine {
            from: Point::new(-1.0e12, 5.0),
            to: Point::new(1.0e12, 5.0),
            color: ThemeToken::SkeletonLine,
            width: 1.0,
        }]);
        assert_eq!(surface.painted(), 10);

        surface.present(&[RenderCommand::DrawLine {
            from: Point::new(50.0, 50.0),
            to: Point::new(90.0, 60.0),
            color: ThemeToken::SkeletonLine,
            width: 1.0,
        }]);
        assert_eq!(surface.painted(), 10);
    }
}
