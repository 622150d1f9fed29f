//! Mapping from the video's intrinsic frame to its on-screen rectangle.
//!
//! A video drawn with `object-fit: contain` keeps its aspect ratio inside the
//! container, leaving bars either above/below (letterbox) or left/right
//! (pillarbox). Landmarks are normalized against the intrinsic frame, so they
//! must be mapped into the visible content rectangle, not the container.

use pose_overlay_protocol::{Landmark, Point, Rect, Size};

/// The visible video content inside its container, in container pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportGeometry {
    pub display_width: f64,
    pub display_height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl ViewportGeometry {
    /// Convert a normalized landmark into surface pixels.
    pub fn map(&self, landmark: &Landmark) -> Point {
        let (x, y) = landmark.position();
        Point::new(
            self.offset_x + x * self.display_width,
            self.offset_y + y * self.display_height,
        )
    }

    pub fn content_rect(&self) -> Rect {
        Rect::new(
            self.offset_x,
            self.offset_y,
            self.display_width,
            self.display_height,
        )
    }
}

/// Fit the intrinsic frame into the container, preserving aspect ratio.
///
/// All four inputs must be positive; callers check availability first (see
/// [`geometry_for`]).
pub fn compute_geometry(
    intrinsic_width: f64,
    intrinsic_height: f64,
    container_width: f64,
    container_height: f64,
) -> ViewportGeometry {
    let intrinsic_aspect = intrinsic_width / intrinsic_height;
    let container_aspect = container_width / container_height;

    if intrinsic_aspect > container_aspect {
        // Relatively wider: full width, bars top and bottom.
        let display_height = container_width / intrinsic_aspect;
        ViewportGeometry {
            display_width: container_width,
            display_height,
            offset_x: 0.0,
            offset_y: (container_height - display_height) / 2.0,
        }
    } else {
        // Relatively taller or equal: full height, bars left and right.
        let display_width = container_height * intrinsic_aspect;
        ViewportGeometry {
            display_width,
            display_height: container_height,
            offset_x: (container_width - display_width) / 2.0,
            offset_y: 0.0,
        }
    }
}

/// [`compute_geometry`] guarded by the availability check: `None` while the
/// media has no intrinsic size yet or the container is collapsed.
pub fn geometry_for(intrinsic: Option<Size>, container: Size) -> Option<ViewportGeometry> {
    let intrinsic = intrinsic.filter(Size::is_drawable)?;
    if !container.is_drawable() {
        return None;
    }
    Some(compute_geometry(
        intrinsic.width,
        intrinsic.height,
        container.width,
        container.height,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.05
    }

    #[test]
    fn letterboxes_wide_video_in_square_container() {
        let g = compute_geometry(1920.0, 1080.0, 500.0, 500.0);
        assert_eq!(g.display_width, 500.0);
        assert!(close(g.display_height, 281.25), "h={}", g.display_height);
        assert_eq!(g.offset_x, 0.0);
        assert!(close(g.offset_y, 109.4), "y={}", g.offset_y);
    }

    #[test]
    fn pillarboxes_tall_video_in_wide_container() {
        let g = compute_geometry(1080.0, 1920.0, 800.0, 450.0);
        assert_eq!(g.display_height, 450.0);
        assert!(close(g.display_width, 253.1), "w={}", g.display_width);
        assert_eq!(g.offset_y, 0.0);
        assert!(close(g.offset_x, 273.4), "x={}", g.offset_x);
    }

    #[test]
    fn matching_aspect_fills_container() {
        let g = compute_geometry(1280.0, 720.0, 640.0, 360.0);
        assert_eq!(g.content_rect(), Rect::new(0.0, 0.0, 640.0, 360.0));
    }

    #[test]
    fn preserves_aspect_across_shapes() {
        let sizes = [1.0, 3.0, 17.0, 240.0, 1080.0, 1920.0, 4096.0];
        for &iw in &sizes {
            for &ih in &sizes {
                for &cw in &sizes {
                    for &ch in &sizes {
                        let g = compute_geometry(iw, ih, cw, ch);
                        let ratio = g.display_width / g.display_height;
                        assert!(
                            (ratio - iw / ih).abs() <= 1e-9 * (iw / ih).max(1.0),
                            "{iw}x{ih} in {cw}x{ch}: ratio {ratio}"
                        );
                        assert!(g.offset_x >= 0.0 && g.offset_y >= 0.0);
                        assert_eq!(g.offset_x * g.offset_y, 0.0);
                        assert!(g.display_width <= cw + 1e-9);
                        assert!(g.display_height <= ch + 1e-9);
                    }
                }
            }
        }
    }

    #[test]
    fn maps_normalized_landmarks_into_content_rect() {
        let g = compute_geometry(1080.0, 1920.0, 800.0, 450.0);
        let center = g.map(&Landmark::new(0.5, 0.5));
        assert!(close(center.x, 400.0));
        assert!(close(center.y, 225.0));
        let origin = g.map(&Landmark::new(0.0, 0.0));
        assert!(close(origin.x, g.offset_x));
        assert_eq!(origin.y, 0.0);
    }

    #[test]
    fn corrupt_coordinates_map_to_content_origin() {
        let g = compute_geometry(1920.0, 1080.0, 500.0, 500.0);
        let lm = Landmark {
            x: Some(f64::NAN),
            ..Landmark::default()
        };
        let p = g.map(&lm);
        assert_eq!(p, Point::new(0.0, g.offset_y));
    }

    #[test]
    fn no_geometry_without_metadata() {
        let container = Size::new(640.0, 360.0);
        assert!(geometry_for(None, container).is_none());
        assert!(geometry_for(Some(Size::new(0.0, 0.0)), container).is_none());
        assert!(geometry_for(Some(Size::new(1920.0, 1080.0)), Size::new(0.0, 360.0)).is_none());
        assert!(geometry_for(Some(Size::new(1920.0, 1080.0)), container).is_some());
    }
}
