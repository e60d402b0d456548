//! Overlay geometry drawn on top of the displayed photo.

use super::coords::{DisplayTransform, Point, Quad};

/// Radius of a corner marker on screen.
pub const MARKER_RADIUS: f64 = 10.0;

/// One corner marker in display space.
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub center: Point,
    /// 1-based corner number shown inside the marker
    pub label: String,
}

/// Everything needed to paint the selection: markers plus a closed outline.
#[derive(Clone, Debug, PartialEq)]
pub struct Overlay {
    pub markers: Vec<Marker>,
    /// Outline vertices in display space; the last connects back to the first.
    pub outline: Vec<Point>,
}

impl Overlay {
    /// Builds display-space overlay geometry for image-space corners.
    pub fn build(corners: &Quad, transform: &DisplayTransform) -> Self {
        let outline: Vec<Point> = corners.iter().map(|&c| transform.to_display(c)).collect();
        let markers = outline
            .iter()
            .enumerate()
            .map(|(i, &center)| Marker {
                center,
                label: (i + 1).to_string(),
            })
            .collect();
        Self { markers, outline }
    }

    /// Closed outline segments, including the one back to the first vertex.
    pub fn segments(&self) -> Vec<(Point, Point)> {
        let n = self.outline.len();
        (0..n)
            .map(|i| (self.outline[i], self.outline[(i + 1) % n]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::coords::full_image_quad;

    #[test]
    fn test_overlay_scaled_and_labeled() {
        let t = DisplayTransform::fit(1600, 1200, 800.0, 600.0).unwrap();
        let overlay = Overlay::build(&full_image_quad(1600, 1200), &t);

        let labels: Vec<&str> = overlay.markers.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["1", "2", "3", "4"]);
        assert_eq!(overlay.markers[2].center, Point::new(800.0, 600.0));
    }

    #[test]
    fn test_segments_close_the_polygon() {
        let t = DisplayTransform::fit(100, 100, 100.0, 100.0).unwrap();
        let overlay = Overlay::build(&full_image_quad(100, 100), &t);
        let segments = overlay.segments();

        assert_eq!(segments.len(), 4);
        assert_eq!(segments[3].0, Point::new(0.0, 100.0));
        assert_eq!(segments[3].1, Point::new(0.0, 0.0));
    }
}
