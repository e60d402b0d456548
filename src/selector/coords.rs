//! Coordinate conversion utilities.
//!
//! Converts between display coordinates (the scaled photo on screen) and
//! original image pixel coordinates.

use serde::{Deserialize, Serialize};

/// A point in original-image pixel space. Unitless.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Four corners in order: top-left, top-right, bottom-right, bottom-left.
pub type Quad = [Point; 4];

/// Axis-aligned quad covering the whole image.
pub fn full_image_quad(width: u32, height: u32) -> Quad {
    let w = width as f64;
    let h = height as f64;
    [
        Point::new(0.0, 0.0),
        Point::new(w, 0.0),
        Point::new(w, h),
        Point::new(0.0, h),
    ]
}

/// Uniform scale that fits an image into a display box, preserving aspect ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayTransform {
    /// Display pixels per image pixel
    pub scale: f64,
    /// Scaled image width on screen
    pub display_width: f64,
    /// Scaled image height on screen
    pub display_height: f64,
}

impl DisplayTransform {
    /// Fits a `width`×`height` image into a `box_width`×`box_height` box.
    ///
    /// Small images are scaled up as well as large ones scaled down.
    /// Returns `None` for empty images or boxes.
    pub fn fit(width: u32, height: u32, box_width: f64, box_height: f64) -> Option<Self> {
        if width == 0 || height == 0 || box_width <= 0.0 || box_height <= 0.0 {
            return None;
        }
        let scale = (box_width / width as f64).min(box_height / height as f64);
        Some(Self {
            scale,
            display_width: width as f64 * scale,
            display_height: height as f64 * scale,
        })
    }

    /// Image pixel coordinates to display coordinates.
    pub fn to_display(&self, p: Point) -> Point {
        Point::new(p.x * self.scale, p.y * self.scale)
    }

    /// Display coordinates back to image pixel coordinates.
    pub fn to_image(&self, p: Point) -> Point {
        Point::new(p.x / self.scale, p.y / self.scale)
    }
}
