//! Preview rendering for corner selections.
//!
//! Burns the selection outline and corner markers into a copy of the photo
//! so a selection can be saved and inspected outside the app.

use anyhow::{Context, Result};
use image::{ImageBuffer, Rgba, RgbaImage};
use std::path::Path;

use super::coords::Quad;

/// Color constants for preview rendering.
pub const COLOR_OUTLINE: Rgba<u8> = Rgba([0, 255, 0, 255]); // Green
pub const COLOR_MARKER: Rgba<u8> = Rgba([255, 0, 0, 255]); // Red

/// Renders the selection onto a copy of the image.
///
/// Line thickness and marker size scale with the image so they stay
/// visible on large phone photos.
pub fn render_selection_preview(image: &RgbaImage, corners: &Quad) -> RgbaImage {
    let mut img = image.clone();
    let (width, height) = img.dimensions();
    let longest = width.max(height);
    let thickness = (longest / 400).max(2) as i64;
    let marker_radius = (longest / 120).max(5) as i64;

    for i in 0..corners.len() {
        let a = corners[i];
        let b = corners[(i + 1) % corners.len()];
        draw_line(
            &mut img,
            (a.x.round() as i64, a.y.round() as i64),
            (b.x.round() as i64, b.y.round() as i64),
            COLOR_OUTLINE,
            thickness,
        );
    }

    for corner in corners {
        draw_marker(
            &mut img,
            corner.x.round() as i64,
            corner.y.round() as i64,
            COLOR_MARKER,
            marker_radius,
        );
    }

    img
}

/// Saves a preview image as PNG.
pub fn save_preview(img: &RgbaImage, path: &Path) -> Result<()> {
    img.save(path)
        .context(format!("Failed to save preview: {}", path.display()))?;
    Ok(())
}

/// Draws a thick line. Pixels outside the image are skipped.
pub fn draw_line(
    img: &mut ImageBuffer<Rgba<u8>, Vec<u8>>,
    from: (i64, i64),
    to: (i64, i64),
    color: Rgba<u8>,
    thickness: i64,
) {
    let (mut x, mut y) = from;
    let dx = (to.0 - from.0).abs();
    let dy = -(to.1 - from.1).abs();
    let sx = if from.0 < to.0 { 1 } else { -1 };
    let sy = if from.1 < to.1 { 1 } else { -1 };
    let mut err = dx + dy;
    let half = thickness / 2;

    loop {
        for oy in -half..=half {
            for ox in -half..=half {
                put_pixel_clipped(img, x + ox, y + oy, color);
            }
        }
        if x == to.0 && y == to.1 {
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

/// Draws a filled disc centred on a corner.
pub fn draw_marker(
    img: &mut ImageBuffer<Rgba<u8>, Vec<u8>>,
    cx: i64,
    cy: i64,
    color: Rgba<u8>,
    radius: i64,
) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put_pixel_clipped(img, cx + dx, cy + dy, color);
            }
        }
    }
}

fn put_pixel_clipped(img: &mut ImageBuffer<Rgba<u8>, Vec<u8>>, x: i64, y: i64, color: Rgba<u8>) {
    let (w, h) = img.dimensions();
    if x >= 0 && y >= 0 && x < w as i64 && y < h as i64 {
        img.put_pixel(x as u32, y as u32, color);
    }
}
