//! Corner selection state.
//!
//! Holds the four corners of the slip for one crop session and applies
//! pointer events to them. All positions are stored in original-image
//! pixel space; pointer input arrives in display space.

use anyhow::{anyhow, Context, Result};

use super::coords::{full_image_quad, DisplayTransform, Point, Quad};
use super::overlay::Overlay;
use crate::config::SelectorConfig;

/// Interactive four-corner selector over one image.
#[derive(Clone, Debug)]
pub struct CornerSelector {
    config: SelectorConfig,
    /// Natural size of the loaded image. `None` until an image is loaded.
    image_size: Option<(u32, u32)>,
    corners: Quad,
    transform: Option<DisplayTransform>,
    /// Index of the corner currently being dragged.
    dragging: Option<usize>,
}

impl CornerSelector {
    /// Creates an unready selector.
    pub fn new(config: SelectorConfig) -> Self {
        Self {
            config,
            image_size: None,
            corners: full_image_quad(0, 0),
            transform: None,
            dragging: None,
        }
    }

    /// Sets up the selector for an image of the given natural size.
    ///
    /// Corners start at the image's four extremes.
    pub fn initialize(&mut self, width: u32, height: u32) -> Result<()> {
        let transform = DisplayTransform::fit(
            width,
            height,
            self.config.display_width,
            self.config.display_height,
        )
        .ok_or_else(|| anyhow!("Cannot display an image of size {}x{}", width, height))?;

        self.image_size = Some((width, height));
        self.transform = Some(transform);
        self.corners = full_image_quad(width, height);
        self.dragging = None;
        log::debug!("Selector initialized for {}x{} (scale {:.4})", width, height, transform.scale);
        Ok(())
    }

    /// Decodes image bytes and initializes from the decoded dimensions.
    ///
    /// On failure the selector keeps its previous state; a fresh selector stays unready.
    pub fn initialize_from_bytes(&mut self, bytes: &[u8]) -> Result<image::RgbaImage> {
        let decoded = image::load_from_memory(bytes).context("Failed to decode image")?;
        let rgba = decoded.to_rgba8();
        self.initialize(rgba.width(), rgba.height())?;
        Ok(rgba)
    }

    /// True once an image has been loaded successfully.
    pub fn is_ready(&self) -> bool {
        self.image_size.is_some()
    }

    /// Current corners, or `None` while unready.
    pub fn corners(&self) -> Option<&Quad> {
        self.image_size.map(|_| &self.corners)
    }

    pub fn image_size(&self) -> Option<(u32, u32)> {
        self.image_size
    }

    pub fn transform(&self) -> Option<DisplayTransform> {
        self.transform
    }

    pub fn dragging(&self) -> Option<usize> {
        self.dragging
    }

    /// Returns the corner nearest to a display-space pointer position, if it
    /// lies within the grab radius (measured in image pixels).
    ///
    /// Equal distances resolve to the lowest index.
    pub fn hit_test(&self, display_pos: Point) -> Option<usize> {
        let transform = self.transform?;
        let pos = transform.to_image(display_pos);

        let mut best: Option<(usize, f64)> = None;
        for (index, corner) in self.corners.iter().enumerate() {
            let distance = corner.distance(&pos);
            if distance > self.config.hit_radius {
                continue;
            }
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((index, distance)),
            }
        }
        best.map(|(index, _)| index)
    }

    /// Moves one corner to a display-space pointer position. No clamping:
    /// corners may leave the image bounds.
    pub fn drag_corner(&mut self, index: usize, display_pos: Point) {
        let Some(transform) = self.transform else {
            return;
        };
        if let Some(corner) = self.corners.get_mut(index) {
            *corner = transform.to_image(display_pos);
        }
    }

    /// Pointer down. Starts dragging the hit corner, if any.
    pub fn begin_drag(&mut self, display_pos: Point) -> Option<usize> {
        self.dragging = self.hit_test(display_pos);
        self.dragging
    }

    /// Pointer move. Updates the dragged corner, if a drag is active.
    pub fn drag_to(&mut self, display_pos: Point) {
        if let Some(index) = self.dragging {
            self.drag_corner(index, display_pos);
        }
    }

    /// Pointer up.
    pub fn end_drag(&mut self) {
        self.dragging = None;
    }

    /// Restores the axis-aligned full-image quad.
    pub fn reset(&mut self) {
        if let Some((width, height)) = self.image_size {
            self.corners = full_image_quad(width, height);
        }
        self.dragging = None;
    }

    /// Forgets the image entirely; the selector becomes unready.
    pub fn clear(&mut self) {
        self.image_size = None;
        self.transform = None;
        self.corners = full_image_quad(0, 0);
        self.dragging = None;
    }

    /// Corners as `[[x0,y0],[x1,y1],[x2,y2],[x3,y3]]`, or `None` while unready.
    pub fn corners_json(&self) -> Option<String> {
        let corners = self.corners()?;
        let pairs: Vec<[f64; 2]> = corners.iter().map(|p| [p.x, p.y]).collect();
        serde_json::to_string(&pairs).ok()
    }

    /// Display-space overlay geometry for the current corners.
    pub fn overlay(&self) -> Option<Overlay> {
        let transform = self.transform?;
        let corners = self.corners()?;
        Some(Overlay::build(corners, &transform))
    }
}
