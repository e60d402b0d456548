//! Corner selection for slip photos.
//!
//! The user marks the four corners of the slip on the displayed photo; the
//! backend uses them for perspective correction before OCR.

pub mod coords;
pub mod overlay;
pub mod preview;
pub mod state;

pub use coords::Point;
pub use overlay::MARKER_RADIUS;
pub use state::CornerSelector;
