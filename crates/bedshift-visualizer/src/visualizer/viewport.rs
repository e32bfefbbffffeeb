//! Viewport and coordinate transformation for the bed preview.
//!
//! Handles conversion between three coordinate spaces:
//! - model space: machine millimeters, Y grows away from the operator
//! - bed space: millimeters relative to the bed's front-left corner, `bed = model + pan`
//! - pixel space: rendering surface coordinates, (0,0) at top-left, Y grows down
//!
//! The bed rectangle is centred on the surface and sized `bed_size * scale_factor`.

use bedshift_core::constants::{DEFAULT_BED_HEIGHT_MM, DEFAULT_BED_WIDTH_MM, FIT_MARGIN, ZOOM_STEP};
use bedshift_core::{Offset, Point};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

const MIN_SCALE_FACTOR: f64 = 1e-3;
const MAX_SCALE_FACTOR: f64 = 1e3;

/// Physical bed dimensions in millimeters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BedSize {
    pub width: f64,
    pub height: f64,
}

impl BedSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for BedSize {
    fn default() -> Self {
        Self::new(DEFAULT_BED_WIDTH_MM, DEFAULT_BED_HEIGHT_MM)
    }
}

/// Axis-aligned rectangle in pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right() && p.y >= self.top && p.y <= self.bottom()
    }
}

/// Zoom/pan state of the preview
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    /// Pixels per millimeter, always > 0
    pub scale_factor: f64,
    /// Accumulated drag, in model-space millimeters
    pub pan_offset: Point,
    pub bed_size: BedSize,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            scale_factor: 1.0,
            pan_offset: Point::ORIGIN,
            bed_size: BedSize::default(),
        }
    }
}

/// Owns the viewport state and maps between model, bed and pixel space.
///
/// Rendering code only reads from it; state changes go through `fit`, `pan`
/// and `zoom`.
#[derive(Debug, Clone)]
pub struct ViewportMapper {
    state: ViewportState,
    surface_width: f64,
    surface_height: f64,
}

impl ViewportMapper {
    /// Creates a mapper at scale 1.0 with no pan.
    pub fn new(bed_size: BedSize, surface_width: f64, surface_height: f64) -> Self {
        Self {
            state: ViewportState {
                bed_size,
                ..ViewportState::default()
            },
            surface_width,
            surface_height,
        }
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn scale_factor(&self) -> f64 {
        self.state.scale_factor
    }

    pub fn pan_offset(&self) -> Point {
        self.state.pan_offset
    }

    pub fn bed_size(&self) -> BedSize {
        self.state.bed_size
    }

    pub fn surface_size(&self) -> (f64, f64) {
        (self.surface_width, self.surface_height)
    }

    /// Sets the surface dimensions (typically called when the window resizes).
    /// Scale and pan are left alone.
    pub fn set_surface_size(&mut self, width: f64, height: f64) {
        self.surface_width = width;
        self.surface_height = height;
    }

    pub fn set_bed_size(&mut self, bed_size: BedSize) {
        self.state.bed_size = bed_size;
    }

    /// Scale the bed to fill 90% of the limiting surface dimension and clear the pan.
    ///
    /// Called once per document load. If the surface or bed has no area the
    /// scale is left unchanged.
    pub fn fit(&mut self) {
        let bed = self.state.bed_size;
        let scale = (self.surface_width / bed.width).min(self.surface_height / bed.height)
            * FIT_MARGIN;

        if scale.is_finite() && scale > 0.0 {
            self.state.scale_factor = scale;
        } else {
            warn!(
                "Cannot fit bed {}x{} into surface {}x{}, keeping scale {:.4}",
                bed.width, bed.height, self.surface_width, self.surface_height,
                self.state.scale_factor
            );
        }
        self.state.pan_offset = Point::ORIGIN;
        debug!("Fit viewport: {}", self);
    }

    /// Bed rectangle in pixel space
    pub fn bed_rect(&self) -> Rect {
        let s = self.state.scale_factor;
        let width = self.state.bed_size.width * s;
        let height = self.state.bed_size.height * s;
        Rect {
            left: self.surface_width / 2.0 - width / 2.0,
            top: self.surface_height / 2.0 - height / 2.0,
            width,
            height,
        }
    }

    /// Converts bed-space millimeters to pixel coordinates.
    ///
    /// ```text
    /// pixel_x = left + bed_x * scale
    /// pixel_y = bottom - bed_y * scale   // Flip Y-axis
    /// ```
    pub fn bed_to_pixel(&self, bed: Point) -> Point {
        let rect = self.bed_rect();
        let s = self.state.scale_factor;
        Point::new(rect.left + bed.x * s, rect.bottom() - bed.y * s)
    }

    /// Converts pixel coordinates to bed-space millimeters.
    pub fn pixel_to_bed(&self, pixel: Point) -> Point {
        let rect = self.bed_rect();
        let s = self.state.scale_factor;
        Point::new((pixel.x - rect.left) / s, (rect.bottom() - pixel.y) / s)
    }

    /// Model space to bed space: content is drawn shifted by the pan offset.
    pub fn model_to_bed(&self, model: Point) -> Point {
        model + self.state.pan_offset
    }

    pub fn bed_to_model(&self, bed: Point) -> Point {
        bed - self.state.pan_offset
    }

    /// Forward render transform used to draw toolpaths.
    pub fn model_to_pixel(&self, model: Point) -> Point {
        self.bed_to_pixel(self.model_to_bed(model))
    }

    /// Exact inverse of [`Self::model_to_pixel`].
    pub fn pixel_to_model(&self, pixel: Point) -> Point {
        self.bed_to_model(self.pixel_to_bed(pixel))
    }

    /// Apply a drag delta given in pixels.
    ///
    /// Dragging down the screen moves content towards the front of the bed, so
    /// the Y component is inverted.
    pub fn pan(&mut self, delta_pixels: Point) {
        let s = self.state.scale_factor;
        self.state.pan_offset += Point::new(delta_pixels.x / s, -delta_pixels.y / s);
    }

    /// Zoom by one step towards (`direction > 0`) or away from (`direction < 0`)
    /// the viewer, keeping the model point under `anchor` fixed on screen.
    /// A zero direction does nothing.
    pub fn zoom(&mut self, direction: i32, anchor: Point) {
        let new_scale = match direction.signum() {
            1 => self.state.scale_factor * ZOOM_STEP,
            -1 => self.state.scale_factor / ZOOM_STEP,
            _ => return,
        };
        if !(MIN_SCALE_FACTOR..=MAX_SCALE_FACTOR).contains(&new_scale) {
            debug!("Zoom to {:.5} rejected, outside scale limits", new_scale);
            return;
        }

        let anchored = self.pixel_to_model(anchor);
        self.state.scale_factor = new_scale;
        // pixel_to_model(anchor) = pixel_to_bed(anchor) - pan, solve for pan
        self.state.pan_offset = self.pixel_to_bed(anchor) - anchored;
    }

    /// Zooms in at a pixel position.
    pub fn zoom_in_at(&mut self, anchor: Point) {
        self.zoom(1, anchor);
    }

    /// Zooms out at a pixel position.
    pub fn zoom_out_at(&mut self, anchor: Point) {
        self.zoom(-1, anchor);
    }

    /// Offset the operator has chosen by dragging: the negated pan.
    pub fn current_offset(&self) -> Offset {
        Offset::from(-self.state.pan_offset)
    }

    pub fn reset_pan(&mut self) {
        self.state.pan_offset = Point::ORIGIN;
    }
}

impl fmt::Display for ViewportMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scale: {:.3}px/mm | Pan: ({:.2}, {:.2})",
            self.state.scale_factor, self.state.pan_offset.x, self.state.pan_offset.y
        )
    }
}

impl Default for ViewportMapper {
    fn default() -> Self {
        Self::new(BedSize::default(), 800.0, 800.0)
    }
}
