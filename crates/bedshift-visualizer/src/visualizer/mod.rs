//! Bed preview
//!
//! - Path model built from a parsed document (path)
//! - Model/bed/pixel coordinate mapping, pan and zoom (viewport)
//! - Drag and scroll gestures (interaction)
//! - SVG frame output (canvas_renderer)

pub mod canvas_renderer;
pub mod interaction;
pub mod path;
pub mod viewport;

pub use canvas_renderer::{build_frame, clip_to_rect, Frame, Label, Line};
pub use interaction::{DragState, InteractionController, OffsetCallback};
pub use path::{Bounds, PathModel, Segment};
pub use viewport::{BedSize, Rect, ViewportMapper, ViewportState};
