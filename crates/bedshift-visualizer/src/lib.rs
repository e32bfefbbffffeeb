//! # Bedshift Visualizer
//!
//! G-code line parsing, the offset transform engine, and the interactive bed
//! preview (path model, viewport mapping, gestures, SVG frames).

pub mod gcode;
pub mod utils;
pub mod visualizer;

pub use gcode::{
    Axis, Document, GcodeLine, LineEnding, MotionCommand, MotionKind, OffsetTransform, Token,
    TransformStats,
};

pub use visualizer::{
    build_frame, BedSize, Bounds, DragState, Frame, InteractionController, PathModel, Rect,
    Segment, ViewportMapper, ViewportState,
};

pub use utils::{
    fixed_file_name, list_gcode_files, move_to_processed, read_document, timestamp_now,
    translate_file, NameStyle,
};
