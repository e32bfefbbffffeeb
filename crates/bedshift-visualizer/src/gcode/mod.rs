//! G-Code line classification and offset transformation
//!
//! This module provides:
//! - Motion command / passthrough classification of raw lines
//! - Coordinate token extraction and replacement
//! - The `Document` model of a whole program
//! - The offset transform engine (in-memory and streaming)

pub mod line;
pub mod transform;

pub use line::{Axis, Document, GcodeLine, LineEnding, MotionCommand, MotionKind, Token};
pub use transform::{OffsetTransform, TransformStats};
