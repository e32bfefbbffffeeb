//! # bedshift Core
//!
//! Core types shared by every bedshift crate.
//! Provides the error hierarchy, planar points and offsets,
//! and the numeric constants used by the transform engine and the viewer.

pub mod constants;
pub mod data;
pub mod error;

pub use data::{Offset, Point};

pub use error::{ConnectionError, Error, GcodeError, Result};
