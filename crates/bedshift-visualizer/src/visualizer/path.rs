//! Toolpath model built from a G-Code document
//!
//! Motion commands are resolved to absolute positions with modal
//! carry-forward: an axis omitted on a line keeps its previous value. An axis
//! that has never been set resolves to the machine origin (0.0).

use crate::gcode::{Document, MotionCommand};
use bedshift_core::{GcodeError, Point};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Straight line between two resolved positions in model space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// True for the zero-length segment that opens every path
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }
}

/// Bounding box accumulator used while scanning toolpaths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new()
    }
}

impl Bounds {
    /// Inverted box that any point will grow
    pub fn new() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    pub fn update(&mut self, p: Point) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    /// False until at least one point has been added
    pub fn is_valid(&self) -> bool {
        self.min_x.is_finite()
            && self.max_x.is_finite()
            && self.min_y.is_finite()
            && self.max_y.is_finite()
            && self.min_x <= self.max_x
            && self.min_y <= self.max_y
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Centre of the box, or `None` while it is still empty
    pub fn center(&self) -> Option<Point> {
        self.is_valid().then(|| {
            Point::new(
                (self.min_x + self.max_x) / 2.0,
                (self.min_y + self.max_y) / 2.0,
            )
        })
    }
}

/// Current position threaded through a scan.
///
/// Lives only for the duration of one scan so nothing leaks between loads.
#[derive(Debug, Clone, Copy, Default)]
struct PositionAccumulator {
    x: Option<f64>,
    y: Option<f64>,
}

impl PositionAccumulator {
    /// Apply one command and return the resolved absolute position
    fn advance(&mut self, cmd: &MotionCommand) -> Point {
        if let Some(x) = cmd.x() {
            self.x = Some(x);
        }
        if let Some(y) = cmd.y() {
            self.y = Some(y);
        }
        Point::new(self.x.unwrap_or(0.0), self.y.unwrap_or(0.0))
    }
}

/// Ordered segments of a loaded program plus their bounding box
#[derive(Debug, Clone, PartialEq)]
pub struct PathModel {
    segments: Vec<Segment>,
    bounds: Bounds,
}

impl PathModel {
    /// Build segments and bounds. Never fails; an empty result has inverted bounds.
    pub fn scan(document: &Document) -> (Vec<Segment>, Bounds) {
        let mut accumulator = PositionAccumulator::default();
        let mut bounds = Bounds::new();
        let mut segments: Vec<Segment> = Vec::new();

        for cmd in document.motion_commands() {
            let position = accumulator.advance(cmd);
            let start = segments.last().map_or(position, |last| last.end);
            segments.push(Segment::new(start, position));
            bounds.update(position);
        }

        (segments, bounds)
    }

    /// Load a document for display.
    ///
    /// Returns `GcodeError::EmptyPath` when there is nothing to draw; callers
    /// must then skip fitting the viewport.
    pub fn load(document: &Document) -> Result<Self, GcodeError> {
        let (segments, bounds) = Self::scan(document);
        if segments.is_empty() {
            return Err(GcodeError::EmptyPath);
        }

        debug!(
            "Loaded {} segments, bounds x=[{:.2}, {:.2}] y=[{:.2}, {:.2}]",
            segments.len(),
            bounds.min_x,
            bounds.max_x,
            bounds.min_y,
            bounds.max_y
        );
        Ok(Self { segments, bounds })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Resolved position of every motion command, in order
    pub fn positions(&self) -> impl Iterator<Item = Point> + '_ {
        self.segments.iter().map(|s| s.end)
    }

    /// Total travelled distance
    pub fn total_length(&self) -> f64 {
        self.segments.iter().map(Segment::length).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Document {
        Document::parse(text).unwrap()
    }

    #[test]
    fn test_modal_carry_forward() {
        let model = PathModel::load(&doc("G1 X10\nG1 Y20\nG1 X30\n")).unwrap();
        let positions: Vec<Point> = model.positions().collect();
        assert_eq!(
            positions,
            vec![
                Point::new(10.0, 0.0),
                Point::new(10.0, 20.0),
                Point::new(30.0, 20.0)
            ]
        );
    }

    #[test]
    fn test_first_segment_is_degenerate() {
        let model = PathModel::load(&doc("G0 X5 Y5\nG1 X6 Y5\n")).unwrap();
        assert!(model.segments()[0].is_degenerate());
        assert_eq!(model.segments()[0].start, Point::new(5.0, 5.0));
        assert_eq!(
            model.segments()[1],
            Segment::new(Point::new(5.0, 5.0), Point::new(6.0, 5.0))
        );
    }

    #[test]
    fn test_segments_are_chained() {
        let model = PathModel::load(&doc("G1 X0 Y0\nG1 X1\nG1 Y1\nG1 X0\n")).unwrap();
        for pair in model.segments().windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert!((model.total_length() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_bounds_include_first_point() {
        let model = PathModel::load(&doc("G0 X-5 Y7\nG1 X10 Y-2\n")).unwrap();
        let b = model.bounds();
        assert_eq!((b.min_x, b.max_x), (-5.0, 10.0));
        assert_eq!((b.min_y, b.max_y), (-2.0, 7.0));
        assert_eq!(b.center(), Some(Point::new(2.5, 2.5)));
    }

    #[test]
    fn test_passthrough_lines_contribute_nothing() {
        let model = PathModel::load(&doc("; X100 Y100\nM104 S200\nG1 X1 Y1\n")).unwrap();
        assert_eq!(model.len(), 1);
        assert_eq!(model.bounds().max_x, 1.0);
    }

    #[test]
    fn test_empty_document_scan_keeps_inverted_bounds() {
        let (segments, bounds) = PathModel::scan(&doc("; only comments\nM84\n"));
        assert!(segments.is_empty());
        assert!(!bounds.is_valid());
        assert_eq!(bounds.min_x, f64::INFINITY);
        assert_eq!(bounds.max_y, f64::NEG_INFINITY);
        assert_eq!(bounds.center(), None);
    }

    #[test]
    fn test_empty_document_load_is_error() {
        assert_eq!(PathModel::load(&doc("")), Err(GcodeError::EmptyPath));
    }

    #[test]
    fn test_reload_starts_fresh() {
        let first = PathModel::load(&doc("G1 X50 Y50\n")).unwrap();
        let second = PathModel::load(&doc("G1 X1\n")).unwrap();
        assert_eq!(first.positions().next(), Some(Point::new(50.0, 50.0)));
        // No position carried over from the previous load
        assert_eq!(second.positions().next(), Some(Point::new(1.0, 0.0)));
    }
}
