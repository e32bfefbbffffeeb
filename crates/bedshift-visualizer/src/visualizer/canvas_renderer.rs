//! Canvas renderer for the bed preview
//!
//! Reads a [`ViewportMapper`] and an optional [`PathModel`] and produces a
//! [`Frame`] of pixel-space primitives: bed outline, 10 mm grid, axis labels,
//! FRONT/BACK labels and the toolpath clipped to the bed. A frame can be
//! serialised to SVG.

use super::path::PathModel;
use super::viewport::{Rect, ViewportMapper};
use bedshift_core::constants::{GRID_LABEL_STEP_MM, GRID_STEP_MM, MAX_BED_SIZE_MM};
use bedshift_core::Point;
use std::fmt::Write;
use tracing::{trace, warn};

const GRID_COLOR: &str = "#c8c8c8";
const TEXT_COLOR: &str = "#646464";
const TOOLPATH_COLOR: &str = "#0000ff";
const FONT_SIZE_PX: f64 = 11.0;

/// Line in pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub from: Point,
    pub to: Point,
}

/// Text anchored at its baseline start, in pixel space
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub at: Point,
    pub text: String,
}

/// Everything needed to draw one preview frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
    pub bed: Rect,
    pub grid: Vec<Line>,
    pub labels: Vec<Label>,
    pub toolpath: Vec<Line>,
}

/// Build the frame for the current viewport state
pub fn build_frame(mapper: &ViewportMapper, path: Option<&PathModel>) -> Frame {
    let (width, height) = mapper.surface_size();
    let bed = mapper.bed_rect();
    let (grid, mut labels) = grid_lines(mapper, &bed);

    let center = bed.center();
    labels.push(Label {
        at: Point::new(center.x - 15.0, bed.bottom() + 20.0),
        text: "FRONT".to_string(),
    });
    labels.push(Label {
        at: Point::new(center.x - 15.0, bed.top - 10.0),
        text: "BACK".to_string(),
    });

    let toolpath = match path {
        Some(model) => model
            .segments()
            .iter()
            .filter_map(|seg| {
                clip_to_rect(
                    mapper.model_to_pixel(seg.start),
                    mapper.model_to_pixel(seg.end),
                    &bed,
                )
            })
            .collect(),
        None => {
            labels.push(Label {
                at: Point::new(center.x - 45.0, center.y),
                text: "No path loaded".to_string(),
            });
            Vec::new()
        }
    };

    trace!(
        "Built frame: {} grid lines, {} toolpath lines",
        grid.len(),
        toolpath.len()
    );

    Frame {
        width,
        height,
        bed,
        grid,
        labels,
        toolpath,
    }
}

/// Upper end of the grid along one axis, or `None` when the bed dimension
/// cannot be drawn (not finite, not positive, or too large)
fn grid_extent(dimension: f64) -> Option<usize> {
    if dimension.is_finite() && dimension > 0.0 && dimension <= MAX_BED_SIZE_MM {
        Some(dimension as usize)
    } else {
        warn!("Bed dimension {} mm out of range, grid skipped", dimension);
        None
    }
}

/// Grid lines every 10 mm with a label every 50 mm. The grid is drawn in bed
/// space, so it stays put while the toolpath is dragged.
fn grid_lines(mapper: &ViewportMapper, bed: &Rect) -> (Vec<Line>, Vec<Label>) {
    let mut lines = Vec::new();
    let mut labels = Vec::new();
    let s = mapper.scale_factor();
    let size = mapper.bed_size();
    let step = GRID_STEP_MM as usize;
    let label_step = GRID_LABEL_STEP_MM as usize;
    let (Some(max_x), Some(max_y)) = (grid_extent(size.width), grid_extent(size.height)) else {
        return (lines, labels);
    };

    for x in (0..=max_x).step_by(step) {
        let px = bed.left + x as f64 * s;
        lines.push(Line {
            from: Point::new(px, bed.top),
            to: Point::new(px, bed.bottom()),
        });
        if x % label_step == 0 {
            labels.push(Label {
                at: Point::new(px + 2.0, bed.bottom() - 10.0),
                text: x.to_string(),
            });
        }
    }

    for y in (0..=max_y).step_by(step) {
        let py = bed.bottom() - y as f64 * s;
        lines.push(Line {
            from: Point::new(bed.left, py),
            to: Point::new(bed.right(), py),
        });
        if y % label_step == 0 {
            labels.push(Label {
                at: Point::new(bed.left + 2.0, py + 12.0),
                text: y.to_string(),
            });
        }
    }

    (lines, labels)
}

/// Liang-Barsky clipping of a segment against a rectangle.
/// Returns `None` when the segment lies entirely outside.
pub fn clip_to_rect(from: Point, to: Point, rect: &Rect) -> Option<Line> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;

    let edges = [
        (-dx, from.x - rect.left),
        (dx, rect.right() - from.x),
        (-dy, from.y - rect.top),
        (dy, rect.bottom() - from.y),
    ];

    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    Some(Line {
        from: Point::new(from.x + t0 * dx, from.y + t0 * dy),
        to: Point::new(from.x + t1 * dx, from.y + t1 * dy),
    })
}

impl Frame {
    /// Serialise as a standalone SVG document
    pub fn to_svg(&self) -> String {
        let mut svg = String::with_capacity(256 + (self.grid.len() + self.toolpath.len()) * 48);

        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" viewBox="0 0 {:.3} {:.3}">"#,
            self.width, self.height, self.width, self.height
        );
        let _ = writeln!(
            svg,
            r#"  <rect x="{:.3}" y="{:.3}" width="{:.3}" height="{:.3}" fill="none" stroke="{}"/>"#,
            self.bed.left, self.bed.top, self.bed.width, self.bed.height, GRID_COLOR
        );
        let _ = writeln!(
            svg,
            r#"  <path d="{}" fill="none" stroke="{}" stroke-width="1"/>"#,
            path_data(&self.grid),
            GRID_COLOR
        );
        let _ = writeln!(
            svg,
            r#"  <path d="{}" fill="none" stroke="{}" stroke-width="1"/>"#,
            path_data(&self.toolpath),
            TOOLPATH_COLOR
        );
        for label in &self.labels {
            let _ = writeln!(
                svg,
                r#"  <text x="{:.3}" y="{:.3}" font-size="{}" fill="{}">{}</text>"#,
                label.at.x, label.at.y, FONT_SIZE_PX, TEXT_COLOR, label.text
            );
        }
        svg.push_str("</svg>\n");
        svg
    }
}

/// SVG path data with one `M`/`L` pair per line
fn path_data(lines: &[Line]) -> String {
    let mut d = String::with_capacity(lines.len() * 40);
    for line in lines {
        let _ = write!(
            d,
            "M{:.3} {:.3} L{:.3} {:.3} ",
            line.from.x, line.from.y, line.to.x, line.to.y
        );
    }
    d.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gcode::Document;
    use crate::visualizer::viewport::BedSize;

    fn mapper() -> ViewportMapper {
        let mut m = ViewportMapper::new(BedSize::new(220.0, 220.0), 800.0, 800.0);
        m.fit();
        m
    }

    #[test]
    fn test_grid_counts_for_default_bed() {
        let frame = build_frame(&mapper(), None);
        // 23 vertical + 23 horizontal lines (0..=220 step 10)
        assert_eq!(frame.grid.len(), 46);
        // 0, 50, 100, 150, 200 on each axis, plus FRONT, BACK and the empty-path note
        assert_eq!(frame.labels.len(), 13);
        assert!(frame.labels.iter().any(|l| l.text == "No path loaded"));
    }

    #[test]
    fn test_unbounded_bed_draws_no_grid() {
        let m = ViewportMapper::new(BedSize::new(f64::INFINITY, 1e300), 800.0, 800.0);
        let frame = build_frame(&m, None);
        assert!(frame.grid.is_empty());
        // FRONT, BACK and the empty-path note only
        assert_eq!(frame.labels.len(), 3);
    }

    #[test]
    fn test_toolpath_lines_match_segments() {
        let doc = Document::parse("G1 X10 Y10\nG1 X20 Y10\nG1 X20 Y20\n").unwrap();
        let model = PathModel::load(&doc).unwrap();
        let m = mapper();
        let frame = build_frame(&m, Some(&model));
        assert_eq!(frame.toolpath.len(), 3);
        assert!(frame.toolpath[1]
            .to
            .approx_eq(&m.model_to_pixel(Point::new(20.0, 10.0)), 1e-9));
        assert!(!frame.labels.iter().any(|l| l.text == "No path loaded"));
    }

    #[test]
    fn test_clip_inside_is_unchanged() {
        let rect = Rect {
            left: 0.0,
            top: 0.0,
            width: 10.0,
            height: 10.0,
        };
        let line = clip_to_rect(Point::new(1.0, 1.0), Point::new(9.0, 5.0), &rect).unwrap();
        assert_eq!(line.from, Point::new(1.0, 1.0));
        assert_eq!(line.to, Point::new(9.0, 5.0));
    }

    #[test]
    fn test_clip_crossing_and_outside() {
        let rect = Rect {
            left: 0.0,
            top: 0.0,
            width: 10.0,
            height: 10.0,
        };
        let line = clip_to_rect(Point::new(-5.0, 5.0), Point::new(15.0, 5.0), &rect).unwrap();
        assert!(line.from.approx_eq(&Point::new(0.0, 5.0), 1e-12));
        assert!(line.to.approx_eq(&Point::new(10.0, 5.0), 1e-12));

        assert!(clip_to_rect(Point::new(-5.0, -5.0), Point::new(-1.0, 20.0), &rect).is_none());
    }

    #[test]
    fn test_svg_output_shape() {
        let svg = build_frame(&mapper(), None).to_svg();
        assert!(svg.starts_with("<svg "));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains(">FRONT</text>"));
        assert!(svg.contains(">BACK</text>"));
    }
}
