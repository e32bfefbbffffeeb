//! Offset transform engine
//!
//! Shifts every `X`/`Y` coordinate of every motion command by a constant
//! offset. Coordinates are rewritten with exactly three decimals and a comment
//! stating the offset is prepended. All other content is copied unchanged.

use super::line::{Document, GcodeLine};
use bedshift_core::constants::OFFSET_DECIMALS;
use bedshift_core::{Offset, Result};
use std::io::{BufRead, Write};
use tracing::{debug, info};

/// Counters reported by a transform run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformStats {
    /// Source lines processed (the header is not counted)
    pub lines: usize,
    /// Motion commands rewritten
    pub motion_commands: usize,
    /// Individual X/Y tokens shifted
    pub coordinates_shifted: usize,
}

/// Stateless offset transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetTransform {
    offset: Offset,
}

impl OffsetTransform {
    pub fn new(offset: Offset) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }

    /// Comment line written at the top of every transformed program
    pub fn header_line(&self) -> String {
        format!(
            "; Translated with offsets: X={:.*}mm, Y={:.*}mm\n",
            OFFSET_DECIMALS, self.offset.dx, OFFSET_DECIMALS, self.offset.dy
        )
    }

    /// Transform one line. Passthrough lines are cloned as-is.
    pub fn apply(&self, line: &GcodeLine) -> GcodeLine {
        match line {
            GcodeLine::Motion(cmd) => {
                GcodeLine::Motion(cmd.translated(self.offset.dx, self.offset.dy))
            }
            GcodeLine::Passthrough(raw) => GcodeLine::Passthrough(raw.clone()),
        }
    }

    /// Transform a whole document. The result starts with the header comment,
    /// followed by exactly one output line per input line.
    pub fn transform(&self, document: &Document) -> Document {
        let mut lines = Vec::with_capacity(document.len() + 1);
        lines.push(GcodeLine::Passthrough(self.header_line()));
        lines.extend(document.lines().iter().map(|line| self.apply(line)));
        Document::from_lines(lines)
    }

    /// Parse, transform and render a program held in memory
    pub fn transform_str(&self, text: &str) -> Result<String> {
        let document = Document::parse(text)?;
        Ok(self.transform(&document).to_text())
    }

    /// Transform line by line from `reader` to `writer`.
    ///
    /// Memory use is bounded by the longest line. On a malformed coordinate the
    /// error is returned and whatever was already written stays in `writer`.
    pub fn transform_stream<R: BufRead, W: Write>(
        &self,
        mut reader: R,
        mut writer: W,
    ) -> Result<TransformStats> {
        let mut stats = TransformStats::default();
        let mut raw = String::new();
        let mut out = String::new();

        writer.write_all(self.header_line().as_bytes())?;

        loop {
            raw.clear();
            if reader.read_line(&mut raw)? == 0 {
                break;
            }
            stats.lines += 1;

            let line = GcodeLine::parse(&raw, stats.lines)?;
            if let GcodeLine::Motion(cmd) = &line {
                stats.motion_commands += 1;
                stats.coordinates_shifted += cmd.coordinate_count();
            }

            out.clear();
            self.apply(&line).write_line(&mut out);
            writer.write_all(out.as_bytes())?;
        }

        writer.flush()?;
        debug!(
            "Streamed {} lines ({} motion commands) with offset {}",
            stats.lines, stats.motion_commands, self.offset
        );
        Ok(stats)
    }

    /// Collect statistics for a document without transforming it
    pub fn stats_for(document: &Document) -> TransformStats {
        TransformStats {
            lines: document.len(),
            motion_commands: document.motion_count(),
            coordinates_shifted: document
                .motion_commands()
                .map(|cmd| cmd.coordinate_count())
                .sum(),
        }
    }
}

/// Log a summary of a finished transform
pub(crate) fn log_summary(offset: Offset, stats: &TransformStats) {
    info!(
        "Translated {} motion commands ({} coordinates) with offsets X={:.1}, Y={:.1}",
        stats.motion_commands, stats.coordinates_shifted, offset.dx, offset.dy
    );
}
