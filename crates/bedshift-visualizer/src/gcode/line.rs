//! G-Code line parser
//!
//! A line is a motion command when it starts with the exact prefix `G0` or `G1`.
//! Motion lines are split on whitespace; `X`/`Y` tokens are parsed as numbers and
//! every other token is kept verbatim. Everything else passes through untouched.

use bedshift_core::constants::COORDINATE_DECIMALS;
use bedshift_core::GcodeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Prefixes that mark a motion command. Matched case-sensitively at column 0.
const MOTION_PREFIXES: [&str; 2] = ["G0", "G1"];

/// Kind of motion, taken from the line prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionKind {
    /// `G0` rapid positioning
    Rapid,
    /// `G1` linear move
    Linear,
}

/// Planar axis carried by a coordinate token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    fn letter(self) -> char {
        match self {
            Axis::X => 'X',
            Axis::Y => 'Y',
        }
    }
}

/// One whitespace-separated token of a motion line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Token {
    /// An `X` or `Y` word with its parsed value
    Coordinate { axis: Axis, value: f64 },
    /// Any other word, preserved verbatim
    Word(String),
}

/// Line terminator of a raw line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
    /// Final line of a document without a terminator
    None,
}

impl LineEnding {
    /// Split a raw line into its body and terminator
    pub fn split(raw: &str) -> (&str, LineEnding) {
        if let Some(body) = raw.strip_suffix("\r\n") {
            (body, LineEnding::CrLf)
        } else if let Some(body) = raw.strip_suffix('\n') {
            (body, LineEnding::Lf)
        } else {
            (raw, LineEnding::None)
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
            LineEnding::None => "",
        }
    }
}

/// A parsed `G0`/`G1` line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionCommand {
    kind: MotionKind,
    tokens: Vec<Token>,
    ending: LineEnding,
}

impl MotionCommand {
    /// Parse the body of a line already known to be a motion command.
    ///
    /// `line_number` is 1-based and only used for error reporting.
    pub fn parse(body: &str, line_number: usize) -> Result<Self, GcodeError> {
        let kind = if body.starts_with("G0") {
            MotionKind::Rapid
        } else {
            MotionKind::Linear
        };

        let tokens = body
            .split_whitespace()
            .map(|part| parse_token(part, line_number))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            kind,
            tokens,
            ending: LineEnding::Lf,
        })
    }

    /// Set the terminator written after this command
    pub fn with_ending(mut self, ending: LineEnding) -> Self {
        self.ending = ending;
        self
    }

    pub fn kind(&self) -> MotionKind {
        self.kind
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn ending(&self) -> LineEnding {
        self.ending
    }

    /// Last X value on the line, if any
    pub fn x(&self) -> Option<f64> {
        self.axis_value(Axis::X)
    }

    /// Last Y value on the line, if any
    pub fn y(&self) -> Option<f64> {
        self.axis_value(Axis::Y)
    }

    fn axis_value(&self, wanted: Axis) -> Option<f64> {
        self.tokens.iter().rev().find_map(|token| match token {
            Token::Coordinate { axis, value } if *axis == wanted => Some(*value),
            _ => None,
        })
    }

    /// Number of X/Y tokens on the line
    pub fn coordinate_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|t| matches!(t, Token::Coordinate { .. }))
            .count()
    }

    /// Return a copy with every X token shifted by `dx` and every Y token by `dy`.
    /// Other tokens keep their text and position.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        let tokens = self
            .tokens
            .iter()
            .map(|token| match token {
                Token::Coordinate { axis: Axis::X, value } => Token::Coordinate {
                    axis: Axis::X,
                    value: value + dx,
                },
                Token::Coordinate { axis: Axis::Y, value } => Token::Coordinate {
                    axis: Axis::Y,
                    value: value + dy,
                },
                Token::Word(word) => Token::Word(word.clone()),
            })
            .collect();

        Self {
            kind: self.kind,
            tokens,
            ending: self.ending,
        }
    }

    /// Write the command with its terminator. An unterminated source line
    /// gets a `\n` so the output always ends cleanly.
    pub fn write_line(&self, out: &mut String) {
        out.push_str(&self.to_string());
        match self.ending {
            LineEnding::None => out.push('\n'),
            ending => out.push_str(ending.as_str()),
        }
    }
}

impl fmt::Display for MotionCommand {
    /// Tokens joined by single spaces; coordinates use three decimals.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match token {
                Token::Coordinate { axis, value } => {
                    write!(f, "{}{:.*}", axis.letter(), COORDINATE_DECIMALS, value)?
                }
                Token::Word(word) => f.write_str(word)?,
            }
        }
        Ok(())
    }
}

fn parse_token(part: &str, line_number: usize) -> Result<Token, GcodeError> {
    let axis = match part.as_bytes().first() {
        Some(b'X') => Axis::X,
        Some(b'Y') => Axis::Y,
        _ => return Ok(Token::Word(part.to_string())),
    };

    part[1..]
        .parse::<f64>()
        .map(|value| Token::Coordinate { axis, value })
        .map_err(|_| GcodeError::MalformedCoordinate {
            line_number,
            token: part.to_string(),
        })
}

/// Check whether a raw line is a motion command
pub fn is_motion_line(raw: &str) -> bool {
    MOTION_PREFIXES.iter().any(|prefix| raw.starts_with(prefix))
}

/// One line of a G-Code document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GcodeLine {
    /// A parsed `G0`/`G1` line
    Motion(MotionCommand),
    /// Any other line, stored verbatim including its terminator
    Passthrough(String),
}

impl GcodeLine {
    /// Classify and parse one raw line (terminator included).
    pub fn parse(raw: &str, line_number: usize) -> Result<Self, GcodeError> {
        if !is_motion_line(raw) {
            return Ok(GcodeLine::Passthrough(raw.to_string()));
        }

        let (body, ending) = LineEnding::split(raw);
        MotionCommand::parse(body, line_number).map(|cmd| GcodeLine::Motion(cmd.with_ending(ending)))
    }

    pub fn as_motion(&self) -> Option<&MotionCommand> {
        match self {
            GcodeLine::Motion(cmd) => Some(cmd),
            GcodeLine::Passthrough(_) => None,
        }
    }

    pub fn write_line(&self, out: &mut String) {
        match self {
            GcodeLine::Motion(cmd) => cmd.write_line(out),
            GcodeLine::Passthrough(raw) => out.push_str(raw),
        }
    }
}

/// An ordered sequence of G-Code lines
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    lines: Vec<GcodeLine>,
}

impl Document {
    /// Parse a whole program. Fails on the first malformed coordinate.
    pub fn parse(text: &str) -> Result<Self, GcodeError> {
        let lines = text
            .split_inclusive('\n')
            .enumerate()
            .map(|(idx, raw)| GcodeLine::parse(raw, idx + 1))
            .collect::<Result<Vec<_>, _>>()?;

        let doc = Self { lines };
        debug!(
            "Parsed document: {} lines, {} motion commands",
            doc.len(),
            doc.motion_count()
        );
        Ok(doc)
    }

    pub fn from_lines(lines: Vec<GcodeLine>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[GcodeLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Motion commands in document order
    pub fn motion_commands(&self) -> impl Iterator<Item = &MotionCommand> {
        self.lines.iter().filter_map(GcodeLine::as_motion)
    }

    pub fn motion_count(&self) -> usize {
        self.motion_commands().count()
    }

    /// Render the document back to text
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            line.write_line(&mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn motion(raw: &str) -> MotionCommand {
        match GcodeLine::parse(raw, 1).unwrap() {
            GcodeLine::Motion(cmd) => cmd,
            other => panic!("expected motion, got {:?}", other),
        }
    }

    #[test]
    fn test_motion_prefix_classification() {
        assert!(is_motion_line("G0 X1"));
        assert!(is_motion_line("G1 X1 Y2"));
        assert!(is_motion_line("G01 X1"));
        assert!(!is_motion_line("g1 X1"));
        assert!(!is_motion_line(" G1 X1"));
        assert!(!is_motion_line("M104 S200 ; G1 in a comment"));
        assert!(!is_motion_line("; G1 X10"));
        assert!(!is_motion_line(""));
    }

    #[test]
    fn test_parse_extracts_axes_and_keeps_words() {
        let cmd = motion("G1 X10.5 Y-3 F1500 E0.2\n");
        assert_eq!(cmd.kind(), MotionKind::Linear);
        assert_eq!(cmd.x(), Some(10.5));
        assert_eq!(cmd.y(), Some(-3.0));
        assert_eq!(cmd.tokens().len(), 5);
        assert_eq!(cmd.tokens()[0], Token::Word("G1".to_string()));
        assert_eq!(cmd.tokens()[3], Token::Word("F1500".to_string()));
        assert_eq!(cmd.ending(), LineEnding::Lf);
    }

    #[test]
    fn test_rapid_kind() {
        let cmd = motion("G0 X1");
        assert_eq!(cmd.kind(), MotionKind::Rapid);
        assert_eq!(cmd.y(), None);
        assert_eq!(cmd.ending(), LineEnding::None);
    }

    #[test]
    fn test_malformed_coordinate_is_error() {
        let err = GcodeLine::parse("G1 Xabc Y2\n", 7).unwrap_err();
        assert_eq!(
            err,
            GcodeError::MalformedCoordinate {
                line_number: 7,
                token: "Xabc".to_string()
            }
        );
    }

    #[test]
    fn test_bare_axis_letter_is_error() {
        assert!(GcodeLine::parse("G1 X Y2", 1).is_err());
    }

    #[test]
    fn test_passthrough_is_verbatim() {
        let raw = "  ; layer 2 X=5  \r\n";
        assert_eq!(
            GcodeLine::parse(raw, 1).unwrap(),
            GcodeLine::Passthrough(raw.to_string())
        );
        // Non-motion lines are never parsed numerically
        assert!(GcodeLine::parse("M117 Xfoo\n", 1).is_ok());
    }

    #[test]
    fn test_translated_only_touches_coordinates() {
        let cmd = motion("G1 X10 Y20 Z0.3 F1500").translated(80.0, -5.0);
        assert_eq!(cmd.to_string(), "G1 X90.000 Y15.000 Z0.3 F1500");
    }

    #[test]
    fn test_write_line_keeps_crlf() {
        let mut out = String::new();
        motion("G1 X1\r\n").write_line(&mut out);
        assert_eq!(out, "G1 X1.000\r\n");
    }

    #[test]
    fn test_write_line_terminates_last_line() {
        let mut out = String::new();
        motion("G1 Y2").write_line(&mut out);
        assert_eq!(out, "G1 Y2.000\n");
    }

    #[test]
    fn test_whitespace_is_normalised_on_motion_lines() {
        let cmd = motion("G1   X1\tY2   F300  \n");
        assert_eq!(cmd.to_string(), "G1 X1.000 Y2.000 F300");
    }

    #[test]
    fn test_document_parse_and_render() {
        let text = "; header\nG1 X1 Y2\n\nM84";
        let doc = Document::parse(text).unwrap();
        assert_eq!(doc.len(), 4);
        assert_eq!(doc.motion_count(), 1);
        assert_eq!(doc.to_text(), "; header\nG1 X1.000 Y2.000\n\nM84");
    }

    #[test]
    fn test_document_reports_line_number() {
        let err = Document::parse("G1 X1\nG1 X2\nG1 Yoops\n").unwrap_err();
        assert!(matches!(
            err,
            GcodeError::MalformedCoordinate { line_number: 3, .. }
        ));
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::parse("").unwrap();
        assert!(doc.is_empty());
        assert_eq!(doc.to_text(), "");
    }
}
