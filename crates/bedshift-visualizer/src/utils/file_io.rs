//! File I/O
//!
//! Reading programs from disk, writing translated copies, and the naming
//! scheme for `-FIXED_` outputs. Directory scans only look at the top level.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use bedshift_core::constants::OFFSET_DECIMALS;
use bedshift_core::{Offset, Result};
use tracing::debug;

use crate::gcode::transform::log_summary;
use crate::gcode::{Document, OffsetTransform, TransformStats};

/// Sub-directory of the input directory that receives processed sources
pub const PROCESSED_DIR_NAME: &str = "processed";

/// Extension recognised as a G-code program
const GCODE_EXTENSION: &str = "gcode";

/// Timestamp format used in output names
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// How an output name is derived from its source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameStyle {
    /// Stem is sanitised, timestamp optional
    Batch,
    /// Stem kept as-is
    Interactive,
}

/// Read and parse a program
pub fn read_document(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let document = Document::parse(&text)?;
    debug!(
        "Read {} ({} lines, {} motion commands)",
        path.display(),
        document.len(),
        document.motion_count()
    );
    Ok(document)
}

/// Translate `input` into `output` by `offset`.
///
/// The whole input is parsed before `output` is created, so a malformed
/// coordinate never leaves a partial file behind.
pub fn translate_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    offset: Offset,
) -> Result<TransformStats> {
    let document = read_document(input)?;
    let engine = OffsetTransform::new(offset);
    let stats = OffsetTransform::stats_for(&document);
    let text = engine.transform(&document).to_text();

    let mut writer = BufWriter::new(File::create(output.as_ref())?);
    writer.write_all(text.as_bytes())?;
    writer.flush()?;

    log_summary(offset, &stats);
    Ok(stats)
}

/// Spaces become underscores, parentheses are dropped
pub fn sanitize_stem(stem: &str) -> String {
    stem.chars()
        .filter(|c| !matches!(c, '(' | ')'))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

/// Output file name for `source` shifted by `offset`.
///
/// `{stem}-FIXED_X{dx}_Y{dy}[_{timestamp}]{.ext}` with offsets at one decimal.
pub fn fixed_file_name(
    source: &Path,
    offset: Offset,
    timestamp: Option<&str>,
    style: NameStyle,
) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = match style {
        NameStyle::Batch => sanitize_stem(&stem),
        NameStyle::Interactive => stem,
    };
    let ext = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let suffix = timestamp.map(|t| format!("_{t}")).unwrap_or_default();

    format!(
        "{stem}-FIXED_X{dx:.prec$}_Y{dy:.prec$}{suffix}{ext}",
        dx = offset.dx,
        dy = offset.dy,
        prec = OFFSET_DECIMALS
    )
}

/// Local time formatted for output names
pub fn timestamp_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Regular file with the exact, lowercase `.gcode` extension
pub fn is_gcode_file(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == GCODE_EXTENSION)
}

/// `*.gcode` files directly under `dir`, sorted by name
pub fn list_gcode_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        if is_gcode_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Move `file` into `<input_dir>/processed/`, creating it when needed
pub fn move_to_processed(input_dir: impl AsRef<Path>, file: &Path) -> Result<PathBuf> {
    let processed = input_dir.as_ref().join(PROCESSED_DIR_NAME);
    fs::create_dir_all(&processed)?;
    let target = match file.file_name() {
        Some(name) => processed.join(name),
        None => {
            return Err(bedshift_core::Error::other(format!(
                "Not a file path: {}",
                file.display()
            )))
        }
    };
    fs::rename(file, &target)?;
    debug!("Moved {} to {}", file.display(), target.display());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_stem() {
        assert_eq!(sanitize_stem("my part (v2) final"), "my_part_v2_final");
        assert_eq!(sanitize_stem("plain"), "plain");
    }

    #[test]
    fn test_batch_name_without_timestamp() {
        let name = fixed_file_name(
            Path::new("fixme/Benchy (PLA).gcode"),
            Offset::new(80.0, -12.34),
            None,
            NameStyle::Batch,
        );
        assert_eq!(name, "Benchy_PLA-FIXED_X80.0_Y-12.3.gcode");
    }

    #[test]
    fn test_interactive_name_keeps_stem() {
        let name = fixed_file_name(
            Path::new("a b.gcode"),
            Offset::new(1.26, 0.0),
            Some("20240101_120000"),
            NameStyle::Interactive,
        );
        assert_eq!(name, "a b-FIXED_X1.3_Y0.0_20240101_120000.gcode");
    }

    #[test]
    fn test_timestamp_shape() {
        let ts = timestamp_now();
        assert_eq!(ts.len(), 15);
        assert_eq!(&ts[8..9], "_");
    }

    #[test]
    fn test_translate_file_writes_output() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.gcode");
        let output = dir.path().join("out.gcode");
        fs::write(&input, "G1 X10.000 Y20.000 F1500\nM84\n").unwrap();

        let stats = translate_file(&input, &output, Offset::new(80.0, 80.0)).unwrap();
        assert_eq!(stats.motion_commands, 1);
        assert_eq!(stats.coordinates_shifted, 2);

        let text = fs::read_to_string(&output).unwrap();
        assert_eq!(
            text,
            "; Translated with offsets: X=80.0mm, Y=80.0mm\nG1 X90.000 Y90.000 F1500\nM84\n"
        );
    }

    #[test]
    fn test_malformed_input_creates_no_output() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("bad.gcode");
        let output = dir.path().join("out.gcode");
        fs::write(&input, "G1 X1\nG1 Xabc\n").unwrap();

        let err = translate_file(&input, &output, Offset::ZERO).unwrap_err();
        assert!(err.is_gcode_error());
        assert!(!output.exists());
    }

    #[test]
    fn test_missing_input_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = translate_file(
            dir.path().join("nope.gcode"),
            dir.path().join("out.gcode"),
            Offset::ZERO,
        )
        .unwrap_err();
        assert!(err.is_io_error());
    }

    #[test]
    fn test_list_and_move() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.gcode"), "G1 X1\n").unwrap();
        fs::write(dir.path().join("a.gcode"), "G1 X1\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::write(dir.path().join("upper.GCODE"), "G1 X1\n").unwrap();
        fs::create_dir(dir.path().join("sub.gcode")).unwrap();

        let files = list_gcode_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.gcode", "b.gcode"]);

        let moved = move_to_processed(dir.path(), &files[0]).unwrap();
        assert!(moved.exists());
        assert!(!files[0].exists());
        assert_eq!(moved.parent().unwrap(), dir.path().join(PROCESSED_DIR_NAME));
    }
}
