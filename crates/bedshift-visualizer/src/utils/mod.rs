//! File-system helpers shared by the batch pipeline and the interactive session

pub mod file_io;

pub use file_io::{
    fixed_file_name, is_gcode_file, list_gcode_files, move_to_processed, read_document,
    sanitize_stem, timestamp_now, translate_file, NameStyle, PROCESSED_DIR_NAME,
};
