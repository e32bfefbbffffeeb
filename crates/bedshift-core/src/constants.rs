//! Shared numeric constants.

/// Default bed width in millimeters.
pub const DEFAULT_BED_WIDTH_MM: f64 = 220.0;

/// Default bed height in millimeters.
pub const DEFAULT_BED_HEIGHT_MM: f64 = 220.0;

/// Largest bed dimension accepted, in millimeters.
pub const MAX_BED_SIZE_MM: f64 = 10_000.0;

/// Fraction of the rendering surface used by the bed after `fit()` (10% margin).
pub const FIT_MARGIN: f64 = 0.9;

/// Multiplicative zoom step applied per scroll notch.
pub const ZOOM_STEP: f64 = 1.2;

/// Decimal places written for transformed X/Y coordinates.
pub const COORDINATE_DECIMALS: usize = 3;

/// Decimal places used when reporting an offset (header comment, file names).
pub const OFFSET_DECIMALS: usize = 1;

/// Grid line spacing on the rendered bed, in millimeters.
pub const GRID_STEP_MM: f64 = 10.0;

/// Spacing of grid labels on the rendered bed, in millimeters.
pub const GRID_LABEL_STEP_MM: f64 = 50.0;

/// Default Moonraker API port.
pub const DEFAULT_MOONRAKER_PORT: u16 = 7125;
