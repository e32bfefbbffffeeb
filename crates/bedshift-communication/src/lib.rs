//! # Bedshift Communication
//!
//! Delivery of translated programs to a print host. Moonraker is the only
//! real host; a no-op host stands in when uploading is disabled.

pub mod host;

pub use host::{
    deliver, submit_for_upload, url_friendly_name,
    moonraker::MoonrakerClient,
    HostInfo, NoOpPrintHost, PrintHost,
};
