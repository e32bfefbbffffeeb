//! Interactive session
//!
//! Holds one loaded program together with its bed preview. Drag and scroll
//! gestures move the toolpath over the bed; [`InteractiveSession::commit`]
//! writes a copy shifted by the dragged distance.

use bedshift_core::{Error, GcodeError, Offset, Point, Result};
use bedshift_visualizer::utils::{fixed_file_name, read_document, translate_file, NameStyle};
use bedshift_visualizer::{
    build_frame, BedSize, Frame, InteractionController, PathModel, ViewportMapper,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A loaded program and the viewport it is shown in
#[derive(Debug)]
pub struct InteractiveSession {
    current_file: PathBuf,
    path: Option<PathModel>,
    mapper: ViewportMapper,
    controller: InteractionController,
}

impl InteractiveSession {
    /// Load `file` and fit the bed to a `surface` of `(width, height)` pixels.
    ///
    /// A program without motion commands opens with no path and the viewport
    /// is left unfitted. Unreadable or malformed programs are errors.
    pub fn open(file: impl AsRef<Path>, bed_size: BedSize, surface: (f64, f64)) -> Result<Self> {
        let mut session = Self {
            current_file: file.as_ref().to_path_buf(),
            path: None,
            mapper: ViewportMapper::new(bed_size, surface.0, surface.1),
            controller: InteractionController::new(),
        };
        session.reload()?;
        if session.path.is_some() {
            session.mapper.fit();
        }
        Ok(session)
    }

    fn reload(&mut self) -> Result<()> {
        let document = read_document(&self.current_file)?;
        self.path = match PathModel::load(&document) {
            Ok(model) => Some(model),
            Err(GcodeError::EmptyPath) => {
                warn!("{} contains no motion commands", self.current_file.display());
                None
            }
            Err(e) => return Err(Error::from(e)),
        };
        info!("Loaded {}: {}", self.current_file.display(), self.status());
        Ok(())
    }

    pub fn current_file(&self) -> &Path {
        &self.current_file
    }

    pub fn path(&self) -> Option<&PathModel> {
        self.path.as_ref()
    }

    pub fn mapper(&self) -> &ViewportMapper {
        &self.mapper
    }

    /// Short description of what is loaded
    pub fn status(&self) -> String {
        match &self.path {
            Some(model) => format!("{} segments", model.len()),
            None => "no path".to_string(),
        }
    }

    /// Register a listener for offset changes caused by gestures
    pub fn on_offset_changed(&mut self, callback: impl FnMut(Offset) + 'static) {
        self.controller.on_offset_changed(callback);
    }

    pub fn press(&mut self, pixel: Point) {
        self.controller.press(pixel);
    }

    pub fn move_to(&mut self, pixel: Point) -> Option<Offset> {
        self.controller.move_to(&mut self.mapper, pixel)
    }

    pub fn release(&mut self) {
        self.controller.release();
    }

    pub fn scroll(&mut self, direction: i32, pixel: Point) -> Offset {
        self.controller.scroll(&mut self.mapper, direction, pixel)
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.mapper.set_surface_size(width, height);
    }

    /// Offset shown to the user, the negated pan
    pub fn offset(&self) -> Offset {
        self.mapper.current_offset()
    }

    pub fn frame(&self) -> Frame {
        build_frame(&self.mapper, self.path.as_ref())
    }

    pub fn render_svg(&self) -> String {
        self.frame().to_svg()
    }

    /// Write the current file shifted by the dragged distance into
    /// `output_dir` and continue with the written file.
    ///
    /// The name records [`offset`](Self::offset); the content is moved by its
    /// negation so it lands where it was dragged. Afterwards the pan is reset,
    /// which leaves the toolpath at the same place on screen.
    pub fn commit(&mut self, output_dir: impl AsRef<Path>, timestamp: &str) -> Result<PathBuf> {
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)?;

        let offset = self.offset();
        let name = fixed_file_name(
            &self.current_file,
            offset,
            Some(timestamp),
            NameStyle::Interactive,
        );
        let output = output_dir.join(name);

        info!("Fixing G-code with offset: {}", offset);
        translate_file(&self.current_file, &output, offset.inverse())?;
        info!("Fixed G-code saved as: {}", output.display());

        self.current_file = output.clone();
        self.reload()?;
        self.mapper.reset_pan();
        Ok(output)
    }
}
