use std::path::{Path, PathBuf};

mod error;
mod result;

pub mod command;
pub mod config;
pub mod image_store;
pub mod ocr;
pub mod overlay;
pub mod transcript;
pub mod viewer;

use image::RgbImage;
use tracing::{info, instrument, warn};

pub use config::Config;
pub use error::{Error, Result};
pub use result::*;

use image_store::ImageStore;
use ocr::{OcrEngine, TesseractEngine};
use overlay::OverlaySet;
use transcript::Transcript;
use viewer::Viewer;

pub struct TextPickBuilder {
    config: Config,
    engine: Option<Box<dyn OcrEngine>>,
}

impl TextPickBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.config.lang = lang.into();
        self
    }

    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.config.viewport = (width, height);
        self
    }

    pub fn dpi(mut self, dpi: Option<i32>) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn psm(mut self, psm: Option<i32>) -> Self {
        self.config.psm = psm;
        self
    }

    pub fn oem(mut self, oem: Option<i32>) -> Self {
        self.config.oem = oem;
        self
    }

    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.config.extension = extension.into();
        self
    }

    /// Uses `engine` instead of tesseract.
    pub fn engine(mut self, engine: impl OcrEngine + 'static) -> Self {
        self.engine = Some(Box::new(engine));
        self
    }

    #[instrument(skip(self))]
    pub fn build(self) -> Result<TextPick> {
        self.config.validate()?;
        let Config {
            lang,
            dpi,
            psm,
            oem,
            viewport,
            extension,
        } = self.config;
        let engine: Box<dyn OcrEngine> = match self.engine {
            Some(engine) => engine,
            None => Box::new(TesseractEngine::new(lang).dpi(dpi).psm(psm).oem(oem)),
        };
        info!(engine = engine.name(), "textpick ready");
        Ok(TextPick {
            store: ImageStore::new(),
            overlay: OverlaySet::new(),
            viewer: Viewer::new(viewport.0, viewport.1),
            transcript: Transcript::new(),
            engine,
            extension,
        })
    }
}

impl Default for TextPickBuilder {
    fn default() -> Self {
        Self {
            config: Config::default(),
            engine: None,
        }
    }
}

/// Snapshot of the application state, for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub dimensions: Option<(u32, u32)>,
    pub source: Option<PathBuf>,
    pub rotation: i32,
    pub words: usize,
    pub zoom_step: i32,
    pub scale: f64,
    pub transcript_len: usize,
}

/// Everything the user manipulates: the image, its word boxes, the view and
/// the transcript. Every handler takes it by `&mut`.
pub struct TextPick {
    store: ImageStore,
    overlay: OverlaySet,
    viewer: Viewer,
    transcript: Transcript,
    engine: Box<dyn OcrEngine>,
    extension: String,
}

impl TextPick {
    #[instrument(skip(self))]
    pub fn load(&mut self, path: &Path) -> Result<()> {
        self.store.load(path)?;
        self.geometry_changed();
        info!(dimensions = ?self.store.dimensions(), "loaded {}", path.display());
        Ok(())
    }

    /// Shows an already-decoded image.
    pub fn load_image(&mut self, image: RgbImage) {
        self.store.set_image(image);
        self.geometry_changed();
    }

    #[instrument(skip(self))]
    pub fn rotate(&mut self, direction: RotateDirection) -> Result<()> {
        self.store.rotate(direction)?;
        self.geometry_changed();
        Ok(())
    }

    pub fn rotate_left(&mut self) -> Result<()> {
        self.rotate(RotateDirection::CounterClockwise)
    }

    pub fn rotate_right(&mut self) -> Result<()> {
        self.rotate(RotateDirection::Clockwise)
    }

    /// Returns to the image as loaded.
    pub fn reset_image(&mut self) -> Result<()> {
        self.store.reset()?;
        self.geometry_changed();
        Ok(())
    }

    // Box coordinates are only valid for the exact buffer they were read from.
    fn geometry_changed(&mut self) {
        self.overlay.clear();
        self.viewer.set_image(self.store.dimensions());
    }

    /// Runs OCR over the whole image and replaces the overlay. Returns the
    /// number of words found.
    #[instrument(skip(self), fields(engine = self.engine.name()))]
    pub fn scan(&mut self) -> Result<usize> {
        self.overlay.clear();
        let image = self.store.dynamic().ok_or(Error::NoImage)?;
        let words = self.engine.scan(&image).inspect_err(|err| {
            warn!("scan failed: {err}");
        })?;
        info!(words = words.len(), "scan finished");
        self.overlay.rebuild(words);
        Ok(self.overlay.len())
    }

    /// Handles a click in viewport coordinates. Appends and returns the text of
    /// the box under the pointer, if any.
    pub fn click(&mut self, point: ViewportPoint) -> Option<String> {
        let point = self.viewer.map_to_image(point)?;
        self.click_image(point)
    }

    pub fn click_image(&mut self, point: ImagePoint) -> Option<String> {
        let text = self.overlay.hit_test(point)?.text.clone();
        self.transcript.append_word(&text);
        log::debug!("picked {text:?} at ({}, {})", point.x, point.y);
        Some(text)
    }

    /// The record-separator hotkey.
    pub fn separator(&mut self) -> Separator {
        self.transcript.insert_separator()
    }

    pub fn zoom(&mut self, delta: i32) {
        self.viewer.zoom(delta);
    }

    pub fn zoom_at(&mut self, delta: i32, anchor: ViewportPoint) {
        self.viewer.zoom_at(delta, anchor);
    }

    pub fn pan(&mut self, dx: f64, dy: f64) -> bool {
        self.viewer.pan(dx, dy)
    }

    pub fn resize_viewport(&mut self, width: u32, height: u32) {
        self.viewer.resize(width, height);
    }

    pub fn render(&self) -> RgbImage {
        self.viewer.render(self.store.image(), &self.overlay)
    }

    /// Renders the current frame and writes it to `path`.
    pub fn render_to(&self, path: &Path) -> Result<()> {
        self.render().save(path).map_err(|source| Error::Render {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<PathBuf> {
        self.transcript.export(path, &self.extension)
    }

    pub fn status(&self) -> Status {
        Status {
            dimensions: self.store.dimensions(),
            source: self.store.source().map(Path::to_path_buf),
            rotation: self.store.rotation(),
            words: self.overlay.len(),
            zoom_step: self.viewer.zoom_step(),
            scale: self.viewer.scale(),
            transcript_len: self.transcript.len(),
        }
    }

    pub fn image(&self) -> Option<&RgbImage> {
        self.store.image()
    }

    pub fn overlay(&self) -> &OverlaySet {
        &self.overlay
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }
}
