//! Pan/zoom viewport over the current image.
//!
//! The view transform maps image pixels to viewport pixels as
//! `viewport = image * scale + offset`. It is kept as a homogeneous 3x3
//! matrix so clicks can be mapped back through its inverse.

use image::{Rgb, RgbImage};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};
use nalgebra::{Matrix3, Point2, Vector2};
use tracing::{debug, instrument};

use crate::{overlay::OverlaySet, ImagePoint, ViewportPoint};

pub const ZOOM_IN_FACTOR: f64 = 1.25;
pub const ZOOM_OUT_FACTOR: f64 = 0.8;
pub const BACKGROUND: Rgb<u8> = Rgb([30, 30, 30]);
pub const BOX_OUTLINE: Rgb<u8> = Rgb([255, 0, 0]);

#[derive(Debug, Clone)]
pub struct Viewer {
    viewport: (u32, u32),
    image: Option<(u32, u32)>,
    zoom: i32,
    baseline: f64,
    scale: f64,
    offset: Vector2<f64>,
}

impl Viewer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            viewport: (width.max(1), height.max(1)),
            image: None,
            zoom: 0,
            baseline: 1.0,
            scale: 1.0,
            offset: Vector2::zeros(),
        }
    }

    /// Shows an image of the given dimensions (or nothing) at the fit baseline.
    #[instrument(level = "debug", skip(self))]
    pub fn set_image(&mut self, dimensions: Option<(u32, u32)>) {
        self.image = dimensions;
        self.fit_in_view();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = (width.max(1), height.max(1));
        self.fit_in_view();
    }

    fn fit_in_view(&mut self) {
        self.zoom = 0;
        self.baseline = match self.image {
            Some((w, h)) if w > 0 && h > 0 => {
                let (vw, vh) = self.viewport_f64();
                (vw / w as f64).min(vh / h as f64)
            }
            _ => 1.0,
        };
        self.scale = self.baseline;
        self.offset = Vector2::zeros();
        self.clamp_offset();
        debug!(scale = self.scale, "fit image to viewport");
    }

    /// Zooms around the viewport centre.
    pub fn zoom(&mut self, delta: i32) {
        let (vw, vh) = self.viewport_f64();
        self.zoom_at(delta, ViewportPoint::new(vw / 2.0, vh / 2.0));
    }

    /// Zooms one step in (`delta > 0`) or out (`delta < 0`), keeping the image
    /// point under `anchor` in place. Never goes below the fit baseline.
    pub fn zoom_at(&mut self, delta: i32, anchor: ViewportPoint) {
        if self.image.is_none() || delta == 0 {
            return;
        }
        self.zoom += delta.signum();
        if self.zoom < 0 {
            self.zoom = 0;
            return;
        }
        if self.zoom == 0 {
            self.fit_in_view();
            return;
        }
        let factor = if delta > 0 {
            ZOOM_IN_FACTOR
        } else {
            ZOOM_OUT_FACTOR
        };
        let anchor = Vector2::new(anchor.x, anchor.y);
        let under_anchor = (anchor - self.offset) / self.scale;
        self.scale *= factor;
        self.offset = anchor - under_anchor * self.scale;
        self.clamp_offset();
        log::trace!("zoom step {} -> scale {}", self.zoom, self.scale);
    }

    /// Drags the view by a viewport-space delta. Returns `false` when there
    /// is no image to drag.
    pub fn pan(&mut self, dx: f64, dy: f64) -> bool {
        if !self.drag_enabled() {
            return false;
        }
        self.offset += Vector2::new(dx, dy);
        self.clamp_offset();
        true
    }

    // Along an axis where the scaled image fits it stays centred, otherwise
    // it may scroll until its edge meets the viewport edge.
    fn clamp_offset(&mut self) {
        let Some((w, h)) = self.image else {
            self.offset = Vector2::zeros();
            return;
        };
        let (vw, vh) = self.viewport_f64();
        let clamp_axis = |offset: f64, content: f64, view: f64| {
            if content <= view {
                (view - content) / 2.0
            } else {
                offset.clamp(view - content, 0.0)
            }
        };
        self.offset = Vector2::new(
            clamp_axis(self.offset.x, w as f64 * self.scale, vw),
            clamp_axis(self.offset.y, h as f64 * self.scale, vh),
        );
    }

    pub fn transform(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.scale,
            0.0,
            self.offset.x,
            0.0,
            self.scale,
            self.offset.y,
            0.0,
            0.0,
            1.0,
        )
    }

    /// Maps a viewport point into image pixels. `None` over the background.
    pub fn map_to_image(&self, point: ViewportPoint) -> Option<ImagePoint> {
        let (w, h) = self.image?;
        let inverse = self.transform().try_inverse()?;
        let mapped = inverse.transform_point(&Point2::new(point.x, point.y));
        let inside = (0.0..w as f64).contains(&mapped.x) && (0.0..h as f64).contains(&mapped.y);
        inside.then(|| ImagePoint::new(mapped.x, mapped.y))
    }

    pub fn map_to_viewport(&self, point: ImagePoint) -> ViewportPoint {
        let mapped = self.transform().transform_point(&Point2::new(point.x, point.y));
        ViewportPoint::new(mapped.x, mapped.y)
    }

    /// Draws `image` and the overlay boxes into a viewport-sized frame.
    #[instrument(level = "debug", skip_all)]
    pub fn render(&self, image: Option<&RgbImage>, overlay: &OverlaySet) -> RgbImage {
        let (vw, vh) = self.viewport;
        let mut frame = RgbImage::from_pixel(vw, vh, BACKGROUND);
        let Some(image) = image else {
            return frame;
        };
        let Some(inverse) = self.transform().try_inverse() else {
            return frame;
        };

        for (x, y, pixel) in frame.enumerate_pixels_mut() {
            let source = inverse.transform_point(&Point2::new(x as f64 + 0.5, y as f64 + 0.5));
            if source.x < 0.0 || source.y < 0.0 {
                continue;
            }
            let (sx, sy) = (source.x as u32, source.y as u32);
            if sx < image.width() && sy < image.height() {
                *pixel = *image.get_pixel(sx, sy);
            }
        }

        for word in overlay.iter() {
            let bounds = word.bounds;
            let top_left = self.map_to_viewport(ImagePoint::new(bounds.x as f64, bounds.y as f64));
            let width = (bounds.width as f64 * self.scale).round().max(1.0) as u32;
            let height = (bounds.height as f64 * self.scale).round().max(1.0) as u32;
            let rect = Rect::at(top_left.x.round() as i32, top_left.y.round() as i32)
                .of_size(width, height);
            draw_hollow_rect_mut(&mut frame, rect, BOX_OUTLINE);
        }
        frame
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn drag_enabled(&self) -> bool {
        self.has_image()
    }

    pub fn zoom_step(&self) -> i32 {
        self.zoom
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn baseline_scale(&self) -> f64 {
        self.baseline
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    fn viewport_f64(&self) -> (f64, f64) {
        (self.viewport.0 as f64, self.viewport.1 as f64)
    }
}
