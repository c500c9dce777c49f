use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbImage};
use tracing::{debug, instrument};

use crate::{Error, Result, RotateDirection};

/// Holds the loaded raster and how far it has been turned since loading.
#[derive(Debug, Default)]
pub struct ImageStore {
    original: Option<RgbImage>,
    image: Option<RgbImage>,
    source: Option<PathBuf>,
    rotation: i32,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `path` into an 8-bit RGB buffer. Nothing changes on failure.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let decoded = image::open(path).map_err(|source| Error::Load {
            path: path.to_path_buf(),
            source,
        })?;
        self.set_image(decoded.to_rgb8());
        self.source = Some(path.to_path_buf());
        debug!(width = self.width(), height = self.height(), "image loaded");
        Ok(())
    }

    /// Installs an already-decoded buffer, as if it had been loaded from disk.
    pub fn set_image(&mut self, image: RgbImage) {
        self.original = Some(image.clone());
        self.image = Some(image);
        self.source = None;
        self.rotation = 0;
    }

    #[instrument(level = "debug", skip(self))]
    pub fn rotate(&mut self, direction: RotateDirection) -> Result<()> {
        let image = self.image.as_ref().ok_or(Error::NoImage)?;
        let rotated = match direction {
            RotateDirection::Clockwise => image::imageops::rotate90(image),
            RotateDirection::CounterClockwise => image::imageops::rotate270(image),
        };
        self.image = Some(rotated);
        self.rotation += direction.degrees();
        log::trace!("Accumulated rotation is now {}", self.rotation);
        Ok(())
    }

    /// Restores the buffer exactly as it was loaded.
    pub fn reset(&mut self) -> Result<()> {
        let original = self.original.as_ref().ok_or(Error::NoImage)?;
        self.image = Some(original.clone());
        self.rotation = 0;
        Ok(())
    }

    pub fn image(&self) -> Option<&RgbImage> {
        self.image.as_ref()
    }

    /// The current buffer wrapped for consumers that take any pixel layout.
    pub fn dynamic(&self) -> Option<DynamicImage> {
        self.image.clone().map(DynamicImage::ImageRgb8)
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.image.as_ref().map(|it| it.dimensions())
    }

    fn width(&self) -> u32 {
        self.dimensions().map(|(w, _)| w).unwrap_or(0)
    }

    fn height(&self) -> u32 {
        self.dimensions().map(|(_, h)| h).unwrap_or(0)
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Accumulated rotation in degrees, normalised to `0..360`.
    pub fn rotation(&self) -> i32 {
        self.rotation.rem_euclid(360)
    }

    pub fn rotation_raw(&self) -> i32 {
        self.rotation
    }
}

#[cfg(test)]
mod tests {
    use image::Rgb;

    use super::*;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, (x * y) as u8]))
    }

    #[test]
    fn four_turns_restore_buffer() {
        for direction in [RotateDirection::Clockwise, RotateDirection::CounterClockwise] {
            let mut store = ImageStore::new();
            let image = gradient(7, 3);
            store.set_image(image.clone());
            for _ in 0..4 {
                store.rotate(direction).unwrap();
            }
            assert_eq!(store.image(), Some(&image));
            assert_eq!(store.rotation(), 0);
            assert_eq!(store.rotation_raw().abs(), 360);
        }
    }

    #[test]
    fn rotation_swaps_dimensions() {
        let mut store = ImageStore::new();
        store.set_image(gradient(7, 3));
        store.rotate(RotateDirection::Clockwise).unwrap();
        assert_eq!(store.dimensions(), Some((3, 7)));
        assert_eq!(store.rotation(), 90);
        store.rotate(RotateDirection::CounterClockwise).unwrap();
        store.rotate(RotateDirection::CounterClockwise).unwrap();
        assert_eq!(store.rotation(), 270);
        assert_eq!(store.rotation_raw(), -90);
    }

    #[test]
    fn clockwise_moves_top_left_to_top_right() {
        let mut store = ImageStore::new();
        let mut image = RgbImage::new(4, 2);
        image.put_pixel(0, 0, Rgb([255, 0, 0]));
        store.set_image(image);
        store.rotate(RotateDirection::Clockwise).unwrap();
        let rotated = store.image().unwrap();
        assert_eq!(rotated.get_pixel(1, 0), &Rgb([255, 0, 0]));
    }

    #[test]
    fn rotate_without_image_fails() {
        let mut store = ImageStore::new();
        assert!(matches!(
            store.rotate(RotateDirection::Clockwise),
            Err(Error::NoImage)
        ));
    }

    #[test]
    fn failed_load_keeps_previous_image() {
        let mut store = ImageStore::new();
        let image = gradient(5, 5);
        store.set_image(image.clone());
        store.rotate(RotateDirection::Clockwise).unwrap();

        let err = store
            .load(Path::new("definitely/not/here.png"))
            .unwrap_err();
        assert!(matches!(err, Error::Load { .. }));
        assert_eq!(store.rotation(), 90);
        assert_eq!(store.dimensions(), Some((5, 5)));
    }

    #[test]
    fn reset_undoes_rotation() {
        let mut store = ImageStore::new();
        let image = gradient(6, 2);
        store.set_image(image.clone());
        store.rotate(RotateDirection::Clockwise).unwrap();
        store.reset().unwrap();
        assert_eq!(store.image(), Some(&image));
        assert_eq!(store.rotation(), 0);
    }
}
