//! OCR backends.
//!
//! [`OcrEngine`] is the seam between the application state and whatever does
//! the recognition. [`TesseractEngine`] shells out to the `tesseract`
//! executable and asks for word-level TSV output.

use std::collections::HashMap;

use image::{DynamicImage, ImageFormat};
use rusty_tesseract::Args;
use tracing::{debug, instrument};

use crate::{BoundingBox, Error, RecognizedWord, Result};

pub trait OcrEngine {
    fn name(&self) -> &str;

    /// Recognizes every word on `image`, in the order the engine reports them.
    fn scan(&self, image: &DynamicImage) -> Result<Vec<RecognizedWord>>;
}

/// One row of word-level engine output. Rows for pages, blocks, paragraphs
/// and lines carry `word_num == 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct WordRow {
    pub word_num: i32,
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
    pub conf: f32,
    pub text: String,
}

impl From<&rusty_tesseract::Data> for WordRow {
    fn from(data: &rusty_tesseract::Data) -> Self {
        Self {
            word_num: data.word_num,
            left: data.left,
            top: data.top,
            width: data.width,
            height: data.height,
            conf: data.conf,
            text: data.text.clone(),
        }
    }
}

/// Keeps actual words with non-blank text, trimmed, in input order.
pub fn words_from_rows<'a>(rows: impl IntoIterator<Item = &'a WordRow>) -> Vec<RecognizedWord> {
    rows.into_iter()
        .filter(|row| row.word_num > 0)
        .filter_map(|row| {
            let text = row.text.trim();
            if text.is_empty() {
                return None;
            }
            Some(RecognizedWord {
                bounds: BoundingBox::new(
                    row.left.max(0) as u32,
                    row.top.max(0) as u32,
                    row.width.max(0) as u32,
                    row.height.max(0) as u32,
                ),
                text: text.to_owned(),
                confidence: row.conf,
            })
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct TesseractEngine {
    lang: String,
    dpi: Option<i32>,
    psm: Option<i32>,
    oem: Option<i32>,
}

impl TesseractEngine {
    pub fn new(lang: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            dpi: None,
            psm: None,
            oem: None,
        }
    }

    pub fn dpi(mut self, dpi: Option<i32>) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn psm(mut self, psm: Option<i32>) -> Self {
        self.psm = psm;
        self
    }

    pub fn oem(mut self, oem: Option<i32>) -> Self {
        self.oem = oem;
        self
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    fn args(&self) -> Args {
        Args {
            lang: self.lang.clone(),
            config_variables: HashMap::new(),
            dpi: self.dpi,
            psm: self.psm,
            oem: self.oem,
        }
    }

    fn failure(&self, message: impl ToString) -> Error {
        Error::Ocr {
            engine: self.name().to_owned(),
            message: message.to_string(),
        }
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_LANG)
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    #[instrument(skip(self, image), fields(lang = %self.lang))]
    fn scan(&self, image: &DynamicImage) -> Result<Vec<RecognizedWord>> {
        // Handing tesseract a file keeps us independent of its image crate version.
        let file = tempfile::Builder::new()
            .prefix("textpick-")
            .suffix(".png")
            .tempfile()
            .map_err(|err| self.failure(err))?;
        image
            .save_with_format(file.path(), ImageFormat::Png)
            .map_err(|err| self.failure(err))?;
        let input = rusty_tesseract::Image::from_path(file.path()).map_err(|err| self.failure(err))?;

        let output =
            rusty_tesseract::image_to_data(&input, &self.args()).map_err(|err| self.failure(err))?;
        let rows = output.data.iter().map(WordRow::from).collect::<Vec<_>>();
        let words = words_from_rows(&rows);
        debug!(rows = rows.len(), words = words.len(), "tesseract finished");
        Ok(words)
    }
}
