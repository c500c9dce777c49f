use crate::{ImagePoint, RecognizedWord};

/// Word boxes belonging to the image currently on screen.
///
/// Only ever replaced wholesale or emptied, so a hit test can never match a
/// box from before the last geometry change.
#[derive(Debug, Clone, Default)]
pub struct OverlaySet {
    words: Vec<RecognizedWord>,
}

impl OverlaySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rebuild(&mut self, words: Vec<RecognizedWord>) {
        self.words = words;
    }

    pub fn clear(&mut self) {
        self.words.clear();
    }

    /// First box in storage order containing `point`.
    pub fn hit_test(&self, point: ImagePoint) -> Option<&RecognizedWord> {
        self.words.iter().find(|word| word.bounds.contains(point))
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecognizedWord> {
        self.words.iter()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
