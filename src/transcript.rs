use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{info, instrument};

use crate::{Error, Result, Separator};

/// The user's editable text, built from clicked words and manual input.
#[derive(Debug, Clone)]
pub struct Transcript {
    buffer: String,
    next_separator: Separator,
}

impl Default for Transcript {
    fn default() -> Self {
        Self {
            buffer: String::new(),
            next_separator: Separator::Semicolon,
        }
    }
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a recognized word. `;` is reserved as the record separator, so
    /// any inside the word become `,`.
    pub fn append_word(&mut self, text: &str) {
        self.buffer.push_str(&text.replace(';', ","));
        self.buffer.push(' ');
    }

    /// Appends `;` and `\n` on alternate calls, starting with `;`.
    pub fn insert_separator(&mut self) -> Separator {
        let separator = self.next_separator;
        self.buffer.push_str(separator.as_str());
        self.next_separator = separator.toggled();
        separator
    }

    pub fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Writes the buffer verbatim as UTF-8, adding `extension` to the file
    /// name unless it already ends with it. Returns the path written.
    #[instrument(skip(self))]
    pub fn export(&self, path: &Path, extension: &str) -> Result<PathBuf> {
        let path = with_extension(path, extension);
        fs::write(&path, self.buffer.as_bytes()).map_err(|source| Error::Export {
            path: path.clone(),
            source,
        })?;
        info!(bytes = self.buffer.len(), ?path, "transcript exported");
        Ok(path)
    }
}

pub(crate) fn with_extension(path: &Path, extension: &str) -> PathBuf {
    if extension.is_empty() || path.as_os_str().to_string_lossy().ends_with(extension) {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(extension);
        PathBuf::from(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_gets_comma_and_single_space() {
        let mut transcript = Transcript::new();
        transcript.append_word("a;b;c");
        transcript.append_word("d");
        assert_eq!(transcript.text(), "a,b,c d ");
    }

    #[test]
    fn separator_alternates_from_semicolon() {
        let mut transcript = Transcript::new();
        let pressed = (0..5)
            .map(|_| transcript.insert_separator())
            .collect::<Vec<_>>();
        assert_eq!(
            pressed,
            [
                Separator::Semicolon,
                Separator::Newline,
                Separator::Semicolon,
                Separator::Newline,
                Separator::Semicolon,
            ]
        );
        assert_eq!(transcript.text(), ";\n;\n;");
    }

    #[test]
    fn manual_edits_do_not_reset_toggle() {
        let mut transcript = Transcript::new();
        transcript.insert_separator();
        transcript.set_text("fresh");
        transcript.clear();
        assert_eq!(transcript.insert_separator(), Separator::Newline);
    }

    #[test]
    fn extension_added_only_when_missing() {
        assert_eq!(
            with_extension(Path::new("out/notes"), ".csv"),
            PathBuf::from("out/notes.csv")
        );
        assert_eq!(
            with_extension(Path::new("out/notes.csv"), ".csv"),
            PathBuf::from("out/notes.csv")
        );
        assert_eq!(
            with_extension(Path::new("notes.txt"), ".csv"),
            PathBuf::from("notes.txt.csv")
        );
    }

    #[test]
    fn empty_transcript_exports_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let written = Transcript::new()
            .export(&dir.path().join("empty"), ".csv")
            .unwrap();
        assert_eq!(written, dir.path().join("empty.csv"));
        assert_eq!(fs::metadata(&written).unwrap().len(), 0);
    }

    #[test]
    fn export_is_verbatim_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let mut transcript = Transcript::new();
        transcript.append_word("Grüße");
        transcript.insert_separator();
        transcript.append_word("naïve");
        transcript.insert_separator();
        let written = transcript.export(&dir.path().join("t.csv"), ".csv").unwrap();
        assert_eq!(fs::read_to_string(written).unwrap(), "Grüße ;naïve \n");
    }

    #[test]
    fn unwritable_path_reports_export_error() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing").join("out");
        let err = Transcript::new().export(&target, ".csv").unwrap_err();
        assert!(matches!(err, Error::Export { .. }));
    }
}
