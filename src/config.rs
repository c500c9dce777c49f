//! Runtime configuration.
//!
//! Values start from an optional JSON file, are overridden by the environment
//! (a `.env` file is honoured when the binary starts) and finally by the
//! command line.

use std::{env, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const DEFAULT_LANG: &str = "eng+fra+deu";
pub const DEFAULT_EXTENSION: &str = ".csv";
pub const DEFAULT_VIEWPORT: (u32, u32) = (800, 600);

/// Missing keys in a config file take their default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Tesseract language hint, `+`-separated.
    pub lang: String,
    pub dpi: Option<i32>,
    pub psm: Option<i32>,
    pub oem: Option<i32>,
    /// `[width, height]` in pixels.
    pub viewport: (u32, u32),
    pub extension: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lang: DEFAULT_LANG.to_owned(),
            dpi: None,
            psm: None,
            oem: None,
            viewport: DEFAULT_VIEWPORT,
            extension: DEFAULT_EXTENSION.to_owned(),
        }
    }
}

impl Config {
    /// Reads `file` if given, then applies `TEXTPICK_*` variables on top.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_lookup(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `TEXTPICK_*` variables, falling back to defaults for unset ones.
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|err| Error::Config(format!("failed to read {path:?}: {err}")))?;
        let config = Self::from_json(&content).map_err(|err| match err {
            Error::Config(message) => Error::Config(format!("{path:?}: {message}")),
            other => other,
        })?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|err| Error::Config(format!("failed to parse config: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        config.apply_lookup(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Overrides every field whose variable is set.
    pub fn apply_lookup(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(lang) = lookup("TEXTPICK_LANG") {
            self.lang = lang;
        }
        for (key, slot) in [
            ("TEXTPICK_DPI", &mut self.dpi),
            ("TEXTPICK_PSM", &mut self.psm),
            ("TEXTPICK_OEM", &mut self.oem),
        ] {
            if let Some(value) = lookup(key) {
                *slot = Some(parse_int(key, &value)?);
            }
        }
        if let Some(viewport) = lookup("TEXTPICK_VIEWPORT") {
            self.viewport = parse_viewport(&viewport)?;
        }
        if let Some(extension) = lookup("TEXTPICK_EXTENSION") {
            self.extension = extension;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.lang.trim().is_empty() {
            return Err(Error::Config("language hint must not be empty".into()));
        }
        if self.viewport.0 == 0 || self.viewport.1 == 0 {
            return Err(Error::Config(format!(
                "viewport must be non-empty, got {}x{}",
                self.viewport.0, self.viewport.1
            )));
        }
        Ok(())
    }
}

fn parse_int(key: &str, value: &str) -> Result<i32> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{key} must be an integer, got {value:?}")))
}

/// Parses `WIDTHxHEIGHT`, e.g. `1024x768`.
pub fn parse_viewport(value: &str) -> Result<(u32, u32)> {
    let invalid = || Error::Config(format!("viewport must look like 800x600, got {value:?}"));
    let (width, height) = value.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
    let width = width.trim().parse().map_err(|_| invalid())?;
    let height = height.trim().parse().map_err(|_| invalid())?;
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.lang, "eng+fra+deu");
        assert_eq!(config.extension, ".csv");
    }

    #[test]
    fn environment_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("TEXTPICK_LANG", "eng"),
            ("TEXTPICK_PSM", "6"),
            ("TEXTPICK_VIEWPORT", "1024X768"),
            ("TEXTPICK_EXTENSION", ".txt"),
        ]))
        .unwrap();
        assert_eq!(config.lang, "eng");
        assert_eq!(config.psm, Some(6));
        assert_eq!(config.dpi, None);
        assert_eq!(config.viewport, (1024, 768));
        assert_eq!(config.extension, ".txt");
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(matches!(
            Config::from_lookup(lookup(&[("TEXTPICK_DPI", "high")])),
            Err(Error::Config(_))
        ));
        assert!(parse_viewport("800").is_err());
        assert!(Config::from_lookup(lookup(&[("TEXTPICK_VIEWPORT", "0x600")])).is_err());
        assert!(Config::from_lookup(lookup(&[("TEXTPICK_LANG", " ")])).is_err());
    }

    #[test]
    fn json_file_fills_missing_keys_with_defaults() {
        let config = Config::from_json(r#"{ "lang": "deu", "psm": 6, "viewport": [1280, 720] }"#)
            .unwrap();
        assert_eq!(config.lang, "deu");
        assert_eq!(config.psm, Some(6));
        assert_eq!(config.viewport, (1280, 720));
        assert_eq!(config.extension, ".csv");
        assert_eq!(config.dpi, None);
    }

    #[test]
    fn json_file_is_validated() {
        assert!(matches!(
            Config::from_json(r#"{ "viewport": [0, 720] }"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::from_json(r#"{ "language": "eng" }"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(Config::from_json("not json"), Err(Error::Config(_))));
    }

    #[test]
    fn environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("textpick.json");
        fs::write(&path, r#"{ "lang": "fra", "dpi": 300, "extension": ".txt" }"#).unwrap();

        let mut config = Config::from_file(&path).unwrap();
        config
            .apply_lookup(lookup(&[("TEXTPICK_DPI", "150"), ("TEXTPICK_LANG", "eng")]))
            .unwrap();
        assert_eq!(config.lang, "eng");
        assert_eq!(config.dpi, Some(150));
        assert_eq!(config.extension, ".txt");
    }

    #[test]
    fn round_trips_through_json() {
        let config = Config {
            oem: Some(1),
            ..Config::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(Config::from_json(&json).unwrap(), config);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::from_file(&dir.path().join("nope.json")),
            Err(Error::Config(_))
        ));
    }
}
