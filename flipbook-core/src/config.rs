//! Engine tuning and document manifest loading.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{FlipbookError, Result};
use crate::overlay::Hotspot;

/// File name of the manifest inside a document directory.
pub const MANIFEST_FILE: &str = "flipbook.json";

/// Timing and threshold knobs for the page-turn engine.
///
/// Every field has a default so a partial JSON file is valid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Duration of an automatic (button/keyboard) turn.
    pub turn_duration_ms: u64,
    /// Base duration of a drag commit, scaled by the remaining distance.
    pub commit_duration_ms: u64,
    /// Base duration of a drag cancel, scaled by the distance travelled.
    pub cancel_duration_ms: u64,
    /// Drag progress above which a release completes the turn.
    pub commit_threshold: f32,
    pub resize_debounce_ms: u64,
    /// Aspect ratio (width / height) above which pages are shown one at a time.
    pub landscape_ratio: f32,
    pub sound_enabled: bool,
    pub default_mode: String,
    pub background_color: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            turn_duration_ms: 600,
            commit_duration_ms: 400,
            cancel_duration_ms: 300,
            commit_threshold: 0.3,
            resize_debounce_ms: 250,
            landscape_ratio: 1.2,
            sound_enabled: true,
            default_mode: "default".to_string(),
            background_color: "#0f0f0f".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load from a JSON file. A missing file yields the defaults, a malformed
    /// one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(FlipbookError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&raw).map_err(|source| FlipbookError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn turn_duration(&self) -> Duration {
        Duration::from_millis(self.turn_duration_ms)
    }

    pub fn commit_duration(&self) -> Duration {
        Duration::from_millis(self.commit_duration_ms)
    }

    pub fn cancel_duration(&self) -> Duration {
        Duration::from_millis(self.cancel_duration_ms)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    /// Parse `background_color` (`#rrggbb`), falling back to near-black.
    pub fn background_rgb(&self) -> [u8; 3] {
        parse_hex_color(&self.background_color).unwrap_or([0x0f, 0x0f, 0x0f])
    }
}

fn parse_hex_color(value: &str) -> Option<[u8; 3]> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// Document metadata written by the publishing side.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentManifest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "pages_count")]
    pub page_count: u32,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub hotspots: Vec<Hotspot>,
}

impl DocumentManifest {
    /// Read `flipbook.json` from `dir`. Returns `Ok(None)` when the directory
    /// carries no manifest.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let path: PathBuf = dir.join(MANIFEST_FILE);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(FlipbookError::Io { path, source }),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| FlipbookError::Config { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn missing_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "turn_duration_ms": 900, "sound_enabled": false }}"#).unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.turn_duration(), Duration::from_millis(900));
        assert!(!config.sound_enabled);
        assert_eq!(config.commit_threshold, 0.3);
        assert_eq!(config.resize_debounce(), Duration::from_millis(250));
    }

    #[test]
    fn malformed_config_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            EngineConfig::load(file.path()),
            Err(FlipbookError::Config { .. })
        ));
    }

    #[test]
    fn background_color_parsing() {
        let mut config = EngineConfig::default();
        assert_eq!(config.background_rgb(), [0x0f, 0x0f, 0x0f]);
        config.background_color = "#ff8000".into();
        assert_eq!(config.background_rgb(), [0xff, 0x80, 0x00]);
        config.background_color = "orange".into();
        assert_eq!(config.background_rgb(), [0x0f, 0x0f, 0x0f]);
    }

    #[test]
    fn manifest_accepts_pages_count_alias() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(MANIFEST_FILE),
            r#"{ "id": "abc", "pages_count": 12, "mode": "magazine" }"#,
        )
        .unwrap();

        let manifest = DocumentManifest::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(manifest.page_count, 12);
        assert_eq!(manifest.mode.as_deref(), Some("magazine"));
        assert!(manifest.hotspots.is_empty());
    }

    #[test]
    fn manifest_absent_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(DocumentManifest::load_from_dir(dir.path()).unwrap().is_none());
    }
}
