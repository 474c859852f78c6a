use std::fs;
use std::io;
use std::path::PathBuf;

use bindery_core::ClientPreferences;
use bindery_engine::AtomicFileWriter;
use bindery_logging::{bindery_error, bindery_info, bindery_warn};

const PREFERENCES_FILENAME: &str = "preferences.ron";
const FALLBACK_STATE_DIR: &str = ".bindery";

/// `<config dir>/bindery`, or `./.bindery` when the platform has none.
pub(crate) fn default_state_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("bindery"))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_STATE_DIR))
}

/// Client preferences on disk. Loaded once at startup and rewritten on every change.
#[derive(Debug, Clone)]
pub(crate) struct PreferencesStore {
    writer: AtomicFileWriter,
}

impl PreferencesStore {
    pub(crate) fn new(state_dir: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(state_dir),
        }
    }

    pub(crate) fn path(&self) -> PathBuf {
        self.writer.dir().join(PREFERENCES_FILENAME)
    }

    /// Missing or unreadable files yield defaults.
    pub(crate) fn load(&self) -> ClientPreferences {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return ClientPreferences::default();
            }
            Err(err) => {
                bindery_warn!("Failed to read preferences from {:?}: {}", path, err);
                return ClientPreferences::default();
            }
        };

        match ron::from_str(&content) {
            Ok(prefs) => {
                bindery_info!("Loaded preferences from {:?}", path);
                prefs
            }
            Err(err) => {
                bindery_warn!("Failed to parse preferences from {:?}: {}", path, err);
                ClientPreferences::default()
            }
        }
    }

    pub(crate) fn save(&self, prefs: &ClientPreferences) {
        let pretty = ron::ser::PrettyConfig::new();
        let content = match ron::ser::to_string_pretty(prefs, pretty) {
            Ok(text) => text,
            Err(err) => {
                bindery_error!("Failed to serialize preferences: {}", err);
                return;
            }
        };

        if let Err(err) = self.writer.write(PREFERENCES_FILENAME, content.as_bytes()) {
            bindery_error!(
                "Failed to write preferences to {:?}: {}",
                self.writer.dir(),
                err
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindery_core::{AnalyticsSnapshot, DailyCount, PageSize};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_defaults() {
        let temp = TempDir::new().unwrap();
        let store = PreferencesStore::new(temp.path().join("never-created"));
        assert_eq!(store.load(), ClientPreferences::default());
    }

    #[test]
    fn saved_preferences_survive_a_restart() {
        let temp = TempDir::new().unwrap();
        let prefs = ClientPreferences {
            page_size: PageSize::Legal,
            margin_mm: 7.5,
            locale: "en".to_string(),
            force_regenerate: true,
            analytics: Some(AnalyticsSnapshot {
                total_jobs: 2,
                completed_jobs: 1,
                failed_jobs: 1,
                total_bytes: 4096,
                daily: vec![DailyCount {
                    date: "2024-05-01".to_string(),
                    created: 2,
                    completed: 1,
                }],
            }),
        };

        PreferencesStore::new(temp.path().join("state")).save(&prefs);
        let reloaded = PreferencesStore::new(temp.path().join("state")).load();
        assert_eq!(reloaded, prefs);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        let store = PreferencesStore::new(temp.path().to_path_buf());
        fs::write(store.path(), "(page_size: Tabloid").unwrap();
        assert_eq!(store.load(), ClientPreferences::default());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let temp = TempDir::new().unwrap();
        let store = PreferencesStore::new(temp.path().to_path_buf());
        fs::write(store.path(), "(page_size: Letter)").unwrap();

        let prefs = store.load();
        assert_eq!(prefs.page_size, PageSize::Letter);
        assert_eq!(prefs.margin_mm, ClientPreferences::default().margin_mm);
        assert_eq!(prefs.analytics, None);
    }
}
