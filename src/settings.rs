use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CURRENT_VERSION: u32 = 1;
const SETTINGS_FILENAME: &str = "config.yaml";
const HISTORY_FILENAME: &str = "browse.config";
const APP_NAME: &str = "docbrowse";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Pixel density of the screen, used to show pages at physical size
    #[serde(default = "default_display_dpi")]
    pub display_dpi: f32,

    /// Display lists kept per document, 0 keeps all of them
    #[serde(default)]
    pub page_cache_capacity: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_file: Option<PathBuf>,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_display_dpi() -> f32 {
    94.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            display_dpi: default_display_dpi(),
            page_cache_capacity: 0,
            history_file: None,
        }
    }
}

impl Settings {
    /// History file from the settings, or the default data location
    pub fn history_path(&self) -> PathBuf {
        self.history_file.clone().unwrap_or_else(default_history_path)
    }
}

pub fn preferred_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME).join(SETTINGS_FILENAME))
}

fn default_history_path() -> PathBuf {
    dirs::data_dir()
        .map(|data| data.join(APP_NAME).join(HISTORY_FILENAME))
        .unwrap_or_else(|| PathBuf::from(HISTORY_FILENAME))
}

/// Load settings from `path` or the default location.
///
/// A missing file is created with defaults. Unreadable or invalid files are
/// logged and the defaults are used.
pub fn load_settings(path: Option<&Path>) -> Settings {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match preferred_config_path() {
            Some(p) => p,
            None => {
                warn!("Could not determine config directory, using default settings");
                return Settings::default();
            }
        },
    };

    if path.exists() {
        load_settings_from_path(&path)
    } else {
        info!("Settings file not found, creating with defaults at {path:?}");
        let settings = Settings::default();
        save_settings_to_file(&settings, &path);
        settings
    }
}

fn load_settings_from_path(path: &Path) -> Settings {
    match fs::read_to_string(path) {
        Ok(content) => match serde_yaml::from_str::<Settings>(&content) {
            Ok(mut settings) => {
                debug!("Loaded settings from {path:?}");
                if settings.version < CURRENT_VERSION {
                    migrate_settings(&mut settings);
                    save_settings_to_file(&settings, path);
                }
                sanitize(&mut settings);
                settings
            }
            Err(e) => {
                error!("Failed to parse settings file {path:?}: {e}");
                Settings::default()
            }
        },
        Err(e) => {
            error!("Failed to read settings file {path:?}: {e}");
            Settings::default()
        }
    }
}

fn migrate_settings(settings: &mut Settings) {
    info!(
        "Migrating settings from v{} to v{}",
        settings.version, CURRENT_VERSION
    );
    settings.version = CURRENT_VERSION;
}

fn sanitize(settings: &mut Settings) {
    if !(settings.display_dpi.is_finite() && settings.display_dpi > 0.0) {
        warn!(
            "Invalid display_dpi {}, using {}",
            settings.display_dpi,
            default_display_dpi()
        );
        settings.display_dpi = default_display_dpi();
    }
}

pub fn save_settings_to_file(settings: &Settings, path: &Path) {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create config directory {parent:?}: {e}");
                return;
            }
        }
    }

    let content = generate_settings_yaml(settings);

    match fs::write(path, content) {
        Ok(()) => debug!("Saved settings to {path:?}"),
        Err(e) => error!("Failed to save settings to {path:?}: {e}"),
    }
}

fn generate_settings_yaml(settings: &Settings) -> String {
    let mut content = String::new();

    content.push_str(&format!("version: {}\n", settings.version));
    content.push_str("# Screen pixels per inch; zoom 1.0 shows pages at physical size\n");
    content.push_str(&format!("display_dpi: {}\n", settings.display_dpi));
    content.push_str("# Pages whose display lists stay in memory per document (0 = all)\n");
    content.push_str(&format!(
        "page_cache_capacity: {}\n",
        settings.page_cache_capacity
    ));
    match &settings.history_file {
        Some(path) => match serde_yaml::to_string(path) {
            Ok(value) => content.push_str(&format!("history_file: {}\n", value.trim_end())),
            Err(e) => warn!("Not saving history_file {path:?}: {e}"),
        },
        None => content.push_str("# history_file: \"/path/to/browse.config\"\n"),
    }

    content
}
