use crate::models::error::SError;
use crate::models::paths::AppPathRules;
use camino::{Utf8Path, Utf8PathBuf};
use derive_more::Display;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "sim_mod_keeper";
const CONFIG_NAME: &str = "config";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Display)]
pub enum Theme {
    #[default]
    System,
    Light,
    Dark,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub version: u8,
    /// Simulator packages root (holds Community and Official).
    pub packages_path: Option<Utf8PathBuf>,
    /// Where disabled mods are stored.
    pub mods_path: Utf8PathBuf,
    pub last_opened_path: Option<Utf8PathBuf>,
    pub theme: Theme,
    /// Unix timestamp of the last application update check.
    pub last_version_check: Option<u64>,
    pub never_version_check: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            version: 0,
            packages_path: None,
            mods_path: AppPathRules::new(&app_base_dir()).mods,
            last_opened_path: None,
            theme: Theme::default(),
            last_version_check: None,
            never_version_check: false,
        }
    }
}

/// Folder holding the manager's own data (mod store, staging, logs).
pub fn app_base_dir() -> Utf8PathBuf {
    ProjectDirs::from("com", "martes", APP_NAME)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .or_else(|| {
            std::env::current_exe()
                .ok()
                .and_then(|exe_path| exe_path.parent().map(|p| p.to_path_buf()))
        })
        .and_then(|p| Utf8PathBuf::from_path_buf(p).ok())
        .unwrap_or_else(|| Utf8PathBuf::from("."))
}

/// Where settings are persisted.
#[derive(Clone, Debug)]
pub enum ConfigStore {
    /// The per-user config location chosen by confy.
    User,
    /// An explicit file, used by tests and portable installs.
    File(Utf8PathBuf),
}

impl ConfigStore {
    pub fn user() -> Self {
        Self::User
    }

    pub fn at(path: &Utf8Path) -> Self {
        Self::File(path.to_owned())
    }

    pub fn load(&self) -> Result<AppSettings, SError> {
        let settings = match self {
            Self::User => confy::load(APP_NAME, CONFIG_NAME)?,
            Self::File(path) => confy::load_path(path)?,
        };
        Ok(settings)
    }

    pub fn save(&self, settings: &AppSettings) -> Result<(), SError> {
        match self {
            Self::User => confy::store(APP_NAME, CONFIG_NAME, settings)?,
            Self::File(path) => confy::store_path(path, settings)?,
        }
        Ok(())
    }
}
