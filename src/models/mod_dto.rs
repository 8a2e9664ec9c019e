use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Keys of `manifest.json` the manager understands.
/// Anything else in the file is carried through untouched.
pub mod manifest_keys {
    pub const CONTENT_TYPE: &str = "content_type";
    pub const TITLE: &str = "title";
    pub const MANUFACTURER: &str = "manufacturer";
    pub const CREATOR: &str = "creator";
    pub const VERSION: &str = "package_version";
    pub const MINIMUM_GAME_VERSION: &str = "minimum_game_version";

    // Manager-private, prefixed so they never collide with author keys.
    pub const UPDATE_URL: &str = "_nvmmm_url";
    pub const LAST_UPDATE_CHECK: &str = "_nvmmm_last_check";
    pub const LAST_UPDATE_VERSION: &str = "_nvmmm_last_version";
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ModFile {
    /// Path relative to the mod folder.
    pub rel_path: Utf8PathBuf,
    pub abs_path: Utf8PathBuf,
    pub size: u64,
}
