use crate::models::error::SError;
use crate::models::mod_dto::{manifest_keys as keys, ModFile};
use crate::models::paths::ModPaths;
use crate::utils::long_path;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::time::SystemTime;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

/// The two places a mod can live.
#[derive(Clone, Debug)]
pub struct ModRoots {
    /// The simulator's Community folder; entries here are enabled.
    pub community: Utf8PathBuf,
    /// The manager's store; entries here are disabled.
    pub mods: Utf8PathBuf,
}

impl ModRoots {
    pub fn new(community: &Utf8Path, mods: &Utf8Path) -> Self {
        Self {
            community: long_path::resolve(community),
            mods: long_path::resolve(mods),
        }
    }
}

/// One mod folder, identified by its folder name, plus the fields of its manifest.
#[derive(Clone, Debug)]
pub struct ModRecord {
    pub name: String,
    /// Where the folder currently lives. Never resolved through a junction.
    pub abs_path: Utf8PathBuf,

    pub content_type: String,
    pub title: String,
    pub manufacturer: String,
    pub creator: String,
    pub version: String,
    pub minimum_game_version: String,

    pub update_url: String,
    pub last_update_check: String,
    pub last_update_version: String,

    pub last_modified: Option<SystemTime>,
    pub files: Vec<ModFile>,
    pub size: u64,

    manifest_data: Map<String, Value>,
}

fn field(data: &Map<String, Value>, key: &str) -> String {
    match data.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

impl ModRecord {
    /// Loads the mod rooted at `path`. Fails with `ManifestMissing` when the
    /// folder has no manifest and `ManifestCorrupt` when it is not a JSON object.
    pub fn load(path: &Utf8Path) -> Result<Self, SError> {
        let abs_path = long_path::extended(path);
        let name = abs_path
            .file_name()
            .ok_or_else(|| SError::ParseError(format!("{path} has no folder name")))?
            .to_string();

        let mut record = Self {
            name,
            abs_path,
            content_type: String::new(),
            title: String::new(),
            manufacturer: String::new(),
            creator: String::new(),
            version: String::new(),
            minimum_game_version: String::new(),
            update_url: String::new(),
            last_update_check: String::new(),
            last_update_version: String::new(),
            last_modified: None,
            files: Vec::new(),
            size: 0,
            manifest_data: Map::new(),
        };
        record.reload()?;
        Ok(record)
    }

    pub fn manifest_path(&self) -> Utf8PathBuf {
        ModPaths::new(&self.abs_path).manifest
    }

    /// Re-reads the manifest from disk, replacing every manifest derived field.
    pub fn reload(&mut self) -> Result<(), SError> {
        let path = self.manifest_path();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SError::ManifestMissing(path));
            }
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                return Err(SError::ManifestCorrupt {
                    path,
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let value: Value = serde_json::from_str(text.trim_start_matches('\u{feff}'))
            .map_err(|e| SError::ManifestCorrupt {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        let Value::Object(data) = value else {
            return Err(SError::ManifestCorrupt {
                path,
                reason: "top level value is not an object".into(),
            });
        };

        self.content_type = field(&data, keys::CONTENT_TYPE);
        self.title = field(&data, keys::TITLE);
        self.manufacturer = field(&data, keys::MANUFACTURER);
        self.creator = field(&data, keys::CREATOR);
        self.version = field(&data, keys::VERSION);
        self.minimum_game_version = field(&data, keys::MINIMUM_GAME_VERSION);
        self.update_url = field(&data, keys::UPDATE_URL);
        self.last_update_check = field(&data, keys::LAST_UPDATE_CHECK);
        self.last_update_version = field(&data, keys::LAST_UPDATE_VERSION);

        self.last_modified = fs::metadata(&path)
            .and_then(|m| m.created().or_else(|_| m.modified()))
            .ok();
        self.manifest_data = data;

        Ok(())
    }

    /// Writes the known fields back into the manifest, keeping every other key.
    #[instrument(skip(self), fields(name = %self.name))]
    pub fn dump(&mut self) -> Result<(), SError> {
        let fields = [
            (keys::CONTENT_TYPE, &self.content_type),
            (keys::TITLE, &self.title),
            (keys::MANUFACTURER, &self.manufacturer),
            (keys::CREATOR, &self.creator),
            (keys::VERSION, &self.version),
            (keys::MINIMUM_GAME_VERSION, &self.minimum_game_version),
            (keys::UPDATE_URL, &self.update_url),
            (keys::LAST_UPDATE_CHECK, &self.last_update_check),
            (keys::LAST_UPDATE_VERSION, &self.last_update_version),
        ];
        for (key, value) in fields {
            self.manifest_data
                .insert(key.to_string(), Value::String(value.clone()));
        }

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.manifest_data.serialize(&mut ser)?;

        let path = self.manifest_path();
        debug!("Writing manifest {path}");
        fs::write(&path, buf)?;
        Ok(())
    }

    /// Walks the mod folder and records every file with its size.
    pub fn load_files(&mut self) -> Result<(), SError> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.abs_path).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {e}", self.name);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let abs_path = Utf8PathBuf::try_from(entry.path().to_path_buf())?;
            let rel_path = abs_path.strip_prefix(&self.abs_path)?.to_path_buf();
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            files.push(ModFile {
                rel_path,
                abs_path,
                size,
            });
        }

        files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
        self.size = files.iter().map(|f| f.size).sum();
        self.files = files;
        Ok(())
    }

    /// Lives somewhere inside the Community folder.
    pub fn is_enabled(&self, roots: &ModRoots) -> bool {
        long_path::is_within(&self.abs_path, &roots.community)
    }

    /// Lives directly inside the manager's store.
    pub fn is_disabled(&self, roots: &ModRoots) -> bool {
        long_path::is_direct_child(&self.abs_path, &roots.mods)
    }

    /// Unknown manifest keys, for callers that need more than the typed fields.
    pub fn manifest_value(&self, key: &str) -> Option<&Value> {
        self.manifest_data.get(key)
    }
}
