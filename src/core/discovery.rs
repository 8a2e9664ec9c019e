use crate::core::mod_record::{ModRecord, ModRoots};
use crate::models::error::SError;
use crate::models::task_status::Reporter;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashSet;
use std::fs;
use tracing::{debug, instrument, warn};

/// Mods that loaded, plus the per-folder errors of the ones that did not.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub mods: Vec<ModRecord>,
    pub errors: Vec<SError>,
}

impl ScanResult {
    pub fn extend(&mut self, other: ScanResult) {
        self.mods.extend(other.mods);
        self.errors.extend(other.errors);
    }
}

/// Every mod folder in Community.
#[instrument(skip_all)]
pub fn get_enabled_mods(roots: &ModRoots, reporter: &dyn Reporter) -> Result<ScanResult, SError> {
    debug!("Scanning {} for enabled mods", roots.community);
    let folders = list_subdirs(&roots.community)?;
    Ok(scan(&folders, |_| true, reporter))
}

/// Every mod folder in the store, minus names that are also present in Community.
#[instrument(skip_all)]
pub fn get_disabled_mods(roots: &ModRoots, reporter: &dyn Reporter) -> Result<ScanResult, SError> {
    debug!("Scanning {} for disabled mods", roots.mods);
    fs::create_dir_all(&roots.mods)?;

    let enabled: HashSet<String> = list_subdirs(&roots.community)?
        .iter()
        .filter_map(|p| p.file_name())
        .map(str::to_lowercase)
        .collect();

    let folders = list_subdirs(&roots.mods)?;
    Ok(scan(
        &folders,
        |name| !enabled.contains(&name.to_lowercase()),
        reporter,
    ))
}

/// Enabled mods followed by disabled ones.
pub fn get_all_mods(roots: &ModRoots, reporter: &dyn Reporter) -> Result<ScanResult, SError> {
    let mut result = get_enabled_mods(roots, reporter)?;
    result.extend(get_disabled_mods(roots, reporter)?);
    Ok(result)
}

fn scan<F>(folders: &[Utf8PathBuf], include: F, reporter: &dyn Reporter) -> ScanResult
where
    F: Fn(&str) -> bool,
{
    let mut result = ScanResult::default();
    let total = folders.len() as u64;
    reporter.step(0, total);

    for (i, folder) in folders.iter().enumerate() {
        let name = folder.file_name().unwrap_or_default();
        if include(name) {
            reporter.main(format!("Parsing {name}"));
            match ModRecord::load(folder) {
                Ok(record) => result.mods.push(record),
                Err(e) => {
                    warn!("Skipping {folder}: {e}");
                    result.errors.push(e);
                }
            }
        }
        reporter.step(i as u64 + 1, total);
    }

    result
}

/// Immediate sub-folders of `root`, junctions included, sorted by name.
fn list_subdirs(root: &Utf8Path) -> Result<Vec<Utf8PathBuf>, SError> {
    let mut folders = Vec::new();
    for entry in root.read_dir_utf8()? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping entry in {root}: {e}");
                continue;
            }
        };
        if entry.path().is_dir() {
            folders.push(entry.into_path());
        }
    }
    folders.sort();
    Ok(folders)
}
