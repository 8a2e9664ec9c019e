use crate::core::linker::Linker;
use crate::core::mod_record::{ModRecord, ModRoots};
use crate::models::error::SError;
use crate::models::task_status::Reporter;
use crate::utils::file::FileUtils;
use crate::utils::long_path;
use camino::Utf8Path;
use std::fs;
use tracing::{debug, info, instrument};

/// Makes a mod visible to the simulator by linking its stored folder into Community.
/// Already enabled mods are left alone.
#[instrument(skip_all, fields(name = %record.name))]
pub fn enable(
    roots: &ModRoots,
    record: &mut ModRecord,
    reporter: &dyn Reporter,
) -> Result<(), SError> {
    if record.is_enabled(roots) {
        debug!("Mod already enabled, nothing to do");
        return Ok(());
    }

    let enabled_path = roots.community.join(&record.name);
    let source = long_path::resolve(&record.abs_path);
    clear_link_slot(&enabled_path, reporter)?;

    reporter.sub(format!(
        "Creating directory junction from {} to {}",
        long_path::display(&source),
        long_path::display(&enabled_path)
    ));
    Linker::link(&source, &enabled_path)?;

    info!("Enabled {} via {enabled_path}", record.name);
    record.abs_path = enabled_path;
    Ok(())
}

/// A stale junction in the way is replaced; real content never is.
fn clear_link_slot(slot: &Utf8Path, reporter: &dyn Reporter) -> Result<(), SError> {
    if fs::symlink_metadata(slot).is_err() {
        return Ok(());
    }
    if !Linker::is_junction(slot) {
        return Err(SError::DestinationOccupied(slot.to_owned()));
    }

    debug!("Replacing existing directory junction at {slot}");
    reporter.sub(format!(
        "Deleting directory junction at {}",
        long_path::display(slot)
    ));
    Linker::unlink(slot)?;
    Ok(())
}

/// Takes a mod out of Community and makes sure its real files sit in the store.
///
/// Three shapes are handled:
/// - a junction pointing at the store slot: only the junction goes,
/// - a junction pointing anywhere else: the junction goes and its target is moved in,
/// - a real folder (in Community or anywhere untracked): the folder is moved in.
#[instrument(skip_all, fields(name = %record.name))]
pub fn disable(
    roots: &ModRoots,
    record: &mut ModRecord,
    reporter: &dyn Reporter,
) -> Result<(), SError> {
    if record.is_disabled(roots) {
        debug!("Mod already disabled, nothing to do");
        return Ok(());
    }

    let disabled_path = roots.mods.join(&record.name);
    fs::create_dir_all(&roots.mods)?;

    if record.is_enabled(roots) && Linker::is_junction(&record.abs_path) {
        let real_files = long_path::resolve(&record.abs_path);
        let points_home = FileUtils::same_location(&real_files, &disabled_path);

        reporter.sub(format!(
            "Deleting directory junction at {}",
            long_path::display(&record.abs_path)
        ));
        Linker::unlink(&record.abs_path)?;

        if !points_home {
            debug!("Junction pointed at {real_files}, moving its files into the store");
            FileUtils::move_path(&real_files, &disabled_path, reporter)?;
        }
    } else {
        debug!("Mod is not a directory junction, moving it into the store");
        FileUtils::move_path(&record.abs_path, &disabled_path, reporter)?;
    }

    info!("Disabled {} into {disabled_path}", record.name);
    record.abs_path = disabled_path;
    Ok(())
}

/// Disables the mod, then deletes its stored folder. The record is consumed.
#[instrument(skip_all, fields(name = %record.name))]
pub fn uninstall(
    roots: &ModRoots,
    mut record: ModRecord,
    reporter: &dyn Reporter,
) -> Result<(), SError> {
    disable(roots, &mut record, reporter)?;
    FileUtils::remove_path(&record.abs_path, reporter)?;
    info!("Uninstalled {}", record.name);
    Ok(())
}

/// Enables each mod in turn. Stops at the first failure.
pub fn enable_mods(
    roots: &ModRoots,
    records: &mut [ModRecord],
    reporter: &dyn Reporter,
) -> Result<(), SError> {
    let total = records.len() as u64;
    for (i, record) in records.iter_mut().enumerate() {
        reporter.main(format!("Enabling {}", record.name));
        enable(roots, record, reporter)?;
        reporter.step(i as u64 + 1, total);
    }
    Ok(())
}

/// Disables each mod in turn. Stops at the first failure.
pub fn disable_mods(
    roots: &ModRoots,
    records: &mut [ModRecord],
    reporter: &dyn Reporter,
) -> Result<(), SError> {
    let total = records.len() as u64;
    for (i, record) in records.iter_mut().enumerate() {
        reporter.main(format!("Disabling {}", record.name));
        disable(roots, record, reporter)?;
        reporter.step(i as u64 + 1, total);
    }
    Ok(())
}

/// Uninstalls each mod in turn. Stops at the first failure.
pub fn uninstall_mods(
    roots: &ModRoots,
    records: Vec<ModRecord>,
    reporter: &dyn Reporter,
) -> Result<(), SError> {
    let total = records.len() as u64;
    for (i, record) in records.into_iter().enumerate() {
        reporter.main(format!("Uninstalling {}", record.name));
        uninstall(roots, record, reporter)?;
        reporter.step(i as u64 + 1, total);
    }
    Ok(())
}
