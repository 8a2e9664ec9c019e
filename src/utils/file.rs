use crate::core::linker::Linker;
use crate::models::error::SError;
use crate::models::task_status::Reporter;
use crate::utils::long_path;
use camino::Utf8Path;
use std::fs;
use std::io;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

const SIZE_UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

pub struct FileUtils;

impl FileUtils {
    /// Recursively copies a directory tree from source to destination.
    /// Links inside the tree are followed, so the copy holds real files.
    pub fn copy_recursive(src: &Utf8Path, dst: &Utf8Path) -> Result<(), SError> {
        fs::create_dir_all(dst)?;

        for entry in WalkDir::new(src).follow_links(true) {
            let entry = entry?;
            let src_path = Utf8Path::from_path(entry.path()).ok_or_else(|| {
                SError::ParseError(format!("Invalid UTF-8 path: {:?}", entry.path()))
            })?;

            let rel_path = src_path.strip_prefix(src)?;
            let dst_path = dst.join(rel_path);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&dst_path)?;
            } else {
                if let Some(parent) = dst_path.parent() {
                    if !parent.exists() {
                        fs::create_dir_all(parent)?;
                    }
                }
                fs::copy(src_path, &dst_path)?;
            }
        }

        Ok(())
    }

    /// Deletes a file, a directory tree or a junction (the junction only, never its target).
    /// A missing path is a no-op.
    pub fn remove_path(path: &Utf8Path, reporter: &dyn Reporter) -> Result<(), SError> {
        Self::remove_with_retry(path, reporter, Self::delete_once)
    }

    /// Runs `delete` at most twice. After a permission failure the tree is made
    /// writable and the deletion retried; a second permission failure is `AccessDenied`.
    pub fn remove_with_retry<F>(
        path: &Utf8Path,
        reporter: &dyn Reporter,
        mut delete: F,
    ) -> Result<(), SError>
    where
        F: FnMut(&Utf8Path) -> io::Result<()>,
    {
        let path = long_path::extended(path);
        if path.symlink_metadata().is_err() {
            debug!("Path {path} does not exist, nothing to delete");
            return Ok(());
        }

        let mut is_first_attempt = true;
        loop {
            reporter.sub(format!("Deleting {}", long_path::display(&path)));

            match delete(&path) {
                Ok(()) => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                    if !is_first_attempt {
                        warn!("Deleting {path} failed again after fixing permissions");
                        return Err(SError::AccessDenied(path));
                    }
                    info!("Deleting {path} failed with a permission error, fixing permissions");
                    Self::fix_permissions(&path, reporter);
                    is_first_attempt = false;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn delete_once(path: &Utf8Path) -> io::Result<()> {
        if Linker::is_junction(path) {
            return Linker::unlink(path);
        }

        if path.symlink_metadata()?.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        }
    }

    /// Grants the owner write access to every entry of the tree, best effort.
    pub fn fix_permissions(path: &Utf8Path, reporter: &dyn Reporter) {
        for entry in WalkDir::new(path) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping entry while fixing permissions: {e}");
                    continue;
                }
            };
            reporter.sub(format!("Fixing permissions for {}", entry.path().display()));

            if let Err(e) = Self::make_writable(entry.path()) {
                warn!("Could not fix permissions of {:?}: {e}", entry.path());
            }
        }
    }

    #[cfg(unix)]
    fn make_writable(path: &std::path::Path) -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let meta = fs::symlink_metadata(path)?;
        if meta.file_type().is_symlink() {
            return Ok(());
        }
        let mut perms = meta.permissions();
        perms.set_mode(perms.mode() | 0o200);
        fs::set_permissions(path, perms)
    }

    #[cfg(windows)]
    fn make_writable(path: &std::path::Path) -> io::Result<()> {
        let mut perms = fs::symlink_metadata(path)?.permissions();
        perms.set_readonly(false);
        fs::set_permissions(path, perms)
    }

    /// True when both paths denote the same filesystem location.
    pub fn same_location(a: &Utf8Path, b: &Utf8Path) -> bool {
        if long_path::same_resolved(a, b) {
            return true;
        }

        match (
            file_id::get_file_id(long_path::resolve(a)),
            file_id::get_file_id(long_path::resolve(b)),
        ) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    /// Moves `src` to `dest` by copying and then deleting the source.
    /// Anything already at `dest` is replaced. Moving a location onto itself
    /// fails with `SameLocation` and a missing source fails, both before
    /// anything is touched.
    pub fn move_path(
        src: &Utf8Path,
        dest: &Utf8Path,
        reporter: &dyn Reporter,
    ) -> Result<(), SError> {
        debug!("Moving from {src} to {dest}");
        if Self::same_location(src, dest) {
            return Err(SError::SameLocation(src.to_owned()));
        }

        let src = long_path::extended(src);
        let dest = long_path::extended(dest);
        let src_meta = src.symlink_metadata()?;

        if dest.symlink_metadata().is_ok() {
            debug!("Destination {dest} exists, removing it first");
            Self::remove_path(&dest, reporter)?;
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        let size = Self::human_readable_size(Self::path_size(&src));
        reporter.sub(format!(
            "Copying {} to {} ({size})",
            long_path::display(&src),
            long_path::display(&dest)
        ));

        if src_meta.is_dir() || Linker::is_junction(&src) {
            Self::copy_recursive(&src, &dest)?;
        } else {
            fs::copy(&src, &dest)?;
        }

        Self::remove_path(&src, reporter)
    }

    /// Total size in bytes of a file or directory tree. Missing paths count as 0.
    pub fn path_size(path: &Utf8Path) -> u64 {
        let path = long_path::extended(path);
        let Ok(meta) = fs::metadata(&path) else {
            warn!("Cannot size {path}, it does not exist");
            return 0;
        };
        if meta.is_file() {
            return meta.len();
        }

        WalkDir::new(&path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| e.metadata().ok())
            .map(|m| m.len())
            .sum()
    }

    /// Formats a byte count with two decimals, e.g. `1.50 KB`.
    pub fn human_readable_size(size: u64) -> String {
        let mut value = size as f64;
        let mut unit = 0;
        while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
            value /= 1024.0;
            unit += 1;
        }
        format!("{value:.2} {}", SIZE_UNITS[unit])
    }
}
