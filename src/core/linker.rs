use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io;

/// Directory links: junctions on Windows, symlinks elsewhere.
pub struct Linker;

impl Linker {
    /// Creates a link at `target` pointing to the directory `source`.
    /// Fails with `AlreadyExists` when anything occupies `target`.
    pub fn link(source: &Utf8Path, target: &Utf8Path) -> io::Result<()> {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        if fs::symlink_metadata(target).is_ok() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{target} already exists"),
            ));
        }

        #[cfg(windows)]
        {
            junction::create(dunce::simplified(source.as_std_path()), target)
        }
        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(source, target)
        }
    }

    /// Removes the link at `target`, leaving its target alone.
    /// A missing path is a no-op, a real directory is refused.
    pub fn unlink(target: &Utf8Path) -> io::Result<()> {
        if fs::symlink_metadata(target).is_err() {
            return Ok(());
        }

        if !Self::is_junction(target) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{target} is not a link"),
            ));
        }

        #[cfg(windows)]
        {
            // Junctions are directories to the Win32 API.
            fs::remove_dir(target).or_else(|_| fs::remove_file(target))
        }
        #[cfg(unix)]
        {
            fs::remove_file(target)
        }
    }

    pub fn is_junction(path: &Utf8Path) -> bool {
        let Ok(meta) = fs::symlink_metadata(path) else {
            return false;
        };
        if meta.file_type().is_symlink() {
            return true;
        }

        #[cfg(windows)]
        {
            if junction::exists(path).unwrap_or(false) {
                return true;
            }
        }

        false
    }

    pub fn read_link_target(path: &Utf8Path) -> io::Result<Utf8PathBuf> {
        #[cfg(windows)]
        let target = junction::get_target(path).or_else(|_| fs::read_link(path))?;
        #[cfg(unix)]
        let target = fs::read_link(path)?;

        Utf8PathBuf::from_path_buf(target).map_err(|p| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("link target is not UTF-8: {p:?}"),
            )
        })
    }
}
