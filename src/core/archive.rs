use crate::models::error::SError;
use crate::models::task_status::Reporter;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs::{self, File};
use std::io;
use tracing::{debug, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Archive format support. Every failure surfaces as `ExtractionError`.
pub trait ArchiveBackend: Send + Sync {
    /// Unpacks `archive` into `output_dir`, which is created when missing.
    fn extract(
        &self,
        archive: &Utf8Path,
        output_dir: &Utf8Path,
        reporter: &dyn Reporter,
    ) -> Result<Utf8PathBuf, SError>;

    /// Packs `source_dir` (the folder itself, not only its contents) into `archive`.
    fn create(
        &self,
        source_dir: &Utf8Path,
        archive: &Utf8Path,
        reporter: &dyn Reporter,
    ) -> Result<Utf8PathBuf, SError>;

    fn supports(&self, archive: &Utf8Path) -> bool;
}

fn backend_error(context: &Utf8Path, e: impl std::fmt::Display) -> SError {
    SError::ExtractionError(format!("{context}: {e}"))
}

/// Zip archives via the `zip` crate.
pub struct ZipBackend;

impl ArchiveBackend for ZipBackend {
    fn extract(
        &self,
        archive: &Utf8Path,
        output_dir: &Utf8Path,
        reporter: &dyn Reporter,
    ) -> Result<Utf8PathBuf, SError> {
        if !self.supports(archive) {
            return Err(backend_error(archive, "unsupported archive format"));
        }
        fs::create_dir_all(output_dir).map_err(|e| backend_error(output_dir, e))?;

        let file = File::open(archive).map_err(|e| backend_error(archive, e))?;
        let mut zip = ZipArchive::new(file).map_err(|e| backend_error(archive, e))?;
        let total = zip.len() as u64;

        for i in 0..zip.len() {
            let mut entry = zip.by_index(i).map_err(|e| backend_error(archive, e))?;

            // enclosed_name rejects entries escaping the output folder
            let safe_path = match entry.enclosed_name() {
                Some(path) => path.to_owned(),
                None => {
                    warn!("Skipping unsafe entry {} in {archive}", entry.name());
                    continue;
                }
            };
            let output_path = output_dir.as_std_path().join(&safe_path);

            if entry.is_dir() {
                fs::create_dir_all(&output_path).map_err(|e| backend_error(output_dir, e))?;
            } else {
                if let Some(parent) = output_path.parent() {
                    fs::create_dir_all(parent).map_err(|e| backend_error(output_dir, e))?;
                }
                let mut outfile =
                    File::create(&output_path).map_err(|e| backend_error(output_dir, e))?;
                io::copy(&mut entry, &mut outfile).map_err(|e| backend_error(archive, e))?;

                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    if let Some(mode) = entry.unix_mode() {
                        let permissions = fs::Permissions::from_mode(mode | 0o600);
                        if let Err(e) = fs::set_permissions(&output_path, permissions) {
                            warn!("Could not set permissions of {}: {e}", output_path.display());
                        }
                    }
                }
            }

            reporter.step(i as u64 + 1, total);
        }

        Ok(output_dir.to_owned())
    }

    fn create(
        &self,
        source_dir: &Utf8Path,
        archive: &Utf8Path,
        reporter: &dyn Reporter,
    ) -> Result<Utf8PathBuf, SError> {
        if !self.supports(archive) {
            return Err(backend_error(archive, "unsupported archive format"));
        }
        let root_name = source_dir
            .file_name()
            .ok_or_else(|| backend_error(source_dir, "cannot archive a root folder"))?;
        if let Some(parent) = archive.parent() {
            fs::create_dir_all(parent).map_err(|e| backend_error(archive, e))?;
        }

        // Enabled mods are links, the archive must hold their real files.
        let entries = WalkDir::new(source_dir)
            .follow_links(true)
            .into_iter()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| backend_error(source_dir, e))?;
        let total = entries.len() as u64;

        let file = File::create(archive).map_err(|e| backend_error(archive, e))?;
        let mut writer = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (i, entry) in entries.iter().enumerate() {
            let path = Utf8Path::from_path(entry.path())
                .ok_or_else(|| backend_error(source_dir, "path is not UTF-8"))?;
            let rel = path
                .strip_prefix(source_dir)
                .map_err(|e| backend_error(path, e))?;

            let mut name = root_name.to_string();
            for component in rel.components() {
                name.push('/');
                name.push_str(component.as_str());
            }

            if entry.file_type().is_dir() {
                writer
                    .add_directory(name, options)
                    .map_err(|e| backend_error(archive, e))?;
            } else {
                let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
                writer
                    .start_file(name, options.large_file(size >= u32::MAX as u64))
                    .map_err(|e| backend_error(archive, e))?;
                let mut input = File::open(path).map_err(|e| backend_error(path, e))?;
                io::copy(&mut input, &mut writer).map_err(|e| backend_error(archive, e))?;
            }

            reporter.step(i as u64 + 1, total);
        }

        writer.finish().map_err(|e| backend_error(archive, e))?;
        debug!("Wrote {total} entries to {archive}");
        Ok(archive.to_owned())
    }

    fn supports(&self, archive: &Utf8Path) -> bool {
        archive
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("zip"))
            .unwrap_or(false)
    }
}
