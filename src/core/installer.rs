use crate::core::activation;
use crate::core::archive::ArchiveBackend;
use crate::core::mod_record::{ModRecord, ModRoots};
use crate::models::error::SError;
use crate::models::paths::MANIFEST_FILE;
use crate::models::task_status::{Reporter, Silent};
use crate::utils::file::FileUtils;
use crate::utils::long_path;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use walkdir::WalkDir;

pub struct ModInstaller;

/// A folder ready to be scanned for mods.
#[derive(Debug)]
pub struct StagedSource {
    pub input: Utf8PathBuf,
    pub source_path: Utf8PathBuf,
    /// True when `source_path` is a temp folder that must be deleted afterwards.
    pub is_staging: bool,
}

#[derive(Debug)]
pub struct InstallFailure {
    pub input: Utf8PathBuf,
    pub error: SError,
}

#[derive(Debug, Default)]
pub struct InstallReport {
    pub installed: Vec<ModRecord>,
    pub failures: Vec<InstallFailure>,
}

impl InstallReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl ModInstaller {
    /// Installs each input (an archive or a plain folder) in turn. A failing
    /// input is recorded and the rest still go through.
    #[instrument(skip_all, fields(count = inputs.len()))]
    pub fn install(
        roots: &ModRoots,
        inputs: &[Utf8PathBuf],
        backend: &dyn ArchiveBackend,
        staging_root: &Utf8Path,
        reporter: &dyn Reporter,
    ) -> InstallReport {
        let mut report = InstallReport::default();
        let total = inputs.len() as u64;
        reporter.step(0, total);

        for (i, input) in inputs.iter().enumerate() {
            let result = Self::stage(input, backend, staging_root, reporter).and_then(|staged| {
                let installed = Self::install_directory(roots, &staged.source_path, reporter);
                Self::clean_up(&staged);
                installed
            });

            match result {
                Ok(mods) => report.installed.extend(mods),
                Err(error) => {
                    warn!("Installing {input} failed: {error}");
                    report.failures.push(InstallFailure {
                        input: input.clone(),
                        error,
                    });
                }
            }
            reporter.step(i as u64 + 1, total);
        }

        report
    }

    /// Archive-only entry point.
    pub fn install_archives(
        roots: &ModRoots,
        archives: &[Utf8PathBuf],
        backend: &dyn ArchiveBackend,
        staging_root: &Utf8Path,
        reporter: &dyn Reporter,
    ) -> InstallReport {
        Self::install(roots, archives, backend, staging_root, reporter)
    }

    fn stage(
        input: &Utf8Path,
        backend: &dyn ArchiveBackend,
        staging_root: &Utf8Path,
        reporter: &dyn Reporter,
    ) -> Result<StagedSource, SError> {
        if input.is_dir() {
            return Ok(StagedSource {
                input: input.to_owned(),
                source_path: input.to_owned(),
                is_staging: false,
            });
        }

        let extracted = Self::extract_archive(input, backend, staging_root, reporter)?;
        let staging_dir = extracted
            .parent()
            .map(Utf8Path::to_path_buf)
            .unwrap_or_else(|| extracted.clone());
        Ok(StagedSource {
            input: input.to_owned(),
            source_path: staging_dir,
            is_staging: true,
        })
    }

    /// Extracts `archive` into `<staging_root>/<uuid>/<archive stem>` and returns that folder.
    pub fn extract_archive(
        archive: &Utf8Path,
        backend: &dyn ArchiveBackend,
        staging_root: &Utf8Path,
        reporter: &dyn Reporter,
    ) -> Result<Utf8PathBuf, SError> {
        let staging_dir = staging_root.join(Uuid::new_v4().to_string());
        let output_dir = staging_dir.join(Self::archive_stem(archive));
        fs::create_dir_all(&output_dir)?;

        let size = FileUtils::human_readable_size(FileUtils::path_size(archive));
        reporter.main(format!(
            "Extracting archive {} ({size}) to {}",
            long_path::display(archive),
            long_path::display(&output_dir)
        ));

        match backend.extract(archive, &output_dir, reporter) {
            Ok(path) => Ok(path),
            Err(e) => {
                if let Err(cleanup) = FileUtils::remove_path(&staging_dir, &Silent) {
                    warn!("Failed to clean up {staging_dir}: {cleanup}");
                }
                Err(match e {
                    SError::ExtractionError(_) => e,
                    other => SError::ExtractionError(other.to_string()),
                })
            }
        }
    }

    /// Archive file name up to its first dot, `A330.v1.2.zip` gives `A330`.
    fn archive_stem(archive: &Utf8Path) -> String {
        let name = archive.file_name().unwrap_or("archive");
        match name.split_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem.to_string(),
            _ => name.to_string(),
        }
    }

    /// Every folder under `dir` (itself included) holding a manifest.
    /// Nested mod folders are reported too; finding none is `NoModsFound`.
    pub fn find_mods(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>, SError> {
        if !dir.is_dir() {
            return Err(SError::NoModsFound(dir.to_owned()));
        }

        let found = WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
            .filter(|e| e.path().join(MANIFEST_FILE).is_file())
            .filter_map(|e| Utf8PathBuf::from_path_buf(e.into_path()).ok())
            .collect::<Vec<_>>();

        if found.is_empty() {
            return Err(SError::NoModsFound(dir.to_owned()));
        }
        debug!("Found {} mod folders in {dir}", found.len());
        Ok(found)
    }

    /// Installs every mod folder found under `dir`: each is moved into the store
    /// and then linked into Community.
    #[instrument(skip(roots, reporter))]
    pub fn install_directory(
        roots: &ModRoots,
        dir: &Utf8Path,
        reporter: &dyn Reporter,
    ) -> Result<Vec<ModRecord>, SError> {
        let found = Self::find_mods(dir)?;

        let mut installed = Vec::with_capacity(found.len());
        for path in found {
            if !path.is_dir() {
                debug!("{path} was carried along with an enclosing mod");
                continue;
            }
            let mut record = ModRecord::load(&path)?;
            reporter.main(format!("Installing {}", record.name));
            activation::disable(roots, &mut record, reporter)?;
            activation::enable(roots, &mut record, reporter)?;
            info!("Installed {}", record.name);
            installed.push(record);
        }

        Ok(installed)
    }

    pub fn clean_up(
        StagedSource {
            is_staging,
            source_path,
            ..
        }: &StagedSource,
    ) {
        if !is_staging {
            return;
        }
        debug!("Cleaning up staging folder {source_path}");
        if let Err(e) = FileUtils::remove_path(source_path, &Silent) {
            warn!("Failed to clean up {source_path}: {e}");
        }
    }
}
