use crate::core::archive::ArchiveBackend;
use crate::models::error::SError;
use crate::models::task_status::Reporter;
use crate::utils::file::FileUtils;
use crate::utils::long_path;
use crate::utils::time::get_unix_timestamp;
use camino::{Utf8Path, Utf8PathBuf};
use tracing::{info, instrument};

/// `community-backup-<unix timestamp>.zip`
pub fn default_backup_name() -> String {
    format!("community-backup-{}.zip", get_unix_timestamp())
}

/// Archives the whole Community folder into `destination`, replacing any
/// existing file there. Linked mods are archived with their real contents.
#[instrument(skip(backend, reporter))]
pub fn create_backup(
    community: &Utf8Path,
    destination: &Utf8Path,
    backend: &dyn ArchiveBackend,
    reporter: &dyn Reporter,
) -> Result<Utf8PathBuf, SError> {
    let size = FileUtils::human_readable_size(FileUtils::path_size(community));
    let message = format!(
        "Creating archive {} of {} ({size} uncompressed).\nThis will almost certainly take a while.",
        long_path::display(destination),
        long_path::display(community)
    );
    info!("{message}");
    reporter.main(message);

    FileUtils::remove_path(destination, reporter)?;

    backend
        .create(&long_path::extended(community), destination, reporter)
        .map_err(|e| match e {
            SError::ExtractionError(_) => e,
            other => SError::ExtractionError(other.to_string()),
        })
}
