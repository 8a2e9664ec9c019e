use camino::Utf8PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SError {
    #[error("manifest not found at {0}")]
    ManifestMissing(Utf8PathBuf),
    #[error("manifest at {path} could not be parsed: {reason}")]
    ManifestCorrupt { path: Utf8PathBuf, reason: String },
    #[error("access denied: {0}")]
    AccessDenied(Utf8PathBuf),
    #[error("archive error: {0}")]
    ExtractionError(String),
    #[error("no mods found in {0}")]
    NoModsFound(Utf8PathBuf),
    #[error("destination is occupied by a real directory: {0}")]
    DestinationOccupied(Utf8PathBuf),
    #[error("source and destination are the same location: {0}")]
    SameLocation(Utf8PathBuf),
    #[error("simulator installation not found")]
    InstallationNotFound,
    #[error("{0} is not a simulator packages folder (needs Community and Official)")]
    InvalidPackagesPath(Utf8PathBuf),
    #[error("mod {0} not found")]
    ModNotFound(String),
    #[error("{0} is not set")]
    PathNotSet(&'static str),
    #[error("operation did not finish within {0} seconds")]
    Timeout(u64),
    #[error("I/O error: {0}")]
    IOError(String),
    #[error("parse error: {0}")]
    ParseError(String),
    #[error("config error: {0}")]
    ConfigError(String),
    #[error("worker failed: {0}")]
    AsyncRuntimeError(String),
}

impl From<std::io::Error> for SError {
    fn from(e: std::io::Error) -> Self {
        SError::IOError(e.to_string())
    }
}

impl From<walkdir::Error> for SError {
    fn from(e: walkdir::Error) -> Self {
        SError::IOError(e.to_string())
    }
}

impl From<serde_json::Error> for SError {
    fn from(e: serde_json::Error) -> Self {
        SError::ParseError(e.to_string())
    }
}

impl From<zip::result::ZipError> for SError {
    fn from(e: zip::result::ZipError) -> Self {
        SError::ExtractionError(e.to_string())
    }
}

impl From<confy::ConfyError> for SError {
    fn from(e: confy::ConfyError) -> Self {
        SError::ConfigError(e.to_string())
    }
}

impl From<camino::FromPathBufError> for SError {
    fn from(e: camino::FromPathBufError) -> Self {
        SError::ParseError(format!("Invalid UTF-8 path: {e}"))
    }
}

impl From<std::path::StripPrefixError> for SError {
    fn from(e: std::path::StripPrefixError) -> Self {
        SError::ParseError(e.to_string())
    }
}
