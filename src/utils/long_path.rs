//! Path normalisation shared by every filesystem touch.
//!
//! Two flavours exist and they are not interchangeable:
//! - [`resolve`] follows junctions. Use it for I/O targets and for
//!   "are these the same files" questions.
//! - [`extended`] / [`identity_key`] leave junctions alone. Use them when the
//!   *location* of an entry matters, e.g. deciding whether a mod is enabled.
use camino::{Utf8Path, Utf8PathBuf};

#[cfg(windows)]
const EXTENDED_PREFIX: &str = r"\\?\";
#[cfg(windows)]
const EXTENDED_UNC_PREFIX: &str = r"\\?\UNC\";

fn absolute(path: &Utf8Path) -> Utf8PathBuf {
    std::path::absolute(path)
        .ok()
        .and_then(|p| Utf8PathBuf::from_path_buf(p).ok())
        .unwrap_or_else(|| path.to_owned())
}

#[cfg(windows)]
fn add_marker(path: Utf8PathBuf) -> Utf8PathBuf {
    let s = path.as_str();
    if s.starts_with(EXTENDED_PREFIX) {
        return path;
    }
    match s.strip_prefix(r"\\") {
        Some(unc) => Utf8PathBuf::from(format!("{EXTENDED_UNC_PREFIX}{unc}")),
        None => Utf8PathBuf::from(format!("{EXTENDED_PREFIX}{s}")),
    }
}

#[cfg(not(windows))]
fn add_marker(path: Utf8PathBuf) -> Utf8PathBuf {
    path
}

#[cfg(windows)]
fn strip_marker(path: &Utf8Path) -> String {
    let s = path.as_str();
    if let Some(unc) = s.strip_prefix(EXTENDED_UNC_PREFIX) {
        return format!(r"\\{unc}");
    }
    s.strip_prefix(EXTENDED_PREFIX).unwrap_or(s).to_string()
}

#[cfg(not(windows))]
fn strip_marker(path: &Utf8Path) -> String {
    path.as_str().to_string()
}

/// Absolute path carrying the extended-length marker. Junctions are not followed.
pub fn extended(path: &Utf8Path) -> Utf8PathBuf {
    add_marker(absolute(path))
}

/// Like [`extended`] but every existing junction/symlink along the path is resolved.
/// Components that do not exist yet are re-appended verbatim.
pub fn resolve(path: &Utf8Path) -> Utf8PathBuf {
    let abs = absolute(path);
    let mut missing = Vec::new();
    let mut current: &Utf8Path = &abs;

    loop {
        if let Ok(canonical) = current.canonicalize_utf8() {
            let mut out = canonical;
            for part in missing.iter().rev() {
                out.push(part);
            }
            return add_marker(out);
        }

        match (current.parent(), current.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name);
                current = parent;
            }
            _ => return add_marker(abs.clone()),
        }
    }
}

/// Comparison key for a location: absolute, unresolved, marker stripped,
/// case folded where the filesystem ignores case.
pub fn identity_key(path: &Utf8Path) -> Utf8PathBuf {
    let plain = strip_marker(&absolute(path));
    #[cfg(windows)]
    let plain = plain.to_lowercase();
    Utf8PathBuf::from(plain)
}

/// True when `child` sits somewhere below `root` (not equal to it).
pub fn is_within(child: &Utf8Path, root: &Utf8Path) -> bool {
    let child = identity_key(child);
    let root = identity_key(root);
    child != root && child.starts_with(&root)
}

/// True when `child` is an immediate entry of `parent`.
pub fn is_direct_child(child: &Utf8Path, parent: &Utf8Path) -> bool {
    identity_key(child).parent() == Some(identity_key(parent).as_path())
}

/// True when both paths end up at the same place once junctions are followed.
pub fn same_resolved(a: &Utf8Path, b: &Utf8Path) -> bool {
    identity_key(&resolve(a)) == identity_key(&resolve(b))
}

/// Human friendly form for messages and persisted settings.
pub fn display(path: &Utf8Path) -> Utf8PathBuf {
    let simplified = dunce::simplified(path.as_std_path());
    Utf8Path::from_path(simplified)
        .map(Utf8Path::to_path_buf)
        .unwrap_or_else(|| path.to_owned())
}
