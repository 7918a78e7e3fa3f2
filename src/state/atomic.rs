//! Crash-safe file replacement.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Sibling of `path` used while writing, `<name>.tmp`.
pub fn temp_path(path: &Path) -> io::Result<PathBuf> {
    let mut name = path
        .file_name()
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no file name", path.display()),
            )
        })?
        .to_os_string();
    name.push(".tmp");
    Ok(path.with_file_name(name))
}

/// Replace `path` with `contents` so a kill at any point leaves either the
/// old or the new file.
///
/// The content is written and synced to a temporary sibling, which takes over
/// the permissions of an existing file before it is renamed over it.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let temp = temp_path(path)?;
    let mut file = File::create(&temp)?;
    file.write_all(contents)?;
    if let Ok(meta) = fs::metadata(path) {
        file.set_permissions(meta.permissions())?;
    }
    file.sync_all()?;
    drop(file);
    fs::rename(&temp, path)
}
