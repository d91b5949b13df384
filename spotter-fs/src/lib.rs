//! Filesystem helpers for the Spotter CLI built on `cap-std` and `camino`.
//!
//! Paths are UTF-8 and every open goes through a capability handle obtained
//! with ambient authority.
#![forbid(unsafe_code)]

use std::io;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

/// Open a UTF-8 file path for reading using ambient authority.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Return whether `path` exists and is a regular file.
///
/// A missing file or parent directory surfaces as an
/// [`io::ErrorKind::NotFound`] error rather than `Ok(false)`.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_parent_dir(path)?;
    dir.metadata(name).map(|meta| meta.is_file())
}

/// Create any missing directories above `path`.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent().filter(|dir| !dir.as_str().is_empty()) else {
        return Ok(());
    };
    let (anchor, relative) = split_anchor(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    anchor.create_dir_all(relative)
}

fn open_parent_dir(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, &str)> {
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{path} does not name a file"),
        )
    })?;
    let parent = match path.parent() {
        Some(dir) if !dir.as_str().is_empty() => dir,
        _ => Utf8Path::new("."),
    };
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, name))
}

/// Split `path` into an opened anchor directory and the remainder below it.
///
/// Absolute paths anchor at their root, including any Windows drive or UNC
/// prefix; relative paths anchor at the current directory.
fn split_anchor(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let mut anchor = Utf8PathBuf::new();
    let mut relative = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::Prefix(_) | Utf8Component::RootDir
                if relative.as_str().is_empty() =>
            {
                anchor.push(component);
            }
            _ => relative.push(component),
        }
    }
    if anchor.as_str().is_empty() {
        anchor.push(".");
    }
    let dir = fs_utf8::Dir::open_ambient_dir(&anchor, ambient_authority())?;
    Ok((dir, relative))
}
