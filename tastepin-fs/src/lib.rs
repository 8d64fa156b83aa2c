//! Shared filesystem helpers built on `cap-std` and `camino`.
//!
//! Export files and catalog artefacts are addressed with UTF-8 paths; these
//! helpers resolve an ambient capability directory for each operation so the
//! rest of the workspace never touches raw `std::fs` paths.
#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use std::io::{self, Read};

/// Read a UTF-8 text file into a string.
pub fn read_utf8_file(path: &Utf8Path) -> io::Result<String> {
    let mut file = fs_utf8::File::open_ambient(path, ambient_authority())?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(content)
}

/// Read a file's raw bytes, for content hashing.
pub fn read_file_bytes(path: &Utf8Path) -> io::Result<Vec<u8>> {
    let mut file = fs_utf8::File::open_ambient(path, ambient_authority())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// List the regular files in a directory, sorted by name.
///
/// Entries whose names are not valid UTF-8 are skipped; no export file can
/// carry such a name.
pub fn dir_file_names(path: &Utf8Path) -> io::Result<Vec<String>> {
    let dir = fs_utf8::Dir::open_ambient_dir(path, ambient_authority())?;
    let mut names = Vec::new();
    for entry in dir.entries()? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Ok(name) = entry.file_name() else {
            continue;
        };
        names.push(name);
    }
    names.sort();
    Ok(names)
}

/// Copy a file, returning the number of bytes written.
pub fn copy_file(from: &Utf8Path, to: &Utf8Path) -> io::Result<u64> {
    let (from_dir, from_name) = open_dir_and_file(from)?;
    let (to_dir, to_name) = open_dir_and_file(to)?;
    from_dir.copy(from_name.as_str(), &to_dir, to_name.as_str())
}

/// Create `path` and any missing ancestors.
pub fn ensure_dir(path: &Utf8Path) -> io::Result<()> {
    let (base, relative) = base_dir_and_relative(path)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base.create_dir_all(relative.as_str())
}

/// Ensure the parent directory for `path` exists.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

/// Resolve an ambient directory for `path` and return it with the file name.
fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::other("path has no file name"))?;
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, name.to_owned()))
}

/// Split a path into an ambient base directory and a relative suffix.
fn base_dir_and_relative(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let (anchor, relative) = if path.has_root() {
        let relative = path
            .strip_prefix("/")
            .map_err(|_| io::Error::other("failed to strip root from absolute path"))?;
        (Utf8Path::new("/"), relative)
    } else {
        (Utf8Path::new("."), path)
    };
    let dir = fs_utf8::Dir::open_ambient_dir(anchor, ambient_authority())?;
    Ok((dir, relative.to_owned()))
}
