//! Capability-based filesystem helpers shared by the TripWeaver crates.
//!
//! Paths are UTF-8 (`camino`) and every operation resolves an ambient
//! directory handle first, then acts relative to it through `cap-std`.
#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use std::io;
use std::path::Component;

/// Open the directory containing `path` and return it with the file name.
///
/// # Errors
/// Fails when `path` has no file name or its parent cannot be opened.
pub fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Create `dir` and any missing ancestors.
///
/// # Errors
/// Propagates I/O failures from opening the base directory or creating the
/// missing components.
pub fn ensure_dir(dir: &Utf8Path) -> io::Result<()> {
    if dir.as_str().is_empty() {
        return Ok(());
    }
    let (base, relative) = base_dir_and_relative(dir)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base.create_dir_all(&relative)
}

/// Create the parent directory of `path` when it is missing.
///
/// # Errors
/// See [`ensure_dir`].
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    path.parent().map_or(Ok(()), ensure_dir)
}

/// Report whether `path` names an existing regular file.
///
/// A missing file or parent directory yields `Ok(false)`.
///
/// # Errors
/// Returns other I/O failures, such as permission errors.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = match open_dir_and_file(path) {
        Ok(found) => found,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };
    match dir.metadata(name.as_str()) {
        Ok(meta) => Ok(meta.is_file()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

/// Read the whole file at `path`.
///
/// # Errors
/// Propagates I/O failures, including `NotFound`.
pub fn read_bytes(path: &Utf8Path) -> io::Result<Vec<u8>> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.read(name.as_str())
}

/// Read the whole file at `path` as UTF-8 text.
///
/// # Errors
/// Propagates I/O failures and invalid UTF-8.
pub fn read_string(path: &Utf8Path) -> io::Result<String> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.read_to_string(name.as_str())
}

/// Replace the file at `path` with `contents` in one rename.
///
/// The bytes are written to a hidden sibling first and renamed over the
/// target, so readers see either the previous file or the new one. The
/// parent directory is created when missing.
///
/// # Errors
/// Propagates I/O failures from creating the directory, writing the
/// temporary file or renaming it.
pub fn write_atomic(path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_dir_and_file(path)?;
    let staging = format!(".{name}.tmp");
    dir.write(staging.as_str(), contents)?;
    if let Err(err) = dir.rename(staging.as_str(), &dir, name.as_str()) {
        // Best effort: a stale staging file is overwritten on the next write.
        let _cleanup = dir.remove_file(staging.as_str());
        return Err(err);
    }
    Ok(())
}

/// Split `path` into an ambient base directory and the remainder below it.
///
/// Absolute paths are anchored at their root (or drive prefix on Windows);
/// relative paths are anchored at the current directory.
///
/// # Errors
/// Fails when the base directory cannot be opened or the path is not UTF-8.
pub fn base_dir_and_relative(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let std_path = path.as_std_path();
    let base = match std_path.components().next() {
        Some(Component::Prefix(prefix)) => {
            let prefix = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;
            Utf8PathBuf::from(prefix).join(std::path::MAIN_SEPARATOR.to_string())
        }
        Some(Component::RootDir) => Utf8PathBuf::from(std::path::MAIN_SEPARATOR.to_string()),
        _ => Utf8PathBuf::from("."),
    };
    let relative = if base == "." {
        path.to_path_buf()
    } else {
        path.strip_prefix(&base)
            .map_err(|_| io::Error::other(format!("cannot anchor {path} at {base}")))?
            .to_path_buf()
    };
    let dir = fs_utf8::Dir::open_ambient_dir(&base, ambient_authority())?;
    Ok((dir, relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().expect("create temporary directory")
    }

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp path")
    }

    #[rstest]
    fn atomic_write_creates_parents_and_replaces(temp_dir: TempDir) {
        let target = utf8(&temp_dir).join("nested/model/blob.bin");
        write_atomic(&target, b"first").expect("first write");
        write_atomic(&target, b"second").expect("second write");
        assert_eq!(read_bytes(&target).expect("read back"), b"second");
        let staging = utf8(&temp_dir).join("nested/model/.blob.bin.tmp");
        assert!(!file_is_file(&staging).expect("stat staging"));
    }

    #[rstest]
    fn missing_file_is_not_a_file(temp_dir: TempDir) {
        let target = utf8(&temp_dir).join("absent/file.json");
        assert!(!file_is_file(&target).expect("stat missing"));
    }

    #[rstest]
    fn reads_text(temp_dir: TempDir) {
        let target = utf8(&temp_dir).join("request.json");
        write_atomic(&target, br#"{"info":{}}"#).expect("write");
        assert_eq!(read_string(&target).expect("read"), r#"{"info":{}}"#);
    }

    #[rstest]
    fn directory_is_not_a_file(temp_dir: TempDir) {
        let dir = utf8(&temp_dir).join("models");
        ensure_dir(&dir).expect("create dir");
        assert!(!file_is_file(&dir).expect("stat dir"));
    }
}
