//! Atomic file replacement
//!
//! # Pattern
//!
//! 1. Write the new content to a sibling `.tmp` file
//! 2. Call sync_all() to flush to disk
//! 3. Rename the temp file over the final path
//!
//! A reader of the final path sees either the old snapshot or the new one,
//! never a partial write.
//!
//! Appends go through `append_synced`, which syncs before returning but
//! can leave a partial tail if the process dies mid-write; readers of an
//! appended file need their own way to spot one.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Temp file used while replacing `path`
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Atomically replace `path` with whatever `write_fn` writes
///
/// The writer is buffered; `write_fn` should not flush it.
pub fn atomic_write_with<P, F>(path: P, write_fn: F) -> io::Result<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let path = path.as_ref();
    let temp_path = temp_path_for(path);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(&temp_path)?;
    let mut writer = BufWriter::new(file);
    write_fn(&mut writer)?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;

    fs::rename(&temp_path, path)?;
    Ok(())
}

/// Append `bytes` to `path`, creating it if needed, and sync to disk
pub fn append_synced<P: AsRef<Path>>(path: P, bytes: &[u8]) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(bytes)?;
    file.sync_data()
}

/// Remove a temp file left behind by an interrupted write
///
/// Returns whether a file was removed.
pub fn cleanup_temp_file<P: AsRef<Path>>(path: P) -> io::Result<bool> {
    let temp_path = temp_path_for(path.as_ref());
    if !temp_path.exists() {
        return Ok(false);
    }
    fs::remove_file(&temp_path)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_with() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bracket.jsonl");

        atomic_write_with(&path, |w| {
            writeln!(w, "Line 1")?;
            writeln!(w, "Line 2")?;
            Ok(())
        })
        .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "Line 1\nLine 2\n");
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("data.jsonl");

        atomic_write_with(&path, |w| w.write_all(b"x")).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_failed_write_keeps_old_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.jsonl");
        fs::write(&path, "old").unwrap();

        let result = atomic_write_with(&path, |_| Err(io::Error::new(io::ErrorKind::Other, "boom")));
        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
    }

    #[test]
    fn test_cleanup_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.jsonl");
        fs::write(temp_path_for(&path), "partial").unwrap();

        assert!(cleanup_temp_file(&path).unwrap());
        assert!(!cleanup_temp_file(&path).unwrap());
        assert_eq!(temp_path_for(&path), temp_dir.path().join("data.jsonl.tmp"));
    }

    #[test]
    fn test_append_synced_extends_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("journal.jsonl");

        append_synced(&path, b"one\n").unwrap();
        append_synced(&path, b"two\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }
}
