use std::fs;
use std::path::{Path, PathBuf};

/// Temporary sibling of `path` used while a comment block is being written.
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.argrecord-{}", std::process::id()))
}

/// Replaces `path` in one rename so readers never see a half-written header.
pub fn atomic_write_file(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let staging = staging_path(path);
    if let Err(err) = fs::write(&staging, content).and_then(|_| fs::rename(&staging, path)) {
        let _ = fs::remove_file(&staging);
        return Err(err);
    }
    Ok(())
}

/// Moves an existing file aside so its previous content survives the next
/// write. Returns false when there was nothing to move.
pub fn backup_by_rename(path: &Path, backup: &Path) -> std::io::Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    fs::rename(path, backup)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_replace_content_and_leave_no_staging_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("out.txt");
        fs::write(&path, "old").expect("seed");

        atomic_write_file(&path, b"new").expect("write");
        assert_eq!(fs::read_to_string(&path).expect("read"), "new");
        let entries: Vec<_> = fs::read_dir(dir.path())
            .expect("read dir")
            .map(|entry| entry.expect("entry").file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("out.txt")]);
    }

    #[test]
    fn backup_moves_only_existing_files() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("out.txt");
        let backup = dir.path().join("out.txt.bak");
        assert!(!backup_by_rename(&path, &backup).expect("missing"));

        fs::write(&path, "kept").expect("seed");
        assert!(backup_by_rename(&path, &backup).expect("backup"));
        assert!(!path.exists());
        assert_eq!(fs::read_to_string(&backup).expect("read"), "kept");
    }
}
