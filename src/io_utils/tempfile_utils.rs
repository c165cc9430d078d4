//! Whole-file replacement via a temporary sibling file and rename.

use std::{
    fmt::Write as _,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
};

use nix::unistd::{getpid, gettid};

use crate::info;

#[derive(Debug, thiserror::Error)]
pub enum TempfileError {
    #[error("path is missing file name part")]
    MissingFileName,
    #[error("IO error while {0} {1:?}: {2:#}")]
    IOError(&'static str, PathBuf, std::io::Error),
}

/// Append a suffix `.tmp~..-..` where the numbers are pid and tid
pub fn temp_path(target_path: impl AsRef<Path>) -> Result<PathBuf, TempfileError> {
    let target_path = target_path.as_ref();
    let file_name = target_path
        .file_name()
        .ok_or(TempfileError::MissingFileName)?;
    let mut file_name = file_name.to_string_lossy().into_owned();
    let pid = getpid();
    let tid = gettid();
    write!(&mut file_name, ".tmp~{pid}-{tid}").expect("nofail: no IO");
    Ok(target_path.with_file_name(file_name))
}

/// The file a write to `path` should end up in: symlinks resolved,
/// or `path` unchanged if it does not exist yet.
fn resolve_target(path: &Path) -> Result<PathBuf, TempfileError> {
    match std::fs::canonicalize(path) {
        Ok(resolved) => Ok(resolved),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(path.into()),
            _ => Err(TempfileError::IOError("resolving", path.into(), e)),
        },
    }
}

/// Writes `contents` to a temporary file next to `target_path`, then
/// renames it over `target_path`. Readers never see a partially
/// written file. If `target_path` is a symlink, the file it points to
/// is replaced and the link stays. If the target exists, its
/// permissions are copied to the new file.
pub fn replace_file_contents(
    target_path: impl AsRef<Path>,
    contents: &[u8],
) -> Result<(), TempfileError> {
    let target_path = &resolve_target(target_path.as_ref())?;
    let tempfile = Tempfile {
        temp_path: temp_path(target_path)?,
        finished: false,
    };
    std::fs::write(&tempfile.temp_path, contents).map_err(|e| {
        TempfileError::IOError("writing temporary file", tempfile.temp_path.clone(), e)
    })?;
    match target_path.metadata() {
        Ok(meta) => {
            let mode = meta.permissions().mode();
            std::fs::set_permissions(&tempfile.temp_path, std::fs::Permissions::from_mode(mode))
                .map_err(|e| {
                    TempfileError::IOError(
                        "copying permissions to",
                        tempfile.temp_path.clone(),
                        e,
                    )
                })?;
        }
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => (),
            _ => {
                return Err(TempfileError::IOError(
                    "getting metadata on",
                    target_path.into(),
                    e,
                ))
            }
        },
    }
    tempfile.finish(target_path)
}

/// Deletes the temporary file on drop unless `finish` succeeded.
struct Tempfile {
    temp_path: PathBuf,
    finished: bool,
}

impl Tempfile {
    fn finish(mut self, target_path: &Path) -> Result<(), TempfileError> {
        std::fs::rename(&self.temp_path, target_path)
            .map_err(|e| TempfileError::IOError("renaming to", target_path.into(), e))?;
        self.finished = true;
        Ok(())
    }
}

impl Drop for Tempfile {
    fn drop(&mut self) {
        if !self.finished {
            match std::fs::remove_file(&self.temp_path) {
                Ok(()) => (),
                Err(e) => match e.kind() {
                    std::io::ErrorKind::NotFound => (),
                    _ => info!(
                        "error deleting temporary file {:?}: {e:#}",
                        self.temp_path
                    ),
                },
            }
        }
    }
}

#[test]
fn t_temp_path() {
    let p = temp_path("/tmp/foo/results.txt").unwrap();
    let s = p.to_string_lossy();
    assert!(s.starts_with("/tmp/foo/results.txt.tmp~"), "{s}");
    assert!(temp_path("/").is_err());
}

#[test]
fn t_replace_file_contents() {
    let dir = std::env::temp_dir().join(format!("prac-bench-t-replace-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let target = dir.join("out.txt");
    std::fs::write(&target, "old contents\n").unwrap();
    replace_file_contents(&target, b"new\n").unwrap();
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "new\n");
    let leftovers: Vec<_> = std::fs::read_dir(&dir)
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .filter(|n| n.to_string_lossy().contains(".tmp~"))
        .collect();
    assert!(leftovers.is_empty(), "{leftovers:?}");
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn t_replace_through_symlink() {
    let dir = std::env::temp_dir().join(format!("prac-bench-t-symlink-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let real = dir.join("real.txt");
    let link = dir.join("link.txt");
    std::fs::write(&real, "old\n").unwrap();
    std::os::unix::fs::symlink(&real, &link).unwrap();
    replace_file_contents(&link, b"new\n").unwrap();
    assert!(link.symlink_metadata().unwrap().file_type().is_symlink());
    assert_eq!(std::fs::read_to_string(&real).unwrap(), "new\n");
    std::fs::remove_dir_all(&dir).unwrap();
}
