use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// Reported to the user as a one-line message, not as a failure
    /// with backtrace
    #[error("file {0:?} not found")]
    NotFound(PathBuf),
    #[error("reading file {0:?}: {1}")]
    IO(PathBuf, std::io::Error),
}

/// Read a whole text file, distinguishing the missing-file case.
pub fn read_text_file(path: &Path) -> Result<String, ReadError> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ReadError::NotFound(path.into()),
        _ => ReadError::IO(path.into(), e),
    })
}

#[test]
fn t_read_missing_file() {
    let path = std::env::temp_dir().join("prac-bench-surely-missing/results.txt");
    match read_text_file(&path) {
        Err(ReadError::NotFound(p)) => assert_eq!(p, path),
        other => panic!("expected NotFound, got {other:?}"),
    }
}
