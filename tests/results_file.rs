use std::path::PathBuf;

use prac_bench::{
    io_util::ReadError,
    results::{update_results_file, Outcome, ResultsFile, ResultsKey, HEADER},
};

fn scratch_file(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("prac-bench-{name}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("results.txt");
    std::fs::write(&path, contents).unwrap();
    path
}

fn cleanup(path: &PathBuf) {
    std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
}

#[test]
fn averages_into_existing_row() {
    let path = scratch_file(
        "update",
        "DS OP is_optimized heapsize y pm y-err\n\
         mnist insert 1 1024 30.0 ± 0.0\n\
         mnist extract 1 1024 70.0 ± 2.5\n",
    );
    let outcome = update_results_file(
        &path,
        ResultsKey::new("mnist", "extract", "1", "1024"),
        80.,
    )
    .unwrap();
    assert_eq!(outcome, Outcome::Updated);
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "DS OP is_optimized heapsize y pm y-err\n\
         mnist insert 1 1024 30.0 ± 0.0\n\
         mnist extract 1 1024 75.0 ± 5.0\n"
    );
    cleanup(&path);
}

#[test]
fn repeated_samples_keep_halving_towards_latest() {
    let path = scratch_file("repeat", &format!("{HEADER}\n"));
    let key = || ResultsKey::new("cifar", "insert", "0", "64");
    assert_eq!(update_results_file(&path, key(), 10.).unwrap(), Outcome::Appended);
    assert_eq!(update_results_file(&path, key(), 20.).unwrap(), Outcome::Updated);
    assert_eq!(update_results_file(&path, key(), 5.).unwrap(), Outcome::Updated);
    let file = ResultsFile::load(&path).unwrap();
    assert_eq!(file.rows.len(), 1);
    // (10 + 20) / 2 = 15, then (15 + 5) / 2 = 10, |10 - 5| = 5
    assert_eq!(file.rows[0].y, 10.);
    assert_eq!(file.rows[0].y_err, 5.);
    cleanup(&path);
}

#[test]
fn appends_after_existing_rows() {
    let original = "DS OP is_optimized heapsize y pm y-err\n\
                    b op 0 8 1.5 ± 0.25\n\
                    a op 0 8 2.0 ± 0.0\n";
    let path = scratch_file("append", original);
    let outcome =
        update_results_file(&path, ResultsKey::new("c", "op", "1", "8"), 3.25).unwrap();
    assert_eq!(outcome, Outcome::Appended);
    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents, format!("{original}c op 1 8 3.25 ± 0.0\n"));
    cleanup(&path);
}

#[test]
fn missing_results_file_is_reported_as_not_found() {
    let path = std::env::temp_dir().join("prac-bench-no-such-dir/results.txt");
    let err = update_results_file(&path, ResultsKey::new("a", "b", "0", "1"), 1.).unwrap_err();
    match err.downcast_ref::<ReadError>() {
        Some(ReadError::NotFound(p)) => assert_eq!(p, &path),
        _ => panic!("expected ReadError::NotFound, got {err:#}"),
    }
}

#[test]
fn malformed_row_leaves_file_untouched() {
    let original = "DS OP is_optimized heapsize y pm y-err\nonly three fields\n";
    let path = scratch_file("malformed", original);
    assert!(update_results_file(&path, ResultsKey::new("a", "b", "0", "1"), 1.).is_err());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    cleanup(&path);
}

#[test]
fn updates_through_symlink() {
    let real = scratch_file("symlink", &format!("{HEADER}\n"));
    let link = real.with_file_name("link.txt");
    std::os::unix::fs::symlink(&real, &link).unwrap();
    let outcome = update_results_file(&link, ResultsKey::new("a", "op", "1", "16"), 2.).unwrap();
    assert_eq!(outcome, Outcome::Appended);
    assert!(link.symlink_metadata().unwrap().file_type().is_symlink());
    assert_eq!(
        std::fs::read_to_string(&real).unwrap(),
        format!("{HEADER}\na op 1 16 2.0 ± 0.0\n")
    );
    cleanup(&real);
}
