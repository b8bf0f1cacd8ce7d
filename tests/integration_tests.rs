//! Integration tests for datafinder
//!
//! These tests build real directory trees in temporary directories, register
//! folders against them and validate query results end to end.

use datafinder::{DataFinder, FinderError, QueryOptions, RegexPositions, RootCandidates};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SCENARIO_REGEX: &str = r"(?P<condition>\w{3})(?P<id>\d{3})_(?P<type>\w*)\.tif";

/// Setup context holding the temp directory handle
struct TestContext {
    root: PathBuf,
    sub: PathBuf,
    _temp_dir: TempDir, // Keep alive for test duration
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Root with a `sub` folder containing `ABC123_type.tif` and `DEF456_other.tif`
fn setup_scenario() -> TestContext {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();
    let sub = root.join("sub");
    // Written in reverse order so sorting is observable.
    write_file(&sub.join("DEF456_other.tif"), "test2");
    write_file(&sub.join("ABC123_type.tif"), "test");
    TestContext {
        root,
        sub,
        _temp_dir: temp_dir,
    }
}

#[test]
fn test_init_and_add_folders() {
    let ctx = setup_scenario();
    let finder = DataFinder::new([&ctx.sub], &ctx.root).unwrap();
    assert_eq!(finder.folders().len(), 1);
    assert!(finder.folders()[0].is_dir());
    assert!(finder.folders()[0].is_absolute());
}

#[test]
fn test_relative_folder_resolves_against_root() {
    let ctx = setup_scenario();
    let finder = DataFinder::new(["sub"], &ctx.root).unwrap();
    assert_eq!(finder.folders(), &[ctx.sub.clone()]);
}

#[test]
fn test_non_strict_drops_missing_folders() {
    let ctx = setup_scenario();
    let mut finder = DataFinder::with_root(&ctx.root).unwrap();
    finder
        .add_folders(["does_not_exist", "sub", "/no/such/absolute"], None, false)
        .unwrap();
    assert_eq!(finder.folders(), &[ctx.sub.clone()]);
}

#[test]
fn test_strict_missing_folder_keeps_earlier_entries() {
    let ctx = setup_scenario();
    let mut finder = DataFinder::with_root(&ctx.root).unwrap();

    let err = finder
        .add_folders(["sub", "does_not_exist", "sub"], None, true)
        .unwrap_err();
    assert!(err.is_configuration());
    match err {
        FinderError::FolderNotADirectory { path } => {
            assert_eq!(path, ctx.root.join("does_not_exist"))
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(finder.folders(), &[ctx.sub.clone()]);
}

#[test]
fn test_add_folders_with_root_switches_root_first() {
    let ctx = setup_scenario();
    let other = TempDir::new().unwrap();
    fs::create_dir(other.path().join("elsewhere")).unwrap();

    let mut finder = DataFinder::with_root(&ctx.root).unwrap();
    finder
        .add_folders(
            ["elsewhere"],
            Some(RootCandidates::from(vec![
                PathBuf::from("/no/such/root"),
                other.path().to_path_buf(),
            ])),
            true,
        )
        .unwrap();
    assert_eq!(finder.root(), other.path());
    assert_eq!(finder.folders(), &[other.path().join("elsewhere")]);
}

#[test]
fn test_query_with_regex() {
    let ctx = setup_scenario();
    let finder = DataFinder::new([&ctx.sub], &ctx.root).unwrap();
    let options =
        QueryOptions::new().positions(RegexPositions::new().pattern(0, SCENARIO_REGEX));

    let result = finder.query("*.tif", &options).unwrap();
    assert_eq!(result.len(), 2);
    for column in ["filename", "path", "suffix", "condition", "id", "type"] {
        assert!(result.columns().iter().any(|c| c == column), "{column}");
    }

    assert_eq!(
        result.column("filename"),
        vec![Some("ABC123_type.tif"), Some("DEF456_other.tif")]
    );
    assert_eq!(result.column("condition"), vec![Some("ABC"), Some("DEF")]);
    assert_eq!(result.column("id"), vec![Some("123"), Some("456")]);
    assert_eq!(result.column("type"), vec![Some("type"), Some("other")]);
    assert_eq!(result.column("suffix"), vec![Some(".tif"), Some(".tif")]);

    let first = result.get(0).unwrap();
    assert_eq!(first.path(), ctx.sub.join("ABC123_type.tif"));
}

#[test]
fn test_query_require_match_false() {
    let ctx = setup_scenario();
    let finder = DataFinder::new([&ctx.sub], &ctx.root).unwrap();
    let positions = RegexPositions::new().pattern(0, "^XXX");

    let kept = finder
        .query(
            "*.tif",
            &QueryOptions::new().positions(positions.clone()).require_match(false),
        )
        .unwrap();
    assert_eq!(kept.len(), 2);
    assert!(kept.rows().iter().all(|row| !row.contains("condition")));
    assert_eq!(kept.columns(), &["filename", "path", "suffix"]);

    let dropped = finder
        .query("*.tif", &QueryOptions::new().positions(positions))
        .unwrap();
    assert!(dropped.is_empty());
    assert!(!dropped.has_columns());
}

#[test]
fn test_zero_matches_is_columnless() {
    let ctx = setup_scenario();
    let finder = DataFinder::new([&ctx.sub], &ctx.root).unwrap();
    let result = finder.query("*.png", &QueryOptions::default()).unwrap();
    assert!(result.is_empty());
    assert!(!result.has_columns());
}

#[test]
fn test_no_folders_is_columnless() {
    let ctx = setup_scenario();
    let finder = DataFinder::with_root(&ctx.root).unwrap();
    let result = finder.query("*", &QueryOptions::default()).unwrap();
    assert!(!result.has_columns());
}

#[test]
fn test_rows_sorted_by_filename_across_folders() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_file(&root.join("b/zeta.txt"), "");
    write_file(&root.join("b/alpha.txt"), "");
    write_file(&root.join("a/mid.txt"), "");
    write_file(&root.join("a/nested/beta.txt"), "");

    let finder = DataFinder::new(["b", "a"], root).unwrap();
    let result = finder.query("*.txt", &QueryOptions::default()).unwrap();

    let names: Vec<&str> = result.rows().iter().map(|r| r.filename()).collect();
    assert_eq!(names, vec!["alpha.txt", "beta.txt", "mid.txt", "zeta.txt"]);
}

#[test]
fn test_sort_is_stable_for_equal_filenames() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_file(&root.join("second/same.txt"), "");
    write_file(&root.join("first/same.txt"), "");

    // Folder registration order decides the tie.
    let finder = DataFinder::new(["second", "first"], root).unwrap();
    let result = finder.query("*.txt", &QueryOptions::default()).unwrap();
    assert_eq!(result.rows()[0].path(), root.join("second/same.txt"));
    assert_eq!(result.rows()[1].path(), root.join("first/same.txt"));
}

#[test]
fn test_duplicate_folders_give_duplicate_rows() {
    let ctx = setup_scenario();
    let finder = DataFinder::new(["sub", "sub"], &ctx.root).unwrap();
    let result = finder.query("*.tif", &QueryOptions::default()).unwrap();
    assert_eq!(result.len(), 4);
}

#[test]
fn test_query_is_idempotent() {
    let ctx = setup_scenario();
    let finder = DataFinder::new([&ctx.sub], &ctx.root).unwrap();
    let options =
        QueryOptions::new().positions(RegexPositions::new().pattern(0, SCENARIO_REGEX));

    let first = finder.query("*.tif", &options).unwrap();
    let second = finder.query("*.tif", &options).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_classifier_labels() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_file(&root.join("data/Apple.txt"), "");
    write_file(&root.join("data/Banana.txt"), "");
    write_file(&root.join("data/Cherry.txt"), "");

    let finder = DataFinder::new(["data"], root).unwrap();
    let positions = RegexPositions::new().classifier(0, [("typeA", "^A"), ("typeB", "^B")]);
    let result = finder
        .query("*.txt", &QueryOptions::new().positions(positions))
        .unwrap();

    assert_eq!(result.len(), 3);
    assert_eq!(result.rows()[0].info(), Some("typeA"));
    assert_eq!(result.rows()[1].info(), Some("typeB"));
    assert!(!result.rows()[2].contains("info"));
    assert_eq!(result.column("info"), vec![Some("typeA"), Some("typeB"), None]);
}

#[test]
fn test_modulo_index_applies_to_filename() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    // Relative path sub/run/file_7.txt has three segments.
    write_file(&root.join("sub/run/file_7.txt"), "");

    let finder = DataFinder::new(["sub"], root).unwrap();
    let positions = RegexPositions::new().pattern(3, r"file_(?P<n>\d)");
    let result = finder
        .query("*.txt", &QueryOptions::new().positions(positions))
        .unwrap();
    assert_eq!(result.rows()[0].get("n"), Some("7"));
}

#[test]
fn test_directory_positions_per_file_depth() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_file(&root.join("exp/ctrl/day1/a.txt"), "");
    write_file(&root.join("exp/trt/b.txt"), "");

    let finder = DataFinder::new(["exp"], root).unwrap();
    // -1 is always the outermost segment, whatever the depth.
    let positions = RegexPositions::new()
        .pattern(-1, r"(?P<experiment>exp)")
        .classifier(-2, [("control", "ctrl"), ("treated", "trt")]);
    let result = finder
        .query("*.txt", &QueryOptions::new().positions(positions))
        .unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result.column("experiment"), vec![Some("exp"), Some("exp")]);
    assert_eq!(result.column("info"), vec![Some("control"), Some("treated")]);
}

#[test]
fn test_verbose_does_not_change_results() {
    let ctx = setup_scenario();
    let finder = DataFinder::new([&ctx.sub], &ctx.root).unwrap();
    let positions = RegexPositions::new().pattern(0, SCENARIO_REGEX);

    let quiet = finder
        .query("*.tif", &QueryOptions::new().positions(positions.clone()))
        .unwrap();
    let loud = finder
        .query("*.tif", &QueryOptions::new().positions(positions).verbose(true))
        .unwrap();
    assert_eq!(quiet, loud);
}

#[test]
fn test_folder_removed_after_registration_yields_nothing() {
    let ctx = setup_scenario();
    let finder = DataFinder::new([&ctx.sub], &ctx.root).unwrap();
    fs::remove_dir_all(&ctx.sub).unwrap();

    let result = finder.query("*.tif", &QueryOptions::default()).unwrap();
    assert!(!result.has_columns());
}

#[test]
fn test_invalid_regex_is_pattern_error() {
    let ctx = setup_scenario();
    let finder = DataFinder::new([&ctx.sub], &ctx.root).unwrap();
    let options = QueryOptions::new().positions(RegexPositions::new().pattern(0, "(?P<open"));
    let err = finder.query("*.tif", &options).unwrap_err();
    assert!(matches!(err, FinderError::Pattern { .. }));
}

#[test]
fn test_json_output_shape() {
    let ctx = setup_scenario();
    let finder = DataFinder::new([&ctx.sub], &ctx.root).unwrap();
    let options =
        QueryOptions::new().positions(RegexPositions::new().pattern(0, SCENARIO_REGEX));
    let result = finder.query("*.tif", &options).unwrap();

    let json = serde_json::to_value(&result).unwrap();
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["condition"], "ABC");
    assert_eq!(rows[1]["type"], "other");
}

#[cfg(unix)]
#[test]
fn test_symlinked_file_is_returned() {
    let ctx = setup_scenario();
    write_file(&ctx.root.join("store/real.tif"), "linked");
    std::os::unix::fs::symlink(ctx.root.join("store/real.tif"), ctx.sub.join("linked.tif"))
        .unwrap();

    let finder = DataFinder::new(["sub"], &ctx.root).unwrap();
    let result = finder.query("*.tif", &QueryOptions::default()).unwrap();

    assert_eq!(
        result.column("filename"),
        vec![
            Some("ABC123_type.tif"),
            Some("DEF456_other.tif"),
            Some("linked.tif")
        ]
    );
    assert_eq!(result.rows()[2].path(), ctx.sub.join("linked.tif"));
}

#[test]
fn test_invalid_glob_is_pattern_error() {
    let ctx = setup_scenario();
    let finder = DataFinder::new(["sub", "sub"], &ctx.root).unwrap();
    let err = finder
        .query("[unclosed", &QueryOptions::default())
        .unwrap_err();
    assert!(matches!(err, FinderError::Glob { .. }));
}
