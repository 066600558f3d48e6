use std::path::PathBuf;

use super::*;
use crate::app::models::{RunSheet, RunSheetHeader};
use crate::app::services::sample_locator::{LookupCache, format_run_number};
use crate::{Error, ErrorCategory};

#[test]
fn test_format_run_number() {
    assert_eq!(format_run_number(42, 4), "0042");
    assert_eq!(format_run_number(7, 6), "000007");
    assert_eq!(format_run_number(12345, 4), "12345");
}

#[test]
fn test_load_last_duplicate_wins() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("lookup.csv");
    write_lookup(
        &path,
        &[
            ("0042", "/data/old.xlsx"),
            ("0043", "/data/run43.xlsx"),
            ("0042", "/data/run42.xlsx"),
        ],
    );

    let cache = LookupCache::load(&path).unwrap();
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get("0042"), Some(Path::new("/data/run42.xlsx")));
    assert_eq!(cache.get("42"), None);
}

#[test]
fn test_load_resolves_relative_paths_and_skips_short_rows() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("lookup.csv");
    std::fs::write(&path, "0042,run42.xlsx\n0050\n, \n").unwrap();

    let cache = LookupCache::load(&path).unwrap();
    assert_eq!(cache.len(), 1);
    assert_eq!(
        cache.get("0042"),
        Some(temp_dir.path().join("run42.xlsx").as_path())
    );
}

#[test]
fn test_load_missing_file() {
    let temp_dir = TempDir::new().unwrap();

    let path = temp_dir.path().join("lookup.csv");

    let err = LookupCache::load(&path).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Lookup);
    match err {
        Error::LookupCache {
            path: reported,
            source,
            ..
        } => {
            assert_eq!(reported, path.to_string_lossy());
            assert!(source.is_some());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_write_to_missing_directory_names_the_cache() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing").join("lookup.csv");

    let err = LookupCache::default().write(&path).unwrap_err();
    assert!(matches!(err, Error::LookupCache { ref path, .. } if path.ends_with("lookup.csv")));
}

#[test]
fn test_write_then_load() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("lookup.csv");

    let runs = [
        ("0002", "/runs/b.xlsx"),
        ("0001", "/runs/a.xlsx"),
        ("", "/runs/c.xlsx"),
    ];
    let sheets: Vec<RunSheet> = runs
        .into_iter()
        .map(|(run_number, file)| RunSheet {
            filename: file.to_string(),
            header: RunSheetHeader {
                run_number: run_number.to_string(),
                ..RunSheetHeader::default()
            },
            samples: Vec::new(),
        })
        .collect();

    let cache = LookupCache::from_run_sheets(&sheets);
    assert_eq!(cache.len(), 2);
    cache.write(&path).unwrap();

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "0001,/runs/a.xlsx\n0002,/runs/b.xlsx\n"
    );
    let reloaded = LookupCache::load(&path).unwrap();
    assert_eq!(reloaded, cache);
    assert_eq!(
        reloaded.iter().map(|(key, _)| key).collect::<Vec<_>>(),
        vec!["0001", "0002"]
    );
    assert_eq!(reloaded.get("0002"), Some(PathBuf::from("/runs/b.xlsx").as_path()));
}
