use std::fs;

use doccreft_engine::{ensure_download_dir, DownloadStore};
use tempfile::TempDir;

#[test]
fn creates_missing_download_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("downloads").join("nested");
    assert!(!new_dir.exists());
    ensure_download_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn saving_twice_replaces_the_first_copy() {
    let temp = TempDir::new().unwrap();
    let store = DownloadStore::new(temp.path());

    let first = store.save("DocCreft_Export.pdf", b"%PDF-1").unwrap();
    assert_eq!(first.file_name().unwrap(), "DocCreft_Export.pdf");
    assert_eq!(fs::read(&first).unwrap(), b"%PDF-1");

    let second = store.save("DocCreft_Export.pdf", b"%PDF-2").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read(&second).unwrap(), b"%PDF-2");
}

#[test]
fn unsafe_names_stay_inside_the_store() {
    let temp = TempDir::new().unwrap();
    let store = DownloadStore::new(temp.path().join("out"));

    let saved = store.save("../escape.jpg", b"jpeg").unwrap();
    assert_eq!(saved.parent().unwrap(), store.dir());
    assert!(!temp.path().join("escape.jpg").exists());
}

#[test]
fn file_in_place_of_dir_is_an_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let store = DownloadStore::new(file_path.clone());
    assert!(store.save("doc.pdf", b"data").is_err());
    assert!(!file_path.with_file_name("doc.pdf").exists());
}

#[test]
fn failed_save_keeps_what_was_there() {
    let temp = TempDir::new().unwrap();
    let store = DownloadStore::new(temp.path());
    let occupied = temp.path().join("report.pdf");
    fs::create_dir(&occupied).unwrap();
    fs::write(occupied.join("inner.txt"), b"keep").unwrap();

    assert!(store.save("report.pdf", b"%PDF-3").is_err());
    assert_eq!(fs::read(occupied.join("inner.txt")).unwrap(), b"keep");

    let leftovers: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(leftovers, vec![std::ffi::OsString::from("report.pdf")]);
}
