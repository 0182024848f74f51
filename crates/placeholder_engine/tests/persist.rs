use std::fs;

use placeholder_engine::{
    ensure_output_dir, ArchiveDelivery, AtomicFileWriter, DirectoryDelivery, PersistError,
};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out").join("nested");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn output_dir_that_is_a_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("occupied");
    fs::write(&file_path, "x").unwrap();

    let result = ensure_output_dir(&file_path);
    assert!(matches!(result, Err(PersistError::OutputDir(_))));
}

#[test]
fn atomic_write_replaces_existing() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("placeholder-images.zip", b"first").unwrap();
    assert_eq!(first.file_name().unwrap(), "placeholder-images.zip");
    assert_eq!(fs::read(&first).unwrap(), b"first");

    let second = writer.write("placeholder-images.zip", b"second").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read(&second).unwrap(), b"second");

    // Only the target remains; the temp file was renamed over it.
    let names: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(names.len(), 1);
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("placeholder-images.zip", b"data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("placeholder-images.zip").exists());
}

#[test]
fn file_names_with_separators_are_rejected() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    for name in ["", "../escape.zip", "nested/out.zip", "win\\out.zip"] {
        let result = writer.write(name, b"data");
        assert!(
            matches!(result, Err(PersistError::FileName(_))),
            "{name:?} should be rejected"
        );
    }
}

#[test]
fn directory_delivery_saves_into_output_dir() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("downloads");
    let delivery = DirectoryDelivery::new(output.clone());

    let path = delivery.deliver("placeholder-images.zip", b"PK").unwrap();

    assert_eq!(delivery.output_dir(), output.as_path());
    assert_eq!(path, output.join("placeholder-images.zip"));
    assert_eq!(fs::read(path).unwrap(), b"PK");
}
