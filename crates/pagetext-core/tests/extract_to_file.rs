//! End-to-end tests for [`Extractor::run`].
//!
//! A [`MockBackend`] stands in for the PDF parser so these tests exercise the
//! file handling, page bounding and failure isolation without a real PDF.

use std::fs;
use std::path::Path;

use pagetext_core::mock::{MockBackend, MockPage};
use pagetext_core::render::marker_numbers;
use pagetext_core::{ExtractConfig, ExtractError, Extractor, extract_to_file};

/// Write a placeholder source file and return a config pointing into `dir`.
fn setup(dir: &Path, page_limit: usize) -> ExtractConfig {
    let source = dir.join("book.pdf");
    fs::write(&source, b"%PDF-1.7 placeholder").unwrap();
    ExtractConfig::new(source)
        .with_destination(dir.join("book_content.txt"))
        .with_page_limit(page_limit)
}

fn numbered_pages(count: usize) -> MockBackend {
    MockBackend::new(
        (1..=count)
            .map(|n| MockPage::Text(format!("text of page {n}")))
            .collect(),
    )
}

#[test]
fn marker_count_is_min_of_limit_and_pages() {
    for (total, limit) in [(3, 50), (60, 50), (50, 50), (7, 2), (1, 1)] {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(dir.path(), limit);
        let backend = numbered_pages(total);

        let report = extract_to_file(&config, &backend).unwrap();
        let expected = total.min(limit);
        assert_eq!(report.pages_processed, expected);
        assert_eq!(report.total_pages, total);

        let output = fs::read_to_string(&config.destination_path).unwrap();
        assert_eq!(
            marker_numbers(&output),
            (1..=expected).collect::<Vec<_>>(),
            "total={total} limit={limit}"
        );
    }
}

#[test]
fn zero_page_document_writes_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), 50);
    let backend = MockBackend::new(Vec::new());

    let report = extract_to_file(&config, &backend).unwrap();
    assert_eq!(report.pages_processed, 0);
    assert_eq!(report.bytes_written, 0);
    assert_eq!(fs::read_to_string(&config.destination_path).unwrap(), "");
}

#[test]
fn zero_page_limit_writes_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), 0);
    let backend = numbered_pages(4);

    let report = extract_to_file(&config, &backend).unwrap();
    assert_eq!(report.pages_processed, 0);
    assert!(backend.extract_calls().is_empty());
    assert_eq!(fs::read_to_string(&config.destination_path).unwrap(), "");
}

#[test]
fn three_pages_with_failing_second_page() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), 50);
    let backend = MockBackend::new(vec![
        MockPage::Text("Welcome to the void.".into()),
        MockPage::Fail("invalid content stream operator".into()),
        MockPage::Text("Roll a d100.".into()),
    ]);

    let report = extract_to_file(&config, &backend).unwrap();
    assert_eq!(report.pages_processed, 3);
    assert_eq!(report.failed_pages, vec![2]);

    let output = fs::read_to_string(&config.destination_path).unwrap();
    assert_eq!(
        output,
        "\n--- PAGE 1 ---\nWelcome to the void.\n\
         \n--- PAGE 2 ---\nError: invalid content stream operator\n\
         \n--- PAGE 3 ---\nRoll a d100.\n"
    );
}

#[test]
fn every_page_failing_still_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), 50);
    let backend = MockBackend::new(vec![
        MockPage::Fail("encrypted".into()),
        MockPage::Fail("encrypted".into()),
    ]);

    let report = extract_to_file(&config, &backend).unwrap();
    assert_eq!(report.failed_pages, vec![1, 2]);
    let output = fs::read_to_string(&config.destination_path).unwrap();
    assert_eq!(marker_numbers(&output), vec![1, 2]);
    assert_eq!(output.matches("Error: encrypted").count(), 2);
}

#[test]
fn missing_source_is_io_error_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = ExtractConfig::new(dir.path().join("absent.pdf"))
        .with_destination(dir.path().join("out.txt"));
    let backend = numbered_pages(3);

    let err = extract_to_file(&config, &backend).unwrap_err();
    match &err {
        ExtractError::Io { path, .. } => assert_eq!(path, &config.source_path),
        other => panic!("expected I/O error, got {other:?}"),
    }
    assert!(!config.destination_path.exists());
    assert!(backend.extract_calls().is_empty());
}

#[test]
fn missing_source_leaves_existing_destination_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("out.txt");
    fs::write(&destination, "previous run").unwrap();
    let config = ExtractConfig::new(dir.path().join("absent.pdf")).with_destination(&destination);

    assert!(extract_to_file(&config, &numbered_pages(1)).is_err());
    assert_eq!(fs::read_to_string(&destination).unwrap(), "previous run");
}

#[test]
fn invalid_document_is_format_error_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), 50);
    let backend = MockBackend::rejecting("no objects found");

    let err = extract_to_file(&config, &backend).unwrap_err();
    assert!(matches!(err, ExtractError::Format(_)));
    assert!(err.to_string().contains("no objects found"));
    assert!(!config.destination_path.exists());
}

#[test]
fn unwritable_destination_is_write_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), 50).with_destination(dir.path().join("no_such_dir/out.txt"));

    let err = extract_to_file(&config, &numbered_pages(2)).unwrap_err();
    assert!(matches!(err, ExtractError::Write { .. }));
}

#[test]
fn repeated_runs_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), 50);
    let backend = MockBackend::new(vec![
        MockPage::Text("é ü ß — unicode survives".into()),
        MockPage::Fail("boom".into()),
        MockPage::Text(String::new()),
    ]);
    let extractor = Extractor::new(&backend);

    extractor.run(&config).unwrap();
    let first = fs::read(&config.destination_path).unwrap();
    extractor.run(&config).unwrap();
    let second = fs::read(&config.destination_path).unwrap();

    assert_eq!(first, second);
    assert!(String::from_utf8(first).unwrap().contains("é ü ß"));
}

#[test]
fn report_counts_bytes_written() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), 50);

    let report = extract_to_file(&config, &numbered_pages(2)).unwrap();
    let on_disk = fs::metadata(&config.destination_path).unwrap().len();
    assert_eq!(report.bytes_written as u64, on_disk);
    assert_eq!(report.destination, config.destination_path);
}

#[cfg(unix)]
#[test]
fn symlinked_destination_writes_through_link() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), 50);
    let real = dir.path().join("real.txt");
    let link = dir.path().join("link.txt");
    fs::write(&real, "old").unwrap();
    std::os::unix::fs::symlink(&real, &link).unwrap();
    let config = config.with_destination(&link);

    extract_to_file(&config, &numbered_pages(1)).unwrap();

    assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    assert_eq!(
        fs::read_to_string(&real).unwrap(),
        "\n--- PAGE 1 ---\ntext of page 1\n"
    );
}

#[cfg(unix)]
#[test]
fn existing_destination_keeps_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), 50);
    fs::write(&config.destination_path, "previous").unwrap();
    fs::set_permissions(&config.destination_path, fs::Permissions::from_mode(0o640)).unwrap();

    extract_to_file(&config, &numbered_pages(2)).unwrap();

    let mode = fs::metadata(&config.destination_path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o640);
    assert_eq!(
        marker_numbers(&fs::read_to_string(&config.destination_path).unwrap()),
        vec![1, 2]
    );
}
