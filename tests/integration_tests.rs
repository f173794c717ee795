//! Integration tests for xmlsplit
//!
//! End-to-end splits over real temporary directories. Inputs are
//! generated inline; no external fixtures are required.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Parser;
use flate2::write::GzEncoder;
use flate2::Compression;
use regex::Regex;
use tempfile::tempdir;

use xmlsplit::config::{CliArgs, SplitConfig, DEFAULT_SKIP_PATTERN};
use xmlsplit::scanner::TagScanner;
use xmlsplit::splitter::{split_file, SplitCoordinator, XML_DECLARATION};

const CATALOG: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
                       <catalog>\n\
                       <book id=\"1\">\n\
                       <title>Dune</title>\n\
                       </book>\n\
                       <book id=\"2\">\n\
                       <title>Foundation</title>\n\
                       </book>\n\
                       </catalog>\n";

fn config_for(input_dir: &Path, output_dir: &Path, gzip: bool) -> SplitConfig {
    SplitConfig {
        input_dir: input_dir.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        split_depth: 1,
        gzip,
        worker_count: 2,
        skip: Regex::new(DEFAULT_SKIP_PATTERN).unwrap(),
        strip: None,
        flush_threshold: 10,
        show_progress: false,
        verbose: false,
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

fn lines(parts: &[&str]) -> String {
    let mut content = parts.join("\n");
    content.push('\n');
    content
}

#[test]
fn test_split_directory_end_to_end() {
    let dir = tempdir().unwrap();
    let input_dir = dir.path().join("in");
    let output_dir = dir.path().join("out");
    fs::create_dir(&input_dir).unwrap();
    fs::write(input_dir.join("catalog.xml"), CATALOG).unwrap();

    let coordinator = SplitCoordinator::new(config_for(&input_dir, &output_dir, false));
    let result = coordinator.run().unwrap();

    assert_eq!(result.files_discovered, 1);
    assert_eq!(result.files_processed, 1);
    assert_eq!(result.files_emitted, 3);
    assert_eq!(result.errors, 0);
    assert!(result.completed);

    let base = output_dir.join("catalog/catalog/0");
    assert_eq!(
        read(&base.join("root.xml")),
        lines(&[XML_DECLARATION, "<catalog/>"])
    );
    assert_eq!(
        read(&base.join("book.0.xml")),
        lines(&[
            XML_DECLARATION,
            "<book id=\"1\">",
            "<title>",
            "Dune",
            "</title>",
            "</book>",
        ])
    );
    assert_eq!(
        read(&base.join("book.1.xml")),
        lines(&[
            XML_DECLARATION,
            "<book id=\"2\">",
            "<title>",
            "Foundation",
            "</title>",
            "</book>",
        ])
    );

    // Byte accounting matches what landed on disk.
    let on_disk: u64 = ["root.xml", "book.0.xml", "book.1.xml"]
        .iter()
        .map(|name| fs::metadata(base.join(name)).unwrap().len())
        .sum();
    assert_eq!(result.bytes_written, on_disk);
}

#[test]
fn test_cli_args_drive_a_full_run() {
    let dir = tempdir().unwrap();
    let input_dir = dir.path().join("in");
    let output_dir = dir.path().join("out");
    fs::create_dir(&input_dir).unwrap();
    fs::write(input_dir.join("catalog.xml"), CATALOG).unwrap();

    let args = CliArgs::try_parse_from([
        "xmlsplit",
        input_dir.to_str().unwrap(),
        "-o",
        output_dir.to_str().unwrap(),
        "-q",
    ])
    .unwrap();
    let config = SplitConfig::from_args(args).unwrap();

    let result = SplitCoordinator::new(config).run().unwrap();
    assert_eq!(result.files_emitted, 3);
    assert!(output_dir.join("catalog/catalog/0/book.1.xml").exists());
}

#[test]
fn test_gzip_inputs_end_to_end() {
    let dir = tempdir().unwrap();
    let input_dir = dir.path().join("in");
    let output_dir = dir.path().join("out");
    fs::create_dir(&input_dir).unwrap();

    let file = fs::File::create(input_dir.join("catalog.xml.gz")).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(CATALOG.as_bytes()).unwrap();
    encoder.finish().unwrap();

    let coordinator = SplitCoordinator::new(config_for(&input_dir, &output_dir, true));
    let result = coordinator.run().unwrap();

    assert_eq!(result.files_discovered, 1);
    assert_eq!(result.files_emitted, 3);
    assert_eq!(result.errors, 0);

    // catalog.xml.gz maps to the same output stem as catalog.xml.
    let base = output_dir.join("catalog/catalog/0");
    assert_eq!(
        read(&base.join("root.xml")),
        lines(&[XML_DECLARATION, "<catalog/>"])
    );
    assert!(base.join("book.0.xml").exists());
    assert!(base.join("book.1.xml").exists());
}

#[test]
fn test_failures_are_isolated_per_input() {
    let dir = tempdir().unwrap();
    let input_dir = dir.path().join("in");
    let output_dir = dir.path().join("out");
    fs::create_dir(&input_dir).unwrap();

    let file = fs::File::create(input_dir.join("good.xml.gz")).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(CATALOG.as_bytes()).unwrap();
    encoder.finish().unwrap();

    fs::write(input_dir.join("bad.xml.gz"), "this is not gzip data").unwrap();

    let coordinator = SplitCoordinator::new(config_for(&input_dir, &output_dir, true));
    let result = coordinator.run().unwrap();

    assert_eq!(result.files_discovered, 2);
    assert_eq!(result.files_processed, 1);
    assert_eq!(result.errors, 1);
    assert!(result.completed);

    // The good input still split fully.
    assert!(output_dir.join("good/catalog/0/book.1.xml").exists());
}

#[test]
fn test_non_xml_files_are_not_discovered() {
    let dir = tempdir().unwrap();
    let input_dir = dir.path().join("in");
    let output_dir = dir.path().join("out");
    fs::create_dir(&input_dir).unwrap();
    fs::write(input_dir.join("catalog.xml"), CATALOG).unwrap();
    fs::write(input_dir.join("notes.txt"), "not xml").unwrap();
    fs::write(input_dir.join("archive.xml.gz"), "wrong mode").unwrap();

    let coordinator = SplitCoordinator::new(config_for(&input_dir, &output_dir, false));
    let result = coordinator.run().unwrap();

    assert_eq!(result.files_discovered, 1);
    assert_eq!(result.errors, 0);
}

#[test]
fn test_split_file_at_depth_two() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("library.xml");
    fs::write(
        &input,
        "<library>\n\
         <shelf n=\"1\">\n\
         <book><title>A</title></book>\n\
         <book><title>B</title></book>\n\
         </shelf>\n\
         </library>\n",
    )
    .unwrap();

    let output_dir = dir.path().join("out");
    let mut config = config_for(dir.path(), &output_dir, false);
    config.split_depth = 2;

    let scanner = TagScanner::new();
    let report = split_file(&input, &config, &scanner).unwrap();
    assert_eq!(report.files_emitted, 4);

    let shelf = output_dir.join("library/library/0/shelf/0");
    assert_eq!(
        read(&shelf.join("root.xml")),
        lines(&[XML_DECLARATION, "<shelf n=\"1\"/>"])
    );
    assert_eq!(
        read(&shelf.join("book.0.xml")),
        lines(&[
            XML_DECLARATION,
            "<book>",
            "<title>",
            "A",
            "</title>",
            "</book>",
        ])
    );
    assert_eq!(
        read(&shelf.join("book.1.xml")),
        lines(&[
            XML_DECLARATION,
            "<book>",
            "<title>",
            "B",
            "</title>",
            "</book>",
        ])
    );
}

#[test]
fn test_multiline_opening_tag_is_reassembled_on_disk() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("feed.xml");
    fs::write(
        &input,
        "<feed xmlns=\"http://example.org/ns\"\n\
         \x20 version=\"2.0\">\n\
         <item><id>1</id></item>\n\
         </feed>\n",
    )
    .unwrap();

    let output_dir = dir.path().join("out");
    let config = config_for(dir.path(), &output_dir, false);

    let scanner = TagScanner::new();
    let report = split_file(&input, &config, &scanner).unwrap();
    assert_eq!(report.files_emitted, 2);

    let base = output_dir.join("feed/feed/0");
    assert_eq!(
        read(&base.join("root.xml")),
        lines(&[
            XML_DECLARATION,
            "<feed xmlns=\"http://example.org/ns\"  version=\"2.0\"/>",
        ])
    );
    assert_eq!(
        read(&base.join("item.0.xml")),
        lines(&[XML_DECLARATION, "<item>", "<id>", "1", "</id>", "</item>"])
    );
}

#[test]
fn test_rerun_reuses_existing_output_directories() {
    let dir = tempdir().unwrap();
    let input_dir = dir.path().join("in");
    let output_dir = dir.path().join("out");
    fs::create_dir(&input_dir).unwrap();
    fs::write(input_dir.join("catalog.xml"), CATALOG).unwrap();

    let config = config_for(&input_dir, &output_dir, false);
    SplitCoordinator::new(config.clone()).run().unwrap();
    let second = SplitCoordinator::new(config).run().unwrap();

    // Same tree, files overwritten in place.
    assert_eq!(second.errors, 0);
    assert_eq!(second.files_emitted, 3);
    let base = output_dir.join("catalog/catalog/0");
    assert_eq!(
        fs::read_dir(&base).unwrap().count(),
        3,
        "rerun must not duplicate output files in {}",
        base.display()
    );
}

#[test]
fn test_preset_shutdown_flag_stops_the_run() {
    let dir = tempdir().unwrap();
    let input_dir = dir.path().join("in");
    let output_dir = dir.path().join("out");
    fs::create_dir(&input_dir).unwrap();
    fs::write(input_dir.join("catalog.xml"), CATALOG).unwrap();

    let coordinator = SplitCoordinator::new(config_for(&input_dir, &output_dir, false));
    coordinator
        .shutdown_handle()
        .store(true, std::sync::atomic::Ordering::SeqCst);
    let result = coordinator.run().unwrap();

    // Workers observe the flag before taking any work.
    assert_eq!(result.files_discovered, 1);
    assert_eq!(result.files_processed, 0);
    assert!(!result.completed);
}

#[test]
fn test_missing_input_dir_is_an_error() {
    let dir = tempdir().unwrap();
    let config = config_for(
        &dir.path().join("never-created"),
        &dir.path().join("out"),
        false,
    );

    let err = SplitCoordinator::new(config).run().unwrap_err();
    let message = err.to_string();
    assert!(message.contains("I/O error"), "unexpected error: {message}");
}

#[test]
fn test_output_paths_stay_under_output_dir() {
    let dir = tempdir().unwrap();
    let input_dir = dir.path().join("in");
    let output_dir = dir.path().join("out");
    fs::create_dir(&input_dir).unwrap();

    // A stray closing tag before the root must not escape the tree.
    fs::write(
        input_dir.join("odd.xml"),
        "</stray>\n<root>\n<row>x</row>\n</root>\n",
    )
    .unwrap();

    let coordinator = SplitCoordinator::new(config_for(&input_dir, &output_dir, false));
    let result = coordinator.run().unwrap();
    assert_eq!(result.errors, 0);

    let mut seen = Vec::new();
    collect_files(&output_dir, &mut seen);
    assert!(!seen.is_empty());
    for path in &seen {
        assert!(
            path.starts_with(&output_dir),
            "{} escaped the output dir",
            path.display()
        );
    }
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            collect_files(&path, out);
        } else {
            out.push(path);
        }
    }
}
