#![forbid(unsafe_code)]

//! The `notepin` command line against a temporary data file.

use std::path::Path;

use clap::Parser;
use notepin::cli::{Cli, run};
use notepin::{Document, Error, FileStorage, Rejection, StorageBackend, StorageError};

fn invoke(data: &Path, args: &[&str]) -> Result<String, Error> {
    let mut argv = vec!["notepin", "--data-file", data.to_str().unwrap()];
    argv.extend_from_slice(args);
    let cli = Cli::parse_from(argv);
    let mut out = Vec::new();
    run(cli, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

fn stored(data: &Path) -> Document {
    FileStorage::new(data).read().unwrap().unwrap()
}

#[test]
fn list_on_fresh_file_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("notes_data.json");

    let out = invoke(&data, &["list"]).unwrap();
    assert_eq!(out, "0/0 done (0%)\n");
    assert!(!data.exists());
}

#[test]
fn list_leaves_the_data_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("notes_data.json");
    // Written by an older release that never stored `created_at`.
    let raw = r#"{"items":[{"id":1,"text":"important","completed":false}]}"#;
    std::fs::write(&data, raw).unwrap();

    let out = invoke(&data, &["list"]).unwrap();
    assert_eq!(out, "[ ] 1  important\n0/1 done (0%)\n");
    assert_eq!(std::fs::read_to_string(&data).unwrap(), raw);

    // A mutation keeps the item and backfills the stamp.
    invoke(&data, &["toggle", "1"]).unwrap();
    let doc = stored(&data);
    assert_eq!(doc.items[0].text, "important");
    assert!(doc.items[0].completed);
}

#[test]
fn unreadable_data_file_is_reported_not_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("notes_data.json");
    let raw = "{\"items\": [1, 2,";
    std::fs::write(&data, raw).unwrap();

    for args in [&["list"][..], &["add", "x"][..]] {
        let err = invoke(&data, args).unwrap_err();
        assert!(matches!(err, Error::Storage(StorageError::Json(_))));
        assert_eq!(err.exit_code(), 74);
    }
    assert_eq!(std::fs::read_to_string(&data).unwrap(), raw);
}

#[test]
fn add_toggle_and_list() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("notes_data.json");

    let out = invoke(&data, &["add", "milk"]).unwrap();
    assert!(out.starts_with("added 1\n"));
    invoke(&data, &["add", "eggs"]).unwrap();
    invoke(&data, &["add", "--after", "1", "bread"]).unwrap();

    let out = invoke(&data, &["toggle", "3"]).unwrap();
    assert_eq!(
        out,
        "[ ] 1  milk\n[x] 3  bread\n[ ] 2  eggs\n1/3 done (33%)\n"
    );
    assert_eq!(stored(&data).ids().len(), 3);
}

#[test]
fn move_clear_and_font() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("notes_data.json");
    invoke(&data, &["add", "a"]).unwrap();
    invoke(&data, &["add", "b"]).unwrap();

    invoke(&data, &["move", "2", "up"]).unwrap();
    let doc = stored(&data);
    assert_eq!(doc.items[0].text, "b");

    invoke(&data, &["toggle", "1"]).unwrap();
    let out = invoke(&data, &["clear-completed"]).unwrap();
    assert!(out.starts_with("cleared 1\n"));
    assert_eq!(stored(&data).len(), 1);

    invoke(&data, &["font", "17"]).unwrap();
    assert_eq!(stored(&data).settings.font_size, 17);
}

#[test]
fn multi_line_text_is_indented() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("notes_data.json");
    invoke(&data, &["add", "call\nthe bank"]).unwrap();

    let out = invoke(&data, &["edit", "1", "call\nthe dentist"]).unwrap();
    assert_eq!(out, "[ ] 1  call\n       the dentist\n0/1 done (0%)\n");
}

#[test]
fn rejections_map_to_usage_errors() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("notes_data.json");
    invoke(&data, &["add", "only"]).unwrap();

    let unknown = invoke(&data, &["remove", "9"]).unwrap_err();
    assert!(matches!(unknown, Error::UnknownItem(_)));
    assert_eq!(unknown.exit_code(), 2);

    let edge = invoke(&data, &["move", "1", "up"]).unwrap_err();
    assert!(matches!(
        edge,
        Error::Rejected(Rejection::MoveAtEdge { .. })
    ));
    assert_eq!(edge.to_string(), "item 1 is already at the top");

    let font = invoke(&data, &["font", "12"]).unwrap_err();
    assert!(matches!(
        font,
        Error::Rejected(Rejection::UnsupportedFontSize(12))
    ));
}

#[test]
fn invalid_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("notes_data.json");
    let config = dir.path().join("notepin.toml");
    std::fs::write(&config, "history_depth = 0\n").unwrap();

    let err = invoke(&data, &["--config", config.to_str().unwrap(), "list"]).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert_eq!(err.exit_code(), 78);
}

#[test]
fn add_after_largest_id_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("notes_data.json");
    std::fs::write(&data, r#"{"items":[{"id":18446744073709551615,"text":"last"}]}"#).unwrap();

    let err = invoke(&data, &["add", "one more"]).unwrap_err();
    assert!(matches!(err, Error::Rejected(Rejection::IdsExhausted)));
    assert_eq!(stored(&data).len(), 1);
}
