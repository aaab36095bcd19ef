//! Editor session: background load/save and rule replacement.
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use smartcsv::editor::{Editor, EditorEvent, Operation};
use smartcsv::error::{Error, Result};
use smartcsv::io::{CsvFileReader, CsvFileWriter, DocumentReader, DocumentWriter};
use smartcsv::rules::RuleFileReader;
use smartcsv::TableModel;

const PEOPLE: &str = "name,age\nBob,nine\nAlice,42\n";
const AGE_RULES: &str = r#"{ "columns": { "age": { "integer": true, "not empty": true } } }"#;

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write fixture");
    path
}

async fn next(editor: &mut Editor) -> EditorEvent {
    tokio::time::timeout(Duration::from_secs(10), editor.next_event())
        .await
        .expect("event in time")
        .expect("an event")
}

#[tokio::test]
async fn test_open_document_then_rules() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_file(dir.path(), "people.csv", PEOPLE);
    let rules = write_file(dir.path(), "rules.json", AGE_RULES);

    let mut editor = Editor::new();
    editor.open_document(&csv);
    match next(&mut editor).await {
        EditorEvent::DocumentLoaded { rows, invalid, .. } => {
            assert_eq!(rows, 2);
            assert_eq!(invalid, 0);
        }
        other => panic!("unexpected event {:?}", other),
    }

    editor.open_rules(&rules);
    match next(&mut editor).await {
        EditorEvent::RulesLoaded { path, invalid } => {
            assert_eq!(path, rules);
            assert_eq!(invalid, 1);
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert!(editor.next_event().await.is_none());

    let state = editor.edit(0, "age", "9").unwrap();
    assert!(state.valid);
    assert!(editor.model().unwrap().is_valid());
}

#[tokio::test]
async fn test_loaded_document_gets_current_rules() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_file(dir.path(), "people.csv", PEOPLE);
    let rules = write_file(dir.path(), "rules.json", AGE_RULES);

    let mut editor = Editor::new();
    editor.open_rules(&rules);
    assert!(matches!(next(&mut editor).await, EditorEvent::RulesLoaded { invalid: 0, .. }));

    editor.open_document(&csv);
    assert!(matches!(
        next(&mut editor).await,
        EditorEvent::DocumentLoaded { invalid: 1, .. }
    ));

    editor.clear_rules();
    assert!(editor.model().unwrap().is_valid());
    assert!(editor.validator().is_none());
}

#[tokio::test]
async fn test_failed_load_keeps_previous_model() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_file(dir.path(), "people.csv", PEOPLE);
    let ragged = write_file(dir.path(), "ragged.csv", "a,b\n1\n");

    let mut editor = Editor::new();
    editor.open_document(&csv);
    next(&mut editor).await;
    editor.edit(1, "name", "Alicia").unwrap();

    editor.open_document(&ragged);
    match next(&mut editor).await {
        EditorEvent::Failed { operation, error } => {
            assert_eq!(operation, Operation::LoadDocument);
            assert!(matches!(error, Error::StructureMismatch { .. }));
        }
        other => panic!("unexpected event {:?}", other),
    }

    editor.open_document(dir.path().join("missing.csv"));
    assert!(matches!(
        next(&mut editor).await,
        EditorEvent::Failed { error: Error::Io { .. }, .. }
    ));

    let model = editor.model().expect("model survives");
    assert_eq!(model.filepath(), csv.as_path());
    assert_eq!(model.row(1).unwrap().cell("name").unwrap().value(), "Alicia");
}

#[tokio::test]
async fn test_failed_rule_load_keeps_previous_rules() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_file(dir.path(), "people.csv", PEOPLE);
    let rules = write_file(dir.path(), "rules.json", AGE_RULES);
    let broken = write_file(dir.path(), "broken.json", "{ \"columns\": ");

    let mut editor = Editor::new();
    editor.open_document(&csv);
    editor.open_rules(&rules);
    next(&mut editor).await;
    next(&mut editor).await;
    assert_eq!(editor.model().unwrap().invalid_count(), 1);

    editor.open_rules(&broken);
    assert!(matches!(
        next(&mut editor).await,
        EditorEvent::Failed {
            operation: Operation::LoadRules,
            error: Error::RuleParse { .. }
        }
    ));
    assert_eq!(editor.rules_path(), Some(rules.as_path()));
    assert_eq!(editor.model().unwrap().invalid_count(), 1);
}

#[tokio::test]
async fn test_save_as_writes_edits() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_file(dir.path(), "people.csv", PEOPLE);
    let out = dir.path().join("out.csv");

    let mut editor = Editor::new();
    editor.open_document(&csv);
    next(&mut editor).await;
    editor.edit(0, "age", "9").unwrap();

    editor.save_as(&out).unwrap();
    match next(&mut editor).await {
        EditorEvent::Saved { path } => assert_eq!(path, out),
        other => panic!("unexpected event {:?}", other),
    }

    assert_eq!(
        std::fs::read_to_string(&out).unwrap(),
        "name,age\nBob,9\nAlice,42\n"
    );
    assert_eq!(editor.model().unwrap().filepath(), out.as_path());
    // the original file is untouched
    assert_eq!(std::fs::read_to_string(&csv).unwrap(), PEOPLE);
}

#[tokio::test]
async fn test_failed_save_as_keeps_filepath() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_file(dir.path(), "people.csv", PEOPLE);
    let unreachable = dir.path().join("no/such/dir/out.csv");

    let mut editor = Editor::new();
    editor.open_document(&csv);
    next(&mut editor).await;

    editor.save_as(&unreachable).unwrap();
    match next(&mut editor).await {
        EditorEvent::Failed { operation, error } => {
            assert_eq!(operation, Operation::Save);
            assert!(matches!(error, Error::Io { .. }));
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert_eq!(editor.model().unwrap().filepath(), csv.as_path());

    // a plain save still goes to the original file
    editor.edit(0, "age", "9").unwrap();
    editor.save().unwrap();
    assert!(matches!(next(&mut editor).await, EditorEvent::Saved { .. }));
    assert_eq!(
        std::fs::read_to_string(&csv).unwrap(),
        "name,age\nBob,9\nAlice,42\n"
    );
}

#[tokio::test]
async fn test_save_without_document() {
    let mut editor = Editor::new();
    let err = editor.save().unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NoDocument)));
    assert!(editor.edit(0, "a", "b").is_err());
}

#[tokio::test]
async fn test_edit_unknown_cell_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_file(dir.path(), "people.csv", PEOPLE);

    let mut editor = Editor::new();
    editor.open_document(&csv);
    next(&mut editor).await;

    assert!(editor.edit(5, "age", "1").is_err());
    assert!(editor.edit(0, "zip", "1").is_err());
}

/// Reader that takes a while, so a second request can supersede it.
struct SlowReader {
    delay: Duration,
}

impl DocumentReader for SlowReader {
    fn read(&self, path: &Path) -> Result<TableModel> {
        std::thread::sleep(self.delay);
        CsvFileReader::default().read(path)
    }
}

#[tokio::test]
async fn test_restarted_load_wins() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_file(dir.path(), "first.csv", "a\n1\n");
    let second = write_file(dir.path(), "second.csv", "b\n2\n3\n");

    let mut editor = Editor::with_io(
        Arc::new(SlowReader {
            delay: Duration::from_millis(100),
        }),
        Arc::new(CsvFileWriter::default()),
        Arc::new(RuleFileReader),
    );

    editor.open_document(&first);
    editor.open_document(&second);

    match next(&mut editor).await {
        EditorEvent::DocumentLoaded { path, rows, .. } => {
            assert_eq!(path, second);
            assert_eq!(rows, 2);
        }
        other => panic!("unexpected event {:?}", other),
    }

    // the superseded run may still land; it must not replace the model
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(editor.poll_events().is_empty());
    assert_eq!(editor.model().unwrap().header(), ["b"]);
}

#[tokio::test]
async fn test_close_drops_document() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_file(dir.path(), "people.csv", PEOPLE);

    let mut editor = Editor::new();
    editor.open_document(&csv);
    next(&mut editor).await;
    editor.close();

    assert!(editor.model().is_none());
    assert!(editor.next_event().await.is_none());
}

/// Writer that is slow for snapshots whose first age is "old".
struct SlowOldWriter {
    delay: Duration,
}

impl DocumentWriter for SlowOldWriter {
    fn write(&self, path: &Path, model: &TableModel) -> Result<()> {
        let age = model.row(0).and_then(|r| r.cell("age")).map(|c| c.value());
        if age == Some("old") {
            std::thread::sleep(self.delay);
        }
        CsvFileWriter::default().write(path, model)
    }
}

#[tokio::test]
async fn test_superseded_save_does_not_overwrite_newer() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_file(dir.path(), "people.csv", "name,age\nBob,nine\n");

    let mut editor = Editor::with_io(
        Arc::new(CsvFileReader::default()),
        Arc::new(SlowOldWriter {
            delay: Duration::from_millis(300),
        }),
        Arc::new(RuleFileReader),
    );
    editor.open_document(&csv);
    next(&mut editor).await;

    editor.edit(0, "age", "old").unwrap();
    editor.save().unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    editor.edit(0, "age", "new").unwrap();
    editor.save().unwrap();

    assert!(matches!(next(&mut editor).await, EditorEvent::Saved { .. }));
    assert_eq!(std::fs::read_to_string(&csv).unwrap(), "name,age\nBob,new\n");

    // give a stray older write every chance to land
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(editor.poll_events().is_empty());
    assert_eq!(std::fs::read_to_string(&csv).unwrap(), "name,age\nBob,new\n");
}
