use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use docbrowse::engine::{Colorspace, PageGeometry};
use docbrowse::test_utils::FakeEngine;
use docbrowse::{
    BrowseError, BrowserSession, Event, HistoryStore, Outcome, SessionConfig, StartSource,
    Viewport,
};
use tempfile::TempDir;

const LETTER: PageGeometry = PageGeometry::new(612.0, 792.0);

/// Fake documents backed by real (empty) files, so existence checks pass
fn documents(dir: &TempDir, names: &[&str]) -> (Rc<FakeEngine>, Vec<String>) {
    let engine = FakeEngine::new();
    let paths = names
        .iter()
        .map(|name| {
            let path = dir.path().join(name);
            fs::write(&path, b"%PDF-fake").unwrap();
            let path = path.to_string_lossy().into_owned();
            engine.add_document(&path, vec![LETTER; 20]);
            path
        })
        .collect();
    (Rc::new(engine), paths)
}

fn session(engine: &Rc<FakeEngine>, store: HistoryStore) -> BrowserSession<FakeEngine> {
    BrowserSession::new(
        engine.clone(),
        store,
        SessionConfig::new(72.0, Viewport::new(640.0, 480.0)),
    )
}

fn backups(dir: &Path) -> usize {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("browse_"))
        .count()
}

#[test]
fn session_survives_restart() {
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("browse.config");
    let (engine, paths) = documents(&dir, &["one.pdf", "two.pdf", "three.pdf"]);

    let mut first = session(&engine, HistoryStore::load(&store_path).unwrap());
    first.open_new(&paths[0]).unwrap();
    first.dispatch(Event::GoToPage(12)).unwrap();
    first.open_new(&paths[1]).unwrap();
    first.dispatch(Event::ToggleColorspace).unwrap();
    first.open_new(&paths[2]).unwrap();
    first.dispatch(Event::ZoomOut).unwrap();
    assert_eq!(first.dispatch(Event::QuitAll).unwrap(), Outcome::Exit);
    assert!(first.take_persist_failures().is_empty());
    assert_eq!(engine.open_documents(), 0);

    let mut second = session(&engine, HistoryStore::load(&store_path).unwrap());
    assert_eq!(
        second.start(None, || None).unwrap(),
        StartSource::Session(3)
    );

    let restored: Vec<String> = second
        .view_ids()
        .into_iter()
        .map(|id| second.view(id).unwrap().path().to_string())
        .collect();
    assert_eq!(restored, vec![paths[2].clone(), paths[1].clone(), paths[0].clone()]);

    let active = second.active_view().unwrap();
    assert_eq!(active.path(), paths[2]);
    assert!((active.zoom() - 0.8).abs() < 1e-6);

    let one = second.view(second.view_ids()[2]).unwrap();
    assert_eq!(one.current_page(), 11);
    let two = second.view(second.view_ids()[1]).unwrap();
    assert_eq!(two.colorspace(), Colorspace::Gray);
}

#[test]
fn saving_the_session_keeps_a_backup() {
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("browse.config");
    let (engine, paths) = documents(&dir, &["one.pdf"]);

    let mut s = session(&engine, HistoryStore::load(&store_path).unwrap());
    s.open_new(&paths[0]).unwrap();
    s.close_all();
    assert_eq!(backups(dir.path()), 0);

    let mut s = session(&engine, HistoryStore::load(&store_path).unwrap());
    s.start(None, || None).unwrap();
    s.close_all();
    assert_eq!(backups(dir.path()), 1);
}

#[test]
fn history_picker_needs_existing_file() {
    let dir = TempDir::new().unwrap();
    let (engine, paths) = documents(&dir, &["kept.pdf", "deleted.pdf"]);

    let mut s = session(&engine, HistoryStore::ephemeral());
    s.open_new(&paths[1]).unwrap();
    s.open_new(&paths[0]).unwrap();
    fs::remove_file(&paths[1]).unwrap();

    let err = s
        .dispatch(Event::OpenFromHistory(paths[1].clone()))
        .unwrap_err();
    assert!(matches!(err, BrowseError::DocumentOpen { .. }));
    assert!(err.is_recoverable());
    assert_eq!(s.view_count(), 2);

    assert_eq!(
        s.dispatch(Event::OpenFromHistory(paths[0].clone())).unwrap(),
        Outcome::Redraw
    );
    assert_eq!(s.view_count(), 3);
}

#[test]
fn write_failures_are_reported() {
    let dir = TempDir::new().unwrap();
    let (engine, paths) = documents(&dir, &["one.pdf", "two.pdf"]);

    // a directory where the store file should be
    let store_path = dir.path().join("store");
    fs::create_dir(&store_path).unwrap();
    let mut s = session(&engine, HistoryStore::with_file(&store_path));

    s.open_new(&paths[0]).unwrap();
    s.open_new(&paths[1]).unwrap();
    let failures = s.take_persist_failures();
    assert_eq!(failures.len(), 1);
    assert!(matches!(failures[0], BrowseError::HistoryIo { .. }));

    // the session itself is unaffected
    assert_eq!(s.view_count(), 2);
    assert!(s.take_persist_failures().is_empty());
}

#[test]
fn corrupt_store_falls_back_to_command_line() {
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("browse.config");
    fs::write(&store_path, "{\"history\": [").unwrap();
    let (engine, paths) = documents(&dir, &["one.pdf"]);

    let mut s = session(&engine, HistoryStore::load_or_empty(&store_path));
    let source = s
        .start(Some(Path::new(&paths[0])), || panic!("no prompt expected"))
        .unwrap();
    assert_eq!(source, StartSource::CommandLine);

    s.dispatch(Event::Quit).unwrap();
    assert_eq!(backups(dir.path()), 1);
    let reloaded = HistoryStore::load(&store_path).unwrap();
    assert_eq!(reloaded.most_recent().unwrap().file_name, paths[0]);
}

#[test]
fn missing_command_line_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    let (engine, _) = documents(&dir, &[]);
    let mut s = session(&engine, HistoryStore::ephemeral());

    let missing: PathBuf = dir.path().join("nothing.pdf");
    let result = s.start(Some(missing.as_path()), || Some(PathBuf::from("ignored.pdf")));
    assert!(matches!(result, Err(BrowseError::NoDocument)));
    assert!(s.is_empty());
}

#[test]
fn render_failure_keeps_view_usable() {
    let dir = TempDir::new().unwrap();
    let (engine, paths) = documents(&dir, &["damaged.pdf"]);
    engine.fail_page(&paths[0], 1);

    let mut s = session(&engine, HistoryStore::ephemeral());
    s.open_new(&paths[0]).unwrap();
    s.render_active().unwrap();

    s.dispatch(Event::NextPage).unwrap();
    let err = s.render_active().unwrap_err();
    assert!(err.is_recoverable());
    assert_eq!(s.active_view().unwrap().current_page(), 0);
    assert!(s.render_active().unwrap().is_some());
}

#[test]
fn extreme_zoom_survives_restart() {
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("browse.config");
    let (engine, paths) = documents(&dir, &["other.pdf", "huge.pdf"]);

    let mut first = session(&engine, HistoryStore::load(&store_path).unwrap());
    first.open_new(&paths[0]).unwrap();
    first.dispatch(Event::GoToPage(4)).unwrap();
    first.open_new(&paths[1]).unwrap();
    for _ in 0..500 {
        first.dispatch(Event::ZoomIn).unwrap();
    }
    let zoom = first.active_view().unwrap().zoom();
    assert!(zoom.is_finite());
    first.dispatch(Event::QuitAll).unwrap();
    assert!(first.take_persist_failures().is_empty());

    let reloaded = HistoryStore::load(&store_path).unwrap();
    let stored = reloaded.find(&paths[1]).unwrap().zoom;
    assert!(((stored - zoom) / zoom).abs() < 1e-6);
    assert_eq!(reloaded.find(&paths[0]).unwrap().page, 3);
    assert_eq!(reloaded.session_paths().len(), 2);
}
