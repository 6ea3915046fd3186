use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use crossterm::event::KeyCode;
use docbrowse::engine::PageGeometry;
use docbrowse::event_source::SimulatedEventSource;
use docbrowse::notification::Severity;
use docbrowse::test_utils::FakeEngine;
use docbrowse::test_utils::test_helpers::{
    TestScenarioBuilder, capture_terminal_state, create_test_terminal,
};
use docbrowse::{App, BrowserSession, HistoryStore, SessionConfig, Viewport, run_app_with_event_source};
use tempfile::TempDir;

const LETTER: PageGeometry = PageGeometry::new(612.0, 792.0);

fn engine() -> Rc<FakeEngine> {
    let engine = FakeEngine::new();
    for name in ["a.pdf", "b.pdf", "c.pdf"] {
        engine.add_document(name, vec![LETTER; 10]);
    }
    Rc::new(engine)
}

fn app_on(engine: &Rc<FakeEngine>, store: HistoryStore) -> App<FakeEngine> {
    let config = SessionConfig::new(72.0, App::<FakeEngine>::page_viewport(80, 24));
    let mut session = BrowserSession::new(engine.clone(), store, config);
    session
        .start(None, || Some(PathBuf::from("a.pdf")))
        .unwrap();
    App::new(session)
}

fn press(app: &mut App<FakeEngine>, code: KeyCode) {
    app.handle_event(SimulatedEventSource::key(code)).unwrap();
}

fn type_text(app: &mut App<FakeEngine>, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c));
    }
}

fn current_page(app: &App<FakeEngine>) -> usize {
    app.session().active_view().unwrap().current_page()
}

#[test]
fn open_through_prompt_then_quit_all() {
    let engine = engine();
    let mut app = app_on(&engine, HistoryStore::ephemeral());
    let mut terminal = create_test_terminal(80, 24);
    let mut events = TestScenarioBuilder::new()
        .next_page()
        .next_page()
        .press_char('o')
        .type_text("b.pdf")
        .press_enter()
        .wheel_down()
        .quit_all()
        .build();

    run_app_with_event_source(&mut terminal, &mut app, &mut events).unwrap();

    assert!(app.should_quit());
    assert!(app.session().is_empty());
    let history = app.session().history();
    assert_eq!(history.session_paths(), ["b.pdf", "a.pdf"]);
    assert_eq!(history.find("a.pdf").unwrap().page, 2);
    assert_eq!(history.find("b.pdf").unwrap().page, 1);
    assert_eq!(engine.open_documents(), 0);
}

#[test]
fn closing_the_last_view_ends_the_loop() {
    let engine = engine();
    let mut app = app_on(&engine, HistoryStore::ephemeral());
    let mut terminal = create_test_terminal(80, 24);
    let mut events = TestScenarioBuilder::new().close_view().build();

    run_app_with_event_source(&mut terminal, &mut app, &mut events).unwrap();

    assert!(app.session().is_empty());
    // closing one by one records history but not a session
    assert!(app.session().history().session_paths().is_empty());
    assert_eq!(app.session().history().most_recent().unwrap().file_name, "a.pdf");
}

#[test]
fn bad_path_keeps_prompt_open() {
    let engine = engine();
    let mut app = app_on(&engine, HistoryStore::ephemeral());

    press(&mut app, KeyCode::Char('o'));
    type_text(&mut app, "nope.pdf");
    press(&mut app, KeyCode::Enter);

    assert!(app.is_prompting());
    let message = app.status.current().unwrap();
    assert_eq!(message.severity, Severity::Warning);
    assert!(message.text.contains("nope.pdf"));
    assert_eq!(app.session().view_count(), 1);

    press(&mut app, KeyCode::Esc);
    assert!(!app.is_prompting());
    assert!(!app.should_quit());
}

#[test]
fn go_to_page_prompt() {
    let engine = engine();
    let mut app = app_on(&engine, HistoryStore::ephemeral());

    press(&mut app, KeyCode::Char('g'));
    type_text(&mut app, "7");
    press(&mut app, KeyCode::Enter);
    assert_eq!(current_page(&app), 6);

    press(&mut app, KeyCode::Char('g'));
    type_text(&mut app, "999");
    press(&mut app, KeyCode::Enter);
    assert_eq!(current_page(&app), 9);

    press(&mut app, KeyCode::Home);
    assert_eq!(current_page(&app), 0);
}

#[test]
fn paging_wraps_around() {
    let engine = engine();
    let mut app = app_on(&engine, HistoryStore::ephemeral());

    press(&mut app, KeyCode::Left);
    assert_eq!(current_page(&app), 9);
    press(&mut app, KeyCode::PageDown);
    assert_eq!(current_page(&app), 0);
}

#[test]
fn tab_cycles_views() {
    let engine = engine();
    let mut app = app_on(&engine, HistoryStore::ephemeral());
    press(&mut app, KeyCode::Char('o'));
    type_text(&mut app, "b.pdf");
    press(&mut app, KeyCode::Enter);

    let path = |app: &App<FakeEngine>| app.session().active_view().unwrap().path().to_string();
    assert_eq!(path(&app), "b.pdf");
    press(&mut app, KeyCode::Tab);
    assert_eq!(path(&app), "a.pdf");
    press(&mut app, KeyCode::Tab);
    assert_eq!(path(&app), "b.pdf");
}

#[test]
fn resize_updates_every_view() {
    let engine = engine();
    let mut app = app_on(&engine, HistoryStore::ephemeral());
    press(&mut app, KeyCode::Char('o'));
    type_text(&mut app, "c.pdf");
    press(&mut app, KeyCode::Enter);

    app.handle_event(crossterm::event::Event::Resize(40, 12))
        .unwrap();
    let session = app.session();
    for id in session.view_ids() {
        assert_eq!(session.view(id).unwrap().viewport(), Viewport::new(40.0, 20.0));
    }
}

#[test]
fn fit_zoom_matches_page_area() {
    let engine = engine();
    let mut app = app_on(&engine, HistoryStore::ephemeral());
    app.resize(306, 398);

    press(&mut app, KeyCode::Char('f'));
    let zoom = app.session().active_view().unwrap().zoom();
    assert!((zoom - 0.5).abs() < 1e-5);
    let raster = app.raster().unwrap();
    assert_eq!((raster.width, raster.height), (306, 396));

    press(&mut app, KeyCode::Char('0'));
    assert_eq!(app.session().active_view().unwrap().zoom(), 1.0);
}

#[test]
fn help_popup_is_drawn_and_closed() {
    let engine = engine();
    let mut app = app_on(&engine, HistoryStore::ephemeral());
    let mut terminal = create_test_terminal(80, 30);

    press(&mut app, KeyCode::F(1));
    assert!(app.is_showing_help());
    terminal.draw(|f| app.draw(f)).unwrap();
    let screen = capture_terminal_state(&terminal);
    assert!(screen.contains("Help"));
    assert!(screen.contains("toggle gray / color"));

    press(&mut app, KeyCode::Esc);
    assert!(!app.is_showing_help());
    assert!(!app.should_quit());
}

#[test]
fn title_bar_shows_view_state() {
    let engine = engine();
    let mut app = app_on(&engine, HistoryStore::ephemeral());
    let mut terminal = create_test_terminal(100, 20);
    app.resize(100, 20);

    press(&mut app, KeyCode::Right);
    terminal.draw(|f| app.draw(f)).unwrap();
    let screen = capture_terminal_state(&terminal);
    let title = screen.lines().next().unwrap();
    assert!(title.contains("Page 2 of 10 from file a.pdf; zoom = 1.000000"));
}

#[test]
fn history_picker_opens_selection() {
    let dir = TempDir::new().unwrap();
    let engine = engine();
    let older = dir.path().join("older.pdf");
    fs::write(&older, b"%PDF-fake").unwrap();
    let older = older.to_string_lossy().into_owned();
    engine.add_document(&older, vec![LETTER; 3]);

    let mut store = HistoryStore::ephemeral();
    store
        .save_session(
            vec![],
            vec![docbrowse::ViewSnapshot {
                file_name: older.clone(),
                page: 2,
                zoom: 1.0,
                colorspace: Default::default(),
                location: (0, 0),
            }],
        )
        .unwrap();
    let mut app = app_on(&engine, store);
    assert_eq!(app.session().active_view().unwrap().path(), older);

    press(&mut app, KeyCode::Char('o'));
    type_text(&mut app, "a.pdf");
    press(&mut app, KeyCode::Enter);

    press(&mut app, KeyCode::Char('h'));
    assert!(app.is_picking_history());
    // most recent first: older.pdf was recorded when a.pdf opened
    press(&mut app, KeyCode::Enter);

    assert!(!app.is_picking_history());
    let view = app.session().active_view().unwrap();
    assert_eq!(view.path(), older);
    assert_eq!(view.current_page(), 2);
    assert_eq!(app.session().view_count(), 3);
}
