use std::fs::File;
use std::io::{self, BufRead, Write, stdout};
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::EnableMouseCapture,
    execute,
    terminal::{EnterAlternateScreen, enable_raw_mode},
};
use log::{error, info};
use ratatui::{Terminal, backend::CrosstermBackend};
use simplelog::{Config, LevelFilter, WriteLogger};

use docbrowse::engine::RenderEngine;
use docbrowse::event_source::TerminalEventSource;
use docbrowse::panic_handler::{initialize_panic_handler, restore_terminal};
use docbrowse::settings::{Settings, load_settings};
use docbrowse::{
    App, BrowseError, BrowserSession, HistoryStore, SessionConfig, run_app_with_event_source,
};

#[derive(Parser)]
#[command(name = "docbrowse", version, about = "Page at a time document viewer")]
struct Args {
    /// Document to open when there is no previous session to resume
    path: Option<PathBuf>,

    /// History file (defaults to the one named in the settings)
    #[arg(long, value_name = "FILE")]
    history: Option<PathBuf>,

    /// Settings file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long, value_name = "FILE", default_value = "docbrowse.log")]
    log_file: PathBuf,

    /// Log at debug level
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let log_file = File::create(&args.log_file)
        .with_context(|| format!("cannot create log file {}", args.log_file.display()))?;
    WriteLogger::init(level, Config::default(), log_file)?;
    info!("Starting docbrowse");

    let settings = load_settings(args.config.as_deref());
    let history_path = args
        .history
        .clone()
        .unwrap_or_else(|| settings.history_path());
    let history = HistoryStore::load_or_empty(history_path);

    #[cfg(feature = "pdf")]
    {
        run(
            Rc::new(docbrowse::engine::MuPdfEngine::new()),
            &args,
            &settings,
            history,
        )
    }

    #[cfg(not(feature = "pdf"))]
    {
        drop(history);
        anyhow::bail!("docbrowse was built without a document engine, enable the `pdf` feature")
    }
}

#[cfg_attr(not(feature = "pdf"), allow(dead_code))]
fn run<E: RenderEngine>(
    engine: Rc<E>,
    args: &Args,
    settings: &Settings,
    history: HistoryStore,
) -> Result<()> {
    let (columns, rows) = crossterm::terminal::size().unwrap_or((80, 24));
    let config = SessionConfig::new(settings.display_dpi, App::<E>::page_viewport(columns, rows))
        .cache_capacity(settings.page_cache_capacity);
    let mut session = BrowserSession::new(engine, history, config);

    match session.start(args.path.as_deref(), prompt_for_path) {
        Ok(source) => info!("Started from {source:?}"),
        Err(BrowseError::NoDocument) => {
            error!("No file to view");
            eprintln!("Cancelled: no file to view supplied");
            std::process::exit(1);
        }
        Err(e) => {
            error!("Startup failed: {e}");
            eprintln!("{e}");
            std::process::exit(1);
        }
    }

    initialize_panic_handler();
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let mut app = App::new(session);
    let res = run_app_with_event_source(&mut terminal, &mut app, &mut TerminalEventSource);

    restore_terminal();
    for failure in app.session_mut().take_persist_failures() {
        eprintln!("{failure}");
    }
    if let Err(err) = &res {
        error!("Application error: {err:?}");
    }

    info!("Shutting down docbrowse");
    res
}

/// Ask for a document on stdin, before the terminal UI starts
#[cfg_attr(not(feature = "pdf"), allow(dead_code))]
fn prompt_for_path() -> Option<PathBuf> {
    print!("File to view: ");
    io::stdout().flush().ok()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).ok()?;
    let path = line.trim();
    (!path.is_empty()).then(|| PathBuf::from(path))
}
