use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use directories::ProjectDirs;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use speedtyper::{
    app::{App, Control},
    clock::ThreadScheduler,
    config::{Config, ConfigStore, FileConfigStore},
    game::Game,
    language::SupportedLanguage,
    runtime::{tick_sink, CrosstermEventSource, Runner},
    session::MatchMode,
    word_supply::WordSupply,
};

const REFRESH_RATE_MS: u64 = 250;

/// timed typing-speed exercise with live wpm and characters per second
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type the highlighted words against a countdown. Words typed, characters typed, WPM and characters per second update live; the session ends when the clock runs out."
)]
pub struct Cli {
    /// number of words drawn for the session
    #[clap(short = 'w', long)]
    number_of_words: Option<usize>,

    /// length of the session in seconds
    #[clap(short = 's', long)]
    number_of_secs: Option<u32>,

    /// live: a word advances as soon as it matches; submit: only on enter
    #[clap(short = 'm', long, value_enum)]
    match_mode: Option<MatchMode>,

    /// take a correct word back for every mismatched submission
    #[clap(long, overrides_with = "no_penalize_mismatch")]
    penalize_mismatch: bool,

    /// turn a stored --penalize-mismatch back off
    #[clap(long, overrides_with = "penalize_mismatch")]
    no_penalize_mismatch: bool,

    /// word pool to draw from
    #[clap(short = 'l', long, value_enum)]
    supported_language: Option<SupportedLanguage>,

    /// do not write the effective settings back to the config file
    #[clap(long)]
    no_save: bool,
}

impl Cli {
    /// Overlay the flags given on the command line onto `base`
    fn apply(&self, base: Config) -> Config {
        Config {
            number_of_words: self.number_of_words.unwrap_or(base.number_of_words),
            number_of_secs: self.number_of_secs.unwrap_or(base.number_of_secs),
            supported_language: self.supported_language.unwrap_or(base.supported_language),
            match_mode: self.match_mode.unwrap_or(base.match_mode),
            penalize_mismatch: self.penalty_override().unwrap_or(base.penalize_mismatch),
        }
    }

    fn penalty_override(&self) -> Option<bool> {
        match (self.penalize_mismatch, self.no_penalize_mismatch) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

fn init_logging() -> Option<WorkerGuard> {
    let proj_dirs = ProjectDirs::from("", "", "speedtyper")?;
    // state_dir only exists on linux
    let dir = proj_dirs
        .state_dir()
        .unwrap_or_else(|| proj_dirs.data_local_dir())
        .to_path_buf();
    std::fs::create_dir_all(&dir).ok()?;

    let filter = EnvFilter::try_from_env("SPEEDTYPER_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
        dir,
        "speedtyper.log",
    ));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

fn build_app(config: &Config, runner: &Runner<CrosstermEventSource>) -> Result<App, Box<dyn Error>> {
    let session_config = config.session_config()?;
    let supply = WordSupply::new(
        config.supported_language.as_lang()?,
        session_config.number_of_words,
    )?;
    let game = Game::new(
        session_config,
        supply,
        Box::new(ThreadScheduler),
        tick_sink(runner.sender()),
    )?;
    Ok(App::new(game))
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let _guard = init_logging();

    let store = FileConfigStore::new();
    let config = cli.apply(store.load());

    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(REFRESH_RATE_MS),
    );
    let mut app = match build_app(&config, &runner) {
        Ok(app) => app,
        Err(err) => {
            error!(error = %err, "invalid setup");
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::InvalidValue, err.to_string()).exit();
        }
    };

    if !cli.no_save {
        if let Err(err) = store.save(&config) {
            error!(error = %err, path = %store.path().display(), "could not save config");
        }
    }

    info!(?config, "starting");

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<CrosstermEventSource>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        match app.handle_event(runner.step()) {
            Control::Quit => break,
            Control::Redraw => {
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
            Control::Continue => {}
        }
    }

    Ok(())
}
