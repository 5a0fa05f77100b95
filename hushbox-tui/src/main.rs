use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};

use hushbox_core::{
    Config, Engine, EngineCommand, EngineHandle, FadeOut,
    metadata::{NoLookup, OEmbedResolver, TitleResolver},
    sim::SimulatedRuntime,
    widget::PlayerRuntime,
};

mod router;
mod routes;
mod state;
mod states;
mod ui;

use router::{Router, route_for_name, tab_names};
use routes::playback::PlaybackRoute;
use state::AppState;

/// White-noise player with a fading sleep timer
#[derive(Parser, Debug)]
#[command(name = "hushbox", version, about)]
struct Args {
    /// Path to a hushbox.toml config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start without a player runtime (controls stay inert)
    #[arg(long)]
    no_player: bool,

    /// Start a sleep timer of this many minutes
    #[arg(short, long)]
    timer: Option<u32>,

    /// Fade-out length in seconds (0, 5, 10, 15, 20, 30 or 60)
    #[arg(short, long)]
    fade: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tui_logger::init_logger(log::LevelFilter::Debug)
        .map_err(|e| anyhow::anyhow!("Failed to init tui_logger: {:?}", e))?;
    tui_logger::set_default_level(log::LevelFilter::Debug);

    log::info!("Starting hushbox");

    let config = Config::load(args.config.as_deref())?;

    let resolver: Arc<dyn TitleResolver> = if config.metadata.lookup {
        Arc::new(OEmbedResolver::new(config.metadata.timeout)?)
    } else {
        Arc::new(NoLookup)
    };

    let runtime: Option<Arc<dyn PlayerRuntime>> = if args.no_player {
        None
    } else {
        Some(Arc::new(
            SimulatedRuntime::default().with_preloaded(&config.catalog.default_sound().locator),
        ))
    };

    let (engine, handle) = Engine::new(runtime, resolver, &config);
    let engine_thread = engine.spawn()?;

    let mut state = AppState::new(&config);
    apply_startup_args(&args, &handle)?;

    let result = run_tui(&handle, &mut state);

    let _ = handle.cmd_tx.send(EngineCommand::Quit);
    if engine_thread.join().is_err() {
        log::error!("Engine thread panicked");
    }

    result
}

fn apply_startup_args(args: &Args, handle: &EngineHandle) -> anyhow::Result<()> {
    if let Some(seconds) = args.fade {
        match FadeOut::from_seconds(seconds) {
            Some(fade_out) => handle.cmd_tx.send(EngineCommand::SetFadeOut(fade_out))?,
            None => log::warn!("Ignoring unsupported fade length {} s", seconds),
        }
    }
    if let Some(minutes) = args.timer {
        handle.cmd_tx.send(EngineCommand::SetTimer(minutes))?;
    }
    Ok(())
}

fn run_tui(handle: &EngineHandle, state: &mut AppState) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut router = Router::new(Box::new(PlaybackRoute));

    let result = (|| -> anyhow::Result<()> {
        loop {
            while let Ok(response) = handle.resp_rx.try_recv() {
                state.handle_response(response);
            }

            terminal.draw(|f| ui::draw(f, &*state, &router))?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press
                        && handle_key(key.code, state, handle, &mut router)?
                    {
                        return Ok(());
                    }
                }
            }
        }
    })();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Handle global keys and delegate route-specific input to the router.
/// Returns true when the app should quit.
fn handle_key(
    key: KeyCode,
    state: &mut AppState,
    handle: &EngineHandle,
    router: &mut Router,
) -> anyhow::Result<bool> {
    // A text field takes every key
    if !state.is_editing() {
        match key {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char(' ') => {
                handle.cmd_tx.send(EngineCommand::Toggle)?;
                return Ok(false);
            }
            KeyCode::Tab => {
                let tabs = tab_names();
                let current = tabs
                    .iter()
                    .position(|n| *n == router.root_name())
                    .unwrap_or(0);
                let next = route_for_name(tabs[(current + 1) % tabs.len()]);
                router.replace(next, state, handle)?;
                return Ok(false);
            }
            KeyCode::Esc if router.depth() > 1 => {
                router.pop(state, handle)?;
                return Ok(false);
            }
            _ => {}
        }
    }

    let action = router.current_mut().handle_input(key, state, handle)?;
    router.execute_action(action, state, handle)
}
