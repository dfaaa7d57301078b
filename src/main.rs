use color_eyre::Result;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use fairweather_tui::{
    api::{Geocoder, WeatherApi},
    app::App,
    config::Config,
    events::EventHandler,
    location, logging,
    runtime::Dispatcher,
    ui,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Instrumentation and safety
    let _log_guard = logging::initialize_logging();
    color_eyre::install()?;
    install_panic_hook();

    let config = Config::load();
    let (lat, lon) = if config.map.auto_locate {
        location::get_current_location(&config.map).await
    } else {
        (config.map.default_lat, config.map.default_lon)
    };
    info!("Starting at ({}, {}) against {}", lat, lon, config.server.base_url);

    let api = WeatherApi::new(&config.server)?;
    let geocoder = Geocoder::new(&config.geocoder)?;

    // Ready terminal and state
    let mut terminal = setup_terminal()?;
    let mut app = App::new(&config, lat, lon);
    let mut events = EventHandler::new(config.ui.tick_rate_ms);
    let dispatcher = Dispatcher::new(api, geocoder, events.tx.clone());

    app.start();

    // Main loop
    while !app.should_quit {
        for effect in app.take_effects() {
            dispatcher.run(effect);
        }

        terminal.draw(|f| ui::render(f, &app))?;

        match events.next().await {
            Some(event) => {
                let frame = terminal.size()?;
                app.on_event(event, frame);
            }
            None => break,
        }
    }

    restore_terminal(terminal)?;
    info!("Bye.");
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(
        stdout,
        crossterm::terminal::EnterAlternateScreen,
        EnableMouseCapture,
        crossterm::cursor::Hide
    )?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::cursor::Show
    )?;
    Ok(())
}

fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Force terminal cleanup!
        crossterm::terminal::disable_raw_mode().ok();
        crossterm::execute!(
            std::io::stdout(),
            DisableMouseCapture,
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::cursor::Show
        )
        .ok();
        original_hook(panic_info);
    }));
}
