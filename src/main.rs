use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{
    self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
    KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use pop_map::app::App;
use pop_map::config::{AppConfig, LogConfig};
use pop_map::region::{DistanceUnit, RegionSet};
use pop_map::{data, ui};
use ratatui::DefaultTerminal;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Hover a region to highlight the nearest regions whose combined population
/// matches a reference city
#[derive(Parser, Debug)]
#[command(name = "pop-map", version, about)]
struct Cli {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// GeoJSON FeatureCollection of region polygons
    #[arg(long)]
    regions: Option<PathBuf>,

    /// JSON object mapping region id to population
    #[arg(long)]
    populations: Option<PathBuf>,

    /// Population the highlighted area has to reach
    #[arg(long)]
    target_population: Option<f64>,

    /// Name of the reference city shown in the summary
    #[arg(long)]
    target_name: Option<String>,

    /// Distance unit used for ranking and the status bar
    #[arg(long, value_enum)]
    units: Option<DistanceUnit>,

    /// Log file (the terminal belongs to the map)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load_from_file(path)?,
            None => AppConfig::default(),
        };
        if let Some(path) = self.regions {
            config.data.regions = path;
        }
        if let Some(path) = self.populations {
            config.data.populations = path;
        }
        if let Some(population) = self.target_population {
            config.target.population = population;
        }
        if let Some(name) = self.target_name {
            config.target.name = name;
        }
        if let Some(unit) = self.units {
            config.target.unit = unit;
        }
        if let Some(path) = self.log_file {
            config.log.file = path;
        }
        config.validate()?;
        Ok(config)
    }
}

fn init_logging(config: &LogConfig) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.file)
        .with_context(|| format!("Failed to open log file: {:?}", config.file))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let config = Cli::parse().into_config()?;
    init_logging(&config.log)?;

    // Load before taking over the terminal so errors print normally
    let regions = Arc::new(data::load_regions(&config.data)?);
    info!(
        target_name = %config.target.name,
        target_population = config.target.population,
        "starting"
    );

    let mut terminal = ratatui::init();
    terminal.clear()?;
    execute!(std::io::stdout(), EnableMouseCapture, EnableFocusChange)?;

    let result = run(&mut terminal, regions, config);

    let _ = execute!(std::io::stdout(), DisableFocusChange, DisableMouseCapture);
    ratatui::restore();

    result
}

/// Handle mouse events for hovering, panning and zooming
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        // Hover or tap picks the region under the pointer
        MouseEventKind::Moved => app.hover_at(mouse.column, mouse.row),
        MouseEventKind::Down(MouseButton::Left) => {
            app.hover_at(mouse.column, mouse.row);
            app.last_mouse = Some((mouse.column, mouse.row));
        }
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        MouseEventKind::Drag(MouseButton::Left) => {
            app.handle_drag(mouse.column, mouse.row);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            app.end_drag();
        }
        _ => {}
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),

        // Pan with hjkl or arrow keys
        KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
        KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
        KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
        KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),

        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
        KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

        KeyCode::Char('b') | KeyCode::Char('B') => app.renderer.toggle_outlines(),
        KeyCode::Char('f') | KeyCode::Char('F') => app.renderer.toggle_selection(),

        KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(),
        KeyCode::Char('c') => app.clear_selection(),

        _ => {}
    }
}

fn handle_event(app: &mut App, event: Event) {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
        Event::Mouse(mouse) => handle_mouse(app, mouse),
        Event::Resize(width, height) => app.resize(width as usize, height as usize),
        // Pointer left the terminal
        Event::FocusLost => app.clear_selection(),
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, regions: Arc<RegionSet>, config: AppConfig) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(regions, config, size.width as usize, size.height as usize);

    loop {
        terminal.draw(|frame| ui::render(frame, &app))?;

        if event::poll(Duration::from_millis(16))? {
            handle_event(&mut app, event::read()?);
        }

        if app.should_quit {
            break;
        }
    }

    info!("exiting");
    Ok(())
}
