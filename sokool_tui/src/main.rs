use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use ratatui::{
    crossterm::{
        self,
        event::{self, Event, KeyCode, KeyEventKind},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
    widgets::*,
};
use sokool_core::{
    Direction, Position,
    config::GameConfig,
    environment::{Action, GameState, Level, TurnOutcome},
    map::{Grid, OccupantKind},
};
use std::{
    collections::HashMap,
    fs,
    io::{self, Stdout},
    path::{Path, PathBuf},
    time::Duration,
};

/// Drawn wherever the room has no coordinate.
const BACKGROUND_CHARACTER: char = '/';

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory holding `<N> - <title>.txt` room files
    #[arg(short, long, value_name = "DIR", default_value = "rooms")]
    rooms: PathBuf,

    /// Room number to start from
    #[arg(long, value_name = "N", default_value_t = 1)]
    room: u32,

    /// JSON file overriding the default game rules
    #[arg(short, long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Write log records to this file
    #[arg(long, value_name = "LOG_FILE")]
    log_file: Option<PathBuf>,
}

struct App {
    /// The core game state.
    game: GameState,
    /// Feedback from the last turn.
    message: String,
    /// Whether the stats panel is open. Movement is locked while it is.
    show_stats: bool,
    /// Flag to control the main loop.
    should_quit: bool,
    /// Set on defeat or victory.
    game_over: bool,
}

impl App {
    fn new(game: GameState) -> Self {
        let message = room_title(game.current_level());
        App {
            game,
            message,
            show_stats: false,
            should_quit: false,
            game_over: false,
        }
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<()> {
        if self.show_stats {
            match code {
                KeyCode::Char('c') | KeyCode::Char('m') => self.show_stats = false,
                KeyCode::Char('q') | KeyCode::Esc => self.quit(),
                _ => {}
            }
            return Ok(());
        }

        let action = match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.quit();
                return Ok(());
            }
            KeyCode::Char('m') => {
                self.show_stats = true;
                return Ok(());
            }
            KeyCode::Char('r') => {
                self.game.restart_room()?;
                self.game_over = false;
                self.message = room_title(self.game.current_level());
                return Ok(());
            }
            KeyCode::Left => Action::Move(Direction::Left),
            KeyCode::Up => Action::Move(Direction::Up),
            KeyCode::Right => Action::Move(Direction::Right),
            KeyCode::Down => Action::Move(Direction::Down),
            KeyCode::Char('a') => Action::PlaceBlock(Direction::Left),
            KeyCode::Char('w') => Action::PlaceBlock(Direction::Up),
            KeyCode::Char('d') => Action::PlaceBlock(Direction::Right),
            KeyCode::Char('s') => Action::PlaceBlock(Direction::Down),
            _ => return Ok(()),
        };

        if !self.game_over {
            self.tick(action)?;
        }
        Ok(())
    }

    /// Handles one turn of the game.
    fn tick(&mut self, action: Action) -> Result<()> {
        match self.game.step(action)? {
            TurnOutcome::Rejected(err) => self.message = err.to_string(),
            TurnOutcome::Advanced => self.message.clear(),
            TurnOutcome::RoomComplete { completed } => {
                self.message = format!(
                    "Room {completed} complete! {}",
                    room_title(self.game.current_level())
                );
            }
            TurnOutcome::Victory => {
                self.game_over = true;
                self.message = "Every room is complete. Press q to quit.".to_string();
            }
            TurnOutcome::Defeat => {
                self.game_over = true;
                self.message = "You have been defeated. (r)estart or (q)uit.".to_string();
            }
        }
        Ok(())
    }

    /// Sets the quit flag.
    fn quit(&mut self) {
        self.should_quit = true;
    }
}

fn room_title(level: &Level) -> String {
    format!("Room {}: {}", level.number, level.name)
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    if let Some(log_file) = &args.log_file {
        init_logging(log_file)?;
    }

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GameConfig::default(),
    };

    let levels = load_levels(&args.rooms, args.room)?;
    info!("Loaded {} rooms from {}", levels.len(), args.rooms.display());
    let game = GameState::new(levels, config)?;

    // Set up the terminal
    let mut terminal = setup_terminal()?;

    // Create the application state
    let mut app = App::new(game);

    // Run the main application loop, restoring the terminal either way
    let result = run_app(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;

    result
}

/// Sends log records to `path`; the terminal belongs to the game.
fn init_logging(path: &Path) -> Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn load_config(path: &Path) -> Result<GameConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Invalid config file {}", path.display()))
}

/// Splits a room file name such as `3 - Corridor.txt` into number and title.
fn parse_room_file_name(file_name: &str) -> Option<(u32, String)> {
    let stem = file_name.strip_suffix(".txt")?;
    let (number, title) = stem.split_once(" - ")?;
    Some((number.trim().parse().ok()?, title.trim().to_string()))
}

/// Reads every room file in `dir` numbered `first` or above, ordered by number.
fn load_levels(dir: &Path, first: u32) -> Result<Vec<Level>> {
    if !dir.is_dir() {
        return Err(anyhow::anyhow!(
            "Rooms directory does not exist: {}",
            dir.display()
        ));
    }

    let mut levels = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let Some((number, name)) = parse_room_file_name(file_name) else {
            continue;
        };
        if number < first {
            continue;
        }
        let layout = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read room file {}", path.display()))?;
        levels.push(Level {
            number,
            name,
            layout,
        });
    }
    levels.sort_by_key(|level| level.number);

    if levels.is_empty() {
        return Err(anyhow::anyhow!(
            "No rooms numbered {first} or above in {}",
            dir.display()
        ));
    }
    Ok(levels)
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Runs the main loop of the TUI application.
fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    let poll_rate = Duration::from_millis(250);

    loop {
        terminal.draw(|f| ui(f, app))?;

        // The game is turn based: nothing changes until a key is pressed.
        if crossterm::event::poll(poll_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code)?;
                }
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Renders the user interface.
fn ui(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Area for the room
            Constraint::Length(3), // Area for status/help
        ])
        .split(frame.area());

    render_room(frame, main_layout[0], app);
    render_status(frame, main_layout[1], app);

    if app.show_stats {
        render_stats(frame, main_layout[0], app);
    }
}

fn occupant_style(kind: OccupantKind, on_goal: bool) -> Style {
    match kind {
        OccupantKind::Player => Style::default().fg(Color::Red).bold(),
        OccupantKind::Enemy { stuck: false, .. } => Style::default().fg(Color::Magenta).bold(),
        OccupantKind::Enemy { stuck: true, .. } => Style::default().fg(Color::DarkGray),
        OccupantKind::Wall => Style::default().fg(Color::Gray),
        OccupantKind::PushBlock if on_goal => Style::default().fg(Color::Green).bold(),
        OccupantKind::PushBlock => Style::default().fg(Color::Yellow),
        OccupantKind::PlaceBlock => Style::default().fg(Color::Cyan),
        OccupantKind::Goal => Style::default().fg(Color::Green),
        OccupantKind::Empty => Style::default(),
    }
}

/// Renders the room grid and its annotations.
fn render_room(frame: &mut Frame, area: Rect, app: &App) {
    let grid: &Grid = &app.game.grid;

    let mut annotation_chars: HashMap<Position, char> = HashMap::new();
    let mut width = grid.width();
    for annotation in &app.game.annotations {
        let start = annotation.position;
        for (offset, ch) in annotation.text.chars().enumerate() {
            annotation_chars.insert(Position::new(start.x + offset as i32, start.y), ch);
        }
        width = width.max(start.x + annotation.text.chars().count() as i32);
    }

    let mut lines: Vec<Line> = Vec::with_capacity(grid.height() as usize);
    for y in 0..grid.height() {
        let mut spans: Vec<Span> = Vec::with_capacity(width as usize);
        for x in 0..width {
            let position = Position::new(x, y);
            let span = match grid.get(position) {
                Ok(occupant) => {
                    let on_goal = grid.goals().contains(&position);
                    Span::styled(
                        occupant.kind.glyph().to_string(),
                        occupant_style(occupant.kind, on_goal),
                    )
                }
                Err(_) => match annotation_chars.get(&position) {
                    Some(ch) => Span::raw(ch.to_string()),
                    None => Span::styled(
                        BACKGROUND_CHARACTER.to_string(),
                        Style::default().fg(Color::DarkGray),
                    ),
                },
            };
            spans.push(span);
        }
        lines.push(Line::from(spans));
    }

    let title = room_title(app.game.current_level());
    let room_paragraph = Paragraph::new(lines)
        .block(Block::default().title(title).borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(room_paragraph, area);
}

/// Renders the move counter, last message and key help.
fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let player = &app.game.player;
    let status = Line::from(vec![
        Span::styled(
            format!("{} MOVES", player.moves),
            Style::default().bold(),
        ),
        Span::raw(format!("  HP {}/{}  ", player.hp, player.max_hp)),
        Span::raw(&app.message),
    ]);
    let help = "arrows move, wasd place block, (m)enu, (r)estart, (q)uit";
    let status_widget = Paragraph::new(status).block(
        Block::default()
            .borders(Borders::ALL)
            .title_bottom(Line::from(help).right_aligned()),
    );
    frame.render_widget(status_widget, area);
}

/// Renders the stats panel over the centre of `area`.
fn render_stats(frame: &mut Frame, area: Rect, app: &App) {
    let player = &app.game.player;
    let items = vec![
        ListItem::new(format!("HP: {}/{}", player.hp, player.max_hp)),
        ListItem::new(format!("BLOCKS: {}/{}", player.blocks, player.max_blocks)),
        ListItem::new(format!("MOVES: {}", player.moves)),
        ListItem::new(format!("XP: {}", player.xp)),
        ListItem::new(format!("TURN: {}", app.game.turn)),
        ListItem::new(""),
        ListItem::new("(c)LOSE (q)UIT"),
    ];

    let popup = centered_rect(area, 22, items.len() as u16 + 2);
    let stats_widget =
        List::new(items).block(Block::default().borders(Borders::ALL).title("Stats"));
    frame.render_widget(Clear, popup);
    frame.render_widget(stats_widget, popup);
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
