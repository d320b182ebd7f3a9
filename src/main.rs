use clap::{Parser, Subcommand, ValueEnum};
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use pascaline::logging::try_init_tracing;
use pascaline::{
    CarryMode, Clock, Locale, ManualClock, Pascaline, PascalineConfig, PascalineError,
    PascalineWidget, SystemClock, WidgetAction,
};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing::level_filters::LevelFilter;

/// Time between animation frames
const FRAME: Duration = Duration::from_millis(16);

/// A mechanical adding machine in your terminal
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Number of digit wheels
    #[arg(long, default_value_t = 6)]
    wheels: usize,

    /// Wheels below this index show the fractional part
    #[arg(long, default_value_t = 3)]
    split: usize,

    /// Animation duration in milliseconds
    #[arg(long, default_value_t = 350.0)]
    duration: f64,

    #[arg(long, value_enum, default_value_t = CarryModeArg::Reference)]
    carry_mode: CarryModeArg,

    /// Number format, `es-ES` or `en-US`
    #[arg(long, default_value = "es-ES", value_parser = parse_locale)]
    locale: Locale,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive machine (the default)
    Tui,
    /// Add one unit to each listed wheel and print the total
    Sum {
        /// Wheel indexes, 0 being the least significant
        indexes: Vec<usize>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum CarryModeArg {
    Reference,
    Generalized,
}

impl From<CarryModeArg> for CarryMode {
    fn from(arg: CarryModeArg) -> Self {
        match arg {
            CarryModeArg::Reference => CarryMode::Reference,
            CarryModeArg::Generalized => CarryMode::Generalized,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

fn parse_locale(tag: &str) -> Result<Locale, String> {
    Locale::from_tag(tag).ok_or_else(|| format!("unknown locale '{tag}', expected es-ES or en-US"))
}

impl Cli {
    fn config(&self) -> PascalineConfig {
        PascalineConfig {
            wheel_count: self.wheels,
            split_index: self.split,
            animation_duration: self.duration,
            carry_mode: self.carry_mode.into(),
            locale: self.locale,
            ..Default::default()
        }
    }
}

/// Raw mode and the alternate screen for as long as it lives
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, Hide)?;
        Ok(TerminalGuard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
        let _ = disable_raw_mode();
    }
}

fn terminal_size() -> (usize, usize) {
    termsize::get()
        .map(|size| (usize::from(size.cols), usize::from(size.rows)))
        .unwrap_or((80, 24))
}

fn run_tui(config: PascalineConfig) -> Result<(), PascalineError> {
    let pascaline = Pascaline::new(config, SystemClock::new())?;
    let mut widget = PascalineWidget::new(pascaline);
    let _guard = TerminalGuard::enter()?;
    let mut stdout = io::stdout();

    loop {
        let (width, height) = terminal_size();
        widget.paint(&mut stdout, width, height)?;

        if event::poll(FRAME)? {
            if let Event::Key(key) = event::read()? {
                if widget.handle_key(key) == WidgetAction::Quit {
                    break;
                }
            }
        }
        widget.tick();
    }

    tracing::info!(total = widget.pascaline().total(), "quit");
    Ok(())
}

fn run_sum(config: PascalineConfig, indexes: &[usize]) -> Result<String, PascalineError> {
    let clock = ManualClock::new();
    let mut pascaline = Pascaline::new(config, clock.clone())?;
    for &index in indexes {
        pascaline.add_unit(index, 1);
    }
    while pascaline.tick() {
        clock.advance(FRAME.as_secs_f64() * 1000.0);
    }
    tracing::info!(presses = indexes.len(), elapsed = clock.now(), "settled");
    Ok(pascaline.total().to_string())
}

/// Main function
fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    try_init_tracing(cli.log_level.into(), cli.log_file.as_deref())?;

    let config = cli.config();
    match &cli.command {
        None | Some(Command::Tui) => run_tui(config)?,
        Some(Command::Sum { indexes }) => println!("{}", run_sum(config, indexes)?),
    }

    Ok(())
}
