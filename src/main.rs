use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use mascot_mood::{load_settings, Companion, Enqueued, MascotError, Mood, Settings, SystemClock};

/// Drive the companion mascot's mood from the terminal.
#[derive(Parser, Debug)]
#[command(name = "mascot", version, about)]
struct Cli {
    /// Settings file (TOML or JSON). Defaults to the platform config dir.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log info messages
    #[arg(short, long)]
    verbose: bool,

    /// Log debug messages
    #[arg(long)]
    debug: bool,

    /// Override the idle timeout
    #[arg(long, value_name = "MS")]
    idle_timeout: Option<u64>,

    /// Override the idle check interval
    #[arg(long, value_name = "MS")]
    tick: Option<u64>,

    /// Mood at startup
    #[arg(long)]
    mood: Option<Mood>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Mood(Mood),
    Wake,
    Touch,
    Say(String),
    Next,
    Happy,
    Excited,
    Sleepy,
    Status,
    Mute,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = MascotError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        Ok(match word {
            "mood" => Command::Mood(rest.parse()?),
            "wake" => Command::Wake,
            "touch" => Command::Touch,
            "say" => Command::Say(rest.to_string()),
            "next" => Command::Next,
            "happy" => Command::Happy,
            "excited" => Command::Excited,
            "sleepy" => Command::Sleepy,
            "status" => Command::Status,
            "mute" => Command::Mute,
            "quit" | "exit" => Command::Quit,
            _ => Command::Help,
        })
    }
}

const HELP: &str = "commands: mood <name> | wake | touch | say <text> | next | happy | excited | sleepy | status | mute | quit";

fn resolve_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut settings = match load_settings(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(MascotError::ConfigPathUnavailable) => {
            tracing::warn!("No config directory available, using defaults");
            Settings::default()
        }
        Err(e) => return Err(e).context("Failed to load settings"),
    };

    if let Some(ms) = cli.idle_timeout {
        settings.idle_timeout_ms = ms;
    }
    if let Some(ms) = cli.tick {
        settings.tick_interval_ms = ms;
    }
    if let Some(mood) = cli.mood {
        settings.initial_mood = mood;
    }
    settings.validate()?;
    Ok(settings)
}

fn run_command(companion: &mut Companion, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Mood(mood) => companion.set_mood(mood),
        Command::Wake => companion.wake(),
        Command::Touch => companion.touch(),
        Command::Say(line) => match companion.speak(line) {
            Enqueued::Queued => {}
            Enqueued::Evicted(old) => println!("dropped: {old}"),
            Enqueued::Rejected(new) => println!("queue full, not queued: {new}"),
        },
        Command::Next => match companion.next_line() {
            Some(line) => println!("{line}"),
            None => {
                companion.stop_speaking();
                println!("(nothing to say)");
            }
        },
        Command::Happy => companion.make_happy(),
        Command::Excited => companion.make_excited(),
        Command::Sleepy => companion.make_sleepy(),
        Command::Status => println!("{}", serde_json::to_string(&companion.status())?),
        Command::Mute => {
            let muted = companion.sound().toggle_mute();
            println!("muted: {muted}");
        }
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set log level based on flags
    let log_level = if cli.debug {
        tracing::Level::DEBUG
    } else if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(log_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting mascot version {}", env!("CARGO_PKG_VERSION"));

    let settings = resolve_settings(&cli)?;
    let mut companion = Companion::start(&settings, Arc::new(SystemClock))?;
    let _log = companion.controller().subscribe_fn(|mood, config| {
        tracing::info!(
            %mood,
            breathing = config.breathing_speed,
            bounce = config.bounce_amplitude,
            eyes = config.eye_size,
            "Mood changed"
        );
    });

    let term_signal = tokio::signal::ctrl_c();
    tokio::pin!(term_signal);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(command) => run_command(&mut companion, command)?,
                    Err(e) => println!("error: {e}"),
                }
            }
            _ = &mut term_signal => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    companion.shutdown();
    tracing::info!("Mascot shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("mood happy".parse::<Command>().ok(), Some(Command::Mood(Mood::Happy)));
        assert_eq!(
            "say  hi there ".parse::<Command>().ok(),
            Some(Command::Say("hi there".to_string()))
        );
        assert_eq!("exit".parse::<Command>().ok(), Some(Command::Quit));
        assert_eq!("dance".parse::<Command>().ok(), Some(Command::Help));
    }

    #[test]
    fn test_parse_bad_mood() {
        assert!("mood grumpy".parse::<Command>().is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let dir = tempfile::TempDir::new().unwrap();
        let cli = Cli::parse_from([
            "mascot",
            "--config",
            dir.path().join("none.toml").to_str().unwrap(),
            "--idle-timeout",
            "1000",
            "--mood",
            "curious",
        ]);
        let settings = resolve_settings(&cli).unwrap();
        assert_eq!(settings.idle_timeout_ms, 1000);
        assert_eq!(settings.initial_mood, Mood::Curious);
    }
}
