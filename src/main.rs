mod app;
mod bridge;
mod config;
mod debounce;
mod input;
mod lyrics;
mod player;
mod tui;
mod volume;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "void-plugins", version, about = "Lyrics lookup and precise volume control for a YouTube Music player")]
struct Cli {
    /// Override config file path.
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the terminal player (default).
    Tui {
        /// File or URL to start playing.
        #[arg(long)]
        file: Option<String>,
    },
    /// Speak the JSON-lines bridge protocol on stdin/stdout.
    Serve,
    /// Look up lyrics once and print them (headless).
    Lyrics {
        #[arg(long)]
        artist: String,
        #[arg(long)]
        title: String,
    },
    /// Inspect or change the persisted volume options.
    Volume {
        #[command(subcommand)]
        cmd: VolumeCommand,
    },
}

#[derive(Debug, Subcommand)]
enum VolumeCommand {
    /// Print the volume options.
    Show,
    /// Set the volume change per wheel tick / arrow press.
    Steps { steps: u8 },
    /// Enable or disable the ArrowUp/ArrowDown shortcuts.
    Arrows { state: Toggle },
    /// Forget the saved volume.
    Forget,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // stdout belongs to the bridge protocol / terminal UI.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref()).context("load config")?;

    match cli.command.unwrap_or(Command::Tui { file: None }) {
        Command::Tui { file } => {
            let mut app = app::App::new(cfg, cli.config.clone())?;
            let mut terminal = tui::TerminalGuard::enter().context("init terminal")?;
            app.run(terminal.terminal_mut(), file.as_deref()).await?;
        }
        Command::Serve => {
            bridge::serve(cfg, cli.config.clone()).await?;
        }
        Command::Lyrics { artist, title } => {
            let resolver = lyrics::LyricsResolver::from_config(&cfg.lyrics)?;
            let meta = lyrics::TrackMetadata::new(artist, title);
            match resolver.resolve(&meta).await {
                Some(text) => println!("{text}"),
                None => {
                    eprintln!("No lyrics found for {} - {}", meta.artist, meta.title);
                    std::process::exit(1);
                }
            }
        }
        Command::Volume { cmd } => {
            let mut cfg = cfg;
            match cmd {
                VolumeCommand::Show => {
                    println!("{}", toml::to_string_pretty(&cfg.volume)?);
                    return Ok(());
                }
                VolumeCommand::Steps { steps } => {
                    if steps == 0 {
                        anyhow::bail!("steps must be at least 1");
                    }
                    cfg.volume.steps = steps;
                }
                VolumeCommand::Arrows { state } => {
                    cfg.volume.arrows_shortcut = matches!(state, Toggle::On);
                }
                VolumeCommand::Forget => {
                    cfg.volume.saved_volume = None;
                }
            }
            config::save(&cfg, cli.config.as_deref()).context("save config")?;
            println!("Updated volume options.");
        }
    }

    Ok(())
}
