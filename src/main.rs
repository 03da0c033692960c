mod common;
mod completions;
mod ui;
mod video;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

use crate::completions::CompletionCommands;
use crate::ui::prelude::*;
use crate::video::cli::DirArgs;
use crate::video::{VideoCommands, VideoToolConfig, handle_video_command};

/// Resize, split and crop videos from the terminal
#[derive(Parser, Debug)]
#[command(name = "vidtool", author, version, about, long_about = None)]
struct Cli {
    /// Activate debug mode
    #[arg(short, long, global = true)]
    debug: bool,

    /// Output format for messages
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Use this config file instead of the default location
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(flatten)]
    Video(VideoCommands),

    /// Shell completion scripts
    Completions {
        #[command(subcommand)]
        command: CompletionCommands,
    },
}

pub fn cli_command() -> clap::Command {
    Cli::command()
}

fn main() {
    let cli = Cli::parse();

    ui::init(cli.output, !cli.no_color);
    ui::set_debug_mode(cli.debug);

    if let Err(err) = run(cli) {
        emit(
            Level::Error,
            "vidtool.error",
            &format!("Error: {err:#}"),
            Some(serde_json::json!({
                "chain": err.chain().map(|e| e.to_string()).collect::<Vec<_>>(),
            })),
        );
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Completions { command }) => handle_completions(command),
        Some(Commands::Video(command)) => {
            let config = load_config(cli.config)?;
            handle_video_command(command, &config)
        }
        None => {
            let config = load_config(cli.config)?;
            handle_video_command(
                VideoCommands::Menu(DirArgs {
                    dir: PathBuf::from("."),
                }),
                &config,
            )
        }
    }
}

fn load_config(path: Option<PathBuf>) -> Result<VideoToolConfig> {
    let config = match path {
        Some(path) => VideoToolConfig::load_from_path(path)?,
        None => VideoToolConfig::load()?,
    };
    emit(
        Level::Debug,
        "vidtool.config",
        &format!(
            "Using ffmpeg '{}', ffprobe '{}', codec {}/{}",
            config.ffmpeg_path, config.ffprobe_path, config.video_codec, config.audio_codec
        ),
        None,
    );
    Ok(config)
}

fn handle_completions(command: CompletionCommands) -> Result<()> {
    match command {
        CompletionCommands::Generate { shell } => {
            print!("{}", completions::generate(shell)?);
            Ok(())
        }
        CompletionCommands::Install {
            shell,
            path,
            force,
        } => {
            let path = completions::install(shell, path, force)?;
            emit(
                Level::Success,
                "completions.installed",
                &format!("Installed {} completions to {}", shell, path.display()),
                None,
            );
            print_block(&completions::instructions(shell, &path));
            Ok(())
        }
    }
}
