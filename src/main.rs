use anyhow::Result;
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use slatewire::app::{run_caption_command, run_pipe_command};
use slatewire::audio::capture::list_devices;
use slatewire::cli::{Cli, Commands, ConfigAction};
use slatewire::config::Config;
use std::io::IsTerminal;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            let config = load_config(cli.config.as_deref())?;
            if std::io::stdin().is_terminal() {
                // Mic mode
                run_caption_command(config, cli.device, cli.token_url, cli.relay, cli.quiet)
                    .await?;
            } else {
                // Pipe mode: stdin has WAV data
                run_pipe_command(config, cli.token_url, cli.relay, cli.quiet).await?;
            }
        }
        Some(Commands::Devices) => {
            let devices = list_devices()?;
            if devices.is_empty() {
                eprintln!("No audio input devices found");
            } else {
                println!("{}", "Audio input devices:".bold());
                for device in devices {
                    println!("  {}", device);
                }
            }
        }
        Some(Commands::Config { action }) => {
            let path = cli
                .config
                .clone()
                .map(Ok)
                .unwrap_or_else(Config::default_path)?;
            match action {
                ConfigAction::Path => println!("{}", path.display()),
                ConfigAction::Show => {
                    let config = load_config(cli.config.as_deref())?;
                    print!("{}", config.to_toml()?);
                }
                ConfigAction::Init => {
                    if path.exists() {
                        eprintln!("Config already exists at {}", path.display());
                    } else {
                        Config::default().save(&path)?;
                        println!("Wrote default config to {}", path.display().green());
                    }
                }
            }
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Load config from the given path, or the default location, with env
/// overrides applied.
fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(p) => Config::load(p)?,
        None => Config::load_or_default(&Config::default_path()?)?,
    };
    Ok(config.with_env_overrides())
}
