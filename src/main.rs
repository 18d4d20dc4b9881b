use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use folio::{
    cli,
    config::{self, Config, SourceKind},
    error, warning,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Serve the site with the now-playing widget
    Serve(ServeOptions),

    /// Poll the now-playing source once
    NowPlaying(SourceOptions),

    /// Check the refresh credential by minting one access token
    Refresh,

    /// Obtain initial Spotify access and refresh tokens
    Token,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ServeOptions {
    /// Address to bind, overrides SERVER_ADDRESS
    #[clap(long)]
    pub addr: Option<String>,

    #[clap(flatten)]
    pub source: SourceOptions,
}

#[derive(Parser, Debug, Clone)]
pub struct SourceOptions {
    /// Now-playing source (spotify or presence), overrides NOW_PLAYING_SOURCE
    #[clap(long, value_parser = parse_source)]
    pub source: Option<SourceKind>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn parse_source(value: &str) -> Result<SourceKind, String> {
    value.parse().map_err(|e: config::ConfigError| e.to_string())
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        warning!("Cannot load environment files. Err: {}", e);
    }

    let cli = Cli::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => error!("Invalid configuration: {}", e),
    };

    match cli.command {
        Command::Serve(opt) => {
            if let Some(addr) = opt.addr {
                config.server_addr = addr;
            }
            if let Some(source) = opt.source.source {
                config.source = source;
            }
            cli::serve(config).await
        }
        Command::NowPlaying(opt) => {
            if let Some(source) = opt.source {
                config.source = source;
            }
            cli::now_playing(config).await
        }
        Command::Refresh => cli::refresh(config).await,
        Command::Token => cli::token(config).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
