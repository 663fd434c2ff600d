use std::path::PathBuf;

use clap::Parser;
use replyhud_core::{Tone, MAX_TARGET_WORDS, MIN_TARGET_WORDS};

#[derive(Debug, Parser)]
#[command(name = "replyhud")]
#[command(about = "ReplyHUD - summarize a Reddit post, then draft replies in the tone you pick")]
#[command(long_about = "Summarize a Reddit post and its discussion, then draft replies in a \
chosen tone.\n\nCommands are read from stdin one per line; type `help` once running.\n\
The Gemini API key is read from --api-key, the config file, GOOGLE_API_KEY or GEMINI_API_KEY.")]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML, JSON or YAML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Gemini API key
    #[arg(long)]
    pub api_key: Option<String>,

    /// Gemini model name
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Post link to start with
    #[arg(short = 'u', long)]
    pub url: Option<String>,

    /// Initial reply tone
    #[arg(short = 't', long, value_enum)]
    pub tone: Option<Tone>,

    /// Target words per reply
    #[arg(
        short = 'w',
        long,
        value_parser = clap::value_parser!(u16).range(i64::from(MIN_TARGET_WORDS)..=i64::from(MAX_TARGET_WORDS))
    )]
    pub words: Option<u16>,

    /// Summarize from the link alone instead of fetching the thread first
    #[arg(long)]
    pub no_fetch: bool,

    /// Enable debug logging
    #[arg(short = 'd', long)]
    pub debug: bool,
}
