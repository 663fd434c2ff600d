//! ReplyHUD CLI Entry Point
//!
//! Builds the configuration, wires the Gemini gateway and thread fetcher into
//! a workflow session, then reads one command per line from stdin.

mod cli;
mod commands;
mod config;
mod render;

use std::io::{IsTerminal, Write};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use replyhud_core::{AiGateway, WorkflowSession};
use replyhud_llm::{GeminiClient, RedditThreadFetcher};

use crate::cli::Cli;
use crate::commands::{Command, HELP};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::build_config(&cli)?;
    replyhud_utils::init_logging(&config.logging)?;
    config.validate()?;

    let gateway = GeminiClient::new(config.llm.gemini.clone())?;
    debug!(model = gateway.model(), "Gemini client ready");

    let session = if config.llm.thread.enabled {
        let fetcher = RedditThreadFetcher::new(config.llm.thread.clone())?;
        WorkflowSession::with_thread_source(gateway, Arc::new(fetcher), &config.core)
    } else {
        WorkflowSession::new(gateway, &config.core)
    };

    if let Some(url) = &cli.url {
        session.change_url(url.trim())?;
    }

    run(&session).await
}

async fn run<G: AiGateway + 'static>(session: &WorkflowSession<G>) -> Result<()> {
    let interactive = std::io::stdin().is_terminal();
    if interactive {
        println!("💬 ReplyHUD: type 'help' for commands");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if interactive {
            print!("> ");
            std::io::stdout().flush()?;
        }
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(command) => execute(session, command).await,
            Err(e) => eprintln!("❌ {e}"),
        }
    }
    Ok(())
}

async fn execute<G: AiGateway + 'static>(session: &WorkflowSession<G>, command: Command) {
    let outcome = match command {
        Command::Url(text) => session.change_url(text.trim()),
        Command::Analyze => {
            println!("🔍 Summarizing the post...");
            session.analyze().await.map(|()| {
                print!("{}", render::snapshot(&session.snapshot()));
            })
        }
        Command::Generate => {
            println!("✍️  Drafting replies...");
            session.generate_comments().await.map(|()| {
                print!("{}", render::comments(&session.snapshot()));
            })
        }
        Command::Tone(tone) => session.select_tone(tone),
        Command::Words(words) => session.set_target_words(words).map(|()| {
            println!("Target length: ~{} words", session.snapshot().target_words);
        }),
        Command::Edit { index, text } => session.edit_comment(index, text),
        Command::Copy(index) => session.copy(index).map(|copied| match copied {
            Some(text) => println!("{text}"),
            None => eprintln!("Nothing to copy at reply {}", index + 1),
        }),
        Command::Show => {
            print!("{}", render::snapshot(&session.snapshot()));
            Ok(())
        }
        Command::Help => {
            println!("{HELP}");
            Ok(())
        }
        Command::Quit => Ok(()),
    };

    if let Err(e) = outcome {
        eprintln!("❌ {e}");
    }
}
