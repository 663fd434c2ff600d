//! Line commands read from stdin.

use std::str::FromStr;

use replyhud_core::Tone;

pub const HELP: &str = "\
Commands:
  url <link>         set the Reddit post link (resets earlier results)
  analyze            summarize the post and its discussion
  generate           draft three more replies (alias: more)
  tone <name>        neutral, informative, humorous or supportive
  words <n>          target words per reply (clamped to 50-220)
  edit <n> <text>    replace reply n; write \\n for a line break
  copy <n>           print reply n for copying
  show               print the current state
  help               print this list
  quit               exit (alias: exit)";

/// One parsed line. Reply numbers are converted to 0-based indices here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Url(String),
    Analyze,
    Generate,
    Tone(Tone),
    Words(u16),
    Edit { index: usize, text: String },
    Copy(usize),
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command '{0}'. Type 'help' for the list.")]
    Unknown(String),

    #[error("'{command}' needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("'{0}' is not a reply number; replies are numbered from 1")]
    InvalidNumber(String),

    #[error("{0}")]
    InvalidTone(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(name, rest)| (name, rest.trim()));

        match name.to_lowercase().as_str() {
            "url" => Ok(Command::Url(required(rest, "url", "a link")?.to_string())),
            "analyze" | "analyse" => Ok(Command::Analyze),
            "generate" | "more" => Ok(Command::Generate),
            "tone" => required(rest, "tone", "a tone name")?
                .parse()
                .map(Command::Tone)
                .map_err(CommandError::InvalidTone),
            "words" => {
                let value = required(rest, "words", "a number")?;
                value
                    .parse()
                    .map(Command::Words)
                    .map_err(|_| CommandError::InvalidNumber(value.to_string()))
            }
            "edit" => {
                let rest = required(rest, "edit", "a reply number and the new text")?;
                let (number, text) = rest
                    .split_once(char::is_whitespace)
                    .ok_or(CommandError::MissingArgument {
                        command: "edit",
                        argument: "the new text",
                    })?;
                Ok(Command::Edit {
                    index: reply_index(number)?,
                    text: text.trim().replace("\\n", "\n"),
                })
            }
            "copy" => Ok(Command::Copy(reply_index(required(rest, "copy", "a reply number")?)?)),
            "show" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            _ => Err(CommandError::Unknown(name.to_string())),
        }
    }
}

fn required<'a>(
    rest: &'a str,
    command: &'static str,
    argument: &'static str,
) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument { command, argument })
    } else {
        Ok(rest)
    }
}

fn reply_index(number: &str) -> Result<usize, CommandError> {
    match number.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(CommandError::InvalidNumber(number.to_string())),
    }
}
