//! CLI definitions and the interactive command prompt.

use std::path::PathBuf;

use clap::Parser;

/// Gallery Tagger CLI.
#[derive(Parser)]
#[command(name = "gallery-tagger")]
#[command(about = "Keyboard-driven description tagging for a photo gallery")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (built-in defaults when omitted)
    #[arg(short, long, env = "GALLERY_TAGGER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Name-shortcut file (names.json)
    #[arg(short, long)]
    pub names: Option<PathBuf>,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,

    /// Seconds to wait for the gallery page to become ready
    #[arg(short, long)]
    pub timeout: Option<u64>,
}

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PromptCommand {
    Next,
    Previous,
    Append(String),
    Backspace,
    Clear,
    End,
    Read,
    State,
    Reload,
    Names,
    /// Insert the name bound to a shortcut key.
    Name(String),
    Help,
    Quit,
}

pub(crate) const HELP: &str = "\
commands:
  next | n              go to the next item
  prev | p              go to the previous item
  append <text> | a     append text to the description
  bs                    delete one character
  clear                 delete the whole description
  end                   move the caret to the end
  read                  print the current description
  state                 print the session state as JSON
  reload                reload the names file
  names                 list name shortcuts
  name <key>            append the name bound to <key>
  quit | q              stop and exit";

impl PromptCommand {
    /// Parse a prompt line. Blank lines give `Ok(None)`.
    pub(crate) fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim_end_matches(['\n', '\r']);
        let trimmed = line.trim_start();
        if trimmed.trim().is_empty() {
            return Ok(None);
        }
        let (word, rest) = match trimmed.split_once(' ') {
            Some((word, rest)) => (word, rest),
            None => (trimmed, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "next" | "n" => PromptCommand::Next,
            "prev" | "previous" | "p" => PromptCommand::Previous,
            // text after the first space is kept verbatim, including spaces
            "append" | "a" if !rest.is_empty() => PromptCommand::Append(rest.to_string()),
            "append" | "a" => return Err("append needs some text".to_string()),
            "bs" | "backspace" => PromptCommand::Backspace,
            "clear" => PromptCommand::Clear,
            "end" => PromptCommand::End,
            "read" => PromptCommand::Read,
            "state" => PromptCommand::State,
            "reload" => PromptCommand::Reload,
            "names" => PromptCommand::Names,
            "name" => match rest.trim() {
                "" => return Err("name needs a shortcut key".to_string()),
                key => PromptCommand::Name(key.to_string()),
            },
            "help" | "?" => PromptCommand::Help,
            "quit" | "exit" | "q" => PromptCommand::Quit,
            other => return Err(format!("unknown command: {} (try help)", other)),
        };
        Ok(Some(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> PromptCommand {
        PromptCommand::parse(line).unwrap().unwrap()
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse("next"), PromptCommand::Next);
        assert_eq!(parse("P\n"), PromptCommand::Previous);
        assert_eq!(parse("bs"), PromptCommand::Backspace);
        assert_eq!(parse("clear"), PromptCommand::Clear);
        assert_eq!(parse("  quit"), PromptCommand::Quit);
    }

    #[test]
    fn test_append_keeps_spacing() {
        assert_eq!(parse("append  Dennis "), PromptCommand::Append(" Dennis ".to_string()));
        assert!(PromptCommand::parse("append").is_err());
    }

    #[test]
    fn test_name_takes_key() {
        assert_eq!(parse("name d"), PromptCommand::Name("d".to_string()));
        assert!(PromptCommand::parse("name  ").is_err());
    }

    #[test]
    fn test_blank_and_unknown() {
        assert_eq!(PromptCommand::parse("   \n").unwrap(), None);
        assert!(PromptCommand::parse("jump").unwrap_err().contains("jump"));
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["gallery-tagger", "--headless", "-t", "45", "--names", "n.json"]);
        assert!(cli.headless);
        assert_eq!(cli.timeout, Some(45));
        assert_eq!(cli.names, Some(PathBuf::from("n.json")));
    }
}
