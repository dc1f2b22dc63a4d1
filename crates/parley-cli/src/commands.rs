//! REPL line parsing.

use thiserror::Error;

/// A conversation picked either by its 1-based position in `/list` or by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Index(usize),
    Id(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    New,
    List,
    Select(Target),
    Delete(Target),
    Webhook(String),
    History,
    Help,
    Quit,
    /// Anything that is not a command goes to the active conversation.
    Send(String),
    Empty,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("/{0} needs an argument")]
    MissingArgument(&'static str),

    #[error("unknown command /{0}, try /help")]
    Unknown(String),
}

pub const HELP: &str = "\
/new              start a new conversation
/list             list conversations, most recent first
/select <n|id>    open a conversation
/delete <n|id>    delete a conversation and its history
/webhook <url>    save and switch to a webhook endpoint
/history          show the open conversation again
/help             this text
/quit             exit
anything else is sent to the open conversation";

pub fn parse(line: &str) -> Result<Command, CommandError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(Command::Empty);
    }

    let Some(rest) = trimmed.strip_prefix('/') else {
        return Ok(Command::Send(line.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    let command = match name {
        "new" => Command::New,
        "list" | "ls" => Command::List,
        "select" | "open" => Command::Select(target(arg).ok_or(CommandError::MissingArgument("select"))?),
        "delete" | "rm" => Command::Delete(target(arg).ok_or(CommandError::MissingArgument("delete"))?),
        "webhook" => {
            if arg.is_empty() {
                return Err(CommandError::MissingArgument("webhook"));
            }
            Command::Webhook(arg.to_string())
        }
        "history" => Command::History,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(command)
}

fn target(arg: &str) -> Option<Target> {
    if arg.is_empty() {
        return None;
    }
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Some(Target::Index(n)),
        _ => Some(Target::Id(arg.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_sent_verbatim() {
        assert_eq!(parse("  hello there "), Ok(Command::Send("  hello there ".into())));
        assert_eq!(parse("   "), Ok(Command::Empty));
    }

    #[test]
    fn test_commands() {
        assert_eq!(parse("/new"), Ok(Command::New));
        assert_eq!(parse("/list"), Ok(Command::List));
        assert_eq!(parse("/history"), Ok(Command::History));
        assert_eq!(parse("/quit"), Ok(Command::Quit));
        assert_eq!(parse("/select 2"), Ok(Command::Select(Target::Index(2))));
        assert_eq!(
            parse("/delete chat_1700000000000_abc1234"),
            Ok(Command::Delete(Target::Id("chat_1700000000000_abc1234".into())))
        );
        assert_eq!(
            parse("/webhook  https://n8n.example/webhook/chat "),
            Ok(Command::Webhook("https://n8n.example/webhook/chat".into()))
        );
    }

    #[test]
    fn test_zero_is_an_id_not_an_index() {
        assert_eq!(parse("/select 0"), Ok(Command::Select(Target::Id("0".into()))));
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse("/select"), Err(CommandError::MissingArgument("select")));
        assert_eq!(parse("/webhook"), Err(CommandError::MissingArgument("webhook")));
        assert_eq!(parse("/frobnicate"), Err(CommandError::Unknown("frobnicate".into())));
    }
}
