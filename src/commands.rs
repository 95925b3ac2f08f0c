//! Command palette: definitions, parsing, and autocomplete logic.

use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub usage: &'static str,
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "day",
    aliases: &["d"],
    usage: "day",
    description: "Switch to the single-day view",
  },
  Command {
    name: "week",
    aliases: &["w"],
    usage: "week",
    description: "Switch to the Monday-Sunday week view",
  },
  Command {
    name: "today",
    aliases: &["t", "now"],
    usage: "today",
    description: "Jump to today's date",
  },
  Command {
    name: "goto",
    aliases: &["g", "date"],
    usage: "goto YYYY-MM-DD",
    description: "Jump to a specific date",
  },
  Command {
    name: "refresh",
    aliases: &["r", "reload"],
    usage: "refresh",
    description: "Drop the cached listing and refetch",
  },
  Command {
    name: "purge",
    aliases: &["clear"],
    usage: "purge",
    description: "Drop every cached listing, then refetch",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    usage: "quit",
    description: "Exit prontio",
  },
];

/// A parsed command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
  Day,
  Week,
  Today,
  Goto(NaiveDate),
  Refresh,
  Purge,
  Quit,
}

/// Parse a command line into an executable command. The error string is
/// shown verbatim in the status bar.
pub fn parse(input: &str) -> Result<AppCommand, String> {
  let mut words = input.split_whitespace();
  let head = match words.next() {
    Some(head) => head.to_lowercase(),
    None => return Err("empty command".to_string()),
  };
  let arg = words.next();

  let cmd = COMMANDS
    .iter()
    .find(|c| c.name == head || c.aliases.contains(&head.as_str()))
    .ok_or_else(|| format!("unknown command: {}", head))?;

  match cmd.name {
    "day" => Ok(AppCommand::Day),
    "week" => Ok(AppCommand::Week),
    "today" => Ok(AppCommand::Today),
    "goto" => {
      let arg = arg.ok_or_else(|| format!("usage: {}", cmd.usage))?;
      let date = NaiveDate::parse_from_str(arg, "%Y-%m-%d")
        .map_err(|_| format!("usage: {}", cmd.usage))?;
      Ok(AppCommand::Goto(date))
    }
    "refresh" => Ok(AppCommand::Refresh),
    "purge" => Ok(AppCommand::Purge),
    "quit" => Ok(AppCommand::Quit),
    _ => unreachable!("command table and dispatch out of sync"),
  }
}

/// Get autocomplete suggestions for the command word being typed.
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input_lower = input.to_lowercase();
  let head = input_lower.split_whitespace().next().unwrap_or("");

  if head.is_empty() {
    return COMMANDS.iter().collect();
  }

  // Once an argument is being typed, the command word is settled.
  if input_lower.contains(char::is_whitespace) {
    return COMMANDS
      .iter()
      .filter(|c| c.name == head || c.aliases.contains(&head))
      .collect();
  }

  let mut matches: Vec<(&Command, u32)> = Vec::new();

  for cmd in COMMANDS {
    if cmd.name == head {
      matches.push((cmd, 0));
    } else if cmd.aliases.contains(&head) {
      matches.push((cmd, 1));
    } else if cmd.name.starts_with(head) {
      matches.push((cmd, 2));
    } else if cmd.name.contains(head) {
      matches.push((cmd, 3));
    }
  }

  matches.sort_by_key(|(_, priority)| *priority);
  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_input_returns_all() {
    let suggestions = get_suggestions("");
    assert_eq!(suggestions.len(), COMMANDS.len());
  }

  #[test]
  fn test_exact_match_ranks_first() {
    let suggestions = get_suggestions("week");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "week");
  }

  #[test]
  fn test_alias_match() {
    let suggestions = get_suggestions("g");
    assert_eq!(suggestions[0].name, "goto");
  }

  #[test]
  fn test_prefix_match() {
    let suggestions = get_suggestions("re");
    assert_eq!(suggestions[0].name, "refresh");
  }

  #[test]
  fn test_argument_narrows_to_command_word() {
    let suggestions = get_suggestions("goto 2024-");
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].name, "goto");
  }

  #[test]
  fn test_parse_names_and_aliases() {
    assert_eq!(parse("day"), Ok(AppCommand::Day));
    assert_eq!(parse("w"), Ok(AppCommand::Week));
    assert_eq!(parse("exit"), Ok(AppCommand::Quit));
    assert_eq!(parse("  today "), Ok(AppCommand::Today));
  }

  #[test]
  fn test_parse_purge_alias() {
    assert_eq!(parse("purge"), Ok(AppCommand::Purge));
    assert_eq!(parse("clear"), Ok(AppCommand::Purge));
  }

  #[test]
  fn test_parse_goto_with_date() {
    let expected = AppCommand::Goto("2024-06-10".parse().unwrap());
    assert_eq!(parse("goto 2024-06-10"), Ok(expected));
  }

  #[test]
  fn test_parse_goto_without_date_shows_usage() {
    let err = parse("goto").unwrap_err();
    assert!(err.contains("goto YYYY-MM-DD"));

    let err = parse("goto tomorrow").unwrap_err();
    assert!(err.contains("goto YYYY-MM-DD"));
  }

  #[test]
  fn test_parse_unknown_command() {
    assert!(parse("boards").unwrap_err().contains("unknown command"));
  }
}
