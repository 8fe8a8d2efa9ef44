/*
 * Command Parsing
 *
 * Turns one input line into a Command. Parsing is pure: no simulator state
 * is touched, so every syntax rule is testable on its own.
 *
 * Command names are case-insensitive and each has a one-letter alias.
 * Message text is the rest of the line after the pid, spaces included.
 */

use core::fmt;

use procsim_kernel::Pid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Create(usize),
    Fork,
    Kill(Pid),
    Exit,
    Quantum,
    Send(Pid, &'a str),
    Receive,
    Reply(Pid, &'a str),
    SemNew(usize, i32),
    SemP(usize),
    SemV(usize),
    Info(Pid),
    Ps,
    History,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Blank line
    Empty,
    Unknown(String),
    MissingArgument(&'static str),
    BadNumber(&'static str),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => write!(f, "Empty command"),
            ParseError::Unknown(name) => {
                write!(f, "Unknown command: {} (type 'help')", name)
            }
            ParseError::MissingArgument(what) => write!(f, "Missing argument: <{}>", what),
            ParseError::BadNumber(what) => write!(f, "Not a valid number: <{}>", what),
        }
    }
}

/// Parse one input line
pub fn parse(line: &str) -> Result<Command<'_>, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ParseError::Empty);
    }

    let (name, rest) = split_word(line);
    let command = match name.to_ascii_lowercase().as_str() {
        "create" | "c" => Command::Create(number(rest, "priority")?.0),
        "fork" | "f" => Command::Fork,
        "kill" | "k" => Command::Kill(pid(rest)?.0),
        "exit" | "e" => Command::Exit,
        "quantum" | "q" => Command::Quantum,
        "send" | "s" => {
            let (to, text) = pid(rest)?;
            Command::Send(to, text)
        }
        "receive" | "r" => Command::Receive,
        "reply" | "y" => {
            let (to, text) = pid(rest)?;
            Command::Reply(to, text)
        }
        "sem-new" | "n" => {
            let (id, rest) = number(rest, "id")?;
            let (value, _) = number(rest, "value")?;
            Command::SemNew(id, value)
        }
        "sem-p" | "p" => Command::SemP(number(rest, "id")?.0),
        "sem-v" | "v" => Command::SemV(number(rest, "id")?.0),
        "info" | "i" => Command::Info(pid(rest)?.0),
        "ps" | "t" => Command::Ps,
        "history" => Command::History,
        "help" | "?" => Command::Help,
        "quit" => Command::Quit,
        _ => return Err(ParseError::Unknown(name.to_string())),
    };

    Ok(command)
}

/// First word and the trimmed remainder
fn split_word(input: &str) -> (&str, &str) {
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (input, ""),
    }
}

fn number<'a, T: core::str::FromStr>(
    input: &'a str,
    what: &'static str,
) -> Result<(T, &'a str), ParseError> {
    let (word, rest) = split_word(input);
    if word.is_empty() {
        return Err(ParseError::MissingArgument(what));
    }
    let value = word.parse().map_err(|_| ParseError::BadNumber(what))?;
    Ok((value, rest))
}

fn pid(input: &str) -> Result<(Pid, &str), ParseError> {
    let (raw, rest) = number::<u32>(input, "pid")?;
    Ok((Pid(raw), rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_and_short_names() {
        assert_eq!(parse("create 1"), Ok(Command::Create(1)));
        assert_eq!(parse("C 2"), Ok(Command::Create(2)));
        assert_eq!(parse("  fork  "), Ok(Command::Fork));
        assert_eq!(parse("k 7"), Ok(Command::Kill(Pid(7))));
        assert_eq!(parse("Quantum"), Ok(Command::Quantum));
        assert_eq!(parse("t"), Ok(Command::Ps));
        assert_eq!(parse("quit"), Ok(Command::Quit));
    }

    #[test]
    fn message_text_keeps_inner_spaces() {
        assert_eq!(parse("send 5 hi there  you"), Ok(Command::Send(Pid(5), "hi there  you")));
        assert_eq!(parse("y 2 ok"), Ok(Command::Reply(Pid(2), "ok")));
        assert_eq!(parse("s 3"), Ok(Command::Send(Pid(3), "")));
    }

    #[test]
    fn semaphore_commands() {
        assert_eq!(parse("sem-new 2 -1"), Ok(Command::SemNew(2, -1)));
        assert_eq!(parse("n 0 3"), Ok(Command::SemNew(0, 3)));
        assert_eq!(parse("p 4"), Ok(Command::SemP(4)));
        assert_eq!(parse("sem-v 1"), Ok(Command::SemV(1)));
    }

    #[test]
    fn argument_errors() {
        assert_eq!(parse("create"), Err(ParseError::MissingArgument("priority")));
        assert_eq!(parse("kill abc"), Err(ParseError::BadNumber("pid")));
        assert_eq!(parse("kill -3"), Err(ParseError::BadNumber("pid")));
        assert_eq!(parse("n 1"), Err(ParseError::MissingArgument("value")));
        assert_eq!(parse("send"), Err(ParseError::MissingArgument("pid")));
    }

    #[test]
    fn unknown_and_empty() {
        assert_eq!(parse("   "), Err(ParseError::Empty));
        assert_eq!(parse("launch 1"), Err(ParseError::Unknown("launch".to_string())));
    }
}
