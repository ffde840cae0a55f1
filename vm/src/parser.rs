use std::fmt;

use strum::{Display, EnumString};

use crate::error::{Diag, Error};

// ----------------------------------------------------------------------------
// Line

/// One raw VM source line plus its classification. Carries the originating
/// line number for diagnostics; blank and comment-only lines keep
/// `command` empty.
#[derive(Debug, Clone)]
pub struct Line {
    pub path: String,
    /// 1-based line number.
    pub no: usize,
    pub raw: String,
    pub command: Option<Command>,
}

impl Line {
    pub fn parse(path: &str, idx: usize, raw: &str) -> Result<Line, Diag> {
        let mut line = Line {
            path: path.to_string(),
            no: idx + 1,
            raw: raw.to_string(),
            command: None,
        };
        match Command::parse(raw) {
            Ok(command) => {
                line.command = command;
                Ok(line)
            }
            Err(err) => Err(err.at(&line)),
        }
    }
}

// ----------------------------------------------------------------------------
// Command

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Segment {
    Constant,
    Local,
    Argument,
    This,
    That,
    Temp,
    Pointer,
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ArithOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

/// One classified VM command. Immutable once parsed; each variant carries
/// only the fields its grammar allows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Arithmetic(ArithOp),
    Push(Segment, u16),
    Pop(Segment, u16),
    Label(String),
    Goto(String),
    IfGoto(String),
    Function(String, u16),
    Call(String, u16),
    Return,
}

impl Command {
    /// Classify one line, or `None` for a blank/comment line. Everything
    /// the grammar can reject is rejected here, never during emission:
    /// unknown keywords, bad segment names, non-numeric indices and
    /// malformed identifiers.
    pub fn parse(raw: &str) -> Result<Option<Command>, Error> {
        let code = raw.split_once("//").map_or(raw, |(code, _)| code).trim();
        if code.is_empty() {
            return Ok(None);
        }

        let words: Vec<&str> = code.split_whitespace().collect();
        let (op, args) = words.split_first().expect("code is non-empty");

        // Get argument by index and parse with the given reader.
        macro_rules! arg {
            ($index:expr, $read:ident) => {{
                let arg = args.get($index).ok_or(Error::MissingArgument)?;
                $read(arg)?
            }};
        }

        let command = match *op {
            "push" => Command::Push(arg!(0, segment), arg!(1, index)),
            "pop" => Command::Pop(arg!(0, segment), arg!(1, index)),
            "label" => Command::Label(arg!(0, name)),
            "goto" => Command::Goto(arg!(0, name)),
            "if-goto" => Command::IfGoto(arg!(0, name)),
            "function" => Command::Function(arg!(0, name), arg!(1, index)),
            "call" => Command::Call(arg!(0, name), arg!(1, index)),
            "return" => Command::Return,
            other => Command::Arithmetic(
                other
                    .parse::<ArithOp>()
                    .map_err(|_| Error::UnknownCommand(other.to_string()))?,
            ),
        };

        let arity = match command {
            Command::Arithmetic(_) | Command::Return => 0,
            Command::Label(_) | Command::Goto(_) | Command::IfGoto(_) => 1,
            Command::Push(..) | Command::Pop(..) | Command::Function(..) | Command::Call(..) => 2,
        };
        if args.len() != arity {
            return Err(Error::Syntax(code.to_string()));
        }
        Ok(Some(command))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Arithmetic(op) => write!(f, "{}", op),
            Command::Push(segment, index) => write!(f, "push {} {}", segment, index),
            Command::Pop(segment, index) => write!(f, "pop {} {}", segment, index),
            Command::Label(label) => write!(f, "label {}", label),
            Command::Goto(label) => write!(f, "goto {}", label),
            Command::IfGoto(label) => write!(f, "if-goto {}", label),
            Command::Function(name, locals) => write!(f, "function {} {}", name, locals),
            Command::Call(name, args) => write!(f, "call {} {}", name, args),
            Command::Return => write!(f, "return"),
        }
    }
}

fn segment(s: &str) -> Result<Segment, Error> {
    s.parse().map_err(|_| Error::UnknownSegment(s.to_string()))
}

fn index(s: &str) -> Result<u16, Error> {
    s.parse().map_err(|_| Error::BadIndex(s.to_string()))
}

fn name(s: &str) -> Result<String, Error> {
    if is_ident(s) {
        Ok(s.to_string())
    } else {
        Err(Error::BadName(s.to_string()))
    }
}

/// Label, function and variable names must not start with a digit and are
/// composed of alphanumerics plus `_ . $ :`.
pub fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(head) if ident_char(head) && !head.is_ascii_digit() => {}
        _ => return false,
    }
    chars.all(ident_char)
}

fn ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | ':')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(raw: &str) -> Command {
        Command::parse(raw).unwrap().unwrap()
    }

    fn err(raw: &str) -> Error {
        Command::parse(raw).unwrap_err()
    }

    #[test]
    fn blank_and_comment_lines() {
        assert!(Command::parse("").unwrap().is_none());
        assert!(Command::parse("  // push constant 1").unwrap().is_none());
    }

    #[test]
    fn arithmetic_keywords() {
        assert_eq!(command("add"), Command::Arithmetic(ArithOp::Add));
        assert_eq!(command("not // invert"), Command::Arithmetic(ArithOp::Not));
        assert!(matches!(err("mul"), Error::UnknownCommand(_)));
        assert!(matches!(err("add 1"), Error::Syntax(_)));
    }

    #[test]
    fn push_and_pop() {
        assert_eq!(
            command("push constant 17"),
            Command::Push(Segment::Constant, 17)
        );
        assert_eq!(command("pop local 0"), Command::Pop(Segment::Local, 0));
        assert_eq!(command("push that 5"), Command::Push(Segment::That, 5));
        assert!(matches!(err("push heap 0"), Error::UnknownSegment(_)));
        assert!(matches!(err("push constant"), Error::MissingArgument));
        assert!(matches!(err("pop static x"), Error::BadIndex(_)));
        assert!(matches!(err("pop static -1"), Error::BadIndex(_)));
        assert!(matches!(err("push constant 1 2"), Error::Syntax(_)));
    }

    #[test]
    fn flow_commands() {
        assert_eq!(command("label LOOP"), Command::Label("LOOP".into()));
        assert_eq!(command("goto END"), Command::Goto("END".into()));
        assert_eq!(command("if-goto top:1"), Command::IfGoto("top:1".into()));
        assert!(matches!(err("label 2nd"), Error::BadName(_)));
        assert!(matches!(err("goto A B"), Error::Syntax(_)));
        assert!(matches!(err("if-goto"), Error::MissingArgument));
    }

    #[test]
    fn function_commands() {
        assert_eq!(
            command("function Main.main 2"),
            Command::Function("Main.main".into(), 2)
        );
        assert_eq!(command("call Sys.init 0"), Command::Call("Sys.init".into(), 0));
        assert_eq!(command("return"), Command::Return);
        assert!(matches!(err("function Main.main"), Error::MissingArgument));
        assert!(matches!(err("call Main.main -2"), Error::BadIndex(_)));
        assert!(matches!(err("return 0"), Error::Syntax(_)));
    }

    #[test]
    fn display_round_trips_the_source_text() {
        for src in [
            "add",
            "push constant 17",
            "pop static 3",
            "label LOOP",
            "if-goto LOOP",
            "function Main.main 2",
            "call Sys.init 0",
            "return",
        ] {
            assert_eq!(command(src).to_string(), src);
        }
    }

    #[test]
    fn line_attaches_position_to_errors() {
        let diag = Line::parse("Main.vm", 9, "push constant x").unwrap_err();
        let (path, no, raw) = diag.loc.unwrap();
        assert_eq!(path, "Main.vm");
        assert_eq!(no, 10);
        assert_eq!(raw, "push constant x");
    }
}
