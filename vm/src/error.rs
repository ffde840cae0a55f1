use std::fmt;

use color_print::cprintln;
use thiserror::Error;

use crate::parser::{Line, Segment};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Syntax Error: Cannot parse `{0}`")]
    Syntax(String),

    #[error("Unknown command: `{0}`")]
    UnknownCommand(String),

    #[error("Unknown segment: `{0}`")]
    UnknownSegment(String),

    #[error("More argument required")]
    MissingArgument,

    #[error("Cannot parse `{0}` as an index")]
    BadIndex(String),

    #[error("Invalid identifier: `{0}`")]
    BadName(String),

    #[error("`{segment}` index {index} out of range 0-{max}")]
    SegmentRange {
        segment: Segment,
        index: u16,
        max: u16,
    },

    #[error("Input file must end in `.vm`: {0}")]
    Extension(String),

    #[error("No .vm files found in directory: {0}")]
    NoInput(String),

    #[error("Failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Failed to read line")]
    FileRead(#[source] std::io::Error),

    #[error("Failed to read directory: {0}")]
    DirRead(String, #[source] std::io::Error),

    #[error("Failed to create file: {0}")]
    FileCreate(String, #[source] std::io::Error),

    #[error("Failed to write file: {0}")]
    FileWrite(String, #[source] std::io::Error),
}

impl Error {
    pub fn at(self, line: &Line) -> Diag {
        Diag {
            source: self,
            loc: Some((line.path.clone(), line.no, line.raw.clone())),
        }
    }
}

/// An error, optionally pinned to the source line that raised it.
#[derive(Debug, Error)]
pub struct Diag {
    #[source]
    pub source: Error,
    pub loc: Option<(String, usize, String)>,
}

impl From<Error> for Diag {
    fn from(source: Error) -> Self {
        Diag { source, loc: None }
    }
}

impl fmt::Display for Diag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.loc {
            Some((path, no, _)) => write!(f, "{}:{}: {}", path, no, self.source),
            None => write!(f, "{}", self.source),
        }
    }
}

impl Diag {
    /// Print the error with its source location and raw line content.
    pub fn report(&self) {
        cprintln!("<red,bold>error</>: {}", self.source);
        if let Some((path, no, raw)) = &self.loc {
            cprintln!("     <blue>--></> <underline>{}:{}</>", path, no);
            cprintln!("      <blue>|</>");
            cprintln!(" <blue>{:>4} |</> {}", no, raw);
            cprintln!("      <blue>|</>");
        }
    }
}
