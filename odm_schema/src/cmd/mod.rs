pub mod update;

use std::{
    fmt,
    io::{self, Write},
};
use thiserror::Error;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 255;

/// Granularity a schema command can act on.
// Collection and database variants are only built by callers outside the CLI dispatch.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation<'a> {
    DocumentIndex(&'a str),
    Index,
    DocumentCollection(&'a str),
    Collection,
    DocumentDb(&'a str),
    Db,
}

impl fmt::Display for Operation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operation::DocumentIndex(_) => write!(f, "document index"),
            Operation::Index => write!(f, "index"),
            Operation::DocumentCollection(_) => write!(f, "document collection"),
            Operation::Collection => write!(f, "collection"),
            Operation::DocumentDb(_) => write!(f, "document database"),
            Operation::Db => write!(f, "database"),
        }
    }
}

/// Raised when a command is asked for an operation it does not implement.
///
/// This is a defect in the caller, never a runtime condition of the store.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("cannot {command} a {operation}")]
pub struct UnsupportedOperationError {
    pub command: &'static str,
    pub operation: String,
}

impl UnsupportedOperationError {
    pub fn new(command: &'static str, operation: Operation) -> Self {
        UnsupportedOperationError {
            command,
            operation: operation.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Success(String),
    Failure(String),
}

impl CommandOutcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            CommandOutcome::Success(_) => EXIT_SUCCESS,
            CommandOutcome::Failure(_) => EXIT_FAILURE,
        }
    }

    /// Write the outcome as a single line.
    pub fn report<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self {
            CommandOutcome::Success(message) => writeln!(out, "{}", message),
            CommandOutcome::Failure(message) => writeln!(out, "[ERROR] {}", message),
        }
    }

    /// Report the outcome to `out` and hand back the process exit code.
    pub fn conclude<W: Write>(&self, out: &mut W) -> io::Result<u8> {
        self.report(out)?;
        Ok(self.exit_code())
    }
}
