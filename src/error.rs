//! Script errors

use std::fmt;

/// The kind of script error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed quoting or assignment in a script line
    Syntax,
    /// Script or include file cannot be read
    FileNotFound,
    /// No internal command and no facade operation matched
    UnknownCommand,
    /// An argument could not be coerced to a candidate's parameter type.
    /// Never recorded on a line — it only disqualifies one dispatch candidate.
    Conversion,
    /// The facade operation raised during execution
    Invocation,
    /// The configured deadline expired before the facade operation returned
    Timeout,
    /// An assertion's expected and actual values differ
    Mismatch,
    /// Deliberate early termination of the current script (not an error)
    Quit,
    /// Time-trace annotation signal (an error only if it wraps one)
    TimeTrace,
    /// The internal-command table itself is malformed (fatal to the run)
    Internal,
    /// IO error
    Io,
}

/// A script error with file/line context and an optional wrapped cause.
#[derive(Debug)]
pub struct ScriptError {
    pub kind: ErrorKind,
    pub message: String,
    pub file: Option<String>,
    pub line: Option<usize>,
    /// Inner error carried by signal errors (time-trace wraps the
    /// sub-command's failure, if any).
    pub cause: Option<Box<ScriptError>>,
}

impl ScriptError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            file: None,
            line: None,
            cause: None,
        }
    }

    pub fn with_location(mut self, file: impl Into<String>, line: usize) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    pub fn with_cause(mut self, cause: ScriptError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn syntax(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Syntax, msg)
    }

    pub fn file_not_found(name: &str) -> Self {
        Self::new(ErrorKind::FileNotFound, format!("File not found: {}", name))
    }

    pub fn unknown_command(line_number: usize, command: &str) -> Self {
        Self::new(
            ErrorKind::UnknownCommand,
            format!("Line {}: unknown command: {}", line_number, command),
        )
    }

    pub fn conversion(value: &str, wanted: &str) -> Self {
        Self::new(
            ErrorKind::Conversion,
            format!("cannot convert {:?} to {}", value, wanted),
        )
    }

    pub fn invocation(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Invocation, msg)
    }

    pub fn timeout(millis: u64) -> Self {
        Self::new(
            ErrorKind::Timeout,
            format!("command timed out after {} ms", millis),
        )
    }

    pub fn mismatch(expected: &str, actual: &str) -> Self {
        Self::new(
            ErrorKind::Mismatch,
            format!("expected <{}>, but was <{}>", expected, actual),
        )
    }

    pub fn quit() -> Self {
        Self::new(ErrorKind::Quit, "quit")
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, msg)
    }

    pub fn is_quit(&self) -> bool {
        self.kind == ErrorKind::Quit
    }

    pub fn is_time_trace(&self) -> bool {
        self.kind == ErrorKind::TimeTrace
    }

    /// Whether this kind aborts the current script instead of being
    /// recorded as a line failure.
    pub fn aborts_script(&self) -> bool {
        matches!(self.kind, ErrorKind::FileNotFound | ErrorKind::Io)
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}:", file)?;
            if let Some(line) = self.line {
                write!(f, "{}:", line)?;
            }
            write!(f, " ")?;
        } else if let Some(line) = self.line {
            write!(f, "line {}: ", line)?;
        }
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ScriptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_deref().map(|c| c as _)
    }
}

impl From<std::io::Error> for ScriptError {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_location() {
        let err = ScriptError::syntax("unterminated quoted argument").with_location("t.txt", 3);
        assert_eq!(err.to_string(), "t.txt:3: unterminated quoted argument");
    }

    #[test]
    fn test_display_without_location() {
        let err = ScriptError::timeout(50);
        assert_eq!(err.to_string(), "command timed out after 50 ms");
    }

    #[test]
    fn test_unknown_command_names_line_and_text() {
        let err = ScriptError::unknown_command(7, "doThing x=1");
        assert_eq!(err.to_string(), "Line 7: unknown command: doThing x=1");
        assert_eq!(err.kind, ErrorKind::UnknownCommand);
    }

    #[test]
    fn test_cause_chain() {
        let inner = ScriptError::invocation("boom");
        let outer = ScriptError::new(ErrorKind::TimeTrace, "took 3 ms").with_cause(inner);
        assert!(outer.is_time_trace());
        assert_eq!(outer.cause.as_ref().unwrap().message, "boom");
    }
}
