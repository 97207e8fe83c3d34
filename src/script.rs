//! Script execution
//!
//! A [`Script`] is built per test file. It reads logical lines from the
//! multi-file source, parses them, and dispatches each one: reserved verbs
//! go to the internal command registry, everything else to the facade —
//! under the configured deadline when one is set. Each executed line yields
//! one [`LineResult`], collected into the script's [`ScriptResults`].

use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::commands::{self, BoxedCommand, Registry};
use crate::error::ScriptError;
use crate::facade::{self, SharedFacade, Value};
use crate::parser::{self, ParsedLine, DEFAULT_DELIMITER, DEFAULT_ESCAPE};
use crate::result::{LineResult, ScriptResults};
use crate::source::LineSource;
use crate::timeout;
use crate::vars::Variables;

/// Callback invoked for every errored line as it is recorded.
pub type ErrorListener<'a> = dyn FnMut(&LineResult) + 'a;

/// One test script being executed against a facade.
pub struct Script<'a> {
    source: LineSource,
    delimiter: char,
    escape: char,
    vars: &'a mut Variables,
    facade: SharedFacade,
    commands: Registry,
    results: ScriptResults,
    timeout: Option<Duration>,
    listener: Option<&'a mut ErrorListener<'a>>,
    /// Number of the logical line last read, captured before execution so a
    /// line that pushes an include is still attributed to its own position.
    last_line: usize,
}

impl<'a> Script<'a> {
    /// Open `file` for execution against `facade`, with `vars` holding the
    /// variables shared across the run. The internal command table is
    /// resolved here, eagerly, so a malformed table fails before any line
    /// runs.
    pub fn new(
        file: &str,
        facade: SharedFacade,
        vars: &'a mut Variables,
    ) -> Result<Script<'a>, ScriptError> {
        let commands = commands::registry()?;
        let mut source = LineSource::new();
        source.push_file(file)?;
        Ok(Self {
            source,
            delimiter: DEFAULT_DELIMITER,
            escape: DEFAULT_ESCAPE,
            vars,
            facade,
            commands,
            results: ScriptResults::new(file),
            timeout: None,
            listener: None,
            last_line: 0,
        })
    }

    /// Deadline applied to each facade invocation; `None` runs them
    /// synchronously with no bound.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    pub fn set_listener(&mut self, listener: &'a mut ErrorListener<'a>) {
        self.listener = Some(listener);
    }

    /// Register an extra internal command; its verb is matched
    /// case-insensitively and shadows any facade operation of the same name.
    pub fn register_command(&mut self, verb: impl Into<String>, command: BoxedCommand) {
        self.commands.insert(verb.into().to_lowercase(), Rc::from(command));
    }

    /// Name of the file currently being read (an include while it is open).
    pub fn file(&self) -> &str {
        self.source.current_file()
    }

    /// Physical line number within the current file.
    pub fn line_number(&self) -> usize {
        self.source.line_number()
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.vars.get(name)
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.set(name, value);
    }

    /// Change the active quote delimiter for subsequently parsed lines of
    /// the current file.
    pub fn set_delimiter(&mut self, delimiter: char) {
        self.delimiter = delimiter;
    }

    /// Push an include file; reading continues there until it is exhausted.
    pub fn push_file(&mut self, name: &str) -> Result<(), ScriptError> {
        self.source.push_file(name)
    }

    pub(crate) fn syntax_error(&self, message: &str) -> ScriptError {
        ScriptError::syntax(message)
            .with_location(self.source.current_file(), self.source.line_number())
    }

    /// Read, parse and execute the next command. `Ok(None)` at the end of
    /// the script. An `Err` is either the quit signal or a script-aborting
    /// condition (parse error, missing include, IO failure).
    pub fn get_and_execute_command(&mut self) -> Result<Option<LineResult>, ScriptError> {
        match self.next_parsed()? {
            Some(line) => self.execute_command(&line).map(Some),
            None => Ok(None),
        }
    }

    /// Execute the whole script, recording one result per line. Quit ends
    /// it early without error; aborting conditions propagate with the
    /// results collected so far left in place.
    pub fn run(&mut self) -> Result<(), ScriptError> {
        let mut previous = Instant::now();
        loop {
            match self.get_and_execute_command() {
                Ok(Some(mut result)) => {
                    let now = Instant::now();
                    result.stamp(now - previous, self.last_line);
                    previous = now;
                    if result.has_error() {
                        if let Some(listener) = self.listener.as_mut() {
                            listener(&result);
                        }
                    }
                    self.results.add_result(result);
                }
                Ok(None) => return Ok(()),
                Err(e) if e.is_quit() => return Ok(()),
                Err(e) => return Err(e),
            }
        }
    }

    /// True when no recorded line errored.
    pub fn check(&self) -> bool {
        self.results.errors() == 0
    }

    pub fn results(&self) -> &ScriptResults {
        &self.results
    }

    pub fn into_results(self) -> ScriptResults {
        self.results
    }

    /// Next parsed line, restoring the default quote delimiter whenever a
    /// file was popped off the source since the last read — a delimiter
    /// change never survives its file.
    fn next_parsed(&mut self) -> Result<Option<ParsedLine>, ScriptError> {
        let line = self.source.read_line()?;
        if self.source.take_closed() {
            self.delimiter = DEFAULT_DELIMITER;
        }
        match line {
            Some(line) => {
                self.last_line = line.number;
                parser::parse_line(&line.text, self.delimiter, self.escape, self.vars)
                    .map(Some)
                    .map_err(|e| e.with_location(self.source.current_file(), line.number))
            }
            None => Ok(None),
        }
    }

    /// Dispatch one parsed line and build its result. The quit signal and
    /// script-aborting conditions are re-raised; every other failure is
    /// captured as the line's cause. On a non-failing line whose parameter 0
    /// carries a bound name, the produced value's textual form is assigned
    /// to that variable.
    pub(crate) fn execute_command(
        &mut self,
        line: &ParsedLine,
    ) -> Result<LineResult, ScriptError> {
        let mut value = Value::Null;
        let mut cause = None;
        let mut time_trace = None;

        match self.dispatch(line) {
            Ok(v) => value = v,
            Err(e) if e.is_quit() || e.aborts_script() => return Err(e),
            Err(e) if e.is_time_trace() => {
                time_trace = Some(e.message);
                cause = e.cause.map(|inner| *inner);
            }
            Err(e) => cause = Some(e),
        }

        if cause.is_none() {
            if let Some(ref name) = line.parameter(0).name {
                self.vars.set(name.clone(), value.to_string());
            }
        }

        Ok(LineResult::new(
            line.command_string(self.delimiter),
            value,
            cause,
            time_trace,
        ))
    }

    fn dispatch(&mut self, line: &ParsedLine) -> Result<Value, ScriptError> {
        let verb = line.verb().to_lowercase();
        if let Some(command) = self.commands.get(&verb).cloned() {
            return command.execute(self, line);
        }
        self.invoke_external(line)
    }

    fn invoke_external(&mut self, line: &ParsedLine) -> Result<Value, ScriptError> {
        let line_number = self.source.line_number();
        match self.timeout {
            Some(deadline) => timeout::invoke_with_deadline(
                Arc::clone(&self.facade),
                line.clone(),
                self.delimiter,
                line_number,
                deadline,
            ),
            None => facade::lock(&self.facade).invoke(line, self.delimiter, line_number),
        }
    }
}
