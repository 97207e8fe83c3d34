//! timetrace — time a nested command

use std::time::Instant;

use super::Command;
use crate::error::{ErrorKind, ScriptError};
use crate::facade::Value;
use crate::parser::ParsedLine;
use crate::script::Script;

pub(super) struct TimeTraceCmd;

impl Command for TimeTraceCmd {
    fn execute(
        &self,
        script: &mut Script<'_>,
        line: &ParsedLine,
    ) -> Result<Value, ScriptError> {
        if line.len() < 2 {
            return Err(script.syntax_error("Syntax error: timetrace <command ...>"));
        }
        let start = Instant::now();
        let result = script.execute_command(&line.sub_line(1))?;
        let elapsed = start.elapsed();

        // Always raised as a signal: the dispatcher turns the message into
        // the result's time-trace annotation and only the wrapped cause, if
        // any, counts as a failure.
        let mut signal = ScriptError::new(
            ErrorKind::TimeTrace,
            format!("command took {} ms", elapsed.as_millis()),
        );
        if let Some(cause) = result.into_error() {
            signal = signal.with_cause(cause);
        }
        Err(signal)
    }
}
