//! Flow commands: quit, executescript

use super::Command;
use crate::error::ScriptError;
use crate::facade::Value;
use crate::parser::ParsedLine;
use crate::script::Script;

// ──────────────────────────────────────────────────────────
// quit — stop the current script without marking it failed
// ──────────────────────────────────────────────────────────

pub(super) struct QuitCmd;

impl Command for QuitCmd {
    fn execute(
        &self,
        _script: &mut Script<'_>,
        _line: &ParsedLine,
    ) -> Result<Value, ScriptError> {
        Err(ScriptError::quit())
    }
}

// ──────────────────────────────────────────────────────────
// executescript — push an include file onto the line source
// ──────────────────────────────────────────────────────────

pub(super) struct ExecuteScriptCmd;

impl Command for ExecuteScriptCmd {
    fn execute(
        &self,
        script: &mut Script<'_>,
        line: &ParsedLine,
    ) -> Result<Value, ScriptError> {
        if line.len() != 2 {
            return Err(script.syntax_error("Syntax error: executescript <file>"));
        }
        // A missing include propagates file-not-found, which ends this
        // script; files already open on the stack are left undisturbed.
        script.push_file(&line.parameter(1).value)?;
        Ok(Value::Null)
    }
}
