//! Text commands: echo, stringdelimiter

use super::Command;
use crate::error::ScriptError;
use crate::facade::Value;
use crate::parser::ParsedLine;
use crate::script::Script;

// ──────────────────────────────────────────────────────────
// echo — return the arguments, substitution already applied
// ──────────────────────────────────────────────────────────

pub(super) struct EchoCmd;

impl Command for EchoCmd {
    fn execute(
        &self,
        _script: &mut Script<'_>,
        line: &ParsedLine,
    ) -> Result<Value, ScriptError> {
        let text = line
            .args()
            .iter()
            .map(|p| p.value.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Ok(Value::Str(text))
    }
}

// ──────────────────────────────────────────────────────────
// stringdelimiter — change the active quote character
// ──────────────────────────────────────────────────────────

pub(super) struct StringDelimiterCmd;

impl Command for StringDelimiterCmd {
    fn execute(
        &self,
        script: &mut Script<'_>,
        line: &ParsedLine,
    ) -> Result<Value, ScriptError> {
        let usage = "Syntax error: stringdelimiter <character>";
        if line.len() != 2 {
            return Err(script.syntax_error(usage));
        }
        let value = &line.parameter(1).value;
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                // applies to lines parsed from here on in the current file;
                // reverts to the default when that file closes
                script.set_delimiter(c);
                Ok(Value::Null)
            }
            _ => Err(script.syntax_error(usage)),
        }
    }
}
