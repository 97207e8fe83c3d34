//! expect / expecterror — assertion commands

use similar::TextDiff;

use super::Command;
use crate::error::ScriptError;
use crate::facade::Value;
use crate::parser::ParsedLine;
use crate::script::Script;

// ──────────────────────────────────────────────────────────
// expect — compare an expected value with a nested command
// ──────────────────────────────────────────────────────────

pub(super) struct ExpectCmd;

impl Command for ExpectCmd {
    fn execute(
        &self,
        script: &mut Script<'_>,
        line: &ParsedLine,
    ) -> Result<Value, ScriptError> {
        if line.len() < 3 {
            return Err(script.syntax_error("Syntax error: expect <value> <command ...>"));
        }
        let expected = line.parameter(1).value.clone();
        let result = script.execute_command(&line.sub_line(2))?;
        let actual = result.value_as_string();
        if let Some(err) = result.into_error() {
            return Err(err);
        }
        if expected != actual {
            return Err(mismatch(&expected, &actual));
        }
        Ok(Value::Null)
    }
}

// ──────────────────────────────────────────────────────────
// expecterror — require a nested command to fail with a message
// ──────────────────────────────────────────────────────────

pub(super) struct ExpectErrorCmd;

impl Command for ExpectErrorCmd {
    fn execute(
        &self,
        script: &mut Script<'_>,
        line: &ParsedLine,
    ) -> Result<Value, ScriptError> {
        if line.len() < 3 {
            return Err(
                script.syntax_error("Syntax error: expecterror <message> <command ...>")
            );
        }
        let expected = line.parameter(1).value.clone();
        let result = script.execute_command(&line.sub_line(2))?;
        match result.into_error() {
            Some(err) if err.message == expected => Ok(Value::Null),
            Some(err) => Err(mismatch(&expected, &err.message)),
            None => Err(mismatch(&expected, crate::result::NO_ERROR)),
        }
    }
}

/// Build the mismatch error; a multiline pair gets a unified diff appended
/// so the divergent line is visible at a glance.
fn mismatch(expected: &str, actual: &str) -> ScriptError {
    let mut err = ScriptError::mismatch(expected, actual);
    if expected.contains('\n') || actual.contains('\n') {
        let diff = TextDiff::from_lines(expected, actual);
        let unified = diff
            .unified_diff()
            .header("expected", "actual")
            .to_string();
        err.message.push('\n');
        err.message.push_str(&unified);
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_mismatch_message() {
        let err = mismatch("HELLO", "WORLD");
        assert_eq!(err.kind, ErrorKind::Mismatch);
        assert_eq!(err.message, "expected <HELLO>, but was <WORLD>");
    }

    #[test]
    fn test_multiline_mismatch_carries_diff() {
        let err = mismatch("a\nb\nc", "a\nx\nc");
        assert!(err.message.contains("--- expected"));
        assert!(err.message.contains("-b"));
        assert!(err.message.contains("+x"));
    }
}
