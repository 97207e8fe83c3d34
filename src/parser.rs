//! Command line parser
//!
//! Splits one logical line into a command verb plus ordered parameters:
//! - Tokens are separated by whitespace.
//! - A quoted region, delimited by the active quote character, keeps
//!   whitespace literal. The region must open at the start of a token (or
//!   right after `name=`); anywhere else the delimiter is an ordinary
//!   character.
//! - Inside a quoted region the escape character makes the following
//!   character literal — delimiter, escape, or anything else.
//! - `name=value` outside quotes binds the parameter to `name`; the value
//!   part follows the same quoting rules.
//! - After tokenization, an unquoted token that exactly matches a known
//!   variable name is replaced by that variable's value. Quoted tokens are
//!   never substituted.
//!
//! The active quote delimiter is configurable per script (the
//! `stringdelimiter` internal command) and reverts to [`DEFAULT_DELIMITER`]
//! when the file that changed it closes.

use crate::error::ScriptError;
use crate::vars::Variables;

/// Default quote delimiter.
pub const DEFAULT_DELIMITER: char = '"';
/// Escape character, honored inside quoted regions.
pub const DEFAULT_ESCAPE: char = '\\';

/// One parameter of a parsed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Bound name for `name=value` tokens; `None` for positional parameters.
    pub name: Option<String>,
    /// Resolved textual value (variable substitution already applied).
    pub value: String,
    /// Whether any part of the value came from a quoted region. Quoted
    /// values are never substituted and are re-quoted when the line is
    /// rendered back to text.
    pub quoted: bool,
}

/// A parsed command line: parameter 0 is always present and its *value* is
/// the command verb. A bound name on parameter 0 is an assignment target,
/// never the verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    params: Vec<Parameter>,
}

impl ParsedLine {
    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn parameter(&self, index: usize) -> &Parameter {
        &self.params[index]
    }

    /// The command verb: parameter 0's value.
    pub fn verb(&self) -> &str {
        &self.params[0].value
    }

    /// The parameters after the verb.
    pub fn args(&self) -> &[Parameter] {
        &self.params[1..]
    }

    /// A new line made of the parameters from `start` on, used by wrapping
    /// commands (`expect`, `timetrace`) to re-dispatch a nested command.
    pub fn sub_line(&self, start: usize) -> ParsedLine {
        debug_assert!(start < self.params.len());
        ParsedLine {
            params: self.params[start..].to_vec(),
        }
    }

    /// Render the canonical command text: named parameters as `name=value`,
    /// values that were quoted (or contain whitespace, or are empty) wrapped
    /// in `delimiter` with embedded delimiter/escape characters escaped.
    pub fn command_string(&self, delimiter: char) -> String {
        let mut out = String::new();
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            if let Some(ref name) = param.name {
                out.push_str(name);
                out.push('=');
            }
            let needs_quote = param.quoted
                || param.value.is_empty()
                || param.value.chars().any(char::is_whitespace);
            if needs_quote {
                out.push(delimiter);
                for c in param.value.chars() {
                    if c == delimiter || c == DEFAULT_ESCAPE {
                        out.push(DEFAULT_ESCAPE);
                    }
                    out.push(c);
                }
                out.push(delimiter);
            } else {
                out.push_str(&param.value);
            }
        }
        out
    }
}

/// Parse one logical line into a [`ParsedLine`].
///
/// Fails with a syntax error when a quoted region is never closed, a
/// `name=` prefix has no following value, or the line holds no token at all.
pub fn parse_line(
    text: &str,
    delimiter: char,
    escape: char,
    vars: &Variables,
) -> Result<ParsedLine, ScriptError> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut params: Vec<Parameter> = Vec::new();
    let mut i = 0;

    while i < len {
        while i < len && chars[i].is_whitespace() {
            i += 1;
        }
        if i >= len {
            break;
        }

        let mut name: Option<String> = None;
        let mut value = String::new();
        let mut quoted = false;
        let mut in_quote = false;
        // A quoted region may only open at the start of a token or of a
        // `name=` value.
        let mut at_start = true;

        while i < len {
            let c = chars[i];
            if in_quote {
                if c == escape {
                    i += 1;
                    if i >= len {
                        return Err(ScriptError::syntax("unterminated quoted argument"));
                    }
                    value.push(chars[i]);
                    i += 1;
                } else if c == delimiter {
                    in_quote = false;
                    i += 1;
                } else {
                    value.push(c);
                    i += 1;
                }
                continue;
            }
            if c.is_whitespace() {
                break;
            }
            if c == delimiter && at_start {
                in_quote = true;
                quoted = true;
                at_start = false;
                i += 1;
                continue;
            }
            if c == '=' && name.is_none() && !quoted && !value.is_empty() {
                name = Some(std::mem::take(&mut value));
                at_start = true;
                i += 1;
                continue;
            }
            value.push(c);
            at_start = false;
            i += 1;
        }

        if in_quote {
            return Err(ScriptError::syntax("unterminated quoted argument"));
        }
        if let Some(ref n) = name {
            if value.is_empty() && !quoted {
                return Err(ScriptError::syntax(format!(
                    "missing value after \"{}=\"",
                    n
                )));
            }
        }
        if !quoted {
            if let Some(v) = vars.get(&value) {
                value = v.to_string();
            }
        }
        params.push(Parameter {
            name,
            value,
            quoted,
        });
    }

    if params.is_empty() {
        return Err(ScriptError::syntax("empty command line"));
    }
    Ok(ParsedLine { params })
}
