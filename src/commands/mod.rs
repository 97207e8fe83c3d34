//! Internal script commands
//!
//! Verbs the engine handles itself, before a line is ever offered to the
//! facade. The table below is resolved eagerly when a script is built, so a
//! malformed registration fails the run at startup instead of mid-script.

mod expect;
mod flow;
mod text;
mod trace;

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::ScriptError;
use crate::facade::Value;
use crate::parser::ParsedLine;
use crate::script::Script;

/// An internal command. `execute` may re-enter the script's dispatcher to
/// run a nested sub-command (`expect`, `timetrace`), mutate parser settings
/// (`stringdelimiter`), push include files (`executescript`), or raise the
/// quit signal.
pub trait Command {
    fn execute(&self, script: &mut Script<'_>, line: &ParsedLine)
        -> Result<Value, ScriptError>;
}

pub type BoxedCommand = Box<dyn Command>;

pub(crate) type Registry = HashMap<String, Rc<dyn Command>>;

/// Reserved verb → handler constructor. Verbs are stored lowercase and
/// matched case-insensitively.
static INTERNAL_COMMANDS: &[(&str, fn() -> BoxedCommand)] = &[
    ("expect", || Box::new(expect::ExpectCmd)),
    ("expecterror", || Box::new(expect::ExpectErrorCmd)),
    ("echo", || Box::new(text::EchoCmd)),
    ("stringdelimiter", || Box::new(text::StringDelimiterCmd)),
    ("executescript", || Box::new(flow::ExecuteScriptCmd)),
    ("quit", || Box::new(flow::QuitCmd)),
    ("timetrace", || Box::new(trace::TimeTraceCmd)),
];

/// Resolve the static table into a lookup map, failing on a duplicate verb.
pub(crate) fn registry() -> Result<Registry, ScriptError> {
    let mut map: Registry = HashMap::with_capacity(INTERNAL_COMMANDS.len());
    for (verb, ctor) in INTERNAL_COMMANDS {
        if map.insert(verb.to_string(), Rc::from(ctor())).is_some() {
            return Err(ScriptError::internal(format!(
                "duplicate internal command registration: {}",
                verb
            )));
        }
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_holds_every_reserved_verb() {
        let registry = registry().unwrap();
        for verb in [
            "expect",
            "expecterror",
            "echo",
            "stringdelimiter",
            "executescript",
            "quit",
            "timetrace",
        ] {
            assert!(registry.contains_key(verb), "missing {}", verb);
        }
        assert_eq!(registry.len(), INTERNAL_COMMANDS.len());
    }
}
