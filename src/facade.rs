//! Application facade
//!
//! The system under test is reached through one capability: [`Facade::invoke`]
//! takes a parsed command line and produces a value or an error. The stock
//! implementation is [`FacadeTable`], an explicit table of operations the
//! facade author registers at startup — each entry carries a name, the
//! ordered parameter types, and the function to call. Matching picks the
//! first registered operation whose name and arity fit the line and whose
//! every argument coerces to the declared type; a coercion failure merely
//! disqualifies that candidate.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex};

use crate::error::ScriptError;
use crate::parser::ParsedLine;

/// A value produced by a command: a string, one of the primitive types a
/// script argument can coerce into, or nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Str(String),
    Bool(bool),
    Char(char),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Str(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "{}", v),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Short(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

/// Declared type of one facade-operation parameter, owning the string
/// coercion rule for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    Str,
    Bool,
    Char,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl ArgType {
    pub fn name(&self) -> &'static str {
        match self {
            ArgType::Str => "string",
            ArgType::Bool => "bool",
            ArgType::Char => "char",
            ArgType::Byte => "byte",
            ArgType::Short => "short",
            ArgType::Int => "int",
            ArgType::Long => "long",
            ArgType::Float => "float",
            ArgType::Double => "double",
        }
    }

    /// Coerce a textual argument into this type. Strings pass through;
    /// everything else is single-argument string construction. `Bool`
    /// accepts only `true`/`false` (case-insensitive) so that an arbitrary
    /// string cannot satisfy a boolean parameter and steal a dispatch.
    pub fn coerce(&self, raw: &str) -> Result<Value, ScriptError> {
        let fail = || ScriptError::conversion(raw, self.name());
        match self {
            ArgType::Str => Ok(Value::Str(raw.to_string())),
            ArgType::Bool => match raw.to_ascii_lowercase().as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(fail()),
            },
            ArgType::Char => {
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::Char(c)),
                    _ => Err(fail()),
                }
            }
            ArgType::Byte => raw.parse().map(Value::Byte).map_err(|_| fail()),
            ArgType::Short => raw.parse().map(Value::Short).map_err(|_| fail()),
            ArgType::Int => raw.parse().map(Value::Int).map_err(|_| fail()),
            ArgType::Long => raw.parse().map(Value::Long).map_err(|_| fail()),
            ArgType::Float => raw.parse().map(Value::Float).map_err(|_| fail()),
            ArgType::Double => raw.parse().map(Value::Double).map_err(|_| fail()),
        }
    }
}

/// The function behind one registered operation.
pub type Handler = Box<dyn FnMut(&[Value]) -> Result<Value, String> + Send>;

struct Operation {
    name: String,
    params: Vec<ArgType>,
    handler: Handler,
}

/// The single capability through which the system under test is exercised.
pub trait Facade {
    fn invoke(
        &mut self,
        line: &ParsedLine,
        delimiter: char,
        line_number: usize,
    ) -> Result<Value, ScriptError>;
}

/// A facade shared between the script thread and the timeout worker.
pub type SharedFacade = Arc<Mutex<dyn Facade + Send>>;

pub(crate) fn lock(facade: &SharedFacade) -> impl Deref<Target = dyn Facade + Send> + DerefMut + '_ {
    facade.lock().unwrap_or_else(move |poisoned| poisoned.into_inner())
}

/// An explicit table of operations, registered by the facade author at
/// startup.
///
/// Operations are enumerated in registration order; among candidates with
/// the same name and arity, the first whose every argument coerces wins.
#[derive(Default)]
pub struct FacadeTable {
    ops: Vec<Operation>,
}

impl FacadeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operation. Overloads are allowed: same name with a
    /// different arity, or with the same arity and different parameter
    /// types.
    pub fn operation(
        mut self,
        name: impl Into<String>,
        params: &[ArgType],
        handler: impl FnMut(&[Value]) -> Result<Value, String> + Send + 'static,
    ) -> Self {
        self.ops.push(Operation {
            name: name.into(),
            params: params.to_vec(),
            handler: Box::new(handler),
        });
        self
    }

    /// Wrap the table for use by a [`crate::Script`] or [`crate::Runner`].
    pub fn shared(self) -> SharedFacade {
        Arc::new(Mutex::new(self))
    }
}

impl Facade for FacadeTable {
    fn invoke(
        &mut self,
        line: &ParsedLine,
        delimiter: char,
        line_number: usize,
    ) -> Result<Value, ScriptError> {
        let verb = line.verb();
        let args = line.args();

        'candidates: for op in self.ops.iter_mut() {
            if op.name != verb || op.params.len() != args.len() {
                continue;
            }
            // Arguments are matched by position; a bound name on a script
            // parameter does not participate in matching.
            let mut values = Vec::with_capacity(args.len());
            for (ty, param) in op.params.iter().zip(args) {
                match ty.coerce(&param.value) {
                    Ok(v) => values.push(v),
                    Err(_) => continue 'candidates,
                }
            }
            return (op.handler)(&values).map_err(ScriptError::invocation);
        }

        Err(ScriptError::unknown_command(
            line_number,
            &line.command_string(delimiter),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_line, DEFAULT_DELIMITER, DEFAULT_ESCAPE};
    use crate::vars::Variables;

    fn parsed(text: &str) -> ParsedLine {
        parse_line(text, DEFAULT_DELIMITER, DEFAULT_ESCAPE, &Variables::new()).unwrap()
    }

    fn invoke(table: &mut FacadeTable, text: &str) -> Result<Value, ScriptError> {
        table.invoke(&parsed(text), '"', 1)
    }

    #[test]
    fn test_coerce_primitives() {
        assert_eq!(ArgType::Int.coerce("46").unwrap(), Value::Int(46));
        assert_eq!(ArgType::Bool.coerce("TRUE").unwrap(), Value::Bool(true));
        assert_eq!(ArgType::Char.coerce("x").unwrap(), Value::Char('x'));
        assert_eq!(
            ArgType::Str.coerce("anything").unwrap(),
            Value::Str("anything".into())
        );
        assert!(ArgType::Int.coerce("abc").is_err());
        assert!(ArgType::Bool.coerce("yes").is_err());
        assert!(ArgType::Char.coerce("xy").is_err());
    }

    #[test]
    fn test_invoke_matches_name_and_arity() {
        let mut table = FacadeTable::new().operation(
            "commandReturningString",
            &[ArgType::Str],
            |args| Ok(Value::Str(args[0].to_string().to_uppercase())),
        );
        let value = invoke(&mut table, "commandReturningString param1=hello").unwrap();
        assert_eq!(value, Value::Str("HELLO".into()));
    }

    #[test]
    fn test_invoke_unknown_command() {
        let mut table = FacadeTable::new();
        let err = table.invoke(&parsed("unknownVerb x=1"), '"', 7).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::UnknownCommand);
        assert_eq!(err.to_string(), "Line 7: unknown command: unknownVerb x=1");
    }

    #[test]
    fn test_arity_mismatch_is_unknown() {
        let mut table =
            FacadeTable::new().operation("f", &[ArgType::Str], |_| Ok(Value::Null));
        assert!(invoke(&mut table, "f a b").is_err());
        assert!(invoke(&mut table, "f a").is_ok());
    }

    #[test]
    fn test_coercion_failure_disqualifies_candidate_only() {
        let mut table = FacadeTable::new()
            .operation("f", &[ArgType::Int], |args| {
                Ok(Value::Str(format!("int:{}", args[0])))
            })
            .operation("f", &[ArgType::Str], |args| {
                Ok(Value::Str(format!("str:{}", args[0])))
            });
        assert_eq!(
            invoke(&mut table, "f 42").unwrap(),
            Value::Str("int:42".into())
        );
        assert_eq!(
            invoke(&mut table, "f abc").unwrap(),
            Value::Str("str:abc".into())
        );
    }

    #[test]
    fn test_first_registered_candidate_wins() {
        // "42" coerces to both candidates; registration order decides.
        let mut table = FacadeTable::new()
            .operation("f", &[ArgType::Str], |_| Ok(Value::Str("first".into())))
            .operation("f", &[ArgType::Int], |_| Ok(Value::Str("second".into())));
        assert_eq!(
            invoke(&mut table, "f 42").unwrap(),
            Value::Str("first".into())
        );
    }

    #[test]
    fn test_handler_error_becomes_invocation_failure() {
        let mut table = FacadeTable::new()
            .operation("boom", &[], |_| Err("it broke".to_string()));
        let err = invoke(&mut table, "boom").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Invocation);
        assert_eq!(err.message, "it broke");
    }

    #[test]
    fn test_named_args_match_by_position() {
        let mut table = FacadeTable::new().operation(
            "join",
            &[ArgType::Str, ArgType::Str],
            |args| Ok(Value::Str(format!("{}+{}", args[0], args[1]))),
        );
        // bound names are ignored by the matcher, position rules
        let value = invoke(&mut table, "join second=b first=a").unwrap();
        assert_eq!(value, Value::Str("b+a".into()));
    }

    #[test]
    fn test_null_displays_as_null() {
        assert_eq!(Value::Null.to_string(), "null");
    }
}
