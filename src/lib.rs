//! acceptspec: an acceptance-test script engine
//!
//! Runs human-readable test scripts against an application exposed through a
//! single *facade* object, and reports per-line pass/fail results.
//!
//! # Overview
//!
//! A script is a plain text file, one command per logical line. Each line is
//! either an *internal* command (handled by the engine) or an *external* one,
//! forwarded to the facade: an explicit table of operations the application
//! author registers at startup, each with a name, typed parameters, and a
//! function to call. Dispatch matches name and arity, coerces the textual
//! arguments to the declared types, and invokes the first operation that
//! fits.
//!
//! # Script syntax
//!
//! ```text
//! # create a user and check what comes back
//! id=createUser name="Mary Stuart" age=41
//! expect "Mary Stuart" getUserName id
//!
//! # a command may span physical lines \
//!   like this
//! expecterror "no such user" getUserName id=0
//! quit
//! ```
//!
//! - Tokens split on whitespace; a quoted region (default delimiter `"`)
//!   keeps whitespace literal and the escape character `\` escapes inside it.
//! - `name=value` binds a parameter name; on parameter 0 it is an assignment
//!   target instead: the line's result is stored as a variable.
//! - A bare token matching a known variable name is replaced by its value;
//!   quoted tokens never are.
//! - `#` starts a comment line, `\` at end of line continues onto the next.
//!
//! # Internal commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `expect <value> <command ...>` | Fail unless the nested command returns `<value>` |
//! | `expecterror <message> <command ...>` | Fail unless the nested command fails with `<message>` |
//! | `echo <args ...>` | Return the arguments (variable substitution applied) |
//! | `timetrace <command ...>` | Run the nested command, annotate its duration |
//! | `stringdelimiter <char>` | Change the quote delimiter for the rest of the file |
//! | `executescript <file>` | Execute an include file, then resume |
//! | `quit` | Stop the current script without failing it |
//!
//! # Running
//!
//! ```no_run
//! use acceptspec::{ArgType, FacadeTable, Value};
//!
//! let facade = FacadeTable::new()
//!     .operation("createUser", &[ArgType::Str, ArgType::Int], |_args| {
//!         Ok(Value::Int(1))
//!     })
//!     .operation("getUserName", &[ArgType::Int], |_args| {
//!         Ok(Value::Str("Mary Stuart".into()))
//!     });
//!
//! acceptspec::run_and_assert(facade, &["tests/scripts/users.txt"]);
//! ```
//!
//! Or embed the CLI in the application's own test binary with
//! [`cli::run`], which parses script paths and `--timeout` from the process
//! arguments and exits non-zero when any script fails.

mod commands;
mod error;
mod facade;
mod parser;
mod result;
mod runner;
mod script;
mod source;
mod timeout;
mod vars;

pub mod cli;

pub use commands::{BoxedCommand, Command};
pub use error::{ErrorKind, ScriptError};
pub use facade::{ArgType, Facade, FacadeTable, Handler, SharedFacade, Value};
pub use parser::{parse_line, Parameter, ParsedLine, DEFAULT_DELIMITER, DEFAULT_ESCAPE};
pub use result::{LineResult, RunResults, ScriptResults, NO_ERROR};
pub use runner::{run_and_assert, RunConfig, Runner, RunnerBuilder};
pub use script::{ErrorListener, Script};
pub use source::{LineSource, SourceLine};
pub use vars::Variables;
