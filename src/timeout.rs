//! Deadline-governed facade invocation
//!
//! With a configured deadline, each facade invocation runs on a single-use
//! worker thread while the script thread waits on a rendezvous channel. The
//! deadline clock starts once the worker holds the facade — a predecessor
//! that overran its own deadline may still be finishing, and its lock time
//! is not charged to this invocation.
//!
//! On expiry the invocation is abandoned: the result channel is buffered, so
//! a late result is sent into the void and the worker exits on its own — it
//! can never reach the variable store or a recorded result. There is no way
//! to preempt arbitrary user code, so a facade operation that ignores its
//! deadline runs to completion in the background; its effects on the script
//! are nil, though an operation that never returns at all will stall the
//! next invocation's turn at the facade.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use crate::error::ScriptError;
use crate::facade::{self, SharedFacade, Value};
use crate::parser::ParsedLine;

pub(crate) fn invoke_with_deadline(
    facade: SharedFacade,
    line: ParsedLine,
    delimiter: char,
    line_number: usize,
    deadline: Duration,
) -> Result<Value, ScriptError> {
    let (started_tx, started_rx) = mpsc::channel();
    let (result_tx, result_rx) = mpsc::sync_channel(1);
    thread::Builder::new()
        .name("facade-invoke".into())
        .spawn(move || {
            let mut guard = facade::lock(&facade);
            let _ = started_tx.send(());
            let result = guard.invoke(&line, delimiter, line_number);
            let _ = result_tx.send(result);
        })
        .map_err(|e| ScriptError::internal(format!("cannot spawn facade worker: {}", e)))?;

    if started_rx.recv().is_err() {
        return Err(ScriptError::invocation("facade worker died before invoking"));
    }
    match result_rx.recv_timeout(deadline) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => {
            Err(ScriptError::timeout(deadline.as_millis() as u64))
        }
        Err(RecvTimeoutError::Disconnected) => {
            Err(ScriptError::invocation("facade operation panicked"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::facade::{ArgType, FacadeTable};
    use crate::parser::{parse_line, DEFAULT_DELIMITER, DEFAULT_ESCAPE};
    use crate::vars::Variables;
    use std::sync::Arc;

    fn parsed(text: &str) -> ParsedLine {
        parse_line(text, DEFAULT_DELIMITER, DEFAULT_ESCAPE, &Variables::new()).unwrap()
    }

    fn sleepy_facade(millis: u64) -> SharedFacade {
        FacadeTable::new()
            .operation("nap", &[], move |_| {
                thread::sleep(Duration::from_millis(millis));
                Ok(Value::Str("done".into()))
            })
            .operation("fast", &[ArgType::Str], |args| Ok(args[0].clone()))
            .shared()
    }

    #[test]
    fn test_completes_within_deadline() {
        let facade = sleepy_facade(0);
        let value = invoke_with_deadline(
            facade,
            parsed("fast param1=ok"),
            '"',
            1,
            Duration::from_millis(500),
        )
        .unwrap();
        assert_eq!(value, Value::Str("ok".into()));
    }

    #[test]
    fn test_deadline_expiry_yields_timeout() {
        let facade = sleepy_facade(500);
        let err = invoke_with_deadline(
            facade,
            parsed("nap"),
            '"',
            1,
            Duration::from_millis(50),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Timeout);
        assert_eq!(err.message, "command timed out after 50 ms");
    }

    #[test]
    fn test_facade_usable_after_timeout() {
        let facade = sleepy_facade(200);
        let _ = invoke_with_deadline(
            Arc::clone(&facade),
            parsed("nap"),
            '"',
            1,
            Duration::from_millis(20),
        );
        // the abandoned worker finishes and releases the facade; the next
        // invocation's deadline starts only once it holds the lock
        let value = invoke_with_deadline(
            facade,
            parsed("fast param1=later"),
            '"',
            2,
            Duration::from_millis(100),
        )
        .unwrap();
        assert_eq!(value, Value::Str("later".into()));
    }

    #[test]
    fn test_underlying_failure_passes_through() {
        let facade = FacadeTable::new()
            .operation("boom", &[], |_| Err("it broke".to_string()))
            .shared();
        let err = invoke_with_deadline(
            facade,
            parsed("boom"),
            '"',
            1,
            Duration::from_millis(500),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Invocation);
        assert_eq!(err.message, "it broke");
    }
}
