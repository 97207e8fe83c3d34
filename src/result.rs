//! Execution results
//!
//! One [`LineResult`] per executed logical line; a [`ScriptResults`] per
//! script file, keeping an ordered line→result map and incrementally
//! maintained counters; a [`RunResults`] per run, aggregating across script
//! files with statistics computed on demand.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::time::Duration;

use crate::error::ScriptError;
use crate::facade::Value;

/// Sentinel returned by [`LineResult::error_message`] when the line passed.
pub const NO_ERROR: &str = "(no error)";

/// The outcome of one executed script line.
#[derive(Debug)]
pub struct LineResult {
    command: String,
    value: Value,
    cause: Option<ScriptError>,
    time_trace: Option<String>,
    duration: Duration,
    line: usize,
}

impl LineResult {
    pub(crate) fn new(
        command: String,
        value: Value,
        cause: Option<ScriptError>,
        time_trace: Option<String>,
    ) -> Self {
        Self {
            command,
            value,
            cause,
            time_trace,
            duration: Duration::ZERO,
            line: 0,
        }
    }

    /// Attach timing and source position; done by the run loop once the
    /// line has executed.
    pub(crate) fn stamp(&mut self, duration: Duration, line: usize) {
        self.duration = duration;
        self.line = line;
    }

    /// The canonical text of the command that produced this result.
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Textual form of the value; `"null"` when the command produced none.
    pub fn value_as_string(&self) -> String {
        self.value.to_string()
    }

    pub fn error(&self) -> Option<&ScriptError> {
        self.cause.as_ref()
    }

    pub fn has_error(&self) -> bool {
        self.cause.is_some()
    }

    /// The failure message, or [`NO_ERROR`] when the line passed.
    pub fn error_message(&self) -> String {
        match self.cause {
            Some(ref err) => err.to_string(),
            None => NO_ERROR.to_string(),
        }
    }

    pub fn time_trace(&self) -> Option<&str> {
        self.time_trace.as_deref()
    }

    pub fn has_time_trace(&self) -> bool {
        self.time_trace.is_some()
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// 1-based line number within its script file.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Tear the result apart for wrapping commands that need to own the
    /// failure (expect, expecterror, timetrace).
    pub(crate) fn into_error(self) -> Option<ScriptError> {
        self.cause
    }
}

/// The collected results of one script file.
pub struct ScriptResults {
    file: String,
    results: BTreeMap<usize, LineResult>,
    passed: usize,
    errors: usize,
    time_traces: usize,
    total_duration: Duration,
    aborted: Option<String>,
}

impl ScriptResults {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            results: BTreeMap::new(),
            passed: 0,
            errors: 0,
            time_traces: 0,
            total_duration: Duration::ZERO,
            aborted: None,
        }
    }

    /// The single mutation point: record one result, keyed by its line
    /// number, and update the running counters.
    pub fn add_result(&mut self, result: LineResult) {
        self.total_duration += result.duration();
        if result.has_error() {
            self.errors += 1;
        } else {
            self.passed += 1;
        }
        if result.has_time_trace() {
            self.time_traces += 1;
        }
        self.results.insert(result.line(), result);
    }

    pub(crate) fn set_aborted(&mut self, message: impl Into<String>) {
        self.aborted = Some(message.into());
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// The ordered line→result map.
    pub fn results(&self) -> &BTreeMap<usize, LineResult> {
        &self.results
    }

    pub fn line_result(&self, line: usize) -> Option<&LineResult> {
        self.results.get(&line)
    }

    pub fn passed(&self) -> usize {
        self.passed
    }

    pub fn errors(&self) -> usize {
        self.errors
    }

    pub fn time_traces(&self) -> usize {
        self.time_traces
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn total_duration(&self) -> Duration {
        self.total_duration
    }

    /// The abort message when the script was cut short by a syntax or file
    /// error before reaching its end.
    pub fn aborted(&self) -> Option<&str> {
        self.aborted.as_deref()
    }

    /// A script passes when no line errored and it ran to completion.
    pub fn all_passed(&self) -> bool {
        self.errors == 0 && self.aborted.is_none()
    }

    /// Human-readable per-script block: summary line, failures, time traces.
    pub fn report(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Test file: {} | Passed Tests: {} | Not Passed Tests: {} | Total execution time (ms): {}",
            self.file,
            self.passed,
            self.errors,
            self.total_duration.as_millis(),
        );
        if let Some(ref message) = self.aborted {
            let _ = writeln!(out, "ABORTED: {}", message);
        }
        if self.errors != 0 {
            let _ = writeln!(out, "FAILURES:");
            for result in self.results.values().filter(|r| r.has_error()) {
                let _ = writeln!(out, "\tAt line {}: {}", result.line(), result.error_message());
            }
        }
        if self.time_traces != 0 {
            let _ = writeln!(out, "TIME-TRACES:");
            for result in self.results.values().filter(|r| r.has_time_trace()) {
                let _ = writeln!(
                    out,
                    "\tAt line {}: {}",
                    result.line(),
                    result.time_trace().unwrap_or_default(),
                );
            }
        }
        out
    }
}

/// Results of a whole run, one entry per script file.
#[derive(Default)]
pub struct RunResults {
    scripts: HashMap<String, ScriptResults>,
}

impl RunResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a script's results. Re-adding the same file replaces the
    /// previous entry — a script is never represented twice.
    pub fn add(&mut self, results: ScriptResults) {
        self.scripts.insert(results.file().to_string(), results);
    }

    pub fn script(&self, file: &str) -> Option<&ScriptResults> {
        self.scripts.get(file)
    }

    /// Script file names, sorted.
    pub fn script_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.scripts.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn total_scripts(&self) -> usize {
        self.scripts.len()
    }

    pub fn total_tests(&self) -> usize {
        self.scripts.values().map(ScriptResults::total).sum()
    }

    pub fn total_passed(&self) -> usize {
        self.scripts.values().map(ScriptResults::passed).sum()
    }

    pub fn total_errors(&self) -> usize {
        self.scripts.values().map(ScriptResults::errors).sum()
    }

    /// How many scripts hold at least one failure (an errored line or an
    /// abort).
    pub fn scripts_with_failures(&self) -> usize {
        self.scripts.values().filter(|s| !s.all_passed()).count()
    }

    pub fn all_passed(&self) -> bool {
        self.scripts.values().all(ScriptResults::all_passed)
    }

    /// Run-wide statistics, computed from the current set of scripts each
    /// time it is asked for.
    pub fn statistics(&self) -> String {
        format!(
            "STATISTICS:\n\nNumber of scripts: {}; with failures: {}\nNumber of tests: {}; with failures: {}",
            self.total_scripts(),
            self.scripts_with_failures(),
            self.total_tests(),
            self.total_errors(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passing(line: usize) -> LineResult {
        let mut r = LineResult::new("echo ok".into(), Value::Str("ok".into()), None, None);
        r.stamp(Duration::from_millis(3), line);
        r
    }

    fn failing(line: usize) -> LineResult {
        let mut r = LineResult::new(
            "boom".into(),
            Value::Null,
            Some(ScriptError::invocation("it broke")),
            None,
        );
        r.stamp(Duration::from_millis(5), line);
        r
    }

    fn traced(line: usize) -> LineResult {
        let mut r = LineResult::new(
            "timetrace echo ok".into(),
            Value::Null,
            None,
            Some("command took 3 ms".into()),
        );
        r.stamp(Duration::from_millis(3), line);
        r
    }

    #[test]
    fn test_counters_update_incrementally() {
        let mut script = ScriptResults::new("t.txt");
        script.add_result(passing(1));
        script.add_result(failing(2));
        script.add_result(traced(3));
        assert_eq!(script.passed(), 2);
        assert_eq!(script.errors(), 1);
        assert_eq!(script.time_traces(), 1);
        assert_eq!(script.total(), 3);
        assert_eq!(script.total_duration(), Duration::from_millis(11));
        assert!(!script.all_passed());
    }

    #[test]
    fn test_results_ordered_by_line() {
        let mut script = ScriptResults::new("t.txt");
        script.add_result(passing(3));
        script.add_result(passing(1));
        let lines: Vec<usize> = script.results().keys().copied().collect();
        assert_eq!(lines, vec![1, 3]);
        assert!(script.line_result(3).is_some());
        assert!(script.line_result(2).is_none());
    }

    #[test]
    fn test_error_message_sentinel() {
        assert_eq!(passing(1).error_message(), NO_ERROR);
        assert_eq!(failing(1).error_message(), "it broke");
    }

    #[test]
    fn test_readding_script_replaces() {
        let mut run = RunResults::new();
        let mut first = ScriptResults::new("t.txt");
        first.add_result(failing(1));
        run.add(first);
        assert_eq!(run.total_errors(), 1);

        let mut second = ScriptResults::new("t.txt");
        second.add_result(passing(1));
        run.add(second);
        assert_eq!(run.total_scripts(), 1);
        assert_eq!(run.total_errors(), 0);
        assert!(run.all_passed());
    }

    #[test]
    fn test_statistics_on_demand() {
        let mut run = RunResults::new();
        let mut a = ScriptResults::new("a.txt");
        a.add_result(passing(1));
        a.add_result(failing(2));
        run.add(a);
        let mut b = ScriptResults::new("b.txt");
        b.add_result(passing(1));
        run.add(b);
        assert_eq!(
            run.statistics(),
            "STATISTICS:\n\nNumber of scripts: 2; with failures: 1\nNumber of tests: 3; with failures: 1"
        );
    }

    #[test]
    fn test_aborted_script_counts_as_failure() {
        let mut run = RunResults::new();
        let mut a = ScriptResults::new("a.txt");
        a.add_result(passing(1));
        a.set_aborted("File not found: missing.txt");
        run.add(a);
        assert_eq!(run.total_errors(), 0);
        assert_eq!(run.scripts_with_failures(), 1);
        assert!(!run.all_passed());
    }

    #[test]
    fn test_report_lists_failures_and_traces() {
        let mut script = ScriptResults::new("t.txt");
        script.add_result(passing(1));
        script.add_result(failing(2));
        script.add_result(traced(3));
        let report = script.report();
        assert!(report.starts_with(
            "Test file: t.txt | Passed Tests: 2 | Not Passed Tests: 1"
        ));
        assert!(report.contains("FAILURES:\n\tAt line 2: it broke"));
        assert!(report.contains("TIME-TRACES:\n\tAt line 3: command took 3 ms"));
    }
}
