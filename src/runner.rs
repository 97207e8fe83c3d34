//! Test runner
//!
//! Executes the configured script files in order against one facade. All
//! scripts of a run share a single variable store, so a value assigned in
//! one script is visible to the next. A script aborted by a parse error or
//! a missing file is recorded and its siblings still run; only a malformed
//! internal-command table stops the whole run.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{ErrorKind, ScriptError};
use crate::facade::SharedFacade;
use crate::result::{LineResult, RunResults, ScriptResults};
use crate::script::Script;
use crate::vars::Variables;

/// Configuration for one run.
#[derive(Default)]
pub struct RunConfig {
    /// Script files to execute, in order.
    pub files: Vec<String>,
    /// Deadline applied to each facade invocation, if any.
    pub timeout: Option<Duration>,
}

/// The runner: one facade, one configuration, one set of results.
pub struct Runner {
    facade: SharedFacade,
    config: RunConfig,
    on_error: Option<Box<dyn FnMut(&LineResult)>>,
}

impl Runner {
    pub fn new(facade: SharedFacade, config: RunConfig) -> Self {
        Self {
            facade,
            config,
            on_error: None,
        }
    }

    pub fn builder(facade: SharedFacade) -> RunnerBuilder {
        RunnerBuilder::new(facade)
    }

    /// Run every configured script. Returns `Err` only for an
    /// internal-configuration failure, which is fatal to the run; everything
    /// else is recorded in the returned results.
    pub fn run_all(&mut self) -> Result<RunResults, ScriptError> {
        let mut vars = Variables::new();
        let mut run = RunResults::new();

        for file in &self.config.files {
            let mut script = match Script::new(file, Arc::clone(&self.facade), &mut vars) {
                Ok(script) => script,
                Err(e) if e.kind == ErrorKind::Internal => return Err(e),
                Err(e) => {
                    let mut results = ScriptResults::new(file.as_str());
                    results.set_aborted(e.to_string());
                    run.add(results);
                    continue;
                }
            };
            script.set_timeout(self.config.timeout);
            if let Some(callback) = self.on_error.as_mut() {
                script.set_listener(&mut **callback);
            }

            let results = match script.run() {
                Ok(()) => script.into_results(),
                Err(e) => {
                    let mut results = script.into_results();
                    results.set_aborted(e.to_string());
                    results
                }
            };
            run.add(results);
        }

        Ok(run)
    }
}

/// Builder API for convenient runner construction.
pub struct RunnerBuilder {
    facade: SharedFacade,
    config: RunConfig,
    on_error: Option<Box<dyn FnMut(&LineResult)>>,
}

impl RunnerBuilder {
    pub fn new(facade: SharedFacade) -> Self {
        Self {
            facade,
            config: RunConfig::default(),
            on_error: None,
        }
    }

    /// Append one script file.
    pub fn file(mut self, file: impl Into<String>) -> Self {
        self.config.files.push(file.into());
        self
    }

    /// Append script files, keeping their order.
    pub fn files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.files.extend(files.into_iter().map(Into::into));
        self
    }

    /// Deadline for each facade invocation.
    pub fn timeout(mut self, deadline: Duration) -> Self {
        self.config.timeout = Some(deadline);
        self
    }

    /// Callback invoked for every errored line as it is recorded.
    pub fn on_error(mut self, callback: impl FnMut(&LineResult) + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }

    pub fn build(self) -> Runner {
        Runner {
            facade: self.facade,
            config: self.config,
            on_error: self.on_error,
        }
    }

    /// Build and run.
    pub fn run(self) -> Result<RunResults, ScriptError> {
        self.build().run_all()
    }
}

/// Run scripts and integrate with `#[test]` by panicking on failure.
///
/// ```rust,ignore
/// #[test]
/// fn acceptance() {
///     let facade = FacadeTable::new().operation(/* ... */);
///     acceptspec::run_and_assert(facade, &["tests/scripts/users.txt"]);
/// }
/// ```
pub fn run_and_assert(facade: crate::facade::FacadeTable, files: &[&str]) {
    let mut runner = RunnerBuilder::new(facade.shared())
        .files(files.iter().copied())
        .build();
    let results = runner
        .run_all()
        .expect("internal command table is malformed");

    for name in results.script_names() {
        if let Some(script) = results.script(name) {
            eprint!("{}", script.report());
        }
    }
    eprintln!("{}", results.statistics());

    if !results.all_passed() {
        panic!("{} script(s) failed", results.scripts_with_failures());
    }
}
