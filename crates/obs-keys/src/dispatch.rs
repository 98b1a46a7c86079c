//! Command dispatcher: argv in, exit code out.

use std::future::Future;
use std::io::Write;

use tracing::{debug, warn};

use crate::action::{Action, USAGE};
use crate::config::Settings;
use crate::error::{ErrorKind, ObsError};
use crate::output::OutputFormat;
use crate::session::ControlSession;
use crate::transport::Connector;

/// Runs one invocation and maps its result to an exit code.
#[derive(Debug)]
pub struct Dispatcher<C> {
    connector: C,
    output: OutputFormat,
}

impl<C: Connector> Dispatcher<C> {
    /// Create a dispatcher that connects through `connector`.
    #[must_use]
    pub const fn new(connector: C, output: OutputFormat) -> Self {
        Self { connector, output }
    }

    /// Validate `args`, execute the action and report the result.
    ///
    /// Usage failures print the usage text and never call `settings` or
    /// open a connection. If `interrupt` resolves before the action
    /// finishes, the action is abandoned and the exit code is 130. The
    /// connection, if one was opened, is closed on every path.
    pub async fn run<S, F, I, O, E>(
        self,
        args: &[S],
        settings: F,
        interrupt: I,
        out: &mut O,
        err: &mut E,
    ) -> u8
    where
        S: AsRef<str>,
        F: FnOnce() -> Result<Settings, ObsError>,
        I: Future<Output = ()>,
        O: Write,
        E: Write,
    {
        let action = match Action::from_args(args) {
            Ok(action) => action,
            Err(usage) => {
                debug!(error = %usage, "Rejected command line");
                return usage_failure(&usage, out, err);
            }
        };

        let settings = match settings() {
            Ok(settings) => settings,
            Err(e) => return report_error(&e, err),
        };

        let mut session = ControlSession::new(self.connector, settings);
        let result = tokio::select! {
            result = session.execute(&action) => result,
            () = interrupt => {
                debug!(%action, "Interrupted");
                Err(ObsError::Interrupted)
            }
        };
        session.shutdown().await;

        match result {
            Ok(outcome) => {
                if let Err(e) = self.output.write_outcome(out, &outcome) {
                    warn!(error = %e, "Failed to write result");
                }
                0
            }
            Err(e) => report_error(&e, err),
        }
    }
}

/// Print the usage text and the reason, returning the usage exit code.
pub fn usage_failure<O: Write, E: Write>(
    reason: &impl std::fmt::Display,
    out: &mut O,
    err: &mut E,
) -> u8 {
    let _ = out.write_all(USAGE.as_bytes());
    let _ = writeln!(err, "error: {reason}");
    ErrorKind::Usage.exit_code()
}

fn report_error<E: Write>(error: &ObsError, err: &mut E) -> u8 {
    let _ = writeln!(err, "error: {error}");
    error.exit_code()
}
