//! The single failure boundary of the dispatch pipeline.
//!
//! A failure is written once to the log stream of its kind, then the
//! generic error page is rendered with the failure message as its only
//! parameter. Nothing is re-raised.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use tracing::{error, Dispatch, Level};
use tracing_appender::rolling::{RollingFileAppender, Rotation};

use crate::config::AppConfig;
use crate::error::{DispatchFailure, FailureKind};
use crate::template::{Parameters, TemplateRenderer};

/// View parameter that carries the failure message.
pub const MESSAGE_PARAMETER: &str = "message";

static LINE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("line break regex should be valid"));
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag regex should be valid"));

/// Collapse line-break markup to ` | ` and strip every other tag.
#[must_use]
pub fn plain_text(message: &str) -> String {
    let collapsed = LINE_BREAK.replace_all(message, " | ");
    TAG.replace_all(&collapsed, "").into_owned()
}

/// Destination for failure records, one stream per [`FailureKind`].
pub trait FailureLog: Send + Sync {
    fn write(&self, kind: FailureKind, message: &str, trace: &str);
}

/// Writes each kind to `<dir>/<Kind>.log` as JSON lines.
///
/// Every stream is its own `tracing` dispatcher, opened on first use.
pub struct FileFailureLog {
    dir: PathBuf,
    streams: Mutex<HashMap<FailureKind, Dispatch>>,
}

impl FileFailureLog {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            streams: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the stream for `kind`.
    #[must_use]
    pub fn path_for(&self, kind: FailureKind) -> PathBuf {
        self.dir.join(format!("{kind}.log"))
    }

    fn stream(&self, kind: FailureKind) -> anyhow::Result<Dispatch> {
        let mut streams = self.streams.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(dispatch) = streams.get(&kind) {
            return Ok(dispatch.clone());
        }

        fs::create_dir_all(&self.dir)?;
        let appender = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(kind.as_str())
            .filename_suffix("log")
            .build(&self.dir)?;

        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(Level::WARN)
            .with_writer(appender)
            .json()
            .finish();

        let dispatch = Dispatch::new(subscriber);
        streams.insert(kind, dispatch.clone());
        Ok(dispatch)
    }
}

impl FailureLog for FileFailureLog {
    fn write(&self, kind: FailureKind, message: &str, trace: &str) {
        match self.stream(kind) {
            Ok(dispatch) => tracing::dispatcher::with_default(&dispatch, || {
                error!(
                    target: "frontctl::failure",
                    kind = kind.as_str(),
                    trace = %trace,
                    "{message}"
                );
            }),
            Err(e) => {
                error!(
                    kind = kind.as_str(),
                    dir = %self.dir.display(),
                    error = %e,
                    dropped = %message,
                    "Failure log unavailable"
                );
            }
        }
    }
}

/// Logs a failure and renders the error page in its place.
#[derive(Clone)]
pub struct FailureRecovery {
    log: Arc<dyn FailureLog>,
    error_template: String,
    error_view: String,
}

impl FailureRecovery {
    #[must_use]
    pub fn new(
        log: Arc<dyn FailureLog>,
        error_template: impl Into<String>,
        error_view: impl Into<String>,
    ) -> Self {
        Self {
            log,
            error_template: error_template.into(),
            error_view: error_view.into(),
        }
    }

    /// File-backed recovery using the configured log directory and error page.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Arc::new(FileFailureLog::new(config.log_dir.clone())),
            config.error_template.clone(),
            config.error_view.clone(),
        )
    }

    pub fn recover(&self, failure: &DispatchFailure, template: &dyn TemplateRenderer) {
        self.log
            .write(failure.kind, &plain_text(&failure.message), &failure.trace);

        template.set_template(&self.error_template);
        let mut params = Parameters::new();
        params.insert(MESSAGE_PARAMETER.to_string(), json!(failure.message));
        template.set_parameters(params);

        // The failure stream already has this failure's one record.
        if let Err(e) = template.render(&self.error_view) {
            error!(
                kind = failure.kind.as_str(),
                view = %self.error_view,
                error = %e,
                "Error view could not be rendered"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DispatchError;
    use crate::server::MemoryOutput;

    #[test]
    fn test_plain_text() {
        assert_eq!(
            plain_text("Controller <b>app::controller::XController</b> not found"),
            "Controller app::controller::XController not found"
        );
        assert_eq!(plain_text("first<br />second<BR>third"), "first | second | third");
        assert_eq!(plain_text("no markup"), "no markup");
    }

    #[test]
    fn test_file_log_per_kind() {
        let dir = tempfile::tempdir().unwrap();
        let log = FileFailureLog::new(dir.path().join("logs"));
        log.write(FailureKind::MethodNotFound, "Action nope not found", "{\"stage\":\"x\"}");
        log.write(FailureKind::MethodNotFound, "Action again not found", "{}");

        let written = fs::read_to_string(log.path_for(FailureKind::MethodNotFound)).unwrap();
        assert_eq!(written.lines().count(), 2);
        assert!(written.contains("Action nope not found"));
        assert!(written.contains("ERROR"));
        assert!(!log.path_for(FailureKind::HandlerNotFound).exists());
    }

    #[test]
    fn test_messages_from_errors_are_plain() {
        let err = DispatchError::HandlerNotFound("app::controller::NopeController".into());
        assert_eq!(plain_text(&err.to_string()), err.to_string());
    }

    /// Collects the default dispatcher's output while `f` runs.
    fn capture(f: impl FnOnce()) -> String {
        let out = MemoryOutput::new();
        let sink = out.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(Level::ERROR)
            .with_writer(move || sink.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        out.contents()
    }

    #[test]
    fn test_unopenable_log_reports_through_tracing() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("logs");
        fs::write(&blocker, "not a directory").unwrap();
        let log = FileFailureLog::new(&blocker);

        let captured = capture(|| {
            log.write(FailureKind::HandlerNotFound, "Controller x not found", "{}");
        });

        assert!(captured.contains("Failure log unavailable"));
        assert!(captured.contains("kind=\"HandlerNotFound\""));
        assert!(captured.contains("Controller x not found"));
        assert_eq!(fs::read_to_string(&blocker).unwrap(), "not a directory");
    }
}
