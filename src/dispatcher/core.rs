//! Dispatcher core module - the resolve/validate/construct/invoke pipeline.

use std::any::Any;
use std::backtrace::Backtrace;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, info_span};

use crate::config::{AppConfig, ConfigLoader};
use crate::controller::{Collaborators, Dispatchable};
use crate::error::{DispatchError, DispatchFailure, FailureKind};
use crate::ids::CorrelationId;
use crate::recovery::FailureRecovery;
use crate::registry::{validate, HandlerRegistry, HandlerType};
use crate::route::Route;

/// Pipeline stages, in order. `Failed` is reachable from all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DispatchState {
    ParsingPath,
    NormalizingSelectors,
    ResolvingHandler,
    ValidatingMethod,
    ConstructingHandler,
    Invoking,
    Done,
    Failed,
}

impl DispatchState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DispatchState::ParsingPath => "ParsingPath",
            DispatchState::NormalizingSelectors => "NormalizingSelectors",
            DispatchState::ResolvingHandler => "ResolvingHandler",
            DispatchState::ValidatingMethod => "ValidatingMethod",
            DispatchState::ConstructingHandler => "ConstructingHandler",
            DispatchState::Invoking => "Invoking",
            DispatchState::Done => "Done",
            DispatchState::Failed => "Failed",
        }
    }
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved and validated dispatch target.
#[derive(Debug, Clone)]
pub struct DispatchPlan {
    pub route: Route,
    pub handler_identifier: String,
    pub action: String,
    pub handler: HandlerType,
}

/// Result of one dispatch. Failures have already been logged and the
/// error page rendered by the time this is returned.
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    Rendered { handler: String, action: String },
    Failed(DispatchFailure),
}

impl DispatchOutcome {
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        matches!(self, DispatchOutcome::Rendered { .. })
    }

    #[must_use]
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            DispatchOutcome::Rendered { .. } => None,
            DispatchOutcome::Failed(failure) => Some(failure.kind),
        }
    }
}

/// Where the pipeline is and what it knows so far; feeds the trace blob.
struct Trail {
    request_id: CorrelationId,
    uri: String,
    state: DispatchState,
    handler: Option<String>,
    action: Option<String>,
}

impl Trail {
    fn new(uri: &str) -> Self {
        Self {
            request_id: CorrelationId::generate(),
            uri: uri.to_string(),
            state: DispatchState::ParsingPath,
            handler: None,
            action: None,
        }
    }

    fn advance(&mut self, next: DispatchState) {
        debug!(
            request_id = %self.request_id,
            from = %self.state,
            to = %next,
            "Dispatch state transition"
        );
        self.state = next;
    }

    fn fail(&mut self, err: &DispatchError) -> DispatchFailure {
        let stage = self.state;
        self.state = DispatchState::Failed;
        let trace = json!({
            "request_id": self.request_id,
            "started_ms": self.request_id.started_ms(),
            "uri": self.uri,
            "stage": stage,
            "handler": self.handler,
            "action": self.action,
            "error": format!("{err:?}"),
            "backtrace": Backtrace::capture().to_string(),
        });
        DispatchFailure {
            kind: err.kind(),
            message: err.to_string(),
            trace: trace.to_string(),
            stage: stage.as_str(),
        }
    }
}

/// Front controller: maps a request URI onto a registered controller
/// action and runs it.
///
/// Cheap to clone; one instance serves every request.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
    loader: ConfigLoader,
    recovery: FailureRecovery,
}

impl Dispatcher {
    #[must_use]
    pub fn new(registry: HandlerRegistry, loader: ConfigLoader, recovery: FailureRecovery) -> Self {
        Self {
            registry: Arc::new(registry),
            loader,
            recovery,
        }
    }

    /// Dispatcher wired from the application config: database config
    /// path, file-backed failure logs and the configured error page.
    #[must_use]
    pub fn from_config(registry: HandlerRegistry, config: &AppConfig) -> Self {
        Self::new(
            registry,
            ConfigLoader::from_app(config),
            FailureRecovery::from_config(config),
        )
    }

    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Resolve `uri` to a controller type and validated action without
    /// building anything.
    pub fn plan(&self, uri: &str) -> Result<DispatchPlan, DispatchError> {
        self.plan_with(uri, &mut Trail::new(uri))
    }

    fn plan_with(&self, uri: &str, trail: &mut Trail) -> Result<DispatchPlan, DispatchError> {
        let route = Route::parse(uri);

        trail.advance(DispatchState::NormalizingSelectors);
        let handler_identifier = route.handler_identifier();
        let action = route.action_identifier();
        trail.handler = Some(handler_identifier.clone());
        trail.action = Some(action.clone());

        trail.advance(DispatchState::ResolvingHandler);
        let handler = self.registry.resolve(&handler_identifier)?.clone();
        trail.handler = Some(handler.qualified_name().to_string());

        trail.advance(DispatchState::ValidatingMethod);
        validate(&handler, &action)?;

        Ok(DispatchPlan {
            route,
            handler_identifier,
            action,
            handler,
        })
    }

    /// Run one request end to end.
    ///
    /// Never fails and never panics outward: any error is logged to its
    /// failure stream and the error page is rendered through the request's
    /// template renderer instead.
    pub fn dispatch(&self, collaborators: Collaborators) -> DispatchOutcome {
        let uri = collaborators.request.uri().to_string();
        let template = Arc::clone(&collaborators.template);
        let mut trail = Trail::new(&uri);

        let span = info_span!("dispatch", request_id = %trail.request_id, uri = %uri);
        let _enter = span.enter();
        let start = Instant::now();

        match self.run(&uri, collaborators, &mut trail) {
            Ok(plan) => {
                trail.advance(DispatchState::Done);
                info!(
                    request_id = %trail.request_id,
                    handler = %plan.handler.qualified_name(),
                    action = %plan.action,
                    elapsed_us = start.elapsed().as_micros() as u64,
                    "Request dispatched"
                );
                DispatchOutcome::Rendered {
                    handler: plan.handler_identifier,
                    action: plan.action,
                }
            }
            Err(err) => {
                let failure = trail.fail(&err);
                self.recovery.recover(&failure, template.as_ref());
                DispatchOutcome::Failed(failure)
            }
        }
    }

    fn run(
        &self,
        uri: &str,
        collaborators: Collaborators,
        trail: &mut Trail,
    ) -> Result<DispatchPlan, DispatchError> {
        let plan = self.plan_with(uri, trail)?;

        trail.advance(DispatchState::ConstructingHandler);
        let mut controller =
            guarded(|| plan.handler.construct(collaborators, &self.loader))?;

        trail.advance(DispatchState::Invoking);
        // Same check again right before the action runs.
        validate(&plan.handler, &plan.action)?;
        guarded(|| controller.invoke(&plan.action))?;

        Ok(plan)
    }
}

/// Run a construction or invocation step, turning a panic into
/// [`DispatchError::Panic`].
fn guarded<T>(step: impl FnOnce() -> Result<T, DispatchError>) -> Result<T, DispatchError> {
    match catch_unwind(AssertUnwindSafe(step)) {
        Ok(result) => result,
        Err(payload) => Err(DispatchError::Panic(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
