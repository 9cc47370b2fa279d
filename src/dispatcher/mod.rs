//! # Dispatcher Module
//!
//! The dispatcher is the front controller of the application. It takes the
//! request's collaborators, works out which controller and action the URI
//! names, builds that controller and runs the action.
//!
//! ## Pipeline
//!
//! ```text
//! ParsingPath -> NormalizingSelectors -> ResolvingHandler -> ValidatingMethod
//!     -> ConstructingHandler -> Invoking -> Done
//! ```
//!
//! Any stage may move to `Failed`. A failure is classified into one of the
//! [`FailureKind`](crate::error::FailureKind)s, written once to the log stream
//! of that kind, and the error page is rendered in place of the action's
//! output. [`Dispatcher::dispatch`] itself never returns an error.
//!
//! Resolution and validation are pure: an unknown controller or action is
//! rejected before any controller is built, so the database configuration
//! is never read for such requests.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use frontctl::config::AppConfig;
//! use frontctl::controller::Collaborators;
//! use frontctl::dispatcher::Dispatcher;
//! use frontctl::registry::{register_all, HandlerRegistry};
//! use frontctl::server::{MemoryOutput, MemorySession, Request, Response};
//! use frontctl::template::Template;
//!
//! let config = AppConfig::load(std::path::Path::new("site")).unwrap();
//! let mut registry = HandlerRegistry::new();
//! register_all(&mut registry);
//! let dispatcher = Dispatcher::from_config(registry, &config);
//!
//! let out = MemoryOutput::new();
//! let collaborators = Collaborators::new(
//!     Arc::new(MemorySession::new()),
//!     Arc::new(Request::new(http::Method::GET, "/x/y/user-profile/index")),
//!     Arc::new(Response::new(out.boxed())),
//!     Arc::new(Template::from_config(&config, out.boxed())),
//! );
//! let outcome = dispatcher.dispatch(collaborators);
//! assert!(outcome.is_rendered());
//! ```

mod core;

pub use core::{DispatchOutcome, DispatchPlan, DispatchState, Dispatcher};
