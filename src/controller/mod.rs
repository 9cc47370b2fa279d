//! # Controller Module
//!
//! The contract every dispatchable controller satisfies.
//!
//! ## Overview
//!
//! A controller is an ordinary struct that:
//! - is built from a [`ControllerBase`], which owns the four request
//!   collaborators (session, request, response, template) and the
//!   database configuration loaded eagerly on construction
//! - publishes its actions as a static table of typed function pointers
//!   ([`Controller::ACTIONS`]), so existence checks never need reflection
//! - may hook [`Controller::before_render`] / [`Controller::after_render`]
//!
//! Rendering itself is provided once for all controllers by [`Render`].
//!
//! ## Example
//!
//! ```rust
//! use frontctl::controller::{Action, Controller, ControllerBase, Render};
//! use frontctl::error::DispatchError;
//!
//! pub struct HelloController {
//!     base: ControllerBase,
//! }
//!
//! impl HelloController {
//!     fn index(&mut self) -> Result<(), DispatchError> {
//!         self.render("hello/index")
//!     }
//! }
//!
//! impl Controller for HelloController {
//!     const IDENTIFIER: &'static str = "hello";
//!     const ACTIONS: &'static [Action<Self>] = &[Action::new("index", Self::index)];
//!
//!     fn new(base: ControllerBase) -> Self {
//!         Self { base }
//!     }
//!
//!     fn base(&self) -> &ControllerBase {
//!         &self.base
//!     }
//! }
//! ```

mod base;

use std::sync::Arc;

pub use base::{Action, ActionFn, Controller, ControllerBase, Dispatchable, Render};

use crate::server::{RequestReader, ResponseWriter, SessionStore};
use crate::template::TemplateRenderer;

/// The fixed dependency set handed to every controller, in constructor order.
#[derive(Clone)]
pub struct Collaborators {
    pub session: Arc<dyn SessionStore>,
    pub request: Arc<dyn RequestReader>,
    pub response: Arc<dyn ResponseWriter>,
    pub template: Arc<dyn TemplateRenderer>,
}

impl Collaborators {
    #[must_use]
    pub fn new(
        session: Arc<dyn SessionStore>,
        request: Arc<dyn RequestReader>,
        response: Arc<dyn ResponseWriter>,
        template: Arc<dyn TemplateRenderer>,
    ) -> Self {
        Self {
            session,
            request,
            response,
            template,
        }
    }
}
