use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::config::{ConfigLoader, DatabaseConfig};
use crate::error::DispatchError;
use crate::registry::qualified_name;
use crate::server::{RequestReader, ResponseWriter, SessionStore};
use crate::template::{Parameters, TemplateRenderer};

/// Signature of a controller action.
pub type ActionFn<C> = fn(&mut C) -> Result<(), DispatchError>;

/// One entry of a controller's action table.
pub struct Action<C> {
    pub name: &'static str,
    pub call: ActionFn<C>,
}

impl<C> Action<C> {
    pub const fn new(name: &'static str, call: ActionFn<C>) -> Self {
        Self { name, call }
    }
}

/// State shared by every controller: the request collaborators and the
/// database configuration.
pub struct ControllerBase {
    session: Arc<dyn SessionStore>,
    request: Arc<dyn RequestReader>,
    response: Arc<dyn ResponseWriter>,
    template: Arc<dyn TemplateRenderer>,
    database: DatabaseConfig,
}

impl ControllerBase {
    /// Store the collaborators and load the database configuration.
    ///
    /// Fails with [`DispatchError::ConfigurationNotFound`] when the
    /// configuration resource is missing.
    pub fn new(
        session: Arc<dyn SessionStore>,
        request: Arc<dyn RequestReader>,
        response: Arc<dyn ResponseWriter>,
        template: Arc<dyn TemplateRenderer>,
        loader: &ConfigLoader,
    ) -> Result<Self, DispatchError> {
        let database = loader.load_database()?;
        Ok(Self {
            session,
            request,
            response,
            template,
            database,
        })
    }

    #[must_use]
    pub fn session(&self) -> &dyn SessionStore {
        self.session.as_ref()
    }

    #[must_use]
    pub fn database(&self) -> &DatabaseConfig {
        &self.database
    }

    #[must_use]
    pub fn template(&self) -> &dyn TemplateRenderer {
        self.template.as_ref()
    }

    pub fn redirect(&self, handler: &str, action: &str) -> Result<(), DispatchError> {
        self.request.redirect(handler, action)
    }

    #[must_use]
    pub fn post_parameter(&self, key: Option<&str>) -> Option<Value> {
        self.request.post_parameter(key)
    }

    #[must_use]
    pub fn get_parameter(&self, key: Option<&str>) -> Option<Value> {
        self.request.get_parameter(key)
    }

    #[must_use]
    pub fn put_parameter(&self, key: Option<&str>) -> Option<Value> {
        self.request.put_parameter(key)
    }

    #[must_use]
    pub fn request_is_post(&self) -> bool {
        self.request.is_post()
    }

    #[must_use]
    pub fn request_is_get(&self) -> bool {
        self.request.is_get()
    }

    #[must_use]
    pub fn request_is_put(&self) -> bool {
        self.request.is_put()
    }

    #[must_use]
    pub fn request_is_delete(&self) -> bool {
        self.request.is_delete()
    }

    #[must_use]
    pub fn uri(&self) -> &str {
        self.request.uri()
    }

    /// Buffer a response header, e.g. `"Content-Type: application/pdf"`
    /// or `"HTTP/1.0 404 Not Found"`.
    pub fn set_header(
        &self,
        value: &str,
        replace: bool,
        status: Option<u16>,
    ) -> Result<(), DispatchError> {
        self.response.set_header(value, replace, status)
    }

    pub fn send_header(&self) -> Result<(), DispatchError> {
        self.response.display()
    }

    pub fn set_template(&self, name: &str) {
        self.template.set_template(name);
    }

    pub fn set_parameters(&self, params: Parameters) {
        self.template.set_parameters(params);
    }
}

/// A dispatchable controller.
pub trait Controller: Sized + 'static {
    /// Normalized identifier the controller answers to (`userProfile`).
    const IDENTIFIER: &'static str;
    /// Every action the controller exposes, by normalized name.
    const ACTIONS: &'static [Action<Self>];

    fn new(base: ControllerBase) -> Self;

    fn base(&self) -> &ControllerBase;

    fn before_render(&mut self) {}

    fn after_render(&mut self) {}
}

/// Rendering shared by all controllers.
///
/// Blanket-implemented for every [`Controller`]; controllers customise it
/// through the render hooks only.
pub trait Render {
    fn render(&mut self, view: &str) -> Result<(), DispatchError>;
}

impl<C: Controller> Render for C {
    fn render(&mut self, view: &str) -> Result<(), DispatchError> {
        self.base().send_header()?;
        self.before_render();
        self.base().template().render(view)?;
        self.after_render();
        Ok(())
    }
}

/// Type-erased controller stored behind the registry's factories.
pub trait Dispatchable {
    fn invoke(&mut self, action: &str) -> Result<(), DispatchError>;
}

impl<C: Controller> Dispatchable for C {
    fn invoke(&mut self, action: &str) -> Result<(), DispatchError> {
        let entry = C::ACTIONS
            .iter()
            .find(|a| a.name == action)
            .ok_or_else(|| DispatchError::MethodNotFound {
                action: action.to_string(),
                handler: qualified_name(C::IDENTIFIER),
            })?;
        debug!(handler = C::IDENTIFIER, action, "Invoking action");
        (entry.call)(self)
    }
}
