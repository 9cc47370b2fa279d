use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::ConfigLoader;
use crate::controller::{Collaborators, Controller, ControllerBase, Dispatchable};
use crate::error::DispatchError;
use crate::normalize::ucfirst;

/// Namespace prefix of every qualified controller name.
pub const CONTROLLER_NAMESPACE: &str = "app::controller";
/// Suffix of every qualified controller name.
pub const CONTROLLER_SUFFIX: &str = "Controller";

/// `userProfile` -> `app::controller::UserProfileController`
#[must_use]
pub fn qualified_name(identifier: &str) -> String {
    format!(
        "{CONTROLLER_NAMESPACE}::{}{CONTROLLER_SUFFIX}",
        ucfirst(identifier)
    )
}

/// Builds a controller from the request collaborators.
pub type Factory = Arc<
    dyn Fn(Collaborators, &ConfigLoader) -> Result<Box<dyn Dispatchable>, DispatchError>
        + Send
        + Sync,
>;

/// A registered controller type: its names, its action table and how to
/// build it.
#[derive(Clone)]
pub struct HandlerType {
    identifier: String,
    qualified_name: String,
    actions: Vec<String>,
    factory: Factory,
}

impl HandlerType {
    /// Describe a hand-built controller type.
    pub fn new<F>(identifier: impl Into<String>, actions: Vec<String>, factory: F) -> Self
    where
        F: Fn(Collaborators, &ConfigLoader) -> Result<Box<dyn Dispatchable>, DispatchError>
            + Send
            + Sync
            + 'static,
    {
        let identifier = identifier.into();
        Self {
            qualified_name: qualified_name(&identifier),
            identifier,
            actions,
            factory: Arc::new(factory),
        }
    }

    /// Describe a typed [`Controller`].
    #[must_use]
    pub fn of<C: Controller>() -> Self {
        let actions = C::ACTIONS.iter().map(|a| a.name.to_string()).collect();
        Self::new(C::IDENTIFIER, actions, |collaborators, loader| {
            let Collaborators {
                session,
                request,
                response,
                template,
            } = collaborators;
            let base = ControllerBase::new(session, request, response, template, loader)?;
            Ok(Box::new(C::new(base)) as Box<dyn Dispatchable>)
        })
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    #[must_use]
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    #[must_use]
    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    #[must_use]
    pub fn has_action(&self, action: &str) -> bool {
        self.actions.iter().any(|a| a == action)
    }

    /// Run the factory. This is where construction side effects happen.
    pub fn construct(
        &self,
        collaborators: Collaborators,
        loader: &ConfigLoader,
    ) -> Result<Box<dyn Dispatchable>, DispatchError> {
        (self.factory)(collaborators, loader)
    }
}

impl fmt::Debug for HandlerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerType")
            .field("qualified_name", &self.qualified_name)
            .field("actions", &self.actions)
            .finish_non_exhaustive()
    }
}

/// Check that `handler` exposes `action`.
///
/// Pure and idempotent; never constructs anything.
pub fn validate(handler: &HandlerType, action: &str) -> Result<(), DispatchError> {
    if handler.has_action(action) {
        Ok(())
    } else {
        Err(DispatchError::MethodNotFound {
            action: action.to_string(),
            handler: handler.qualified_name.clone(),
        })
    }
}

/// Controller types known to the process, keyed by qualified name.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, HandlerType>,
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<C: Controller>(&mut self) {
        self.insert(HandlerType::of::<C>());
    }

    /// Add a controller type. An existing type with the same qualified
    /// name is replaced.
    pub fn insert(&mut self, handler: HandlerType) {
        let name = handler.qualified_name.clone();
        if self.handlers.insert(name.clone(), handler).is_some() {
            warn!(handler = %name, "Replaced existing controller registration");
        } else {
            info!(
                handler = %name,
                total_handlers = self.handlers.len(),
                "Controller registered"
            );
        }
    }

    /// Look up the controller type for a normalized identifier.
    pub fn resolve(&self, identifier: &str) -> Result<&HandlerType, DispatchError> {
        let name = qualified_name(identifier);
        self.handlers
            .get(&name)
            .ok_or(DispatchError::HandlerNotFound(name))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered types sorted by qualified name.
    #[must_use]
    pub fn handlers(&self) -> Vec<&HandlerType> {
        let mut all: Vec<&HandlerType> = self.handlers.values().collect();
        all.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Noop;

    impl Dispatchable for Noop {
        fn invoke(&mut self, _action: &str) -> Result<(), DispatchError> {
            Ok(())
        }
    }

    fn handler(identifier: &str, actions: &[&str], built: Arc<AtomicUsize>) -> HandlerType {
        HandlerType::new(
            identifier,
            actions.iter().map(|a| a.to_string()).collect(),
            move |_, _| {
                built.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(Noop) as Box<dyn Dispatchable>)
            },
        )
    }

    #[test]
    fn test_qualified_name() {
        assert_eq!(qualified_name("index"), "app::controller::IndexController");
        assert_eq!(
            qualified_name("userProfile"),
            "app::controller::UserProfileController"
        );
    }

    #[test]
    fn test_resolve_unknown_carries_qualified_name() {
        let registry = HandlerRegistry::new();
        match registry.resolve("userProfile") {
            Err(DispatchError::HandlerNotFound(name)) => {
                assert_eq!(name, "app::controller::UserProfileController");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_registered() {
        let built = Arc::new(AtomicUsize::new(0));
        let mut registry = HandlerRegistry::new();
        registry.insert(handler("userProfile", &["index"], Arc::clone(&built)));

        let found = registry.resolve("userProfile").unwrap();
        assert_eq!(found.identifier(), "userProfile");
        // resolving never builds
        assert_eq!(built.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_validate_missing_and_idempotent() {
        let built = Arc::new(AtomicUsize::new(0));
        let ty = handler("index", &["index", "about"], Arc::clone(&built));

        match validate(&ty, "contact") {
            Err(DispatchError::MethodNotFound { action, handler }) => {
                assert_eq!(action, "contact");
                assert_eq!(handler, "app::controller::IndexController");
            }
            other => panic!("unexpected: {other:?}"),
        }

        for _ in 0..3 {
            assert!(validate(&ty, "about").is_ok());
        }
        assert_eq!(built.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_insert_replaces_same_name() {
        let built = Arc::new(AtomicUsize::new(0));
        let mut registry = HandlerRegistry::new();
        registry.insert(handler("index", &["index"], Arc::clone(&built)));
        registry.insert(handler("index", &["index", "about"], Arc::clone(&built)));

        assert_eq!(registry.len(), 1);
        assert!(registry.resolve("index").unwrap().has_action("about"));
    }
}
