//! # Registry Module
//!
//! Explicit controller registry: the process-wide set of controller types
//! a request can be dispatched to.
//!
//! ## Overview
//!
//! - Controllers are registered at startup, either typed
//!   ([`HandlerRegistry::register`]) or hand-built ([`HandlerType::new`])
//! - Lookup goes through the qualified name
//!   `app::controller::<Identifier>Controller`, so adding a controller
//!   never touches the resolver
//! - [`validate`] checks an action name against the registered action
//!   table before anything is constructed
//!
//! ## Registration
//!
//! ```rust
//! use frontctl::registry::{register_all, HandlerRegistry};
//!
//! let mut registry = HandlerRegistry::new();
//! register_all(&mut registry);
//! assert!(registry.resolve("userProfile").is_ok());
//! ```

mod core;

pub use core::{
    qualified_name, validate, Factory, HandlerRegistry, HandlerType, CONTROLLER_NAMESPACE,
    CONTROLLER_SUFFIX,
};

use crate::controllers::{IndexController, UserProfileController};

/// Register every bundled controller.
pub fn register_all(registry: &mut HandlerRegistry) {
    registry.register::<IndexController>();
    registry.register::<UserProfileController>();
}
