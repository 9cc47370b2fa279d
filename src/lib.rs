//! # frontctl
//!
//! **frontctl** is a front-controller request dispatcher. It maps a request URI onto a
//! controller and one of its actions by position, checks that both exist, builds the
//! controller with its request collaborators and runs the action. Any failure on the way is
//! classified, written to a per-kind log stream and answered with a rendered error page.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - **[`route`]** - URI tokenization and handler/action selector extraction
//! - **[`normalize`]** - `user-profile` → `userProfile` identifier normalization
//! - **[`registry`]** - Explicit controller registry, resolver and action validator
//! - **[`controller`]** - The controller contract: typed action tables and render hooks
//! - **[`dispatcher`]** - The resolve/validate/construct/invoke state machine
//! - **[`recovery`]** - The failure boundary: per-kind logs and the error page
//! - **[`error`]** - Failure taxonomy shared by every stage
//! - **[`server`]** - Request, response and session collaborators
//! - **[`template`]** - minijinja view rendering with layouts and elements
//! - **[`config`]** - Application and database configuration
//! - **[`logging`]** - Process-wide `tracing` subscriber setup
//! - **[`cli`]** - The `frontctl` command line
//!
//! ### Dispatch Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Caller
//!     participant D as Dispatcher
//!     participant R as HandlerRegistry
//!     participant C as Controller
//!     participant F as FailureRecovery
//!
//!     Caller->>D: dispatch(collaborators)
//!     D->>D: Route::parse(uri), normalize selectors
//!     D->>R: resolve(handler)
//!     R-->>D: HandlerType or HandlerNotFound
//!     D->>R: validate(handler, action)
//!     R-->>D: ok or MethodNotFound
//!     D->>C: construct (loads database config)
//!     D->>C: invoke(action)
//!     C-->>D: rendered / error
//!     alt any failure
//!         D->>F: recover(failure, template)
//!         F->>F: write <Kind>.log
//!         F->>C: render error view
//!     end
//!     D-->>Caller: DispatchOutcome
//! ```
//!
//! ## URI Layout
//!
//! ```text
//! /<ignored>/<ignored>/<handler>/.../<action>
//! ```
//!
//! The first two segments are ignored. The fourth segment (index 3 after
//! splitting on `/`) selects the controller, and the last non-empty segment
//! selects the action unless it is the controller segment itself. Both default
//! to `index`.
//!
//! | URI | Controller | Action |
//! |---|---|---|
//! | `/x/y` | `index` | `index` |
//! | `/x/y/user-profile` | `userProfile` | `index` |
//! | `/x/y/user-profile/show-details` | `userProfile` | `showDetails` |
//!
//! ## Quick Start
//!
//! ```bash
//! cargo run -- routes
//! cargo run -- dispatch /x/y/user-profile/show-details?id=7 --root site
//! ```

pub mod cli;
pub mod config;
pub mod controller;
pub mod controllers;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod logging;
pub mod normalize;
pub mod recovery;
pub mod registry;
pub mod route;
pub mod server;
pub mod template;

pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::{DispatchError, DispatchFailure, FailureKind};
pub use registry::{register_all, HandlerRegistry};
