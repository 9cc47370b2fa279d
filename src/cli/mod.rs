//! # CLI Module
//!
//! Command-line entry surface of the front controller.
//!
//! ## Commands
//!
//! ### `dispatch`
//!
//! Run one request end to end against a site directory and print the
//! emitted headers, the redirect target (if any) and the rendered page:
//!
//! ```bash
//! frontctl dispatch /x/y/user-profile/show-details?id=7 --root site
//! frontctl dispatch /x/y/user-profile/save --method POST --body 'name=Ada'
//! ```
//!
//! Exits with status 1 when the request failed over to the error page.
//!
//! ### `resolve`
//!
//! Show which controller and action a URI selects, without building the
//! controller:
//!
//! ```bash
//! frontctl resolve /x/y/user-profile
//! ```
//!
//! ### `routes`
//!
//! List every registered controller with its actions.
//!
//! ## Usage from Code
//!
//! ```rust,no_run
//! use clap::Parser;
//! use frontctl::cli::{run_cli, Cli};
//!
//! let cli = Cli::parse();
//! let status = run_cli(cli, &mut std::io::stdout()).unwrap();
//! std::process::exit(i32::from(status));
//! ```

mod commands;


pub use commands::{run_cli, Cli, Commands, EXIT_FAILED, EXIT_OK};
