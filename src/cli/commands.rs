use crate::{
    config::AppConfig,
    controller::Collaborators,
    dispatcher::{DispatchOutcome, Dispatcher},
    recovery::plain_text,
    registry::{register_all, HandlerRegistry},
    server::{MemoryOutput, MemorySession, Request, RequestReader, Response, ResponseWriter},
    template::{Template, TemplateRenderer},
};
use anyhow::Context;
use clap::{Parser, Subcommand};
use http::Method;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Exit status when dispatch rendered the requested action
pub const EXIT_OK: u8 = 0;
/// Exit status when dispatch failed over to the error page
pub const EXIT_FAILED: u8 = 1;

/// Command-line interface for frontctl
///
/// Runs requests through the front controller against a site directory.
#[derive(Parser)]
#[command(name = "frontctl")]
#[command(about = "Front controller dispatcher", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Dispatch one request and print the emitted headers and page
    Dispatch {
        /// Request URI, e.g. /x/y/user-profile/show-details?id=7
        uri: String,

        /// Site root holding config/ and view/
        #[arg(short, long, default_value = "site", env = "FRONTCTL_ROOT")]
        root: PathBuf,

        /// HTTP method of the request
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Form-encoded request body (a=1&b=two)
        #[arg(short, long)]
        body: Option<String>,
    },
    /// Resolve a URI to its controller and action without running it
    Resolve {
        /// Request URI
        uri: String,

        /// Site root holding config/ and view/
        #[arg(short, long, default_value = "site", env = "FRONTCTL_ROOT")]
        root: PathBuf,
    },
    /// List registered controllers and their actions
    Routes,
}

/// Run a parsed command, writing its report to `out`.
///
/// Returns the process exit status.
pub fn run_cli(cli: Cli, out: &mut dyn Write) -> anyhow::Result<u8> {
    let mut registry = HandlerRegistry::new();
    register_all(&mut registry);

    match cli.command {
        Commands::Dispatch {
            uri,
            root,
            method,
            body,
        } => {
            let method = Method::from_bytes(method.to_uppercase().as_bytes())
                .with_context(|| format!("invalid HTTP method {method:?}"))?;
            dispatch(registry, &root, method, &uri, body.as_deref(), out)
        }
        Commands::Resolve { uri, root } => {
            let config = load_config(&root)?;
            let dispatcher = Dispatcher::from_config(registry, &config);
            match dispatcher.plan(&uri) {
                Ok(plan) => {
                    writeln!(out, "handler: {}", plan.handler.qualified_name())?;
                    writeln!(out, "action:  {}", plan.action)?;
                    Ok(EXIT_OK)
                }
                Err(err) => {
                    writeln!(out, "{}: {}", err.kind(), plain_text(&err.to_string()))?;
                    Ok(EXIT_FAILED)
                }
            }
        }
        Commands::Routes => {
            for handler in registry.handlers() {
                writeln!(
                    out,
                    "{:<12} {:<42} {}",
                    handler.identifier(),
                    handler.qualified_name(),
                    handler.actions().join(", ")
                )?;
            }
            Ok(EXIT_OK)
        }
    }
}

fn load_config(root: &Path) -> anyhow::Result<AppConfig> {
    AppConfig::load(root).with_context(|| format!("failed to load site at {}", root.display()))
}

fn dispatch(
    registry: HandlerRegistry,
    root: &Path,
    method: Method,
    uri: &str,
    body: Option<&str>,
    out: &mut dyn Write,
) -> anyhow::Result<u8> {
    let config = load_config(root)?;
    let dispatcher = Dispatcher::from_config(registry, &config);

    let mut request = Request::new(method, uri);
    if let Some(body) = body {
        request = request.with_form_body(body);
    }
    let request = Arc::new(request);

    let page = MemoryOutput::new();
    let collaborators = Collaborators::new(
        Arc::new(MemorySession::new()),
        Arc::clone(&request) as Arc<dyn RequestReader>,
        Arc::new(Response::new(page.boxed())) as Arc<dyn ResponseWriter>,
        Arc::new(Template::from_config(&config, page.boxed())) as Arc<dyn TemplateRenderer>,
    );

    let outcome = dispatcher.dispatch(collaborators);

    if let Some(target) = request.redirect_target() {
        writeln!(out, "Redirect: {target}")?;
    }
    out.write_all(page.contents().as_bytes())?;
    writeln!(out)?;

    match outcome {
        DispatchOutcome::Rendered { .. } => Ok(EXIT_OK),
        DispatchOutcome::Failed(failure) => {
            eprintln!("{}: {}", failure.kind, plain_text(&failure.message));
            Ok(EXIT_FAILED)
        }
    }
}
