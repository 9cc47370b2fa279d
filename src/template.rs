//! View rendering on top of minijinja.
//!
//! A page is a view (`<views>/<name>.html`) optionally wrapped in a
//! layout (`<layouts>/<layout>.html`) that receives the rendered view as
//! `content`. Views may include fragments from the element directory with
//! `{% include "elements/<name>.html" %}`.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use minijinja::{Environment, Error, ErrorKind, Value};
use serde_json::Map;
use tracing::debug;

use crate::config::AppConfig;
use crate::error::DispatchError;
use crate::server::Output;

/// View parameters, keyed by variable name.
pub type Parameters = Map<String, serde_json::Value>;

/// Prefix that routes a template name to the layout directory.
pub const LAYOUT_PREFIX: &str = "template/";
/// Prefix that routes a template name to the element directory.
pub const ELEMENT_PREFIX: &str = "elements/";

pub trait TemplateRenderer: Send + Sync {
    /// Select the layout wrapped around subsequent renders.
    fn set_template(&self, name: &str);
    /// Replace the parameters passed to subsequent renders.
    fn set_parameters(&self, params: Parameters);
    fn render(&self, view: &str) -> Result<(), DispatchError>;
}

/// Directories templates are loaded from.
#[derive(Debug, Clone)]
pub struct TemplatePaths {
    pub views: PathBuf,
    pub layouts: PathBuf,
    pub elements: PathBuf,
}

impl TemplatePaths {
    /// Map a template name onto a file, refusing anything that would
    /// leave its base directory.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        if let Some(rest) = name.strip_prefix(LAYOUT_PREFIX) {
            map_path(&self.layouts, rest)
        } else if let Some(rest) = name.strip_prefix(ELEMENT_PREFIX) {
            map_path(&self.elements, rest)
        } else {
            map_path(&self.views, name)
        }
    }
}

fn map_path(base: &Path, name: &str) -> Option<PathBuf> {
    let mut pb = base.to_path_buf();
    for comp in Path::new(name.trim_start_matches('/')).components() {
        match comp {
            Component::Normal(s) => pb.push(s),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(pb)
}

struct TemplateState {
    layout: Option<String>,
    params: Parameters,
    out: Output,
}

/// minijinja-backed renderer writing finished pages to an [`Output`].
pub struct Template {
    env: Environment<'static>,
    state: Mutex<TemplateState>,
}

impl Template {
    #[must_use]
    pub fn new(paths: TemplatePaths, layout: Option<String>, out: Output) -> Self {
        let mut env = Environment::new();
        env.set_loader(move |name| {
            let Some(path) = paths.resolve(name) else {
                return Err(Error::new(
                    ErrorKind::InvalidOperation,
                    format!("template name {name:?} escapes its directory"),
                ));
            };
            match fs::read_to_string(&path) {
                Ok(source) => Ok(Some(source)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(Error::new(
                    ErrorKind::InvalidOperation,
                    format!("could not read template {}", path.display()),
                )
                .with_source(e)),
            }
        });

        Self {
            env,
            state: Mutex::new(TemplateState {
                layout,
                params: Parameters::new(),
                out,
            }),
        }
    }

    /// Renderer over the configured view directories, using the default layout.
    #[must_use]
    pub fn from_config(config: &AppConfig, out: Output) -> Self {
        Self::new(
            TemplatePaths {
                views: config.view_dir.clone(),
                layouts: config.template_dir.clone(),
                elements: config.element_dir.clone(),
            },
            Some(config.default_template.clone()),
            out,
        )
    }

    #[must_use]
    pub fn layout(&self) -> Option<String> {
        self.lock().layout.clone()
    }

    fn lock(&self) -> MutexGuard<'_, TemplateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TemplateRenderer for Template {
    fn set_template(&self, name: &str) {
        self.lock().layout = Some(name.to_string());
    }

    fn set_parameters(&self, params: Parameters) {
        self.lock().params = params;
    }

    fn render(&self, view: &str) -> Result<(), DispatchError> {
        let mut state = self.lock();

        let mut ctx: BTreeMap<String, Value> = state
            .params
            .iter()
            .map(|(k, v)| (k.clone(), Value::from_serialize(v)))
            .collect();

        let content = self
            .env
            .get_template(&format!("{view}.html"))?
            .render(&ctx)?;

        let page = match state.layout.as_deref() {
            Some(layout) => {
                ctx.insert("content".to_string(), Value::from_safe_string(content));
                ctx.insert("view".to_string(), Value::from(view));
                self.env
                    .get_template(&format!("{LAYOUT_PREFIX}{layout}.html"))?
                    .render(&ctx)?
            }
            None => content,
        };

        state.out.write_all(page.as_bytes())?;
        state.out.flush()?;
        debug!(view, layout = ?state.layout, bytes = page.len(), "View rendered");
        Ok(())
    }
}
