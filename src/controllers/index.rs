use serde_json::json;

use crate::controller::{Action, Controller, ControllerBase, Render};
use crate::error::DispatchError;
use crate::template::Parameters;

/// Landing pages. Answers `/x/y` and `/x/y/index/<action>`.
pub struct IndexController {
    base: ControllerBase,
}

impl IndexController {
    fn index(&mut self) -> Result<(), DispatchError> {
        let visits = self
            .base
            .session()
            .get("visits")
            .and_then(|v| v.as_u64())
            .unwrap_or(0)
            + 1;
        self.base.session().set("visits", json!(visits));

        let mut params = Parameters::new();
        params.insert("title".into(), json!("Welcome"));
        params.insert("visits".into(), json!(visits));
        self.base.set_parameters(params);
        self.render("index/index")
    }

    fn about(&mut self) -> Result<(), DispatchError> {
        let mut params = Parameters::new();
        params.insert("title".into(), json!("About"));
        params.insert("driver".into(), json!(self.base.database().driver));
        self.base.set_parameters(params);
        self.render("index/about")
    }
}

impl Controller for IndexController {
    const IDENTIFIER: &'static str = "index";
    const ACTIONS: &'static [Action<Self>] = &[
        Action::new("index", Self::index),
        Action::new("about", Self::about),
    ];

    fn new(base: ControllerBase) -> Self {
        Self { base }
    }

    fn base(&self) -> &ControllerBase {
        &self.base
    }
}
