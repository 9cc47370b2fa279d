use serde_json::{json, Value};

use crate::controller::{Action, Controller, ControllerBase, Render};
use crate::error::DispatchError;
use crate::template::Parameters;

/// `/x/y/user-profile/<action>`
pub struct UserProfileController {
    base: ControllerBase,
}

impl UserProfileController {
    fn index(&mut self) -> Result<(), DispatchError> {
        let mut params = Parameters::new();
        params.insert("title".into(), json!("Profile"));
        params.insert("name".into(), self.stored_name());
        self.base.set_parameters(params);
        self.render("userProfile/index")
    }

    fn show_details(&mut self) -> Result<(), DispatchError> {
        let id = self
            .base
            .get_parameter(Some("id"))
            .ok_or_else(|| anyhow::anyhow!("missing id parameter"))?;

        let mut params = Parameters::new();
        params.insert("title".into(), json!("Profile details"));
        params.insert("id".into(), id);
        params.insert("name".into(), self.stored_name());
        self.base.set_parameters(params);
        self.render("userProfile/showDetails")
    }

    /// Accepts a POSTed `name`, stores it in the session and redirects to
    /// the profile page.
    fn save(&mut self) -> Result<(), DispatchError> {
        if !self.base.request_is_post() {
            self.base.set_header("Allow: POST", true, Some(405))?;
            self.base.set_template("error");
            let mut params = Parameters::new();
            params.insert("message".into(), json!("Saving a profile requires POST"));
            self.base.set_parameters(params);
            return self.render("exceptions/error");
        }

        if let Some(name) = self.base.post_parameter(Some("name")) {
            self.base.session().set("profile.name", name);
        }
        self.base.redirect("userProfile", "index")?;
        self.base.set_header("HTTP/1.1 303 See Other", true, None)?;
        self.base.send_header()
    }

    fn stored_name(&self) -> Value {
        self.base
            .session()
            .get("profile.name")
            .unwrap_or_else(|| json!("guest"))
    }
}

impl Controller for UserProfileController {
    const IDENTIFIER: &'static str = "userProfile";
    const ACTIONS: &'static [Action<Self>] = &[
        Action::new("index", Self::index),
        Action::new("showDetails", Self::show_details),
        Action::new("save", Self::save),
    ];

    fn new(base: ControllerBase) -> Self {
        Self { base }
    }

    fn base(&self) -> &ControllerBase {
        &self.base
    }

    fn before_render(&mut self) {
        self.base.session().set("profile.last_view", json!(self.base.uri()));
    }
}
