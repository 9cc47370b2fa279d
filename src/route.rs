//! Positional request path parsing.
//!
//! Request URIs follow the layout
//! `/<ignored>/<ignored>/<handler>/.../<action>`. There is no pattern
//! matching: segment 3 selects the controller and the last non-empty
//! segment from there on selects the action, unless that segment is the
//! handler segment itself.

use crate::normalize::normalize;

/// Index of the handler-selector segment in the `/`-split URI.
pub const HANDLER_SEGMENT_INDEX: usize = 3;
/// Controller identifier used when no handler segment is given.
pub const DEFAULT_HANDLER: &str = "index";
/// Action identifier used when no distinct action segment is given.
pub const DEFAULT_ACTION: &str = "index";

/// A parsed request path. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    segments: Vec<String>,
    handler_segment: Option<String>,
    action_segment: Option<String>,
}

impl Route {
    /// Split a request URI into segments and pick out the selectors.
    ///
    /// Query string and fragment are cut off first.
    #[must_use]
    pub fn parse(uri: &str) -> Self {
        let path = uri.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<String> = path.split('/').map(str::to_owned).collect();

        let handler_segment = segments
            .get(HANDLER_SEGMENT_INDEX)
            .filter(|s| !s.is_empty())
            .cloned();

        let action_segment = segments
            .iter()
            .skip(HANDLER_SEGMENT_INDEX)
            .rev()
            .find(|s| !s.is_empty())
            .filter(|s| Some(s.as_str()) != handler_segment.as_deref())
            .cloned();

        Self {
            segments,
            handler_segment,
            action_segment,
        }
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Raw handler segment, if the URI carried one.
    #[must_use]
    pub fn handler_segment(&self) -> Option<&str> {
        self.handler_segment.as_deref()
    }

    /// Raw action segment, if the URI carried a distinct one.
    #[must_use]
    pub fn action_segment(&self) -> Option<&str> {
        self.action_segment.as_deref()
    }

    #[must_use]
    pub fn handler_identifier(&self) -> String {
        self.handler_segment
            .as_deref()
            .map_or_else(|| DEFAULT_HANDLER.to_string(), normalize)
    }

    #[must_use]
    pub fn action_identifier(&self) -> String {
        self.action_segment
            .as_deref()
            .map_or_else(|| DEFAULT_ACTION.to_string(), normalize)
    }

    /// The leading segments that precede the handler selector, joined
    /// back into a path (`/x/y` for `/x/y/user/show`).
    #[must_use]
    pub fn base_path(&self) -> String {
        self.segments
            .iter()
            .take(HANDLER_SEGMENT_INDEX)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("/")
    }
}
