#![allow(dead_code)]

pub mod site {
    use frontctl::config::AppConfig;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const FILES: &[(&str, &str)] = &[
        ("view/template/default.html", "<layout>{{ content }}</layout>"),
        ("view/template/error.html", "<error-layout>{{ content }}</error-layout>"),
        ("view/elements/menu.html", "[menu]"),
        ("view/exceptions/error.html", "<p class=\"error\">{{ message }}</p>"),
        ("view/index/index.html", "{{ title }} {{ visits }}"),
        ("view/index/about.html", "{{ title }} {{ driver }}"),
        ("view/userProfile/index.html", "{{ title }}: {{ name }}"),
        (
            "view/userProfile/showDetails.html",
            "{% include \"elements/menu.html\" %}id={{ id }} name={{ name }}",
        ),
    ];

    const DATABASE: &str = "driver: sqlite\nhost: localhost\nname: test\nuser: test\n";

    /// Throwaway site directory with views, layouts and database config.
    pub struct TestSite {
        dir: TempDir,
    }

    impl TestSite {
        pub fn new() -> Self {
            let site = Self::without_database();
            site.write("config/database.yaml", DATABASE);
            site
        }

        /// Views only; every controller construction fails.
        pub fn without_database() -> Self {
            let site = Self {
                dir: tempfile::tempdir().unwrap(),
            };
            for (path, content) in FILES {
                site.write(path, content);
            }
            site
        }

        pub fn write(&self, path: &str, content: &str) {
            let full = self.dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }

        pub fn root(&self) -> &Path {
            self.dir.path()
        }

        pub fn config(&self) -> AppConfig {
            AppConfig::default().rooted_at(self.root())
        }

        /// Names of the files in the failure log directory, sorted.
        pub fn log_files(&self) -> Vec<String> {
            let Ok(entries) = fs::read_dir(self.config().log_dir) else {
                return Vec::new();
            };
            let mut names: Vec<String> = entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect();
            names.sort();
            names
        }
    }
}

pub mod fakes {
    use frontctl::error::{DispatchError, FailureKind};
    use frontctl::recovery::FailureLog;
    use frontctl::template::{Parameters, TemplateRenderer};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    pub struct LogEntry {
        pub kind: FailureKind,
        pub message: String,
        pub trace: String,
    }

    /// Failure log that keeps every record in memory.
    #[derive(Default)]
    pub struct RecordingFailureLog {
        entries: Mutex<Vec<LogEntry>>,
    }

    impl RecordingFailureLog {
        pub fn entries(&self) -> Vec<LogEntry> {
            self.entries.lock().unwrap().clone()
        }
    }

    impl FailureLog for RecordingFailureLog {
        fn write(&self, kind: FailureKind, message: &str, trace: &str) {
            self.entries.lock().unwrap().push(LogEntry {
                kind,
                message: message.to_string(),
                trace: trace.to_string(),
            });
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum TemplateCall {
        SetTemplate(String),
        SetParameters(Parameters),
        Render(String),
    }

    /// Renderer that records calls instead of rendering.
    #[derive(Default)]
    pub struct RecordingTemplate {
        calls: Mutex<Vec<TemplateCall>>,
        failing_view: Option<String>,
    }

    impl RecordingTemplate {
        /// Rendering `view` fails with a template error.
        pub fn failing_on(view: &str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                failing_view: Some(view.to_string()),
            }
        }

        pub fn calls(&self) -> Vec<TemplateCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn renders(&self) -> Vec<String> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    TemplateCall::Render(view) => Some(view),
                    _ => None,
                })
                .collect()
        }
    }

    impl TemplateRenderer for RecordingTemplate {
        fn set_template(&self, name: &str) {
            self.calls
                .lock()
                .unwrap()
                .push(TemplateCall::SetTemplate(name.to_string()));
        }

        fn set_parameters(&self, params: Parameters) {
            self.calls
                .lock()
                .unwrap()
                .push(TemplateCall::SetParameters(params));
        }

        fn render(&self, view: &str) -> Result<(), DispatchError> {
            self.calls
                .lock()
                .unwrap()
                .push(TemplateCall::Render(view.to_string()));
            if self.failing_view.as_deref() == Some(view) {
                return Err(DispatchError::Template(minijinja::Error::new(
                    minijinja::ErrorKind::TemplateNotFound,
                    format!("{view}.html"),
                )));
            }
            Ok(())
        }
    }
}

pub mod request {
    use frontctl::controller::Collaborators;
    use frontctl::server::{
        MemoryOutput, MemorySession, Request, RequestReader, Response, ResponseWriter,
        SessionStore,
    };
    use frontctl::template::TemplateRenderer;
    use http::Method;
    use std::sync::Arc;

    /// One request's collaborators plus typed handles to inspect afterwards.
    pub struct Harness {
        pub session: Arc<MemorySession>,
        pub request: Arc<Request>,
        pub response: Arc<Response>,
        pub out: MemoryOutput,
    }

    impl Harness {
        pub fn new(method: Method, uri: &str, body: Option<&str>) -> Self {
            let mut request = Request::new(method, uri);
            if let Some(body) = body {
                request = request.with_form_body(body);
            }
            let out = MemoryOutput::new();
            Self {
                session: Arc::new(MemorySession::new()),
                request: Arc::new(request),
                response: Arc::new(Response::new(out.boxed())),
                out,
            }
        }

        pub fn get(uri: &str) -> Self {
            Self::new(Method::GET, uri, None)
        }

        pub fn collaborators(&self, template: Arc<dyn TemplateRenderer>) -> Collaborators {
            Collaborators::new(
                Arc::clone(&self.session) as Arc<dyn SessionStore>,
                Arc::clone(&self.request) as Arc<dyn RequestReader>,
                Arc::clone(&self.response) as Arc<dyn ResponseWriter>,
                template,
            )
        }
    }
}
