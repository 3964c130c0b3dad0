use camino::Utf8Path;
use camino::Utf8PathBuf;
use sfcl_conf::Settings;
use sfcl_request::Query;
use sfcl_source::Severity;

use crate::chain::Processor;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Development,
    Production,
    None,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Target {
    #[default]
    Web,
    /// Server-side rendering bundle.
    Node,
}

/// What the host build tool can do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostFeatures {
    /// `<virtual>!=!<request>` specifiers are understood.
    pub inline_match_resource: bool,
    /// The host handles CSS natively instead of through processors.
    pub native_css: bool,
}

/// A problem reported through the host's diagnostics channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDiagnostic {
    pub severity: Severity,
    pub message: String,
}

/// The host's view of the module currently being processed.
#[derive(Debug, Clone)]
pub struct LoaderContext {
    pub resource_path: Utf8PathBuf,
    /// Raw query including the leading `?`, or empty.
    pub resource_query: String,
    /// Full request string of the module, processors included.
    pub request: String,
    pub root_context: Option<Utf8PathBuf>,
    pub working_dir: Utf8PathBuf,
    pub mode: Mode,
    pub target: Target,
    pub minimize: bool,
    pub source_map: bool,
    /// Value of `NODE_ENV` in the build process.
    pub node_env: Option<String>,
    /// The whole processing chain for this module, this loader included.
    pub processors: Vec<Processor>,
    pub host: HostFeatures,
    /// Whether the build plugin registered itself on this context.
    pub integration: bool,
    /// Running inside a thread-pool worker.
    pub in_thread_pool: bool,
    diagnostics: Vec<BuildDiagnostic>,
}

impl LoaderContext {
    #[must_use]
    pub fn new(resource_path: impl Into<Utf8PathBuf>, resource_query: impl Into<String>) -> Self {
        let resource_path = resource_path.into();
        let resource_query = resource_query.into();
        let working_dir = resource_path
            .parent()
            .map(Utf8Path::to_path_buf)
            .unwrap_or_default();
        Self {
            request: format!("{resource_path}{resource_query}"),
            resource_path,
            resource_query,
            root_context: None,
            working_dir,
            mode: Mode::default(),
            target: Target::default(),
            minimize: false,
            source_map: false,
            node_env: None,
            processors: Vec::new(),
            host: HostFeatures::default(),
            integration: true,
            in_thread_pool: false,
            diagnostics: Vec::new(),
        }
    }

    /// Project directory short paths and scope ids are derived from.
    #[must_use]
    pub fn context(&self) -> &Utf8Path {
        self.root_context.as_deref().unwrap_or(&self.working_dir)
    }

    /// Directory of the resource; generated specifiers are relative to it.
    #[must_use]
    pub fn directory(&self) -> &Utf8Path {
        self.resource_path.parent().unwrap_or(&self.working_dir)
    }

    #[must_use]
    pub fn query(&self) -> Query {
        Query::parse(&self.resource_query)
    }

    /// `resource_path` followed by the raw query.
    #[must_use]
    pub fn resource(&self) -> String {
        format!("{}{}", self.resource_path, self.resource_query)
    }

    #[must_use]
    pub fn is_server(&self) -> bool {
        self.target == Target::Node
    }

    #[must_use]
    pub fn is_production(&self, settings: &Settings) -> bool {
        self.mode == Mode::Production
            || settings.production_mode
            || self.minimize
            || self.node_env.as_deref() == Some("production")
    }

    pub fn emit_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(%message, resource = %self.resource_path, "build error");
        self.diagnostics.push(BuildDiagnostic {
            severity: Severity::Error,
            message,
        });
    }

    pub fn emit_warning(&mut self, message: impl Into<String>) {
        self.diagnostics.push(BuildDiagnostic {
            severity: Severity::Warning,
            message: message.into(),
        });
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[BuildDiagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity == Severity::Error)
    }

    pub fn take_diagnostics(&mut self) -> Vec<BuildDiagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}
