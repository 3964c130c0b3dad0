use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::OnceLock;

use camino::Utf8Path;
use sfcl_conf::Settings;
use sfcl_descriptor::BlockParser;
use sfcl_descriptor::Descriptor;
use sfcl_descriptor::DescriptorCache;
use sfcl_descriptor::ParseRequest;
use sfcl_descriptor::SplitParser;
use sfcl_source::code_frame;
use sfcl_source::relative_path;
use sfcl_source::FileSystem;
use sfcl_source::OsFileSystem;
use sfcl_source::Span;

use crate::compiler::CompilerCapabilities;
use crate::compiler::PlainScriptResolver;
use crate::compiler::ScriptResolver;
use crate::compiler::StyleCompiler;
use crate::compiler::TemplateCompiler;
use crate::context::LoaderContext;
use crate::error::LoaderError;

/// Module paths referenced from generated code and rewritten chains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimePaths {
    /// The entry loader itself.
    pub loader: String,
    /// The chain interceptor.
    pub interceptor: String,
    pub template_stage: String,
    pub style_post_stage: String,
    pub normalizer: String,
    pub hot_reload_api: String,
    pub cache_processor: String,
    /// Ident the host registered the loader options under.
    pub options_ident: String,
}

impl Default for RuntimePaths {
    fn default() -> Self {
        Self {
            loader: "vue-loader/lib/index.js".to_string(),
            interceptor: "vue-loader/lib/loaders/pitcher.js".to_string(),
            template_stage: "vue-loader/lib/loaders/templateLoader.js".to_string(),
            style_post_stage: "vue-loader/lib/loaders/stylePostLoader.js".to_string(),
            normalizer: "vue-loader/lib/runtime/componentNormalizer.js".to_string(),
            hot_reload_api: "vue-hot-reload-api".to_string(),
            cache_processor: "cache-loader/dist/cjs.js".to_string(),
            options_ident: "vue-loader-options".to_string(),
        }
    }
}

/// State shared by every module processed in one build.
///
/// The descriptor cache is shared between entry requests and the block
/// requests they spawn. The integration warning and compiler capabilities
/// are settled once per session.
pub struct BuildSession {
    settings: Settings,
    runtime: RuntimePaths,
    cache: Arc<DescriptorCache>,
    parser: Arc<dyn BlockParser>,
    script_resolver: Arc<dyn ScriptResolver>,
    template_compiler: Option<Arc<dyn TemplateCompiler>>,
    style_compiler: Option<Arc<dyn StyleCompiler>>,
    fs: Arc<dyn FileSystem>,
    integration_reported: AtomicBool,
    capabilities: OnceLock<CompilerCapabilities>,
}

impl BuildSession {
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            runtime: RuntimePaths::default(),
            cache: Arc::new(DescriptorCache::new()),
            parser: Arc::new(SplitParser),
            script_resolver: Arc::new(PlainScriptResolver),
            template_compiler: None,
            style_compiler: None,
            fs: Arc::new(OsFileSystem),
            integration_reported: AtomicBool::new(false),
            capabilities: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn with_runtime_paths(mut self, runtime: RuntimePaths) -> Self {
        self.runtime = runtime;
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache: Arc<DescriptorCache>) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn with_parser(mut self, parser: Arc<dyn BlockParser>) -> Self {
        self.parser = parser;
        self
    }

    #[must_use]
    pub fn with_script_resolver(mut self, resolver: Arc<dyn ScriptResolver>) -> Self {
        self.script_resolver = resolver;
        self
    }

    #[must_use]
    pub fn with_template_compiler(mut self, compiler: Arc<dyn TemplateCompiler>) -> Self {
        self.template_compiler = Some(compiler);
        self
    }

    #[must_use]
    pub fn with_style_compiler(mut self, compiler: Arc<dyn StyleCompiler>) -> Self {
        self.style_compiler = Some(compiler);
        self
    }

    #[must_use]
    pub fn with_file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn runtime(&self) -> &RuntimePaths {
        &self.runtime
    }

    #[must_use]
    pub fn cache(&self) -> &DescriptorCache {
        &self.cache
    }

    #[must_use]
    pub fn script_resolver(&self) -> &dyn ScriptResolver {
        self.script_resolver.as_ref()
    }

    pub fn template_compiler(&self) -> Result<&dyn TemplateCompiler, LoaderError> {
        self.template_compiler
            .as_deref()
            .ok_or(LoaderError::MissingCompiler("template"))
    }

    pub fn style_compiler(&self) -> Result<&dyn StyleCompiler, LoaderError> {
        self.style_compiler
            .as_deref()
            .ok_or(LoaderError::MissingCompiler("style"))
    }

    /// Capabilities of the configured template compiler, asked for once.
    pub fn capabilities(&self) -> CompilerCapabilities {
        *self.capabilities.get_or_init(|| {
            let capabilities = self
                .template_compiler
                .as_ref()
                .map(|compiler| compiler.capabilities())
                .unwrap_or_default();
            tracing::debug!(?capabilities, "negotiated template compiler capabilities");
            capabilities
        })
    }

    /// Report a missing build plugin, at most once per session.
    ///
    /// Thread-pool workers never see the plugin's marker, so they are not
    /// checked.
    pub fn check_integration(&self, ctx: &mut LoaderContext) {
        let in_worker = ctx.in_thread_pool
            || ctx
                .processors
                .iter()
                .any(|p| p.is_any(&self.settings.processors.thread_pool));
        if ctx.integration || in_worker {
            return;
        }
        if !self.integration_reported.swap(true, Ordering::SeqCst) {
            tracing::warn!("loader used without its build plugin");
            ctx.emit_error(
                "The composite-file loader was used without its build plugin. \
                 Make sure the plugin is registered in the build configuration.",
            );
        }
    }

    /// Parse `source` for the context's resource, reusing the cached
    /// descriptor when the text is unchanged.
    ///
    /// A parse failure is reported on `ctx` with a code frame and also
    /// returned.
    pub fn parse(
        &self,
        ctx: &mut LoaderContext,
        source: &str,
    ) -> Result<Arc<Descriptor>, LoaderError> {
        let context = ctx.context().to_owned();
        let path = ctx.resource_path.clone();
        let filename = path.file_name().unwrap_or(path.as_str()).to_string();
        let source_root = relative_path(&context, path.parent().unwrap_or(&context));
        let need_map = ctx.source_map;

        let result = self.cache.get_or_parse(&path, source, |source| {
            self.parser.parse(ParseRequest {
                source,
                filename: &filename,
                source_root: &source_root,
                need_map,
            })
        });

        result.map_err(|err| {
            let span = err.span.unwrap_or(Span::new(0, 0));
            let frame = code_frame(source, path.as_str(), &err.message, span);
            ctx.emit_error(frame);
            LoaderError::Parse { path, source: err }
        })
    }

    /// Cached descriptor for `path`, reading and parsing the file if this
    /// process has not seen it yet.
    pub fn descriptor(&self, path: &Utf8Path) -> Result<Arc<Descriptor>, LoaderError> {
        let filename = path.file_name().unwrap_or(path.as_str());
        let source_root = path.parent().unwrap_or(Utf8Path::new(""));
        Ok(self.cache.get_or_load(path, self.fs.as_ref(), |source| {
            self.parser.parse(ParseRequest {
                source,
                filename,
                source_root,
                need_map: false,
            })
        })?)
    }
}
