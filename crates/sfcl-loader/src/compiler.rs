//! Compilers the loader drives but does not implement.

use serde_json::Map;
use serde_json::Value;
use sfcl_descriptor::Descriptor;
use sfcl_descriptor::SourceMap;
use sfcl_source::Span;

/// What a template compiler can do on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompilerCapabilities {
    /// The compiler installs its own template handling, so the template
    /// stage is not added to template chains.
    pub handles_templates: bool,
}

#[derive(Debug, Clone)]
pub struct TemplateCompileOptions<'a> {
    pub source: &'a str,
    pub filename: &'a str,
    pub compiler_options: Map<String, Value>,
    pub is_production: bool,
    pub is_functional: bool,
    pub is_ts: bool,
    pub optimize_ssr: bool,
    pub prettify: bool,
    /// Bindings exposed by the component's script.
    pub bindings: Option<&'a Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateCompileError {
    pub message: String,
    /// Location in the template source, when the compiler tracks ranges.
    pub span: Option<Span>,
}

#[derive(Debug, Clone, Default)]
pub struct CompiledTemplate {
    pub code: String,
    pub map: Option<SourceMap>,
    pub tips: Vec<String>,
    pub errors: Vec<TemplateCompileError>,
}

pub trait TemplateCompiler: Send + Sync {
    fn capabilities(&self) -> CompilerCapabilities {
        CompilerCapabilities::default()
    }

    fn compile(&self, options: TemplateCompileOptions<'_>) -> CompiledTemplate;
}

#[derive(Debug, Clone)]
pub struct StyleCompileOptions<'a> {
    pub source: &'a str,
    pub filename: &'a str,
    /// Attribute selectors are rewritten to this id (`data-v-<scope id>`).
    pub id: String,
    pub scoped: bool,
    pub trim: bool,
    pub map: Option<&'a SourceMap>,
}

#[derive(Debug, Clone, Default)]
pub struct CompiledStyle {
    pub code: String,
    pub map: Option<SourceMap>,
    pub errors: Vec<String>,
}

pub trait StyleCompiler: Send + Sync {
    fn compile(&self, options: StyleCompileOptions<'_>) -> CompiledStyle;
}

/// The script a component actually runs, after combining its script blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedScript {
    pub content: String,
    pub map: Option<SourceMap>,
    pub lang: Option<String>,
    pub bindings: Option<Value>,
}

pub trait ScriptResolver: Send + Sync {
    fn resolve(&self, descriptor: &Descriptor, scope_id: &str) -> Option<ResolvedScript>;
}

/// Uses the script blocks as written.
///
/// A lone `<script>` or `<script setup>` is returned unchanged. When both
/// are present their contents are joined, `<script>` first; nothing is
/// compiled and no bindings are reported.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainScriptResolver;

impl ScriptResolver for PlainScriptResolver {
    fn resolve(&self, descriptor: &Descriptor, _scope_id: &str) -> Option<ResolvedScript> {
        let lang = descriptor.script_lang().map(str::to_string);
        match (&descriptor.script, &descriptor.script_setup) {
            (Some(block), None) | (None, Some(block)) => Some(ResolvedScript {
                content: block.content.clone(),
                map: block.map.clone(),
                lang,
                bindings: None,
            }),
            (Some(script), Some(setup)) => Some(ResolvedScript {
                content: format!("{}\n{}", script.content, setup.content),
                map: None,
                lang,
                bindings: None,
            }),
            (None, None) => None,
        }
    }
}
