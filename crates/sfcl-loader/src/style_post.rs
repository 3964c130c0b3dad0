use sfcl_descriptor::SourceMap;
use sfcl_request::Query;

use crate::compiler::StyleCompileOptions;
use crate::context::LoaderContext;
use crate::error::LoaderError;
use crate::session::BuildSession;

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedStyle {
    pub code: String,
    pub map: Option<SourceMap>,
}

/// Post-processing stage for style blocks: applies scoping to CSS that the
/// user's preprocessors already produced.
///
/// The first compiler error fails the module.
pub fn post_process_style(
    session: &BuildSession,
    ctx: &LoaderContext,
    source: &str,
    map: Option<&SourceMap>,
) -> Result<ProcessedStyle, LoaderError> {
    let query = Query::parse(&ctx.resource_query);
    let id = query.get("id").unwrap_or_default();
    let filename = ctx.resource_path.to_string();

    let compiled = session.style_compiler()?.compile(StyleCompileOptions {
        source,
        filename: &filename,
        id: format!("data-v-{id}"),
        scoped: query.contains("scoped"),
        trim: true,
        map,
    });

    if let Some(error) = compiled.errors.into_iter().next() {
        return Err(LoaderError::StyleCompile(error));
    }
    Ok(ProcessedStyle {
        code: compiled.code,
        map: compiled.map,
    })
}
