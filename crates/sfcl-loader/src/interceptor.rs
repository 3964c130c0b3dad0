//! Early-pass rewrite of block request chains.
//!
//! The interceptor runs before any other processor of a block request and
//! replaces the module with a re-export from a new request whose chain fits
//! the block type. Rewritten requests start with `-!` so the host does not
//! apply its configured processors a second time.

use camino::Utf8Path;
use serde_json::json;
use sfcl_request::chain_request;
use sfcl_request::match_resource;
use sfcl_request::stringify_request;
use sfcl_request::Query;
use sfcl_request::MARKER;
use sfcl_source::relative_path;
use sfcl_source::to_posix;

use crate::chain::dedupe;
use crate::chain::keep_first_of;
use crate::chain::Processor;
use crate::context::LoaderContext;
use crate::scope::hash_sum;
use crate::session::BuildSession;

/// Suffix that keys compiled templates in the disk cache.
const TEMPLATE_CACHE_DISCRIMINATOR: &str = "-vue-loader-template";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interception {
    /// Leave the request alone; the host continues with its own chain.
    Skip,
    /// Use this module source instead of running the remaining chain.
    Replace(String),
}

pub fn intercept(session: &BuildSession, ctx: &mut LoaderContext) -> Interception {
    let query = ctx.query();
    if !query.contains(MARKER) {
        return Interception::Skip;
    }

    let settings = session.settings();
    let names = &settings.processors;
    let block_type = query.get("type").unwrap_or_default().to_string();
    let mut processors = ctx.processors.clone();

    if !block_type.is_empty() {
        if is_composite(&ctx.resource_path) {
            // The composite file as a whole is linted already.
            processors.retain(|p| !p.is_any(&names.linter));
        } else {
            processors = keep_first_of(processors, &names.linter);
        }
    }

    let own_path = &session.runtime().interceptor;
    processors.retain(|p| &p.path != own_path);

    if processors.iter().any(|p| p.is_any(&names.noop)) {
        tracing::debug!(resource = %ctx.resource_path, "no-op processor present, skipping");
        return Interception::Skip;
    }

    let rewritten = match block_type.as_str() {
        "style" => rewrite_style(session, ctx, &query, processors),
        "template" => Rewrite::Code(rewrite_template(session, ctx, processors)),
        "custom" if only_self_and_cache(session, &processors) => Rewrite::Code(String::new()),
        _ => Rewrite::Generic(processors),
    };

    let code = match rewritten {
        Rewrite::Code(code) => code,
        Rewrite::Generic(processors) => {
            let request = gen_request(session, ctx, processors, None);
            format!("import mod from {request}; export default mod; export * from {request}")
        }
    };
    tracing::debug!(resource = %ctx.resource(), %code, "rewrote block request");
    Interception::Replace(code)
}

enum Rewrite {
    Code(String),
    Generic(Vec<Processor>),
}

fn rewrite_style(
    session: &BuildSession,
    ctx: &mut LoaderContext,
    query: &Query,
    processors: Vec<Processor>,
) -> Rewrite {
    let settings = session.settings();
    let post_stage = Processor::new(&session.runtime().style_post_stage);

    if ctx.host.native_css {
        if !settings.experimental_inline_match_resource {
            ctx.emit_error(
                "`experimental_inline_match_resource` must be enabled when the host handles CSS natively",
            );
            return Rewrite::Code(String::new());
        }
        if query.contains("inline") || query.contains("module") {
            ctx.emit_error(
                "`inline` and `module` styles are not supported when the host handles CSS natively",
            );
            return Rewrite::Code(String::new());
        }

        let chain: Vec<String> = std::iter::once(post_stage)
            .chain(processors)
            .map(|p| p.request())
            .collect();
        let request = match_resource(
            &ctx.resource_path,
            &ctx.resource_query,
            query.get("lang"),
            &chain_request(&chain, &ctx.resource()),
        );
        return Rewrite::Code(format!(
            "@import {};",
            stringify_request(ctx.directory(), &request)
        ));
    }

    let names = &settings.processors;
    if let Some(at) = processors.iter().position(|p| p.is_any(&names.stylesheet)) {
        // The chain runs right to left, so the post stage runs just before
        // the stylesheet processor.
        let mut chain = processors;
        chain.insert(at + 1, post_stage);
        let lang = query.get("lang").unwrap_or("css");
        let request = gen_request(session, ctx, chain, Some(lang));
        let code = if query.contains("module") {
            format!("export {{ default }} from {request}; export * from {request}")
        } else {
            format!("export * from {request}")
        };
        return Rewrite::Code(code);
    }

    if only_self_and_cache(session, &processors) {
        return Rewrite::Code(String::new());
    }
    Rewrite::Generic(processors)
}

fn rewrite_template(
    session: &BuildSession,
    ctx: &LoaderContext,
    processors: Vec<Processor>,
) -> String {
    let settings = session.settings();
    let runtime = session.runtime();
    let mut chain = Vec::new();

    if let Some((directory, identifier)) = settings.template_cache() {
        let directory = if directory.is_absolute() {
            to_posix(&relative_path(&ctx.working_dir, directory))
        } else {
            to_posix(directory)
        };
        let options = json!({
            "cacheDirectory": directory,
            "cacheIdentifier": format!("{}{TEMPLATE_CACHE_DISCRIMINATOR}", hash_sum(identifier)),
        });
        chain.push(Processor::new(&runtime.cache_processor).with_options(options.to_string()));
    }

    let (executed, pending): (Vec<_>, Vec<_>) =
        processors.into_iter().partition(|p| p.pitch_executed);
    chain.extend(executed);
    if !session.capabilities().handles_templates {
        chain.push(
            Processor::new(&runtime.template_stage).with_options(format!("?{}", runtime.options_ident)),
        );
    }
    chain.extend(pending);

    let request = gen_request(session, ctx, chain, None);
    format!("export * from {request}")
}

/// Nothing but the entry loader and disk caches would handle the block.
fn only_self_and_cache(session: &BuildSession, processors: &[Processor]) -> bool {
    let loader = &session.runtime().loader;
    let cache = &session.settings().processors.cache;
    processors
        .iter()
        .all(|p| &p.path == loader || p.is_any(cache))
}

/// Dedupe `processors` and point them at the current resource.
fn gen_request(
    session: &BuildSession,
    ctx: &LoaderContext,
    processors: Vec<Processor>,
    lang: Option<&str>,
) -> String {
    let chain: Vec<String> = dedupe(processors).iter().map(Processor::request).collect();
    let request = chain_request(&chain, &ctx.resource());
    let request = if ctx.host.inline_match_resource
        && session.settings().experimental_inline_match_resource
    {
        match_resource(&ctx.resource_path, &ctx.resource_query, lang, &request)
    } else {
        request
    };
    stringify_request(ctx.directory(), &request)
}

/// Whether `path` is a composite file the entry loader would split.
#[must_use]
pub fn is_composite(path: &Utf8Path) -> bool {
    path.extension() == Some("vue")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sfcl_conf::Settings;

    use super::*;
    use crate::compiler::CompiledTemplate;
    use crate::compiler::CompilerCapabilities;
    use crate::compiler::TemplateCompileOptions;
    use crate::compiler::TemplateCompiler;

    fn context(session: &BuildSession, query: &str, user: &[&str]) -> LoaderContext {
        let mut ctx = LoaderContext::new("/app/App.vue", query);
        ctx.root_context = Some("/app".into());
        ctx.working_dir = "/app".into();
        ctx.processors.push(Processor::new(&session.runtime().interceptor).executed());
        ctx.processors
            .extend(user.iter().map(|name| Processor::new(format!("/app/node_modules/{name}/index.js"))));
        ctx.processors.push(Processor::new(&session.runtime().loader));
        ctx
    }

    fn replaced(interception: Interception) -> String {
        match interception {
            Interception::Replace(code) => code,
            Interception::Skip => panic!("expected the request to be rewritten"),
        }
    }

    #[test]
    fn test_plain_request_is_skipped() {
        let session = BuildSession::new(Settings::default());
        let mut ctx = context(&session, "?foo=bar", &[]);
        assert_eq!(intercept(&session, &mut ctx), Interception::Skip);
    }

    mod linters {
        use super::*;

        #[test]
        fn test_removed_for_composite_files() {
            let session = BuildSession::new(Settings::default());
            let mut ctx = context(&session, "?vue&type=script&lang=js", &["eslint-loader", "babel-loader"]);
            let code = replaced(intercept(&session, &mut ctx));
            assert!(!code.contains("eslint-loader"));
            assert!(code.contains("babel-loader"));
        }

        #[test]
        fn test_first_kept_for_external_sources() {
            let session = BuildSession::new(Settings::default());
            let mut ctx = context(&session, "?vue&type=script&lang=js&external", &["eslint-loader"]);
            ctx.resource_path = "/app/logic.js".into();
            ctx.processors
                .insert(1, Processor::new("/app/node_modules/eslint-loader/dist/index.js"));
            let code = replaced(intercept(&session, &mut ctx));
            assert_eq!(code.matches("eslint-loader").count(), 2);
            assert!(code.contains("eslint-loader/dist/index.js"));
            assert!(!code.contains("eslint-loader/index.js"));
        }
    }

    mod templates {
        use super::*;

        struct InlineTemplates;

        impl TemplateCompiler for InlineTemplates {
            fn capabilities(&self) -> CompilerCapabilities {
                CompilerCapabilities {
                    handles_templates: true,
                }
            }

            fn compile(&self, _options: TemplateCompileOptions<'_>) -> CompiledTemplate {
                CompiledTemplate::default()
            }
        }

        #[test]
        fn test_disk_cache_goes_first() {
            let settings = Settings {
                cache_directory: Some("/app/node_modules/.cache/vue-loader".into()),
                cache_identifier: Some("v1".to_string()),
                ..Settings::default()
            };
            let session = BuildSession::new(settings);
            let mut ctx = context(&session, "?vue&type=template&id=1a2b3c4d", &[]);
            let code = replaced(intercept(&session, &mut ctx));
            let identifier = format!("{}-vue-loader-template", hash_sum("v1"));
            assert_eq!(
                code,
                format!(
                    r#"export * from "-!cache-loader/dist/cjs.js?{{\"cacheDirectory\":\"node_modules/.cache/vue-loader\",\"cacheIdentifier\":\"{identifier}\"}}!vue-loader/lib/loaders/templateLoader.js??vue-loader-options!vue-loader/lib/index.js!./App.vue?vue&type=template&id=1a2b3c4d""#
                )
            );
        }

        #[test]
        fn test_stage_omitted_when_compiler_handles_templates() {
            let session =
                BuildSession::new(Settings::default()).with_template_compiler(Arc::new(InlineTemplates));
            let mut ctx = context(&session, "?vue&type=template&id=1a2b3c4d", &[]);
            assert_eq!(
                replaced(intercept(&session, &mut ctx)),
                r#"export * from "-!vue-loader/lib/index.js!./App.vue?vue&type=template&id=1a2b3c4d""#
            );
        }
    }

    mod styles {
        use super::*;

        #[test]
        fn test_post_stage_follows_stylesheet_processor() {
            let session = BuildSession::new(Settings::default());
            let mut ctx = context(
                &session,
                "?vue&type=style&index=0&lang=scss&module",
                &["vue-style-loader", "css-loader", "sass-loader"],
            );
            let code = replaced(intercept(&session, &mut ctx));
            let request = r#""-!./node_modules/vue-style-loader/index.js!./node_modules/css-loader/index.js!vue-loader/lib/loaders/stylePostLoader.js!./node_modules/sass-loader/index.js!vue-loader/lib/index.js!./App.vue?vue&type=style&index=0&lang=scss&module""#;
            assert_eq!(
                code,
                format!("export {{ default }} from {request}; export * from {request}")
            );
        }

        #[test]
        fn test_no_processors_gives_empty_module() {
            let session = BuildSession::new(Settings::default());
            let mut ctx = context(&session, "?vue&type=style&index=0&lang=css", &["cache-loader"]);
            assert_eq!(intercept(&session, &mut ctx), Interception::Replace(String::new()));
        }

        #[test]
        fn test_native_css_requires_inline_match_resource() {
            let session = BuildSession::new(Settings::default());
            let mut ctx = context(&session, "?vue&type=style&index=0&lang=css", &[]);
            ctx.host.native_css = true;
            assert_eq!(intercept(&session, &mut ctx), Interception::Replace(String::new()));
            assert!(ctx.has_errors());
        }

        #[test]
        fn test_native_css_rejects_module_styles() {
            let settings = Settings {
                experimental_inline_match_resource: true,
                ..Settings::default()
            };
            let session = BuildSession::new(settings);
            let mut ctx = context(&session, "?vue&type=style&index=0&lang=css&module", &[]);
            ctx.host.native_css = true;
            assert_eq!(intercept(&session, &mut ctx), Interception::Replace(String::new()));
            assert!(ctx.diagnostics()[0].message.contains("not supported"));
        }

        #[test]
        fn test_native_css_import() {
            let settings = Settings {
                experimental_inline_match_resource: true,
                ..Settings::default()
            };
            let session = BuildSession::new(settings);
            let mut ctx = context(&session, "?vue&type=style&index=0&lang=css", &[]);
            ctx.host.native_css = true;
            assert_eq!(
                replaced(intercept(&session, &mut ctx)),
                r#"@import "./App.vue.css?vue&type=style&index=0&lang=css!=!-!vue-loader/lib/loaders/stylePostLoader.js!vue-loader/lib/index.js!./App.vue?vue&type=style&index=0&lang=css";"#
            );
            assert!(ctx.diagnostics().is_empty());
        }
    }

    #[test]
    fn test_inline_match_resource_request() {
        let settings = Settings {
            experimental_inline_match_resource: true,
            ..Settings::default()
        };
        let session = BuildSession::new(settings);
        let mut ctx = context(&session, "?vue&type=script&lang=ts", &["ts-loader"]);
        ctx.host.inline_match_resource = true;
        let code = replaced(intercept(&session, &mut ctx));
        assert!(code.starts_with(
            r#"import mod from "./App.vue?vue&type=script&lang=ts!=!-!./node_modules/ts-loader/index.js!vue-loader/lib/index.js!./App.vue?vue&type=script&lang=ts";"#
        ));
    }

    #[test]
    fn test_is_composite() {
        assert!(is_composite(Utf8Path::new("/app/App.vue")));
        assert!(!is_composite(Utf8Path::new("/app/logic.js")));
    }
}
