//! Entry loader: turns a composite file into a component module, or serves
//! one of its blocks when the request addresses a block.

use sfcl_descriptor::Descriptor;
use sfcl_request::quote;
use sfcl_request::BlockKind;
use sfcl_request::SubRequest;
use sfcl_request::MARKER;

use crate::codegen::custom_blocks::gen_custom_blocks;
use crate::codegen::hot_reload::gen_hot_reload;
use crate::codegen::styles::gen_styles;
use crate::codegen::styles::StyleOptions;
use crate::codegen::RequestWriter;
use crate::context::LoaderContext;
use crate::error::LoaderError;
use crate::extract::extract;
use crate::extract::Extracted;
use crate::scope::hash_sum;
use crate::scope::scope_id;
use crate::scope::short_file_path;
use crate::session::BuildSession;

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutput {
    /// Generated component module.
    Module(String),
    /// Raw content of the requested block.
    Block(Extracted),
}

impl LoadOutput {
    /// The text handed back to the host.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Module(code) => code,
            Self::Block(block) => &block.content,
        }
    }
}

pub fn load(
    session: &BuildSession,
    ctx: &mut LoaderContext,
    source: &str,
) -> Result<LoadOutput, LoaderError> {
    session.check_integration(ctx);

    let query = ctx.query();
    // Block requests are told apart by their `type`; a bare marker still
    // gets the component module.
    let is_block =
        query.contains(MARKER) && query.get("type").is_some_and(|kind| !kind.is_empty());
    if is_block && query.contains("external") {
        // An external `src` file is already the block.
        return Ok(LoadOutput::Block(Extracted {
            content: source.to_string(),
            map: None,
            resource_path: ctx.resource_path.clone(),
        }));
    }

    let descriptor = session.parse(ctx, source)?;

    let settings = session.settings();
    let is_production = ctx.is_production(settings);
    let short_path = short_file_path(ctx.context(), &ctx.resource_path);
    let id = scope_id(&short_path, is_production, source);

    if is_block {
        let request = SubRequest::from_parts(&ctx.resource_path, &query)?;
        tracing::debug!(resource = %ctx.resource(), kind = %request.kind, "serving block");
        return extract(session, &descriptor, &request, &id).map(LoadOutput::Block);
    }

    let code = gen_component(session, ctx, &descriptor, &id, &short_path)?;
    Ok(LoadOutput::Module(code))
}

fn gen_component(
    session: &BuildSession,
    ctx: &mut LoaderContext,
    descriptor: &Descriptor,
    id: &str,
    short_path: &str,
) -> Result<String, LoaderError> {
    let settings = session.settings();
    let runtime = session.runtime();
    let is_server = ctx.is_server();
    let is_production = ctx.is_production(settings);
    let is_shadow = settings.shadow_mode;
    let resource_path = ctx.resource_path.clone();
    let resource_query = ctx.query();

    let has_scoped = descriptor.has_scoped_styles();
    let has_functional = descriptor.has_functional_template();
    let needs_hot_reload = !is_server
        && !is_production
        && (descriptor.has_script() || descriptor.template.is_some())
        && settings.hot_reload;

    let inline_chain = (ctx.host.inline_match_resource
        && settings.experimental_inline_match_resource)
        .then(|| {
            let start = ctx
                .processors
                .iter()
                .position(|p| p.path == runtime.loader)
                .unwrap_or(0);
            ctx.processors[start..].iter().map(|p| p.request()).collect()
        });
    let writer = RequestWriter::new(ctx.directory().to_owned(), inline_chain);

    let script_lang = descriptor.script_lang();
    let is_ts = script_lang.is_some_and(|lang| lang.contains("ts"));
    let script_import = match descriptor.script_setup.as_ref().or(descriptor.script.as_ref()) {
        Some(block) => {
            let external = descriptor
                .script
                .as_ref()
                .and_then(|script| script.src())
                .filter(|_| descriptor.script_setup.is_none());
            let request = SubRequest::new(
                external.map_or_else(|| resource_path.clone(), Into::into),
                BlockKind::Script,
            )
            .with_attrs(&block.attrs, Some("js"))
            .with_resource_query(&resource_query)
            .with_external(external.is_some());
            let request = writer.write(&request, Some(script_lang.unwrap_or("js")));
            format!("import script from {request}\nexport * from {request}")
        }
        None => "var script = {}".to_string(),
    };

    let (template_import, template_request) = match &descriptor.template {
        Some(template) => {
            let ts = settings.enable_ts_in_template && is_ts;
            let request = SubRequest::new(
                template.src().map_or_else(|| resource_path.clone(), Into::into),
                BlockKind::Template,
            )
            .with_attrs(&template.attrs, None)
            .with_scope_id(id)
            .with_scoped(has_scoped)
            .with_ts(ts)
            .with_resource_query(&resource_query)
            .with_external(template.src().is_some());
            let request = writer.write(&request, Some(if ts { "ts" } else { "js" }));
            (
                format!("import {{ render, staticRenderFns }} from {request}"),
                Some(request),
            )
        }
        None => ("var render, staticRenderFns".to_string(), None),
    };

    let styles = gen_styles(
        &descriptor.styles,
        &writer,
        &StyleOptions {
            id,
            resource_path: &resource_path,
            resource_query: &resource_query,
            needs_hot_reload,
            needs_explicit_injection: is_server || is_shadow,
            hot_reload_api: &runtime.hot_reload_api,
        },
    );
    for name in &styles.duplicate_modules {
        ctx.emit_error(format!("CSS module name {name} is not unique!"));
    }

    let mut args = vec![
        "script".to_string(),
        "render".to_string(),
        "staticRenderFns".to_string(),
        has_functional.to_string(),
        if styles.has_injector { "injectStyles" } else { "null" }.to_string(),
        if has_scoped { quote(id) } else { "null".to_string() },
        if is_server {
            quote(&hash_sum(&ctx.request))
        } else {
            "null".to_string()
        },
    ];
    if is_shadow {
        args.push("true".to_string());
    }

    let mut code = format!(
        "{template_import}\n{script_import}\n{styles}\n\n\
         /* normalize component */\n\
         import normalizer from {normalizer}\n\
         var component = normalizer(\n  {args}\n)",
        styles = styles.code.trim_end(),
        normalizer = writer.write_raw(&runtime.normalizer),
        args = args.join(",\n  "),
    );
    code.push('\n');

    if !descriptor.custom_blocks.is_empty() {
        code.push_str(&gen_custom_blocks(
            &descriptor.custom_blocks,
            &resource_path,
            &resource_query,
            &writer,
        ));
    }

    if needs_hot_reload {
        code.push('\n');
        code.push_str(&gen_hot_reload(
            id,
            has_functional,
            template_request.as_deref(),
            &runtime.hot_reload_api,
        ));
    }

    if !is_production {
        code.push_str(&format!("\ncomponent.options.__file = {}", quote(short_path)));
    } else if settings.expose_filename {
        let filename = resource_path.file_name().unwrap_or(resource_path.as_str());
        code.push_str(&format!("\ncomponent.options.__file = {}", quote(filename)));
    }

    code.push_str("\nexport default component.exports");
    Ok(code)
}

#[cfg(test)]
mod tests {
    use sfcl_conf::Settings;

    use super::*;
    use crate::chain::Processor;
    use crate::context::Target;

    const APP: &str = "<template><div class=\"app\">{{ msg }}</div></template>\n\
<script>export default { data: () => ({ msg: 'hi' }) }</script>\n\
<style scoped>.app { color: red }</style>\n";

    fn context(query: &str) -> LoaderContext {
        let mut ctx = LoaderContext::new("/app/src/App.vue", query);
        ctx.root_context = Some("/app".into());
        ctx
    }

    #[test]
    fn test_component_module() {
        let session = BuildSession::new(Settings::default());
        let mut ctx = context("");
        let code = load(&session, &mut ctx, APP).unwrap();
        let LoadOutput::Module(code) = code else {
            panic!("expected a component module");
        };
        let id = hash_sum("src/App.vue");

        assert!(code.starts_with(&format!(
            "import {{ render, staticRenderFns }} from \"./App.vue?vue&type=template&id={id}&scoped=true\"\n\
             import script from \"./App.vue?vue&type=script&lang=js\"\n\
             export * from \"./App.vue?vue&type=script&lang=js\"\n\
             import style0 from \"./App.vue?vue&type=style&index=0&id={id}&scoped=true&lang=css\"\n"
        )));
        assert!(code.contains(&format!(
            "var component = normalizer(\n  script,\n  render,\n  staticRenderFns,\n  false,\n  null,\n  \"{id}\",\n  null\n)"
        )));
        assert!(code.contains("/* hot reload */"));
        assert!(code.contains("component.options.__file = \"src/App.vue\""));
        assert!(code.ends_with("\nexport default component.exports"));
        assert!(ctx.diagnostics().is_empty());
    }

    #[test]
    fn test_empty_file() {
        let session = BuildSession::new(Settings::default());
        let mut ctx = context("");
        let output = load(&session, &mut ctx, "").unwrap();
        let code = output.code();
        assert!(code.starts_with("var render, staticRenderFns\nvar script = {}\n"));
        assert!(!code.contains("hot reload"));
    }

    #[test]
    fn test_server_target() {
        let session = BuildSession::new(Settings::default());
        let mut ctx = context("");
        ctx.target = Target::Node;
        let output = load(&session, &mut ctx, APP).unwrap();
        let code = output.code();
        assert!(code.contains("function injectStyles (context) {"));
        assert!(code.contains(&format!("  injectStyles,\n  \"{}\",\n  {}\n)", hash_sum("src/App.vue"), quote(&hash_sum(&ctx.request)))));
        assert!(!code.contains("hot reload"));
    }

    #[test]
    fn test_production_filename() {
        let settings = Settings {
            production_mode: true,
            ..Settings::default()
        };
        let session = BuildSession::new(settings);
        let output = load(&session, &mut context(""), APP).unwrap();
        assert!(!output.code().contains("__file"));

        let settings = Settings {
            production_mode: true,
            expose_filename: true,
            ..Settings::default()
        };
        let session = BuildSession::new(settings);
        let output = load(&session, &mut context(""), APP).unwrap();
        assert!(output.code().contains("component.options.__file = \"App.vue\""));
    }

    #[test]
    fn test_block_request_is_extracted() {
        let session = BuildSession::new(Settings::default());
        let mut ctx = context("?vue&type=style&index=0");
        let output = load(&session, &mut ctx, APP).unwrap();
        assert_eq!(output.code(), ".app { color: red }");
    }

    #[test]
    fn test_marker_without_type_gets_component_module() {
        let session = BuildSession::new(Settings::default());
        let mut ctx = context("?vue");
        let output = load(&session, &mut ctx, "<template><p/></template>").unwrap();
        let LoadOutput::Module(code) = output else {
            panic!("expected a component module");
        };
        assert!(code.contains("import { render, staticRenderFns } from \"./App.vue?vue&type=template&id="));
        assert!(code.ends_with("\nexport default component.exports"));

        let mut ctx = context("?vue&type=");
        let output = load(&session, &mut ctx, "<template><p/></template>").unwrap();
        assert!(matches!(output, LoadOutput::Module(_)));
    }

    #[test]
    fn test_external_without_type_is_not_a_block() {
        let session = BuildSession::new(Settings::default());
        let mut ctx = context("?vue&external");
        let output = load(&session, &mut ctx, "<script>export default {}</script>").unwrap();
        assert!(output.code().contains("import script from"));
    }

    #[test]
    fn test_external_block_is_passed_through() {
        let session = BuildSession::new(Settings::default());
        let mut ctx = LoaderContext::new("/app/src/theme.css", "?vue&type=style&index=0&external");
        let output = load(&session, &mut ctx, "body { margin: 0 }").unwrap();
        assert_eq!(output.code(), "body { margin: 0 }");
    }

    #[test]
    fn test_duplicate_css_module_names() {
        let session = BuildSession::new(Settings::default());
        let mut ctx = context("");
        let source = "<style module>a {}</style><style module>b {}</style>";
        load(&session, &mut ctx, source).unwrap();
        assert_eq!(ctx.diagnostics()[0].message, "CSS module name $style is not unique!");
    }

    #[test]
    fn test_inline_match_resource() {
        let settings = Settings {
            experimental_inline_match_resource: true,
            ..Settings::default()
        };
        let session = BuildSession::new(settings);
        let mut ctx = context("");
        ctx.host.inline_match_resource = true;
        ctx.processors = vec![
            Processor::new("/app/node_modules/other-loader/index.js"),
            Processor::new(&session.runtime().loader),
        ];
        let output = load(&session, &mut ctx, "<script lang=\"ts\">export default {}</script>").unwrap();
        assert!(output.code().contains(
            "import script from \"./App.vue.ts?vue&type=script&lang=ts!=!vue-loader/lib/index.js!./App.vue?vue&type=script&lang=ts\""
        ));
    }
}
