//! Template stage: compiles an extracted template into render functions.

use serde_json::Value;
use sfcl_request::SubRequest;
use sfcl_source::code_frame;

use crate::compiler::TemplateCompileError;
use crate::compiler::TemplateCompileOptions;
use crate::context::LoaderContext;
use crate::error::LoaderError;
use crate::session::BuildSession;

/// Compile `source`, the template block addressed by the context's request.
///
/// Compiler tips become warnings and compiler errors one batched error on
/// `ctx`; the generated code is returned either way.
pub fn compile_template(
    session: &BuildSession,
    ctx: &mut LoaderContext,
    source: &str,
) -> Result<String, LoaderError> {
    let settings = session.settings();
    let request = SubRequest::from_parts(&ctx.resource_path, &ctx.query())?;
    let id = request.scope_id.clone().unwrap_or_default();

    let mut compiler_options = serde_json::Map::new();
    compiler_options.insert("outputSourceRange".to_string(), Value::Bool(true));
    compiler_options.extend(settings.compiler_options.clone());
    compiler_options.insert(
        "scopeId".to_string(),
        if request.scoped {
            Value::String(format!("data-v-{id}"))
        } else {
            Value::Null
        },
    );
    if let Some(comments) = request.query.get("comments") {
        compiler_options.insert("comments".to_string(), Value::String(comments.to_string()));
    }
    let source_ranges = compiler_options
        .get("outputSourceRange")
        .is_some_and(|value| value.as_bool().unwrap_or(false));

    let (is_ts, bindings) = if request.external {
        (settings.enable_ts_in_template && request.ts, None)
    } else {
        let descriptor = session.descriptor(&ctx.resource_path)?;
        let lang_is_ts = [&descriptor.script, &descriptor.script_setup]
            .into_iter()
            .flatten()
            .any(|block| block.lang() == Some("ts"));
        let bindings = session
            .script_resolver()
            .resolve(&descriptor, &id)
            .and_then(|script| script.bindings);
        (settings.enable_ts_in_template && lang_is_ts, bindings)
    };

    let filename = ctx.resource_path.to_string();
    let compiled = session.template_compiler()?.compile(TemplateCompileOptions {
        source,
        filename: &filename,
        compiler_options,
        is_production: ctx.is_production(settings),
        is_functional: request.query.contains("functional"),
        is_ts,
        optimize_ssr: ctx.is_server() && settings.optimize_ssr != Some(false),
        prettify: settings.prettify.unwrap_or(false),
        bindings: bindings.as_ref(),
    });

    for tip in compiled.tips {
        ctx.emit_warning(tip);
    }

    let errors: Vec<&TemplateCompileError> = compiled
        .errors
        .iter()
        .filter(|error| !(is_ts && is_ts_false_positive(&error.message)))
        .collect();
    if !errors.is_empty() {
        let message = if source_ranges {
            framed_errors(source, &filename, &errors)
        } else {
            listed_errors(source, &errors)
        };
        ctx.emit_error(message);
    }

    Ok(format!("{}\nexport {{ render, staticRenderFns }}", compiled.code))
}

/// Expression errors the template compiler reports for TypeScript syntax it
/// cannot parse.
fn is_ts_false_positive(message: &str) -> bool {
    message.strip_prefix("invalid ").is_some_and(|rest| {
        rest.starts_with("expression:")
            || rest.starts_with("function parameter expression:")
            || rest.starts_with("v-")
    })
}

fn framed_errors(source: &str, filename: &str, errors: &[&TemplateCompileError]) -> String {
    let body = errors
        .iter()
        .map(|error| match error.span {
            Some(span) => {
                let frame = code_frame(source, filename, &error.message, span);
                format!("  {}\n\n{}", error.message, pad(&frame))
            }
            None => format!("  {}", error.message),
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("\n\n  Errors compiling template:\n\n{body}\n")
}

fn listed_errors(source: &str, errors: &[&TemplateCompileError]) -> String {
    let list = errors
        .iter()
        .map(|error| format!("  - {}", error.message))
        .collect::<Vec<_>>()
        .join("\n");
    format!("\n  Error compiling template:\n{}\n{list}\n", pad(source))
}

fn pad(text: &str) -> String {
    text.lines()
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ts_false_positives() {
        assert!(is_ts_false_positive("invalid expression: Unexpected token ':'"));
        assert!(is_ts_false_positive("invalid function parameter expression: x: number"));
        assert!(is_ts_false_positive("invalid v-for alias \"(a: A)\""));
        assert!(!is_ts_false_positive("tag <div> has no matching end tag."));
        assert!(!is_ts_false_positive("an invalid expression: x"));
    }

    #[test]
    fn test_listed_errors() {
        let error = TemplateCompileError {
            message: "tag <div> has no matching end tag.".to_string(),
            span: None,
        };
        assert_eq!(
            listed_errors("<div>\n<p/>", &[&error]),
            "\n  Error compiling template:\n  <div>\n  <p/>\n  - tag <div> has no matching end tag.\n"
        );
    }

    #[test]
    fn test_pad() {
        assert_eq!(pad("a\r\nb"), "  a\n  b");
    }
}
