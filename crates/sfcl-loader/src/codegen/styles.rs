use camino::Utf8Path;
use rustc_hash::FxHashSet;
use sfcl_descriptor::Block;
use sfcl_request::quote;
use sfcl_request::BlockKind;
use sfcl_request::Query;
use sfcl_request::SubRequest;

use super::RequestWriter;

pub(crate) struct StyleOptions<'a> {
    pub(crate) id: &'a str,
    pub(crate) resource_path: &'a Utf8Path,
    pub(crate) resource_query: &'a Query,
    pub(crate) needs_hot_reload: bool,
    /// Server and shadow targets inject styles through `injectStyles`.
    pub(crate) needs_explicit_injection: bool,
    pub(crate) hot_reload_api: &'a str,
}

#[derive(Debug, Default)]
pub(crate) struct StylesCode {
    pub(crate) code: String,
    /// An `injectStyles` function was emitted.
    pub(crate) has_injector: bool,
    /// CSS module names bound more than once.
    pub(crate) duplicate_modules: Vec<String>,
}

fn style_request(style: &Block, index: usize, options: &StyleOptions<'_>) -> SubRequest {
    let path = style
        .src()
        .map_or_else(|| options.resource_path.to_owned(), Into::into);
    let mut request = SubRequest::new(path, BlockKind::Style)
        .with_index(index)
        .with_attrs(&style.attrs, Some("css"))
        .with_resource_query(options.resource_query)
        .with_external(style.src().is_some());
    // External styles are only scoped when asked to be.
    if style.src().is_none() || style.scoped() {
        request = request.with_scope_id(options.id);
    }
    request
}

pub(crate) fn gen_styles(
    styles: &[Block],
    writer: &RequestWriter,
    options: &StyleOptions<'_>,
) -> StylesCode {
    let mut imports = String::new();
    let mut injection = String::new();
    let mut modules_hot = String::new();
    let mut module_names = FxHashSet::default();
    let mut duplicate_modules = Vec::new();
    let mut has_modules = false;

    for (i, style) in styles.iter().enumerate() {
        if style.is_empty() {
            continue;
        }
        let lang = style.lang().unwrap_or("css");
        let request = writer.write(&style_request(style, i, options), Some(lang));

        if options.needs_explicit_injection {
            injection.push_str(&format!(
                "var style{i} = require({request})\n\
                 if (style{i}.__inject__) style{i}.__inject__(context)\n"
            ));
        } else {
            imports.push_str(&format!("import style{i} from {request}\n"));
        }

        let Some(name) = style.css_module() else {
            continue;
        };
        has_modules = true;
        if !module_names.insert(name.to_string()) {
            duplicate_modules.push(name.to_string());
        }
        let locals = format!("(style{i}.locals || style{i})");
        let name = quote(name);
        if options.needs_hot_reload {
            injection.push_str(&format!(
                "cssModules[{name}] = {locals}\n\
                 Object.defineProperty(this, {name}, {{\n\
                 \x20 configurable: true,\n\
                 \x20 get: function () {{\n\
                 \x20   return cssModules[{name}]\n\
                 \x20 }}\n\
                 }})\n"
            ));
            modules_hot.push_str(&format!(
                "module.hot && module.hot.accept([{request}], function () {{\n\
                 \x20 var oldLocals = cssModules[{name}]\n\
                 \x20 if (oldLocals) {{\n\
                 \x20   var newLocals = require({request})\n\
                 \x20   if (JSON.stringify(newLocals) !== JSON.stringify(oldLocals)) {{\n\
                 \x20     cssModules[{name}] = newLocals\n\
                 \x20     require({api}).rerender({id})\n\
                 \x20   }}\n\
                 \x20 }}\n\
                 }})\n",
                api = quote(options.hot_reload_api),
                id = quote(options.id),
            ));
        } else {
            injection.push_str(&format!("this[{name}] = {locals}\n"));
        }
    }

    if !options.needs_explicit_injection && !has_modules {
        return StylesCode {
            code: imports,
            has_injector: false,
            duplicate_modules,
        };
    }

    let mut sections = vec![imports.trim_end().to_string()];
    if has_modules && options.needs_hot_reload {
        sections.push("var cssModules = {}".to_string());
    }
    if options.needs_hot_reload {
        sections.push("var disposed = false".to_string());
    }

    let mut injector = String::from("function injectStyles (context) {\n");
    if options.needs_hot_reload {
        injector.push_str("  if (disposed) return\n");
    }
    for line in injection.lines() {
        injector.push_str("  ");
        injector.push_str(line);
        injector.push('\n');
    }
    injector.push('}');
    sections.push(injector);

    if options.needs_hot_reload {
        sections.push(
            "module.hot && module.hot.dispose(function (data) {\n  disposed = true\n})".to_string(),
        );
    }
    sections.push(modules_hot.trim_end().to_string());

    let code = sections
        .into_iter()
        .filter(|section| !section.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    StylesCode {
        code,
        has_injector: true,
        duplicate_modules,
    }
}

#[cfg(test)]
mod tests {
    use sfcl_descriptor::Attr;
    use sfcl_descriptor::Attrs;
    use sfcl_source::Span;

    use super::*;

    fn style(content: &str, attrs: &[(&str, Option<&str>)]) -> Block {
        let attrs: Attrs = attrs
            .iter()
            .map(|(name, value)| Attr {
                name: (*name).to_string(),
                value: value.map(str::to_string),
            })
            .collect();
        Block::new(content, attrs, Span::new(0, 0))
    }

    fn options(query: &Query) -> StyleOptions<'_> {
        StyleOptions {
            id: "1a2b3c4d",
            resource_path: Utf8Path::new("/app/src/App.vue"),
            resource_query: query,
            needs_hot_reload: false,
            needs_explicit_injection: false,
            hot_reload_api: "vue-hot-reload-api",
        }
    }

    fn writer() -> RequestWriter {
        RequestWriter::new("/app".into(), None)
    }

    #[test]
    fn test_import_mode() {
        let query = Query::new();
        let styles = [style("h1 {}", &[]), style("  \n", &[]), style("h2 {}", &[("scoped", None)])];
        let out = gen_styles(&styles, &writer(), &options(&query));
        assert_eq!(
            out.code,
            "import style0 from \"./src/App.vue?vue&type=style&index=0&id=1a2b3c4d&lang=css\"\n\
             import style2 from \"./src/App.vue?vue&type=style&index=2&id=1a2b3c4d&scoped=true&lang=css\"\n"
        );
        assert!(!out.has_injector);
    }

    #[test]
    fn test_external_style_id_only_when_scoped() {
        let query = Query::new();
        let styles = [
            style("", &[("src", Some("./a.css"))]),
            style("", &[("src", Some("./b.css")), ("scoped", None)]),
        ];
        let out = gen_styles(&styles, &writer(), &options(&query));
        assert!(out.code.contains("\"./a.css?vue&type=style&index=0&lang=css&external\""));
        assert!(out
            .code
            .contains("\"./b.css?vue&type=style&index=1&id=1a2b3c4d&scoped=true&lang=css&external\""));
    }

    #[test]
    fn test_explicit_injection() {
        let query = Query::new();
        let opts = StyleOptions {
            needs_explicit_injection: true,
            ..options(&query)
        };
        let out = gen_styles(&[style("h1 {}", &[])], &writer(), &opts);
        assert!(out.has_injector);
        assert!(out.code.starts_with("function injectStyles (context) {\n  var style0 = require("));
        assert!(out
            .code
            .contains("  if (style0.__inject__) style0.__inject__(context)\n}"));
    }

    #[test]
    fn test_css_modules() {
        let query = Query::new();
        let styles = [
            style("a {}", &[("module", None)]),
            style("b {}", &[("module", Some("classes"))]),
        ];
        let out = gen_styles(&styles, &writer(), &options(&query));
        assert!(out.has_injector);
        assert!(out.code.contains("this[\"$style\"] = (style0.locals || style0)"));
        assert!(out.code.contains("this[\"classes\"] = (style1.locals || style1)"));
        assert!(out.duplicate_modules.is_empty());
    }

    #[test]
    fn test_duplicate_module_names() {
        let query = Query::new();
        let styles = [style("a {}", &[("module", None)]), style("b {}", &[("module", None)])];
        let out = gen_styles(&styles, &writer(), &options(&query));
        assert_eq!(out.duplicate_modules, vec!["$style".to_string()]);
    }

    #[test]
    fn test_css_modules_hot_reload() {
        let query = Query::new();
        let opts = StyleOptions {
            needs_hot_reload: true,
            ..options(&query)
        };
        let out = gen_styles(&[style("a {}", &[("module", None)])], &writer(), &opts);
        assert!(out.code.contains("var cssModules = {}\n\nvar disposed = false"));
        assert!(out.code.contains("  if (disposed) return\n"));
        assert!(out.code.contains("module.hot && module.hot.dispose(function (data) {"));
        assert!(out.code.contains("require(\"vue-hot-reload-api\").rerender(\"1a2b3c4d\")"));
    }

    #[test]
    fn test_inherits_resource_query() {
        let query = Query::parse("?shadow");
        let out = gen_styles(&[style("h1 {}", &[])], &writer(), &options(&query));
        assert!(out.code.contains("&lang=css&shadow\""));
    }
}
