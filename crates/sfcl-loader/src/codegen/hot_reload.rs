use sfcl_request::quote;

/// Registers the component with the hot-reload runtime.
///
/// Functional components can only be re-rendered; others are reloaded.
/// With a template request the render functions are swapped in place when
/// only the template changes.
pub(crate) fn gen_hot_reload(
    id: &str,
    functional: bool,
    template_request: Option<&str>,
    api_path: &str,
) -> String {
    let update = if functional { "rerender" } else { "reload" };
    let id = quote(id);
    let mut code = format!(
        "/* hot reload */\n\
         if (module.hot) {{\n\
         \x20 var api = require({api})\n\
         \x20 api.install(require('vue'))\n\
         \x20 if (api.compatible) {{\n\
         \x20   module.hot.accept()\n\
         \x20   if (!api.isRecorded({id})) {{\n\
         \x20     api.createRecord({id}, component.options)\n\
         \x20   }} else {{\n\
         \x20     api.{update}({id}, component.options)\n\
         \x20   }}\n",
        api = quote(api_path),
    );
    if let Some(request) = template_request {
        code.push_str(&format!(
            "    module.hot.accept({request}, function () {{\n\
             \x20     api.rerender({id}, {{\n\
             \x20       render: render,\n\
             \x20       staticRenderFns: staticRenderFns\n\
             \x20     }})\n\
             \x20   }})\n"
        ));
    }
    code.push_str("  }\n}");
    code
}
