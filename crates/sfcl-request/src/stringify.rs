use camino::Utf8Path;
use sfcl_source::relative_path;

/// Turn a `!`-separated request into a JSON string literal for generated code.
///
/// Absolute paths in each segment are made relative to `context` (prefixed
/// with `./` when they do not already climb out of it) so emitted modules
/// do not embed machine-specific paths. Queries are left untouched.
#[must_use]
pub fn stringify_request(context: &Utf8Path, request: &str) -> String {
    let rewritten = request
        .split('!')
        .map(|segment| relativize(context, segment))
        .collect::<Vec<_>>()
        .join("!");
    quote(&rewritten)
}

fn relativize(context: &Utf8Path, segment: &str) -> String {
    let (path, query) = match segment.find('?') {
        Some(at) => segment.split_at(at),
        None => (segment, ""),
    };

    let path = if Utf8Path::new(path).is_absolute() {
        let relative = relative_path(context, Utf8Path::new(path))
            .as_str()
            .replace('\\', "/");
        if relative.starts_with("../") || relative.starts_with("./") {
            relative
        } else {
            format!("./{relative}")
        }
    } else {
        path.replace('\\', "/")
    };

    format!("{path}{query}")
}

/// JSON-quote a string for embedding in generated JavaScript.
#[must_use]
pub fn quote(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// `-!a!b!resource`: run exactly the given processors, skipping the
/// host's configured pre and normal processors.
#[must_use]
pub fn chain_request<S: AsRef<str>>(processors: &[S], resource: &str) -> String {
    let mut out = String::from("-!");
    for processor in processors {
        out.push_str(processor.as_ref());
        out.push('!');
    }
    out.push_str(resource);
    out
}

/// Inline match-resource request.
///
/// `<path>.<lang><query>!=!<request>`: the virtual name makes the host pick
/// rules for `lang` while `request` still reads the real resource.
#[must_use]
pub fn match_resource(path: &Utf8Path, query: &str, lang: Option<&str>, request: &str) -> String {
    let ext = lang.map(|lang| format!(".{lang}")).unwrap_or_default();
    format!("{path}{ext}{query}!=!{request}")
}
