use rustc_hash::FxHashSet;

/// One entry of a host processing chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processor {
    /// Resolved module path of the processor.
    pub path: String,
    /// Options query without the leading `?` (`{"a":1}`, `?ref--1`, ...).
    pub options: Option<String>,
    /// The processor's early pass already ran for this module.
    pub pitch_executed: bool,
}

impl Processor {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            options: None,
            pitch_executed: false,
        }
    }

    /// Split `path?options` into a processor.
    #[must_use]
    pub fn parse(request: &str) -> Self {
        match request.split_once('?') {
            Some((path, options)) => Self {
                path: path.to_string(),
                options: Some(options.to_string()),
                pitch_executed: false,
            },
            None => Self::new(request),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: impl Into<String>) -> Self {
        self.options = Some(options.into());
        self
    }

    #[must_use]
    pub fn executed(mut self) -> Self {
        self.pitch_executed = true;
        self
    }

    /// `path?options` as the host writes it in a request.
    #[must_use]
    pub fn request(&self) -> String {
        match &self.options {
            Some(options) => format!("{}?{options}", self.path),
            None => self.path.clone(),
        }
    }

    /// Whether the path names one of `packages`: the name must follow a
    /// `/`, `\` or `@`.
    #[must_use]
    pub fn is_any(&self, packages: &[String]) -> bool {
        packages.iter().any(|package| {
            self.path
                .match_indices(package.as_str())
                .any(|(start, _)| self.path[..start].ends_with(['/', '\\', '@']))
        })
    }
}

/// Drop repeated processors, comparing path and options.
///
/// The same processor with different options is kept once per option set.
#[must_use]
pub fn dedupe(processors: Vec<Processor>) -> Vec<Processor> {
    let mut seen = FxHashSet::default();
    processors
        .into_iter()
        .filter(|processor| seen.insert(processor.request()))
        .collect()
}

/// Keep only the first processor matching `packages`.
#[must_use]
pub fn keep_first_of(processors: Vec<Processor>, packages: &[String]) -> Vec<Processor> {
    let mut seen = false;
    processors
        .into_iter()
        .filter(|processor| {
            if !processor.is_any(packages) {
                return true;
            }
            !std::mem::replace(&mut seen, true)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    #[test]
    fn test_parse_and_request() {
        let processor = Processor::parse("/app/node_modules/css-loader/index.js??ref--1");
        assert_eq!(processor.path, "/app/node_modules/css-loader/index.js");
        assert_eq!(processor.options.as_deref(), Some("?ref--1"));
        assert_eq!(
            processor.request(),
            "/app/node_modules/css-loader/index.js??ref--1"
        );
    }

    #[test]
    fn test_is_any() {
        let linter = names(&["eslint-loader"]);
        assert!(Processor::new("/app/node_modules/eslint-loader/index.js").is_any(&linter));
        assert!(Processor::new("C:\\app\\node_modules\\eslint-loader\\index.js").is_any(&linter));
        assert!(Processor::new("@scope/eslint-loader").is_any(&linter));
        assert!(!Processor::new("eslint-loader").is_any(&linter));
        assert!(!Processor::new("/app/node_modules/my-eslint-loader/x.js").is_any(&linter));
    }

    #[test]
    fn test_is_any_checks_every_occurrence() {
        let linter = names(&["eslint-loader"]);
        let nested = "/app/node_modules/my-eslint-loader/node_modules/eslint-loader/index.js";
        assert!(Processor::new(nested).is_any(&linter));
        assert!(!Processor::new("/app/my-eslint-loader-eslint-loader.js").is_any(&linter));
    }

    #[test]
    fn test_dedupe_is_idempotent() {
        let chain = vec![
            Processor::new("/a").with_options("x=1"),
            Processor::new("/b"),
            Processor::new("/a").with_options("x=1"),
            Processor::new("/a").with_options("x=2"),
        ];
        let once = dedupe(chain);
        assert_eq!(
            once.iter().map(Processor::request).collect::<Vec<_>>(),
            vec!["/a?x=1", "/b", "/a?x=2"]
        );
        assert_eq!(dedupe(once.clone()), once);
    }

    #[test]
    fn test_keep_first_of() {
        let linter = names(&["eslint-loader"]);
        let chain = vec![
            Processor::new("/nm/eslint-loader/index.js").with_options("a"),
            Processor::new("/nm/babel-loader/index.js"),
            Processor::new("/nm/eslint-loader/index.js").with_options("b"),
        ];
        let kept = keep_first_of(chain, &linter);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].options.as_deref(), Some("a"));
    }
}
