use std::fmt;

use annotate_snippets::AnnotationKind;
use annotate_snippets::Level;
use annotate_snippets::Renderer;
use annotate_snippets::Snippet;

use crate::Span;

/// How seriously the host should take a reported problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fails the module.
    Error,
    /// Reported, the build carries on.
    Warning,
}

impl Severity {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Render `message` with the offending region of `source` underlined.
///
/// Frames are always plain text: they end up in the host's error channel,
/// which does its own coloring. The span is clamped to the source, so a
/// compiler reporting an offset past the end still gets a frame.
#[must_use]
pub fn code_frame(source: &str, path: &str, message: &str, span: Span) -> String {
    let span = span.clamp_to(source.len());
    let snippet = Snippet::source(source)
        .path(path)
        .line_start(1)
        .annotation(AnnotationKind::Primary.span(span.start_usize()..span.end_usize()));

    let report = &[Level::ERROR.primary_title(message).element(snippet)];
    Renderer::plain().render(report).clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_points_at_expression() {
        let source = "<h2 class=\"red\">{{ msg. }}</h2>\n";
        let frame = code_frame(
            source,
            "src/App.vue",
            "invalid expression: Unexpected token '}'",
            Span::new(16, 10),
        );

        assert!(frame.starts_with("error: invalid expression"));
        assert!(frame.contains("src/App.vue:1:17"));
        assert!(frame.contains("{{ msg. }}"));
        assert!(frame.contains("^^^^^^^^^^"));
    }

    #[test]
    fn frame_on_later_line() {
        let source = "<template>\n  <div>\n</template>\n";
        let frame = code_frame(source, "Broken.vue", "Element is missing end tag.", Span::new(13, 5));
        assert!(frame.contains("Broken.vue:2:3"));
        assert!(frame.contains("<div>"));
    }

    #[test]
    fn span_past_end_is_clamped() {
        let frame = code_frame("<div>", "a.vue", "unexpected end of file", Span::new(0, 400));
        assert!(frame.contains("<div>"));
    }

    #[test]
    fn frames_have_no_ansi() {
        let frame = code_frame("<div></div>\n", "x.vue", "oops", Span::new(0, 5));
        assert!(!frame.contains("\x1b["));
    }

    #[test]
    fn severity_labels() {
        assert_eq!(Severity::Error.to_string(), "error");
        assert_eq!(Severity::Warning.to_string(), "warning");
    }
}
