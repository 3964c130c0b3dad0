//! JavaScript emitted for the root module of a composite file.

pub(crate) mod custom_blocks;
pub(crate) mod hot_reload;
pub(crate) mod styles;

use camino::Utf8PathBuf;
use sfcl_request::match_resource;
use sfcl_request::stringify_request;
use sfcl_request::SubRequest;

/// Writes sub-requests as import specifiers.
///
/// In inline mode every request is a match resource whose virtual name
/// carries the block language; blocks of the composite file itself are
/// routed back through the current chain, external sources are not.
pub(crate) struct RequestWriter {
    context: Utf8PathBuf,
    inline_chain: Option<Vec<String>>,
}

impl RequestWriter {
    pub(crate) fn new(context: Utf8PathBuf, inline_chain: Option<Vec<String>>) -> Self {
        Self {
            context,
            inline_chain,
        }
    }

    pub(crate) fn write(&self, request: &SubRequest, lang: Option<&str>) -> String {
        let raw = match &self.inline_chain {
            Some(chain) => {
                let query = request.query_string();
                let resource = request.encode();
                let routed = if request.external || chain.is_empty() {
                    resource
                } else {
                    format!("{}!{resource}", chain.join("!"))
                };
                match_resource(&request.path, &query, lang, &routed)
            }
            None => request.encode(),
        };
        stringify_request(&self.context, &raw)
    }

    /// A specifier that bypasses every configured processor.
    pub(crate) fn write_raw(&self, module: &str) -> String {
        stringify_request(&self.context, &format!("!{module}"))
    }
}

#[cfg(test)]
mod tests {
    use sfcl_request::BlockKind;

    use super::*;

    #[test]
    fn test_plain_requests() {
        let writer = RequestWriter::new("/app".into(), None);
        let request = SubRequest::new("/app/src/App.vue", BlockKind::Script).with_lang("js");
        insta::assert_snapshot!(
            writer.write(&request, Some("js")),
            @r#""./src/App.vue?vue&type=script&lang=js""#
        );
    }

    #[test]
    fn test_inline_requests_route_through_chain() {
        let writer = RequestWriter::new(
            "/app".into(),
            Some(vec!["/app/node_modules/vue-loader/lib/index.js".to_string()]),
        );
        let request = SubRequest::new("/app/src/App.vue", BlockKind::Script).with_lang("ts");
        assert_eq!(
            writer.write(&request, Some("ts")),
            r#""./src/App.vue.ts?vue&type=script&lang=ts!=!./node_modules/vue-loader/lib/index.js!./src/App.vue?vue&type=script&lang=ts""#
        );
    }

    #[test]
    fn test_inline_external_skips_chain() {
        let writer = RequestWriter::new("/app".into(), Some(vec!["/loader.js".to_string()]));
        let request = SubRequest::new("/app/src/logic.js", BlockKind::Script).with_external(true);
        assert_eq!(
            writer.write(&request, Some("js")),
            r#""./src/logic.js.js?vue&type=script&external!=!./src/logic.js?vue&type=script&external""#
        );
    }

    #[test]
    fn test_raw_module() {
        let writer = RequestWriter::new("/app".into(), None);
        assert_eq!(
            writer.write_raw("/app/node_modules/vue-loader/lib/runtime/componentNormalizer.js"),
            r#""!./node_modules/vue-loader/lib/runtime/componentNormalizer.js""#
        );
    }
}
