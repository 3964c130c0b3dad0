use camino::Utf8Path;
use sfcl_descriptor::CustomBlock;
use sfcl_request::BlockKind;
use sfcl_request::Query;
use sfcl_request::SubRequest;

use super::RequestWriter;

/// Imports every custom block and lets function exports decorate the
/// component.
pub(crate) fn gen_custom_blocks(
    blocks: &[CustomBlock],
    resource_path: &Utf8Path,
    resource_query: &Query,
    writer: &RequestWriter,
) -> String {
    let imports: Vec<String> = blocks
        .iter()
        .enumerate()
        .map(|(i, custom)| {
            let src = custom.block.src();
            let mut request = SubRequest::new(
                src.map_or_else(|| resource_path.to_owned(), Into::into),
                BlockKind::Custom,
            )
            .with_index(i)
            .with_block_type(&custom.block_type)
            .with_attrs(&custom.block.attrs, None)
            .with_resource_query(resource_query)
            .with_external(src.is_some());
            if src.is_some() {
                request = request.with_issuer_path(resource_path.as_str());
            }

            let request = writer.write(&request, custom.block.lang());
            format!(
                "import block{i} from {request}\n\
                 if (typeof block{i} === 'function') block{i}(component)"
            )
        })
        .collect();

    format!("\n/* custom blocks */\n{}\n", imports.join("\n"))
}
