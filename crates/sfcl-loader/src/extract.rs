use camino::Utf8Path;
use camino::Utf8PathBuf;
use sfcl_descriptor::Block;
use sfcl_descriptor::Descriptor;
use sfcl_descriptor::SourceMap;
use sfcl_request::BlockKind;
use sfcl_request::SubRequest;

use crate::error::LoaderError;
use crate::session::BuildSession;

/// The raw text of one block, ready for the next processor.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub content: String,
    pub map: Option<SourceMap>,
    /// Resource path reported to the host; carries the block language as an
    /// extra extension when `append_extension` is set.
    pub resource_path: Utf8PathBuf,
}

/// Select the block `request` addresses.
///
/// Scripts go through the session's script resolver. Style and custom
/// requests must name an existing index.
pub fn extract(
    session: &BuildSession,
    descriptor: &Descriptor,
    request: &SubRequest,
    scope_id: &str,
) -> Result<Extracted, LoaderError> {
    let append = session.settings().append_extension;
    let path = request.path.as_path();

    match request.kind {
        BlockKind::Template => {
            let template = descriptor
                .template
                .as_ref()
                .ok_or_else(|| missing(path, BlockKind::Template))?;
            Ok(from_block(template, path, append.then(|| template.lang().unwrap_or("html"))))
        }
        BlockKind::Script => {
            let script = session
                .script_resolver()
                .resolve(descriptor, scope_id)
                .ok_or_else(|| missing(path, BlockKind::Script))?;
            let resource_path = if append {
                with_extension(path, script.lang.as_deref().unwrap_or("js"))
            } else {
                path.to_owned()
            };
            Ok(Extracted {
                content: script.content,
                map: script.map,
                resource_path,
            })
        }
        BlockKind::Style => {
            let style = indexed(&descriptor.styles, request)?;
            Ok(from_block(style, path, append.then(|| style.lang().unwrap_or("css"))))
        }
        BlockKind::Custom => {
            let blocks: Vec<&Block> = descriptor.custom_blocks.iter().map(|c| &c.block).collect();
            let block = indexed(&blocks, request)?;
            Ok(from_block(block, path, None))
        }
    }
}

fn indexed<'a, T>(blocks: &'a [T], request: &SubRequest) -> Result<&'a T, LoaderError> {
    let index = request.index.ok_or(sfcl_request::RequestError::MissingIndex(request.kind))?;
    blocks.get(index).ok_or(LoaderError::BlockIndexOutOfRange {
        kind: request.kind,
        index,
        len: blocks.len(),
    })
}

fn from_block(block: &Block, path: &Utf8Path, ext: Option<&str>) -> Extracted {
    Extracted {
        content: block.content.clone(),
        map: block.map.clone(),
        resource_path: ext.map_or_else(|| path.to_owned(), |ext| with_extension(path, ext)),
    }
}

fn with_extension(path: &Utf8Path, ext: &str) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{path}.{ext}"))
}

fn missing(path: &Utf8Path, kind: BlockKind) -> LoaderError {
    LoaderError::MissingBlock {
        path: path.to_owned(),
        kind,
    }
}
