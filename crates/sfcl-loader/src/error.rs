use camino::Utf8PathBuf;
use sfcl_descriptor::LoadError;
use sfcl_descriptor::ParseError;
use sfcl_request::BlockKind;
use sfcl_request::RequestError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: ParseError,
    },

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("{path} has no {kind} block")]
    MissingBlock { path: Utf8PathBuf, kind: BlockKind },

    /// A request addressed a block that does not exist. Requests are built
    /// from the same descriptor, so this is a bug in whoever built it.
    #[error("{kind} block index {index} is out of range ({len} blocks)")]
    BlockIndexOutOfRange {
        kind: BlockKind,
        index: usize,
        len: usize,
    },

    #[error("no {0} compiler is configured")]
    MissingCompiler(&'static str),

    #[error("{0}")]
    StyleCompile(String),
}
