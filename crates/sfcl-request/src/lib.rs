//! Sub-request protocol.
//!
//! Every block of a composite file is imported through a request string of
//! its own. [`SubRequest`] is the typed form of such a request; the helpers
//! in this crate turn requests and processor chains into specifiers the
//! host can resolve.

mod query;
mod request;
mod stringify;

use thiserror::Error;

pub use crate::query::escape;
pub use crate::query::unescape;
pub use crate::query::Param;
pub use crate::query::Query;
pub use crate::request::BlockKind;
pub use crate::request::SubRequest;
pub use crate::request::MARKER;
pub use crate::stringify::chain_request;
pub use crate::stringify::match_resource;
pub use crate::stringify::quote;
pub use crate::stringify::stringify_request;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("`{0}` is not a block request")]
    NotABlockRequest(String),
    #[error("block request has no `type`")]
    MissingType,
    #[error("unknown block type `{0}`")]
    UnknownBlockType(String),
    #[error("`{0}` is not a valid block index")]
    InvalidIndex(String),
    #[error("{0} block request has no `index`")]
    MissingIndex(BlockKind),
}
