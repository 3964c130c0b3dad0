//! Composite-file descriptors.
//!
//! A composite file is split by a [`BlockParser`] into a [`Descriptor`] of
//! blocks; the [`DescriptorCache`] keeps the latest descriptor per file so
//! block requests can be answered without reparsing.

mod cache;
mod descriptor;
mod parser;
mod sourcemap;

pub use crate::cache::ContentVersion;
pub use crate::cache::DescriptorCache;
pub use crate::cache::LoadError;
pub use crate::descriptor::Attr;
pub use crate::descriptor::Attrs;
pub use crate::descriptor::Block;
pub use crate::descriptor::CustomBlock;
pub use crate::descriptor::Descriptor;
pub use crate::descriptor::SourceMap;
pub use crate::parser::BlockParser;
pub use crate::parser::ParseError;
pub use crate::parser::ParseRequest;
pub use crate::parser::SplitParser;
