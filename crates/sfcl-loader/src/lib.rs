//! Build-time processing of composite component files.
//!
//! A host build tool drives four stages, all sharing one [`BuildSession`]:
//!
//! - [`load`] turns a composite file into a component module that imports
//!   each block through its own sub-request, and serves those sub-requests
//!   by extracting the addressed block.
//! - [`intercept`] runs ahead of every block request and rewrites its
//!   processor chain to fit the block type.
//! - [`compile_template`] and [`post_process_style`] are the stages the
//!   rewritten chains insert for templates and styles.

mod chain;
mod codegen;
mod compiler;
mod context;
mod entry;
mod error;
mod extract;
mod interceptor;
mod scope;
mod session;
mod style_post;
mod template;

pub use crate::chain::dedupe;
pub use crate::chain::Processor;
pub use crate::compiler::CompiledStyle;
pub use crate::compiler::CompiledTemplate;
pub use crate::compiler::CompilerCapabilities;
pub use crate::compiler::PlainScriptResolver;
pub use crate::compiler::ResolvedScript;
pub use crate::compiler::ScriptResolver;
pub use crate::compiler::StyleCompileOptions;
pub use crate::compiler::StyleCompiler;
pub use crate::compiler::TemplateCompileError;
pub use crate::compiler::TemplateCompileOptions;
pub use crate::compiler::TemplateCompiler;
pub use crate::context::BuildDiagnostic;
pub use crate::context::HostFeatures;
pub use crate::context::LoaderContext;
pub use crate::context::Mode;
pub use crate::context::Target;
pub use crate::entry::load;
pub use crate::entry::LoadOutput;
pub use crate::error::LoaderError;
pub use crate::extract::extract;
pub use crate::extract::Extracted;
pub use crate::interceptor::intercept;
pub use crate::interceptor::is_composite;
pub use crate::interceptor::Interception;
pub use crate::scope::hash_sum;
pub use crate::scope::scope_id;
pub use crate::scope::short_file_path;
pub use crate::session::BuildSession;
pub use crate::session::RuntimePaths;
pub use crate::style_post::post_process_style;
pub use crate::style_post::ProcessedStyle;
pub use crate::template::compile_template;
