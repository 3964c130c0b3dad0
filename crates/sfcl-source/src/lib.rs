mod collections;
mod path;
mod position;
mod render;
mod system;

pub use collections::FxDashMap;
pub use path::relative_path;
pub use path::to_posix;
pub use position::LineCol;
pub use position::LineIndex;
pub use position::Span;
pub use render::code_frame;
pub use render::Severity;
pub use system::FileSystem;
pub use system::InMemoryFileSystem;
pub use system::OsFileSystem;
