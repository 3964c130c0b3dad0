use std::io;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use rustc_hash::FxHashMap;

/// Where descriptors are loaded from when a block request arrives before the
/// composite file itself has been parsed in this process.
pub trait FileSystem: Send + Sync {
    fn read_to_string(&self, path: &Utf8Path) -> io::Result<String>;
}

/// Reads from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn read_to_string(&self, path: &Utf8Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Fixed set of files, for hosts that keep sources in memory and for tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryFileSystem {
    files: FxHashMap<Utf8PathBuf, String>,
}

impl InMemoryFileSystem {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_file(mut self, path: impl Into<Utf8PathBuf>, content: impl Into<String>) -> Self {
        self.add_file(path, content);
        self
    }

    pub fn add_file(&mut self, path: impl Into<Utf8PathBuf>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }
}

impl<P, C> FromIterator<(P, C)> for InMemoryFileSystem
where
    P: Into<Utf8PathBuf>,
    C: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (P, C)>>(iter: I) -> Self {
        let mut fs = Self::new();
        for (path, content) in iter {
            fs.add_file(path, content);
        }
        fs
    }
}

impl FileSystem for InMemoryFileSystem {
    fn read_to_string(&self, path: &Utf8Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no such file: {path}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_added_files() {
        let fs = InMemoryFileSystem::new()
            .with_file("/src/App.vue", "<template></template>")
            .with_file("/src/logic.js", "export default {}");

        assert_eq!(
            fs.read_to_string(Utf8Path::new("/src/App.vue")).unwrap(),
            "<template></template>"
        );
        assert_eq!(
            fs.read_to_string(Utf8Path::new("/src/logic.js")).unwrap(),
            "export default {}"
        );
    }

    #[test]
    fn missing_file_is_not_found() {
        let fs: InMemoryFileSystem = [("/src/App.vue", "")].into_iter().collect();

        let err = fs.read_to_string(Utf8Path::new("/src/Missing.vue")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert_eq!(err.to_string(), "no such file: /src/Missing.vue");
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("App.vue")).unwrap();
        std::fs::write(&path, "<style>a {}</style>").unwrap();

        assert_eq!(OsFileSystem.read_to_string(&path).unwrap(), "<style>a {}</style>");
    }
}
