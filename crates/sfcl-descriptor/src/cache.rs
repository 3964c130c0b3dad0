use std::sync::Arc;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use dashmap::mapref::entry::Entry;
use sfcl_source::FileSystem;
use sfcl_source::FxDashMap;
use sha2::Digest;
use sha2::Sha256;

use crate::descriptor::Descriptor;
use crate::parser::ParseError;

/// Identifies one revision of a composite file's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentVersion(u64);

impl ContentVersion {
    #[must_use]
    pub fn of(source: &str) -> Self {
        let digest = Sha256::digest(source.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        Self(u64::from_be_bytes(bytes))
    }
}

#[derive(Debug, Clone)]
struct CachedDescriptor {
    version: ContentVersion,
    descriptor: Arc<Descriptor>,
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Shared map from composite file path to its most recent descriptor.
///
/// Entries remember the version of the text they were parsed from, so a
/// lookup with different text never returns a stale descriptor. Every
/// sub-request of a file reuses the entry its entry request stored.
#[derive(Debug, Default)]
pub struct DescriptorCache {
    entries: FxDashMap<Utf8PathBuf, CachedDescriptor>,
}

impl DescriptorCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached descriptor for `path`, whatever text it came from.
    #[must_use]
    pub fn get(&self, path: &Utf8Path) -> Option<Arc<Descriptor>> {
        self.entries
            .get(path)
            .map(|entry| Arc::clone(&entry.descriptor))
    }

    /// The cached descriptor for `path` only if it was parsed from `source`.
    #[must_use]
    pub fn get_current(&self, path: &Utf8Path, source: &str) -> Option<Arc<Descriptor>> {
        let version = ContentVersion::of(source);
        self.entries
            .get(path)
            .filter(|entry| entry.version == version)
            .map(|entry| Arc::clone(&entry.descriptor))
    }

    /// Store a descriptor, replacing any previous entry for `path`.
    pub fn set(&self, path: &Utf8Path, source: &str, descriptor: Descriptor) -> Arc<Descriptor> {
        let descriptor = Arc::new(descriptor);
        self.entries.insert(
            path.to_owned(),
            CachedDescriptor {
                version: ContentVersion::of(source),
                descriptor: Arc::clone(&descriptor),
            },
        );
        descriptor
    }

    /// Return the descriptor for this exact text, parsing at most once.
    ///
    /// The parse runs while the entry's shard is locked, so concurrent
    /// callers for the same file and text share one parse. A failed parse
    /// evicts whatever stale entry the path had.
    pub fn get_or_parse<F>(
        &self,
        path: &Utf8Path,
        source: &str,
        parse: F,
    ) -> Result<Arc<Descriptor>, ParseError>
    where
        F: FnOnce(&str) -> Result<Descriptor, ParseError>,
    {
        let version = ContentVersion::of(source);

        match self.entries.entry(path.to_owned()) {
            Entry::Occupied(entry) if entry.get().version == version => {
                tracing::trace!(%path, "descriptor cache hit");
                Ok(Arc::clone(&entry.get().descriptor))
            }
            Entry::Occupied(mut entry) => {
                tracing::debug!(%path, "descriptor is stale, reparsing");
                match parse(source) {
                    Ok(descriptor) => {
                        let descriptor = Arc::new(descriptor);
                        entry.insert(CachedDescriptor {
                            version,
                            descriptor: Arc::clone(&descriptor),
                        });
                        Ok(descriptor)
                    }
                    Err(err) => {
                        entry.remove();
                        Err(err)
                    }
                }
            }
            Entry::Vacant(entry) => {
                tracing::debug!(%path, "descriptor cache miss");
                let descriptor = Arc::new(parse(source)?);
                entry.insert(CachedDescriptor {
                    version,
                    descriptor: Arc::clone(&descriptor),
                });
                Ok(descriptor)
            }
        }
    }

    /// Cached descriptor if present, otherwise read the file and parse it.
    ///
    /// Used by block requests that reach a process which never saw the
    /// file's entry request.
    pub fn get_or_load<F>(
        &self,
        path: &Utf8Path,
        fs: &dyn FileSystem,
        parse: F,
    ) -> Result<Arc<Descriptor>, LoadError>
    where
        F: FnOnce(&str) -> Result<Descriptor, ParseError>,
    {
        if let Some(descriptor) = self.get(path) {
            return Ok(descriptor);
        }

        tracing::debug!(%path, "descriptor not cached, loading from disk");
        let source = fs.read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_owned(),
            source,
        })?;
        Ok(self.get_or_parse(path, &source, parse)?)
    }

    pub fn evict(&self, path: &Utf8Path) -> bool {
        self.entries.remove(path).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use std::sync::Barrier;
    use std::time::Duration;

    use sfcl_source::InMemoryFileSystem;

    use super::*;
    use crate::descriptor::Attrs;
    use crate::descriptor::Block;
    use sfcl_source::Span;

    fn descriptor_with_script(content: &str) -> Descriptor {
        Descriptor {
            script: Some(Block::new(content, Attrs::default(), Span::new(0, 0))),
            ..Descriptor::default()
        }
    }

    fn counting_parser(calls: &AtomicUsize) -> impl FnOnce(&str) -> Result<Descriptor, ParseError> + '_ {
        move |source| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(descriptor_with_script(source))
        }
    }

    #[test]
    fn test_same_text_parses_once() {
        let cache = DescriptorCache::new();
        let calls = AtomicUsize::new(0);
        let path = Utf8Path::new("/app/src/App.vue");

        let first = cache.get_or_parse(path, "a", counting_parser(&calls)).unwrap();
        let second = cache.get_or_parse(path, "a", counting_parser(&calls)).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_concurrent_requests_share_one_parse() {
        let cache = DescriptorCache::new();
        let calls = AtomicUsize::new(0);
        let start = Barrier::new(16);
        let path = Utf8Path::new("/app/src/App.vue");

        let descriptors: Vec<_> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..16)
                .map(|_| {
                    scope.spawn(|| {
                        start.wait();
                        cache
                            .get_or_parse(path, "<script>a</script>", |source| {
                                calls.fetch_add(1, Ordering::SeqCst);
                                std::thread::sleep(Duration::from_millis(20));
                                Ok(descriptor_with_script(source))
                            })
                            .unwrap()
                    })
                })
                .collect();
            workers.into_iter().map(|worker| worker.join().unwrap()).collect()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(descriptors.iter().all(|d| Arc::ptr_eq(d, &descriptors[0])));
    }

    #[test]
    fn test_changed_text_reparses() {
        let cache = DescriptorCache::new();
        let calls = AtomicUsize::new(0);
        let path = Utf8Path::new("/app/src/App.vue");

        cache.get_or_parse(path, "a", counting_parser(&calls)).unwrap();
        let updated = cache.get_or_parse(path, "b", counting_parser(&calls)).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(updated.script.as_ref().unwrap().content, "b");
        assert!(cache.get_current(path, "a").is_none());
        assert!(cache.get_current(path, "b").is_some());
    }

    #[test]
    fn test_failed_reparse_evicts_stale_entry() {
        let cache = DescriptorCache::new();
        let path = Utf8Path::new("/app/src/App.vue");
        cache.set(path, "a", descriptor_with_script("a"));

        let result = cache.get_or_parse(path, "<template>", |_| {
            Err(ParseError::new("Element <template> is missing end tag.", None))
        });

        assert!(result.is_err());
        assert!(cache.get(path).is_none());
    }

    #[test]
    fn test_get_or_load_prefers_cache() {
        let cache = DescriptorCache::new();
        let path = Utf8Path::new("/app/src/App.vue");
        cache.set(path, "cached", descriptor_with_script("cached"));

        let fs = InMemoryFileSystem::new();
        let descriptor = cache
            .get_or_load(path, &fs, |_| panic!("should not parse"))
            .unwrap();
        assert_eq!(descriptor.script.as_ref().unwrap().content, "cached");
    }

    #[test]
    fn test_get_or_load_reads_file() {
        let cache = DescriptorCache::new();
        let path = Utf8Path::new("/app/src/App.vue");
        let mut fs = InMemoryFileSystem::new();
        fs.add_file(path.to_owned(), "from disk".to_string());

        let descriptor = cache
            .get_or_load(path, &fs, |source| Ok(descriptor_with_script(source)))
            .unwrap();
        assert_eq!(descriptor.script.as_ref().unwrap().content, "from disk");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_or_load_missing_file() {
        let cache = DescriptorCache::new();
        let fs = InMemoryFileSystem::new();
        let err = cache
            .get_or_load(Utf8Path::new("/nope.vue"), &fs, |_| {
                Ok(Descriptor::default())
            })
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_evict() {
        let cache = DescriptorCache::new();
        let path = Utf8Path::new("/app/src/App.vue");
        cache.set(path, "a", Descriptor::default());
        assert!(cache.evict(path));
        assert!(!cache.evict(path));
        assert!(cache.is_empty());
    }
}
