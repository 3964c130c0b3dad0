use serde::Deserialize;

/// Package names used to recognise processors in a host chain.
///
/// A processor matches a name when its resolved path contains the name
/// right after a `/`, `\` or `@` (so `node_modules/eslint-loader/index.js`
/// and `@scope/eslint-loader` both count as `eslint-loader`).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProcessorNames {
    /// Linters that would otherwise run twice on block requests.
    pub linter: Vec<String>,
    /// Processors that produce nothing; their presence disables a block type.
    pub noop: Vec<String>,
    /// Stylesheet processors the style post stage is spliced next to.
    pub stylesheet: Vec<String>,
    /// Disk caches, which do not count as user processors for custom blocks.
    pub cache: Vec<String>,
    /// Thread-pool processors whose workers never carry the integration marker.
    pub thread_pool: Vec<String>,
}

impl Default for ProcessorNames {
    fn default() -> Self {
        Self {
            linter: vec!["eslint-loader".to_string()],
            noop: vec!["null-loader".to_string()],
            stylesheet: vec!["css-loader".to_string()],
            cache: vec!["cache-loader".to_string()],
            thread_pool: vec!["thread-loader".to_string()],
        }
    }
}
