//! Loader options.
//!
//! Options are layered, later sources winning:
//!
//! 1. user config: `<config dir>/sfcl.toml`
//! 2. project `.sfcl.toml`
//! 3. project `sfcl.toml`
//!
//! Every field has a default so an empty project loads cleanly.

mod processors;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use config::Config;
use config::ConfigError as ExternalConfigError;
use config::File;
use config::FileFormat;
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

pub use crate::processors::ProcessorNames;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration build/deserialize error")]
    Config(#[from] ExternalConfigError),
}

#[must_use]
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "sfcl")
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Force production behavior even when the host reports development mode.
    pub production_mode: bool,
    pub hot_reload: bool,
    /// Styles are injected into a shadow root instead of the document head.
    pub shadow_mode: bool,
    /// Expose the component basename as `__file` in production builds.
    pub expose_filename: bool,
    pub experimental_inline_match_resource: bool,
    pub enable_ts_in_template: bool,
    pub append_extension: bool,
    pub cache_directory: Option<Utf8PathBuf>,
    pub cache_identifier: Option<String>,
    pub optimize_ssr: Option<bool>,
    pub prettify: Option<bool>,
    /// Passed through untouched to the template compiler.
    pub compiler_options: serde_json::Map<String, serde_json::Value>,
    pub processors: ProcessorNames,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            production_mode: false,
            hot_reload: true,
            shadow_mode: false,
            expose_filename: false,
            experimental_inline_match_resource: false,
            enable_ts_in_template: true,
            append_extension: false,
            cache_directory: None,
            cache_identifier: None,
            optimize_ssr: None,
            prettify: None,
            compiler_options: serde_json::Map::new(),
            processors: ProcessorNames::default(),
        }
    }
}

impl Settings {
    pub fn new(project_root: &Utf8Path) -> Result<Self, ConfigError> {
        let user_config_file = project_dirs().and_then(|dirs| {
            Utf8PathBuf::from_path_buf(dirs.config_dir().join("sfcl.toml")).ok()
        });

        Self::load_from_paths(project_root, user_config_file.as_deref())
    }

    fn load_from_paths(
        project_root: &Utf8Path,
        user_config_path: Option<&Utf8Path>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = user_config_path {
            builder = builder.add_source(
                File::from(path.as_std_path())
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        for name in [".sfcl.toml", "sfcl.toml"] {
            builder = builder.add_source(
                File::from(project_root.join(name).as_std_path())
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let settings: Settings = builder.build()?.try_deserialize()?;
        tracing::debug!(?settings, "loaded loader settings");
        Ok(settings)
    }

    /// Both a directory and an identifier are needed before compiled
    /// templates are cached on disk.
    #[must_use]
    pub fn template_cache(&self) -> Option<(&Utf8Path, &str)> {
        match (&self.cache_directory, &self.cache_identifier) {
            (Some(dir), Some(ident)) => Some((dir.as_path(), ident.as_str())),
            _ => None,
        }
    }
}
