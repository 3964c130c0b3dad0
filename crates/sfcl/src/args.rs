use anyhow::Context;
use anyhow::Result;
use camino::Utf8Path;
use camino::Utf8PathBuf;
use clap::Parser;
use clap::ValueEnum;
use sfcl_conf::Settings;
use sfcl_loader::BuildSession;
use sfcl_loader::LoaderContext;
use sfcl_loader::Mode;
use sfcl_loader::Target;

#[derive(Parser, Debug, Clone)]
pub struct GlobalArgs {
    /// Only print errors.
    #[arg(global = true, long, short, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log more; repeat for debug and trace output.
    #[arg(global = true, action = clap::ArgAction::Count, long, short, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Also write logs to this file.
    #[arg(global = true, long)]
    pub log_file: Option<Utf8PathBuf>,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum TargetArg {
    #[default]
    Web,
    Node,
}

impl From<TargetArg> for Target {
    fn from(target: TargetArg) -> Self {
        match target {
            TargetArg::Web => Target::Web,
            TargetArg::Node => Target::Node,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum ModeArg {
    #[default]
    Development,
    Production,
    None,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Development => Mode::Development,
            ModeArg::Production => Mode::Production,
            ModeArg::None => Mode::None,
        }
    }
}

/// The build the loader pretends to run inside.
#[derive(Debug, Parser)]
pub struct HostArgs {
    /// Project root; defaults to the current directory.
    #[arg(long)]
    root: Option<Utf8PathBuf>,

    /// Build target; `node` generates server-side style injection.
    #[arg(long, value_enum, default_value_t)]
    target: TargetArg,

    #[arg(long, value_enum, default_value_t)]
    mode: ModeArg,
}

impl HostArgs {
    pub fn root(&self) -> Result<Utf8PathBuf> {
        if let Some(root) = &self.root {
            return Ok(root.clone());
        }
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        Utf8PathBuf::from_path_buf(cwd)
            .map_err(|path| anyhow::anyhow!("Current directory is not valid UTF-8: {}", path.display()))
    }

    /// Session configured from the project's settings files.
    pub fn session(&self, root: &Utf8Path) -> Result<BuildSession> {
        let settings = Settings::new(root).context("Failed to load settings")?;
        Ok(BuildSession::new(settings))
    }

    /// A context for `resource` as the host would hand it to the loader.
    ///
    /// Relative resources resolve against `root`, and a query without its
    /// leading `?` gets one.
    pub fn context(&self, root: &Utf8Path, resource: &Utf8Path, query: &str) -> LoaderContext {
        let query = match query {
            "" => String::new(),
            query if query.starts_with('?') => query.to_string(),
            query => format!("?{query}"),
        };

        let mut ctx = LoaderContext::new(root.join(resource), query);
        ctx.root_context = Some(root.to_owned());
        ctx.working_dir = root.to_owned();
        ctx.target = self.target.into();
        ctx.mode = self.mode.into();
        ctx
    }
}
