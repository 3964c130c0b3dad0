use anyhow::Context;
use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use sfcl_loader::load;
use sfcl_loader::LoadOutput;
use sfcl_loader::Processor;

use super::finish;
use crate::args::GlobalArgs;
use crate::args::HostArgs;
use crate::commands::Command;
use crate::exit::Exit;

#[derive(Debug, Parser)]
pub struct Entry {
    /// Composite file to load.
    file: Utf8PathBuf,

    /// Resource query, e.g. `vue&type=style&index=0` to load one block.
    #[arg(long, default_value = "")]
    query: String,

    #[command(flatten)]
    host: HostArgs,
}

impl Command for Entry {
    fn execute(&self, args: &GlobalArgs) -> Result<Exit> {
        let root = self.host.root()?;
        let session = self.host.session(&root)?;
        let mut ctx = self.host.context(&root, &self.file, &self.query);
        ctx.processors.push(Processor::new(&session.runtime().loader));

        let source = std::fs::read_to_string(&ctx.resource_path)
            .with_context(|| format!("Failed to read {}", ctx.resource_path))?;

        let output = load(&session, &mut ctx, &source).map(|output| match output {
            LoadOutput::Module(code) => code,
            LoadOutput::Block(block) => block.content,
        });
        finish(args, &mut ctx, output)
    }
}
