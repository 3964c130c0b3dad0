use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use sfcl_loader::load;
use sfcl_request::SubRequest;

use super::finish;
use crate::args::GlobalArgs;
use crate::args::HostArgs;
use crate::commands::Command;
use crate::exit::Exit;

#[derive(Debug, Parser)]
pub struct Extract {
    /// Block request, e.g. `src/App.vue?vue&type=template&id=1a2b3c4d`.
    request: String,

    #[command(flatten)]
    host: HostArgs,
}

impl Command for Extract {
    fn execute(&self, args: &GlobalArgs) -> Result<Exit> {
        let request = SubRequest::decode(&self.request)
            .with_context(|| format!("Invalid block request `{}`", self.request))?;
        let query = request.query_string();

        let root = self.host.root()?;
        let session = self.host.session(&root)?;
        let mut ctx = self.host.context(&root, &request.path, &query);

        let source = std::fs::read_to_string(&ctx.resource_path)
            .with_context(|| format!("Failed to read {}", ctx.resource_path))?;

        let output = load(&session, &mut ctx, &source).map(|output| output.code().to_string());
        finish(args, &mut ctx, output)
    }
}
