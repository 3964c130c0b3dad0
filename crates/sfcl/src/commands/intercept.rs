use anyhow::Result;
use camino::Utf8Path;
use clap::Parser;
use sfcl_loader::intercept;
use sfcl_loader::Interception;
use sfcl_loader::Processor;

use super::finish;
use crate::args::GlobalArgs;
use crate::args::HostArgs;
use crate::commands::Command;
use crate::exit::Exit;

#[derive(Debug, Parser)]
pub struct Intercept {
    /// Block request, e.g. `src/App.vue?vue&type=style&index=0&lang=css`.
    request: String,

    /// Processor still pending for the request, `path[?options]`, in chain
    /// order. Repeatable.
    #[arg(long = "processor")]
    processors: Vec<String>,

    /// Processor whose early pass already ran. Repeatable.
    #[arg(long = "executed")]
    executed: Vec<String>,

    /// The host understands inline match-resource requests.
    #[arg(long)]
    inline_match_resource: bool,

    /// The host handles CSS natively.
    #[arg(long)]
    native_css: bool,

    #[command(flatten)]
    host: HostArgs,
}

impl Command for Intercept {
    fn execute(&self, args: &GlobalArgs) -> Result<Exit> {
        let (path, query) = self
            .request
            .split_once('?')
            .unwrap_or((self.request.as_str(), ""));

        let root = self.host.root()?;
        let session = self.host.session(&root)?;
        let mut ctx = self.host.context(&root, Utf8Path::new(path), query);
        ctx.host.inline_match_resource = self.inline_match_resource;
        ctx.host.native_css = self.native_css;
        ctx.processors = self
            .executed
            .iter()
            .map(|request| Processor::parse(request).executed())
            .chain(std::iter::once(
                Processor::new(&session.runtime().interceptor).executed(),
            ))
            .chain(self.processors.iter().map(String::as_str).map(Processor::parse))
            .collect();

        let code = match intercept(&session, &mut ctx) {
            Interception::Replace(code) => code,
            Interception::Skip => {
                tracing::info!("request left to the host's own chain");
                String::new()
            }
        };
        finish(args, &mut ctx, Ok(code))
    }
}
