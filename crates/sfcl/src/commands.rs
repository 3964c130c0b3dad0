mod decode;
mod entry;
mod extract;
mod intercept;

use anyhow::Result;
use clap::Subcommand;
use sfcl_loader::LoaderContext;
use sfcl_loader::LoaderError;
use sfcl_source::Severity;

use crate::args::GlobalArgs;
use crate::exit::Exit;

pub trait Command {
    fn execute(&self, args: &GlobalArgs) -> Result<Exit>;
}

#[derive(Debug, Subcommand)]
pub enum SfclCommand {
    /// Load a composite file and print the generated component module
    Entry(self::entry::Entry),
    /// Print the block a sub-request addresses
    Extract(self::extract::Extract),
    /// Print a sub-request as JSON
    Decode(self::decode::Decode),
    /// Print the module the interceptor puts in place of a block request
    Intercept(self::intercept::Intercept),
}

/// Print the context's diagnostics, then the output if there is one.
///
/// `--quiet` hides warnings but never errors.
fn finish(
    args: &GlobalArgs,
    ctx: &mut LoaderContext,
    output: Result<String, LoaderError>,
) -> Result<Exit> {
    let diagnostics = ctx.take_diagnostics();
    for diagnostic in &diagnostics {
        if args.quiet && diagnostic.severity != Severity::Error {
            continue;
        }
        eprintln!("{}: {}", diagnostic.severity, diagnostic.message);
    }
    let errors = diagnostics
        .iter()
        .filter(|diagnostic| diagnostic.severity == Severity::Error)
        .count();

    match output {
        Ok(code) if code.is_empty() => {}
        Ok(code) => println!("{code}"),
        // Already reported with a code frame.
        Err(LoaderError::Parse { .. }) if errors > 0 => {}
        Err(e) => return Err(e.into()),
    }

    if errors == 0 {
        Ok(Exit::success())
    } else {
        let word = if errors == 1 { "error" } else { "errors" };
        Ok(Exit::error().with_message(format!("Found {errors} {word}.")))
    }
}
