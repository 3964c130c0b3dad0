use anyhow::Result;
use clap::Parser;
use sfcl_request::SubRequest;

use crate::args::GlobalArgs;
use crate::commands::Command;
use crate::exit::Exit;

#[derive(Debug, Parser)]
pub struct Decode {
    /// Block request to decode.
    request: String,
}

impl Command for Decode {
    fn execute(&self, _args: &GlobalArgs) -> Result<Exit> {
        let request = SubRequest::decode(&self.request)?;
        println!("{}", serde_json::to_string_pretty(&request)?);
        Ok(Exit::success())
    }
}
