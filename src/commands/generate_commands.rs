use super::Context;
use crate::{errors::Result, report};
use clap::Args;
use std::io::Write;

/// Print `gh pr merge` commands without running anything
#[derive(Debug, Args)]
pub struct GenerateCommands {}

impl GenerateCommands {
    pub fn execute(&self, ctx: &Context, out: &mut impl Write) -> Result<()> {
        out.write_all(report::merge_commands(&ctx.catalog).as_bytes())?;
        Ok(())
    }
}
