use super::Context;
use crate::{errors::Result, report};
use clap::Args;
use std::io::Write;

/// Print the risk analysis of every catalogued PR
#[derive(Debug, Args)]
pub struct Analyze {}

impl Analyze {
    pub fn execute(&self, ctx: &Context, out: &mut impl Write) -> Result<()> {
        out.write_all(report::analysis(&ctx.catalog).as_bytes())?;
        Ok(())
    }
}
