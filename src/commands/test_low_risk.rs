use super::{validate, Context};
use crate::{catalog::RiskLevel, errors::Result, report};
use clap::Args;
use std::io::Write;

/// Test every low-risk PR locally and print merge instructions for the passing ones
#[derive(Debug, Args)]
pub struct TestLowRisk {}

impl TestLowRisk {
    pub fn execute(&self, ctx: &Context, out: &mut impl Write) -> Result<()> {
        let prs = ctx.catalog.numbers_with_risk(RiskLevel::Low);
        if prs.is_empty() {
            log::info!("No low-risk PRs in the catalog");
            out.write_all(report::batch_summary("low-risk", &[], 0).as_bytes())?;
            return Ok(());
        }
        let mut validator = validate::open_validator(ctx)?;
        validate::run_batch(&mut validator, &ctx.catalog, &prs, "low-risk", out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::validator::JudgeMode;
    use std::path::PathBuf;

    #[test]
    fn test_no_low_risk_prs_still_prints_summary() {
        let mut catalog = Catalog::builtin();
        for pr in &mut catalog.pull_requests {
            pr.risk = RiskLevel::Medium;
        }
        // Never opened: the empty check comes first
        let ctx = Context {
            catalog,
            repo: PathBuf::from("/nonexistent/depmerge-repo"),
            judge: JudgeMode::Marker,
        };
        let mut out = Vec::new();

        TestLowRisk {}.execute(&ctx, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "\n✅ Summary: 0/0 low-risk PRs passed local testing\n   Ready to merge: (none)\n"
        );
    }
}
