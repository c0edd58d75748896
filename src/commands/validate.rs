use super::Context;
use crate::{
    catalog::{Catalog, PrNumber},
    errors::{DepMergeError, Result},
    git::{Git2Workspace, Workspace},
    report,
    toolchain::{CommandToolchain, Toolchain},
    validator::{Validator, Verdict},
};
use clap::Args;
use std::io::Write;

/// Test the given PRs locally, one after another
#[derive(Debug, Args)]
pub struct Validate {
    /// PR numbers, in the order to test them
    #[arg(required = true)]
    pub prs: Vec<PrNumber>,
}

impl Validate {
    pub fn execute(&self, ctx: &Context, out: &mut impl Write) -> Result<()> {
        let mut validator = open_validator(ctx)?;
        run_batch(&mut validator, &ctx.catalog, &self.prs, "selected", out)
    }
}

pub fn open_validator(ctx: &Context) -> Result<Validator<Git2Workspace, CommandToolchain>> {
    let workspace = Git2Workspace::open(&ctx.repo, &ctx.catalog.remote)?;
    let toolchain = match workspace.workdir() {
        Some(workdir) => CommandToolchain::new(workdir, &ctx.catalog.toolchain),
        None => {
            return Err(DepMergeError::Config(format!(
                "{} is a bare repository",
                ctx.repo.display()
            )))
        }
    };
    Ok(Validator::new(workspace, toolchain, &ctx.catalog.mainline).with_judge(ctx.judge))
}

/// Validate `prs` and print merge instructions for the ones that pass.
pub fn run_batch<W: Workspace, T: Toolchain>(
    validator: &mut Validator<W, T>,
    catalog: &Catalog,
    prs: &[PrNumber],
    label: &str,
    out: &mut impl Write,
) -> Result<()> {
    writeln!(out, "🧪 Testing {} dependency PRs locally...\n", label)?;

    let mut passed = Vec::new();
    for (pr, verdict) in validator.validate_batch(prs) {
        match verdict {
            Verdict::Passed => {
                writeln!(out, "✅ PR #{} tests passed!", pr)?;
                out.write_all(report::merge_instructions(catalog, pr).as_bytes())?;
                passed.push(pr);
            }
            Verdict::Failed => writeln!(out, "❌ PR #{} tests failed!", pr)?,
            Verdict::Errored(e) => writeln!(out, "❌ Error testing PR #{}: {}", pr, e)?,
        }
    }

    out.write_all(report::batch_summary(label, &passed, prs.len()).as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::mock::MockWorkspace;
    use crate::toolchain::MockToolchain;

    fn pr(number: u64) -> PrNumber {
        PrNumber::try_from(number).unwrap()
    }

    #[test]
    fn test_passing_pr_gets_merge_instructions() {
        let catalog = Catalog::builtin();
        let mut validator = Validator::new(MockWorkspace::new("main"), MockToolchain::new(), "main");
        let mut out = Vec::new();

        run_batch(&mut validator, &catalog, &[pr(115)], "low-risk", &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("✅ PR #115 tests passed!"));
        assert!(text.contains("📋 MERGE INSTRUCTIONS FOR PR #115"));
        assert!(text.contains("gh pr merge 115 --squash --body \"Auto-merge dependency update\""));
        assert!(text.contains("1/1 low-risk PRs passed local testing"));
    }

    #[test]
    fn test_mixed_batch_only_instructs_passing_prs() {
        let catalog = Catalog::builtin();
        let workspace = MockWorkspace::new("main").with_unreachable_pr(114);
        let toolchain = MockToolchain::new()
            .then_run(true, "Tests: 10 passed\n")
            .then_run(false, "Tests: 1 failed\n")
            .then_run(true, "Tests: 10 passed\n");
        let mut validator = Validator::new(workspace, toolchain, "main");
        let mut out = Vec::new();
        let prs = catalog.numbers_with_risk(crate::catalog::RiskLevel::Low);

        run_batch(&mut validator, &catalog, &prs, "low-risk", &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("MERGE INSTRUCTIONS FOR PR #115"));
        assert!(text.contains("MERGE INSTRUCTIONS FOR PR #107"));
        assert!(text.contains("❌ Error testing PR #114: Failed to fetch PR #114"));
        assert!(text.contains("❌ PR #109 tests failed!"));
        assert!(!text.contains("MERGE INSTRUCTIONS FOR PR #109"));
        assert!(text.contains("✅ Summary: 2/4 low-risk PRs passed local testing\n   Ready to merge: 115, 107\n"));
    }

    #[test]
    fn test_uncatalogued_pr_is_described_by_number() {
        let catalog = Catalog::builtin();
        let mut validator = Validator::new(MockWorkspace::new("main"), MockToolchain::new(), "main");
        let mut out = Vec::new();

        run_batch(&mut validator, &catalog, &[pr(42)], "selected", &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("   Description: PR #42\n"));
    }
}
