pub mod judge;
pub mod lease;


use crate::catalog::PrNumber;
use crate::errors::{DepMergeError, Result};
use crate::git::Workspace;
use crate::toolchain::Toolchain;
pub use judge::{judge, JudgeMode};
use lease::BranchLease;

#[derive(Debug)]
pub enum Verdict {
    Passed,
    /// The suite ran and reported failures.
    Failed,
    /// Some step before a usable test report broke.
    Errored(DepMergeError),
}

impl Verdict {
    #[cfg(test)]
    pub fn is_passed(&self) -> bool {
        matches!(self, Verdict::Passed)
    }
}

/// Branch names used while validating one PR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptPlan {
    pub pr: PrNumber,
    pub pr_branch: String,
    pub isolation_branch: String,
}

impl AttemptPlan {
    pub fn new(pr: PrNumber) -> Self {
        Self {
            pr,
            pr_branch: format!("pr-{}", pr),
            isolation_branch: format!("test-pr-{}", pr),
        }
    }
}

/// Merges PRs onto mainline in a scratch branch and runs the test suite.
///
/// Attempts share the one working tree, so `validate` takes `&mut self` and
/// batches run strictly one PR after another.
pub struct Validator<W: Workspace, T: Toolchain> {
    workspace: W,
    toolchain: T,
    mainline: String,
    judge: JudgeMode,
}

impl<W: Workspace, T: Toolchain> Validator<W, T> {
    pub fn new(workspace: W, toolchain: T, mainline: &str) -> Self {
        Self {
            workspace,
            toolchain,
            mainline: mainline.to_string(),
            judge: JudgeMode::default(),
        }
    }

    pub fn with_judge(mut self, judge: JudgeMode) -> Self {
        self.judge = judge;
        self
    }

    #[cfg(test)]
    pub fn workspace(&self) -> &W {
        &self.workspace
    }

    #[cfg(test)]
    pub fn toolchain(&self) -> &T {
        &self.toolchain
    }

    pub fn validate(&mut self, pr: PrNumber) -> Verdict {
        log::info!("🧪 Testing PR #{} locally...", pr);
        let plan = AttemptPlan::new(pr);

        let mut lease = BranchLease::new(&self.workspace, &self.mainline);
        let outcome = run_attempt(&mut lease, &self.toolchain, &plan, self.judge);
        lease.release();

        match outcome {
            Ok(verdict) => {
                log::debug!("PR #{} resolved as {:?}", pr, verdict);
                verdict
            }
            Err(e) => {
                log::warn!("❌ Error testing PR #{}: {}", pr, e);
                Verdict::Errored(e)
            }
        }
    }

    /// Validate each PR in order. An errored attempt does not stop the batch.
    pub fn validate_batch(&mut self, prs: &[PrNumber]) -> Vec<(PrNumber, Verdict)> {
        prs.iter().map(|&pr| (pr, self.validate(pr))).collect()
    }
}

fn run_attempt<W, T>(
    lease: &mut BranchLease<'_, W>,
    toolchain: &T,
    plan: &AttemptPlan,
    mode: JudgeMode,
) -> Result<Verdict>
where
    W: Workspace + ?Sized,
    T: Toolchain + ?Sized,
{
    let workspace = lease.workspace();

    let dirty = workspace.dirty_paths()?;
    if !dirty.is_empty() {
        return Err(DepMergeError::DirtyWorkspace(dirty.join(", ")));
    }
    for branch in [&plan.pr_branch, &plan.isolation_branch] {
        if workspace.branch_exists(branch)? {
            return Err(DepMergeError::StaleBranch(branch.clone()));
        }
    }

    log::info!("   📥 Fetching PR #{}...", plan.pr);
    workspace.fetch_pull_request(plan.pr, &plan.pr_branch)?;
    lease.acquire(&plan.pr_branch);

    log::info!("   🌿 Creating test branch...");
    let mainline = lease.mainline();
    lease.checkout(mainline)?;
    workspace.create_branch(&plan.isolation_branch, mainline)?;
    lease.acquire(&plan.isolation_branch);
    lease.checkout(&plan.isolation_branch)?;

    log::info!("   🔀 Merging PR branch...");
    workspace.merge(&plan.pr_branch)?;

    log::info!("   📦 Installing dependencies...");
    toolchain.install()?;

    log::info!("   🧪 Running tests...");
    let run = toolchain.run_tests()?;
    Ok(judge(&run, mode))
}
