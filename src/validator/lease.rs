use crate::errors::Result;
use crate::git::Workspace;

/// Branches held by one validation attempt.
///
/// Dropping the lease puts the working tree back on mainline and deletes
/// every branch acquired through it, newest first. Branches that existed
/// before the attempt are never registered and so never touched. Cleanup
/// failures are logged and swallowed.
pub struct BranchLease<'a, W: Workspace + ?Sized> {
    workspace: &'a W,
    mainline: &'a str,
    moved_head: bool,
    acquired: Vec<String>,
}

impl<'a, W: Workspace + ?Sized> BranchLease<'a, W> {
    pub fn new(workspace: &'a W, mainline: &'a str) -> Self {
        Self {
            workspace,
            mainline,
            moved_head: false,
            acquired: Vec::new(),
        }
    }

    pub fn workspace(&self) -> &'a W {
        self.workspace
    }

    pub fn mainline(&self) -> &'a str {
        self.mainline
    }

    /// Register a branch this attempt created.
    pub fn acquire(&mut self, branch: &str) {
        self.acquired.push(branch.to_string());
    }

    pub fn checkout(&mut self, branch: &str) -> Result<()> {
        self.moved_head = true;
        self.workspace.checkout(branch)
    }

    pub fn release(&mut self) {
        if std::mem::take(&mut self.moved_head) {
            if let Err(e) = self.workspace.force_checkout(self.mainline) {
                log::debug!("Cleanup: cannot return to {}: {}", self.mainline, e);
            }
        }
        while let Some(branch) = self.acquired.pop() {
            if let Err(e) = self.workspace.delete_branch(&branch) {
                log::debug!("Cleanup: cannot delete {}: {}", branch, e);
            }
        }
    }
}

impl<W: Workspace + ?Sized> Drop for BranchLease<'_, W> {
    fn drop(&mut self) {
        self.release();
    }
}
