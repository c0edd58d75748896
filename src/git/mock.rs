use super::Workspace;
use crate::catalog::PrNumber;
use crate::errors::{DepMergeError, Result};
use std::collections::{BTreeSet, HashSet};
use std::sync::Mutex;

/// In-memory branch bookkeeping standing in for a repository.
pub struct MockWorkspace {
    pub branches: Mutex<BTreeSet<String>>,
    pub head: Mutex<String>,
    pub dirty: Vec<String>,
    pub unreachable_prs: HashSet<u64>,
    pub conflicting_branches: HashSet<String>,
    pub locked_branches: HashSet<String>,
    pub calls: Mutex<Vec<String>>,
}

impl MockWorkspace {
    pub fn new(mainline: &str) -> Self {
        Self {
            branches: Mutex::new(BTreeSet::from([mainline.to_string()])),
            head: Mutex::new(mainline.to_string()),
            dirty: Vec::new(),
            unreachable_prs: HashSet::new(),
            conflicting_branches: HashSet::new(),
            locked_branches: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_branches(self, names: &[&str]) -> Self {
        self.branches
            .lock()
            .unwrap()
            .extend(names.iter().map(|name| name.to_string()));
        self
    }

    pub fn with_dirty(mut self, paths: &[&str]) -> Self {
        self.dirty = paths.iter().map(|path| path.to_string()).collect();
        self
    }

    pub fn with_unreachable_pr(mut self, pr: u64) -> Self {
        self.unreachable_prs.insert(pr);
        self
    }

    pub fn with_conflict(mut self, branch: &str) -> Self {
        self.conflicting_branches.insert(branch.to_string());
        self
    }

    /// Deleting this branch always fails.
    pub fn with_locked_branch(mut self, branch: &str) -> Self {
        self.locked_branches.insert(branch.to_string());
        self
    }

    pub fn get_branches(&self) -> BTreeSet<String> {
        self.branches.lock().unwrap().clone()
    }

    pub fn get_head(&self) -> String {
        self.head.lock().unwrap().clone()
    }

    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn switch(&self, branch: &str) -> Result<()> {
        if !self.branches.lock().unwrap().contains(branch) {
            return Err(DepMergeError::Checkout {
                branch: branch.to_string(),
                message: "no such branch".to_string(),
            });
        }
        *self.head.lock().unwrap() = branch.to_string();
        Ok(())
    }
}

impl Workspace for MockWorkspace {
    fn dirty_paths(&self) -> Result<Vec<String>> {
        Ok(self.dirty.clone())
    }

    fn branch_exists(&self, name: &str) -> Result<bool> {
        Ok(self.branches.lock().unwrap().contains(name))
    }

    fn local_branches(&self) -> Result<BTreeSet<String>> {
        Ok(self.get_branches())
    }

    fn fetch_pull_request(&self, pr: PrNumber, local_branch: &str) -> Result<()> {
        self.record(format!("fetch {} {}", pr, local_branch));
        if self.unreachable_prs.contains(&pr.get()) {
            return Err(DepMergeError::Fetch {
                pr: pr.get(),
                message: "could not resolve host".to_string(),
            });
        }
        self.branches.lock().unwrap().insert(local_branch.to_string());
        Ok(())
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        self.record(format!("checkout {}", branch));
        self.switch(branch)
    }

    fn force_checkout(&self, branch: &str) -> Result<()> {
        self.record(format!("force-checkout {}", branch));
        self.switch(branch)
    }

    fn create_branch(&self, name: &str, from: &str) -> Result<()> {
        self.record(format!("branch {} {}", name, from));
        let mut branches = self.branches.lock().unwrap();
        if branches.contains(name) {
            return Err(DepMergeError::StaleBranch(name.to_string()));
        }
        if !branches.contains(from) {
            return Err(DepMergeError::Checkout {
                branch: from.to_string(),
                message: "no such branch".to_string(),
            });
        }
        branches.insert(name.to_string());
        Ok(())
    }

    fn merge(&self, branch: &str) -> Result<()> {
        self.record(format!("merge {}", branch));
        if self.conflicting_branches.contains(branch) {
            return Err(DepMergeError::MergeConflict(branch.to_string()));
        }
        Ok(())
    }

    fn delete_branch(&self, name: &str) -> Result<()> {
        self.record(format!("delete {}", name));
        if self.locked_branches.contains(name) || *self.head.lock().unwrap() == name {
            return Err(DepMergeError::Git(git2::Error::from_str("cannot delete branch")));
        }
        self.branches.lock().unwrap().remove(name);
        Ok(())
    }
}
