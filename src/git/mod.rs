use crate::catalog::PrNumber;
use crate::errors::{DepMergeError, Result};
use git2::build::CheckoutBuilder;
use git2::{BranchType, Cred, CredentialType, FetchOptions, RemoteCallbacks, Repository, Signature, StatusOptions};
use std::collections::BTreeSet;
use std::path::Path;

#[cfg(test)]
pub mod fixture;
#[cfg(test)]
pub mod mock;


/// Source-control operations needed to validate a pull request.
///
/// Every operation works on local branches of one working tree.
pub trait Workspace {
    /// Paths of tracked files with uncommitted changes.
    fn dirty_paths(&self) -> Result<Vec<String>>;
    fn branch_exists(&self, name: &str) -> Result<bool>;
    fn local_branches(&self) -> Result<BTreeSet<String>>;
    /// Fetch `refs/pull/<pr>/head` into the local branch `local_branch`.
    fn fetch_pull_request(&self, pr: PrNumber, local_branch: &str) -> Result<()>;
    /// Switch to `branch`, refusing to overwrite local modifications.
    fn checkout(&self, branch: &str) -> Result<()>;
    /// Switch to `branch`, discarding local modifications.
    fn force_checkout(&self, branch: &str) -> Result<()>;
    /// Create `name` at the tip of `from`. Fails if `name` already exists.
    fn create_branch(&self, name: &str, from: &str) -> Result<()>;
    /// Merge `branch` into the checked-out branch.
    fn merge(&self, branch: &str) -> Result<()>;
    fn delete_branch(&self, name: &str) -> Result<()>;
}

pub struct Git2Workspace {
    repo: Repository,
    remote: String,
}

impl Git2Workspace {
    pub fn open(path: &Path, remote: &str) -> Result<Self> {
        let repo = Repository::open(path).map_err(|e| {
            log::error!("Cannot open repository at {}: {}", path.display(), e.message());
            e
        })?;
        Ok(Self::from_repository(repo, remote))
    }

    pub fn from_repository(repo: Repository, remote: &str) -> Self {
        Self {
            repo,
            remote: remote.to_string(),
        }
    }

    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    fn switch_to(&self, branch: &str, force: bool) -> Result<()> {
        let refname = format!("refs/heads/{}", branch);
        let checkout_error = |e: git2::Error| DepMergeError::Checkout {
            branch: branch.to_string(),
            message: e.message().to_string(),
        };

        let tree = self
            .repo
            .find_reference(&refname)
            .and_then(|reference| reference.peel_to_tree())
            .map_err(checkout_error)?;

        let mut builder = CheckoutBuilder::new();
        if force {
            builder.force();
        } else {
            builder.safe();
        }
        self.repo
            .checkout_tree(tree.as_object(), Some(&mut builder))
            .map_err(checkout_error)?;
        self.repo.set_head(&refname).map_err(checkout_error)?;
        log::debug!("Checked out {}", branch);
        Ok(())
    }
}

/// Try the ssh agent, then git's credential helpers. Gives up after a few
/// rounds so that a rejected key does not loop forever.
fn credentials_callback<'a>() -> RemoteCallbacks<'a> {
    let mut attempts = 0;
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |url, username, allowed| {
        attempts += 1;
        if attempts > 3 {
            return Err(git2::Error::from_str("authentication failed"));
        }
        if allowed.contains(CredentialType::SSH_KEY) {
            return Cred::ssh_key_from_agent(username.unwrap_or("git"));
        }
        if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
            let config = git2::Config::open_default()?;
            return Cred::credential_helper(&config, url, username);
        }
        Cred::default()
    });
    callbacks
}

impl Workspace for Git2Workspace {
    fn dirty_paths(&self) -> Result<Vec<String>> {
        let mut options = StatusOptions::new();
        options.include_untracked(false).include_ignored(false);
        let statuses = self.repo.statuses(Some(&mut options))?;
        Ok(statuses
            .iter()
            .filter_map(|entry| entry.path().map(str::to_string))
            .collect())
    }

    fn branch_exists(&self, name: &str) -> Result<bool> {
        match self.repo.find_branch(name, BranchType::Local) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn local_branches(&self) -> Result<BTreeSet<String>> {
        let mut names = BTreeSet::new();
        for entry in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = entry?;
            if let Some(name) = branch.name()? {
                names.insert(name.to_string());
            }
        }
        Ok(names)
    }

    fn fetch_pull_request(&self, pr: PrNumber, local_branch: &str) -> Result<()> {
        let fetch_error = |e: git2::Error| DepMergeError::Fetch {
            pr: pr.get(),
            message: e.message().to_string(),
        };

        let mut remote = self.repo.find_remote(&self.remote).map_err(fetch_error)?;
        let refspec = format!("refs/pull/{}/head:refs/heads/{}", pr, local_branch);
        log::debug!("Fetching {} from {}", refspec, self.remote);

        let mut options = FetchOptions::new();
        options.remote_callbacks(credentials_callback());
        remote
            .fetch(&[refspec.as_str()], Some(&mut options), None)
            .map_err(fetch_error)?;

        // libgit2 skips a refspec whose source does not exist on the remote
        if !self.branch_exists(local_branch)? {
            return Err(DepMergeError::Fetch {
                pr: pr.get(),
                message: format!("{} has no refs/pull/{}/head", self.remote, pr),
            });
        }
        Ok(())
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        self.switch_to(branch, false)
    }

    fn force_checkout(&self, branch: &str) -> Result<()> {
        self.switch_to(branch, true)
    }

    fn create_branch(&self, name: &str, from: &str) -> Result<()> {
        if self.branch_exists(name)? {
            return Err(DepMergeError::StaleBranch(name.to_string()));
        }
        let base = self
            .repo
            .find_branch(from, BranchType::Local)?
            .get()
            .peel_to_commit()?;
        self.repo.branch(name, &base, false)?;
        log::debug!("Created {} from {} ({})", name, from, base.id());
        Ok(())
    }

    fn merge(&self, branch: &str) -> Result<()> {
        let theirs_ref = self.repo.find_branch(branch, BranchType::Local)?.into_reference();
        let annotated = self.repo.reference_to_annotated_commit(&theirs_ref)?;
        let (analysis, _) = self.repo.merge_analysis(&[&annotated])?;

        if analysis.is_up_to_date() {
            log::debug!("{} is already merged", branch);
            return Ok(());
        }

        let theirs = theirs_ref.peel_to_commit()?;
        let mut head = self.repo.head()?;

        if analysis.is_fast_forward() {
            head.set_target(theirs.id(), &format!("depmerge: fast-forward to {}", branch))?;
            self.repo.checkout_head(Some(CheckoutBuilder::new().force()))?;
            log::debug!("Fast-forwarded to {}", theirs.id());
            return Ok(());
        }

        let ours = head.peel_to_commit()?;
        let mut index = self.repo.merge_commits(&ours, &theirs, None)?;
        if index.has_conflicts() {
            return Err(DepMergeError::MergeConflict(branch.to_string()));
        }

        let tree_id = index.write_tree_to(&self.repo)?;
        let tree = self.repo.find_tree(tree_id)?;
        let signature = self
            .repo
            .signature()
            .or_else(|_| Signature::now("depmerge", "depmerge@localhost"))?;
        let message = format!("Merge branch '{}'", branch);
        let merge_id = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, &message, &tree, &[&ours, &theirs])?;
        self.repo.checkout_head(Some(CheckoutBuilder::new().force()))?;
        log::debug!("Created merge commit {}", merge_id);
        Ok(())
    }

    fn delete_branch(&self, name: &str) -> Result<()> {
        let mut branch = self.repo.find_branch(name, BranchType::Local)?;
        branch.delete()?;
        log::debug!("Deleted branch {}", name);
        Ok(())
    }
}
