//! Throwaway repositories for tests: a bare "origin" carrying `main` and
//! `refs/pull/<n>/head` refs, and a clone of it to validate in.

use git2::{Commit, Oid, Repository, RepositoryInitOptions, Signature};
use tempfile::TempDir;

pub type TestError = Box<dyn std::error::Error>;

pub struct Fixture {
    origin_dir: TempDir,
    local_dir: TempDir,
    pub origin: Repository,
}

fn commit_on(
    repo: &Repository,
    refname: &str,
    parent: Option<Oid>,
    message: &str,
    files: &[(&str, &str)],
) -> Result<Oid, TestError> {
    let sig = Signature::now("Test User", "test@example.com")?;
    let parent_commit = parent.map(|id| repo.find_commit(id)).transpose()?;
    let base_tree = parent_commit.as_ref().map(|commit| commit.tree()).transpose()?;

    let mut builder = repo.treebuilder(base_tree.as_ref())?;
    for &(name, content) in files {
        let blob = repo.blob(content.as_bytes())?;
        builder.insert(name, blob, 0o100644)?;
    }
    let tree = repo.find_tree(builder.write()?)?;

    let parents: Vec<&Commit<'_>> = parent_commit.iter().collect();
    Ok(repo.commit(Some(refname), &sig, &sig, message, &tree, &parents)?)
}

impl Fixture {
    pub fn new() -> Result<Self, TestError> {
        let origin_dir = TempDir::new()?;
        let local_dir = TempDir::new()?;

        let mut options = RepositoryInitOptions::new();
        options.bare(true).initial_head("main");
        let origin = Repository::init_opts(origin_dir.path(), &options)?;
        commit_on(
            &origin,
            "refs/heads/main",
            None,
            "Initial commit",
            &[
                ("package.json", "{\n  \"name\": \"demo\",\n  \"version\": \"1.0.0\"\n}\n"),
                ("README.md", "demo\n"),
            ],
        )?;

        Ok(Self {
            origin_dir,
            local_dir,
            origin,
        })
    }

    pub fn main_tip(&self) -> Result<Oid, TestError> {
        Ok(self.origin.refname_to_id("refs/heads/main")?)
    }

    /// Publish a PR head based on the current tip of origin's `main`.
    pub fn add_pull_request(&self, pr: u64, files: &[(&str, &str)]) -> Result<Oid, TestError> {
        let base = self.main_tip()?;
        commit_on(
            &self.origin,
            &format!("refs/pull/{}/head", pr),
            Some(base),
            &format!("Dependency update #{}", pr),
            files,
        )
    }

    pub fn advance_main(&self, files: &[(&str, &str)]) -> Result<Oid, TestError> {
        let base = self.main_tip()?;
        commit_on(&self.origin, "refs/heads/main", Some(base), "Advance main", files)
    }

    /// Clone origin into a fresh working tree with `main` checked out.
    pub fn clone_local(&self) -> Result<Repository, TestError> {
        let url = self
            .origin_dir
            .path()
            .to_str()
            .ok_or("origin path is not valid UTF-8")?;
        let repo = Repository::clone(url, self.local_dir.path().join("work"))?;
        let mut config = repo.config()?;
        config.set_str("user.name", "Test User")?;
        config.set_str("user.email", "test@example.com")?;
        Ok(repo)
    }
}
