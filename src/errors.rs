use thiserror::Error;

#[derive(Error, Debug)]
pub enum DepMergeError {
    #[error("Failed to fetch PR #{pr}: {message}")]
    Fetch { pr: u64, message: String },

    #[error("Branch '{0}' already exists (left over from a previous run?)")]
    StaleBranch(String),

    #[error("Working tree has uncommitted changes: {0}")]
    DirtyWorkspace(String),

    #[error("Cannot check out '{branch}': {message}")]
    Checkout { branch: String, message: String },

    #[error("Merging '{0}' produced conflicts")]
    MergeConflict(String),

    #[error("Dependency install failed: {0}")]
    Install(String),

    #[error("Test run failed to complete: {0}")]
    TestRun(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Invalid catalog: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, DepMergeError>;
