use crate::catalog::Catalog;
use crate::validator::JudgeMode;
use std::path::PathBuf;

pub mod analyze;
pub mod generate_commands;
pub mod test_low_risk;
pub mod validate;

/// Settings shared by every action.
pub struct Context {
    pub catalog: Catalog,
    pub repo: PathBuf,
    pub judge: JudgeMode,
}
