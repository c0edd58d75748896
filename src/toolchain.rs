use crate::catalog::ToolchainConfig;
use crate::errors::{DepMergeError, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Outcome of a test command that ran to completion.
#[derive(Debug, Clone, PartialEq)]
pub struct TestRun {
    pub success: bool,
    /// stdout followed by stderr
    pub output: String,
}

pub trait Toolchain {
    fn install(&self) -> Result<()>;
    fn run_tests(&self) -> Result<TestRun>;
}

/// Runs the configured install and test commands in a working directory.
pub struct CommandToolchain {
    workdir: PathBuf,
    install: Vec<String>,
    test: Vec<String>,
}

impl CommandToolchain {
    pub fn new(workdir: &Path, config: &ToolchainConfig) -> Self {
        Self {
            workdir: workdir.to_path_buf(),
            install: config.install.clone(),
            test: config.test.clone(),
        }
    }

    fn run_command(&self, argv: &[String]) -> std::io::Result<Output> {
        let (program, args) = argv.split_first().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command")
        })?;
        log::debug!("Running {} in {}", argv.join(" "), self.workdir.display());
        Command::new(program)
            .args(args)
            .current_dir(&self.workdir)
            .output()
    }
}

fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}

/// Last few lines of a command's output, enough to explain a failure.
fn tail(text: &str) -> String {
    let lines: Vec<&str> = text.trim_end().lines().collect();
    let start = lines.len().saturating_sub(5);
    lines[start..].join("\n")
}

impl Toolchain for CommandToolchain {
    fn install(&self) -> Result<()> {
        let output = self.run_command(&self.install).map_err(|e| {
            DepMergeError::Install(format!("cannot run `{}`: {}", self.install.join(" "), e))
        })?;

        if !output.status.success() {
            return Err(DepMergeError::Install(format!(
                "`{}` exited with {}: {}",
                self.install.join(" "),
                output.status,
                tail(&combined_output(&output))
            )));
        }
        Ok(())
    }

    fn run_tests(&self) -> Result<TestRun> {
        let output = self.run_command(&self.test).map_err(|e| {
            DepMergeError::TestRun(format!("cannot run `{}`: {}", self.test.join(" "), e))
        })?;

        Ok(TestRun {
            success: output.status.success(),
            output: combined_output(&output),
        })
    }
}

#[cfg(test)]
pub struct MockToolchain {
    pub fail_install: bool,
    pub runs: std::sync::Mutex<std::collections::VecDeque<TestRun>>,
    pub installs: std::sync::Mutex<usize>,
}

#[cfg(test)]
impl MockToolchain {
    /// Every test run reports a clean jest summary unless scripted otherwise.
    pub fn new() -> Self {
        Self {
            fail_install: false,
            runs: std::sync::Mutex::new(std::collections::VecDeque::new()),
            installs: std::sync::Mutex::new(0),
        }
    }

    pub fn failing_install(mut self) -> Self {
        self.fail_install = true;
        self
    }

    /// Queue the result of the next test run.
    pub fn then_run(self, success: bool, output: &str) -> Self {
        self.runs.lock().unwrap().push_back(TestRun {
            success,
            output: output.to_string(),
        });
        self
    }

    pub fn get_installs(&self) -> usize {
        *self.installs.lock().unwrap()
    }
}

#[cfg(test)]
impl Toolchain for MockToolchain {
    fn install(&self) -> Result<()> {
        *self.installs.lock().unwrap() += 1;
        if self.fail_install {
            return Err(DepMergeError::Install("npm ERR! ERESOLVE unable to resolve dependency tree".to_string()));
        }
        Ok(())
    }

    fn run_tests(&self) -> Result<TestRun> {
        Ok(self.runs.lock().unwrap().pop_front().unwrap_or_else(|| TestRun {
            success: true,
            output: "Tests:       12 passed, 12 total\n".to_string(),
        }))
    }
}
