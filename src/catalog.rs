use crate::errors::{DepMergeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

const CATALOG_FILE: &str = ".depmerge.toml";

/// A pull request number. Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct PrNumber(u64);

impl PrNumber {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for PrNumber {
    type Error = String;

    fn try_from(value: u64) -> std::result::Result<Self, Self::Error> {
        if value == 0 {
            Err("PR number must be a positive integer".to_string())
        } else {
            Ok(Self(value))
        }
    }
}

impl From<PrNumber> for u64 {
    fn from(pr: PrNumber) -> Self {
        pr.0
    }
}

impl FromStr for PrNumber {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let value: u64 = s
            .trim_start_matches('#')
            .parse()
            .map_err(|e| format!("'{}' is not a PR number: {}", s, e))?;
        Self::try_from(value)
    }
}

impl fmt::Display for PrNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn icon(self) -> &'static str {
        match self {
            RiskLevel::Low => "🟢",
            RiskLevel::Medium => "🟡",
            RiskLevel::High => "🔴",
        }
    }

    pub fn as_upper(self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyKind {
    DevDependency,
    ProductionDependency,
}

impl DependencyKind {
    pub fn icon(self) -> &'static str {
        match self {
            DependencyKind::DevDependency => "🔧",
            DependencyKind::ProductionDependency => "🚀",
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyKind::DevDependency => write!(f, "dev-dependency"),
            DependencyKind::ProductionDependency => write!(f, "production-dependency"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CiStatus {
    #[default]
    Success,
    Failure,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyPr {
    pub number: PrNumber,
    pub title: String,
    pub package: String,
    pub from: String,
    pub to: String,
    pub kind: DependencyKind,
    pub risk: RiskLevel,
    #[serde(default)]
    pub ci: CiStatus,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl DependencyPr {
    /// `<package>: <from> → <to>`
    pub fn label(&self) -> String {
        format!("{}: {} → {}", self.package, self.from, self.to)
    }
}

/// Commands used to prepare and test a merged tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolchainConfig {
    pub install: Vec<String>,
    pub test: Vec<String>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            install: vec!["npm".to_string(), "install".to_string()],
            test: vec!["npm".to_string(), "test".to_string()],
        }
    }
}

fn default_mainline() -> String {
    "main".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_merge_body() -> String {
    "Auto-merge dependency update".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// `owner/name` on GitHub
    pub repository: String,
    #[serde(default = "default_mainline")]
    pub mainline: String,
    #[serde(default = "default_remote")]
    pub remote: String,
    #[serde(default = "default_merge_body")]
    pub merge_body: String,
    #[serde(default)]
    pub toolchain: ToolchainConfig,
    pub pull_requests: Vec<DependencyPr>,
}

impl Catalog {
    pub fn from_toml(content: &str) -> Result<Self> {
        let catalog: Catalog = toml::from_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            log::error!("Cannot read catalog {}: {}", path.display(), e);
            e
        })?;
        log::debug!("Loaded catalog from {}", path.display());
        Self::from_toml(&content)
    }

    /// Use the explicit path if given, then `.depmerge.toml` in the current
    /// directory, then the built-in catalog.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let local = Path::new(CATALOG_FILE);
        if local.is_file() {
            return Self::load(local);
        }
        log::debug!("No {} found, using built-in catalog", CATALOG_FILE);
        Ok(Self::builtin())
    }

    pub fn validate(&self) -> Result<()> {
        let mut parts = self.repository.split('/');
        let well_formed = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty()
        );
        if !well_formed {
            return Err(DepMergeError::Config(format!(
                "repository '{}' is not of the form owner/name",
                self.repository
            )));
        }
        if self.mainline.trim().is_empty() {
            return Err(DepMergeError::Config("mainline branch name is empty".to_string()));
        }
        if self.toolchain.install.is_empty() || self.toolchain.test.is_empty() {
            return Err(DepMergeError::Config("toolchain commands must not be empty".to_string()));
        }
        if self.pull_requests.is_empty() {
            return Err(DepMergeError::Config("no pull requests listed".to_string()));
        }
        let mut seen = HashSet::new();
        for pr in &self.pull_requests {
            if !seen.insert(pr.number) {
                return Err(DepMergeError::Config(format!("PR #{} is listed twice", pr.number)));
            }
        }
        Ok(())
    }

    pub fn find(&self, number: PrNumber) -> Option<&DependencyPr> {
        self.pull_requests.iter().find(|pr| pr.number == number)
    }

    pub fn with_risk(&self, risk: RiskLevel) -> impl Iterator<Item = &DependencyPr> + '_ {
        self.pull_requests.iter().filter(move |pr| pr.risk == risk)
    }

    pub fn numbers_with_risk(&self, risk: RiskLevel) -> Vec<PrNumber> {
        self.with_risk(risk).map(|pr| pr.number).collect()
    }

    /// Human label for a PR, falling back to its number when uncatalogued.
    pub fn describe(&self, number: PrNumber) -> String {
        self.find(number)
            .map(DependencyPr::label)
            .unwrap_or_else(|| format!("PR #{}", number))
    }

    pub fn pr_url(&self, number: PrNumber) -> String {
        format!("https://github.com/{}/pull/{}", self.repository, number)
    }

    pub fn merge_command(&self, number: PrNumber) -> String {
        format!("gh pr merge {} --squash --body \"{}\"", number, self.merge_body)
    }

    pub fn builtin() -> Self {
        fn pr(
            number: u64,
            title: &str,
            package: &str,
            (from, to): (&str, &str),
            kind: DependencyKind,
            risk: RiskLevel,
            description: &str,
        ) -> DependencyPr {
            DependencyPr {
                number: PrNumber(number),
                title: title.to_string(),
                package: package.to_string(),
                from: from.to_string(),
                to: to.to_string(),
                kind,
                risk,
                ci: CiStatus::Success,
                description: description.to_string(),
                note: None,
            }
        }
        use DependencyKind::{DevDependency as Dev, ProductionDependency as Prod};
        use RiskLevel::{Low, Medium};

        let mut eslint = pr(
            113,
            "build(deps-dev): bump eslint from 9.31.0 to 9.33.0",
            "eslint",
            ("9.31.0", "9.33.0"),
            Dev,
            Medium,
            "Linting tool update with new features and fixes",
        );
        eslint.note = Some("ESLint config may need updating to v9 format".to_string());

        let mut dotenv = pr(
            106,
            "build(deps): bump dotenv from 16.6.1 to 17.2.1",
            "dotenv",
            ("16.6.1", "17.2.1"),
            Prod,
            Medium,
            "Environment variables loader major version update",
        );
        dotenv.note = Some("Major version update - check for breaking changes".to_string());

        Self {
            repository: "paicaloid/github-readme-stats".to_string(),
            mainline: default_mainline(),
            remote: default_remote(),
            merge_body: default_merge_body(),
            toolchain: ToolchainConfig::default(),
            pull_requests: vec![
                pr(
                    115,
                    "build(deps-dev): bump @testing-library/jest-dom from 6.6.3 to 6.7.0",
                    "@testing-library/jest-dom",
                    ("6.6.3", "6.7.0"),
                    Dev,
                    Low,
                    "Testing library update with new toBePressed matcher",
                ),
                pr(
                    114,
                    "build(deps-dev): bump lint-staged from 16.1.2 to 16.1.5",
                    "lint-staged",
                    ("16.1.2", "16.1.5"),
                    Dev,
                    Low,
                    "Git hooks tool with worktree fixes",
                ),
                eslint,
                pr(
                    109,
                    "build(deps-dev): bump @testing-library/dom from 10.4.0 to 10.4.1",
                    "@testing-library/dom",
                    ("10.4.0", "10.4.1"),
                    Dev,
                    Low,
                    "Testing library patch update",
                ),
                pr(
                    108,
                    "build(deps): bump axios from 1.10.0 to 1.11.0",
                    "axios",
                    ("1.10.0", "1.11.0"),
                    Prod,
                    Medium,
                    "HTTP client minor version update",
                ),
                pr(
                    107,
                    "build(deps-dev): bump jest-environment-jsdom from 30.0.4 to 30.0.5",
                    "jest-environment-jsdom",
                    ("30.0.4", "30.0.5"),
                    Dev,
                    Low,
                    "Jest testing environment patch update",
                ),
                dotenv,
            ],
        }
    }
}
