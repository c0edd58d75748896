// Console text. Everything here is pure so it can be asserted on.

use crate::catalog::{Catalog, CiStatus, DependencyKind, PrNumber, RiskLevel};

const RULE_WIDTH: usize = 30;

fn section(output: &mut String, title: &str) {
    output.push_str(&format!("{}\n{}\n", title, "-".repeat(RULE_WIDTH)));
}

fn join_numbers(numbers: &[PrNumber]) -> String {
    numbers
        .iter()
        .map(PrNumber::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn merge_instructions(catalog: &Catalog, pr: PrNumber) -> String {
    format!(
        "📋 MERGE INSTRUCTIONS FOR PR #{pr}\n   Description: {}\n   GitHub CLI: {}\n   Web UI: {}\n\n",
        catalog.describe(pr),
        catalog.merge_command(pr),
        catalog.pr_url(pr),
    )
}

/// One runnable line per low-risk PR, one commented-out line per medium-risk PR.
pub fn merge_commands(catalog: &Catalog) -> String {
    let mut output = String::from("⚡ GitHub CLI merge commands for dependency PRs:\n\n");

    output.push_str("# Low-risk PRs (safe to merge):\n");
    for pr in catalog.with_risk(RiskLevel::Low) {
        output.push_str(&format!("{}\n", catalog.merge_command(pr.number)));
    }

    output.push_str("\n# Medium-risk PRs (review first):\n");
    for pr in catalog.with_risk(RiskLevel::Medium) {
        output.push_str(&format!("# {} # Review first!\n", catalog.merge_command(pr.number)));
    }
    output
}

pub fn usage(catalog: &Catalog) -> String {
    let low = catalog.numbers_with_risk(RiskLevel::Low);
    let medium = catalog.numbers_with_risk(RiskLevel::Medium);

    let mut output = String::from("🚀 Dependency PR Merge Helper\n===============================\n\n");
    output.push_str("Usage:\n");
    output.push_str("  depmerge test-low-risk       # Test low-risk PRs locally\n");
    output.push_str("  depmerge validate <PR>...    # Test the given PRs locally\n");
    output.push_str("  depmerge generate-commands   # Generate merge commands\n");
    output.push_str("  depmerge analyze             # Print the full PR analysis\n\n");
    output.push_str("Available PRs:\n");
    output.push_str(&format!("  Low-risk:    {}\n", join_numbers(&low)));
    output.push_str(&format!("  Medium-risk: {} (review needed)\n\n", join_numbers(&medium)));
    output.push_str(&ci_line(catalog));
    output
}

fn ci_line(catalog: &Catalog) -> String {
    let green = catalog
        .pull_requests
        .iter()
        .filter(|pr| pr.ci == CiStatus::Success)
        .count();
    if green == catalog.pull_requests.len() {
        "All PRs have passed CI and are technically ready to merge!\n".to_string()
    } else {
        format!(
            "{}/{} PRs have passed CI; the rest need attention first.\n",
            green,
            catalog.pull_requests.len()
        )
    }
}

pub fn batch_summary(label: &str, passed: &[PrNumber], total: usize) -> String {
    let ready = if passed.is_empty() {
        "(none)".to_string()
    } else {
        join_numbers(passed)
    };
    format!(
        "\n✅ Summary: {}/{} {} PRs passed local testing\n   Ready to merge: {}\n",
        passed.len(),
        total,
        label,
        ready
    )
}

pub fn analysis(catalog: &Catalog) -> String {
    let prs = &catalog.pull_requests;
    let mut output = format!(
        "🔍 Dependency PR Analysis for {}\n{}\n\n",
        catalog.repository,
        "=".repeat(60)
    );

    section(&mut output, "📊 SUMMARY");
    output.push_str(&format!("Total dependency PRs: {}\n", prs.len()));
    let green = prs.iter().filter(|pr| pr.ci == CiStatus::Success).count();
    if green == prs.len() {
        output.push_str("✅ All PRs passed CI checks\n");
    } else {
        output.push_str(&format!("⚠️  {}/{} PRs passed CI checks\n", green, prs.len()));
    }
    let dev = prs
        .iter()
        .filter(|pr| pr.kind == DependencyKind::DevDependency)
        .count();
    output.push_str(&format!(
        "{} dev dependencies, {} production dependencies\n\n",
        dev,
        prs.len() - dev
    ));

    section(&mut output, "📋 DETAILED ANALYSIS");
    for pr in prs {
        output.push_str(&format!(
            "{} PR #{} {} {} RISK\n",
            pr.kind.icon(),
            pr.number,
            pr.risk.icon(),
            pr.risk.as_upper()
        ));
        output.push_str(&format!("   📦 {}\n", pr.label()));
        output.push_str(&format!("   📝 {}\n", pr.description));
        output.push_str(&format!("   🔗 {}\n\n", catalog.pr_url(pr.number)));
    }

    section(&mut output, "💡 RECOMMENDATIONS");
    let groups = [
        (RiskLevel::Low, "🟢 SAFE TO MERGE IMMEDIATELY:"),
        (RiskLevel::Medium, "🟡 REVIEW BEFORE MERGING:"),
        (RiskLevel::High, "🔴 DO NOT MERGE WITHOUT MANUAL TESTING:"),
    ];
    for (risk, heading) in groups {
        let mut members = catalog.with_risk(risk).peekable();
        if members.peek().is_none() {
            continue;
        }
        output.push_str(&format!("{}\n", heading));
        for pr in members {
            output.push_str(&format!("   • PR #{}: {} ({})\n", pr.number, pr.package, pr.kind));
            if let Some(note) = &pr.note {
                output.push_str(&format!("     ⚠️  Note: {}\n", note));
            }
        }
        output.push('\n');
    }

    section(&mut output, "🚀 MERGE STRATEGY");
    output.push_str("1. Merge low-risk PRs first (testing libraries, dev tools)\n");
    output.push_str("2. Test build and run tests after each merge\n");
    output.push_str("3. Review medium-risk PRs individually:\n");
    output.push_str("   - Check changelogs for breaking changes\n");
    output.push_str("   - Update configurations if needed\n");
    output.push_str("4. Consider merging in batches by risk level\n\n");

    section(&mut output, "⚡ QUICK MERGE COMMANDS (if you have GitHub CLI):");
    for pr in catalog.with_risk(RiskLevel::Low) {
        output.push_str(&format!("{}\n", catalog.merge_command(pr.number)));
    }
    output.push('\n');
    output.push_str(&ci_line(catalog));
    output
}
