// Colored terminal output for moderation decisions.
//
// This module handles all terminal-specific formatting. The main.rs
// command handlers delegate here.

use colored::{ColoredString, Colorize};

use crate::models::{Action, ModerationResult, Severity};
use crate::rules::ModerationRule;
use crate::stats::StatsSnapshot;

fn colorize_action(action: Action) -> ColoredString {
    match action {
        Action::Allow => "ALLOW".green().bold(),
        Action::Warn => "WARN".yellow().bold(),
        Action::Review => "REVIEW".bright_yellow().bold(),
        Action::Block => "BLOCK".red().bold(),
    }
}

fn colorize_severity(severity: Severity) -> ColoredString {
    match severity {
        Severity::Low => "low".dimmed(),
        Severity::Medium => "medium".yellow(),
        Severity::High => "high".bright_red(),
        Severity::Critical => "critical".red().bold(),
    }
}

/// Display one moderation result.
pub fn display_result(result: &ModerationResult) {
    println!(
        "\nDecision: {}  (allowed: {}, confidence: {:.2})",
        colorize_action(result.recommended_action),
        result.allowed,
        result.confidence,
    );
    println!(
        "Risk score: {:.0}  ({} flags, {} ms)",
        result.risk_score,
        result.flags.len(),
        result.processing_time_ms,
    );

    if !result.flags.is_empty() {
        println!();
        for flag in &result.flags {
            let span = flag
                .position
                .map(|p| format!(" @{}..{}", p.start, p.end))
                .unwrap_or_default();
            println!(
                "  [{:<8}] {:<10} {}{}",
                colorize_severity(flag.severity),
                flag.category,
                flag.message,
                span.dimmed(),
            );
        }
    }

    if let Some(sanitized) = &result.sanitized_content {
        println!("\nSanitized: {sanitized}");
    }
}

/// Display the active custom rule set.
pub fn display_rules(rules: &[ModerationRule]) {
    if rules.is_empty() {
        println!("No custom rules configured.");
        println!("Set PALISADE_RULES_FILE to a JSON rule list to add some.");
        return;
    }

    println!("\n{}", format!("=== Custom rules ({}) ===", rules.len()).bold());
    for rule in rules {
        println!(
            "  {:<20} {:<10} {:<10} {}",
            rule.id.bold(),
            colorize_severity(rule.severity),
            rule.category,
            rule.pattern.dimmed(),
        );
    }
}

/// Display batch-run tallies.
pub fn display_stats(snapshot: &StatsSnapshot) {
    println!("\n{}", "=== Summary ===".bold());
    println!("  Evaluated: {}", snapshot.evaluations);
    println!("  {} {}", "allowed".green(), snapshot.allowed);
    println!("  {} {}", "warned ".yellow(), snapshot.warned);
    println!("  {} {}", "review ".bright_yellow(), snapshot.reviewed);
    println!("  {} {}", "blocked".red(), snapshot.blocked);
    if snapshot.failures > 0 {
        println!("  {} {}", "fail-open".red().bold(), snapshot.failures);
    }
}
