// Unit tests for the decision fuser.
//
// Covers the full severity × config matrix, the risk-score fallback
// threshold, and the confidence adjustment bounds.

use palisade::config::{ModerationConfig, SeverityMode};
use palisade::decision::decide;
use palisade::models::{Action, AutoAction, ModerationFlag, Severity};

fn flag(severity: Severity) -> ModerationFlag {
    ModerationFlag {
        rule: "test".to_string(),
        severity,
        category: "test".to_string(),
        message: "test finding".to_string(),
        confidence: 0.9,
        position: None,
        suggested_replacement: None,
    }
}

fn config(mode: SeverityMode, auto: AutoAction) -> ModerationConfig {
    ModerationConfig {
        severity_mode: mode,
        auto_action: auto,
        ..Default::default()
    }
}

// ============================================================
// Critical severity — unconditional across every config
// ============================================================

#[test]
fn critical_blocks_in_every_mode_and_auto_action() {
    for mode in [
        SeverityMode::Strict,
        SeverityMode::Moderate,
        SeverityMode::Lenient,
    ] {
        for auto in [AutoAction::Block, AutoAction::Flag, AutoAction::Warn] {
            let d = decide(&[flag(Severity::Critical)], 0.0, &config(mode, auto));
            assert_eq!(d.action, Action::Block, "{mode:?}/{auto:?}");
            assert!(!d.allowed, "{mode:?}/{auto:?}");
        }
    }
}

#[test]
fn critical_wins_over_lower_severities() {
    let flags = vec![
        flag(Severity::Low),
        flag(Severity::Critical),
        flag(Severity::Medium),
    ];
    let d = decide(
        &flags,
        0.0,
        &config(SeverityMode::Lenient, AutoAction::Warn),
    );
    assert_eq!(d.action, Action::Block);
    assert!(!d.allowed);
}

// ============================================================
// High severity — strict blocks, otherwise review per autoAction
// ============================================================

#[test]
fn high_under_strict_blocks() {
    let d = decide(
        &[flag(Severity::High)],
        0.0,
        &config(SeverityMode::Strict, AutoAction::Flag),
    );
    assert_eq!(d.action, Action::Block);
    assert!(!d.allowed);
}

#[test]
fn high_under_moderate_reviews_allowed_by_auto_action() {
    let d = decide(
        &[flag(Severity::High)],
        0.0,
        &config(SeverityMode::Moderate, AutoAction::Flag),
    );
    assert_eq!(d.action, Action::Review);
    assert!(d.allowed);

    let d = decide(
        &[flag(Severity::High)],
        0.0,
        &config(SeverityMode::Moderate, AutoAction::Block),
    );
    assert_eq!(d.action, Action::Review);
    assert!(!d.allowed);
}

// ============================================================
// Medium severity — warn, or review under strict
// ============================================================

#[test]
fn medium_under_moderate_warns_and_allows() {
    let d = decide(
        &[flag(Severity::Medium)],
        0.0,
        &config(SeverityMode::Moderate, AutoAction::Block),
    );
    assert_eq!(d.action, Action::Warn);
    assert!(d.allowed);
}

#[test]
fn medium_under_strict_reviews() {
    let d = decide(
        &[flag(Severity::Medium)],
        0.0,
        &config(SeverityMode::Strict, AutoAction::Block),
    );
    assert_eq!(d.action, Action::Review);
    assert!(!d.allowed);
}

// ============================================================
// Risk-score fallback — secondary signal below the severity arms
// ============================================================

#[test]
fn risk_above_threshold_reviews() {
    let cfg = ModerationConfig::default();
    let d = decide(&[], 50.1, &cfg);
    assert_eq!(d.action, Action::Review);
}

#[test]
fn risk_at_threshold_allows() {
    let cfg = ModerationConfig::default();
    let d = decide(&[], 50.0, &cfg);
    assert_eq!(d.action, Action::Allow);
    assert!(d.allowed);
}

#[test]
fn low_flags_do_not_escalate_without_risk() {
    let cfg = ModerationConfig::default();
    let d = decide(&[flag(Severity::Low)], 10.0, &cfg);
    assert_eq!(d.action, Action::Allow);
}

#[test]
fn risk_threshold_is_configurable() {
    let mut cfg = ModerationConfig::default();
    cfg.weights.review_risk_threshold = 20.0;
    let d = decide(&[], 25.0, &cfg);
    assert_eq!(d.action, Action::Review);
}

// ============================================================
// Confidence adjustment
// ============================================================

#[test]
fn base_confidences_per_arm() {
    let cfg = ModerationConfig::default();
    // one flag each: base - 0.05
    let d = decide(&[flag(Severity::Critical)], 0.0, &cfg);
    assert!((d.confidence - 0.90).abs() < 1e-9);
    let d = decide(&[flag(Severity::High)], 0.0, &cfg);
    assert!((d.confidence - 0.80).abs() < 1e-9);
    let d = decide(&[flag(Severity::Medium)], 0.0, &cfg);
    assert!((d.confidence - 0.65).abs() < 1e-9);
    // no flags
    let d = decide(&[], 60.0, &cfg);
    assert!((d.confidence - 0.60).abs() < 1e-9);
    let d = decide(&[], 0.0, &cfg);
    assert_eq!(d.confidence, 1.0);
}

#[test]
fn confidence_decreases_with_flag_count() {
    let cfg = ModerationConfig::default();
    let one = decide(&[flag(Severity::Medium)], 0.0, &cfg).confidence;
    let three = decide(&vec![flag(Severity::Medium); 3], 0.0, &cfg).confidence;
    assert!(three < one);
}

#[test]
fn confidence_is_always_within_bounds() {
    let cfg = ModerationConfig::default();
    for count in 0..50 {
        for sev in [Severity::Low, Severity::Medium, Severity::High, Severity::Critical] {
            let flags = vec![flag(sev); count];
            let d = decide(&flags, count as f64 * 13.0, &cfg);
            assert!(
                (0.1..=1.0).contains(&d.confidence),
                "confidence {} out of bounds for {count} x {sev}",
                d.confidence
            );
        }
    }
}
