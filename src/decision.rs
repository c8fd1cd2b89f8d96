// Decision fuser — turns the accumulated flag multiset and risk score
// into one policy decision.
//
// The decision is driven by the worst severity present, with the numeric
// risk score as a secondary signal below the severity thresholds. A
// critical flag always blocks; no config can override it.

use crate::config::{ModerationConfig, SeverityMode};
use crate::models::{Action, AutoAction, ModerationFlag, Severity};

/// The fuser's verdict, before sanitization and sink emission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub action: Action,
    pub allowed: bool,
    pub confidence: f64,
}

/// Floor for the adjusted confidence.
const MIN_CONFIDENCE: f64 = 0.1;
/// Confidence penalty per flag: many simultaneous findings increase
/// uncertainty even when each is individually moderate.
const PER_FLAG_PENALTY: f64 = 0.05;

/// Compute the decision from the flag multiset and summed risk score.
pub fn decide(flags: &[ModerationFlag], risk_score: f64, config: &ModerationConfig) -> Decision {
    let worst = flags.iter().map(|f| f.severity).max();
    let strict = config.severity_mode == SeverityMode::Strict;
    let allowed_under_auto = config.auto_action != AutoAction::Block;

    let (action, allowed, confidence) = match worst {
        Some(Severity::Critical) => (Action::Block, false, 0.95),
        Some(Severity::High) => {
            if strict {
                (Action::Block, false, 0.85)
            } else {
                (Action::Review, allowed_under_auto, 0.85)
            }
        }
        Some(Severity::Medium) => {
            if strict {
                (Action::Review, allowed_under_auto, 0.70)
            } else {
                (Action::Warn, true, 0.70)
            }
        }
        _ if risk_score > config.weights.review_risk_threshold => {
            (Action::Review, allowed_under_auto, 0.60)
        }
        _ => (Action::Allow, true, 1.0),
    };

    let confidence =
        (confidence - PER_FLAG_PENALTY * flags.len() as f64).clamp(MIN_CONFIDENCE, 1.0);

    Decision {
        action,
        allowed,
        confidence,
    }
}
