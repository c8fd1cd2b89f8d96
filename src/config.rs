use std::env;
use std::fs;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::AutoAction;
use crate::rules::ModerationRule;

/// Global strictness mode. Strict escalates one step in the decision
/// table (high → block, medium → review); moderate and lenient share the
/// default table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityMode {
    Strict,
    Moderate,
    Lenient,
}

/// Severity→score weights and decision thresholds.
///
/// These are policy constants, not derived from first principles. They
/// live in configuration so a deployment can retune them without a
/// rebuild, and so the numbers can't silently drift between call sites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Risk contribution of a low-severity blocklist/rule hit (default 10)
    pub severity_low: f64,
    /// Medium-severity hit (default 20)
    pub severity_medium: f64,
    /// High-severity hit (default 30)
    pub severity_high: f64,
    /// Critical-severity hit (default 50)
    pub severity_critical: f64,
    /// Toxicity score above 0.7 (default 40)
    pub toxicity_high: f64,
    /// Toxicity score above 0.5 (default 25)
    pub toxicity_medium: f64,
    /// Spam composite above 0.8 (default 35)
    pub spam_high: f64,
    /// Spam composite above 0.6 (default 20)
    pub spam_medium: f64,
    /// SSN / credit card match, per match (default 30)
    pub pii_high: f64,
    /// Email / phone match, per match (default 20)
    pub pii_medium: f64,
    /// Denylisted or shortened URL, per URL (default 40)
    pub phishing_url: f64,
    /// Phishing phrase hit, per phrase (default 25)
    pub phishing_phrase: f64,
    /// Risk score above which a flagless-but-risky result routes to
    /// review (default 50)
    pub review_risk_threshold: f64,
    /// Risk score above which a queued review item is at least
    /// medium priority (default 40)
    pub review_priority_risk_threshold: f64,
}

impl ScoreWeights {
    /// Severity-weighted risk contribution for blocklist hits and
    /// custom rules.
    pub fn severity_score(&self, severity: crate::models::Severity) -> f64 {
        use crate::models::Severity;
        match severity {
            Severity::Low => self.severity_low,
            Severity::Medium => self.severity_medium,
            Severity::High => self.severity_high,
            Severity::Critical => self.severity_critical,
        }
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            severity_low: 10.0,
            severity_medium: 20.0,
            severity_high: 30.0,
            severity_critical: 50.0,
            toxicity_high: 40.0,
            toxicity_medium: 25.0,
            spam_high: 35.0,
            spam_medium: 20.0,
            pii_high: 30.0,
            pii_medium: 20.0,
            phishing_url: 40.0,
            phishing_phrase: 25.0,
            review_risk_threshold: 50.0,
            review_priority_risk_threshold: 40.0,
        }
    }
}

/// Engine configuration.
///
/// Constructed once at startup (defaults overridden by the caller) and
/// read concurrently by every evaluation. The engine never mutates a
/// config in place — updates swap in a fresh snapshot, so an in-flight
/// evaluation keeps the config it started with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationConfig {
    pub enable_profanity: bool,
    pub enable_toxicity: bool,
    pub enable_spam: bool,
    pub enable_pii: bool,
    pub enable_phishing: bool,
    pub severity_mode: SeverityMode,
    pub auto_action: AutoAction,
    /// Whether review-routed results are also enqueued for humans
    pub review_queue: bool,
    pub custom_rules: Vec<ModerationRule>,
    /// Optional HTTP endpoint for the webhook audit sink
    pub webhook_url: Option<String>,
    pub weights: ScoreWeights,
    /// Budget for the pluggable toxicity scorer before falling back to
    /// the keyword scorer (default 2000)
    pub scorer_timeout_ms: u64,
    /// Budget for fire-and-forget sink deliveries (default 5000)
    pub sink_timeout_ms: u64,
    /// Inputs are truncated to this many characters before analysis so
    /// local scans stay bounded (default 50_000)
    pub max_content_chars: usize,
    /// Tokens longer than this skip leetspeak expansion (default 24)
    pub max_leet_token_chars: usize,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            enable_profanity: true,
            enable_toxicity: true,
            enable_spam: true,
            enable_pii: true,
            enable_phishing: true,
            severity_mode: SeverityMode::Moderate,
            auto_action: AutoAction::Flag,
            review_queue: true,
            custom_rules: Vec::new(),
            webhook_url: None,
            weights: ScoreWeights::default(),
            scorer_timeout_ms: 2_000,
            sink_timeout_ms: 5_000,
            max_content_chars: 50_000,
            max_leet_token_chars: 24,
        }
    }
}

/// Partial configuration update, merged field-by-field onto a snapshot.
/// `None` means "keep the current value".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigPatch {
    pub enable_profanity: Option<bool>,
    pub enable_toxicity: Option<bool>,
    pub enable_spam: Option<bool>,
    pub enable_pii: Option<bool>,
    pub enable_phishing: Option<bool>,
    pub severity_mode: Option<SeverityMode>,
    pub auto_action: Option<AutoAction>,
    pub review_queue: Option<bool>,
    pub custom_rules: Option<Vec<ModerationRule>>,
    pub webhook_url: Option<Option<String>>,
    pub weights: Option<ScoreWeights>,
    pub scorer_timeout_ms: Option<u64>,
    pub sink_timeout_ms: Option<u64>,
    pub max_content_chars: Option<usize>,
    pub max_leet_token_chars: Option<usize>,
}

impl ConfigPatch {
    /// Merge this patch onto `base`, returning the updated config.
    pub fn apply(self, base: &ModerationConfig) -> ModerationConfig {
        let mut next = base.clone();
        if let Some(v) = self.enable_profanity {
            next.enable_profanity = v;
        }
        if let Some(v) = self.enable_toxicity {
            next.enable_toxicity = v;
        }
        if let Some(v) = self.enable_spam {
            next.enable_spam = v;
        }
        if let Some(v) = self.enable_pii {
            next.enable_pii = v;
        }
        if let Some(v) = self.enable_phishing {
            next.enable_phishing = v;
        }
        if let Some(v) = self.severity_mode {
            next.severity_mode = v;
        }
        if let Some(v) = self.auto_action {
            next.auto_action = v;
        }
        if let Some(v) = self.review_queue {
            next.review_queue = v;
        }
        if let Some(v) = self.custom_rules {
            next.custom_rules = v;
        }
        if let Some(v) = self.webhook_url {
            next.webhook_url = v;
        }
        if let Some(v) = self.weights {
            next.weights = v;
        }
        if let Some(v) = self.scorer_timeout_ms {
            next.scorer_timeout_ms = v;
        }
        if let Some(v) = self.sink_timeout_ms {
            next.sink_timeout_ms = v;
        }
        if let Some(v) = self.max_content_chars {
            next.max_content_chars = v;
        }
        if let Some(v) = self.max_leet_token_chars {
            next.max_leet_token_chars = v;
        }
        next
    }
}

impl ModerationConfig {
    /// Load configuration from environment variables, for the CLI.
    ///
    /// Everything has a default; the env only overrides. The .env file
    /// is loaded by the binary at startup via dotenvy.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        match env::var("PALISADE_SEVERITY").as_deref() {
            Ok("strict") => config.severity_mode = SeverityMode::Strict,
            Ok("lenient") => config.severity_mode = SeverityMode::Lenient,
            // "moderate" or unset both keep the default
            _ => {}
        }

        match env::var("PALISADE_AUTO_ACTION").as_deref() {
            Ok("block") => config.auto_action = AutoAction::Block,
            Ok("warn") => config.auto_action = AutoAction::Warn,
            _ => {}
        }

        if let Ok(v) = env::var("PALISADE_REVIEW_QUEUE") {
            config.review_queue = v != "0" && v != "false";
        }

        if let Ok(url) = env::var("PALISADE_WEBHOOK_URL") {
            if !url.is_empty() {
                config.webhook_url = Some(url);
            }
        }

        if let Ok(path) = env::var("PALISADE_RULES_FILE") {
            config.custom_rules = load_rules_file(&path)
                .with_context(|| format!("Failed to load rules file {path}"))?;
        }

        Ok(config)
    }
}

/// Load a JSON array of custom rules from disk.
pub fn load_rules_file(path: &str) -> Result<Vec<ModerationRule>> {
    let raw = fs::read_to_string(path)?;
    let rules: Vec<ModerationRule> = serde_json::from_str(&raw)?;
    Ok(rules)
}
