// Malware/phishing analyzer — URL reputation plus phishing phrasing.
//
// URLs are judged by hostname only: denylisted TLDs and known link
// shorteners (shorteners hide the destination, which is the point).
// Phrase scanning is a case-insensitive substring check, one flag per
// phrase present.

use async_trait::async_trait;

use super::{extract_urls, Analyzer, AnalyzerOutput};
use crate::config::ModerationConfig;
use crate::models::{ModerationFlag, Severity, Span, SubmissionContext};

/// TLDs with disproportionate abuse rates (free registration).
const SUSPICIOUS_TLDS: &[&str] = &["tk", "ml", "ga", "cf", "gq"];

/// Link shorteners that hide the real destination.
const SHORTENER_DOMAINS: &[&str] = &[
    "bit.ly",
    "tinyurl.com",
    "goo.gl",
    "t.co",
    "is.gd",
    "ow.ly",
    "buff.ly",
];

/// Phrases that show up in credential-harvesting copy.
const PHISHING_PHRASES: &[&str] = &[
    "verify your account",
    "confirm your password",
    "urgent action required",
    "click here to claim",
    "your account has been suspended",
    "update your payment information",
    "confirm your identity",
    "unusual activity detected",
];

pub struct PhishingAnalyzer;

impl PhishingAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PhishingAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Hostname portion of a URL, lowercased. Returns None when the URL has
/// no authority component worth judging.
fn hostname(url: &str) -> Option<String> {
    let rest = url.split("://").nth(1)?;
    let authority = rest.split(['/', '?', '#']).next()?;
    // drop a port if present
    let host = authority.split(':').next()?;
    if host.is_empty() {
        None
    } else {
        Some(host.trim_end_matches('.').to_lowercase())
    }
}

fn is_suspicious_host(host: &str) -> bool {
    let tld_hit = host
        .rsplit('.')
        .next()
        .is_some_and(|tld| SUSPICIOUS_TLDS.contains(&tld));
    let shortener_hit = SHORTENER_DOMAINS
        .iter()
        .any(|d| host == *d || host.ends_with(&format!(".{d}")));
    tld_hit || shortener_hit
}

#[async_trait]
impl Analyzer for PhishingAnalyzer {
    fn name(&self) -> &'static str {
        "phishing"
    }

    async fn analyze(
        &self,
        text: &str,
        _context: &SubmissionContext,
        config: &ModerationConfig,
    ) -> AnalyzerOutput {
        let mut out = AnalyzerOutput::empty();

        for (byte_start, url) in extract_urls(text) {
            let Some(host) = hostname(url) else { continue };
            if !is_suspicious_host(&host) {
                continue;
            }
            let start = text[..byte_start].chars().count();
            let end = start + url.chars().count();
            out.flags.push(ModerationFlag {
                rule: "phishing:url".to_string(),
                severity: Severity::High,
                category: "phishing".to_string(),
                message: format!("suspicious link to {host}"),
                confidence: 0.85,
                position: Some(Span::new(start, end)),
                suggested_replacement: None,
            });
            out.risk_score += config.weights.phishing_url;
        }

        let lowered = text.to_lowercase();
        for phrase in PHISHING_PHRASES {
            if lowered.contains(phrase) {
                out.flags.push(ModerationFlag {
                    rule: "phishing:phrase".to_string(),
                    severity: Severity::Medium,
                    category: "phishing".to_string(),
                    message: format!("phishing phrasing detected: \"{phrase}\""),
                    confidence: 0.7,
                    position: None,
                    suggested_replacement: None,
                });
                out.risk_score += config.weights.phishing_phrase;
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run(text: &str) -> AnalyzerOutput {
        PhishingAnalyzer::new()
            .analyze(text, &Default::default(), &Default::default())
            .await
    }

    #[test]
    fn hostname_parsing() {
        assert_eq!(hostname("https://evil.tk/login"), Some("evil.tk".into()));
        assert_eq!(hostname("http://Bit.LY"), Some("bit.ly".into()));
        assert_eq!(hostname("https://a.test:8080/x?q=1"), Some("a.test".into()));
        assert_eq!(hostname("not a url"), None);
    }

    #[test]
    fn suspicious_hosts() {
        assert!(is_suspicious_host("login.evil.tk"));
        assert!(is_suspicious_host("bit.ly"));
        assert!(is_suspicious_host("www.bit.ly"));
        assert!(!is_suspicious_host("example.com"));
        // "ml" as a label, not a TLD, is fine
        assert!(!is_suspicious_host("ml.example.com"));
    }

    #[tokio::test]
    async fn denylisted_tld_is_high_severity() {
        let out = run("claim your prize at https://free-money.tk/now").await;
        assert_eq!(out.flags.len(), 1);
        assert_eq!(out.flags[0].severity, Severity::High);
        assert_eq!(out.risk_score, 40.0);
    }

    #[tokio::test]
    async fn each_bad_url_scores_separately() {
        let out = run("https://a.tk https://bit.ly/x https://fine.example").await;
        assert_eq!(out.flags.len(), 2);
        assert_eq!(out.risk_score, 80.0);
    }

    #[tokio::test]
    async fn phrases_match_case_insensitively() {
        let out = run("URGENT ACTION REQUIRED: Verify Your Account today").await;
        assert_eq!(out.flags.len(), 2);
        assert!(out.flags.iter().all(|f| f.severity == Severity::Medium));
        assert_eq!(out.risk_score, 50.0);
    }

    #[tokio::test]
    async fn benign_links_and_text_are_silent() {
        let out = run("read the docs at https://docs.example.com/guide").await;
        assert!(out.flags.is_empty());
    }
}
