// Network health score (0-100).
//
// A text generator may be plugged in to produce the score; its reply is parsed
// leniently. Whenever it is absent, fails, or answers with nothing usable, the
// deterministic penalty scorer decides.

use std::sync::Arc;
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::diagnoser::DerivedMetrics;

const MAX_EXPLANATION_CHARS: usize = 150;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthScore {
    pub score: u8,
    pub explanation: String,
}

/// Deterministic penalty scorer. Unmeasured inputs carry no penalty.
pub fn score(
    router_latency: Option<f64>,
    internet_latency: Option<f64>,
    signal_dbm: Option<i32>,
    packet_loss: Option<f64>,
) -> HealthScore {
    let mut total: i32 = 100;
    let mut penalties: Vec<&str> = Vec::new();
    let mut penalize = |points: i32, name: &'static str| {
        total -= points;
        penalties.push(name);
    };

    match router_latency {
        Some(r) if r > 100.0 => penalize(30, "high router latency"),
        Some(r) if r > 50.0 => penalize(15, "moderate router latency"),
        _ => {}
    }
    match internet_latency {
        Some(i) if i > 200.0 => penalize(20, "high internet latency"),
        Some(i) if i > 100.0 => penalize(10, "moderate internet latency"),
        _ => {}
    }
    match signal_dbm {
        Some(s) if s < -80 => penalize(25, "weak WiFi signal"),
        Some(s) if s < -70 => penalize(10, "fair WiFi signal"),
        _ => {}
    }
    if packet_loss.is_some_and(|l| l > 5.0) {
        penalize(20, "packet loss");
    }

    HealthScore {
        score: total.clamp(0, 100) as u8,
        explanation: if penalties.is_empty() {
            "Network performing well".to_string()
        } else {
            penalties.join(", ")
        },
    }
}

/// External free-text generator.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, prompt: &str) -> anyhow::Result<String>;
}

#[derive(Clone, Default)]
pub struct HealthScorer {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl HealthScorer {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    pub fn rule_based() -> Self {
        Self::default()
    }

    pub async fn score(&self, metrics: &DerivedMetrics) -> HealthScore {
        let fallback = || {
            score(
                metrics.router_latency,
                metrics.internet_latency,
                metrics.signal_dbm,
                metrics.packet_loss,
            )
        };
        let Some(generator) = &self.generator else {
            return fallback();
        };

        match generator.generate_text(&scoring_prompt(metrics)).await {
            Ok(reply) => parse_generated_score(&reply).unwrap_or_else(|| {
                debug!(reply = %reply.chars().take(80).collect::<String>(), "unusable score reply");
                let mut s = fallback();
                s.explanation = format!("Rule-based: {}", s.explanation);
                s
            }),
            Err(e) => {
                warn!(error = %e, operation = "generate_text", "score generation failed");
                fallback()
            }
        }
    }
}

pub fn scoring_prompt(metrics: &DerivedMetrics) -> String {
    let ms = |v: Option<f64>| v.map_or_else(|| "unknown".to_string(), |v| format!("{v:.1}ms"));
    let signal = metrics
        .signal_dbm
        .map_or_else(|| "unknown".to_string(), |d| format!("{d}dBm"));
    format!(
        "Score this network from 0-100.\n\n\
         DATA: Router {}, Internet {}, WiFi {signal}\n\n\
         RULES:\n\
         - 90-100: All metrics excellent\n\
         - 70-89: Good performance\n\
         - 40-69: Fair, has issues\n\
         - 0-39: Poor performance\n\n\
         Reply ONLY with this exact format: NUMBER|short explanation\n\n\
         Example: 95|Router 4ms excellent, internet fast, WiFi strong\n",
        ms(metrics.router_latency),
        ms(metrics.internet_latency),
    )
}

fn number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(\d{1,3})\b").unwrap())
}

/// `NUMBER|explanation` first, then the first standalone 0-100 integer with the rest
/// of its line as explanation.
pub fn parse_generated_score(reply: &str) -> Option<HealthScore> {
    let reply = reply.trim();

    if let Some((head, tail)) = reply.split_once('|') {
        let digits: String = head.chars().filter(char::is_ascii_digit).collect();
        if let Ok(value) = digits.parse::<u64>() {
            return Some(HealthScore {
                score: value.min(100) as u8,
                explanation: clean_explanation(tail),
            });
        }
    }

    number_re().captures_iter(reply).find_map(|c| {
        let m = c.get(1)?;
        let value: u8 = m.as_str().parse().ok().filter(|v| *v <= 100)?;
        Some(HealthScore {
            score: value,
            explanation: clean_explanation(&reply[m.end()..]),
        })
    })
}

fn clean_explanation(text: &str) -> String {
    text.replace(['*', '#'], "")
        .trim()
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .chars()
        .take(MAX_EXPLANATION_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipe_format_wins() {
        let s = parse_generated_score("  **85**|Router 4ms, internet fast\nextra").unwrap();
        assert_eq!(s.score, 85);
        assert_eq!(s.explanation, "Router 4ms, internet fast");
    }

    #[test]
    fn first_number_in_range() {
        let s = parse_generated_score("I'd say 250 is too high. Score: 72 - WiFi fair").unwrap();
        assert_eq!(s.score, 72);
        assert_eq!(s.explanation, "- WiFi fair");
    }

    #[test]
    fn pipe_score_is_clamped() {
        assert_eq!(parse_generated_score("140|great").unwrap().score, 100);
    }

    #[test]
    fn nothing_usable() {
        assert_eq!(parse_generated_score("The network looks fine."), None);
        assert_eq!(parse_generated_score(""), None);
    }
}
