// Health score: deterministic fallback and the text-generator seam

use async_trait::async_trait;
use netsentinel::diagnoser::DerivedMetrics;
use netsentinel::scoring::{HealthScorer, TextGenerator, score, scoring_prompt};
use std::sync::{Arc, Mutex};

#[test]
fn test_fallback_score_stacks_penalties() {
    let s = score(Some(120.0), Some(250.0), Some(-85), Some(10.0));
    assert_eq!(s.score, 5);
    assert_eq!(
        s.explanation,
        "high router latency, high internet latency, weak WiFi signal, packet loss"
    );
}

#[test]
fn test_fallback_score_moderate_tiers() {
    let s = score(Some(60.0), Some(150.0), Some(-75), Some(0.0));
    assert_eq!(s.score, 100 - 15 - 10 - 10);
    assert_eq!(
        s.explanation,
        "moderate router latency, moderate internet latency, fair WiFi signal"
    );
}

#[test]
fn test_fallback_score_boundaries_are_exclusive() {
    let s = score(Some(50.0), Some(100.0), Some(-70), Some(5.0));
    assert_eq!(s.score, 100);
    assert_eq!(s.explanation, "Network performing well");
}

#[test]
fn test_unmeasured_inputs_carry_no_penalty() {
    let s = score(None, None, None, None);
    assert_eq!(s.score, 100);
    assert_eq!(s.explanation, "Network performing well");
}

struct CannedGenerator {
    reply: anyhow::Result<String>,
    prompts: Mutex<Vec<String>>,
}

impl CannedGenerator {
    fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            prompts: Mutex::new(vec![]),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: Err(anyhow::anyhow!("model unavailable")),
            prompts: Mutex::new(vec![]),
        })
    }
}

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn generate_text(&self, prompt: &str) -> anyhow::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(e) => Err(anyhow::anyhow!("{e}")),
        }
    }
}

fn degraded_metrics() -> DerivedMetrics {
    DerivedMetrics {
        router_latency: Some(120.0),
        internet_latency: Some(250.0),
        signal_dbm: Some(-85),
        dns_latency: Some(30.0),
        packet_loss: Some(10.0),
    }
}

#[tokio::test]
async fn test_scorer_uses_generated_score() {
    let generator = CannedGenerator::replying("42|Router slow, WiFi weak");
    let scorer = HealthScorer::new(Some(generator.clone() as Arc<dyn TextGenerator>));
    let s = scorer.score(&degraded_metrics()).await;
    assert_eq!(s.score, 42);
    assert_eq!(s.explanation, "Router slow, WiFi weak");
    let prompts = generator.prompts.lock().unwrap();
    assert!(prompts[0].contains("Router 120.0ms, Internet 250.0ms, WiFi -85dBm"));
}

#[tokio::test]
async fn test_scorer_marks_rule_based_fallback_on_unusable_reply() {
    let scorer = HealthScorer::new(Some(
        CannedGenerator::replying("I cannot say.") as Arc<dyn TextGenerator>,
    ));
    let s = scorer.score(&degraded_metrics()).await;
    assert_eq!(s.score, 5);
    assert!(s.explanation.starts_with("Rule-based: high router latency"));
}

#[tokio::test]
async fn test_scorer_falls_back_silently_on_generator_error() {
    let scorer = HealthScorer::new(Some(CannedGenerator::failing() as Arc<dyn TextGenerator>));
    let s = scorer.score(&degraded_metrics()).await;
    assert_eq!(s.score, 5);
    assert!(!s.explanation.starts_with("Rule-based"));
}

#[tokio::test]
async fn test_scorer_without_generator_is_rule_based() {
    let s = HealthScorer::rule_based()
        .score(&DerivedMetrics::default())
        .await;
    assert_eq!(s.score, 100);
}

#[test]
fn test_prompt_marks_unknown_metrics() {
    let prompt = scoring_prompt(&DerivedMetrics::default());
    assert!(prompt.contains("Router unknown, Internet unknown, WiFi unknown"));
    assert!(prompt.contains("NUMBER|short explanation"));
}
