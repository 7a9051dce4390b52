// Collect -> classify -> (conditionally) diagnose.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::classifier::classify;
use crate::collector::MetricCollector;
use crate::config::{AppConfig, Thresholds};
use crate::diagnoser::{self, DerivedMetrics};
use crate::diagnostics::DiagnosticRunner;
use crate::models::*;
use crate::probes::{CommandRunner, NetworkProbes};
use crate::scoring::{HealthScorer, TextGenerator};

/// One monitoring cycle: the assessment, plus a diagnosis when it was not healthy.
#[derive(Debug, Clone, Serialize)]
pub struct CycleOutcome {
    pub assessment: HealthAssessment,
    pub diagnosis: Option<Diagnosis>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PipelineStats {
    pub checks_run: u64,
    pub diagnoses_run: u64,
}

pub struct Pipeline {
    collector: MetricCollector,
    diagnostics: DiagnosticRunner,
    scorer: HealthScorer,
    thresholds: Thresholds,
    latest_diagnosis: RwLock<Option<Diagnosis>>,
    checks_run: AtomicU64,
    diagnoses_run: AtomicU64,
}

impl Pipeline {
    pub fn new(
        config: &AppConfig,
        runner: Arc<dyn CommandRunner>,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        let probes = NetworkProbes::new(runner, config.probes.clone());
        Self {
            collector: MetricCollector::new(
                probes.clone(),
                config.network.clone(),
                &config.probes,
                config.monitoring.history_capacity,
            ),
            diagnostics: DiagnosticRunner::new(probes, config.network.clone()),
            scorer: HealthScorer::new(generator),
            thresholds: config.thresholds.clone(),
            latest_diagnosis: RwLock::new(None),
            checks_run: AtomicU64::new(0),
            diagnoses_run: AtomicU64::new(0),
        }
    }

    pub async fn check_once(&self) -> HealthAssessment {
        let snapshot = self.collector.collect().await;
        self.checks_run.fetch_add(1, Ordering::Relaxed);
        classify(&snapshot, &self.thresholds)
    }

    /// Full triage for an assessment, whatever its status.
    #[instrument(skip(self, assessment), fields(status = %assessment.status, operation = "diagnose"))]
    pub async fn diagnose(&self, assessment: &HealthAssessment) -> Diagnosis {
        let snapshot = &assessment.metrics;
        let current_channel = snapshot.signal.channel.filter(|_| snapshot.signal.success);
        let tools = self
            .diagnostics
            .run_with(
                &self.collector.network().interface,
                snapshot.gateway_ip(),
                current_channel,
            )
            .await;

        let mut diagnosis = diagnoser::diagnose(snapshot, assessment.status, &tools);
        let score = self
            .scorer
            .score(&DerivedMetrics::derive(snapshot, &tools))
            .await;
        diagnosis.network_health_score = Some(score.score);
        diagnosis.score_explanation = Some(score.explanation);

        self.diagnoses_run.fetch_add(1, Ordering::Relaxed);
        info!(
            primary_issue = %diagnosis.primary_issue,
            confidence = ?diagnosis.confidence,
            health_score = score.score,
            "diagnosis complete"
        );
        *self.latest_diagnosis.write().await = Some(diagnosis.clone());
        diagnosis
    }

    pub async fn run_cycle(&self) -> CycleOutcome {
        let assessment = self.check_once().await;
        let diagnosis = if assessment.status == Status::Healthy {
            None
        } else {
            Some(self.diagnose(&assessment).await)
        };
        CycleOutcome {
            assessment,
            diagnosis,
        }
    }

    pub async fn history(&self, limit: usize) -> Vec<Snapshot> {
        self.collector.history(limit).await
    }

    pub async fn latest_diagnosis(&self) -> Option<Diagnosis> {
        self.latest_diagnosis.read().await.clone()
    }

    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            checks_run: self.checks_run.load(Ordering::Relaxed),
            diagnoses_run: self.diagnoses_run.load(Ordering::Relaxed),
        }
    }

    pub fn interface(&self) -> &str {
        &self.collector.network().interface
    }
}
