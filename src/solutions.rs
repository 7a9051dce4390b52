// Template solutions: turn a Diagnosis into an ordered, time-estimated fix list.

use serde::{Deserialize, Serialize};

use crate::models::{Confidence, Diagnosis, PrimaryIssue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionCategory {
    HighLatency,
    WeakSignal,
    DnsIssues,
    RouterIssues,
    Interference,
    IspIssues,
    General,
}

/// Solutions for one category, cheapest first.
#[derive(Debug, Clone, Copy)]
pub struct SolutionTemplate {
    pub quick_fixes: &'static [&'static str],
    pub intermediate: &'static [&'static str],
    pub advanced: &'static [&'static str],
}

impl SolutionCategory {
    pub fn for_issue(issue: PrimaryIssue) -> Self {
        match issue {
            PrimaryIssue::HighLocalNetworkLatency => SolutionCategory::HighLatency,
            PrimaryIssue::HighExternalLatency => SolutionCategory::IspIssues,
            PrimaryIssue::ModerateNetworkDegradation => SolutionCategory::Interference,
            PrimaryIssue::NetworkHealthy
            | PrimaryIssue::NetworkStatusUnclear
            | PrimaryIssue::NetworkDegradation => SolutionCategory::General,
        }
    }

    pub fn template(self) -> SolutionTemplate {
        match self {
            SolutionCategory::HighLatency => SolutionTemplate {
                quick_fixes: &[
                    "Restart router by unplugging for 30 seconds",
                    "Move closer to WiFi router if using wireless",
                    "Close bandwidth-heavy applications",
                    "Test with ethernet cable to rule out WiFi issues",
                ],
                intermediate: &[
                    "Check number of connected devices on network",
                    "Switch to 5GHz WiFi band if available",
                    "Update router firmware",
                    "Check for ISP outages on status page",
                ],
                advanced: &[
                    "Enable QoS (Quality of Service) on router",
                    "Contact ISP about line quality",
                    "Upgrade router if 5+ years old",
                    "Consider upgrading internet plan",
                ],
            },
            SolutionCategory::WeakSignal => SolutionTemplate {
                quick_fixes: &[
                    "Move closer to router immediately",
                    "Ensure router antennas are upright",
                    "Remove metal objects between device and router",
                    "Elevate router off the floor",
                ],
                intermediate: &[
                    "Reposition router to central location in home",
                    "Switch to 2.4GHz for better range (if on 5GHz)",
                    "Check for interference from microwaves/baby monitors",
                    "Update WiFi drivers on your device",
                ],
                advanced: &[
                    "Install WiFi extender or mesh system",
                    "Upgrade to router with better antennas",
                    "Use powerline ethernet adapters",
                    "Run ethernet cable if feasible",
                ],
            },
            SolutionCategory::DnsIssues => SolutionTemplate {
                quick_fixes: &[
                    "Change DNS to Google DNS: 8.8.8.8, 8.8.4.4",
                    "Change DNS to Cloudflare: 1.1.1.1, 1.0.0.1",
                    "Flush DNS cache: sudo resolvectl flush-caches",
                    "Restart network service",
                ],
                intermediate: &[
                    "Configure DNS servers in router settings",
                    "Test multiple DNS providers for speed",
                    "Check /etc/resolv.conf for correct DNS entries",
                    "Disable IPv6 if causing conflicts",
                ],
                advanced: &[
                    "Set up local DNS caching with dnsmasq",
                    "Use DNS-over-HTTPS (DoH) for privacy",
                    "Configure backup DNS servers",
                    "Monitor DNS performance with tools",
                ],
            },
            SolutionCategory::RouterIssues => SolutionTemplate {
                quick_fixes: &[
                    "Reboot router (unplug 30 seconds)",
                    "Check all cables are firmly connected",
                    "Ensure router has ventilation (not overheating)",
                    "Check router status lights for errors",
                ],
                intermediate: &[
                    "Update router firmware from admin panel",
                    "Review router logs for error messages",
                    "Disable unused router features",
                    "Reset router to factory defaults (backup first)",
                ],
                advanced: &[
                    "Monitor router CPU/temperature",
                    "Replace router if hardware failing",
                    "Install custom firmware (DD-WRT/OpenWrt)",
                    "Set up backup router",
                ],
            },
            SolutionCategory::Interference => SolutionTemplate {
                quick_fixes: &[
                    "Move router away from microwave and cordless phones",
                    "Switch to 5GHz band (less interference)",
                    "Turn off unused 2.4GHz devices temporarily",
                    "Change WiFi channel in router settings",
                ],
                intermediate: &[
                    "Scan WiFi channels and pick least congested",
                    "Enable 20MHz channel width instead of 40MHz",
                    "Use WiFi analyzer to find interference sources",
                    "Coordinate with neighbors on channel usage",
                ],
                advanced: &[
                    "Install directional antennas",
                    "Deploy mesh WiFi with band steering",
                    "Upgrade to WiFi 6 (better interference handling)",
                    "Use wired backhaul for mesh nodes",
                ],
            },
            SolutionCategory::IspIssues => SolutionTemplate {
                quick_fixes: &[
                    "Check ISP status page for outages",
                    "Restart ISP modem",
                    "Test at different times of day",
                    "Document issue patterns with timestamps",
                ],
                intermediate: &[
                    "Contact ISP tech support with latency data",
                    "Request line quality check from ISP",
                    "Check service agreement for guaranteed speeds",
                    "Test with mobile hotspot to confirm ISP issue",
                ],
                advanced: &[
                    "File formal complaint with ISP",
                    "Document issue over time for evidence",
                    "Consider switching ISP providers",
                    "Contact telecommunications authority if unresolved",
                ],
            },
            SolutionCategory::General => SolutionTemplate {
                quick_fixes: &[
                    "Restart router and modem",
                    "Test with ethernet cable",
                    "Check for software updates",
                    "Monitor issue over time",
                ],
                intermediate: &[
                    "Contact ISP or network admin",
                    "Run extended diagnostics",
                    "Check hardware for failures",
                ],
                advanced: &[
                    "Consider professional network assessment",
                    "Upgrade network hardware",
                    "Implement network monitoring",
                ],
            },
        }
    }
}

fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

/// Keyword priority: quick wins score highest.
pub fn priority(solution: &str) -> u32 {
    let lower = solution.to_lowercase();
    let mut score = 0;
    if contains_any(&lower, &["restart", "reboot", "check", "move", "switch"]) {
        score += 10;
    }
    if contains_any(&lower, &["update", "change", "configure", "contact"]) {
        score += 5;
    }
    if contains_any(&lower, &["upgrade", "replace", "install", "consider"]) {
        score += 2;
    }
    score
}

/// Highest priority first; equal priorities keep their input order.
pub fn prioritize(solutions: &[String]) -> Vec<String> {
    let mut ranked: Vec<&String> = solutions.iter().collect();
    ranked.sort_by_key(|s| std::cmp::Reverse(priority(s)));
    ranked.into_iter().cloned().collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effort {
    Quick,
    Moderate,
    Extensive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeEstimate {
    pub category: Effort,
    pub estimated_time: &'static str,
}

pub fn estimate_resolution_time(solution: &str) -> TimeEstimate {
    let lower = solution.to_lowercase();
    let (category, estimated_time) =
        if contains_any(&lower, &["restart", "reboot", "check", "move", "switch"]) {
            (Effort::Quick, "1-5 minutes")
        } else if contains_any(&lower, &["update", "change", "configure", "scan", "test"]) {
            (Effort::Moderate, "5-20 minutes")
        } else if contains_any(&lower, &["upgrade", "replace", "install", "contact"]) {
            (Effort::Extensive, "20-60 minutes")
        } else {
            (Effort::Moderate, "10-30 minutes")
        };
    TimeEstimate {
        category,
        estimated_time,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    pub action: String,
    pub priority: u32,
    #[serde(flatten)]
    pub estimate: TimeEstimate,
}

/// The parts of a Diagnosis the fix list is built from. A full Diagnosis JSON
/// deserializes into this as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisSummary {
    pub primary_issue: PrimaryIssue,
    #[serde(default)]
    pub root_cause: String,
    #[serde(default = "default_confidence")]
    pub confidence: Confidence,
    #[serde(default)]
    pub evidence: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub network_health_score: Option<u8>,
}

fn default_confidence() -> Confidence {
    Confidence::Low
}

impl From<&Diagnosis> for DiagnosisSummary {
    fn from(d: &Diagnosis) -> Self {
        Self {
            primary_issue: d.primary_issue,
            root_cause: d.root_cause.clone(),
            confidence: d.confidence,
            evidence: d.evidence.clone(),
            recommendations: d.recommendations.clone(),
            network_health_score: d.network_health_score,
        }
    }
}

/// Fix list built from a diagnosis: its own recommendations merged with template
/// quick fixes, then the slower template tiers for reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolutionReport {
    pub issue: PrimaryIssue,
    pub root_cause: String,
    pub confidence: Confidence,
    pub categories: Vec<SolutionCategory>,
    pub solutions: Vec<Solution>,
    pub intermediate: Vec<String>,
    pub advanced: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_score: Option<u8>,
}

impl SolutionReport {
    pub fn from_diagnosis(diagnosis: &Diagnosis) -> Self {
        Self::from_summary(&DiagnosisSummary::from(diagnosis))
    }

    pub fn from_summary(diagnosis: &DiagnosisSummary) -> Self {
        let categories = categories_for(diagnosis);
        let mut actions: Vec<String> = Vec::new();
        let mut intermediate: Vec<String> = Vec::new();
        let mut advanced: Vec<String> = Vec::new();

        // PRIORITY recommendations stay pinned ahead of everything else.
        let (pinned, recommended): (Vec<&String>, Vec<&String>) = diagnosis
            .recommendations
            .iter()
            .partition(|r| r.starts_with("PRIORITY:"));
        let mut candidates: Vec<String> = recommended.into_iter().cloned().collect();

        if diagnosis.primary_issue != PrimaryIssue::NetworkHealthy {
            for template in categories.iter().map(|c| c.template()) {
                candidates.extend(template.quick_fixes.iter().map(|s| s.to_string()));
                push_unique(&mut intermediate, template.intermediate);
                push_unique(&mut advanced, template.advanced);
            }
        }

        for action in pinned
            .into_iter()
            .cloned()
            .chain(prioritize(&dedup(candidates)))
        {
            if !contains_ignore_case(&actions, &action) {
                actions.push(action);
            }
        }

        Self {
            issue: diagnosis.primary_issue,
            root_cause: diagnosis.root_cause.clone(),
            confidence: diagnosis.confidence,
            categories,
            solutions: actions
                .into_iter()
                .map(|action| Solution {
                    priority: priority(&action),
                    estimate: estimate_resolution_time(&action),
                    action,
                })
                .collect(),
            intermediate,
            advanced,
            health_score: diagnosis.network_health_score,
        }
    }
}

/// Primary category first, then any secondary problem the evidence shows.
fn categories_for(diagnosis: &DiagnosisSummary) -> Vec<SolutionCategory> {
    let mut categories = vec![SolutionCategory::for_issue(diagnosis.primary_issue)];
    if diagnosis.primary_issue == PrimaryIssue::NetworkHealthy {
        return categories;
    }
    let mut add = |c: SolutionCategory| {
        if !categories.contains(&c) {
            categories.push(c);
        }
    };
    if diagnosis
        .evidence
        .iter()
        .any(|e| e.starts_with("DNS resolution is slow"))
    {
        add(SolutionCategory::DnsIssues);
    }
    if diagnosis
        .recommendations
        .iter()
        .any(|r| r.starts_with("PRIORITY:"))
    {
        add(SolutionCategory::WeakSignal);
    }
    if diagnosis.primary_issue == PrimaryIssue::HighLocalNetworkLatency {
        add(SolutionCategory::RouterIssues);
    }
    categories
}

fn contains_ignore_case(list: &[String], item: &str) -> bool {
    list.iter().any(|s| s.eq_ignore_ascii_case(item))
}

fn dedup(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !contains_ignore_case(&out, &item) {
            out.push(item);
        }
    }
    out
}

fn push_unique(target: &mut Vec<String>, items: &[&str]) {
    for item in items {
        if !contains_ignore_case(target, item) {
            target.push(item.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_priorities() {
        assert_eq!(priority("Restart router"), 10);
        assert_eq!(priority("Check and update firmware"), 15);
        assert_eq!(priority("Consider switching ISP providers"), 12);
        assert_eq!(priority("Close bandwidth-heavy applications"), 0);
    }

    #[test]
    fn prioritize_is_stable() {
        let input: Vec<String> = ["Elevate router", "Update firmware", "Restart modem", "Run cable"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            prioritize(&input),
            vec!["Restart modem", "Update firmware", "Elevate router", "Run cable"]
        );
    }

    #[test]
    fn time_estimates() {
        assert_eq!(estimate_resolution_time("Reboot router").category, Effort::Quick);
        assert_eq!(
            estimate_resolution_time("Scan WiFi channels").estimated_time,
            "5-20 minutes"
        );
        assert_eq!(
            estimate_resolution_time("Install WiFi extender").category,
            Effort::Extensive
        );
        assert_eq!(
            estimate_resolution_time("Elevate router off the floor").estimated_time,
            "10-30 minutes"
        );
    }
}
