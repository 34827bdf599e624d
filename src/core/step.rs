//! Deployment step classification.
//!
//! Maps free-text task names onto the five logical stages of an infrastructure
//! rollout. Matching is a case-insensitive substring scan over a fixed keyword
//! table; the first step in table order wins when keywords overlap.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A logical deployment stage tracked by the bridge server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    Route53,
    LoadBalancer,
    K8sService,
    Ingress,
    DomainMapping,
}

/// Keyword sets per step. Order is the tie-break: `dns_mapping` contains `dns`,
/// so it classifies as `route53`.
const STEP_KEYWORDS: &[(StepId, &[&str])] = &[
    (StepId::Route53, &["route53", "dns"]),
    (StepId::LoadBalancer, &["lb", "load_balancer", "alb", "elb"]),
    (
        StepId::K8sService,
        &["service", "k8s_service", "kubernetes_service"],
    ),
    (StepId::Ingress, &["ingress", "k8s_ingress"]),
    (StepId::DomainMapping, &["domain", "mapping", "dns_mapping"]),
];

impl StepId {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepId::Route53 => "route53",
            StepId::LoadBalancer => "load_balancer",
            StepId::K8sService => "k8s_service",
            StepId::Ingress => "ingress",
            StepId::DomainMapping => "domain_mapping",
        }
    }

    /// All steps in classification order.
    pub fn all() -> impl Iterator<Item = StepId> {
        STEP_KEYWORDS.iter().map(|(step, _)| *step)
    }

    pub fn keywords(&self) -> &'static [&'static str] {
        STEP_KEYWORDS
            .iter()
            .find(|(step, _)| step == self)
            .map(|(_, keywords)| *keywords)
            .unwrap_or(&[])
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        StepId::all()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| {
                Error::validation_invalid_argument(
                    "step",
                    format!("Unknown deployment step '{}'", s),
                    Some(s.to_string()),
                    Some(StepId::all().map(|step| step.as_str().to_string()).collect()),
                )
            })
    }
}

/// Classify a task name into a deployment step.
///
/// Returns `None` for tasks unrelated to step tracking (smoke tests, fact
/// gathering, etc.), which is the common case.
pub fn classify(task_name: &str) -> Option<StepId> {
    let lowered = task_name.to_lowercase();

    STEP_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| lowered.contains(keyword)))
        .map(|(step, _)| *step)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dns_in_any_case_is_route53() {
        assert_eq!(classify("Configure Route53 DNS records"), Some(StepId::Route53));
        assert_eq!(classify("update dns"), Some(StepId::Route53));
        assert_eq!(classify("UPDATE DNS ZONE"), Some(StepId::Route53));
        assert_eq!(classify("Wait for Dns propagation"), Some(StepId::Route53));
    }

    #[test]
    fn each_step_matches_its_own_keywords() {
        assert_eq!(classify("Create ALB"), Some(StepId::LoadBalancer));
        assert_eq!(classify("Apply k8s_service manifest"), Some(StepId::K8sService));
        assert_eq!(classify("Deploy ingress controller"), Some(StepId::Ingress));
        assert_eq!(classify("Attach custom domain"), Some(StepId::DomainMapping));
    }

    #[test]
    fn unrelated_tasks_do_not_match() {
        assert_eq!(classify("Run smoke tests"), None);
        assert_eq!(classify("Gathering Facts"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn overlapping_keywords_resolve_to_earlier_step() {
        // "dns_mapping" is a domain_mapping keyword but contains "dns".
        assert_eq!(classify("Apply dns_mapping"), Some(StepId::Route53));
        // "ingress service" hits k8s_service before ingress.
        assert_eq!(classify("Create ingress service"), Some(StepId::K8sService));
        // "elb" before "domain".
        assert_eq!(classify("Point domain at ELB"), Some(StepId::LoadBalancer));
    }

    #[test]
    fn short_keywords_match_inside_words() {
        // "lb" is a plain substring check, so it fires inside unrelated words.
        assert_eq!(classify("Install bulb exporter"), Some(StepId::LoadBalancer));
    }

    #[test]
    fn step_id_parses_from_wire_name() {
        assert_eq!("k8s_service".parse::<StepId>().unwrap(), StepId::K8sService);
        let err = "database".parse::<StepId>().unwrap_err();
        assert_eq!(err.code.as_str(), "validation.invalid_argument");
    }

    #[test]
    fn step_id_serializes_as_snake_case() {
        let json = serde_json::to_string(&StepId::DomainMapping).unwrap();
        assert_eq!(json, "\"domain_mapping\"");
        assert_eq!(StepId::LoadBalancer.keywords(), &["lb", "load_balancer", "alb", "elb"]);
        assert_eq!(StepId::all().count(), 5);
    }
}
