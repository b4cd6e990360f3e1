//! Canned data for the scripted payment-service outage.

use crate::report::{
    ActionItem, ActionState, BusinessImpact, Hypothesis, IncidentRecord, Resolution,
};
use crate::AgentId::{Commander, Diagnose, Impact, Monitor};
use crate::EntryKind::{Active, Completed, Error};
use crate::{Service, ServiceStatus, Tier, TimelineEntry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub healthy: Vec<Service>,
    pub incident_roster: Vec<Service>,
    pub timeline: Vec<TimelineEntry>,
    pub incident: IncidentRecord,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::payment_outage()
    }
}

impl Scenario {
    pub fn payment_outage() -> Self {
        Self {
            healthy: healthy_roster(),
            incident_roster: incident_roster(),
            timeline: timeline(),
            incident: incident_record(),
        }
    }

    /// Tier of a roster member, used to decorate rows that arrive without one.
    pub fn tier_of(&self, name: &str) -> Option<Tier> {
        self.healthy
            .iter()
            .find(|service| service.name == name)
            .map(|service| service.tier)
    }

    /// Name of the first degraded service in the incident snapshot.
    pub fn affected_service(&self) -> &str {
        self.incident_roster
            .iter()
            .find(|service| service.status == ServiceStatus::Degraded)
            .map(|service| service.name.as_str())
            .unwrap_or(self.incident.service.as_str())
    }
}

fn healthy_roster() -> Vec<Service> {
    use ServiceStatus::Healthy;
    vec![
        Service::new("payment-service", Tier::Critical, 38, 42, Healthy),
        Service::new("user-api", Tier::High, 35, 52, Healthy),
        Service::new("product-catalog", Tier::High, 28, 45, Healthy),
        Service::new("notification-svc", Tier::Medium, 22, 38, Healthy),
        Service::new("search-service", Tier::Medium, 41, 55, Healthy),
        Service::new("auth-service", Tier::Critical, 38, 48, Healthy),
        Service::new("order-processing", Tier::Critical, 43, 51, Healthy),
        Service::new("inventory-svc", Tier::High, 31, 44, Healthy),
    ]
}

fn incident_roster() -> Vec<Service> {
    use ServiceStatus::{Degraded, Healthy, Warning};
    vec![
        Service::new("payment-service", Tier::Critical, 92, 88, Degraded),
        Service::new("user-api", Tier::High, 35, 52, Healthy),
        Service::new("product-catalog", Tier::High, 28, 45, Healthy),
        Service::new("notification-svc", Tier::Medium, 22, 38, Healthy),
        Service::new("search-service", Tier::Medium, 41, 55, Healthy),
        Service::new("auth-service", Tier::Critical, 38, 48, Healthy),
        Service::new("order-processing", Tier::Critical, 67, 72, Warning),
        Service::new("inventory-svc", Tier::High, 31, 44, Healthy),
    ]
}

fn timeline() -> Vec<TimelineEntry> {
    vec![
        TimelineEntry::new(
            "14:32:15",
            Monitor,
            "Monitor Agent - Scanning all services for anomalies...",
            Active,
            500,
        ),
        TimelineEntry::new(
            "14:32:18",
            Monitor,
            "ES|QL STATS avg_cpu, max_cpu BY service.name -> 8 services scanned",
            Completed,
            2000,
        ),
        TimelineEntry::new(
            "14:32:19",
            Monitor,
            "CRITICAL: payment-service - CPU 92%, Memory 88%, Error rate 34%",
            Error,
            1500,
        ),
        TimelineEntry::new(
            "14:32:20",
            Monitor,
            "WARNING: order-processing - CPU 67%, cascading failures detected",
            Active,
            1000,
        ),
        TimelineEntry::new(
            "14:32:22",
            Diagnose,
            "Diagnose Agent - Investigating payment-service root cause...",
            Active,
            1500,
        ),
        TimelineEntry::new(
            "14:32:25",
            Diagnose,
            "ES|QL correlate_logs_and_errors -> 847 errors in last 40min, 12 unique error codes",
            Completed,
            2000,
        ),
        TimelineEntry::new(
            "14:32:27",
            Diagnose,
            "ES|QL check_recent_deployments -> v2.4.2 deployed at 14:32, error onset at 14:34",
            Completed,
            1500,
        ),
        TimelineEntry::new(
            "14:32:30",
            Diagnose,
            "Vector Search -> Found similar incident INC-2026-001 (connection pool exhaustion, 92% match)",
            Completed,
            2000,
        ),
        TimelineEntry::new(
            "14:32:33",
            Diagnose,
            "Hypothesis A (87%): Bad deployment v2.4.2 caused DB connection pool exhaustion",
            Active,
            1500,
        ),
        TimelineEntry::new(
            "14:32:34",
            Diagnose,
            "Hypothesis B (42%): Database performance degradation under load",
            Active,
            1000,
        ),
        TimelineEntry::new(
            "14:32:36",
            Impact,
            "Impact Agent - Calculating business impact...",
            Active,
            1500,
        ),
        TimelineEntry::new(
            "14:32:38",
            Impact,
            "ES|QL calculate_business_impact -> Revenue loss: $12,450/hour",
            Error,
            2000,
        ),
        TimelineEntry::new(
            "14:32:39",
            Impact,
            "Priority: P0-CRITICAL - Transaction drop: 73%, Active users: -61%",
            Error,
            1500,
        ),
        TimelineEntry::new(
            "14:32:42",
            Commander,
            "Commander Agent - Evaluating hypotheses and taking action...",
            Active,
            1500,
        ),
        TimelineEntry::new(
            "14:32:44",
            Commander,
            "Decision: Choosing Hypothesis A (87%) - deployment timestamp matches error onset exactly, confirmed by INC-2026-001 precedent",
            Completed,
            2500,
        ),
        TimelineEntry::new(
            "14:32:46",
            Commander,
            "Workflow: create-incident-ticket -> Ticket OPS-20260225-143246 created",
            Completed,
            1500,
        ),
        TimelineEntry::new(
            "14:32:47",
            Commander,
            "Workflow: notify-team -> Alert sent to ops-critical channel",
            Completed,
            1000,
        ),
        TimelineEntry::new(
            "14:32:48",
            Commander,
            "Recommendation: Rollback to v2.4.1 + increase connection pool to 100",
            Completed,
            1500,
        ),
        TimelineEntry::new(
            "14:32:50",
            Commander,
            "Incident Report generated - Total resolution time: 1 minute 42 seconds (vs 2.5 hours industry average)",
            Completed,
            2000,
        ),
    ]
}

fn incident_record() -> IncidentRecord {
    IncidentRecord {
        id: "OPS-20260225-143246".to_string(),
        severity: "CRITICAL".to_string(),
        service: "payment-service".to_string(),
        detected_at: "14:32:19 UTC".to_string(),
        hypotheses: vec![
            Hypothesis {
                label: "A".to_string(),
                title: "Bad Deployment".to_string(),
                confidence: 87,
                accepted: true,
                evidence: "Deployment v2.4.2 at 14:32 matches error onset at 14:34. \
                           DB_CONN_TIMEOUT errors match INC-2026-001 pattern \
                           (connection pool exhaustion after config reset)."
                    .to_string(),
            },
            Hypothesis {
                label: "B".to_string(),
                title: "Database Load".to_string(),
                confidence: 42,
                accepted: false,
                evidence: "DB metrics show elevated queries but timing doesn't match. \
                           Load increase started AFTER errors, not before."
                    .to_string(),
            },
        ],
        impact: BusinessImpact {
            revenue_loss_per_hour: 12_450,
            transaction_drop_pct: -73,
            users_affected: 486,
            projected_hours: 4,
        },
        actions: vec![
            ActionItem {
                label: "Ticket Created".to_string(),
                value: "OPS-20260225".to_string(),
                state: ActionState::Done,
            },
            ActionItem {
                label: "Team Notified".to_string(),
                value: "ops-critical".to_string(),
                state: ActionState::Done,
            },
            ActionItem {
                label: "Recommended".to_string(),
                value: "Rollback v2.4.1".to_string(),
                state: ActionState::Recommended,
            },
        ],
        resolution: Resolution {
            mttr: "1m 42s".to_string(),
            industry_average: "2.5 hours".to_string(),
            industry_average_short: "2.5hr".to_string(),
        },
    }
}
