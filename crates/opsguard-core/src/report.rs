//! Incident report record and the phase-dependent view derived from it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Hypothesis {
    pub label: String,
    pub title: String,
    pub confidence: u8,
    pub accepted: bool,
    pub evidence: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BusinessImpact {
    pub revenue_loss_per_hour: u64,
    pub transaction_drop_pct: i32,
    pub users_affected: u64,
    pub projected_hours: u64,
}

impl BusinessImpact {
    pub fn projected_loss(&self) -> u64 {
        self.revenue_loss_per_hour * self.projected_hours
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActionState {
    Done,
    Recommended,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionItem {
    pub label: String,
    pub value: String,
    pub state: ActionState,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resolution {
    pub mttr: String,
    pub industry_average: String,
    /// Compact form used on the MTTR card.
    pub industry_average_short: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IncidentRecord {
    pub id: String,
    pub severity: String,
    pub service: String,
    pub detected_at: String,
    pub hypotheses: Vec<Hypothesis>,
    pub impact: BusinessImpact,
    pub actions: Vec<ActionItem>,
    pub resolution: Resolution,
}

impl IncidentRecord {
    pub fn primary_hypothesis(&self) -> Option<&Hypothesis> {
        self.hypotheses.iter().find(|h| h.accepted)
    }

    pub fn view(&self, stage: ReportStage) -> ReportView {
        ReportView::derive(self, stage)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportStage {
    #[default]
    Empty,
    Detecting,
    Impact,
    Actions,
    Complete,
}

impl ReportStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStage::Empty => "empty",
            ReportStage::Detecting => "detecting",
            ReportStage::Impact => "impact",
            ReportStage::Actions => "actions",
            ReportStage::Complete => "complete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDetails {
    pub id: String,
    pub severity: String,
    pub service: String,
    pub detected_at: String,
}

/// What the report panel shows for a given stage. `details == None` means
/// the "no active incidents" placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportView {
    pub stage: ReportStage,
    pub details: Option<ReportDetails>,
    pub analyzing: bool,
    pub hypotheses: Vec<Hypothesis>,
    pub impact: Option<BusinessImpact>,
    pub show_projection: bool,
    pub actions: Vec<ActionItem>,
    pub resolution: Option<Resolution>,
}

impl ReportView {
    pub fn placeholder() -> Self {
        Self::default()
    }

    pub fn is_placeholder(&self) -> bool {
        self.details.is_none()
    }

    fn derive(record: &IncidentRecord, stage: ReportStage) -> Self {
        if stage == ReportStage::Empty {
            return Self::placeholder();
        }

        let mut view = ReportView {
            stage,
            details: Some(ReportDetails {
                id: record.id.clone(),
                severity: record.severity.clone(),
                service: record.service.clone(),
                detected_at: record.detected_at.clone(),
            }),
            ..Self::default()
        };

        match stage {
            ReportStage::Empty | ReportStage::Detecting => {}
            ReportStage::Impact | ReportStage::Actions => {
                view.analyzing = true;
                view.hypotheses = record.primary_hypothesis().cloned().into_iter().collect();
                view.impact = Some(record.impact.clone());
                if stage == ReportStage::Actions {
                    view.actions = record.actions.clone();
                }
            }
            ReportStage::Complete => {
                view.hypotheses = record.hypotheses.clone();
                view.impact = Some(record.impact.clone());
                view.show_projection = true;
                view.actions = record.actions.clone();
                view.resolution = Some(record.resolution.clone());
            }
        }
        view
    }
}

/// `12450` -> `12,450`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Scenario;

    #[test]
    fn empty_stage_is_placeholder() {
        let record = Scenario::payment_outage().incident;
        assert!(record.view(ReportStage::Empty).is_placeholder());
    }

    #[test]
    fn partial_stages_reveal_progressively() {
        let record = Scenario::payment_outage().incident;

        let detecting = record.view(ReportStage::Detecting);
        assert!(detecting.details.is_some());
        assert!(detecting.hypotheses.is_empty());
        assert!(detecting.impact.is_none());
        assert!(!detecting.analyzing);

        let impact = record.view(ReportStage::Impact);
        assert_eq!(impact.hypotheses.len(), 1);
        assert!(impact.hypotheses[0].accepted);
        assert!(impact.impact.is_some());
        assert!(impact.analyzing);
        assert!(impact.actions.is_empty());
        assert!(!impact.show_projection);

        let actions = record.view(ReportStage::Actions);
        assert_eq!(actions.actions.len(), 3);
        assert!(actions.resolution.is_none());
    }

    #[test]
    fn complete_stage_shows_everything() {
        let record = Scenario::payment_outage().incident;
        let full = record.view(ReportStage::Complete);
        assert_eq!(full.hypotheses.len(), 2);
        assert!(full.show_projection);
        assert_eq!(
            full.resolution.as_ref().map(|r| r.mttr.as_str()),
            Some("1m 42s")
        );
        assert_eq!(full.impact.map(|i| i.projected_loss()), Some(49_800));
    }

    #[test]
    fn thousands_are_grouped() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(12_450), "12,450");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }
}
