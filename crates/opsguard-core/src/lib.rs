pub mod chart;
pub mod clock;
pub mod orchestrator;
pub mod report;
pub mod scenario;
pub mod surface;
pub mod timer;

pub use chart::{ChartPeriod, MetricSeries};
pub use clock::{Clock, ManualClock, SystemClock};
pub use orchestrator::{Orchestrator, RunState, ScenarioError, ScenarioPhase, ScenarioTiming};
pub use report::{IncidentRecord, ReportStage, ReportView};
pub use scenario::Scenario;
pub use surface::{
    BannerSeverity, CardKind, CardState, CardTone, DataSource, RenderSurface, ViewState,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Critical,
    High,
    Medium,
}

impl Default for Tier {
    fn default() -> Self {
        Self::Medium
    }
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Critical => "critical",
            Tier::High => "high",
            Tier::Medium => "medium",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_lowercase().as_str() {
            "critical" => Ok(Tier::Critical),
            "high" => Ok(Tier::High),
            "medium" => Ok(Tier::Medium),
            other => Err(format!("Unknown tier: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Warning,
    Degraded,
}

impl Default for ServiceStatus {
    fn default() -> Self {
        Self::Healthy
    }
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Healthy => "healthy",
            ServiceStatus::Warning => "warning",
            ServiceStatus::Degraded => "degraded",
        }
    }

    /// Classifies a peak CPU reading the way the live health query does.
    pub fn from_peak_cpu(max_cpu: f64) -> Self {
        if max_cpu > 85.0 {
            ServiceStatus::Degraded
        } else if max_cpu > 65.0 {
            ServiceStatus::Warning
        } else {
            ServiceStatus::Healthy
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Service {
    pub name: String,
    #[serde(default)]
    pub tier: Tier,
    pub cpu: u8,
    pub memory: u8,
    #[serde(default)]
    pub status: ServiceStatus,
}

impl Service {
    pub fn new(name: &str, tier: Tier, cpu: u8, memory: u8, status: ServiceStatus) -> Self {
        Self {
            name: name.to_string(),
            tier,
            cpu,
            memory,
            status,
        }
    }
}

/// Healthy count plus a one-line breakdown, as shown on the services card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterSummary {
    pub healthy: usize,
    pub warning: usize,
    pub degraded: usize,
    pub total: usize,
}

impl RosterSummary {
    pub fn of(services: &[Service]) -> Self {
        let mut summary = RosterSummary {
            healthy: 0,
            warning: 0,
            degraded: 0,
            total: services.len(),
        };
        for service in services {
            match service.status {
                ServiceStatus::Healthy => summary.healthy += 1,
                ServiceStatus::Warning => summary.warning += 1,
                ServiceStatus::Degraded => summary.degraded += 1,
            }
        }
        summary
    }

    pub fn label(&self) -> String {
        format!("{}/{}", self.healthy, self.total)
    }

    pub fn detail(&self) -> String {
        if self.warning == 0 && self.degraded == 0 {
            return "All services nominal".to_string();
        }
        let mut parts = Vec::new();
        if self.degraded > 0 {
            parts.push(format!("{} degraded", self.degraded));
        }
        if self.warning > 0 {
            parts.push(format!("{} warning", self.warning));
        }
        parts.join(", ")
    }

    pub fn is_nominal(&self) -> bool {
        self.healthy == self.total
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum AgentId {
    Monitor,
    Diagnose,
    Impact,
    Commander,
}

impl AgentId {
    pub const ALL: [AgentId; 4] = [
        AgentId::Monitor,
        AgentId::Diagnose,
        AgentId::Impact,
        AgentId::Commander,
    ];

    pub fn index(self) -> usize {
        match self {
            AgentId::Monitor => 0,
            AgentId::Diagnose => 1,
            AgentId::Impact => 2,
            AgentId::Commander => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentId::Monitor => "monitor",
            AgentId::Diagnose => "diagnose",
            AgentId::Impact => "impact",
            AgentId::Commander => "commander",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AgentId::Monitor => "Monitor",
            AgentId::Diagnose => "Diagnose",
            AgentId::Impact => "Impact",
            AgentId::Commander => "Commander",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            AgentId::Monitor => "@",
            AgentId::Diagnose => "%",
            AgentId::Impact => "$",
            AgentId::Commander => "#",
        }
    }

    pub fn is_last(self) -> bool {
        self.index() == AgentId::ALL.len() - 1
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Waiting,
    Active,
    Completed,
}

impl Default for AgentStatus {
    fn default() -> Self {
        Self::Waiting
    }
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Waiting => "waiting",
            AgentStatus::Active => "active",
            AgentStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Agent {
    pub id: AgentId,
    pub status: AgentStatus,
}

impl Agent {
    pub fn waiting(id: AgentId) -> Self {
        Self {
            id,
            status: AgentStatus::Waiting,
        }
    }

    pub fn pipeline() -> [Agent; 4] {
        AgentId::ALL.map(Agent::waiting)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorStatus {
    #[default]
    None,
    Completed,
}

pub const CONNECTOR_COUNT: usize = AgentId::ALL.len() - 1;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Active,
    Completed,
    Error,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Active => "active",
            EntryKind::Completed => "completed",
            EntryKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimelineEntry {
    pub time: String,
    pub agent: AgentId,
    pub content: String,
    pub kind: EntryKind,
    /// Pause before the next entry is appended.
    #[serde(with = "duration_ms")]
    pub delay: Duration,
}

impl TimelineEntry {
    pub fn new(time: &str, agent: AgentId, content: &str, kind: EntryKind, delay_ms: u64) -> Self {
        Self {
            time: time.to_string(),
            agent,
            content: content.to_string(),
            kind,
            delay: Duration::from_millis(delay_ms),
        }
    }

    pub fn rendered(&self) -> String {
        format!("{}  {}", self.time, self.content)
    }
}

pub(crate) mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
