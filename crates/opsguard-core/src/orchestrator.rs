//! Scripted incident scenario driven by an injectable clock.
//!
//! Two schedules run side by side: the phase list (absolute offsets from the
//! start of a run) and the timeline chain (each step schedules the next after
//! its own delay). A loop timer re-runs the scenario every period. All
//! pending callbacks live in one [`TimerQueue`] owned here, so a restart can
//! never leave a stale callback behind.

use crate::clock::Clock;
use crate::report::{group_thousands, ReportStage};
use crate::scenario::Scenario;
use crate::surface::{BannerSeverity, CardKind, CardState, CardTone, RenderSurface, IDLE_BANNER};
use crate::timer::{Lineage, TimerQueue};
use crate::{Agent, AgentId, AgentStatus, ConnectorStatus, RosterSummary, Service, CONNECTOR_COUNT};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

pub const ANOMALY_BANNER: &str = "Anomaly Detected - Agents Responding";
pub const RESPONSE_BANNER: &str = "Commander Agent - Executing Response Plan";
pub const RESOLVED_BANNER: &str = "Incident Resolved - Report Generated";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScenarioError {
    #[error("loop period must be greater than zero")]
    ZeroLoopPeriod,
    #[error("{phase} offset precedes {previous} offset")]
    OffsetsOutOfOrder {
        phase: ScenarioPhase,
        previous: ScenarioPhase,
    },
    #[error("loop period {loop_ms}ms does not outlast the {run_ms}ms scenario")]
    LoopWithinRun { loop_ms: u64, run_ms: u64 },
    #[error("healthy and incident rosters differ at position {index}")]
    RosterMismatch { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioPhase {
    Idle,
    AnomalyDetected,
    IncidentCreated,
    ImpactRevealed,
    ActionsTaken,
    ReportComplete,
}

impl ScenarioPhase {
    pub const ALL: [ScenarioPhase; 6] = [
        ScenarioPhase::Idle,
        ScenarioPhase::AnomalyDetected,
        ScenarioPhase::IncidentCreated,
        ScenarioPhase::ImpactRevealed,
        ScenarioPhase::ActionsTaken,
        ScenarioPhase::ReportComplete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioPhase::Idle => "idle",
            ScenarioPhase::AnomalyDetected => "anomaly-detected",
            ScenarioPhase::IncidentCreated => "incident-created",
            ScenarioPhase::ImpactRevealed => "impact-revealed",
            ScenarioPhase::ActionsTaken => "actions-taken",
            ScenarioPhase::ReportComplete => "report-complete",
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            ScenarioPhase::Idle => Some(ScenarioPhase::AnomalyDetected),
            ScenarioPhase::AnomalyDetected => Some(ScenarioPhase::IncidentCreated),
            ScenarioPhase::IncidentCreated => Some(ScenarioPhase::ImpactRevealed),
            ScenarioPhase::ImpactRevealed => Some(ScenarioPhase::ActionsTaken),
            ScenarioPhase::ActionsTaken => Some(ScenarioPhase::ReportComplete),
            ScenarioPhase::ReportComplete => None,
        }
    }
}

impl fmt::Display for ScenarioPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioTiming {
    #[serde(rename = "anomaly_detected_ms", with = "crate::duration_ms")]
    pub anomaly_detected: Duration,
    #[serde(rename = "incident_created_ms", with = "crate::duration_ms")]
    pub incident_created: Duration,
    #[serde(rename = "impact_revealed_ms", with = "crate::duration_ms")]
    pub impact_revealed: Duration,
    #[serde(rename = "actions_taken_ms", with = "crate::duration_ms")]
    pub actions_taken: Duration,
    #[serde(rename = "report_complete_ms", with = "crate::duration_ms")]
    pub report_complete: Duration,
    #[serde(rename = "loop_period_ms", with = "crate::duration_ms")]
    pub loop_period: Duration,
    /// Pause between the timeline starting and its first entry.
    #[serde(rename = "timeline_lead_in_ms", with = "crate::duration_ms")]
    pub timeline_lead_in: Duration,
}

impl Default for ScenarioTiming {
    fn default() -> Self {
        Self {
            anomaly_detected: Duration::from_secs(3),
            incident_created: Duration::from_secs(5),
            impact_revealed: Duration::from_secs(7),
            actions_taken: Duration::from_secs(9),
            report_complete: Duration::from_secs(10),
            loop_period: Duration::from_secs(30),
            timeline_lead_in: Duration::from_millis(300),
        }
    }
}

impl ScenarioTiming {
    pub fn offset(&self, phase: ScenarioPhase) -> Duration {
        match phase {
            ScenarioPhase::Idle => Duration::ZERO,
            ScenarioPhase::AnomalyDetected => self.anomaly_detected,
            ScenarioPhase::IncidentCreated => self.incident_created,
            ScenarioPhase::ImpactRevealed => self.impact_revealed,
            ScenarioPhase::ActionsTaken => self.actions_taken,
            ScenarioPhase::ReportComplete => self.report_complete,
        }
    }

    pub fn with_loop_period(mut self, period: Duration) -> Self {
        self.loop_period = period;
        self
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.loop_period.is_zero() {
            return Err(ScenarioError::ZeroLoopPeriod);
        }
        for pair in ScenarioPhase::ALL.windows(2) {
            if self.offset(pair[1]) < self.offset(pair[0]) {
                return Err(ScenarioError::OffsetsOutOfOrder {
                    phase: pair[1],
                    previous: pair[0],
                });
            }
        }
        // an equal deadline would fire the loop reset in the same poll as
        // ReportComplete, so the final phase would never be drawn
        if self.loop_period <= self.report_complete {
            return Err(ScenarioError::LoopWithinRun {
                loop_ms: self.loop_period.as_millis() as u64,
                run_ms: self.report_complete.as_millis() as u64,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Never started.
    Inactive,
    /// A delayed start is armed.
    Pending,
    Running,
    /// Stopped mid-run; view-state is frozen.
    Halted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerAction {
    Start,
    Loop,
    Phase(ScenarioPhase),
    TimelineStep,
}

pub struct Orchestrator<C: Clock> {
    clock: C,
    scenario: Scenario,
    timing: ScenarioTiming,
    timers: TimerQueue<TimerAction>,
    state: RunState,
    phase: Option<ScenarioPhase>,
    services: Vec<Service>,
    agents: [Agent; 4],
    connectors: [ConnectorStatus; CONNECTOR_COUNT],
    timeline_index: usize,
    report_stage: ReportStage,
    runs: u64,
}

impl<C: Clock> Orchestrator<C> {
    pub fn new(
        scenario: Scenario,
        timing: ScenarioTiming,
        clock: C,
    ) -> Result<Self, ScenarioError> {
        timing.validate()?;
        check_rosters(&scenario)?;
        Ok(Self::build(scenario, timing, clock))
    }

    /// Default payment-outage script with default timing.
    pub fn with_clock(clock: C) -> Self {
        Self::build(Scenario::payment_outage(), ScenarioTiming::default(), clock)
    }

    fn build(scenario: Scenario, timing: ScenarioTiming, clock: C) -> Self {
        Self {
            clock,
            services: scenario.healthy.clone(),
            scenario,
            timing,
            timers: TimerQueue::new(),
            state: RunState::Inactive,
            phase: None,
            agents: Agent::pipeline(),
            connectors: [ConnectorStatus::None; CONNECTOR_COUNT],
            timeline_index: 0,
            report_stage: ReportStage::Empty,
            runs: 0,
        }
    }

    /// Cancels whatever is in flight, runs the scenario from now and arms the
    /// loop trigger.
    pub fn start<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) {
        let now = self.clock.now();
        self.begin(now, surface);
    }

    /// Arms a single delayed [`start`](Self::start). Any run in flight is
    /// cancelled but its view-state is left alone until the start fires.
    pub fn start_after(&mut self, delay: Duration) {
        let cancelled = self.cancel_all();
        let at = self.clock.now() + delay;
        self.timers.schedule(at, Lineage::Loop, TimerAction::Start);
        self.state = RunState::Pending;
        debug!(delay_ms = delay.as_millis() as u64, cancelled, "scenario start armed");
    }

    /// Cancels every pending timer. View-state freezes where it is.
    pub fn stop(&mut self) {
        let cancelled = self.cancel_all();
        if self.state != RunState::Inactive {
            self.state = RunState::Halted;
        }
        info!(cancelled, phase = ?self.phase, "scenario stopped");
    }

    /// Applies the idle phase now and schedules the remaining phases from the
    /// same reference. Leaves the loop trigger untouched.
    pub fn run_scenario<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) {
        let now = self.clock.now();
        self.state = RunState::Running;
        self.run_scenario_at(now, surface);
    }

    /// Fires every timer due at or before the clock's current reading and
    /// returns how many fired. Each callback sees its own deadline as "now",
    /// so follow-up timers keep their cadence even when polled late.
    pub fn poll<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) -> usize {
        let now = self.clock.now();
        let mut fired = 0;
        while let Some((at, action)) = self.timers.pop_due(now) {
            fired += 1;
            match action {
                TimerAction::Start => self.begin(at, surface),
                TimerAction::Loop => {
                    self.run_scenario_at(at, surface);
                    self.timers
                        .schedule(at + self.timing.loop_period, Lineage::Loop, TimerAction::Loop);
                }
                TimerAction::Phase(phase) => self.apply_phase(phase, at, surface),
                TimerAction::TimelineStep => self.timeline_step(at, surface),
            }
        }
        fired
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn phase(&self) -> Option<ScenarioPhase> {
        self.phase
    }

    pub fn runs(&self) -> u64 {
        self.runs
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Time until the next timer is due, zero if one is already overdue.
    pub fn time_until_next(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.timers
            .next_deadline()
            .map(|at| at.saturating_sub(now))
    }

    pub fn timeline_len(&self) -> usize {
        self.timeline_index
    }

    /// True while a timeline step is pending.
    pub fn is_timeline_running(&self) -> bool {
        self.timers.count(Lineage::Timeline) > 0
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn connectors(&self) -> &[ConnectorStatus] {
        &self.connectors
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn report_stage(&self) -> ReportStage {
        self.report_stage
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn timing(&self) -> &ScenarioTiming {
        &self.timing
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn cancel_all(&mut self) -> usize {
        self.timers.clear()
    }

    fn begin<S: RenderSurface + ?Sized>(&mut self, at: Duration, surface: &mut S) {
        let cancelled = self.cancel_all();
        self.state = RunState::Running;
        info!(
            at_ms = at.as_millis() as u64,
            cancelled,
            loop_ms = self.timing.loop_period.as_millis() as u64,
            "scenario started"
        );
        self.run_scenario_at(at, surface);
        self.timers
            .schedule(at + self.timing.loop_period, Lineage::Loop, TimerAction::Loop);
    }

    fn run_scenario_at<S: RenderSurface + ?Sized>(&mut self, at: Duration, surface: &mut S) {
        self.runs += 1;
        self.reset_to_idle(surface);
        for phase in ScenarioPhase::ALL.into_iter().skip(1) {
            let deadline = at + self.timing.offset(phase);
            self.timers
                .schedule(deadline, Lineage::Phase, TimerAction::Phase(phase));
        }
        debug!(run = self.runs, at_ms = at.as_millis() as u64, "scenario run scheduled");
    }

    fn reset_to_idle<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) {
        self.timers.cancel_lineage(Lineage::Phase);
        self.timers.cancel_lineage(Lineage::Timeline);

        self.services = self.scenario.healthy.clone();
        surface.render_services(&self.services);
        surface.render_card(
            CardKind::Services,
            &CardState::services(&RosterSummary::of(&self.services)),
        );
        for kind in [CardKind::Incidents, CardKind::Revenue, CardKind::Mttr] {
            surface.render_card(kind, &CardState::idle(kind));
        }
        surface.set_banner(IDLE_BANNER, BannerSeverity::Nominal);

        self.reset_pipeline(surface);

        self.report_stage = ReportStage::Empty;
        surface.render_report(&self.scenario.incident.view(ReportStage::Empty));
        self.phase = Some(ScenarioPhase::Idle);
    }

    fn reset_pipeline<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) {
        self.agents = Agent::pipeline();
        surface.render_agents(&self.agents);
        for index in 0..CONNECTOR_COUNT {
            self.connectors[index] = ConnectorStatus::None;
            surface.set_connector(index, ConnectorStatus::None);
        }
        self.timeline_index = 0;
        surface.render_timeline(&[]);
    }

    fn apply_phase<S: RenderSurface + ?Sized>(
        &mut self,
        phase: ScenarioPhase,
        at: Duration,
        surface: &mut S,
    ) {
        debug!(phase = phase.as_str(), at_ms = at.as_millis() as u64, "scenario phase");
        self.phase = Some(phase);
        match phase {
            ScenarioPhase::Idle => self.reset_to_idle(surface),
            ScenarioPhase::AnomalyDetected => {
                self.services = self.scenario.incident_roster.clone();
                surface.render_services(&self.services);
                surface.set_banner(ANOMALY_BANNER, BannerSeverity::Critical);
                surface.render_card(
                    CardKind::Services,
                    &CardState::services(&RosterSummary::of(&self.services)),
                );
            }
            ScenarioPhase::IncidentCreated => {
                let detail = format!("CRITICAL: {}", self.scenario.affected_service());
                surface.render_card(
                    CardKind::Incidents,
                    &CardState::new("1", detail, CardTone::Warning),
                );
                self.show_report(ReportStage::Detecting, surface);
                self.start_timeline(at, surface);
            }
            ScenarioPhase::ImpactRevealed => {
                self.show_report(ReportStage::Impact, surface);
                let impact = &self.scenario.incident.impact;
                let card = CardState::new(
                    format!("-${}/hr", group_thousands(impact.revenue_loss_per_hour)),
                    format!(
                        "Projected {}hr loss: ${}",
                        impact.projected_hours,
                        group_thousands(impact.projected_loss())
                    ),
                    CardTone::Impact,
                );
                surface.render_card(CardKind::Revenue, &card);
            }
            ScenarioPhase::ActionsTaken => {
                self.show_report(ReportStage::Actions, surface);
                surface.set_banner(RESPONSE_BANNER, BannerSeverity::Critical);
            }
            ScenarioPhase::ReportComplete => {
                self.show_report(ReportStage::Complete, surface);
                let resolution = &self.scenario.incident.resolution;
                let card = CardState::new(
                    resolution.mttr.clone(),
                    format!("vs {} industry avg", resolution.industry_average_short),
                    CardTone::Neutral,
                );
                surface.render_card(CardKind::Mttr, &card);
                surface.set_banner(RESOLVED_BANNER, BannerSeverity::Resolved);
            }
        }
    }

    fn show_report<S: RenderSurface + ?Sized>(&mut self, stage: ReportStage, surface: &mut S) {
        self.report_stage = stage;
        surface.render_report(&self.scenario.incident.view(stage));
    }

    fn start_timeline<S: RenderSurface + ?Sized>(&mut self, at: Duration, surface: &mut S) {
        if self.is_timeline_running() {
            return;
        }
        self.reset_pipeline(surface);
        self.timers.schedule(
            at + self.timing.timeline_lead_in,
            Lineage::Timeline,
            TimerAction::TimelineStep,
        );
    }

    fn timeline_step<S: RenderSurface + ?Sized>(&mut self, at: Duration, surface: &mut S) {
        let total = self.scenario.timeline.len();
        if self.timeline_index >= total {
            for agent in self.agents.iter_mut() {
                agent.status = AgentStatus::Completed;
            }
            surface.render_agents(&self.agents);
            debug!(entries = total, "timeline complete");
            return;
        }

        let index = self.timeline_index;
        let (owner, delay) = {
            let entry = &self.scenario.timeline[index];
            (entry.agent, entry.delay)
        };
        self.advance_pipeline(owner, index, total, surface);

        self.timeline_index += 1;
        surface.render_timeline(&self.scenario.timeline[..self.timeline_index]);
        self.timers
            .schedule(at + delay, Lineage::Timeline, TimerAction::TimelineStep);
    }

    /// Marks every stage upstream of `owner` completed, then the owner
    /// active. The final stage goes straight to completed on the last two
    /// entries.
    fn advance_pipeline<S: RenderSurface + ?Sized>(
        &mut self,
        owner: AgentId,
        index: usize,
        total: usize,
        surface: &mut S,
    ) {
        let owner_index = owner.index();
        for upstream in 0..owner_index {
            self.agents[upstream].status = AgentStatus::Completed;
            if self.connectors[upstream] != ConnectorStatus::Completed {
                self.connectors[upstream] = ConnectorStatus::Completed;
                surface.set_connector(upstream, ConnectorStatus::Completed);
            }
        }
        let final_stretch = owner.is_last() && index + 2 >= total;
        self.agents[owner_index].status = if final_stretch {
            AgentStatus::Completed
        } else {
            AgentStatus::Active
        };
        surface.render_agents(&self.agents);
    }
}

fn check_rosters(scenario: &Scenario) -> Result<(), ScenarioError> {
    let mut seen = HashSet::new();
    for (index, (healthy, incident)) in scenario
        .healthy
        .iter()
        .zip(scenario.incident_roster.iter())
        .enumerate()
    {
        if healthy.name != incident.name || !seen.insert(healthy.name.as_str()) {
            return Err(ScenarioError::RosterMismatch { index });
        }
    }
    if scenario.healthy.len() != scenario.incident_roster.len() {
        return Err(ScenarioError::RosterMismatch {
            index: scenario.healthy.len().min(scenario.incident_roster.len()),
        });
    }
    Ok(())
}
